use crate::error::{InspectorError, Result};
use crate::hierarchy::element::ElementRecord;
use crate::hierarchy::locator::{LocatorAttribute, LocatorSynthesizer};
use crate::hierarchy::parser::{DumpParser, DumpToken};
use serde::Serialize;
use std::collections::HashMap;

/// An element placed in the hierarchy
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UiNode {
    /// The parsed element with its derived locators
    pub record: ElementRecord,

    /// Flat index of the parent, `None` for top-level elements
    pub parent: Option<usize>,

    /// Distance from the synthetic root (top-level elements have depth 1)
    pub depth: usize,

    /// 1-based occurrence of this class among same-parent siblings so far
    pub class_ordinal: usize,

    /// Flat indices of the direct children in document order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<usize>,
}

/// The element tree of one dump.
///
/// Nodes are stored in pre-order, so a node's position in [`UiTree::nodes`]
/// is also its flat index used by hit testing and navigation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiTree {
    nodes: Vec<UiNode>,
}

/// One line of a rendered tree view
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TreeLine {
    pub index: usize,
    pub depth: usize,
    pub label: String,
}

struct Frame {
    node: usize,
    class_counts: HashMap<String, usize>,
}

/// Stack-based builder reconstructing parent links from open/close markers
#[derive(Debug, Default)]
pub struct TreeBuilder;

impl TreeBuilder {
    /// Build a tree from document-ordered tokens.
    ///
    /// Open elements push a frame, closing markers pop one; self-closing
    /// elements are leaves. There is no depth limit.
    pub fn build(tokens: impl IntoIterator<Item = DumpToken>) -> Result<UiTree> {
        let mut nodes: Vec<UiNode> = Vec::new();
        let mut root_counts: HashMap<String, usize> = HashMap::new();
        let mut open: Vec<Frame> = Vec::new();

        for token in tokens {
            match token {
                DumpToken::Open {
                    record,
                    self_closing,
                    ..
                } => {
                    let id = nodes.len();
                    let (parent, counts) = match open.last_mut() {
                        Some(frame) => (Some(frame.node), &mut frame.class_counts),
                        None => (None, &mut root_counts),
                    };

                    let ordinal = counts.entry(record.class.clone()).or_insert(0);
                    *ordinal += 1;
                    let class_ordinal = *ordinal;

                    if let Some(parent) = parent {
                        nodes[parent].children.push(id);
                    }

                    nodes.push(UiNode {
                        record,
                        parent,
                        depth: open.len() + 1,
                        class_ordinal,
                        children: Vec::new(),
                    });

                    if !self_closing {
                        open.push(Frame {
                            node: id,
                            class_counts: HashMap::new(),
                        });
                    }
                }
                DumpToken::Close { offset } => {
                    if open.pop().is_none() {
                        return Err(InspectorError::UnbalancedStructure(format!(
                            "closing marker at byte {} has no open element",
                            offset
                        )));
                    }
                }
            }
        }

        if let Some(frame) = open.last() {
            return Err(InspectorError::UnbalancedStructure(format!(
                "{} element(s) never closed, innermost is #{} ({})",
                open.len(),
                frame.node,
                nodes[frame.node].record.class
            )));
        }

        log::debug!("Built tree with {} nodes", nodes.len());
        Ok(UiTree { nodes })
    }
}

impl UiTree {
    /// Parse a dump with the default element tag, build the tree and
    /// synthesize every element's locators
    pub fn from_dump(dump: &str) -> Result<Self> {
        Self::from_dump_with(&DumpParser::default(), dump)
    }

    /// Same as [`UiTree::from_dump`] with a custom parser
    pub fn from_dump_with(parser: &DumpParser, dump: &str) -> Result<Self> {
        let tokens = parser.tokenize(dump)?;
        let mut tree = TreeBuilder::build(tokens)?;
        tree.synthesize_locators();
        Ok(tree)
    }

    fn synthesize_locators(&mut self) {
        let locators = LocatorSynthesizer::new(self).synthesize();
        for (node, locator) in self.nodes.iter_mut().zip(locators) {
            node.record.locator = locator;
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in pre-order
    pub fn nodes(&self) -> &[UiNode] {
        &self.nodes
    }

    pub fn get(&self, index: usize) -> Option<&UiNode> {
        self.nodes.get(index)
    }

    pub fn record(&self, index: usize) -> Option<&ElementRecord> {
        self.nodes.get(index).map(|node| &node.record)
    }

    /// Records in document order
    pub fn records(&self) -> impl Iterator<Item = &ElementRecord> {
        self.nodes.iter().map(|node| &node.record)
    }

    /// Flat indices of the top-level elements
    pub fn roots(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn parent(&self, index: usize) -> Option<usize> {
        self.nodes.get(index)?.parent
    }

    pub fn children(&self, index: usize) -> &[usize] {
        self.nodes
            .get(index)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Ancestor chain starting at `index` itself and ending at its top-level element
    pub fn ancestors(&self, index: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut current = self.nodes.get(index).map(|_| index);
        while let Some(i) = current {
            chain.push(i);
            current = self.nodes[i].parent;
        }
        chain
    }

    /// Elements whose value for `attribute` equals `value`, in document order
    pub fn find_by_attribute(&self, attribute: LocatorAttribute, value: &str) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| attribute.value(&node.record) == value)
            .map(|(i, _)| i)
            .collect()
    }

    /// Find the element whose indicator is exactly `indicator`
    pub fn find_by_indicator(&self, indicator: &str) -> Option<usize> {
        if indicator.is_empty() {
            return None;
        }
        self.nodes
            .iter()
            .position(|node| node.record.locator.indicator == indicator)
    }

    /// Find the element whose absolute path is exactly `path`
    pub fn find_by_absolute_path(&self, path: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| node.record.locator.absolute_path == path)
    }

    /// Maximum depth of any element
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }

    /// Labels for a tree view, optionally cut below `max_depth`
    pub fn tree_lines(&self, max_depth: Option<usize>) -> Vec<TreeLine> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| max_depth.is_none_or(|max| node.depth <= max))
            .map(|(index, node)| TreeLine {
                index,
                depth: node.depth,
                label: node.record.tree_label(),
            })
            .collect()
    }

    /// Serialize all records (with locators) to JSON
    pub fn to_json(&self) -> Result<String> {
        let records: Vec<&ElementRecord> = self.records().collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }
}
