use crate::hierarchy::element::{
    ATTR_CLASS, ATTR_CONTENT_DESC, ATTR_RESOURCE_ID, ATTR_TEXT, ElementRecord,
};
use crate::hierarchy::tree::UiTree;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Attributes that can single out an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LocatorAttribute {
    ContentDesc,
    Text,
    Class,
    ResourceId,
}

impl LocatorAttribute {
    /// Candidates from strongest to weakest
    pub const PRECEDENCE: [LocatorAttribute; 4] = [
        LocatorAttribute::ResourceId,
        LocatorAttribute::Class,
        LocatorAttribute::Text,
        LocatorAttribute::ContentDesc,
    ];

    /// The record's value for this attribute
    pub fn value(self, record: &ElementRecord) -> &str {
        match self {
            LocatorAttribute::ContentDesc => &record.content_desc,
            LocatorAttribute::Text => &record.text,
            LocatorAttribute::Class => &record.class,
            LocatorAttribute::ResourceId => &record.resource_id,
        }
    }

    /// Attribute name as written in the dump
    pub fn dump_name(self) -> &'static str {
        match self {
            LocatorAttribute::ContentDesc => ATTR_CONTENT_DESC,
            LocatorAttribute::Text => ATTR_TEXT,
            LocatorAttribute::Class => ATTR_CLASS,
            LocatorAttribute::ResourceId => ATTR_RESOURCE_ID,
        }
    }

    /// Keyword used by uiautomator selectors, e.g. `d(resourceId="...")`
    pub fn keyword(self) -> &'static str {
        match self {
            LocatorAttribute::ContentDesc => "description",
            LocatorAttribute::Text => "text",
            LocatorAttribute::Class => "className",
            LocatorAttribute::ResourceId => "resourceId",
        }
    }

    /// `UiSelector` method matching this attribute
    fn selector_method(self) -> &'static str {
        match self {
            LocatorAttribute::ContentDesc => "description",
            LocatorAttribute::Text => "textContains",
            LocatorAttribute::Class => "className",
            LocatorAttribute::ResourceId => "resourceId",
        }
    }

    fn index(self) -> usize {
        match self {
            LocatorAttribute::ContentDesc => 0,
            LocatorAttribute::Text => 1,
            LocatorAttribute::Class => 2,
            LocatorAttribute::ResourceId => 3,
        }
    }
}

/// Locators derived for one element. Empty strings mean "not derivable".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ElementLocator {
    /// Single globally unique attribute, e.g. `resourceId="com.app:id/ok"`
    pub indicator: String,

    /// `UiSelector` expression, e.g. `new UiSelector().text("OK")`
    pub selector_expression: String,

    /// XPath-style path keyed on attributes, e.g. `//Button[@text="OK"]`
    pub relative_path: String,

    /// Positional path from the root, e.g. `/FrameLayout[1]/Button[2]`
    pub absolute_path: String,

    /// Attribute that produced the indicator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_by: Option<LocatorAttribute>,
}

impl ElementLocator {
    /// Create a locator that only carries an absolute path
    pub fn new(absolute_path: impl Into<String>) -> Self {
        Self {
            absolute_path: absolute_path.into(),
            ..Self::default()
        }
    }

    /// Builder method: set indicator and selector from a unique attribute
    pub fn with_unique(mut self, attribute: LocatorAttribute, value: &str) -> Self {
        self.indicator = format!("{}={}", attribute.keyword(), java_literal(value));
        self.selector_expression = format!(
            "new UiSelector().{}({})",
            attribute.selector_method(),
            java_literal(value)
        );
        self.unique_by = Some(attribute);
        self
    }

    /// Builder method: set the relative path
    pub fn with_relative_path(mut self, path: impl Into<String>) -> Self {
        self.relative_path = path.into();
        self
    }

    /// Builder method: set the selector expression
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector_expression = selector.into();
        self
    }

    pub fn has_indicator(&self) -> bool {
        !self.indicator.is_empty()
    }

    /// The most precise locator available, absolute path as last resort
    pub fn best_locator(&self) -> &str {
        [
            &self.indicator,
            &self.relative_path,
            &self.selector_expression,
        ]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or(&self.absolute_path)
    }
}

/// Occurrence counts of every value of one attribute across a document
#[derive(Debug, Default)]
pub struct FrequencyTable<'a> {
    counts: HashMap<&'a str, usize>,
}

impl<'a> FrequencyTable<'a> {
    pub fn from_values(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut counts = HashMap::new();
        for value in values {
            *counts.entry(value).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn count(&self, value: &str) -> usize {
        self.counts.get(value).copied().unwrap_or(0)
    }

    /// Non-empty and held by exactly one element
    pub fn is_unique(&self, value: &str) -> bool {
        !value.is_empty() && self.count(value) == 1
    }
}

/// Computes indicators, selectors and paths for every element of a tree
pub struct LocatorSynthesizer<'a> {
    tree: &'a UiTree,
    tables: [FrequencyTable<'a>; 4],
}

impl<'a> LocatorSynthesizer<'a> {
    /// Build the per-attribute frequency tables in one pass each
    pub fn new(tree: &'a UiTree) -> Self {
        let table = |attribute: LocatorAttribute| {
            FrequencyTable::from_values(tree.records().map(move |r| attribute.value(r)))
        };

        Self {
            tree,
            tables: [
                table(LocatorAttribute::ContentDesc),
                table(LocatorAttribute::Text),
                table(LocatorAttribute::Class),
                table(LocatorAttribute::ResourceId),
            ],
        }
    }

    pub fn table(&self, attribute: LocatorAttribute) -> &FrequencyTable<'a> {
        &self.tables[attribute.index()]
    }

    /// Strongest attribute whose value no other element shares
    pub fn unique_attribute(&self, record: &ElementRecord) -> Option<LocatorAttribute> {
        LocatorAttribute::PRECEDENCE
            .into_iter()
            .find(|&attribute| self.table(attribute).is_unique(attribute.value(record)))
    }

    /// Locators for every element, in flat-index order
    pub fn synthesize(&self) -> Vec<ElementLocator> {
        let mut locators: Vec<ElementLocator> = Vec::with_capacity(self.tree.len());

        for node in self.tree.nodes() {
            // Pre-order guarantees the parent was handled first.
            let parent_path = node
                .parent
                .map(|p| locators[p].absolute_path.as_str())
                .unwrap_or("");
            let absolute_path = format!(
                "{}/{}[{}]",
                parent_path, node.record.class, node.class_ordinal
            );
            locators.push(self.locate(&node.record, absolute_path));
        }

        locators
    }

    /// Locators for a single record given its absolute path
    pub fn locate(&self, record: &ElementRecord, absolute_path: String) -> ElementLocator {
        let mut locator = ElementLocator::new(absolute_path);

        match self.unique_attribute(record) {
            Some(attribute) => {
                locator = locator.with_unique(attribute, attribute.value(record));
            }
            None => {
                locator = locator.with_selector(fallback_selector(record));
            }
        }

        let relative_path = relative_path(record, locator.unique_by);
        locator.with_relative_path(relative_path)
    }
}

/// Multi-attribute selector for elements without a unique attribute.
///
/// Only built when `text` or `resource_id` is present; class alone or a
/// description alone leave it empty.
fn fallback_selector(record: &ElementRecord) -> String {
    if record.text.is_empty() && record.resource_id.is_empty() {
        return String::new();
    }

    let mut selector = String::from("new UiSelector()");
    if !record.class.is_empty() {
        selector.push_str(&format!(".className({})", java_literal(&record.class)));
    }
    if !record.text.is_empty() {
        selector.push_str(&format!(".textContains({})", java_literal(&record.text)));
    }
    if !record.resource_id.is_empty() {
        selector.push_str(&format!(".resourceId({})", java_literal(&record.resource_id)));
    }
    selector
}

fn relative_path(record: &ElementRecord, unique_by: Option<LocatorAttribute>) -> String {
    let class = &record.class;

    match unique_by {
        Some(LocatorAttribute::ResourceId) => format!(
            "//{}[@{}={}]",
            class,
            ATTR_RESOURCE_ID,
            xpath_literal(&record.resource_id)
        ),
        Some(LocatorAttribute::Class) => format!("//{}", class),
        _ => match (record.text.is_empty(), record.content_desc.is_empty()) {
            (false, false) => format!(
                "//{}[@{}={} and @{}={}]",
                class,
                ATTR_TEXT,
                xpath_literal(&record.text),
                ATTR_CONTENT_DESC,
                xpath_literal(&record.content_desc)
            ),
            (false, true) => format!("//{}[@{}={}]", class, ATTR_TEXT, xpath_literal(&record.text)),
            (true, false) => format!(
                "//{}[@{}={}]",
                class,
                ATTR_CONTENT_DESC,
                xpath_literal(&record.content_desc)
            ),
            (true, true) => String::new(),
        },
    }
}

/// Double-quoted Java string literal
fn java_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// XPath 1.0 string literal; falls back to `concat()` when both quote kinds occur
fn xpath_literal(value: &str) -> String {
    if !value.contains('"') {
        format!("\"{}\"", value)
    } else if !value.contains('\'') {
        format!("'{}'", value)
    } else {
        let parts: Vec<String> = value
            .split('"')
            .map(|part| format!("\"{}\"", part))
            .collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}
