use crate::error::Result;
use crate::hierarchy::LocatorAttribute;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the find tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FindParams {
    /// Match an exact indicator string, e.g. `text="OK"`
    ByIndicator {
        /// Indicator as produced by the locator synthesizer
        indicator: String,
    },
    /// Match every element whose attribute equals a value
    ByAttribute {
        /// One of resource_id, class, text, content_desc
        attribute: LocatorAttribute,
        /// Exact value to compare against
        value: String,
    },
    /// Match a positional path, e.g. `/FrameLayout[1]/Button[2]`
    ByAbsolutePath {
        /// Absolute path as produced by the locator synthesizer
        absolute_path: String,
    },
}

/// Tool for finding elements by locator or attribute value
#[derive(Default)]
pub struct FindTool;

impl Tool for FindTool {
    type Params = FindParams;

    fn name(&self) -> &str {
        "find"
    }

    fn execute_typed(&self, params: FindParams, context: &mut ToolContext) -> Result<ToolResult> {
        let hierarchy = context.session.hierarchy()?;
        let tree = hierarchy.tree();

        let indices: Vec<usize> = match &params {
            FindParams::ByIndicator { indicator } => tree.find_by_indicator(indicator).into_iter().collect(),
            FindParams::ByAttribute { attribute, value } => tree.find_by_attribute(*attribute, value),
            FindParams::ByAbsolutePath { absolute_path } => {
                tree.find_by_absolute_path(absolute_path).into_iter().collect()
            }
        };

        let matches: Vec<_> = indices
            .iter()
            .filter_map(|&index| {
                tree.record(index).map(|record| {
                    serde_json::json!({
                        "index": index,
                        "label": record.tree_label(),
                        "locator": record.locator,
                    })
                })
            })
            .collect();

        Ok(ToolResult::success_with(serde_json::json!({
            "count": matches.len(),
            "matches": matches,
        })))
    }
}
