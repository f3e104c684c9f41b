use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the tree tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TreeParams {
    /// Omit elements deeper than this (top-level elements have depth 1)
    #[serde(default)]
    pub max_depth: Option<usize>,
}

/// Tool for rendering the element tree as indented labels
#[derive(Default)]
pub struct TreeTool;

impl Tool for TreeTool {
    type Params = TreeParams;

    fn name(&self) -> &str {
        "tree"
    }

    fn execute_typed(&self, params: TreeParams, context: &mut ToolContext) -> Result<ToolResult> {
        let (hierarchy, focused) = context.session.focused()?;
        let lines = hierarchy.tree().tree_lines(params.max_depth);

        let rendered = lines
            .iter()
            .map(|line| format!("{}{}", "  ".repeat(line.depth.saturating_sub(1)), line.label))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(ToolResult::success_with(serde_json::json!({
            "lines": lines,
            "rendered": rendered,
            "focused": focused,
        })))
    }
}
