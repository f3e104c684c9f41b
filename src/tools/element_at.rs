use crate::error::Result;
use crate::hierarchy::Point;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the element_at tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ElementAtParams {
    /// X coordinate in screenshot pixels
    pub x: i32,

    /// Y coordinate in screenshot pixels
    pub y: i32,
}

/// Tool for finding the element under a screenshot point
#[derive(Default)]
pub struct ElementAtTool;

impl Tool for ElementAtTool {
    type Params = ElementAtParams;

    fn name(&self) -> &str {
        "element_at"
    }

    fn execute_typed(&self, params: ElementAtParams, context: &mut ToolContext) -> Result<ToolResult> {
        let point = Point::new(params.x, params.y);

        match context.session.element_at(point)? {
            Some(focus) => {
                let view = context.session.view(&focus.hierarchy, focus.index)?;
                let containers = focus.hierarchy.hit_tester().elements_at(point);
                Ok(ToolResult::success_with(serde_json::json!({
                    "point": point,
                    "found": true,
                    "element": view,
                    "containers": containers,
                })))
            }
            None => Ok(ToolResult::success_with(serde_json::json!({
                "point": point,
                "found": false,
            }))),
        }
    }
}
