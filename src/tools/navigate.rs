use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Next,
    Previous,
}

/// Parameters for the navigate tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NavigateParams {
    /// Step direction (default: next)
    #[serde(default = "default_direction")]
    pub direction: Direction,
}

fn default_direction() -> Direction {
    Direction::Next
}

/// Tool for stepping focus through the element list
#[derive(Default)]
pub struct NavigateTool;

impl Tool for NavigateTool {
    type Params = NavigateParams;

    fn name(&self) -> &str {
        "navigate"
    }

    fn execute_typed(&self, params: NavigateParams, context: &mut ToolContext) -> Result<ToolResult> {
        let focus = match params.direction {
            Direction::Next => context.session.next()?,
            Direction::Previous => context.session.previous()?,
        };

        let view = context.session.view(&focus.hierarchy, focus.index)?;
        Ok(ToolResult::success_with(serde_json::json!({
            "direction": params.direction,
            "element": view,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InspectorError;
    use crate::inspector::InspectorSession;

    #[test]
    fn test_navigate_params_default() {
        let params: NavigateParams = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(params.direction, Direction::Next);
    }

    #[test]
    fn test_navigate_params_previous() {
        let params: NavigateParams =
            serde_json::from_value(serde_json::json!({ "direction": "previous" })).unwrap();
        assert_eq!(params.direction, Direction::Previous);
    }

    #[test]
    fn test_navigate_tool_metadata() {
        let tool = NavigateTool;
        assert_eq!(tool.name(), "navigate");
        let schema = tool.parameters_schema();
        assert!(schema.is_object());
    }

    #[test]
    fn test_navigate_wraps() {
        let session = InspectorSession::default();
        session
            .load_dump(r#"<hierarchy><node class="A" bounds="[0,0][1,1]"/><node class="B" bounds="[0,0][1,1]"/></hierarchy>"#)
            .unwrap();

        let step = |direction: &str| {
            let result = session
                .execute_tool("navigate", serde_json::json!({ "direction": direction }))
                .unwrap();
            result.data.unwrap()["element"]["index"].as_u64().unwrap()
        };

        assert_eq!(step("previous"), 1);
        assert_eq!(step("next"), 0);
        assert_eq!(step("next"), 1);
        assert_eq!(step("next"), 0);
    }

    #[test]
    fn test_navigate_without_dump() {
        let session = InspectorSession::default();
        let err = session
            .execute_tool("navigate", serde_json::json!({}))
            .unwrap_err();
        assert!(matches!(err, InspectorError::EmptyIndex));
    }
}
