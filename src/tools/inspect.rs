use crate::error::{InspectorError, Result};
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the select tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SelectParams {
    /// Flat element index
    pub index: usize,
}

/// Tool for focusing an element picked by index
#[derive(Default)]
pub struct SelectTool;

impl Tool for SelectTool {
    type Params = SelectParams;

    fn name(&self) -> &str {
        "select"
    }

    fn execute_typed(&self, params: SelectParams, context: &mut ToolContext) -> Result<ToolResult> {
        let focus = context.session.select(params.index)?;
        let view = context.session.view(&focus.hierarchy, focus.index)?;
        Ok(ToolResult::success_with(serde_json::json!({ "element": view })))
    }
}

/// Parameters for the inspect tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct InspectParams {
    /// Element index; the focused element when omitted
    #[serde(default)]
    pub index: Option<usize>,
}

/// Tool for reading an element's properties and locators without moving focus
#[derive(Default)]
pub struct InspectTool;

impl Tool for InspectTool {
    type Params = InspectParams;

    fn name(&self) -> &str {
        "inspect"
    }

    fn execute_typed(&self, params: InspectParams, context: &mut ToolContext) -> Result<ToolResult> {
        let (hierarchy, current) = context.session.focused()?;
        let index = params.index.or(current).ok_or_else(|| {
            InspectorError::InvalidParameters("No element is focused; pass an index".to_string())
        })?;

        let view = context.session.view(&hierarchy, index)?;
        let ancestors = hierarchy.tree().ancestors(index);
        let properties: serde_json::Map<String, serde_json::Value> = view
            .record
            .properties()
            .into_iter()
            .map(|(key, value)| (key, serde_json::Value::String(value)))
            .collect();

        Ok(ToolResult::success_with(serde_json::json!({
            "index": index,
            "label": view.record.tree_label(),
            "properties": properties,
            "best_locator": view.record.locator.best_locator(),
            "highlight": view.highlight,
            "ancestors": ancestors,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspector::InspectorSession;

    const DUMP: &str = r#"<hierarchy>
        <node class="android.widget.TextView" text="Hello" resource-id="title" bounds="[0,0][100,20]"/>
        <node class="android.widget.TextView" text="World" bounds="[0,20][100,40]"/>
    </hierarchy>"#;

    #[test]
    fn test_select_focuses() {
        let session = InspectorSession::default();
        session.load_dump(DUMP).unwrap();

        let result = session
            .execute_tool("select", serde_json::json!({ "index": 1 }))
            .unwrap();
        assert_eq!(result.data.unwrap()["element"]["index"], 1);
        assert_eq!(session.current(), Some(1));
    }

    #[test]
    fn test_select_out_of_range() {
        let session = InspectorSession::default();
        session.load_dump(DUMP).unwrap();

        let err = session
            .execute_tool("select", serde_json::json!({ "index": 5 }))
            .unwrap_err();
        assert!(matches!(err, InspectorError::ElementNotFound(_)));
    }

    #[test]
    fn test_inspect_by_index() {
        let session = InspectorSession::default();
        session.load_dump(DUMP).unwrap();

        let result = session
            .execute_tool("inspect", serde_json::json!({ "index": 0 }))
            .unwrap();
        let data = result.data.unwrap();
        assert_eq!(data["properties"]["text"], "Hello");
        assert_eq!(data["properties"]["resource-id"], "title");
        assert_eq!(data["best_locator"], "resourceId=\"title\"");
        assert_eq!(session.current(), None);
    }

    #[test]
    fn test_inspect_focused() {
        let session = InspectorSession::default();
        session.load_dump(DUMP).unwrap();
        session.select(1).unwrap();

        let result = session.execute_tool("inspect", serde_json::json!({})).unwrap();
        let data = result.data.unwrap();
        assert_eq!(data["index"], 1);
        assert_eq!(data["ancestors"], serde_json::json!([1]));
    }

    #[test]
    fn test_inspect_nothing_focused() {
        let session = InspectorSession::default();
        let err = session.execute_tool("inspect", serde_json::json!({})).unwrap_err();
        assert!(matches!(err, InspectorError::EmptyIndex));

        session.load_dump(DUMP).unwrap();
        let err = session.execute_tool("inspect", serde_json::json!({})).unwrap_err();
        assert!(matches!(err, InspectorError::InvalidParameters(_)));
    }
}
