//! MCP (Model Context Protocol) server implementation for dump inspection
//!
//! This module provides rmcp-compatible tools by wrapping the tool registry.

pub mod handler;
pub use handler::InspectorServer;

use crate::error::InspectorError;
use crate::hierarchy::LocatorAttribute;
use crate::tools::{ToolContext, ToolResult as InternalToolResult};
use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    tool, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Load dump tool parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LoadDumpParams {
    /// Path to a .uix/.xml dump file
    #[serde(default)]
    pub dump_path: Option<String>,
    /// Inline dump contents (used when no path is given)
    #[serde(default)]
    pub xml: Option<String>,
    /// Screenshot defining the coordinate space
    #[serde(default)]
    pub screenshot_path: Option<String>,
}

/// Element-at tool parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ElementAtParams {
    /// X coordinate in screenshot pixels
    pub x: i32,
    /// Y coordinate in screenshot pixels
    pub y: i32,
}

/// Inspect tool parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InspectParams {
    /// Element index (default: the focused element)
    #[serde(default)]
    pub index: Option<usize>,
    /// Also move focus to this element
    #[serde(default)]
    pub focus: bool,
}

/// Find tool parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FindParams {
    /// Exact indicator, e.g. text="OK"
    #[serde(default)]
    pub indicator: Option<String>,
    /// Attribute to compare (resource_id, class, text, content_desc)
    #[serde(default)]
    pub attribute: Option<LocatorAttribute>,
    /// Value for `attribute`
    #[serde(default)]
    pub value: Option<String>,
    /// Exact absolute path, e.g. /FrameLayout[1]/Button[2]
    #[serde(default)]
    pub absolute_path: Option<String>,
}

/// Tree tool parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TreeParams {
    /// Omit elements deeper than this
    #[serde(default)]
    pub max_depth: Option<usize>,
}

/// Convert internal ToolResult to MCP CallToolResult
fn convert_result(result: InternalToolResult) -> Result<CallToolResult, McpError> {
    if result.success {
        let text = if let Some(data) = result.data {
            serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string())
        } else {
            "Success".to_string()
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    } else {
        let error_msg = result.error.unwrap_or_else(|| "Unknown error".to_string());
        Err(McpError::internal_error(error_msg, None))
    }
}

impl InspectorServer {
    fn run(&self, name: &str, params: serde_json::Value) -> Result<CallToolResult, McpError> {
        let session = self.session();
        let mut context = ToolContext::new(&*session);

        let result = session
            .tool_registry()
            .execute(name, params, &mut context)
            .map_err(|e| {
                if e.is_load_error() || matches!(e, InspectorError::InvalidParameters(_)) {
                    McpError::invalid_params(e.to_string(), None)
                } else {
                    McpError::internal_error(e.to_string(), None)
                }
            })?;

        convert_result(result)
    }
}

#[tool_router]
impl InspectorServer {
    /// Load a hierarchy dump
    #[tool(description = "Load a uiautomator hierarchy dump from a file path or inline XML, optionally with a screenshot defining the coordinate space")]
    fn ui_load_dump(&self, params: Parameters<LoadDumpParams>) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let mut tool_params = if let Some(path) = params.dump_path {
            serde_json::json!({ "dump_path": path })
        } else if let Some(xml) = params.xml {
            serde_json::json!({ "xml": xml })
        } else {
            return Err(McpError::invalid_params("Either dump_path or xml must be provided", None));
        };

        if let Some(screenshot) = params.screenshot_path {
            tool_params["screenshot_path"] = serde_json::json!(screenshot);
        }

        self.run("load_dump", tool_params)
    }

    /// Hit test a screenshot point
    #[tool(description = "Find the most specific element containing a screenshot point and focus it")]
    fn ui_element_at(&self, params: Parameters<ElementAtParams>) -> Result<CallToolResult, McpError> {
        self.run("element_at", serde_json::json!({ "x": params.0.x, "y": params.0.y }))
    }

    /// Focus the next element
    #[tool(description = "Move focus to the next element in document order, wrapping at the end")]
    fn ui_next(&self) -> Result<CallToolResult, McpError> {
        self.run("navigate", serde_json::json!({ "direction": "next" }))
    }

    /// Focus the previous element
    #[tool(description = "Move focus to the previous element in document order, wrapping at the start")]
    fn ui_previous(&self) -> Result<CallToolResult, McpError> {
        self.run("navigate", serde_json::json!({ "direction": "previous" }))
    }

    /// Show an element's properties and locators
    #[tool(description = "Show the properties and locators of an element (default: the focused element)")]
    fn ui_inspect(&self, params: Parameters<InspectParams>) -> Result<CallToolResult, McpError> {
        let params = params.0;
        match params.index {
            Some(index) if params.focus => self.run("select", serde_json::json!({ "index": index })),
            Some(index) => self.run("inspect", serde_json::json!({ "index": index })),
            None => self.run("inspect", serde_json::json!({})),
        }
    }

    /// Find elements by locator
    #[tool(description = "Find elements by indicator, by attribute value, or by absolute path")]
    fn ui_find(&self, params: Parameters<FindParams>) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let tool_params = if let Some(indicator) = params.indicator {
            serde_json::json!({ "indicator": indicator })
        } else if let (Some(attribute), Some(value)) = (params.attribute, params.value) {
            serde_json::json!({ "attribute": attribute, "value": value })
        } else if let Some(path) = params.absolute_path {
            serde_json::json!({ "absolute_path": path })
        } else {
            return Err(McpError::invalid_params(
                "Provide indicator, attribute and value, or absolute_path",
                None,
            ));
        };

        self.run("find", tool_params)
    }

    /// Render the element tree
    #[tool(description = "Render the element tree as indented labels")]
    fn ui_tree(&self, params: Parameters<TreeParams>) -> Result<CallToolResult, McpError> {
        self.run("tree", serde_json::json!({ "max_depth": params.0.max_depth }))
    }
}
