use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters for the load_dump tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LoadDumpParams {
    /// Dump file path or inline dump text
    #[serde(flatten)]
    pub source: DumpSource,

    /// Screenshot whose pixel size defines the coordinate space
    #[serde(default)]
    pub screenshot_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum DumpSource {
    /// Read the dump from a file
    Path {
        /// Path to a .uix/.xml hierarchy dump
        dump_path: String,
    },
    /// Dump text passed directly
    Inline {
        /// Hierarchy dump contents
        xml: String,
    },
}

/// Tool for loading a hierarchy dump
#[derive(Default)]
pub struct LoadDumpTool;

impl Tool for LoadDumpTool {
    type Params = LoadDumpParams;

    fn name(&self) -> &str {
        "load_dump"
    }

    fn execute_typed(&self, params: LoadDumpParams, context: &mut ToolContext) -> Result<ToolResult> {
        let screenshot = params.screenshot_path.as_deref().map(Path::new);

        let loaded = match &params.source {
            DumpSource::Path { dump_path } => context.session.load_files(dump_path, screenshot)?,
            DumpSource::Inline { xml } => context.session.load_dump_with_screenshot(xml, screenshot)?,
        };

        Ok(ToolResult::success_with(serde_json::json!({
            "elements": loaded.tree().len(),
            "max_depth": loaded.tree().max_depth(),
            "screen": loaded.screen(),
            "dump_path": loaded.dump_path().map(|p| p.display().to_string()),
            "screenshot_path": loaded.screenshot_path().map(|p| p.display().to_string()),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InspectorError;
    use crate::inspector::InspectorSession;

    #[test]
    fn test_load_params_inline() {
        let params: LoadDumpParams = serde_json::from_value(serde_json::json!({
            "xml": "<node/>"
        }))
        .unwrap();
        assert!(matches!(params.source, DumpSource::Inline { .. }));
        assert!(params.screenshot_path.is_none());
    }

    #[test]
    fn test_load_params_path() {
        let params: LoadDumpParams = serde_json::from_value(serde_json::json!({
            "dump_path": "/tmp/ui.uix",
            "screenshot_path": "/tmp/ui.png"
        }))
        .unwrap();
        match params.source {
            DumpSource::Path { dump_path } => assert_eq!(dump_path, "/tmp/ui.uix"),
            _ => panic!("Expected path source"),
        }
        assert_eq!(params.screenshot_path.as_deref(), Some("/tmp/ui.png"));
    }

    #[test]
    fn test_load_inline_dump() {
        let session = InspectorSession::default();
        let result = session
            .execute_tool(
                "load_dump",
                serde_json::json!({
                    "xml": r#"<node class="A" bounds="[0,0][10,10]"><node class="B" bounds="[0,0][5,5]"/></node>"#
                }),
            )
            .unwrap();

        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["elements"], 2);
        assert_eq!(data["max_depth"], 2);
        assert!(data["screen"].is_null());
        assert!(session.is_loaded());
    }

    #[test]
    fn test_load_inline_dump_with_screenshot() {
        let png_path = std::env::temp_dir().join(format!("uix-inspector-load-{}.png", std::process::id()));
        image::RgbImage::new(100, 200).save(&png_path).unwrap();

        let session = InspectorSession::default();
        let result = session
            .execute_tool(
                "load_dump",
                serde_json::json!({
                    "xml": r#"<node class="A" bounds="[0,0][10,10]"/>"#,
                    "screenshot_path": png_path.display().to_string(),
                }),
            )
            .unwrap();

        let data = result.data.unwrap();
        assert_eq!(data["screen"], serde_json::json!({ "width": 100, "height": 200 }));
        assert_eq!(data["screenshot_path"], png_path.display().to_string());
        assert_eq!(
            session.hierarchy().unwrap().screenshot_path(),
            Some(png_path.as_path())
        );

        std::fs::remove_file(&png_path).ok();
    }

    #[test]
    fn test_load_malformed_dump_is_an_error() {
        let session = InspectorSession::default();
        let err = session
            .execute_tool("load_dump", serde_json::json!({ "xml": "<node class=\"A\"" }))
            .unwrap_err();
        assert!(matches!(err, InspectorError::MalformedDump { .. }));
    }
}
