use crate::inspector::{InspectorOptions, InspectorSession};
use rmcp::{
    ServerHandler,
    handler::server::tool::ToolRouter,
    model::{ServerCapabilities, ServerInfo},
    tool_handler,
};
use std::sync::Arc;

/// MCP server exposing the inspection tools over one shared session
#[derive(Clone)]
pub struct InspectorServer {
    session: Arc<InspectorSession>,
    tool_router: ToolRouter<Self>,
}

impl InspectorServer {
    /// Create a server with default options
    pub fn new() -> Self {
        Self::with_options(InspectorOptions::default())
    }

    /// Create a server with custom options
    pub fn with_options(options: InspectorOptions) -> Self {
        Self::with_session(Arc::new(InspectorSession::new(options)))
    }

    /// Serve an existing session, e.g. one shared with a display layer
    pub fn with_session(session: Arc<InspectorSession>) -> Self {
        Self {
            session,
            tool_router: Self::tool_router(),
        }
    }

    /// Get the inspector session
    pub fn session(&self) -> Arc<InspectorSession> {
        Arc::clone(&self.session)
    }
}

impl Default for InspectorServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for InspectorServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Android UI hierarchy inspector (tools: ui_load_dump, ui_element_at, ui_next, ui_previous, ui_inspect, ui_find, ui_tree). Load a uiautomator dump first; coordinates are screenshot pixels."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
