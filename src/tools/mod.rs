//! Tool system
//!
//! Every query the display layer (or an agent) can issue is a [`Tool`] with
//! typed, JSON-deserialized parameters. Tools are looked up by name in a
//! [`ToolRegistry`] and run against an [`InspectorSession`].

pub mod element_at;
pub mod find;
pub mod inspect;
pub mod load;
pub mod navigate;
pub mod tree;

use crate::error::{InspectorError, Result};
use crate::inspector::InspectorSession;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Execution context passed to tools
pub struct ToolContext<'a> {
    pub session: &'a InspectorSession,
}

impl<'a> ToolContext<'a> {
    pub fn new(session: &'a InspectorSession) -> Self {
        Self { session }
    }
}

/// Outcome of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    pub fn success_with(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// A named operation with typed parameters
pub trait Tool: Send + Sync {
    type Params: DeserializeOwned + JsonSchema;

    fn name(&self) -> &str;

    fn execute_typed(&self, params: Self::Params, context: &mut ToolContext) -> Result<ToolResult>;

    /// JSON schema of the parameters
    fn parameters_schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(Self::Params)).unwrap_or(Value::Null)
    }

    /// Deserialize raw parameters and execute
    fn execute(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        let params: Self::Params = serde_json::from_value(params)
            .map_err(|e| InspectorError::InvalidParameters(format!("{}: {}", Tool::name(self), e)))?;
        self.execute_typed(params, context)
    }
}

/// Object-safe view of a [`Tool`] for storage in the registry
trait DynTool: Send + Sync {
    fn name(&self) -> &str;
    fn parameters_schema(&self) -> Value;
    fn execute(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult>;
}

impl<T: Tool> DynTool for T {
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn parameters_schema(&self) -> Value {
        Tool::parameters_schema(self)
    }

    fn execute(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        Tool::execute(self, params, context)
    }
}

/// Registry of tools, keyed by name in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Box<dyn DynTool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in tool
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(load::LoadDumpTool);
        registry.register(element_at::ElementAtTool);
        registry.register(navigate::NavigateTool);
        registry.register(inspect::SelectTool);
        registry.register(inspect::InspectTool);
        registry.register(find::FindTool);
        registry.register(tree::TreeTool);
        registry
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(Tool::name(&tool).to_string(), Box::new(tool));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Parameter schema of a registered tool
    pub fn schema(&self, name: &str) -> Option<Value> {
        self.tools.get(name).map(|tool| tool.parameters_schema())
    }

    /// Execute a tool by name
    pub fn execute(&self, name: &str, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| InspectorError::UnknownTool(name.to_string()))?;
        log::debug!("Executing tool '{}'", tool.name());
        tool.execute(params, context)
    }
}
