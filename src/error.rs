use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading or querying a UI hierarchy
#[derive(Debug, Error)]
pub enum InspectorError {
    /// Structural markers or attribute syntax could not be parsed
    #[error("Malformed dump at byte {offset}: {reason}")]
    MalformedDump { offset: usize, reason: String },

    /// Opening and closing element markers do not balance
    #[error("Unbalanced structure: {0}")]
    UnbalancedStructure(String),

    /// A query was issued before any dump was loaded
    #[error("No UI hierarchy loaded")]
    EmptyIndex,

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Screenshot could not be opened or its dimensions decoded
    #[error("Screenshot error: {0}")]
    Screenshot(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl InspectorError {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedDump {
            offset,
            reason: reason.into(),
        }
    }

    /// Whether this error came from rejecting a dump, as opposed to a query
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedDump { .. } | Self::UnbalancedStructure(_) | Self::Io { .. } | Self::Screenshot(_)
        )
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, InspectorError>;
