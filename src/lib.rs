//! # uix-inspector
//!
//! A Rust library for inspecting Android uiautomator hierarchy dumps (`.uix`
//! files): it rebuilds the element tree, derives locators for every element and
//! answers "which element is under this screenshot pixel?".
//!
//! ## Features
//!
//! - **Dump Parsing**: Tolerant tag scanner for uiautomator dumps with entity decoding
//! - **Locator Synthesis**: Unique indicators, `UiSelector` expressions, relative and absolute paths
//! - **Hit Testing**: Point to most specific (smallest-area) element
//! - **Navigation**: Cyclic next/previous focus over the flat element list
//! - **Tool System**: JSON tools for a display layer or an AI agent
//! - **MCP Server**: Model Context Protocol server exposing the tools
//!
//! ## MCP Server
//!
//! ```bash
//! # stdio transport
//! cargo run --bin mcp-server --features mcp-server
//!
//! # streamable HTTP on port 3000
//! cargo run --bin mcp-server --features mcp-server -- --transport http
//! ```
//!
//! ## Library Usage
//!
//! ### Parsing a Dump
//!
//! ```rust
//! use uix_inspector::hierarchy::{parse_hierarchy, Point, HitTester};
//!
//! # fn main() -> uix_inspector::Result<()> {
//! let tree = parse_hierarchy(
//!     r#"<hierarchy><node class="Frame" bounds="[0,0][100,100]">
//!          <node class="Button" text="OK" bounds="[10,10][50,50]"/>
//!        </node></hierarchy>"#,
//! )?;
//!
//! let hit = HitTester::new(&tree).element_at(Point::new(20, 20));
//! assert_eq!(hit, Some(1));
//! assert_eq!(tree.nodes()[1].record.locator.absolute_path, "/Frame[1]/Button[1]");
//! # Ok(())
//! # }
//! ```
//!
//! ### Using the Tool System
//!
//! ```rust
//! use uix_inspector::InspectorSession;
//! use serde_json::json;
//!
//! # fn main() -> uix_inspector::Result<()> {
//! let session = InspectorSession::default();
//! session.execute_tool("load_dump", json!({ "xml": r#"<node class="A" bounds="[0,0][10,10]"/>"# }))?;
//!
//! let result = session.execute_tool("navigate", json!({ "direction": "next" }))?;
//! assert!(result.success);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`hierarchy`]: Parser, tree, locators, hit testing and navigation
//! - [`inspector`]: Session holding the active hierarchy and focus, plus options
//! - [`tools`]: JSON tools over a session (load, element_at, navigate, inspect, find, tree)
//! - [`error`]: Error types and result aliases
//! - [`mcp`]: Model Context Protocol server (requires `mcp-handler` feature)

pub mod error;
pub mod hierarchy;
pub mod inspector;
pub mod tools;

#[cfg(feature = "mcp-handler")]
pub mod mcp;

pub use error::{InspectorError, Result};
pub use hierarchy::{Bounds, ElementLocator, ElementRecord, LocatorAttribute, Point, ScreenSize, UiTree};
pub use inspector::{ElementView, Focus, InspectorOptions, InspectorSession, LoadedHierarchy};
pub use tools::{Tool, ToolContext, ToolRegistry, ToolResult};

#[cfg(feature = "mcp-handler")]
pub use mcp::InspectorServer;
#[cfg(feature = "mcp-handler")]
pub use rmcp::ServiceExt;
