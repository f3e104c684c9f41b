pub mod config;
pub mod session;

pub use config::InspectorOptions;
pub use session::{ElementView, Focus, InspectorSession, LoadedHierarchy, read_screen_size};
