use crate::hierarchy::ScreenSize;
use crate::hierarchy::parser::DEFAULT_ELEMENT_TAG;
use serde::{Deserialize, Serialize};

/// Options for loading and querying hierarchy dumps
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InspectorOptions {
    /// Tag name of element markers in the dump
    #[serde(default = "default_element_tag")]
    pub element_tag: String,

    /// Pixels added around a selected element's overlay rectangle
    #[serde(default = "default_highlight_padding")]
    pub highlight_padding: i32,

    /// Coordinate space override; otherwise taken from the screenshot
    #[serde(default)]
    pub screen_size: Option<ScreenSize>,
}

fn default_element_tag() -> String {
    DEFAULT_ELEMENT_TAG.to_string()
}

fn default_highlight_padding() -> i32 {
    2
}

impl Default for InspectorOptions {
    fn default() -> Self {
        Self {
            element_tag: default_element_tag(),
            highlight_padding: default_highlight_padding(),
            screen_size: None,
        }
    }
}

impl InspectorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the element tag
    pub fn element_tag(mut self, tag: impl Into<String>) -> Self {
        self.element_tag = tag.into();
        self
    }

    /// Builder method: set overlay padding
    pub fn highlight_padding(mut self, padding: i32) -> Self {
        self.highlight_padding = padding;
        self
    }

    /// Builder method: fix the screenshot dimensions
    pub fn screen_size(mut self, width: u32, height: u32) -> Self {
        self.screen_size = Some(ScreenSize::new(width, height));
        self
    }
}
