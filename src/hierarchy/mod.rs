//! UI hierarchy engine
//!
//! This module turns a uiautomator dump into a queryable element tree:
//! - DumpParser: tag scanner producing document-ordered element records
//! - TreeBuilder / UiTree: parent links, depth and per-parent class ordinals
//! - LocatorSynthesizer: indicators, selectors, relative and absolute paths
//! - HitTester: point to most specific element
//! - Navigator: cyclic next/previous cursor

pub mod element;
pub mod entities;
pub mod locator;
pub mod navigator;
pub mod parser;
pub mod tree;

pub use element::{Bounds, ElementRecord, Point, ScreenSize};
pub use hit_test::HitTester;
pub use locator::{ElementLocator, FrequencyTable, LocatorAttribute, LocatorSynthesizer};
pub use navigator::Navigator;
pub use parser::{DumpParser, DumpToken};
pub use tree::{TreeBuilder, TreeLine, UiNode, UiTree};

use crate::error::Result;

/// Parse a dump into a fully located element tree
pub fn parse_hierarchy(dump: &str) -> Result<UiTree> {
    UiTree::from_dump(dump)
}
