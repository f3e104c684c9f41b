use crate::{error::{InspectorError, Result},
            hierarchy::{Bounds, DumpParser, ElementRecord, HitTester, Navigator, Point, ScreenSize, UiTree},
            inspector::config::InspectorOptions,
            tools::{ToolContext, ToolRegistry, ToolResult}};
use serde::Serialize;
use std::{path::{Path, PathBuf},
          sync::{Arc, Mutex, MutexGuard, PoisonError}};

/// A successfully parsed dump together with its coordinate space
#[derive(Debug, Clone)]
pub struct LoadedHierarchy {
    tree: UiTree,
    screen: Option<ScreenSize>,
    dump_path: Option<PathBuf>,
    screenshot_path: Option<PathBuf>,
}

impl LoadedHierarchy {
    pub fn tree(&self) -> &UiTree {
        &self.tree
    }

    /// Screenshot dimensions, if known
    pub fn screen(&self) -> Option<ScreenSize> {
        self.screen
    }

    pub fn dump_path(&self) -> Option<&Path> {
        self.dump_path.as_deref()
    }

    pub fn screenshot_path(&self) -> Option<&Path> {
        self.screenshot_path.as_deref()
    }

    /// Hit tester bounded by the screenshot when its size is known
    pub fn hit_tester(&self) -> HitTester<'_> {
        match self.screen {
            Some(screen) => HitTester::with_screen(&self.tree, screen),
            None => HitTester::new(&self.tree),
        }
    }
}

/// What the display layer needs to render one element
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ElementView {
    pub index: usize,
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub record: ElementRecord,
    /// Overlay rectangle, padded and clipped to the screenshot
    pub highlight: Bounds,
}

/// A focused element together with the hierarchy its index refers to
#[derive(Debug, Clone)]
pub struct Focus {
    pub hierarchy: Arc<LoadedHierarchy>,
    pub index: usize,
}

#[derive(Default)]
struct SessionState {
    hierarchy: Option<Arc<LoadedHierarchy>>,
    navigator: Navigator,
}

/// Holds the active hierarchy and the focus cursor.
///
/// Loads are build-then-swap: a new dump is parsed completely before it
/// replaces the active one, and a failed load leaves the previous hierarchy
/// and cursor untouched.
pub struct InspectorSession {
    options: InspectorOptions,
    parser: DumpParser,
    state: Mutex<SessionState>,
    tool_registry: ToolRegistry,
}

impl InspectorSession {
    /// Create an empty session with the given options
    pub fn new(options: InspectorOptions) -> Self {
        Self {
            parser: DumpParser::new(options.element_tag.clone()),
            options,
            state: Mutex::new(SessionState::default()),
            tool_registry: ToolRegistry::with_defaults(),
        }
    }

    pub fn options(&self) -> &InspectorOptions {
        &self.options
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        // The state is only ever replaced wholesale, so a poisoned lock still holds a consistent value.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn build(&self, dump: &str) -> Result<UiTree> {
        UiTree::from_dump_with(&self.parser, dump).inspect_err(|e| {
            log::warn!("Rejected dump: {}", e);
        })
    }

    fn swap(&self, loaded: LoadedHierarchy) -> Arc<LoadedHierarchy> {
        let loaded = Arc::new(loaded);
        let mut state = self.state();
        state.hierarchy = Some(loaded.clone());
        state.navigator.clear();
        log::info!(
            "Loaded hierarchy with {} elements (screen: {:?})",
            loaded.tree.len(),
            loaded.screen
        );
        loaded
    }

    /// Load a dump from memory, using the configured screen size if any
    pub fn load_dump(&self, dump: &str) -> Result<Arc<LoadedHierarchy>> {
        self.load_dump_sized(dump, self.options.screen_size)
    }

    /// Load a dump from memory with an explicit coordinate space
    pub fn load_dump_sized(&self, dump: &str, screen: Option<ScreenSize>) -> Result<Arc<LoadedHierarchy>> {
        let tree = self.build(dump)?;
        Ok(self.swap(LoadedHierarchy {
            tree,
            screen,
            dump_path: None,
            screenshot_path: None,
        }))
    }

    /// Load a dump from memory, sized by a screenshot file when one is given
    pub fn load_dump_with_screenshot(&self, dump: &str, screenshot_path: Option<&Path>) -> Result<Arc<LoadedHierarchy>> {
        let screen = self.resolve_screen(screenshot_path)?;
        let tree = self.build(dump)?;
        Ok(self.swap(LoadedHierarchy {
            tree,
            screen,
            dump_path: None,
            screenshot_path: screenshot_path.map(Path::to_path_buf),
        }))
    }

    /// Screen size for a load: configured size first, then the screenshot header
    pub fn resolve_screen(&self, screenshot_path: Option<&Path>) -> Result<Option<ScreenSize>> {
        match (self.options.screen_size, screenshot_path) {
            (Some(size), _) => Ok(Some(size)),
            (None, Some(path)) => read_screen_size(path).map(Some),
            (None, None) => Ok(None),
        }
    }

    /// Load a dump file and, optionally, the screenshot defining its coordinate space
    pub fn load_files(&self, dump_path: impl AsRef<Path>, screenshot_path: Option<&Path>) -> Result<Arc<LoadedHierarchy>> {
        let dump_path = dump_path.as_ref();
        let dump = std::fs::read_to_string(dump_path).map_err(|source| InspectorError::Io {
            path: dump_path.to_path_buf(),
            source,
        })?;

        let screen = self.resolve_screen(screenshot_path)?;

        let tree = self.build(&dump)?;
        Ok(self.swap(LoadedHierarchy {
            tree,
            screen,
            dump_path: Some(dump_path.to_path_buf()),
            screenshot_path: screenshot_path.map(Path::to_path_buf),
        }))
    }

    /// The active hierarchy
    pub fn hierarchy(&self) -> Result<Arc<LoadedHierarchy>> {
        self.state().hierarchy.clone().ok_or(InspectorError::EmptyIndex)
    }

    pub fn is_loaded(&self) -> bool {
        self.state().hierarchy.is_some()
    }

    /// Focused element index
    pub fn current(&self) -> Option<usize> {
        self.state().navigator.current()
    }

    /// The active hierarchy and the focused index, read under one lock
    pub fn focused(&self) -> Result<(Arc<LoadedHierarchy>, Option<usize>)> {
        let state = self.state();
        let hierarchy = state.hierarchy.clone().ok_or(InspectorError::EmptyIndex)?;
        Ok((hierarchy, state.navigator.current()))
    }

    /// Hit test a screenshot point and focus the result; a miss clears focus
    pub fn element_at(&self, point: Point) -> Result<Option<Focus>> {
        let mut state = self.state();
        let hierarchy = state.hierarchy.clone().ok_or(InspectorError::EmptyIndex)?;

        let found = hierarchy.hit_tester().element_at(point);
        log::debug!("Hit test at ({}, {}): {:?}", point.x, point.y, found);

        match found {
            Some(index) => {
                state.navigator.select(index, hierarchy.tree.len())?;
                Ok(Some(Focus { hierarchy, index }))
            }
            None => {
                state.navigator.clear();
                Ok(None)
            }
        }
    }

    fn move_focus(&self, step: impl FnOnce(&mut Navigator, usize) -> Result<usize>) -> Result<Focus> {
        let mut state = self.state();
        let hierarchy = state.hierarchy.clone().ok_or(InspectorError::EmptyIndex)?;
        let index = step(&mut state.navigator, hierarchy.tree.len())?;
        Ok(Focus { hierarchy, index })
    }

    /// Focus the next element, wrapping around
    pub fn next(&self) -> Result<Focus> {
        self.move_focus(|nav, len| nav.next(len))
    }

    /// Focus the previous element, wrapping around
    pub fn previous(&self) -> Result<Focus> {
        self.move_focus(|nav, len| nav.previous(len))
    }

    /// Focus a specific element (e.g. picked in a tree view)
    pub fn select(&self, index: usize) -> Result<Focus> {
        self.move_focus(|nav, len| nav.select(index, len))
    }

    /// Everything the display layer needs for one element of the active hierarchy
    pub fn describe(&self, index: usize) -> Result<ElementView> {
        self.view(&*self.hierarchy()?, index)
    }

    /// Everything the display layer needs for one element of a given snapshot
    pub fn view(&self, hierarchy: &LoadedHierarchy, index: usize) -> Result<ElementView> {
        let node = hierarchy
            .tree
            .get(index)
            .ok_or_else(|| InspectorError::ElementNotFound(format!("No element with index {}", index)))?;

        Ok(ElementView {
            index,
            depth: node.depth,
            parent: node.parent,
            children: node.children.clone(),
            highlight: node
                .record
                .bounds
                .highlight(self.options.highlight_padding, hierarchy.screen),
            record: node.record.clone(),
        })
    }

    /// Get the tool registry
    pub fn tool_registry(&self) -> &ToolRegistry {
        &self.tool_registry
    }

    /// Execute a tool by name
    pub fn execute_tool(&self, name: &str, params: serde_json::Value) -> Result<ToolResult> {
        let mut context = ToolContext::new(self);
        self.tool_registry.execute(name, params, &mut context)
    }
}

impl Default for InspectorSession {
    fn default() -> Self {
        Self::new(InspectorOptions::default())
    }
}

/// Read the pixel dimensions from a screenshot's header
pub fn read_screen_size(path: &Path) -> Result<ScreenSize> {
    let (width, height) = image::image_dimensions(path)
        .map_err(|e| InspectorError::Screenshot(format!("{}: {}", path.display(), e)))?;
    Ok(ScreenSize::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"<?xml version='1.0' encoding='UTF-8' standalone='yes' ?>
<hierarchy rotation="0">
  <node index="0" class="android.widget.FrameLayout" bounds="[0,0][100,200]">
    <node index="0" class="android.widget.Button" text="OK" bounds="[0,0][100,50]" />
    <node index="1" class="android.widget.Button" resource-id="btn2" bounds="[0,50][100,100]" />
  </node>
</hierarchy>"#;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("uix-inspector-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_queries_before_load() {
        let session = InspectorSession::default();
        assert!(!session.is_loaded());
        assert!(matches!(session.hierarchy(), Err(InspectorError::EmptyIndex)));
        assert!(matches!(session.next(), Err(InspectorError::EmptyIndex)));
        assert!(matches!(session.previous(), Err(InspectorError::EmptyIndex)));
        assert!(matches!(session.element_at(Point::new(1, 1)), Err(InspectorError::EmptyIndex)));
        assert!(matches!(session.describe(0), Err(InspectorError::EmptyIndex)));
    }

    #[test]
    fn test_load_and_navigate() {
        let session = InspectorSession::default();
        let loaded = session.load_dump(DUMP).unwrap();
        assert_eq!(loaded.tree().len(), 3);

        assert_eq!(session.next().unwrap().index, 0);
        assert_eq!(session.next().unwrap().index, 1);
        assert_eq!(session.next().unwrap().index, 2);
        assert_eq!(session.next().unwrap().index, 0);
        assert_eq!(session.previous().unwrap().index, 2);
    }

    #[test]
    fn test_hit_moves_focus_and_miss_clears_it() {
        let session = InspectorSession::default();
        session.load_dump(DUMP).unwrap();

        assert_eq!(session.element_at(Point::new(10, 60)).unwrap().map(|f| f.index), Some(2));
        assert_eq!(session.current(), Some(2));
        assert_eq!(session.next().unwrap().index, 0);

        assert!(session.element_at(Point::new(500, 500)).unwrap().is_none());
        assert_eq!(session.current(), None);
        assert_eq!(session.previous().unwrap().index, 2);
    }

    #[test]
    fn test_failed_load_keeps_previous_hierarchy() {
        let session = InspectorSession::default();
        session.load_dump(DUMP).unwrap();
        session.select(1).unwrap();

        let err = session
            .load_dump(r#"<node class="A" bounds="[0,0][1,1]"/></node>"#)
            .unwrap_err();
        assert!(matches!(err, InspectorError::UnbalancedStructure(_)));

        let err = session.load_dump("not a dump").unwrap_err();
        assert!(matches!(err, InspectorError::MalformedDump { .. }));

        assert_eq!(session.hierarchy().unwrap().tree().len(), 3);
        assert_eq!(session.current(), Some(1));
    }

    #[test]
    fn test_reload_resets_focus() {
        let session = InspectorSession::default();
        session.load_dump(DUMP).unwrap();
        session.select(2).unwrap();

        session.load_dump(DUMP).unwrap();
        assert_eq!(session.current(), None);
    }

    #[test]
    fn test_snapshot_survives_reload() {
        let session = InspectorSession::default();
        let first = session.load_dump(DUMP).unwrap();
        session
            .load_dump(r#"<node class="Only" bounds="[0,0][1,1]"/>"#)
            .unwrap();

        assert_eq!(first.tree().len(), 3);
        assert_eq!(session.hierarchy().unwrap().tree().len(), 1);
    }

    #[test]
    fn test_focus_keeps_its_snapshot_across_reload() {
        let session = InspectorSession::default();
        session.load_dump(DUMP).unwrap();

        let focus = session.element_at(Point::new(10, 60)).unwrap().unwrap();
        session
            .load_dump(r#"<node class="Only" bounds="[0,0][1,1]"/>"#)
            .unwrap();

        assert_eq!(focus.index, 2);
        let view = session.view(&focus.hierarchy, focus.index).unwrap();
        assert_eq!(view.record.resource_id, "btn2");
        assert!(matches!(session.describe(2), Err(InspectorError::ElementNotFound(_))));
    }

    #[test]
    fn test_focused_reads_hierarchy_and_cursor_together() {
        let session = InspectorSession::default();
        assert!(matches!(session.focused(), Err(InspectorError::EmptyIndex)));

        session.load_dump(DUMP).unwrap();
        session.select(1).unwrap();
        let (hierarchy, current) = session.focused().unwrap();
        assert_eq!(hierarchy.tree().len(), 3);
        assert_eq!(current, Some(1));
    }

    #[test]
    fn test_inline_dump_keeps_screenshot_path() {
        let png_path = temp_path("inline.png");
        image::RgbImage::new(100, 200).save(&png_path).unwrap();

        let session = InspectorSession::default();
        let loaded = session
            .load_dump_with_screenshot(DUMP, Some(&png_path))
            .unwrap();
        assert_eq!(loaded.screen(), Some(ScreenSize::new(100, 200)));
        assert_eq!(loaded.screenshot_path(), Some(png_path.as_path()));
        assert!(loaded.dump_path().is_none());

        std::fs::remove_file(&png_path).ok();
    }

    #[test]
    fn test_describe() {
        let session = InspectorSession::new(InspectorOptions::new().screen_size(100, 200));
        session.load_dump(DUMP).unwrap();

        let view = session.describe(1).unwrap();
        assert_eq!(view.depth, 2);
        assert_eq!(view.parent, Some(0));
        assert_eq!(view.record.locator.indicator, "text=\"OK\"");
        assert_eq!(view.highlight, Bounds::new(0, 0, 100, 52));

        assert!(matches!(session.describe(9), Err(InspectorError::ElementNotFound(_))));
    }

    #[test]
    fn test_load_files_with_screenshot() {
        let dump_path = temp_path("dump.uix");
        let png_path = temp_path("shot.png");
        std::fs::write(&dump_path, DUMP).unwrap();
        image::RgbImage::new(100, 200).save(&png_path).unwrap();

        let session = InspectorSession::default();
        let loaded = session.load_files(&dump_path, Some(&png_path)).unwrap();
        assert_eq!(loaded.screen(), Some(ScreenSize::new(100, 200)));
        assert_eq!(loaded.dump_path(), Some(dump_path.as_path()));

        std::fs::remove_file(&dump_path).ok();
        std::fs::remove_file(&png_path).ok();
    }

    #[test]
    fn test_load_files_errors_leave_state() {
        let session = InspectorSession::default();
        session.load_dump(DUMP).unwrap();

        let err = session
            .load_files(temp_path("missing.uix"), None)
            .unwrap_err();
        assert!(matches!(err, InspectorError::Io { .. }));

        let dump_path = temp_path("ok.uix");
        std::fs::write(&dump_path, DUMP).unwrap();
        let err = session
            .load_files(&dump_path, Some(Path::new("/nonexistent/shot.png")))
            .unwrap_err();
        assert!(matches!(err, InspectorError::Screenshot(_)));
        std::fs::remove_file(&dump_path).ok();

        assert!(session.hierarchy().unwrap().dump_path().is_none());
    }
}
