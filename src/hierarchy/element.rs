use crate::hierarchy::locator::ElementLocator;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ATTR_CLASS: &str = "class";
pub const ATTR_TEXT: &str = "text";
pub const ATTR_CONTENT_DESC: &str = "content-desc";
pub const ATTR_RESOURCE_ID: &str = "resource-id";
pub const ATTR_BOUNDS: &str = "bounds";
pub const ATTR_INDEX: &str = "index";

const WIDGET_PREFIX: &str = "android.widget.";

/// One UI element parsed from a hierarchy dump
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementRecord {
    /// Widget class name (e.g., "android.widget.Button")
    #[serde(default)]
    pub class: String,

    /// Visible text, empty when the element has none
    #[serde(default)]
    pub text: String,

    /// Accessibility description, empty when the element has none
    #[serde(default)]
    pub content_desc: String,

    /// Resource id, empty when the element has none
    #[serde(default)]
    pub resource_id: String,

    /// Screen-space rectangle in screenshot pixels
    pub bounds: Bounds,

    /// Sibling position reported by the dump (0-based)
    #[serde(default)]
    pub index: usize,

    /// Every attribute of the element in document order, entity-decoded
    #[serde(default)]
    pub attributes: IndexMap<String, String>,

    /// Locators computed once the whole hierarchy is known
    #[serde(default)]
    pub locator: ElementLocator,
}

/// Axis-aligned rectangle, written `[left,top][right,bottom]` in dumps
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// A pixel position in screenshot coordinates
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Pixel dimensions of the screenshot that defines the coordinate space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ElementRecord {
    /// Create a new ElementRecord with the given class and empty bounds
    pub fn new(class: impl Into<String>) -> Self {
        let mut record = Self {
            class: String::new(),
            text: String::new(),
            content_desc: String::new(),
            resource_id: String::new(),
            bounds: Bounds::default(),
            index: 0,
            attributes: IndexMap::new(),
            locator: ElementLocator::default(),
        };
        record.set_class(class);
        record
    }

    /// Build a record from the attribute list of one dump element.
    ///
    /// `bounds` is mandatory; `index` defaults to 0 when absent. Every
    /// attribute is retained in `attributes`, known ones included.
    pub fn from_attributes(attributes: IndexMap<String, String>) -> Result<Self, String> {
        let raw_bounds = attributes
            .get(ATTR_BOUNDS)
            .ok_or_else(|| "element has no bounds attribute".to_string())?;
        let bounds = raw_bounds
            .parse::<Bounds>()
            .map_err(|e| format!("invalid bounds '{}': {}", raw_bounds, e))?;

        let index = match attributes.get(ATTR_INDEX) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| format!("invalid index '{}'", raw))?,
            None => 0,
        };

        let field = |key: &str| attributes.get(key).cloned().unwrap_or_default();

        Ok(Self {
            class: field(ATTR_CLASS),
            text: field(ATTR_TEXT),
            content_desc: field(ATTR_CONTENT_DESC),
            resource_id: field(ATTR_RESOURCE_ID),
            bounds,
            index,
            locator: ElementLocator::default(),
            attributes,
        })
    }

    /// Builder method: set text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self.attributes.insert(ATTR_TEXT.to_string(), self.text.clone());
        self
    }

    /// Builder method: set content description
    pub fn with_content_desc(mut self, desc: impl Into<String>) -> Self {
        self.content_desc = desc.into();
        self.attributes
            .insert(ATTR_CONTENT_DESC.to_string(), self.content_desc.clone());
        self
    }

    /// Builder method: set resource id
    pub fn with_resource_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = id.into();
        self.attributes
            .insert(ATTR_RESOURCE_ID.to_string(), self.resource_id.clone());
        self
    }

    /// Builder method: set bounds
    pub fn with_bounds(mut self, left: i32, top: i32, right: i32, bottom: i32) -> Self {
        self.bounds = Bounds::new(left, top, right, bottom);
        self.attributes
            .insert(ATTR_BOUNDS.to_string(), self.bounds.to_string());
        self
    }

    /// Builder method: set sibling index
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self.attributes.insert(ATTR_INDEX.to_string(), index.to_string());
        self
    }

    fn set_class(&mut self, class: impl Into<String>) {
        self.class = class.into();
        self.attributes.insert(ATTR_CLASS.to_string(), self.class.clone());
    }

    /// Get attribute value by key
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Read a boolean-ish attribute such as `clickable` or `checked`
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.attribute(key)? {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    /// Class name without the `android.widget.` package prefix
    pub fn short_class(&self) -> &str {
        self.class
            .rsplit(WIDGET_PREFIX)
            .next()
            .unwrap_or(&self.class)
    }

    /// One-line label used by tree views:
    /// `(index) ShortClass<sep>text {desc}  bounds`
    pub fn tree_label(&self) -> String {
        let sep = if self.class.contains("android.widget.TextView") { ":" } else { " " };
        let desc = if self.content_desc.is_empty() {
            String::new()
        } else {
            format!(" {{{}}} ", self.content_desc)
        };

        format!(
            "({}) {}{}{}{} {}",
            self.index,
            self.short_class(),
            sep,
            self.text,
            desc,
            self.bounds
        )
    }

    /// Property table: parsed attributes in document order, then derived locators
    pub fn properties(&self) -> Vec<(String, String)> {
        let mut props: Vec<(String, String)> = self
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        props.push(("relative_path".to_string(), self.locator.relative_path.clone()));
        props.push(("absolute_path".to_string(), self.locator.absolute_path.clone()));
        props.push((
            "selector_expression".to_string(),
            self.locator.selector_expression.clone(),
        ));
        props.push(("indicator".to_string(), self.locator.indicator.clone()));
        props
    }
}

impl Bounds {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn width(&self) -> u32 {
        self.right.abs_diff(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.abs_diff(self.top)
    }

    /// Area in square pixels
    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// Inclusive containment on all four edges
    pub fn contains(&self, point: Point) -> bool {
        self.left <= point.x && point.x <= self.right && self.top <= point.y && point.y <= self.bottom
    }

    /// Overlay rectangle: grown by `padding` on every side, clipped to the
    /// screenshot when its size is known and never negative.
    pub fn highlight(&self, padding: i32, screen: Option<ScreenSize>) -> Bounds {
        let mut rect = Bounds::new(
            (self.left - padding).max(0),
            (self.top - padding).max(0),
            self.right + padding,
            self.bottom + padding,
        );

        if let Some(screen) = screen {
            let max_x = i32::try_from(screen.width).unwrap_or(i32::MAX);
            let max_y = i32::try_from(screen.height).unwrap_or(i32::MAX);
            rect.right = rect.right.min(max_x);
            rect.bottom = rect.bottom.min(max_y);
        }

        rect
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}][{},{}]", self.left, self.top, self.right, self.bottom)
    }
}

impl FromStr for Bounds {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let inner = s
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| "expected [left,top][right,bottom]".to_string())?;

        let (first, second) = inner
            .split_once("][")
            .ok_or_else(|| "expected two corners".to_string())?;

        let corner = |part: &str| -> Result<(i32, i32), String> {
            let (x, y) = part
                .split_once(',')
                .ok_or_else(|| format!("corner '{}' is not x,y", part))?;
            let x = x.trim().parse::<i32>().map_err(|e| e.to_string())?;
            let y = y.trim().parse::<i32>().map_err(|e| e.to_string())?;
            Ok((x, y))
        };

        let (left, top) = corner(first)?;
        let (right, bottom) = corner(second)?;

        if right < left || bottom < top {
            return Err("right/bottom edge lies before left/top edge".to_string());
        }

        Ok(Bounds { left, top, right, bottom })
    }
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl ScreenSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_attributes() {
        let record = ElementRecord::from_attributes(attrs(&[
            ("index", "2"),
            ("text", "OK"),
            ("resource-id", "com.app:id/ok"),
            ("class", "android.widget.Button"),
            ("content-desc", ""),
            ("checkable", "false"),
            ("bounds", "[0,10][100,60]"),
        ]))
        .unwrap();

        assert_eq!(record.class, "android.widget.Button");
        assert_eq!(record.text, "OK");
        assert_eq!(record.resource_id, "com.app:id/ok");
        assert_eq!(record.content_desc, "");
        assert_eq!(record.index, 2);
        assert_eq!(record.bounds, Bounds::new(0, 10, 100, 60));
        assert_eq!(record.flag("checkable"), Some(false));
        assert_eq!(record.attributes.len(), 7);
    }

    #[test]
    fn test_from_attributes_requires_bounds() {
        let err = ElementRecord::from_attributes(attrs(&[("class", "View")])).unwrap_err();
        assert!(err.contains("bounds"));
    }

    #[test]
    fn test_from_attributes_rejects_bad_index() {
        let err = ElementRecord::from_attributes(attrs(&[
            ("index", "first"),
            ("bounds", "[0,0][1,1]"),
        ]))
        .unwrap_err();
        assert!(err.contains("index"));
    }

    #[test]
    fn test_bounds_parse_and_display() {
        let bounds: Bounds = "[12,34][560,780]".parse().unwrap();
        assert_eq!(bounds, Bounds::new(12, 34, 560, 780));
        assert_eq!(bounds.to_string(), "[12,34][560,780]");
        assert_eq!(bounds.width(), 548);
        assert_eq!(bounds.height(), 746);
    }

    #[test]
    fn test_bounds_parse_rejects_inverted() {
        assert!("[100,0][0,10]".parse::<Bounds>().is_err());
        assert!("[0,0]".parse::<Bounds>().is_err());
        assert!("0,0,1,1".parse::<Bounds>().is_err());
        assert!("[a,0][1,1]".parse::<Bounds>().is_err());
    }

    #[test]
    fn test_bounds_contains_is_inclusive() {
        let bounds = Bounds::new(10, 10, 20, 20);
        assert!(bounds.contains(Point::new(10, 10)));
        assert!(bounds.contains(Point::new(20, 20)));
        assert!(bounds.contains(Point::new(15, 12)));
        assert!(!bounds.contains(Point::new(21, 15)));
        assert!(!bounds.contains(Point::new(15, 9)));
    }

    #[test]
    fn test_bounds_area() {
        assert_eq!(Bounds::new(0, 0, 1080, 1920).area(), 2_073_600);
        assert_eq!(Bounds::new(5, 5, 5, 40).area(), 0);
    }

    #[test]
    fn test_highlight_is_padded_and_clamped() {
        let screen = ScreenSize::new(100, 200);
        let rect = Bounds::new(1, 50, 99, 199).highlight(2, Some(screen));
        assert_eq!(rect, Bounds::new(0, 48, 100, 200));

        let unclamped = Bounds::new(1, 50, 99, 199).highlight(2, None);
        assert_eq!(unclamped, Bounds::new(0, 48, 101, 201));
    }

    #[test]
    fn test_tree_label() {
        let text_view = ElementRecord::new("android.widget.TextView")
            .with_text("Wi-Fi")
            .with_bounds(0, 0, 10, 10)
            .with_index(1);
        assert_eq!(text_view.tree_label(), "(1) TextView:Wi-Fi [0,0][10,10]");

        let image = ElementRecord::new("android.widget.ImageButton")
            .with_content_desc("Back")
            .with_bounds(0, 0, 48, 48);
        assert_eq!(image.tree_label(), "(0) ImageButton  {Back}  [0,0][48,48]");

        let custom = ElementRecord::new("com.example.Chip").with_bounds(0, 0, 1, 1);
        assert_eq!(custom.tree_label(), "(0) com.example.Chip  [0,0][1,1]");
    }

    #[test]
    fn test_properties_end_with_locators() {
        let mut record = ElementRecord::new("android.view.View").with_bounds(0, 0, 1, 1);
        record.locator.indicator = "className=\"android.view.View\"".to_string();

        let props = record.properties();
        let keys: Vec<_> = props.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "class",
                "bounds",
                "relative_path",
                "absolute_path",
                "selector_expression",
                "indicator"
            ]
        );
        assert_eq!(props.last().unwrap().1, "className=\"android.view.View\"");
    }

    #[test]
    fn test_serialization() {
        let record = ElementRecord::new("android.widget.Button")
            .with_text("Go")
            .with_bounds(1, 2, 3, 4);

        let json = serde_json::to_string(&record).unwrap();
        let deserialized: ElementRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record, deserialized);
    }
}
