//! Dump parser
//!
//! Turns a uiautomator hierarchy dump into a flat, document-ordered token
//! stream. Each element becomes an [`DumpToken::Open`] carrying its record;
//! paired elements are closed by a [`DumpToken::Close`]. Indentation and line
//! breaks are irrelevant: the scanner only follows tag markers.

use crate::error::{InspectorError, Result};
use crate::hierarchy::element::ElementRecord;
use crate::hierarchy::entities::decode_entities;
use indexmap::IndexMap;
use memchr::memchr;

/// Tag name uiautomator uses for elements
pub const DEFAULT_ELEMENT_TAG: &str = "node";

/// One structural marker of the dump
#[derive(Debug, Clone, PartialEq)]
pub enum DumpToken {
    /// Start of an element; self-closing elements never get a `Close`
    Open {
        record: ElementRecord,
        self_closing: bool,
        offset: usize,
    },
    /// End of the innermost open element
    Close { offset: usize },
}

/// Scanner for hierarchy dumps
#[derive(Debug, Clone)]
pub struct DumpParser {
    element_tag: String,
}

impl Default for DumpParser {
    fn default() -> Self {
        Self::new(DEFAULT_ELEMENT_TAG)
    }
}

impl DumpParser {
    /// Create a parser that treats `element_tag` as the element marker.
    /// Every other tag (`hierarchy`, declarations, comments) is skipped.
    pub fn new(element_tag: impl Into<String>) -> Self {
        Self {
            element_tag: element_tag.into(),
        }
    }

    pub fn element_tag(&self) -> &str {
        &self.element_tag
    }

    /// Tokenize a dump into document-ordered structural markers
    pub fn tokenize(&self, dump: &str) -> Result<Vec<DumpToken>> {
        let bytes = dump.as_bytes();
        let mut tokens = Vec::new();
        let mut elements = 0usize;
        let mut pos = 0;

        while let Some(rel) = memchr(b'<', &bytes[pos..]) {
            let start = pos + rel;
            let rest = &dump[start..];

            if rest.starts_with("<?") {
                pos = skip_past(dump, start, "?>")?;
                continue;
            }
            if rest.starts_with("<!--") {
                pos = skip_past(dump, start, "-->")?;
                continue;
            }
            if rest.starts_with("<!") {
                pos = tag_end(bytes, start)? + 1;
                continue;
            }

            let end = tag_end(bytes, start)?;

            if rest.starts_with("</") {
                let name = dump[start + 2..end].trim();
                if name.is_empty() {
                    return Err(InspectorError::malformed(start, "closing marker without a name"));
                }
                if name == self.element_tag {
                    tokens.push(DumpToken::Close { offset: start });
                }
                pos = end + 1;
                continue;
            }

            let self_closing = bytes[end - 1] == b'/';
            let inner_end = if self_closing { end - 1 } else { end };
            let inner = &dump[start + 1..inner_end];
            let name_len = inner
                .find(|c: char| c.is_ascii_whitespace())
                .unwrap_or(inner.len());
            let name = &inner[..name_len];

            if name.is_empty() {
                return Err(InspectorError::malformed(start, "expected an element name after '<'"));
            }

            if name == self.element_tag {
                let attributes = parse_attributes(&inner[name_len..], start + 1 + name_len)?;
                let record = ElementRecord::from_attributes(attributes)
                    .map_err(|reason| InspectorError::malformed(start, reason))?;
                tokens.push(DumpToken::Open {
                    record,
                    self_closing,
                    offset: start,
                });
                elements += 1;
            }

            pos = end + 1;
        }

        if elements == 0 {
            return Err(InspectorError::malformed(
                dump.len(),
                format!("no <{}> element found", self.element_tag),
            ));
        }

        log::debug!("Tokenized dump: {} elements, {} markers", elements, tokens.len());
        Ok(tokens)
    }

    /// Parse a dump into its element records in document order
    pub fn parse_records(&self, dump: &str) -> Result<Vec<ElementRecord>> {
        Ok(self
            .tokenize(dump)?
            .into_iter()
            .filter_map(|token| match token {
                DumpToken::Open { record, .. } => Some(record),
                DumpToken::Close { .. } => None,
            })
            .collect())
    }
}

/// Byte index of the `>` ending the tag opened at `start`, skipping quoted values
fn tag_end(bytes: &[u8], start: usize) -> Result<usize> {
    let mut quote: Option<u8> = None;

    for (i, &b) in bytes.iter().enumerate().skip(start + 1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'>' => return Ok(i),
                b'<' => return Err(InspectorError::malformed(i, "unexpected '<' inside a tag")),
                _ => {}
            },
        }
    }

    Err(InspectorError::malformed(start, "unterminated tag"))
}

fn skip_past(dump: &str, start: usize, terminator: &str) -> Result<usize> {
    dump[start..]
        .find(terminator)
        .map(|i| start + i + terminator.len())
        .ok_or_else(|| InspectorError::malformed(start, format!("missing '{}'", terminator)))
}

/// Split an attribute block into key/value pairs.
///
/// `offset` is the byte position of `input` within the dump, for errors.
pub fn parse_attributes(input: &str, offset: usize) -> Result<IndexMap<String, String>> {
    let bytes = input.as_bytes();
    let mut attrs = IndexMap::new();
    let mut pos = 0;

    let skip_ws = |mut p: usize| {
        while p < bytes.len() && bytes[p].is_ascii_whitespace() {
            p += 1;
        }
        p
    };

    loop {
        pos = skip_ws(pos);
        if pos >= bytes.len() {
            break;
        }

        let name_start = pos;
        while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() && bytes[pos] != b'=' {
            pos += 1;
        }
        let name = &input[name_start..pos];
        if name.is_empty() {
            return Err(InspectorError::malformed(offset + name_start, "expected an attribute name"));
        }

        pos = skip_ws(pos);
        if bytes.get(pos) != Some(&b'=') {
            return Err(InspectorError::malformed(
                offset + name_start,
                format!("attribute '{}' has no value", name),
            ));
        }
        pos = skip_ws(pos + 1);

        let quote = match bytes.get(pos) {
            Some(&q @ (b'"' | b'\'')) => q,
            _ => {
                return Err(InspectorError::malformed(
                    offset + pos,
                    format!("value of attribute '{}' is not quoted", name),
                ));
            }
        };
        let value_start = pos + 1;
        let value_end = memchr(quote, &bytes[value_start..])
            .map(|i| value_start + i)
            .ok_or_else(|| {
                InspectorError::malformed(
                    offset + pos,
                    format!("unterminated value for attribute '{}'", name),
                )
            })?;

        let value = decode_entities(&input[value_start..value_end]).into_owned();
        if attrs.insert(name.to_string(), value).is_some() {
            return Err(InspectorError::malformed(
                offset + name_start,
                format!("duplicate attribute '{}'", name),
            ));
        }

        pos = value_end + 1;
        if pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
            return Err(InspectorError::malformed(
                offset + pos,
                "expected whitespace between attributes",
            ));
        }
    }

    Ok(attrs)
}
