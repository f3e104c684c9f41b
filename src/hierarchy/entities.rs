//! Entity decoding for attribute values
//!
//! Handles the predefined XML entities (`&lt; &gt; &amp; &quot; &apos;`) and
//! numeric character references (`&#123;`, `&#x7B;`). Unknown or malformed
//! references are kept verbatim.

use memchr::memchr;
use std::borrow::Cow;

/// Decode entity references, borrowing when the value contains none
pub fn decode_entities(input: &str) -> Cow<'_, str> {
    if memchr(b'&', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }

    let bytes = input.as_bytes();
    let mut result = String::with_capacity(input.len());
    let mut pos = 0;

    while let Some(amp) = memchr(b'&', &bytes[pos..]) {
        let amp = pos + amp;
        result.push_str(&input[pos..amp]);

        match memchr(b';', &bytes[amp..]) {
            Some(semi) => {
                let entity = &input[amp + 1..amp + semi];
                match decode_entity(entity) {
                    Some(ch) => {
                        result.push(ch);
                        pos = amp + semi + 1;
                    }
                    None => {
                        result.push('&');
                        pos = amp + 1;
                    }
                }
            }
            None => {
                result.push('&');
                pos = amp + 1;
            }
        }
    }

    result.push_str(&input[pos..]);
    Cow::Owned(result)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let numeric = entity.strip_prefix('#')?;
            let code = match numeric.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => numeric.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_entities_borrows() {
        let decoded = decode_entities("Settings");
        assert!(matches!(decoded, Cow::Borrowed("Settings")));
    }

    #[test]
    fn test_amp() {
        assert_eq!(decode_entities("Tom &amp; Jerry"), "Tom & Jerry");
    }

    #[test]
    fn test_named_entities() {
        assert_eq!(
            decode_entities("&lt;b&gt; &quot;x&quot; &apos;y&apos;"),
            "<b> \"x\" 'y'"
        );
    }

    #[test]
    fn test_numeric_references() {
        assert_eq!(decode_entities("&#65;&#x42;&#X43;"), "ABC");
        assert_eq!(decode_entities("line&#10;break"), "line\nbreak");
    }

    #[test]
    fn test_unknown_and_dangling_kept() {
        assert_eq!(decode_entities("&nbsp; &"), "&nbsp; &");
        assert_eq!(decode_entities("a & b &amp; c"), "a & b & c");
        assert_eq!(decode_entities("&#xZZ;"), "&#xZZ;");
    }
}
