//! `~~key~~` marker scanning, substitution and cleanup
//!
//! Markers are conditional insertion points in template text. A marker is the
//! literal delimiter `~~`, an identifier of one or more characters that are
//! neither `~` nor a line break, and a closing `~~`. Anything else (a single
//! `~`, `~~~~`, an unterminated `~~key`) is ordinary text.

use std::collections::BTreeMap;

/// Replacement text keyed by marker identifier
pub type PlaceholderMap = BTreeMap<String, String>;

const DELIMITER: &[u8; 2] = b"~~";

/// A marker located in a template string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker<'a> {
    /// Byte offset of the opening delimiter
    pub start: usize,
    /// Byte offset just past the closing delimiter
    pub end: usize,
    pub key: &'a str,
}

/// Iterator over the markers of a string, left to right, non-overlapping
pub struct Markers<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for Markers<'a> {
    type Item = Marker<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.text.as_bytes();
        while self.pos + 4 <= bytes.len() {
            let start = self.pos;
            if &bytes[start..start + 2] != DELIMITER {
                self.pos += 1;
                continue;
            }

            let key_start = start + 2;
            let key_end = bytes[key_start..]
                .iter()
                .position(|&b| b == b'~' || b == b'\n' || b == b'\r')
                .map_or(bytes.len(), |offset| key_start + offset);

            let closed = bytes[key_end..].starts_with(DELIMITER);
            if key_end > key_start && closed {
                self.pos = key_end + 2;
                return Some(Marker {
                    start,
                    end: key_end + 2,
                    // `~` is ASCII, so both offsets sit on char boundaries
                    key: &self.text[key_start..key_end],
                });
            }
            self.pos += 1;
        }
        None
    }
}

/// Scan `text` for markers.
///
/// Like a `~~(.*?)~~` regex scan, an identifier never spans a line break:
/// `~~x\ny~~` is two lines of ordinary text, not a marker.
pub fn markers(text: &str) -> Markers<'_> {
    Markers { text, pos: 0 }
}

fn rewrite<'m, F>(text: &str, mut replacement: F) -> String
where
    F: FnMut(&Marker<'_>) -> Option<&'m str>,
{
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    for marker in markers(text) {
        out.push_str(&text[copied..marker.start]);
        match replacement(&marker) {
            Some(value) => out.push_str(value),
            None => out.push_str(&text[marker.start..marker.end]),
        }
        copied = marker.end;
    }
    out.push_str(&text[copied..]);
    out
}

/// Replace every marker whose key is in `placeholders`.
///
/// Markers with no entry are left untouched so that a later pass (or
/// [`cleanup`]) can still act on them. Replacement text is not rescanned.
pub fn substitute(text: &str, placeholders: &PlaceholderMap) -> String {
    rewrite(text, |marker| placeholders.get(marker.key).map(String::as_str))
}

/// Remove every remaining marker.
///
/// Removing a marker can join the tildes on either side of it into a new
/// marker, so removal repeats until none remain.
pub fn cleanup(text: &str) -> String {
    let mut current = rewrite(text, |_| Some(""));
    while markers(&current).next().is_some() {
        current = rewrite(&current, |_| Some(""));
    }
    current
}

/// Substitute, then erase whatever markers are left
pub fn render(text: &str, placeholders: &PlaceholderMap) -> String {
    cleanup(&substitute(text, placeholders))
}
