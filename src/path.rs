//! A canonical, type-safe representation of a dotted attribute path.
//!
//! Paths are split eagerly and keep the byte span of every segment so that
//! diagnostics can point at the exact attribute that failed to resolve.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default segment separator.
pub const DEFAULT_SEPARATOR: char = '.';

/// Byte range of a segment inside the original path text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// One attribute name between separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    pub span: Span,
}

impl Segment {
    /// Empty names never resolve to an attribute.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

/// A parsed path. Never empty: `""` parses to a single empty segment.
///
/// # Examples
///
/// ```rust
/// use modkit::path::Path;
/// let p = Path::parse("party.leader.hp");
/// assert_eq!(p.len(), 3);
/// assert_eq!(p.final_segment().name, "hp");
/// assert_eq!(p.to_string(), "party.leader.hp");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    source: String,
    separator: char,
    segments: Vec<Segment>,
}

impl Path {
    /// Splits `text` on `.`.
    pub fn parse(text: &str) -> Self {
        Self::parse_with(text, DEFAULT_SEPARATOR)
    }

    /// Splits `text` on `separator`, recording segment spans.
    pub fn parse_with(text: &str, separator: char) -> Self {
        let mut segments = Vec::new();
        let mut start = 0;
        for part in text.split(separator) {
            let end = start + part.len();
            segments.push(Segment {
                name: part.to_string(),
                span: Span { start, end },
            });
            start = end + separator.len_utf8();
        }
        Self {
            source: text.to_string(),
            separator,
            segments,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn final_segment(&self) -> &Segment {
        // `str::split` always yields at least one item.
        &self.segments[self.segments.len() - 1]
    }

    /// The text this path was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn separator(&self) -> char {
        self.separator
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", self.separator)?;
            }
            write!(f, "{}", segment.name)?;
        }
        Ok(())
    }
}

impl From<&str> for Path {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}
