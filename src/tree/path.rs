//! Dotted path grammar for addressing tree locations.
//!
//! A path is a `.`-joined sequence of segments. A segment made only of ASCII
//! digits is an index on a list and its literal text on a map; anything else
//! is a key (a map key, or a list child's `id`). The literal `root` may appear first and is consumed; paths without
//! it are scoped under the root anyway, so `statusLabel` and
//! `root.statusLabel` address the same node.

use crate::error::PathError;
use std::fmt;
use std::str::FromStr;

pub const ROOT_SEGMENT: &str = "root";

/// A single navigation step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    /// `raw` is the source text, so `007` stays `007` as a map key.
    Index { index: usize, raw: String },
}

impl Segment {
    /// Classify raw segment text. Digit-only text becomes an index.
    fn classify(raw: &str, path: &str) -> Result<Self, PathError> {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            raw.parse::<usize>()
                .map(|index| Segment::Index {
                    index,
                    raw: raw.to_string(),
                })
                .map_err(|e| PathError::MalformedPath {
                    path: path.to_string(),
                    reason: format!("index segment '{}' is not representable: {}", raw, e),
                })
        } else {
            Ok(Segment::Key(raw.to_string()))
        }
    }

    /// Index segment with canonical text.
    pub fn index(index: usize) -> Self {
        Segment::Index {
            index,
            raw: index.to_string(),
        }
    }

    /// Literal text of the segment; map lookups use this for both variants.
    pub fn text(&self) -> String {
        self.as_text().to_string()
    }

    pub fn as_text(&self) -> &str {
        match self {
            Segment::Key(k) => k,
            Segment::Index { raw, .. } => raw,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            Segment::Index { index, .. } => Some(*index),
            Segment::Key(_) => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_text())
    }
}

/// Parsed path. Keeps the source text for error reporting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    raw: String,
    segments: Vec<Segment>,
}

impl Path {
    /// The tree root (no segments).
    pub fn root() -> Self {
        Self {
            raw: ROOT_SEGMENT.to_string(),
            segments: Vec::new(),
        }
    }

    /// Single top-level key. Used by callers that already hold a key.
    pub fn key(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            raw: name.clone(),
            segments: vec![Segment::Key(name)],
        }
    }

    /// Parse an absolute path; a leading `root` is consumed.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        Self::parse_with(input, true)
    }

    /// Parse a path relative to some node (a dotted change key). `root` has no
    /// special meaning here.
    pub fn parse_relative(input: &str) -> Result<Self, PathError> {
        Self::parse_with(input, false)
    }

    fn parse_with(input: &str, absolute: bool) -> Result<Self, PathError> {
        if input.is_empty() {
            return Err(PathError::MalformedPath {
                path: input.to_string(),
                reason: "path is empty".to_string(),
            });
        }

        let mut segments = Vec::new();
        for (position, raw) in input.split('.').enumerate() {
            if raw.is_empty() {
                return Err(PathError::MalformedPath {
                    path: input.to_string(),
                    reason: format!("empty segment at position {}", position),
                });
            }
            if absolute && raw == ROOT_SEGMENT {
                if position == 0 {
                    continue;
                }
                return Err(PathError::MalformedPath {
                    path: input.to_string(),
                    reason: format!("'{}' may only appear as the first segment", ROOT_SEGMENT),
                });
            }
            segments.push(Segment::classify(raw, input)?);
        }

        Ok(Self {
            raw: input.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Source text as given by the caller.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Concatenate a relative path onto this one.
    pub fn join(&self, relative: &Path) -> Path {
        let mut segments = self.segments.clone();
        segments.extend(relative.segments.iter().cloned());
        Path {
            raw: format!("{}.{}", self.raw, relative.raw),
            segments,
        }
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
