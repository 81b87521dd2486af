//! Path pattern matching.
//!
//! # Responsibilities
//! - Split request paths and route patterns into `/`-delimited segments
//! - Compare literal segments by exact string equality
//! - Bind `:name` capture segments to the request segment in the same position
//!
//! # Design Decisions
//! - Empty segments are dropped, so leading/trailing slashes are insignificant
//! - Segment counts must be equal (no wildcards, no optional segments)
//! - Captured values are taken verbatim: no decoding, no type coercion
//! - Matching is a pure function of its inputs

use std::collections::HashMap;
use std::fmt;

/// Parameters bound by capture segments, keyed by capture name.
pub type PathParams = HashMap<String, String>;

/// Splits a path into its non-empty segments.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// One segment of a compiled route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the request segment exactly.
    Literal(String),
    /// Binds the request segment under this name. The name may be empty.
    Capture(String),
}

/// Result of matching one request path against one pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMatch {
    pub matched: bool,
    pub params: PathParams,
}

impl PathMatch {
    fn miss() -> Self {
        Self::default()
    }
}

/// A route pattern compiled once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a pattern such as `/items/:id/claim`.
    ///
    /// Any segment with a leading `:` is a capture named by the remainder,
    /// including the degenerate `:` (empty name). Rejecting those is the
    /// route table's job, not the matcher's.
    pub fn parse(pattern: &str) -> Self {
        let segments = segments(pattern)
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => Segment::Capture(name.to_string()),
                None => Segment::Literal(segment.to_string()),
            })
            .collect();

        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    /// The pattern as declared.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of all capture segments, in declaration order.
    pub fn capture_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Capture(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Returns a copy of this pattern mounted under `prefix`.
    pub fn nested(&self, prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        if prefix.is_empty() {
            return self.clone();
        }
        Self::parse(&format!("{}/{}", prefix, self.raw.trim_start_matches('/')))
    }

    /// Match a concrete request path, returning the bound parameters.
    pub fn match_path(&self, request_path: &str) -> PathMatch {
        let request: Vec<&str> = segments(request_path).collect();
        if request.len() != self.segments.len() {
            return PathMatch::miss();
        }

        let mut params = PathParams::new();
        for (segment, value) in self.segments.iter().zip(request) {
            match segment {
                Segment::Capture(name) => {
                    params.insert(name.clone(), value.to_string());
                }
                Segment::Literal(literal) if literal == value => {}
                Segment::Literal(_) => return PathMatch::miss(),
            }
        }

        PathMatch {
            matched: true,
            params,
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Match `request_path` against an uncompiled `pattern`.
pub fn match_path(request_path: &str, pattern: &str) -> PathMatch {
    PathPattern::parse(pattern).match_path(request_path)
}
