use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TabError};

/// Segment separator for string-form paths, tolerating whitespace around `/`.
static SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*/\s*").unwrap());

/// A raw path-like value as it appears in tab configuration.
///
/// Either a single string (`"region/country"`, split on `/`) or an array of
/// already-split segments (`["region", "country"]`). Any other JSON value is
/// kept as `Malformed` and rejected by [`make_dim_path`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDimPath {
    Delimited(String),
    Segments(Vec<String>),
    Malformed(Value),
}

impl From<&str> for RawDimPath {
    fn from(s: &str) -> Self {
        RawDimPath::Delimited(s.to_string())
    }
}

impl From<Vec<&str>> for RawDimPath {
    fn from(segments: Vec<&str>) -> Self {
        RawDimPath::Segments(segments.into_iter().map(str::to_string).collect())
    }
}

/// A normalized hierarchical reference into a dataset's dimension schema.
///
/// Immutable once built. Two paths are equal iff their segment sequences are.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct DimPath {
    segments: Vec<String>,
}

impl DimPath {
    /// Build a path from segments. Each segment is trimmed; the sequence and
    /// every segment must be non-empty.
    pub fn new<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments: Vec<String> = segments
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .collect();

        if segments.is_empty() {
            return Err(TabError::InvalidPath("path has no segments".to_string()));
        }
        if let Some(pos) = segments.iter().position(|s| s.is_empty()) {
            return Err(TabError::InvalidPath(format!(
                "empty segment at position {pos}"
            )));
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false for a constructed path; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for DimPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl TryFrom<Vec<String>> for DimPath {
    type Error = TabError;

    fn try_from(segments: Vec<String>) -> Result<Self> {
        DimPath::new(segments)
    }
}

impl From<DimPath> for Vec<String> {
    fn from(path: DimPath) -> Self {
        path.segments
    }
}

/// Normalize a raw path-like value into a [`DimPath`].
pub fn make_dim_path(raw: &RawDimPath) -> Result<DimPath> {
    match raw {
        RawDimPath::Delimited(s) => {
            if s.trim().is_empty() {
                return Err(TabError::InvalidPath("empty path string".to_string()));
            }
            DimPath::new(SEPARATOR.split(s.trim()))
        }
        RawDimPath::Segments(segments) => DimPath::new(segments),
        RawDimPath::Malformed(value) => Err(TabError::InvalidPath(format!(
            "expected a string or an array of strings, got {value}"
        ))),
    }
}
