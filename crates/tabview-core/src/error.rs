use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TabError {
    /// A raw path-like value that does not describe a non-empty path.
    InvalidPath(String),
    /// A keyed lookup (tab slug, data source id) that matched nothing.
    NotFound { kind: &'static str, key: String },
}

impl TabError {
    pub fn tab_not_found(slug: &str) -> Self {
        TabError::NotFound {
            kind: "tab",
            key: slug.to_string(),
        }
    }

    pub fn data_source_not_found(id: &str) -> Self {
        TabError::NotFound {
            kind: "data source",
            key: id.to_string(),
        }
    }
}

impl fmt::Display for TabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabError::InvalidPath(msg) => write!(f, "invalid dimension path: {msg}"),
            TabError::NotFound { kind, key } => write!(f, "{kind} '{key}' not found"),
        }
    }
}

impl std::error::Error for TabError {}

pub type Result<T> = std::result::Result<T, TabError>;
