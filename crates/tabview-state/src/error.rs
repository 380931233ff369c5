use std::fmt;

use tabview_core::TabError;

#[derive(Clone, Debug, PartialEq)]
pub enum StateError {
    Tab(TabError),
    /// A node read itself (directly or through other nodes) for the same parameter.
    Cycle { node: &'static str },
    /// A handle used on a graph other than the one that registered it.
    ForeignHandle { node: &'static str },
    /// A value was demanded from a node that is still waiting on a root write.
    NotReady { node: &'static str },
    InvalidData(String),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::Tab(e) => write!(f, "{e}"),
            StateError::Cycle { node } => write!(f, "dependency cycle through '{node}'"),
            StateError::ForeignHandle { node } => {
                write!(f, "'{node}' is not registered on this graph")
            }
            StateError::NotReady { node } => write!(f, "'{node}' has no value yet"),
            StateError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StateError::Tab(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TabError> for StateError {
    fn from(e: TabError) -> Self {
        StateError::Tab(e)
    }
}

pub type Result<T> = std::result::Result<T, StateError>;
