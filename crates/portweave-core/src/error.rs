//! Error types for portweave

use thiserror::Error;

/// Core portweave errors
#[derive(Error, Debug)]
pub enum WeaveError {
    // Addressing errors
    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Ambiguous selector: `{0}`")]
    AmbiguousSelector(String),

    #[error("Selector `{selector}` expands to more than {limit} identifiers")]
    ExpansionLimit { selector: String, limit: usize },

    #[error("Identifier arity mismatch: expected {expected} levels, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    // Structural errors
    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    #[error("Fan-in: {to} already receives from {existing}, cannot also receive from {from}")]
    FanIn {
        from: String,
        to: String,
        existing: String,
    },

    #[error("Interface selectors are not disjoint: {0}")]
    Disjointness(String),

    #[error("Direction error: {0}")]
    Direction(String),

    #[error("Cannot assign value: {0}")]
    ValueShape(String),

    #[error("Pattern requires at least two interfaces, got {0}")]
    TooFewInterfaces(usize),

    // Lookup errors
    #[error("Unknown port: {0}")]
    UnknownPort(String),

    #[error("Unknown interface: {0}")]
    UnknownInterface(i64),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    // Adapter errors
    #[error("Malformed table: {0}")]
    MalformedTable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Flat error category, for callers that only branch on the kind of failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Addressing,
    AmbiguousSelector,
    DuplicateIdentifier,
    FanIn,
    Disjointness,
    Direction,
    ValueShape,
    Lookup,
    Adapter,
}

impl WeaveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WeaveError::InvalidSelector { .. } | WeaveError::ArityMismatch { .. } => {
                ErrorKind::Addressing
            }
            WeaveError::AmbiguousSelector(_) | WeaveError::ExpansionLimit { .. } => {
                ErrorKind::AmbiguousSelector
            }
            WeaveError::DuplicateIdentifier(_) => ErrorKind::DuplicateIdentifier,
            WeaveError::FanIn { .. } => ErrorKind::FanIn,
            WeaveError::Disjointness(_) => ErrorKind::Disjointness,
            WeaveError::Direction(_) => ErrorKind::Direction,
            WeaveError::ValueShape(_) | WeaveError::TooFewInterfaces(_) => ErrorKind::ValueShape,
            WeaveError::UnknownPort(_)
            | WeaveError::UnknownInterface(_)
            | WeaveError::UnknownColumn(_) => ErrorKind::Lookup,
            WeaveError::MalformedTable(_) | WeaveError::Io(_) => ErrorKind::Adapter,
        }
    }
}

/// Result type for portweave operations
pub type WeaveResult<T> = Result<T, WeaveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = WeaveError::FanIn {
            from: "/a[1]".into(),
            to: "/b[0]".into(),
            existing: "/a[0]".into(),
        };
        assert_eq!(err.kind(), ErrorKind::FanIn);
        assert!(err.to_string().contains("/b[0]"));

        let io = WeaveError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.kind(), ErrorKind::Adapter);
        assert_eq!(io.to_string(), "gone");
    }
}
