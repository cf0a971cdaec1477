//! Error type shared by all procfs engines.

use std::io;

/// Error type for collection failures.
#[derive(Debug)]
pub enum CollectError {
    /// I/O error reading a statistics file.
    Io(io::Error),
    /// Parse error in a statistics file.
    Parse(String),
    /// A table section that was present at init is gone from the file.
    MissingSection(&'static str),
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Io(e) => write!(f, "I/O error: {}", e),
            CollectError::Parse(msg) => write!(f, "parse error: {}", msg),
            CollectError::MissingSection(section) => {
                write!(f, "section {} disappeared since init", section)
            }
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CollectError {
    fn from(e: io::Error) -> Self {
        CollectError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = CollectError::MissingSection("TcpExt");
        assert_eq!(err.to_string(), "section TcpExt disappeared since init");

        let err = CollectError::Parse("missing rpc line".into());
        assert_eq!(err.to_string(), "parse error: missing rpc line");
    }

    #[test]
    fn test_from_io() {
        let err: CollectError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, CollectError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
