//! Error type shared across the crate.

use std::io;

use thiserror::Error;

/// Result type for genfs operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors from registration, resolution and generator callbacks.
///
/// `NotExist` doubles as a control signal: a generator returning it declines
/// to produce the target, and the resolver falls through to the next source.
/// Use [`Error::is_not_exist`] rather than matching directly, since the
/// variant may be wrapped in operation context or an `anyhow` chain.
#[derive(Debug, Error)]
pub enum Error {
    #[error("file does not exist: {0}")]
    NotExist(String),
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("path is already a file: {0}")]
    AlreadyFile(String),
    #[error("path is already a directory: {0}")]
    AlreadyDirectory(String),
    #[error("is a directory: {0}")]
    IsDirectory(String),
    #[error("not a directory: {0}")]
    NotDirectory(String),
    #[error("{path}: expected one generator, found {count}")]
    GeneratorCount { path: String, count: usize },
    #[error("genfs: {op} {path:?}. {source}")]
    Op {
        op: &'static str,
        path: String,
        #[source]
        source: Box<Error>,
    },
    /// An arbitrary error raised by a user callback.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Wrap an error with operation context: `genfs: <op> <path>. <cause>`.
    pub(crate) fn op(op: &'static str, path: &str, source: Error) -> Self {
        Error::Op {
            op,
            path: path.to_string(),
            source: Box::new(source),
        }
    }

    /// True if the error is, or wraps, a missing-target error.
    pub fn is_not_exist(&self) -> bool {
        match self {
            Error::NotExist(_) => true,
            Error::Op { source, .. } => source.is_not_exist(),
            Error::Other(err) => err.chain().any(|cause| {
                cause
                    .downcast_ref::<Error>()
                    .is_some_and(|e| e.is_not_exist())
            }),
            _ => false,
        }
    }

    /// True if the error is, or wraps, a malformed path or an illegal
    /// registration transition.
    pub fn is_invalid(&self) -> bool {
        match self {
            Error::InvalidPath(_)
            | Error::AlreadyFile(_)
            | Error::AlreadyDirectory(_)
            | Error::GeneratorCount { .. } => true,
            Error::Op { source, .. } => source.is_invalid(),
            _ => false,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Error::NotExist(err.to_string()),
            io::ErrorKind::IsADirectory => Error::IsDirectory(err.to_string()),
            io::ErrorKind::NotADirectory => Error::NotDirectory(err.to_string()),
            io::ErrorKind::InvalidInput => Error::InvalidPath(err.to_string()),
            _ => Error::Other(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_exist_pierces_context() {
        let err = Error::op("open", "a.txt", Error::NotExist("a.txt".into()));
        assert!(err.is_not_exist());
        assert!(!err.is_invalid());
        assert_eq!(
            err.to_string(),
            "genfs: open \"a.txt\". file does not exist: a.txt"
        );
    }

    #[test]
    fn not_exist_pierces_anyhow_chains() {
        let inner = Error::NotExist("b.txt".into());
        let err = Error::Other(anyhow::Error::new(inner).context("while generating"));
        assert!(err.is_not_exist());
    }

    #[test]
    fn invalid_classification() {
        assert!(Error::InvalidPath("//".into()).is_invalid());
        assert!(Error::AlreadyFile("a".into()).is_invalid());
        assert!(Error::op("open", "x", Error::InvalidPath("x".into())).is_invalid());
        assert!(!Error::NotExist("x".into()).is_invalid());
    }

    #[test]
    fn io_error_mapping() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(err.is_not_exist());
        let err: Error = io::Error::new(io::ErrorKind::PermissionDenied, "nope").into();
        assert!(!err.is_not_exist());
    }
}
