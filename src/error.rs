//! Unified error types for sbom-drift.
//!
//! Ingest is the only surfacing point for errors: everything downstream of
//! the parsers (normalizer, differ, policy evaluator) operates over
//! validated data and is total.

use std::path::PathBuf;
use thiserror::Error;

use crate::parsers::ParseError;

/// Main error type for sbom-drift operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SbomDriftError {
    /// An SBOM document could not be ingested.
    #[error("failed to parse {file}")]
    Parse {
        file: String,
        #[source]
        source: ParseError,
    },

    /// The policy document could not be decoded. Always fatal for the run.
    #[error("invalid policy document: {0}")]
    PolicyDecode(String),

    /// A report serializer failed to produce output.
    #[error("failed to render report: {0}")]
    Render(String),

    /// IO errors with path context.
    #[error("IO error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl SbomDriftError {
    /// Create a parse error with the originating file name.
    pub fn parse(file: impl Into<String>, source: ParseError) -> Self {
        Self::Parse {
            file: file.into(),
            source,
        }
    }

    /// Create an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = source.to_string();
        Self::Io {
            path,
            message,
            source,
        }
    }

    /// Create a policy decode error.
    pub fn policy(message: impl Into<String>) -> Self {
        Self::PolicyDecode(message.into())
    }
}

/// Convenient Result type for sbom-drift operations.
pub type Result<T> = std::result::Result<T, SbomDriftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_the_file() {
        let err = SbomDriftError::parse("before.json", ParseError::UnknownFormat);
        assert!(err.to_string().contains("before.json"));
    }

    #[test]
    fn io_error_names_the_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = SbomDriftError::io("/tmp/missing.json", io);
        assert!(err.to_string().contains("/tmp/missing.json"));
    }

    #[test]
    fn policy_error_is_fatal_variant() {
        let err = SbomDriftError::policy("unexpected token");
        assert!(matches!(err, SbomDriftError::PolicyDecode(_)));
    }
}
