//! Error taxonomy for request loading, compilation, packaging and download.

use serde::Serialize;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// One rejected input field, addressed by a dotted path such as
/// `tables[1].properties[0].name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Rejected before any job exists
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("No valid tables provided. Each table needs a name and at least one property.")]
    NoValidTables,

    #[error("Request has {} invalid field(s)", .0.len())]
    InvalidRequest(Vec<FieldError>),
}

impl ValidationError {
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ValidationError::NoValidTables => &[],
            ValidationError::InvalidRequest(errors) => errors,
        }
    }
}

/// Failure inside a job's background unit of work
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to render artifact: {0}")]
    Format(#[from] fmt::Error),

    #[error("Failed to create archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Failed to walk staging tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Generation task failed: {0}")]
    Task(String),
}

impl GenerationError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        GenerationError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Invalid file name")]
    InvalidName,

    #[error("File not found")]
    NotFound,

    #[error("Failed to read package: {0}")]
    Io(#[from] io::Error),
}

/// Failure reading a request file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse YAML request: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON request: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported request format '{0}' (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ValidationError::InvalidRequest(vec![
            FieldError::new("root_namespace", "is required"),
            FieldError::new("tables[0].name", "is not a valid identifier"),
        ]);
        assert_eq!(err.to_string(), "Request has 2 invalid field(s)");
        assert_eq!(err.field_errors()[1].to_string(), "tables[0].name: is not a valid identifier");
        assert!(ValidationError::NoValidTables.field_errors().is_empty());

        let io = GenerationError::io("/tmp/x", io::Error::new(io::ErrorKind::Other, "boom"));
        assert_eq!(io.to_string(), "I/O error at /tmp/x: boom");
    }
}
