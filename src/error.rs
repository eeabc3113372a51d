//! Error types for document editing, import and export.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from a schema-tree edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("name conflict at {path}: '{name}' already exists")]
    NameConflict { path: String, name: String },

    #[error("empty name at {path}")]
    EmptyName { path: String },

    #[error("invalid node path '{path}': {message}")]
    InvalidPath { path: String, message: String },
}

impl EditError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Validation failures raised before the document is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("project title must not be empty")]
    EmptyTitle,

    #[error("path must not be empty")]
    EmptyPath,

    #[error("path '{path}' must start with '/'")]
    MissingLeadingSlash { path: String },

    #[error("unknown HTTP method \"{value}\"")]
    UnknownMethod { value: String },

    #[error("unknown auth \"{value}\": expected none, api-key, bearer, basic, or oauth2")]
    UnknownAuth { value: String },

    #[error("unknown kind \"{value}\": expected string, number, boolean, integer, array, or object")]
    UnknownKind { value: String },

    #[error("no operation {method} {path}")]
    OperationNotFound { method: String, path: String },

    #[error("model name must not be empty")]
    EmptyModelName,

    #[error("query parameter name must not be empty")]
    EmptyParameterName,

    #[error("no model named '{name}'")]
    ModelNotFound { name: String },

    #[error(transparent)]
    Edit(#[from] EditError),
}

impl DocumentError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors while importing a document.
#[derive(Debug, Error)]
pub enum ImportError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parse errors (exit code 2)
    #[error("unsupported file extension for {path}: expected .json, .yaml, or .yml")]
    UnsupportedExtension { path: PathBuf },

    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("not an OpenAPI document: missing {field}")]
    MissingField { field: String },

    #[error("invalid {field}: {source}")]
    InvalidField {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported construct at {path}: {message}")]
    Unsupported { path: String, message: String },
}

impl ImportError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ImportError::FileNotFound { .. } | ImportError::ReadError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors while exporting a document.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot serialize document: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ExportError::Serialize { .. } => 2,
            ExportError::WriteError { .. } => 3,
        }
    }
}
