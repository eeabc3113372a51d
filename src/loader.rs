//! Document import and export.
//!
//! Handles reading project documents from files and strings, and writing
//! them back as OpenAPI JSON.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::document::ProjectDocument;
use crate::error::{ExportError, ImportError};
use crate::types::{ExportOptions, ImportOptions, EXPORT_FILE_SUFFIX, IMPORT_EXTENSIONS};
use crate::wire::{self, OpenApiDocument};

/// Import a document from a file path.
///
/// # Errors
///
/// Returns `ImportError::FileNotFound` if the file doesn't exist,
/// `ImportError::UnsupportedExtension` for anything but `.json`, `.yaml`
/// or `.yml`, or a decoding error from [`import_str`].
pub fn import_file(path: &Path, options: &ImportOptions) -> Result<ProjectDocument, ImportError> {
    if !path.exists() {
        return Err(ImportError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if !has_import_extension(path) {
        return Err(ImportError::UnsupportedExtension {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| ImportError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    let doc = import_str(&content, options)?;
    log::info!("imported '{}' from {}", doc.info.title, path.display());
    Ok(doc)
}

/// Import a document from a JSON string.
///
/// # Errors
///
/// Returns `ImportError::InvalidJson` if the string isn't valid JSON,
/// `ImportError::MissingField` if it isn't an OpenAPI document, or
/// `ImportError::Unsupported` in strict mode.
pub fn import_str(content: &str, options: &ImportOptions) -> Result<ProjectDocument, ImportError> {
    let value: Value =
        serde_json::from_str(content).map_err(|source| ImportError::InvalidJson { source })?;
    wire::document_from_value(&value, options)
}

/// Check if a path carries one of the accepted import extensions.
pub fn has_import_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMPORT_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
}

/// Serialize a document to OpenAPI JSON.
///
/// # Errors
///
/// Returns `ExportError::Serialize` if serialization fails.
pub fn export_string(doc: &ProjectDocument, options: &ExportOptions) -> Result<String, ExportError> {
    let wire = OpenApiDocument::from(doc);
    let result = if options.compact {
        serde_json::to_string(&wire)
    } else {
        serde_json::to_string_pretty(&wire)
    };
    result.map_err(|source| ExportError::Serialize { source })
}

/// File name a document is exported under: the title lower-cased with
/// whitespace runs replaced by `-`, plus `-openapi.json`.
pub fn export_file_name(title: &str) -> String {
    let stem = title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    format!("{}{}", stem, EXPORT_FILE_SUFFIX)
}

/// Write a document into `dir` under its derived file name.
///
/// # Errors
///
/// Returns `ExportError::Serialize` or `ExportError::WriteError`.
pub fn export_to(doc: &ProjectDocument, dir: &Path, options: &ExportOptions) -> Result<PathBuf, ExportError> {
    let path = dir.join(export_file_name(&doc.info.title));
    write_document(doc, &path, options)?;
    Ok(path)
}

/// Write a document to an exact path.
///
/// # Errors
///
/// Returns `ExportError::Serialize` or `ExportError::WriteError`.
pub fn write_document(doc: &ProjectDocument, path: &Path, options: &ExportOptions) -> Result<(), ExportError> {
    let mut content = export_string(doc, options)?;
    content.push('\n');
    std::fs::write(path, content).map_err(|source| ExportError::WriteError {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("exported '{}' to {}", doc.info.title, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::OperationDraft;
    use crate::types::{AuthKind, Method};
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile, TempDir};

    fn json_file(content: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn import_file_valid() {
        let file = json_file(r#"{"openapi": "3.0.0", "info": {"title": "Shop", "version": "2.1.0"}}"#);
        let doc = import_file(file.path(), &ImportOptions::new()).unwrap();
        assert_eq!(doc.info.title, "Shop");
        assert_eq!(doc.info.version, "2.1.0");
        assert!(doc.paths().is_empty());
    }

    #[test]
    fn import_file_not_found() {
        let result = import_file(Path::new("/nonexistent/api.json"), &ImportOptions::new());
        assert!(matches!(result, Err(ImportError::FileNotFound { .. })));
    }

    #[test]
    fn import_file_rejects_extension() {
        let mut file = Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "{{}}").unwrap();
        let result = import_file(file.path(), &ImportOptions::new());
        assert!(matches!(result, Err(ImportError::UnsupportedExtension { .. })));
    }

    #[test]
    fn import_file_yaml_extension_reads_json() {
        let mut file = Builder::new().suffix(".YML").tempfile().unwrap();
        writeln!(file, r#"{{"openapi": "3.0.0", "info": {{"title": "Y"}}}}"#).unwrap();
        let doc = import_file(file.path(), &ImportOptions::new()).unwrap();
        assert_eq!(doc.info.title, "Y");
    }

    #[test]
    fn import_file_invalid_json() {
        let file = json_file("not valid json");
        let result = import_file(file.path(), &ImportOptions::new());
        assert!(matches!(result, Err(ImportError::InvalidJson { .. })));
    }

    #[test]
    fn import_str_missing_title() {
        let result = import_str(r#"{"openapi": "3.0.0", "info": {}}"#, &ImportOptions::new());
        assert!(matches!(result, Err(ImportError::MissingField { .. })));
    }

    #[test]
    fn export_file_name_collapses_whitespace() {
        assert_eq!(export_file_name("Pet Store"), "pet-store-openapi.json");
        assert_eq!(export_file_name("  My   Cool\tAPI "), "my-cool-api-openapi.json");
    }

    #[test]
    fn export_string_pretty_uses_two_spaces() {
        let doc = ProjectDocument::new("Pets", "1.0.0", None).unwrap();
        let text = export_string(&doc, &ExportOptions::new()).unwrap();
        assert!(text.starts_with("{\n  \"openapi\": \"3.0.0\""));
        assert!(text.contains("\"paths\": {}"));

        let compact = export_string(&doc, &ExportOptions::new().compact(true)).unwrap();
        assert!(!compact.contains('\n'));
    }

    #[test]
    fn export_to_then_import_round_trips() {
        let mut doc = ProjectDocument::new("Pet Store", "1.0.0", Some("Pets")).unwrap();
        doc.create_operation(OperationDraft::new(Method::Get, "/pets").auth(AuthKind::ApiKey))
            .unwrap();

        let dir = TempDir::new().unwrap();
        let path = export_to(&doc, dir.path(), &ExportOptions::new()).unwrap();
        assert_eq!(path.file_name().unwrap(), "pet-store-openapi.json");

        let back = import_file(&path, &ImportOptions::new().strict(true)).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn export_to_missing_dir_fails() {
        let doc = ProjectDocument::default();
        let result = export_to(&doc, Path::new("/nonexistent/dir"), &ExportOptions::new());
        assert!(matches!(result, Err(ExportError::WriteError { .. })));
    }
}
