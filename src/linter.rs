//! Document linting - static checks on a project document.
//!
//! Reports:
//! - Files that cannot be imported
//! - Broken security references and malformed paths
//! - Duplicate query parameters, empty objects, leftover placeholder names
//!   and unused security schemes (warnings)

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;

use crate::document::ProjectDocument;
use crate::loader::import_file;
use crate::mutator::is_placeholder_name;
use crate::schema::{Element, NodePath, SchemaNode, Shape};
use crate::types::ImportOptions;
use crate::wire::escape;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic message from linting.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    /// JSON path into the exported document (e.g., "/paths/~1users/get")
    pub path: String,
    pub message: String,
}

/// Overall status of a linted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
    Warning,
}

/// Result of linting one document.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub status: Status,
    pub errors: usize,
    pub warnings: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl LintResult {
    fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let errors = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        let warnings = diagnostics.len() - errors;
        let status = if errors > 0 {
            Status::Error
        } else if warnings > 0 {
            Status::Warning
        } else {
            Status::Ok
        };
        Self {
            status,
            errors,
            warnings,
            diagnostics,
        }
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }

    /// Whether the document passes; in strict mode warnings fail too.
    pub fn passed(&self, strict: bool) -> bool {
        if strict {
            self.status == Status::Ok
        } else {
            self.is_ok()
        }
    }
}

/// Lint a document file. Import failures are reported as `E001`.
pub fn lint_file(file: &Path) -> LintResult {
    match import_file(file, &ImportOptions::new()) {
        Ok(doc) => lint(&doc),
        Err(e) => LintResult::from_diagnostics(vec![Diagnostic {
            severity: Severity::Error,
            code: "E001".to_string(),
            path: "/".to_string(),
            message: format!("cannot import: {}", e),
        }]),
    }
}

/// Lint an in-memory document.
pub fn lint(doc: &ProjectDocument) -> LintResult {
    let mut diagnostics = Vec::new();
    let mut used_schemes = HashSet::new();

    for (path, item) in doc.paths() {
        let path_ptr = format!("/paths/{}", escape(path));
        if !path.starts_with('/') {
            diagnostics.push(error(
                "E003",
                &path_ptr,
                format!("path '{}' must start with '/'", path),
            ));
        }

        for (method, op) in item {
            let op_ptr = format!("{}/{}", path_ptr, method.as_str());

            if let Some(name) = op.auth.scheme_name() {
                used_schemes.insert(name);
                if !doc.security_schemes().contains_key(name) {
                    diagnostics.push(error(
                        "E002",
                        &format!("{}/security", op_ptr),
                        format!("security scheme '{}' is not defined", name),
                    ));
                }
            }

            let mut seen = HashSet::new();
            for (i, param) in op.parameters.iter().enumerate() {
                let param_ptr = format!("{}/parameters/{}", op_ptr, i);
                if !seen.insert(param.name.as_str()) {
                    diagnostics.push(warning(
                        "W001",
                        &param_ptr,
                        format!("duplicate query parameter '{}'", param.name),
                    ));
                }
                check_schema(param, &format!("{}/schema", param_ptr), &mut diagnostics);
            }

            if let Some(body) = &op.body {
                let body_ptr = format!("{}/requestBody/content/application~1json/schema", op_ptr);
                check_schema(body, &body_ptr, &mut diagnostics);
            }
        }
    }

    for (name, model) in doc.models() {
        check_schema(
            model,
            &format!("/components/schemas/{}", escape(name)),
            &mut diagnostics,
        );
    }

    for name in doc.security_schemes().keys() {
        if !used_schemes.contains(name.as_str()) {
            diagnostics.push(warning(
                "W004",
                &format!("/components/securitySchemes/{}", escape(name)),
                format!("security scheme '{}' is never used", name),
            ));
        }
    }

    LintResult::from_diagnostics(diagnostics)
}

/// Check one schema tree for empty containers and placeholder names.
fn check_schema(root: &SchemaNode, base: &str, diagnostics: &mut Vec<Diagnostic>) {
    root.walk(&mut |path: &NodePath, node: &SchemaNode| {
        let ptr = pointer(base, path);
        if is_placeholder_name(&node.name) {
            diagnostics.push(warning(
                "W003",
                &ptr,
                format!("'{}' still has a generated name", node.name),
            ));
        }
        match &node.shape {
            Shape::Object(props) if props.is_empty() => diagnostics.push(warning(
                "W002",
                &ptr,
                format!("object '{}' has no properties", node.name),
            )),
            Shape::Array(Element::Object(props)) if props.is_empty() => diagnostics.push(warning(
                "W002",
                &format!("{}/items", ptr),
                format!("elements of '{}' have no properties", node.name),
            )),
            _ => {}
        }
    });
}

fn pointer(base: &str, path: &NodePath) -> String {
    if path.is_root() {
        base.to_string()
    } else {
        format!("{}{}", base, path)
    }
}

fn error(code: &str, path: &str, message: String) -> Diagnostic {
    Diagnostic {
        severity: Severity::Error,
        code: code.to_string(),
        path: path.to_string(),
        message,
    }
}

fn warning(code: &str, path: &str, message: String) -> Diagnostic {
    Diagnostic {
        severity: Severity::Warning,
        code: code.to_string(),
        path: path.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::OperationDraft;
    use crate::params::ParameterList;
    use crate::types::{AuthKind, Kind, Method};
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn codes(result: &LintResult) -> Vec<&str> {
        result.diagnostics.iter().map(|d| d.code.as_str()).collect()
    }

    fn doc() -> ProjectDocument {
        ProjectDocument::new("Lint Me", "1.0.0", None).unwrap()
    }

    #[test]
    fn lint_clean_document() {
        let mut doc = doc();
        let body = SchemaNode::new("body", Kind::Object).with_child(SchemaNode::new("name", Kind::String));
        doc.create_operation(
            OperationDraft::new(Method::Post, "/pets")
                .body(body)
                .auth(AuthKind::Bearer),
        )
        .unwrap();

        let result = lint(&doc);
        assert_eq!(result.status, Status::Ok);
        assert!(result.diagnostics.is_empty());
        assert!(result.passed(true));
    }

    #[test]
    fn lint_unparseable_file() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, "{{ not valid json }}").unwrap();

        let result = lint_file(file.path());
        assert_eq!(result.status, Status::Error);
        assert_eq!(codes(&result), vec!["E001"]);
    }

    #[test]
    fn lint_file_wrong_extension() {
        let file = NamedTempFile::new().unwrap();
        let result = lint_file(file.path());
        assert_eq!(codes(&result), vec!["E001"]);
    }

    #[test]
    fn lint_undefined_scheme() {
        let mut doc = doc();
        doc.create_operation(OperationDraft::new(Method::Get, "/me").auth(AuthKind::Basic))
            .unwrap();
        doc.delete_security_scheme("basic");

        let result = lint(&doc);
        assert!(!result.is_ok());
        assert_eq!(codes(&result), vec!["E002"]);
        assert_eq!(result.diagnostics[0].path, "/paths/~1me/get/security");
    }

    #[test]
    fn lint_path_without_slash() {
        let result = lint(
            &crate::loader::import_str(
                r#"{"openapi": "3.0.0", "info": {"title": "T"},
                    "paths": {"users": {"get": {"responses": {}}}}}"#,
                &ImportOptions::new(),
            )
            .unwrap(),
        );
        assert_eq!(codes(&result), vec!["E003"]);
        assert_eq!(result.diagnostics[0].path, "/paths/users");
    }

    #[test]
    fn lint_duplicate_params_and_placeholders() {
        let mut params = ParameterList::new();
        params.push(SchemaNode::new("q", Kind::String));
        params.push(SchemaNode::new("q", Kind::String));
        params.add();

        let mut doc = doc();
        doc.create_operation(OperationDraft::new(Method::Get, "/search").parameters(params))
            .unwrap();

        let result = lint(&doc);
        assert!(result.is_ok());
        assert!(!result.passed(true));
        assert_eq!(codes(&result), vec!["W001", "W003"]);
        assert_eq!(result.diagnostics[0].path, "/paths/~1search/get/parameters/1");
        assert_eq!(result.diagnostics[1].path, "/paths/~1search/get/parameters/2/schema");
    }

    #[test]
    fn lint_empty_objects() {
        let mut doc = doc();
        let lines = SchemaNode {
            name: "lines".into(),
            shape: Shape::Array(Element::Object(Default::default())),
            required: false,
            description: None,
        };
        let model = SchemaNode::new("Order", Kind::Object).with_child(lines);
        doc.add_model("Order", model).unwrap();
        doc.add_model("Empty", SchemaNode::new("Empty", Kind::Object)).unwrap();

        let result = lint(&doc);
        let paths: Vec<&str> = result.diagnostics.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(codes(&result), vec!["W002", "W002"]);
        assert_eq!(
            paths,
            vec![
                "/components/schemas/Order/properties/lines/items",
                "/components/schemas/Empty"
            ]
        );
    }

    #[test]
    fn lint_unused_scheme() {
        let mut doc = doc();
        doc.create_operation(OperationDraft::new(Method::Get, "/a").auth(AuthKind::ApiKey))
            .unwrap();
        doc.delete_operation(&crate::document::OperationKey::new(Method::Get, "/a"));

        let result = lint(&doc);
        assert_eq!(codes(&result), vec!["W004"]);
        assert_eq!(result.diagnostics[0].path, "/components/securitySchemes/api-key");
    }

    #[test]
    fn lint_result_serializes_lowercase() {
        let result = lint(&doc());
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "ok");
        assert!(value.get("diagnostics").is_none());
    }
}
