//! OpenAPI Studio
//!
//! Editing core for OpenAPI 3.0 projects.
//!
//! A project holds operations keyed by path and method. Each operation has
//! query parameters and an optional request body, both described by trees of
//! typed schema nodes. Trees are persistent: an edit rebuilds only the chain
//! of ancestors above the changed node and shares everything else.
//!
//! # Example
//!
//! ```
//! use openapi_studio::{
//!     apply, export_string, AuthKind, Edit, ExportOptions, Kind, Method, NodePath,
//!     OperationDraft, ProjectDocument, SchemaNode,
//! };
//! use std::sync::Arc;
//!
//! let body = Arc::new(SchemaNode::new("body", Kind::Object));
//! let body = apply(&body, &NodePath::root(), &Edit::AddChild { name: Some("email".into()) }).unwrap();
//!
//! let mut doc = ProjectDocument::new("Accounts", "1.0.0", None).unwrap();
//! doc.create_operation(
//!     OperationDraft::new(Method::Post, "/users")
//!         .body(SchemaNode::clone(&body))
//!         .auth(AuthKind::Bearer),
//! )
//! .unwrap();
//!
//! let json: serde_json::Value =
//!     serde_json::from_str(&export_string(&doc, &ExportOptions::new()).unwrap()).unwrap();
//! assert_eq!(json["paths"]["/users"]["post"]["security"][0]["bearer"], serde_json::json!([]));
//! assert_eq!(json["components"]["securitySchemes"]["bearer"]["scheme"], "bearer");
//! ```
//!
//! # Node Paths
//!
//! Nodes inside a tree are addressed with JSON pointers into the exported
//! schema:
//!
//! | Path | Addresses |
//! |------|-----------|
//! | `/` | The root node |
//! | `/properties/address` | Property `address` of an object root |
//! | `/properties/lines/items/properties/sku` | Property `sku` of the elements of array `lines` |

mod document;
mod error;
mod linter;
mod loader;
mod mutator;
mod params;
mod schema;
mod security;
mod session;
mod types;
mod wire;

pub use document::{
    validate_path, Info, Operation, OperationDraft, OperationKey, PathItem, ProjectDocument,
    Response, SchemaTarget, Server, DEFAULT_DESCRIPTION, DEFAULT_SERVER_DESCRIPTION,
    DEFAULT_SERVER_URL, DEFAULT_TITLE,
};
pub use error::{DocumentError, EditError, ExportError, ImportError};
pub use linter::{lint, lint_file, Diagnostic, LintResult, Severity, Status};
pub use loader::{
    export_file_name, export_string, export_to, has_import_extension, import_file, import_str,
    write_document,
};
pub use mutator::{
    apply, is_placeholder_name, placeholder_name, Edit, ELEMENT_PREFIX, PARAMETER_PREFIX,
    PROPERTY_PREFIX,
};
pub use params::ParameterList;
pub use schema::{Branch, Element, NodePath, Properties, SchemaNode, Shape, Step};
pub use security::{ApiKeyLocation, OAuthFlow, OAuthFlows, SecurityScheme};
pub use session::Session;
pub use types::{AuthKind, ExportOptions, ImportOptions, Kind, Method, BODY_NODE_NAME};
pub use wire::{
    node_from_schema, schema_from_node, OpenApiDocument, WireSchema, JSON_MEDIA_TYPE,
};
