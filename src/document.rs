//! The project document and the builder operations that merge edited
//! operations into it.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{DocumentError, EditError};
use crate::mutator::{self, Edit};
use crate::params::ParameterList;
use crate::schema::{NodePath, SchemaNode};
use crate::security::SecurityScheme;
use crate::types::{
    AuthKind, Method, BODY_NODE_NAME, DEFAULT_PROJECT_VERSION, DEFAULT_RESPONSE_DESCRIPTION,
    DEFAULT_RESPONSE_STATUS, OPENAPI_VERSION,
};

/// Title of the document a fresh session starts with.
pub const DEFAULT_TITLE: &str = "My API";
pub const DEFAULT_DESCRIPTION: &str = "API created with OpenAPI Studio";
pub const DEFAULT_SERVER_URL: &str = "https://api.example.com";
pub const DEFAULT_SERVER_DESCRIPTION: &str = "Production server";

/// Project metadata (`info`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_version() -> String {
    DEFAULT_PROJECT_VERSION.to_string()
}

/// A server entry, kept as-is across import and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub description: String,
}

/// One method bound to one path.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub summary: Option<String>,
    /// Query parameters, in order.
    pub parameters: Vec<Arc<SchemaNode>>,
    pub body: Option<Arc<SchemaNode>>,
    pub auth: AuthKind,
    /// Status code → response.
    pub responses: IndexMap<String, Response>,
}

/// Method → operation for a single path.
pub type PathItem = IndexMap<Method, Operation>;

/// Identity of an operation inside the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationKey {
    pub path: String,
    pub method: Method,
}

impl OperationKey {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
        }
    }

    /// Parse a user-supplied method name and path.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError` for unknown methods and invalid paths.
    pub fn parse(method: &str, path: &str) -> Result<Self, DocumentError> {
        let method = method.parse::<Method>()?;
        validate_path(path)?;
        Ok(Self::new(method, path))
    }

    fn default_summary(&self) -> String {
        format!("{} {}", self.method.display_name(), self.path)
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Which schema tree of an operation an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaTarget {
    Parameter(usize),
    Body,
}

/// The edited pieces of an operation, before they are merged into the
/// document.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDraft {
    pub path: String,
    pub method: Method,
    /// `None` uses `"<METHOD> <path>"`.
    pub summary: Option<String>,
    pub parameters: Vec<Arc<SchemaNode>>,
    pub body: Option<Arc<SchemaNode>>,
    pub auth: AuthKind,
}

impl OperationDraft {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            summary: None,
            parameters: Vec::new(),
            body: None,
            auth: AuthKind::None,
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn parameters(mut self, parameters: ParameterList) -> Self {
        self.parameters = parameters.into_nodes();
        self
    }

    /// Set the request body. The root is renamed to `body`.
    pub fn body(mut self, mut body: SchemaNode) -> Self {
        body.name = BODY_NODE_NAME.to_string();
        self.body = Some(Arc::new(body));
        self
    }

    pub fn auth(mut self, auth: AuthKind) -> Self {
        self.auth = auth;
        self
    }

    /// Load a stored operation for editing. A summary that is still the
    /// generated default is dropped so it follows a relocation.
    pub fn from_operation(key: &OperationKey, operation: &Operation) -> Self {
        let summary = operation
            .summary
            .clone()
            .filter(|s| *s != key.default_summary());
        Self {
            path: key.path.clone(),
            method: key.method,
            summary,
            parameters: operation.parameters.clone(),
            body: operation.body.clone(),
            auth: operation.auth,
        }
    }

    /// The draft's parameters as an editable list.
    pub fn parameter_list(&self) -> ParameterList {
        ParameterList::from_nodes(self.parameters.clone())
    }

    pub fn key(&self) -> OperationKey {
        OperationKey::new(self.method, self.path.clone())
    }
}

/// Check that a path is non-empty and starts with `/`.
pub fn validate_path(path: &str) -> Result<(), DocumentError> {
    if path.trim().is_empty() {
        return Err(DocumentError::EmptyPath);
    }
    if !path.starts_with('/') {
        return Err(DocumentError::MissingLeadingSlash {
            path: path.to_string(),
        });
    }
    Ok(())
}

/// The root aggregate: metadata, operations, models and security schemes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDocument {
    pub openapi: String,
    pub info: Info,
    pub servers: Vec<Server>,
    paths: IndexMap<String, PathItem>,
    models: IndexMap<String, Arc<SchemaNode>>,
    security_schemes: IndexMap<String, SecurityScheme>,
}

impl Default for ProjectDocument {
    fn default() -> Self {
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            info: Info {
                title: DEFAULT_TITLE.to_string(),
                version: DEFAULT_PROJECT_VERSION.to_string(),
                description: Some(DEFAULT_DESCRIPTION.to_string()),
            },
            servers: vec![Server {
                url: DEFAULT_SERVER_URL.to_string(),
                description: Some(DEFAULT_SERVER_DESCRIPTION.to_string()),
            }],
            paths: IndexMap::new(),
            models: IndexMap::new(),
            security_schemes: IndexMap::new(),
        }
    }
}

impl ProjectDocument {
    /// Create an empty project.
    ///
    /// A blank version falls back to `1.0.0`, a blank description is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::EmptyTitle` for a blank title.
    pub fn new(title: &str, version: &str, description: Option<&str>) -> Result<Self, DocumentError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DocumentError::EmptyTitle);
        }
        let version = match version.trim() {
            "" => DEFAULT_PROJECT_VERSION,
            v => v,
        };
        Ok(Self {
            info: Info {
                title: title.to_string(),
                version: version.to_string(),
                description: description
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(String::from),
            },
            servers: Vec::new(),
            ..Self::default()
        })
    }

    pub(crate) fn from_parts(
        openapi: String,
        info: Info,
        servers: Vec<Server>,
        paths: IndexMap<String, PathItem>,
        models: IndexMap<String, Arc<SchemaNode>>,
        security_schemes: IndexMap<String, SecurityScheme>,
    ) -> Self {
        Self {
            openapi,
            info,
            servers,
            paths,
            models,
            security_schemes,
        }
    }

    pub fn paths(&self) -> &IndexMap<String, PathItem> {
        &self.paths
    }

    pub fn models(&self) -> &IndexMap<String, Arc<SchemaNode>> {
        &self.models
    }

    pub fn security_schemes(&self) -> &IndexMap<String, SecurityScheme> {
        &self.security_schemes
    }

    pub fn operation(&self, key: &OperationKey) -> Option<&Operation> {
        self.paths.get(&key.path)?.get(&key.method)
    }

    /// All operations, sorted by path then method.
    pub fn operations(&self) -> Vec<(OperationKey, &Operation)> {
        let mut ops: Vec<(OperationKey, &Operation)> = self
            .paths
            .iter()
            .flat_map(|(path, item)| {
                item.iter()
                    .map(move |(method, op)| (OperationKey::new(*method, path.clone()), op))
            })
            .collect();
        ops.sort_by(|(a, _), (b, _)| {
            a.path
                .cmp(&b.path)
                .then_with(|| a.method.as_str().cmp(b.method.as_str()))
        });
        ops
    }

    // --- Operation builder ---

    /// Build an operation from a draft and store it at the draft's slot.
    ///
    /// An operation already stored at that slot is replaced.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError` for an invalid path; the document is
    /// unchanged.
    pub fn create_operation(&mut self, draft: OperationDraft) -> Result<OperationKey, DocumentError> {
        validate_path(&draft.path)?;
        let responses = default_responses();
        let key = self.install(draft, responses);
        log::info!("created operation {}", key);
        Ok(key)
    }

    /// Move the operation at `from` to the draft's slot and reapply the
    /// draft's summary, parameters, body and auth. Responses carry over.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::OperationNotFound` when `from` does not exist,
    /// or a path validation error. The document is unchanged on error.
    pub fn update_operation(
        &mut self,
        from: &OperationKey,
        draft: OperationDraft,
    ) -> Result<OperationKey, DocumentError> {
        validate_path(&draft.path)?;
        let Some(previous) = self.remove_slot(from) else {
            return Err(DocumentError::OperationNotFound {
                method: from.method.to_string(),
                path: from.path.clone(),
            });
        };
        let key = self.install(draft, previous.responses);
        if key != *from {
            log::info!("moved operation {} to {}", from, key);
        } else {
            log::info!("updated operation {}", key);
        }
        Ok(key)
    }

    /// Remove an operation, pruning its path when it was the last method.
    pub fn delete_operation(&mut self, key: &OperationKey) -> Option<Operation> {
        let removed = self.remove_slot(key);
        match &removed {
            Some(_) => log::info!("deleted operation {}", key),
            None => log::debug!("delete of missing operation {}", key),
        }
        removed
    }

    /// Apply a tree edit to a parameter or the body of a stored operation.
    ///
    /// Returns `Ok(false)` when the operation, parameter or body does not
    /// exist, or the edit changed nothing.
    ///
    /// # Errors
    ///
    /// Propagates mutator errors; the document is unchanged.
    pub fn edit_operation_schema(
        &mut self,
        key: &OperationKey,
        target: SchemaTarget,
        path: &NodePath,
        edit: &Edit,
    ) -> Result<bool, EditError> {
        let Some(op) = self
            .paths
            .get_mut(&key.path)
            .and_then(|item| item.get_mut(&key.method))
        else {
            return Ok(false);
        };
        let slot = match target {
            SchemaTarget::Parameter(index) => op.parameters.get_mut(index),
            SchemaTarget::Body => op.body.as_mut(),
        };
        let Some(slot) = slot else {
            return Ok(false);
        };
        let updated = mutator::apply(slot, path, edit)?;
        if Arc::ptr_eq(slot, &updated) {
            return Ok(false);
        }
        *slot = updated;
        Ok(true)
    }

    fn install(&mut self, draft: OperationDraft, responses: IndexMap<String, Response>) -> OperationKey {
        let key = draft.key();
        let summary = draft
            .summary
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| key.default_summary());
        self.register_security(draft.auth);
        let body = draft.body.map(|body| {
            if body.name == BODY_NODE_NAME {
                body
            } else {
                let mut renamed = SchemaNode::clone(&body);
                renamed.name = BODY_NODE_NAME.to_string();
                Arc::new(renamed)
            }
        });

        let operation = Operation {
            summary: Some(summary),
            parameters: draft.parameters,
            body,
            auth: draft.auth,
            responses,
        };
        let item = self.paths.entry(key.path.clone()).or_default();
        if item.insert(key.method, operation).is_some() {
            log::warn!("replaced existing operation {}", key);
        }
        key
    }

    fn remove_slot(&mut self, key: &OperationKey) -> Option<Operation> {
        let item = self.paths.get_mut(&key.path)?;
        let removed = item.shift_remove(&key.method)?;
        if item.is_empty() {
            self.paths.shift_remove(&key.path);
        }
        Some(removed)
    }

    /// Register the default scheme for `auth` unless one with that name
    /// already exists.
    fn register_security(&mut self, auth: AuthKind) {
        let (Some(name), Some(template)) = (auth.scheme_name(), SecurityScheme::template(auth))
        else {
            return;
        };
        if !self.security_schemes.contains_key(name) {
            log::info!("registered security scheme '{}'", name);
            self.security_schemes.insert(name.to_string(), template);
        }
    }

    // --- Security schemes ---

    /// Define or replace a named security scheme.
    pub fn add_security_scheme(&mut self, name: impl Into<String>, scheme: SecurityScheme) {
        self.security_schemes.insert(name.into(), scheme);
    }

    pub fn delete_security_scheme(&mut self, name: &str) -> Option<SecurityScheme> {
        self.security_schemes.shift_remove(name)
    }

    // --- Models ---

    pub fn model(&self, name: &str) -> Option<&Arc<SchemaNode>> {
        self.models.get(name)
    }

    /// Store a reusable schema under `name`, replacing any model of that
    /// name. The root node is renamed to match.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::EmptyModelName` for a blank name.
    pub fn add_model(&mut self, name: &str, schema: SchemaNode) -> Result<(), DocumentError> {
        if name.trim().is_empty() {
            return Err(DocumentError::EmptyModelName);
        }
        let mut schema = schema;
        schema.name = name.to_string();
        // Models are referenced, never required themselves
        schema.required = false;
        self.models.insert(name.to_string(), Arc::new(schema));
        Ok(())
    }

    /// Apply a tree edit to a stored model.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::ModelNotFound` for an unknown model, or the
    /// mutator's error.
    pub fn update_model(&mut self, name: &str, path: &NodePath, edit: &Edit) -> Result<bool, DocumentError> {
        let Some(model) = self.models.get_mut(name) else {
            return Err(DocumentError::ModelNotFound {
                name: name.to_string(),
            });
        };
        let updated = mutator::apply(model, path, edit)?;
        if Arc::ptr_eq(model, &updated) {
            return Ok(false);
        }
        *model = updated;
        Ok(true)
    }

    pub fn delete_model(&mut self, name: &str) -> Option<Arc<SchemaNode>> {
        self.models.shift_remove(name)
    }
}

fn default_responses() -> IndexMap<String, Response> {
    let mut responses = IndexMap::new();
    responses.insert(
        DEFAULT_RESPONSE_STATUS.to_string(),
        Response {
            description: DEFAULT_RESPONSE_DESCRIPTION.to_string(),
        },
    );
    responses
}
