//! OpenAPI 3.0 wire format.
//!
//! Only the subset the editor models is written: query parameters, JSON
//! request bodies, responses by status, security requirements, component
//! schemas and security schemes. Reading walks the decoded JSON value so
//! that a single unsupported entry can be dropped (lenient) or reported
//! (strict) without rejecting the whole document.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::{Info, Operation, PathItem, ProjectDocument, Response, Server};
use crate::error::ImportError;
use crate::schema::{Element, Properties, SchemaNode, Shape};
use crate::security::SecurityScheme;
use crate::types::{json_type_name, AuthKind, ImportOptions, Kind, Method, BODY_NODE_NAME};

/// Media type used for request bodies.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Serialized document root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    pub openapi: String,
    pub info: Info,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub paths: IndexMap<String, IndexMap<String, WireOperation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, WireSchema>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOperation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<WireParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<WireRequestBody>,
    #[serde(default)]
    pub responses: IndexMap<String, WireResponse>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<IndexMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireParameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "in", default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<WireSchema>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireRequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: IndexMap<String, WireMediaType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireMediaType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<WireSchema>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireResponse {
    #[serde(default)]
    pub description: String,
}

/// The JSON Schema subset a [`SchemaNode`] maps to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireSchema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, WireSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<WireSchema>>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

// --- Domain -> wire ---

impl From<&ProjectDocument> for OpenApiDocument {
    fn from(doc: &ProjectDocument) -> Self {
        let paths = doc
            .paths()
            .iter()
            .map(|(path, item)| {
                let ops = item
                    .iter()
                    .map(|(method, op)| (method.as_str().to_string(), WireOperation::from(op)))
                    .collect();
                (path.clone(), ops)
            })
            .collect();

        let components = Components {
            schemas: doc
                .models()
                .iter()
                .map(|(name, node)| (name.clone(), schema_from_node(node)))
                .collect(),
            security_schemes: doc.security_schemes().clone(),
        };
        let components = if components.schemas.is_empty() && components.security_schemes.is_empty() {
            None
        } else {
            Some(components)
        };

        OpenApiDocument {
            openapi: doc.openapi.clone(),
            info: doc.info.clone(),
            servers: doc.servers.clone(),
            paths,
            components,
        }
    }
}

impl From<&Operation> for WireOperation {
    fn from(op: &Operation) -> Self {
        let parameters = op
            .parameters
            .iter()
            .map(|param| {
                let mut schema = schema_from_node(param);
                // Parameter descriptions live on the parameter object
                schema.description = None;
                WireParameter {
                    name: param.name.clone(),
                    location: "query".to_string(),
                    description: param.description.clone(),
                    required: param.required,
                    schema: Some(schema),
                    reference: None,
                }
            })
            .collect();

        let request_body = op.body.as_ref().map(|body| {
            let mut content = IndexMap::new();
            content.insert(
                JSON_MEDIA_TYPE.to_string(),
                WireMediaType {
                    schema: Some(schema_from_node(body)),
                },
            );
            WireRequestBody {
                description: None,
                required: body.required,
                content,
            }
        });

        let security = op
            .auth
            .scheme_name()
            .map(|name| {
                let mut requirement = IndexMap::new();
                requirement.insert(name.to_string(), Vec::new());
                vec![requirement]
            })
            .unwrap_or_default();

        WireOperation {
            summary: op.summary.clone(),
            parameters,
            request_body,
            responses: op
                .responses
                .iter()
                .map(|(status, response)| {
                    (
                        status.clone(),
                        WireResponse {
                            description: response.description.clone(),
                        },
                    )
                })
                .collect(),
            security,
        }
    }
}

/// Convert a node to its JSON Schema form. Child `required` flags become the
/// parent's `required` list.
pub fn schema_from_node(node: &SchemaNode) -> WireSchema {
    let mut schema = WireSchema {
        kind: Some(node.kind().as_str().to_string()),
        description: node.description.clone(),
        ..WireSchema::default()
    };
    match &node.shape {
        Shape::Object(props) => fill_properties(&mut schema, props),
        Shape::Array(element) => schema.items = Some(Box::new(schema_from_element(element))),
        _ => {}
    }
    schema
}

fn schema_from_element(element: &Element) -> WireSchema {
    let mut schema = WireSchema {
        kind: Some(element.kind().as_str().to_string()),
        ..WireSchema::default()
    };
    if let Element::Object(props) = element {
        fill_properties(&mut schema, props);
    }
    schema
}

fn fill_properties(schema: &mut WireSchema, props: &Properties) {
    for (name, child) in props {
        schema.properties.insert(name.clone(), schema_from_node(child));
        if child.required {
            schema.required.push(name.clone());
        }
    }
}

// --- Wire -> domain ---

/// Check the fields every importable document must have.
pub fn check_required_fields(value: &Value) -> Result<(), ImportError> {
    let missing = |field: &str| ImportError::MissingField {
        field: field.to_string(),
    };
    let root = value.as_object().ok_or_else(|| missing("openapi"))?;
    if !root.get("openapi").is_some_and(Value::is_string) {
        return Err(missing("openapi"));
    }
    let has_title = root
        .get("info")
        .and_then(|info| info.get("title"))
        .is_some_and(Value::is_string);
    if !has_title {
        return Err(missing("info.title"));
    }
    Ok(())
}

/// Decode a JSON value into a project document.
///
/// # Errors
///
/// Returns `ImportError::MissingField` when `openapi` or `info.title` is
/// missing, `ImportError::InvalidField` when `info` has a field of the wrong
/// type, and `ImportError::Unsupported` for constructs the editor cannot
/// represent when `options.strict` is set.
pub fn document_from_value(
    value: &Value,
    options: &ImportOptions,
) -> Result<ProjectDocument, ImportError> {
    check_required_fields(value)?;
    let reader = Reader { options };

    let openapi = value["openapi"].as_str().unwrap_or_default().to_string();
    let info: Info =
        serde_json::from_value(value["info"].clone()).map_err(|source| ImportError::InvalidField {
            field: "info".to_string(),
            source,
        })?;

    let servers = match value.get("servers") {
        Some(servers) => match serde_json::from_value::<Vec<Server>>(servers.clone()) {
            Ok(servers) => servers,
            Err(e) => {
                reader.unsupported("/servers", &e.to_string())?;
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let mut paths = IndexMap::new();
    if let Some(entries) = value.get("paths") {
        for (path, item) in reader.object(entries, "/paths")? {
            let at = format!("/paths/{}", escape(path));
            let item = reader.path_item(item, &at)?;
            if !item.is_empty() {
                paths.insert(path.clone(), item);
            }
        }
    }

    let mut models = IndexMap::new();
    if let Some(schemas) = value.pointer("/components/schemas") {
        for (name, schema) in reader.object(schemas, "/components/schemas")? {
            let at = format!("/components/schemas/{}", escape(name));
            if let Some(node) = reader.node_from_value(name, false, schema, &at)? {
                models.insert(name.clone(), Arc::new(node));
            }
        }
    }

    let mut security_schemes = IndexMap::new();
    if let Some(schemes) = value.pointer("/components/securitySchemes") {
        for (name, scheme) in reader.object(schemes, "/components/securitySchemes")? {
            let at = format!("/components/securitySchemes/{}", escape(name));
            match serde_json::from_value::<SecurityScheme>(scheme.clone()) {
                Ok(scheme) => {
                    security_schemes.insert(name.clone(), scheme);
                }
                Err(e) => reader.unsupported(&at, &e.to_string())?,
            }
        }
    }

    Ok(ProjectDocument::from_parts(
        openapi,
        info,
        servers,
        paths,
        models,
        security_schemes,
    ))
}

/// Build a node from a decoded schema. `Ok(None)` means the schema was
/// dropped in lenient mode.
pub fn node_from_schema(
    name: &str,
    required: bool,
    schema: &WireSchema,
    options: &ImportOptions,
) -> Result<Option<SchemaNode>, ImportError> {
    Reader { options }.node(name, required, schema, "")
}

struct Reader<'a> {
    options: &'a ImportOptions,
}

impl Reader<'_> {
    /// Drop an entry with a warning, or fail in strict mode.
    fn unsupported(&self, path: &str, message: &str) -> Result<(), ImportError> {
        if self.options.strict {
            return Err(ImportError::Unsupported {
                path: path.to_string(),
                message: message.to_string(),
            });
        }
        log::warn!("dropping {}: {}", path, message);
        Ok(())
    }

    fn object<'v>(&self, value: &'v Value, path: &str) -> Result<&'v Map<String, Value>, ImportError> {
        value.as_object().ok_or_else(|| ImportError::Unsupported {
            path: path.to_string(),
            message: format!("expected object, got {}", json_type_name(value)),
        })
    }

    fn path_item(&self, item: &Value, at: &str) -> Result<PathItem, ImportError> {
        let mut ops = PathItem::new();
        let Some(entries) = item.as_object() else {
            self.unsupported(at, &format!("expected object, got {}", json_type_name(item)))?;
            return Ok(ops);
        };
        for (key, op) in entries {
            let op_at = format!("{}/{}", at, escape(key));
            let Some(method) = Method::parse(key) else {
                self.unsupported(&op_at, &format!("path-level field '{}' is not supported", key))?;
                continue;
            };
            match serde_json::from_value::<WireOperation>(op.clone()) {
                Ok(wire) => {
                    ops.insert(method, self.operation(&wire, &op_at)?);
                }
                Err(e) => self.unsupported(&op_at, &e.to_string())?,
            }
        }
        Ok(ops)
    }

    fn operation(&self, wire: &WireOperation, at: &str) -> Result<Operation, ImportError> {
        let mut parameters = Vec::new();
        for (index, param) in wire.parameters.iter().enumerate() {
            let param_at = format!("{}/parameters/{}", at, index);
            if let Some(reference) = &param.reference {
                self.unsupported(&param_at, &format!("parameter reference '{}'", reference))?;
                continue;
            }
            if param.location != "query" {
                self.unsupported(
                    &param_at,
                    &format!("'{}' parameter '{}'", param.location, param.name),
                )?;
                continue;
            }
            let schema = param.schema.clone().unwrap_or_default();
            if let Some(mut node) =
                self.node(&param.name, param.required, &schema, &format!("{}/schema", param_at))?
            {
                if param.description.is_some() {
                    node.description = param.description.clone();
                }
                parameters.push(Arc::new(node));
            }
        }

        let body = match &wire.request_body {
            Some(request_body) => self.body(request_body, &format!("{}/requestBody", at))?,
            None => None,
        };

        let security_at = format!("{}/security", at);
        if wire.security.len() > 1 {
            self.unsupported(
                &security_at,
                &format!("{} alternative security requirements, keeping the first", wire.security.len()),
            )?;
        }
        let requirement = wire.security.first();
        if let Some(requirement) = requirement {
            if requirement.len() > 1 {
                self.unsupported(
                    &format!("{}/0", security_at),
                    &format!("{} combined security schemes, keeping the first", requirement.len()),
                )?;
            }
            for (name, scopes) in requirement.iter().take(1) {
                if !scopes.is_empty() {
                    self.unsupported(
                        &format!("{}/0/{}", security_at, escape(name)),
                        &format!("scopes {:?} on '{}'", scopes, name),
                    )?;
                }
            }
        }

        let auth = match requirement.and_then(|req| req.keys().next()) {
            Some(name) => match AuthKind::parse(name) {
                Some(auth) => auth,
                None => {
                    self.unsupported(
                        &security_at,
                        &format!("security requirement '{}'", name),
                    )?;
                    AuthKind::None
                }
            },
            None => AuthKind::None,
        };

        Ok(Operation {
            summary: wire.summary.clone(),
            parameters,
            body,
            auth,
            responses: wire
                .responses
                .iter()
                .map(|(status, response)| {
                    (
                        status.clone(),
                        Response {
                            description: response.description.clone(),
                        },
                    )
                })
                .collect(),
        })
    }

    fn body(&self, body: &WireRequestBody, at: &str) -> Result<Option<Arc<SchemaNode>>, ImportError> {
        let media = body
            .content
            .get(JSON_MEDIA_TYPE)
            .or_else(|| body.content.values().next());
        let Some(schema) = media.and_then(|m| m.schema.as_ref()) else {
            return Ok(None);
        };
        let node = self.node(BODY_NODE_NAME, body.required, schema, &format!("{}/content", at))?;
        Ok(node.map(|mut node| {
            if node.description.is_none() {
                node.description = body.description.clone();
            }
            Arc::new(node)
        }))
    }

    fn node_from_value(
        &self,
        name: &str,
        required: bool,
        value: &Value,
        at: &str,
    ) -> Result<Option<SchemaNode>, ImportError> {
        match serde_json::from_value::<WireSchema>(value.clone()) {
            Ok(schema) => self.node(name, required, &schema, at),
            Err(e) => {
                self.unsupported(at, &e.to_string())?;
                Ok(None)
            }
        }
    }

    fn node(
        &self,
        name: &str,
        required: bool,
        schema: &WireSchema,
        at: &str,
    ) -> Result<Option<SchemaNode>, ImportError> {
        let Some(kind) = self.kind(schema, at)? else {
            return Ok(None);
        };
        let shape = match kind {
            Kind::Object => Shape::Object(self.properties(schema, at)?),
            Kind::Array => Shape::Array(self.element(schema.items.as_deref(), &format!("{}/items", at))?),
            other => Shape::empty(other),
        };
        Ok(Some(SchemaNode {
            name: name.to_string(),
            shape,
            required,
            description: schema.description.clone(),
        }))
    }

    fn element(&self, items: Option<&WireSchema>, at: &str) -> Result<Element, ImportError> {
        let Some(items) = items else {
            return Ok(Element::String);
        };
        let Some(kind) = self.kind(items, at)? else {
            return Ok(Element::String);
        };
        Ok(match kind {
            Kind::Object => Element::Object(self.properties(items, at)?),
            other => Element::empty(other),
        })
    }

    fn properties(&self, schema: &WireSchema, at: &str) -> Result<Properties, ImportError> {
        let mut props = Properties::new();
        for (child_name, child) in &schema.properties {
            let child_at = format!("{}/properties/{}", at, escape(child_name));
            let required = schema.required.iter().any(|r| r == child_name);
            if let Some(node) = self.node(child_name, required, child, &child_at)? {
                props.insert(child_name.clone(), Arc::new(node));
            }
        }
        Ok(props)
    }

    /// Kind of a schema, inferred from its shape when `type` is absent.
    /// `Ok(None)` when the schema was dropped.
    fn kind(&self, schema: &WireSchema, at: &str) -> Result<Option<Kind>, ImportError> {
        if let Some(reference) = &schema.reference {
            self.unsupported(at, &format!("schema reference '{}'", reference))?;
            return Ok(None);
        }
        match schema.kind.as_deref() {
            Some(name) => match Kind::parse(name) {
                Some(kind) => Ok(Some(kind)),
                None => {
                    self.unsupported(at, &format!("schema type '{}'", name))?;
                    Ok(None)
                }
            },
            None if !schema.properties.is_empty() => Ok(Some(Kind::Object)),
            None if schema.items.is_some() => Ok(Some(Kind::Array)),
            None => Ok(Some(Kind::String)),
        }
    }
}

/// JSON Pointer encoding (~ = ~0, / = ~1).
pub(crate) fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
