//! Core enums and options shared across the editor.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::DocumentError;

/// OpenAPI version written into new documents.
pub const OPENAPI_VERSION: &str = "3.0.0";

/// Version given to projects created without an explicit one.
pub const DEFAULT_PROJECT_VERSION: &str = "1.0.0";

/// Status code and description of the response stub every new operation gets.
pub const DEFAULT_RESPONSE_STATUS: &str = "200";
pub const DEFAULT_RESPONSE_DESCRIPTION: &str = "Successful response";

/// Suffix appended to exported file names.
pub const EXPORT_FILE_SUFFIX: &str = "-openapi.json";

/// Name given to request body root nodes.
pub const BODY_NODE_NAME: &str = "body";

/// File extensions accepted on import.
pub const IMPORT_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The kind of a schema node, without any kind-specific data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    String,
    Number,
    Boolean,
    Integer,
    Array,
    Object,
}

impl Kind {
    pub const ALL: [Kind; 6] = [
        Kind::String,
        Kind::Number,
        Kind::Boolean,
        Kind::Integer,
        Kind::Array,
        Kind::Object,
    ];

    /// Parse a kind from its JSON Schema `type` name.
    ///
    /// Returns `None` for unknown values (caller should error).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(Kind::String),
            "number" => Some(Kind::Number),
            "boolean" => Some(Kind::Boolean),
            "integer" => Some(Kind::Integer),
            "array" => Some(Kind::Array),
            "object" => Some(Kind::Object),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }

    /// `object` and `array` own child nodes.
    pub fn is_container(&self) -> bool {
        matches!(self, Kind::Array | Kind::Object)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::parse(&s.to_lowercase()).ok_or_else(|| DocumentError::UnknownKind {
            value: s.to_string(),
        })
    }
}

/// HTTP method of an operation.
///
/// Stored lower case (as OpenAPI path items key them), displayed upper case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl Method {
    pub const ALL: [Method; 7] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Patch,
        Method::Options,
        Method::Head,
    ];

    /// Parse a method case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "get" => Some(Method::Get),
            "post" => Some(Method::Post),
            "put" => Some(Method::Put),
            "delete" => Some(Method::Delete),
            "patch" => Some(Method::Patch),
            "options" => Some(Method::Options),
            "head" => Some(Method::Head),
            _ => None,
        }
    }

    /// Storage form, e.g. `get`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Put => "put",
            Method::Delete => "delete",
            Method::Patch => "patch",
            Method::Options => "options",
            Method::Head => "head",
        }
    }

    /// Display form, e.g. `GET`.
    pub fn display_name(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
            Method::Head => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Method {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::parse(s).ok_or_else(|| DocumentError::UnknownMethod {
            value: s.to_string(),
        })
    }
}

/// Authentication requirement attached to an operation.
///
/// Every kind other than `None` maps to a security scheme of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AuthKind {
    #[default]
    None,
    ApiKey,
    Bearer,
    Basic,
    OAuth2,
}

impl AuthKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(AuthKind::None),
            "api-key" => Some(AuthKind::ApiKey),
            "bearer" => Some(AuthKind::Bearer),
            "basic" => Some(AuthKind::Basic),
            "oauth2" => Some(AuthKind::OAuth2),
            _ => None,
        }
    }

    /// Name of the security scheme this requirement references.
    pub fn scheme_name(&self) -> Option<&'static str> {
        match self {
            AuthKind::None => None,
            AuthKind::ApiKey => Some("api-key"),
            AuthKind::Bearer => Some("bearer"),
            AuthKind::Basic => Some("basic"),
            AuthKind::OAuth2 => Some("oauth2"),
        }
    }
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme_name().unwrap_or("none"))
    }
}

impl FromStr for AuthKind {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuthKind::parse(&s.to_lowercase()).ok_or_else(|| DocumentError::UnknownAuth {
            value: s.to_string(),
        })
    }
}

/// Options for importing a document.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// When true, constructs the editor cannot represent (non-query
    /// parameters, `$ref` schemas, unknown security requirements) fail the
    /// import. When false they are dropped with a warning.
    pub strict: bool,
}

impl ImportOptions {
    /// Lenient import options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set strict mode.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Options for exporting a document.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Single-line output instead of two-space indentation.
    pub compact: bool,
}

impl ExportOptions {
    /// Pretty-printed export options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parse_valid() {
        for kind in Kind::ALL {
            assert_eq!(Kind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn kind_parse_invalid() {
        assert_eq!(Kind::parse("null"), None);
        assert_eq!(Kind::parse(""), None);
        assert!(matches!(
            "tuple".parse::<Kind>(),
            Err(DocumentError::UnknownKind { .. })
        ));
    }

    #[test]
    fn kind_from_str_ignores_case() {
        assert_eq!("Object".parse::<Kind>().unwrap(), Kind::Object);
    }

    #[test]
    fn method_normalizes_case() {
        assert_eq!(Method::parse("GET"), Some(Method::Get));
        assert_eq!(Method::parse("Patch"), Some(Method::Patch));
        assert_eq!(Method::Delete.as_str(), "delete");
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn method_parse_invalid() {
        assert_eq!(Method::parse("TRACE"), None);
        assert!(matches!(
            "connect".parse::<Method>(),
            Err(DocumentError::UnknownMethod { .. })
        ));
    }

    #[test]
    fn auth_scheme_names() {
        assert_eq!(AuthKind::None.scheme_name(), None);
        assert_eq!(AuthKind::ApiKey.scheme_name(), Some("api-key"));
        assert_eq!(AuthKind::OAuth2.to_string(), "oauth2");
        assert_eq!("Bearer".parse::<AuthKind>().unwrap(), AuthKind::Bearer);
    }

    #[test]
    fn options_builders() {
        assert!(!ImportOptions::new().strict);
        assert!(ImportOptions::new().strict(true).strict);
        assert!(ExportOptions::new().compact(true).compact);
    }
}
