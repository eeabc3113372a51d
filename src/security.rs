//! Security scheme definitions and the default templates registered for each
//! auth kind.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::AuthKind;

/// Header used by the default API key scheme.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Placeholder OAuth2 endpoints for the default authorization-code flow.
pub const OAUTH2_AUTHORIZATION_URL: &str = "https://example.com/oauth/authorize";
pub const OAUTH2_TOKEN_URL: &str = "https://example.com/oauth/token";

/// A reusable authentication mechanism (`components.securitySchemes`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SecurityScheme {
    #[serde(rename = "apiKey")]
    ApiKey {
        name: String,
        #[serde(rename = "in")]
        location: ApiKeyLocation,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    #[serde(rename = "http")]
    Http {
        scheme: String,
        #[serde(
            rename = "bearerFormat",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        bearer_format: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    #[serde(rename = "oauth2")]
    OAuth2 {
        flows: OAuthFlows,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    #[serde(rename = "openIdConnect")]
    OpenIdConnect {
        #[serde(rename = "openIdConnectUrl")]
        open_id_connect_url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

/// Where an API key is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Header,
    Query,
    Cookie,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlows {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<OAuthFlow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implicit: Option<OAuthFlow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<OAuthFlow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_credentials: Option<OAuthFlow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_url: Option<String>,
    #[serde(default)]
    pub scopes: IndexMap<String, String>,
}

impl SecurityScheme {
    /// Default definition registered the first time an operation uses
    /// `auth`. `None` for [`AuthKind::None`].
    pub fn template(auth: AuthKind) -> Option<Self> {
        match auth {
            AuthKind::None => None,
            AuthKind::ApiKey => Some(SecurityScheme::ApiKey {
                name: API_KEY_HEADER.to_string(),
                location: ApiKeyLocation::Header,
                description: None,
            }),
            AuthKind::Bearer => Some(SecurityScheme::http("bearer")),
            AuthKind::Basic => Some(SecurityScheme::http("basic")),
            AuthKind::OAuth2 => {
                let mut scopes = IndexMap::new();
                scopes.insert("read".to_string(), "Read access".to_string());
                scopes.insert("write".to_string(), "Write access".to_string());
                Some(SecurityScheme::OAuth2 {
                    flows: OAuthFlows {
                        authorization_code: Some(OAuthFlow {
                            authorization_url: Some(OAUTH2_AUTHORIZATION_URL.to_string()),
                            token_url: Some(OAUTH2_TOKEN_URL.to_string()),
                            refresh_url: None,
                            scopes,
                        }),
                        ..OAuthFlows::default()
                    },
                    description: None,
                })
            }
        }
    }

    fn http(scheme: &str) -> Self {
        SecurityScheme::Http {
            scheme: scheme.to_string(),
            bearer_format: None,
            description: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bearer_template_serializes_minimal() {
        let scheme = SecurityScheme::template(AuthKind::Bearer).unwrap();
        assert_eq!(
            serde_json::to_value(&scheme).unwrap(),
            json!({ "type": "http", "scheme": "bearer" })
        );
    }

    #[test]
    fn api_key_template_uses_header() {
        let scheme = SecurityScheme::template(AuthKind::ApiKey).unwrap();
        assert_eq!(
            serde_json::to_value(&scheme).unwrap(),
            json!({ "type": "apiKey", "name": "X-API-Key", "in": "header" })
        );
    }

    #[test]
    fn oauth2_template_has_two_scopes() {
        let scheme = SecurityScheme::template(AuthKind::OAuth2).unwrap();
        let value = serde_json::to_value(&scheme).unwrap();
        let flow = &value["flows"]["authorizationCode"];
        assert_eq!(flow["tokenUrl"], OAUTH2_TOKEN_URL);
        assert_eq!(flow["scopes"].as_object().unwrap().len(), 2);
    }

    #[test]
    fn no_template_for_none() {
        assert!(SecurityScheme::template(AuthKind::None).is_none());
    }

    #[test]
    fn deserializes_open_id_connect() {
        let scheme: SecurityScheme = serde_json::from_value(json!({
            "type": "openIdConnect",
            "openIdConnectUrl": "https://id.example.com/.well-known/openid-configuration"
        }))
        .unwrap();
        assert!(matches!(scheme, SecurityScheme::OpenIdConnect { .. }));
    }

    #[test]
    fn rejects_unknown_type() {
        let result = serde_json::from_value::<SecurityScheme>(json!({ "type": "mutualTLS" }));
        assert!(result.is_err());
    }
}
