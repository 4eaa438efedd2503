//! HTTP client for the Assets inventory REST API.
//!
//! Base URL: `{site_url}/gateway/api/jsm/assets/workspace/{workspace_id}/v1`.
//! Only the three read endpoints the core needs are implemented:
//!
//! - `GET /objectschema/list`
//! - `GET /objectschema/{id}/objecttypes/flat`
//! - `GET /objecttype/{id}/attributes`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::traits::InventorySource;
use crate::types::{AttributeMetadata, DataType, EntityInfo};
use crate::{AssetgateError, Result};

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// API base URL of a workspace on an Atlassian site.
pub fn workspace_base_url(site_url: &str, workspace_id: &str) -> String {
    format!(
        "{}/gateway/api/jsm/assets/workspace/{workspace_id}/v1",
        site_url.trim_end_matches('/')
    )
}

/// How requests authenticate.
#[derive(Clone)]
pub enum Credentials {
    /// Account email plus API token.
    Basic { email: String, token: String },
    /// OAuth or personal access token.
    Bearer(String),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Basic { email, .. } => f
                .debug_struct("Basic")
                .field("email", email)
                .field("token", &"<redacted>")
                .finish(),
            Credentials::Bearer(_) => f.debug_tuple("Bearer").field(&"<redacted>").finish(),
        }
    }
}

/// Client for the Assets inventory REST API.
#[derive(Debug, Clone)]
pub struct HttpInventoryClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpInventoryClient {
    /// Client for a workspace on an Atlassian site.
    pub fn new(site_url: &str, workspace_id: &str, credentials: Credentials) -> Result<Self> {
        Self::with_base_url(workspace_base_url(site_url, workspace_id), credentials, DEFAULT_TIMEOUT)
    }

    /// Client with an explicit API base URL (for testing with wiremock).
    pub fn with_base_url(
        base_url: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AssetgateError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Credentials::Basic { email, token } => request.basic_auth(email, Some(token)),
            Credentials::Bearer(token) => request.bearer_auth(token),
        }
    }

    /// GET `path` and decode the JSON body.
    ///
    /// `not_found` builds the error returned on HTTP 404.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        not_found: impl FnOnce() -> AssetgateError,
    ) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .authorize(self.http.get(&url))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AssetgateError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    AssetgateError::AuthenticationFailed
                }
                StatusCode::NOT_FOUND => not_found(),
                _ => {
                    let body = response.text().await.unwrap_or_default();
                    AssetgateError::Api {
                        status: status.as_u16(),
                        message: format!("inventory API error on GET {path}: {}", body.trim()),
                    }
                }
            });
        }

        response
            .json()
            .await
            .map_err(|e| AssetgateError::Http(format!("failed to decode response from {path}: {e}")))
    }
}

#[async_trait]
impl InventorySource for HttpInventoryClient {
    fn name(&self) -> &str {
        "assets-http"
    }

    async fn list_schemas(&self) -> Result<Vec<EntityInfo>> {
        let page: SchemaPage = self
            .get_json("/objectschema/list", || {
                AssetgateError::SchemaNotFound("schema listing".to_string())
            })
            .await?;
        Ok(page
            .values
            .into_iter()
            .map(|s| EntityInfo::new(s.id, s.name))
            .collect())
    }

    async fn list_object_types(&self, schema_id: &str) -> Result<Vec<EntityInfo>> {
        let types: Vec<ApiObjectType> = self
            .get_json(&format!("/objectschema/{schema_id}/objecttypes/flat"), || {
                AssetgateError::SchemaNotFound(schema_id.to_string())
            })
            .await?;
        Ok(types
            .into_iter()
            .map(|t| {
                let parent = t.object_schema_id.unwrap_or_else(|| schema_id.to_string());
                EntityInfo::new(t.id, t.name).with_parent(parent)
            })
            .collect())
    }

    async fn object_type_attributes(&self, object_type_id: &str) -> Result<Vec<AttributeMetadata>> {
        let attributes: Vec<ApiAttribute> = self
            .get_json(&format!("/objecttype/{object_type_id}/attributes"), || {
                AssetgateError::ObjectTypeNotFound(object_type_id.to_string())
            })
            .await?;
        Ok(attributes.into_iter().map(AttributeMetadata::from).collect())
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Deserialize)]
struct SchemaPage {
    #[serde(default)]
    values: Vec<ApiSchema>,
}

#[derive(Deserialize)]
struct ApiSchema {
    id: String,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiObjectType {
    id: String,
    name: String,
    #[serde(default)]
    object_schema_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiAttribute {
    name: String,
    /// 0 = default (see `default_type`), 1 = object reference, 7 = status.
    #[serde(rename = "type", default)]
    kind: u8,
    #[serde(default)]
    default_type: Option<ApiDefaultType>,
    #[serde(default)]
    minimum_cardinality: u32,
    #[serde(default = "default_true")]
    editable: bool,
    #[serde(default)]
    system: bool,
    /// Comma-separated select options.
    #[serde(default)]
    options: String,
    #[serde(default)]
    status_values: Vec<ApiStatus>,
}

#[derive(Deserialize)]
struct ApiDefaultType {
    name: String,
}

#[derive(Deserialize)]
struct ApiStatus {
    name: String,
}

fn default_true() -> bool {
    true
}

impl From<ApiAttribute> for AttributeMetadata {
    fn from(api: ApiAttribute) -> Self {
        let data_type = match api.kind {
            1 => DataType::Reference,
            7 => DataType::Status,
            _ => match api.default_type.as_ref().map(|t| t.name.to_lowercase()) {
                None => DataType::Text,
                Some(name) => match name.as_str() {
                    "text" | "textarea" | "email" | "url" => DataType::Text,
                    "integer" => DataType::Integer,
                    "boolean" => DataType::Boolean,
                    "date" => DataType::Date,
                    "datetime" => DataType::DateTime,
                    "select" => DataType::Select,
                    _ => DataType::Other(name),
                },
            },
        };

        let select_options = api
            .options
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        AttributeMetadata {
            name: api.name,
            required: api.minimum_cardinality > 0,
            editable: api.editable,
            system: api.system,
            data_type,
            select_options,
            status_values: api.status_values.into_iter().map(|s| s.name).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AttributeMetadata {
        serde_json::from_str::<ApiAttribute>(json).unwrap().into()
    }

    #[test]
    fn select_attribute_options_are_split() {
        let attr = parse(
            r#"{"name": "device_type", "type": 0, "defaultType": {"name": "Select"},
                "options": "Physical, Virtual,", "minimumCardinality": 1}"#,
        );
        assert_eq!(attr.data_type, DataType::Select);
        assert_eq!(attr.select_options, ["Physical", "Virtual"]);
        assert!(attr.required);
        assert!(attr.editable);
    }

    #[test]
    fn status_and_reference_kinds() {
        let status = parse(
            r#"{"name": "asset_status", "type": 7,
                "statusValues": [{"name": "In Stock"}, {"name": "In Use"}]}"#,
        );
        assert_eq!(status.data_type, DataType::Status);
        assert_eq!(status.status_values, ["In Stock", "In Use"]);

        let reference = parse(r#"{"name": "owner", "type": 1}"#);
        assert_eq!(reference.data_type, DataType::Reference);
    }

    #[test]
    fn system_attribute_flags() {
        let attr = parse(
            r#"{"name": "Created", "defaultType": {"name": "DateTime"},
                "editable": false, "system": true}"#,
        );
        assert!(attr.system);
        assert!(!attr.editable);
        assert!(!attr.required);
        assert_eq!(attr.data_type, DataType::DateTime);
    }

    #[test]
    fn unknown_default_type_is_kept() {
        let attr = parse(r#"{"name": "ip", "defaultType": {"name": "IPAddress"}}"#);
        assert_eq!(attr.data_type, DataType::Other("ipaddress".to_string()));
    }

    #[test]
    fn credentials_debug_redacts_secrets() {
        let basic = Credentials::Basic {
            email: "ops@acme.test".into(),
            token: "s3cret".into(),
        };
        let rendered = format!("{basic:?} {:?}", Credentials::Bearer("tok".into()));
        assert!(rendered.contains("ops@acme.test"));
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("tok\""));
    }

    #[test]
    fn site_url_builds_workspace_base() {
        let client = HttpInventoryClient::new(
            "https://acme.atlassian.net/",
            "ws-1",
            Credentials::Bearer("t".into()),
        )
        .unwrap();
        assert_eq!(
            client.base_url(),
            "https://acme.atlassian.net/gateway/api/jsm/assets/workspace/ws-1/v1"
        );
    }
}
