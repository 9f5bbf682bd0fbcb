//! Typed client for the data service Web API.
//!
//! Wraps a [`reqwest::Client`] with the OData headers the service expects and
//! exposes the three request shapes the engine needs: entity definitions,
//! lookup attribute targets, and record page queries. Failed responses are
//! run through the diagnostic translator before being surfaced, so every
//! error a caller sees carries hints and correlation identifiers.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::{ApiError, ApiResult};
use crate::config::ServiceSettings;
use crate::diagnostics;
use crate::records::RawRecord;

/// Metadata fields selected from the entity definition endpoint.
const ENTITY_DEFINITION_SELECT: &str =
    "LogicalName,PrimaryIdAttribute,PrimaryNameAttribute,LogicalCollectionName,DisplayName";

/// Fields selected from the lookup attribute metadata endpoint.
const LOOKUP_ATTRIBUTE_SELECT: &str = "LogicalName,Targets,DisplayName";

/// Options for a record page query.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Columns for `$select`; the server returns its default set when empty.
    pub select: Vec<String>,
    /// Raw `$filter` expression.
    pub filter: Option<String>,
    /// Raw `$orderby` expression.
    pub order_by: Option<String>,
    /// Page size for `$top`.
    pub top: Option<u32>,
}

impl QueryOptions {
    /// A query that fetches the first `top` records with the server's
    /// default column set.
    pub fn sample(top: u32) -> Self {
        Self {
            top: Some(top),
            ..Self::default()
        }
    }

    fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if !self.select.is_empty() {
            pairs.push(("$select".to_string(), self.select.join(",")));
        }
        if let Some(filter) = &self.filter {
            pairs.push(("$filter".to_string(), filter.clone()));
        }
        if let Some(order_by) = &self.order_by {
            pairs.push(("$orderby".to_string(), order_by.clone()));
        }
        if let Some(top) = self.top {
            pairs.push(("$top".to_string(), top.to_string()));
        }
        pairs
    }
}

/// Client for the data service Web API.
#[derive(Clone)]
pub struct DataClient {
    http: Client,
    /// Versioned API root, e.g. `https://org.example.com/api/data/v9.2`.
    api_root: String,
    bearer_token: Option<String>,
}

impl DataClient {
    /// Build a client from service settings.
    pub fn new(settings: &ServiceSettings) -> ApiResult<Self> {
        let api_root = settings
            .api_root()
            .map_err(|err| ApiError::UnexpectedShape {
                url: String::new(),
                detail: err.to_string(),
            })?;
        let bearer_token = settings
            .bearer_token()
            .map_err(|err| ApiError::UnexpectedShape {
                url: String::new(),
                detail: err.to_string(),
            })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("OData-MaxVersion", HeaderValue::from_static("4.0"));
        headers.insert("OData-Version", HeaderValue::from_static("4.0"));
        // Annotations carry formatted values and lookup display names.
        headers.insert(
            "Prefer",
            HeaderValue::from_static("odata.include-annotations=\"*\""),
        );

        let http = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            http,
            api_root,
            bearer_token,
        })
    }

    /// The versioned API root this client talks to.
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Fetch the entity definition for a logical name.
    ///
    /// `GET .../EntityDefinitions(LogicalName='{name}')` selecting the five
    /// metadata fields the engine consumes.
    pub async fn entity_definition(&self, logical_name: &str) -> ApiResult<Value> {
        let url = entity_definition_url(&self.api_root, logical_name);
        self.get_json(&url, &[("$select".to_string(), ENTITY_DEFINITION_SELECT.to_string())])
            .await
    }

    /// Fetch lookup attribute metadata (targets) for one attribute.
    ///
    /// The endpoint 404s when the attribute exists but is not a lookup; the
    /// caller distinguishes that from transport failures.
    pub async fn lookup_attribute_targets(
        &self,
        entity: &str,
        attribute: &str,
    ) -> ApiResult<Value> {
        let url = lookup_attribute_url(&self.api_root, entity, attribute);
        self.get_json(&url, &[("$select".to_string(), LOOKUP_ATTRIBUTE_SELECT.to_string())])
            .await
    }

    /// Query a page of records from a collection route.
    pub async fn query_records(
        &self,
        collection_name: &str,
        options: &QueryOptions,
    ) -> ApiResult<Vec<RawRecord>> {
        let url = format!("{}/{}", self.api_root, collection_name);
        let body = self.get_json(&url, &options.to_query_pairs()).await?;

        let rows = body
            .get("value")
            .and_then(Value::as_array)
            .ok_or_else(|| ApiError::UnexpectedShape {
                url: url.clone(),
                detail: "expected a 'value' array of records".to_string(),
            })?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            match row.as_object() {
                Some(map) => records.push(map.clone()),
                None => {
                    return Err(ApiError::UnexpectedShape {
                        url,
                        detail: "record rows must be JSON objects".to_string(),
                    })
                }
            }
        }
        debug!(collection = collection_name, count = records.len(), "fetched record page");
        Ok(records)
    }

    /// Issue a GET and parse the JSON body, translating failures.
    async fn get_json(&self, url: &str, query: &[(String, String)]) -> ApiResult<Value> {
        let mut request = self.http.get(url).query(query);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let report = diagnostics::describe_response(response, Some(url)).await;
            warn!(%report, "request failed");
            return Err(ApiError::Service(Box::new(report)));
        }

        Ok(response.json().await?)
    }
}

fn entity_definition_url(api_root: &str, logical_name: &str) -> String {
    format!("{api_root}/EntityDefinitions(LogicalName='{logical_name}')")
}

fn lookup_attribute_url(api_root: &str, entity: &str, attribute: &str) -> String {
    format!(
        "{api_root}/EntityDefinitions(LogicalName='{entity}')/Attributes(LogicalName='{attribute}')/LookupAttributeMetadata"
    )
}
