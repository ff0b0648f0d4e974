//! # Remote Client
//!
//! Authenticated requests against the BigCommerce REST API.
//!
//! ## Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Remote Client                                 │
//! │                                                                         │
//! │  CommerceApi<C>          typed operations                              │
//! │  ───────────────         create_order / create_product /               │
//! │        │                 update_inventory(sku, ..)                     │
//! │        │ RemoteRequest { method, path, query, body }                   │
//! │        ▼                                                                │
//! │  RemoteClient (trait)    one request → parsed JSON or error            │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  BigCommerceClient       {base}/stores/{hash}{path}                    │
//! │                          X-Auth-Token, JSON body, request timeout      │
//! │                                                                         │
//! │  Errors:                                                               │
//! │  • hash/token unset    → MissingCredentials (at call time)             │
//! │  • non-2xx             → RemoteRequest { status, body }                │
//! │  • no response         → RemoteTransport                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No retries happen at this layer. A failed call is reported once and the
//! batch decides what to do with it.

use std::time::Duration;

use async_trait::async_trait;
use ferry_core::{InventoryUpdatePayload, OrderPayload, ProductPayload, RemoteId};
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::StoreSettings;
use crate::error::{SyncError, SyncResult};

/// Store-relative path of the v2 orders endpoint.
pub const ORDERS_PATH: &str = "/v2/orders";

/// Store-relative path of the v3 catalog products endpoint.
pub const PRODUCTS_PATH: &str = "/v3/catalog/products";

// =============================================================================
// Request Contract
// =============================================================================

/// One remote call. `path` is relative to the store root.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RemoteRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Attaches a JSON body.
    pub fn json<T: Serialize>(mut self, body: &T) -> SyncResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Performs a single authenticated request.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    async fn request(&self, request: RemoteRequest) -> SyncResult<Value>;
}

// =============================================================================
// BigCommerce Client
// =============================================================================

/// reqwest-backed [`RemoteClient`] for one store.
pub struct BigCommerceClient {
    http: Client,
    base_url: String,
    store_hash: Option<String>,
    access_token: Option<String>,
}

impl BigCommerceClient {
    /// Builds the client. Credentials may be absent here; they are checked
    /// on every call.
    pub fn new(store: &StoreSettings, timeout: Duration) -> SyncResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: store.api_base_url.trim_end_matches('/').to_string(),
            store_hash: store.hash.clone(),
            access_token: store.access_token.clone(),
        })
    }

    /// Shares the underlying connection pool (e.g. with an HTTP source).
    pub fn http(&self) -> &Client {
        &self.http
    }

    fn credentials(&self) -> SyncResult<(&str, &str)> {
        let hash = self
            .store_hash
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or(SyncError::MissingCredentials("BIGCOMMERCE_STORE_HASH"))?;
        let token = self
            .access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(SyncError::MissingCredentials("BIGCOMMERCE_ACCESS_TOKEN"))?;
        Ok((hash, token))
    }
}

#[async_trait]
impl RemoteClient for BigCommerceClient {
    async fn request(&self, request: RemoteRequest) -> SyncResult<Value> {
        let (hash, token) = self.credentials()?;
        let url = format!("{}/stores/{}{}", self.base_url, hash, request.path);
        debug!(method = %request.method, %url, "Remote request");

        let mut builder = self
            .http
            .request(request.method, &url)
            .header("X-Auth-Token", token)
            .header(reqwest::header::ACCEPT, "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SyncError::RemoteTransport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SyncError::RemoteTransport(e.to_string()))?;

        if !status.is_success() {
            return Err(SyncError::RemoteRequest {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

// =============================================================================
// Typed Operations
// =============================================================================

/// The three store operations Ferry performs.
pub struct CommerceApi<C> {
    client: C,
}

impl<C: RemoteClient> CommerceApi<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// `POST /v2/orders`; the new order id is the top-level `id`.
    pub async fn create_order(&self, payload: &OrderPayload) -> SyncResult<RemoteId> {
        let request = RemoteRequest::new(Method::POST, ORDERS_PATH).json(payload)?;
        let body = self.client.request(request).await?;
        body.get("id")
            .and_then(id_text)
            .map(RemoteId)
            .ok_or_else(|| SyncError::UnexpectedResponse(format!("order response without id: {body}")))
    }

    /// `POST /v3/catalog/products`; the new product id is `data.id`.
    pub async fn create_product(&self, payload: &ProductPayload) -> SyncResult<RemoteId> {
        let request = RemoteRequest::new(Method::POST, PRODUCTS_PATH).json(payload)?;
        let body = self.client.request(request).await?;
        body.get("data")
            .and_then(|data| data.get("id"))
            .and_then(id_text)
            .map(RemoteId)
            .ok_or_else(|| SyncError::UnexpectedResponse(format!("product response without data.id: {body}")))
    }

    /// `PUT /v3/catalog/products?sku={sku}`, addressed by SKU, not by id.
    ///
    /// The identifier is taken from `data`: an object's `id`, the ids of an
    /// array joined by `,`, or the compact JSON of whatever else came back.
    pub async fn update_inventory(&self, sku: &str, payload: &InventoryUpdatePayload) -> SyncResult<RemoteId> {
        let request = RemoteRequest::new(Method::PUT, PRODUCTS_PATH)
            .query("sku", sku)
            .json(payload)?;
        let body = self.client.request(request).await?;
        let data = body.get("data").unwrap_or(&body);
        Ok(RemoteId(inventory_id(data)))
    }
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn inventory_id(data: &Value) -> String {
    let id = match data {
        Value::Object(_) => data.get("id").and_then(id_text),
        Value::Array(items) => {
            let ids: Vec<String> = items
                .iter()
                .filter_map(|item| item.get("id").and_then(id_text))
                .collect();
            (!ids.is_empty()).then(|| ids.join(","))
        }
        _ => None,
    };
    id.unwrap_or_else(|| data.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
