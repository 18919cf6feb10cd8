//! HTTP client for communicating with the content backend

use agency_core::{Record, config::ApiConfig, types::unwrap_envelope};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tracing::{debug, error, warn};

use crate::{
    error::{ClientError, ClientResult},
    navigator::{LOGIN_PATH, Navigator},
    resources::{Operation, Resource},
    session::SessionHolder,
};

/// `reqwest` client honoring the configured request timeout
///
/// # Errors
///
/// Returns an error if the client cannot be built.
pub(crate) fn http_client(api: &ApiConfig) -> ClientResult<Client> {
    let mut builder = Client::builder();
    if let Some(seconds) = api.timeout_seconds {
        builder = builder.timeout(Duration::from_secs(seconds));
    }
    Ok(builder.build()?)
}

/// API client for the backend's `/api/v1` resources
///
/// Attaches the stored bearer token to every request and handles 401 globally:
/// the session is cleared and the navigator is sent to the login route.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    root: String,
    session: SessionHolder,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Create a new API client rooted at `root` (base URL plus prefix)
    pub fn new(
        root: impl Into<String>,
        session: SessionHolder,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::with_client(Client::new(), root, session, navigator)
    }

    /// Create a client around a preconfigured `reqwest` client
    pub fn with_client(
        client: Client,
        root: impl Into<String>,
        session: SessionHolder,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let root = root.into().trim_end_matches('/').to_string();
        Self {
            client,
            root,
            session,
            navigator,
        }
    }

    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn from_config(
        api: &ApiConfig,
        session: SessionHolder,
        navigator: Arc<dyn Navigator>,
    ) -> ClientResult<Self> {
        Ok(Self::with_client(http_client(api)?, api.root(), session, navigator))
    }

    /// Session handle shared with this client
    pub const fn session(&self) -> &SessionHolder {
        &self.session
    }

    /// Absolute URL for a path under the root
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.root, path.trim_start_matches('/'))
    }

    /// Client scoped to one resource
    pub fn resource(&self, resource: Resource) -> ResourceClient {
        ResourceClient {
            api: self.clone(),
            resource,
        }
    }

    /// `GET` a path and return the unwrapped body
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn get(&self, path: &str) -> ClientResult<Value> {
        self.execute(Method::GET, path, None).await
    }

    /// `POST` a JSON body
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn post(&self, path: &str, body: &Value) -> ClientResult<Value> {
        self.execute(Method::POST, path, Some(body)).await
    }

    /// `PUT` a JSON body
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn put(&self, path: &str, body: &Value) -> ClientResult<Value> {
        self.execute(Method::PUT, path, Some(body)).await
    }

    /// `DELETE` a path
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn delete(&self, path: &str) -> ClientResult<Value> {
        self.execute(Method::DELETE, path, None).await
    }

    /// Send one request; no retry, no backoff
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on transport failure
    /// - [`ClientError::Unauthorized`] on 401, after clearing the session
    /// - [`ClientError::Status`] on any other non-success status
    /// - [`ClientError::Rejected`] when an envelope reports `success: false`
    /// - [`ClientError::Decode`] when the body is not JSON
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> ClientResult<Value> {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), &url);
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized(&method, &url);
            return Err(ClientError::Unauthorized);
        }

        let text = response.text().await?;

        if !status.is_success() {
            let message = error_message(&text).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            error!("{} {} failed with {}: {}", method, url, status, message);
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        let value: Value = serde_json::from_str(&text)?;
        unwrap_envelope(value).map_err(|message| ClientError::Rejected { message })
    }

    fn handle_unauthorized(&self, method: &Method, url: &str) {
        warn!("{} {} returned 401; clearing session", method, url);
        if let Err(e) = self.session.clear() {
            error!("Failed to clear session after 401: {}", e);
        }
        self.navigator.navigate(LOGIN_PATH);
    }
}

/// Pull a human-readable message out of an error body
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(String::from)
}

/// CRUD client for a single resource
#[derive(Debug, Clone)]
pub struct ResourceClient {
    api: ApiClient,
    resource: Resource,
}

impl ResourceClient {
    /// Resource this client talks to
    pub const fn resource(&self) -> Resource {
        self.resource
    }

    fn ensure(&self, operation: Operation) -> ClientResult<()> {
        if self.resource.capabilities().supports(operation) {
            Ok(())
        } else {
            Err(ClientError::Unsupported {
                resource: self.resource,
                operation,
            })
        }
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.resource.path(), urlencoding::encode(id))
    }

    /// List every record
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not an array of objects.
    pub async fn get_all(&self) -> ClientResult<Vec<Record>> {
        self.ensure(Operation::Read)?;
        let value = self.api.get(self.resource.path()).await?;

        let Value::Array(items) = value else {
            return Err(ClientError::UnexpectedShape {
                expected: "an array of records",
            });
        };

        items
            .into_iter()
            .map(|item| Record::from_json(item).map_err(ClientError::from))
            .collect()
    }

    /// Create a record and return what the backend stored
    ///
    /// When the backend replies without an object body the payload is echoed
    /// back; it carries no identifier, so callers should refetch.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn create(&self, payload: &Record) -> ClientResult<Record> {
        self.ensure(Operation::Create)?;
        let value = self
            .api
            .post(self.resource.path(), &payload.to_json())
            .await?;
        Self::returned_record(value, payload)
    }

    /// Replace a record
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unsupported`] without sending anything when the
    /// resource has no update endpoint, or an error if the request fails.
    pub async fn update(&self, id: &str, payload: &Record) -> ClientResult<Record> {
        self.ensure(Operation::Update)?;
        let value = self.api.put(&self.item_path(id), &payload.to_json()).await?;
        let mut record = Self::returned_record(value, payload)?;
        if record.id().is_none() {
            record.insert(agency_core::types::ID_FIELD, id);
        }
        Ok(record)
    }

    /// Delete a record
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unsupported`] without sending anything when the
    /// resource has no delete endpoint, or an error if the request fails.
    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.ensure(Operation::Delete)?;
        self.api.delete(&self.item_path(id)).await?;
        Ok(())
    }

    fn returned_record(value: Value, payload: &Record) -> ClientResult<Record> {
        if value.is_object() {
            Ok(Record::from_json(value)?)
        } else {
            Ok(payload.clone())
        }
    }
}
