//! Adapter for a REST endpoint

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Method;
use url::Url;

use super::TableAdapter;
use crate::error::AdapterError;
use crate::model::Column;
use crate::model::Row;
use crate::model::RowId;
use crate::model::Value;
use crate::query::Page;
use crate::query::PageRequest;

/// Talks to a table endpoint over HTTP.
///
/// Routes, relative to the base URL:
///
/// | Operation | Request |
/// |-----------|---------|
/// | fetch | `GET /all?page=&limit=&sortFields=&sortOrders=` |
/// | add | `POST /add` (form body) |
/// | update | `PUT /update/{id}` (form body) |
/// | delete | `DELETE /delete/{id}` |
/// | sync one | `GET /sync/{id}` |
/// | sync all | `GET /syncall` |
///
/// Non-2xx responses become [`AdapterError::Http`] carrying the response body.
///
/// This adapter is cheap to clone (uses `Arc` internally).
///
/// # Example
///
/// ```ignore
/// use edittable_lib::adapter::RemoteAdapter;
///
/// let adapter = RemoteAdapter::builder()
///     .url("https://example.com/api/items")
///     .columns(columns.clone())
///     .timeout(Duration::from_secs(10))
///     .build()?;
/// ```
#[derive(Clone)]
pub struct RemoteAdapter {
    inner: Arc<RemoteAdapterInner>,
}

struct RemoteAdapterInner {
    base_url: String,
    columns: Vec<Column>,
    http_client: Client,
    timeout: Option<Duration>,
}

impl RemoteAdapter {
    /// Creates a new builder.
    pub fn builder() -> RemoteAdapterBuilder<Missing> {
        RemoteAdapterBuilder::new()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base_url.trim_end_matches('/'), path)
    }

    fn row_endpoint(&self, action: &str, id: &RowId) -> String {
        self.endpoint(&format!("{}/{}", action, urlencoding::encode(&id.to_string())))
    }

    /// Builds the fetch URL; each sort key adds one `sortFields`/`sortOrders` pair.
    pub(crate) fn fetch_url(&self, request: &PageRequest) -> Result<Url, AdapterError> {
        let endpoint = self.endpoint("all");
        let mut url = Url::parse(&endpoint).map_err(|_| AdapterError::InvalidUrl(endpoint))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page", &request.page.to_string());
            query.append_pair("limit", &request.limit.to_string());
            for (field, direction) in request.sort.keys() {
                query.append_pair("sortFields", field);
                query.append_pair("sortOrders", direction.as_str());
            }
        }
        Ok(url)
    }

    /// Returns the form fields sent for a row.
    ///
    /// Inserts send every configured column the row has, updates skip
    /// read-only columns. With no columns configured all fields are sent.
    pub(crate) fn form_fields(&self, row: &Row, include_read_only: bool) -> Vec<(String, String)> {
        if self.inner.columns.is_empty() {
            return row
                .fields()
                .iter()
                .map(|(field, value)| (field.clone(), value.to_string()))
                .collect();
        }

        self.inner
            .columns
            .iter()
            .filter(|column| include_read_only || !column.read_only)
            .filter_map(|column| {
                row.get(&column.field)
                    .map(|value| (column.field.clone(), value.to_string()))
            })
            .collect()
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        form: Option<Vec<(String, String)>>,
    ) -> Result<String, AdapterError> {
        let mut request = self.inner.http_client.request(method.clone(), url);

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        if let Some(form) = form {
            request = request.form(&form);
        }

        log::debug!("[remote] {} {}", method, url);

        let response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        if status.is_success() {
            Ok(body)
        } else {
            log::warn!("[remote] {} {} failed with {}", method, url, status);
            Err(AdapterError::http(status.as_u16(), body))
        }
    }

    fn classify(&self, error: reqwest::Error) -> AdapterError {
        match self.inner.timeout {
            Some(timeout) if error.is_timeout() => AdapterError::Timeout(timeout),
            _ => AdapterError::Network(error),
        }
    }
}

impl std::fmt::Debug for RemoteAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteAdapter")
            .field("base_url", &self.inner.base_url)
            .field("columns", &self.inner.columns.len())
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

/// Reads the `id` an insert response reports, if the body is JSON with one.
fn assigned_id(body: &str) -> Option<RowId> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    let id = json.get("id")?.clone();
    RowId::from_value(&Value::from(id))
}

#[async_trait]
impl TableAdapter for RemoteAdapter {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, AdapterError> {
        let url = self.fetch_url(request)?;
        let body = self.send(Method::GET, url.as_str(), None).await?;

        serde_json::from_str::<Page>(&body)
            .map(Page::normalized)
            .map_err(|e| AdapterError::parse_with_body(e.to_string(), body))
    }

    async fn add_row(&self, row: &Row) -> Result<Option<RowId>, AdapterError> {
        let form = self.form_fields(row, true);
        let body = self.send(Method::POST, &self.endpoint("add"), Some(form)).await?;
        Ok(assigned_id(&body))
    }

    async fn update_row(&self, row: &Row) -> Result<(), AdapterError> {
        let form = self.form_fields(row, false);
        let url = self.row_endpoint("update", row.id());
        self.send(Method::PUT, &url, Some(form)).await.map(|_| ())
    }

    async fn delete_row(&self, id: &RowId) -> Result<(), AdapterError> {
        let url = self.row_endpoint("delete", id);
        self.send(Method::DELETE, &url, None).await.map(|_| ())
    }

    async fn sync_row(&self, id: &RowId) -> Result<(), AdapterError> {
        let url = self.row_endpoint("sync", id);
        self.send(Method::GET, &url, None).await.map(|_| ())
    }

    async fn sync_all(&self) -> Result<(), AdapterError> {
        self.send(Method::GET, &self.endpoint("syncall"), None)
            .await
            .map(|_| ())
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for a missing required builder field.
pub struct Missing;

/// Marker type for a set builder field.
pub struct Set<T>(T);

/// Builder for a [`RemoteAdapter`].
///
/// The base URL is required and checked at compile time.
pub struct RemoteAdapterBuilder<U> {
    url: U,
    columns: Vec<Column>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl RemoteAdapterBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            columns: Vec::new(),
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }

    /// Sets the base URL of the endpoint.
    pub fn url(self, url: impl Into<String>) -> RemoteAdapterBuilder<Set<String>> {
        RemoteAdapterBuilder {
            url: Set(url.into()),
            columns: self.columns,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl Default for RemoteAdapterBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> RemoteAdapterBuilder<U> {
    /// Sets the columns that decide which fields go into form bodies.
    pub fn columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// Ignored when a custom HTTP client is supplied.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl RemoteAdapterBuilder<Set<String>> {
    /// Builds the [`RemoteAdapter`].
    ///
    /// Fails if the URL does not parse or the HTTP client cannot be built.
    pub fn build(self) -> Result<RemoteAdapter, AdapterError> {
        let base_url = self.url.0;
        Url::parse(&base_url).map_err(|_| AdapterError::InvalidUrl(base_url.clone()))?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(RemoteAdapter {
            inner: Arc::new(RemoteAdapterInner {
                base_url,
                columns: self.columns,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}
