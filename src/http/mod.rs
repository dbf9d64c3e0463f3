//! Authenticated REST client for the EcoGest backend.
//!
//! Wraps [`reqwest`] with the configured base URL and injects the bearer
//! token held by the [`TokenStore`] into every outgoing request. There is
//! no retry or backoff: a failed call is returned to the caller as-is.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::auth::TokenStore;
use crate::config::AppConfig;
use crate::errors::{ClientError, ErrorBody, Result};

/// Query string pairs in the order they are sent.
pub type QueryPairs = Vec<(String, String)>;

/// HTTP client bound to one backend.
pub struct HttpClient {
    client: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl HttpClient {
    /// Build a client from configuration.
    pub fn new(config: &AppConfig, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {}", e)))?;
        Self::with_client(client, &config.api_base_url, tokens)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self> {
        Ok(Self {
            client,
            base_url: normalize_base(base_url)?,
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Resolves an endpoint path against the base URL. Leading slashes are
    /// ignored so that a base with a path prefix (`/api/`) is preserved.
    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(String, String)]) -> Result<T> {
        let request = self.request(Method::GET, path)?.query(query);
        let response = self.send(request).await?;
        Self::parse_response(response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path)?.json(body);
        let response = self.send(request).await?;
        Self::parse_response(response).await
    }

    pub async fn delete(&self, path: &str, query: &[(String, String)]) -> Result<()> {
        let request = self.request(Method::DELETE, path)?.query(query);
        self.send(request).await?;
        Ok(())
    }

    /// `POST` a mutation and return whatever the backend answered.
    ///
    /// Mutations are acknowledged with a record, a plain-text message or
    /// nothing, so the body is not parsed here. Once the status is a
    /// success the change happened; a body that cannot be read is logged
    /// and returned empty.
    pub async fn post_ack<B>(&self, path: &str, body: &B) -> Result<Bytes>
    where
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, path)?.json(body);
        let response = self.send(request).await?;
        Ok(Self::read_ack(response).await)
    }

    /// `PUT` counterpart of [`post_ack`](Self::post_ack).
    pub async fn put_ack<B>(&self, path: &str, query: &[(String, String)], body: &B) -> Result<Bytes>
    where
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::PUT, path)?.query(query).json(body);
        let response = self.send(request).await?;
        Ok(Self::read_ack(response).await)
    }

    /// `multipart/form-data` counterpart of [`post_ack`](Self::post_ack)
    /// (attachments).
    pub async fn post_multipart_ack(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<Bytes> {
        let request = self.request(Method::POST, path)?.multipart(form);
        let response = self.send(request).await?;
        Ok(Self::read_ack(response).await)
    }

    /// `POST` a JSON body and return the raw response bytes (PDF blobs).
    pub async fn post_for_bytes<B>(&self, path: &str, body: &B) -> Result<Bytes>
    where
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, path)?.json(body);
        let response = self.send(request).await?;
        Ok(response.bytes().await?)
    }

    /// `GET` raw response bytes.
    pub async fn get_bytes(&self, path: &str, query: &[(String, String)]) -> Result<Bytes> {
        let request = self.request(Method::GET, path)?.query(query);
        let response = self.send(request).await?;
        Ok(response.bytes().await?)
    }

    // ---- private helpers ----

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.url(path)?;
        let mut builder = self.client.request(method, url);
        if let Some(token) = self.tokens.load()? {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ClientError::Session("stored token is not a valid header value".into()))?;
            value.set_sensitive(true);
            builder = builder.header(AUTHORIZATION, value);
        }
        Ok(builder)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        let started = Instant::now();

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(%method, %path, error = %err, "request failed before a response");
                return Err(err.into());
            }
        };

        let status = response.status();
        debug!(
            %method,
            %path,
            status = status.as_u16(),
            duration_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
        Self::ensure_success(response).await
    }

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or a [`ClientError::Api`] carrying the status
    /// and backend message on failure.
    async fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(ClientError::api(status.as_u16(), ErrorBody::message_from(&body)))
    }

    async fn read_ack(response: Response) -> Bytes {
        match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, "could not read acknowledgement body");
                Bytes::new()
            }
        }
    }

    /// Parse a JSON body. An empty body is read as `null`, so endpoints that
    /// answer mutations with no content still deserialize into `()` or
    /// `Option<T>`.
    async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_slice(b"null")?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn normalize_base(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
