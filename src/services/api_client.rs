// src/services/api_client.rs
//! HTTP gateway to the MyList REST API
//!
//! Thin facade over `reqwest`: every request picks up the current session
//! token as a bearer credential, non-2xx responses become `ClientError`s
//! carrying the status and body, and nothing is retried.

use bytes::Bytes;
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::auth::SessionStore;
use crate::common::config::normalize_api_url;
use crate::common::{safe_token_log, ClientError};

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        session: Arc<SessionStore>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let base_url = normalize_api_url(base_url);
        if base_url.is_empty() {
            return Err(ClientError::Config(
                "API base URL is not defined. Set MYLIST_API_URL or pass --api-url.".to_string(),
            ));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "API base URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path (leading slash optional)
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Self::json(response).await
    }

    /// Raw body of a GET, used for image downloads
    pub async fn get_bytes(&self, path: &str) -> Result<Bytes, ClientError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Ok(response.bytes().await?)
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .send(self.request(Method::POST, path).json(body))
            .await?;
        Self::json(response).await
    }

    pub async fn put_json<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send(self.request(Method::PUT, path).json(body)).await?;
        Self::json(response).await
    }

    /// DELETE; the response body (usually empty, 204) is discarded
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ClientError> {
        let response = self
            .send(self.request(Method::POST, path).multipart(form))
            .await?;
        Self::json(response).await
    }

    pub async fn put_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ClientError> {
        let response = self
            .send(self.request(Method::PUT, path).multipart(form))
            .await?;
        Self::json(response).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        let builder = self.client.request(method.clone(), &url);

        match self.session.read() {
            Some(token) => {
                debug!(%method, %url, token = %safe_token_log(&token), "Sending authenticated request");
                builder.bearer_auth(token)
            }
            None => {
                debug!(%method, %url, "Sending unauthenticated request");
                builder
            }
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let response = builder.send().await.map_err(|e| {
            error!(error = %e, "HTTP request to MyList API failed");
            ClientError::Network(e)
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(http_status = %status, "Received successful response");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(http_status = %status, body = %body.trim(), "MyList API returned error status");
        Err(ClientError::from_status(status, body))
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            error!(error = %e, "Failed to parse MyList API response");
            ClientError::Decode(e.to_string())
        })
    }
}
