//! Auth repository: the boundary between the auth service and the backend

use async_trait::async_trait;
use tracing::debug;

use super::models::{AuthResponse, LoginRequest, SignupRequest};
use crate::common::{safe_email_log, ClientError};
use crate::services::ApiClient;

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError>;
    async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, ClientError>;
    /// Provider authorization URL the browser is sent to
    fn oauth_url(&self, provider: &str) -> String;
}

/// REST adapter: POST /login, POST /signup, GET /auth/{provider}
#[derive(Clone)]
pub struct HttpAuthRepository {
    api: ApiClient,
}

impl HttpAuthRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AuthRepository for HttpAuthRepository {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        debug!(email = %safe_email_log(&request.email), "POST /login");
        self.api.post_json("/login", request).await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, ClientError> {
        debug!(
            username = %request.username,
            email = %safe_email_log(&request.email),
            "POST /signup"
        );
        self.api.post_json("/signup", request).await
    }

    fn oauth_url(&self, provider: &str) -> String {
        self.api
            .url(&format!("/auth/{}", urlencoding::encode(provider)))
    }
}
