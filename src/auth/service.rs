//! Auth orchestration: login, signup, OAuth, logout and session restore

use std::sync::Arc;
use tracing::{error, info, warn};

use super::models::{AuthResponse, AuthState, LoginRequest, SignupRequest, User};
use super::repository::AuthRepository;
use super::session::{decode_claims, SessionStore};
use super::validators::{validate_provider, LoginValidator, SignupValidator};
use crate::common::{safe_email_log, safe_token_log, ClientError, Validator};

/// Drives the Unauthenticated -> Authenticating -> Authenticated lifecycle
///
/// Failed attempts fall back to Unauthenticated without touching the stored
/// token. OAuth uses the redirect flow: `oauth_login` hands out the provider
/// URL and `complete_oauth` consumes the token the backend redirects back with.
pub struct AuthService<R: AuthRepository> {
    repo: R,
    session: Arc<SessionStore>,
    state: AuthState,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: R, session: Arc<SessionStore>) -> Self {
        Self {
            repo,
            session,
            state: AuthState::Unauthenticated,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Rebuilds the state from the stored token, typically at startup
    pub fn restore(&mut self) -> &AuthState {
        let user = if self.session.is_valid() {
            self.session.current_user()
        } else {
            None
        };
        self.state = match user {
            Some(user) => AuthState::Authenticated(user),
            None => AuthState::Unauthenticated,
        };
        &self.state
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<User, ClientError> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        LoginValidator.validate(&request).into_result()?;

        info!(email = %safe_email_log(&request.email), "Logging in");
        self.state = AuthState::Authenticating;
        let result = self.repo.login(&request).await;
        self.finish("login", result)
    }

    pub async fn signup(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ClientError> {
        let request = SignupRequest {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        SignupValidator.validate(&request).into_result()?;

        info!(
            username = %request.username,
            email = %safe_email_log(&request.email),
            "Signing up"
        );
        self.state = AuthState::Authenticating;
        let result = self.repo.signup(&request).await;
        self.finish("signup", result)
    }

    /// Authorization URL for `provider`; the local state is left as is
    pub fn oauth_login(&self, provider: &str) -> Result<String, ClientError> {
        let provider = provider.trim();
        validate_provider(provider).into_result()?;

        let url = self.repo.oauth_url(provider);
        info!(provider = %provider, url = %url, "Starting OAuth redirect");
        Ok(url)
    }

    /// Consumes the token delivered to the OAuth callback
    pub fn complete_oauth(&mut self, token: &str) -> Result<User, ClientError> {
        let token = token.trim();
        if token.is_empty() {
            warn!("OAuth callback received no token");
            return Err(ClientError::Unauthorized(
                "authentication failed, no token received".to_string(),
            ));
        }

        self.state = AuthState::Authenticating;
        let claims = match decode_claims(token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!(
                    error = %e,
                    token = %safe_token_log(token),
                    "OAuth callback token is malformed"
                );
                self.state = AuthState::Unauthenticated;
                return Err(ClientError::Unauthorized(
                    "authentication failed, invalid token received".to_string(),
                ));
            }
        };

        let result = Ok(AuthResponse {
            token: token.to_string(),
            user: User::from_claims(&claims),
        });
        self.finish("oauth", result)
    }

    /// Local only: the token is a self-contained bearer credential
    pub fn logout(&mut self) {
        self.session.clear();
        self.state = AuthState::Unauthenticated;
        info!("Logged out");
    }

    pub fn get_current_user(&self) -> Option<User> {
        self.session.current_user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_valid()
    }

    fn finish(
        &mut self,
        operation: &str,
        result: Result<AuthResponse, ClientError>,
    ) -> Result<User, ClientError> {
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                error!(operation = %operation, error = %e, "Authentication failed");
                self.state = AuthState::Unauthenticated;
                return Err(e);
            }
        };

        if let Err(e) = self.session.save(&response.token) {
            self.state = AuthState::Unauthenticated;
            return Err(e);
        }

        info!(operation = %operation, user_id = response.user.id, "Authenticated");
        self.state = AuthState::Authenticated(response.user.clone());
        Ok(response.user)
    }
}
