// Application state shared by the command handlers

use std::sync::Arc;

use super::config::Config;
use super::error::ClientError;
use crate::auth::{AuthService, FileTokenStorage, HttpAuthRepository, SessionStore};
use crate::services::ApiClient;
use crate::todos::{HttpTodoRepository, TodoManager};

/// Configuration, the session store and the HTTP gateway, wired together
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, ClientError> {
        let storage = FileTokenStorage::new(config.token_path.clone());
        let session = Arc::new(SessionStore::new(Box::new(storage)));
        let api = ApiClient::new(&config.api_url, session.clone(), config.http_timeout)?;

        Ok(Self {
            config,
            session,
            api,
        })
    }

    pub fn auth_service(&self) -> AuthService<HttpAuthRepository> {
        AuthService::new(HttpAuthRepository::new(self.api.clone()), self.session.clone())
    }

    pub fn todo_manager(&self) -> TodoManager<HttpTodoRepository> {
        TodoManager::new(HttpTodoRepository::new(self.api.clone()))
    }
}
