//! MyList client library
//!
//! Session handling, authentication and todo CRUD for the MyList REST API.

pub mod auth;
pub mod common;
pub mod services;
pub mod todos;

pub use auth::{AuthService, SessionStore, User};
pub use common::{AppState, ClientError, Config};
pub use services::ApiClient;
pub use todos::{Todo, TodoInput, TodoManager, TodoStatus};
