//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Password login and signup against the MyList API
//! - OAuth redirect and callback handling
//! - Session token persistence and local expiry checks

pub mod models;
pub mod repository;
pub mod service;
pub mod session;
pub mod validators;


pub use models::{AuthResponse, AuthState, Claims, LoginRequest, SignupRequest, User};
pub use repository::{AuthRepository, HttpAuthRepository};
pub use service::AuthService;
pub use session::{decode_claims, FileTokenStorage, MemoryTokenStorage, SessionStore, TokenStorage};
