//! Session token storage and local token inspection
//!
//! The session store owns the bearer token. Claims are decoded locally and
//! without signature verification (the client never holds the signing
//! secret), so auth state can be determined without a network round-trip.
//! A revoked but unexpired token still looks valid until the server rejects it.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info, warn};

use super::models::{Claims, User};
use crate::common::{safe_token_log, ClientError};

/// Durable home of the session token
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> io::Result<Option<String>>;
    fn store(&self, token: &str) -> io::Result<()>;
    fn remove(&self) -> io::Result<()>;
}

/// Token kept in a single file, readable only by the owner on unix
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn store(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, token)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// In-process storage, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    fn slot(&self) -> io::Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.token
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "token storage lock poisoned"))
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.slot()?.clone())
    }

    fn store(&self, token: &str) -> io::Result<()> {
        *self.slot()? = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> io::Result<()> {
        *self.slot()? = None;
        Ok(())
    }
}

/// Decodes the claims of a session token without verifying its signature
pub fn decode_claims(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &DecodingKey::from_secret(b""), &validation).map(|d| d.claims)
}

pub struct SessionStore {
    storage: Box<dyn TokenStorage>,
    now: fn() -> DateTime<Utc>,
}

impl SessionStore {
    pub fn new(storage: Box<dyn TokenStorage>) -> Self {
        Self::with_clock(storage, Utc::now)
    }

    pub fn with_clock(storage: Box<dyn TokenStorage>, now: fn() -> DateTime<Utc>) -> Self {
        Self { storage, now }
    }

    /// Persists the token, replacing any previous one
    pub fn save(&self, token: &str) -> Result<(), ClientError> {
        self.storage.store(token).map_err(|e| {
            warn!(error = %e, "Failed to persist session token");
            ClientError::Storage(e)
        })?;
        debug!(token = %safe_token_log(token), "Session token saved");
        Ok(())
    }

    /// Stored token, or None when there is none or storage is unreadable
    pub fn read(&self) -> Option<String> {
        match self.storage.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Session storage unavailable, treating as logged out");
                None
            }
        }
    }

    pub fn clear(&self) {
        match self.storage.remove() {
            Ok(()) => debug!("Session token cleared"),
            Err(e) => warn!(error = %e, "Failed to remove session token"),
        }
    }

    /// Identity projected from the stored token's claims
    ///
    /// A token that cannot be decoded is discarded.
    pub fn current_user(&self) -> Option<User> {
        let token = self.read()?;

        match decode_claims(&token) {
            Ok(claims) => Some(User::from_claims(&claims)),
            Err(e) => {
                warn!(
                    error = %e,
                    token = %safe_token_log(&token),
                    "Stored token is malformed, clearing session"
                );
                self.clear();
                None
            }
        }
    }

    /// True while a decodable, unexpired token is stored
    ///
    /// Expired, undecodable and exp-less tokens are discarded.
    pub fn is_valid(&self) -> bool {
        let token = match self.read() {
            Some(token) => token,
            None => return false,
        };

        let claims = match decode_claims(&token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!(
                    error = %e,
                    token = %safe_token_log(&token),
                    "Stored token is malformed, clearing session"
                );
                self.clear();
                return false;
            }
        };

        let now_ms = (self.now)().timestamp_millis();
        match claims.exp {
            Some(exp) if exp.saturating_mul(1000) > now_ms => true,
            Some(exp) => {
                info!(user_id = claims.user_id, exp, "Session token expired, clearing session");
                self.clear();
                false
            }
            None => {
                warn!(user_id = claims.user_id, "Session token has no expiry, clearing session");
                self.clear();
                false
            }
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}
