//! Authentication data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// JWT claims carried by the session token
///
/// The backend writes `user_id` as a decimal string; a bare JSON number is
/// accepted as well. `exp` is seconds since the Unix epoch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Claims {
    #[serde(
        serialize_with = "serialize_user_id",
        deserialize_with = "deserialize_user_id"
    )]
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// User record returned by login/signup, or projected from token claims
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

impl User {
    /// Minimal identity: the token does not carry username or email
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.user_id,
            username: String::new(),
            email: String::new(),
            created_at: None,
            oauth_provider: None,
            picture: None,
        }
    }
}

/// POST /login body
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /signup body
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Response of /login and /signup
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Where the session currently stands
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Unauthenticated,
    /// A login, signup or OAuth completion is in flight
    Authenticating,
    Authenticated(User),
}

fn serialize_user_id<S>(user_id: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&user_id.to_string())
}

fn deserialize_user_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawUserId {
        Number(i64),
        Text(String),
    }

    match RawUserId::deserialize(deserializer)? {
        RawUserId::Number(id) => Ok(id),
        RawUserId::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}
