//! Todo data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::common::ClientError;

/// Image types accepted for todo attachments
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/gif", "image/webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    #[default]
    Pending,
    InProgress,
    Done,
    /// Any status the server stores that this client does not know
    #[serde(other)]
    Unknown,
}

impl TodoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::Pending => "pending",
            TodoStatus::InProgress => "in_progress",
            TodoStatus::Done => "done",
            TodoStatus::Unknown => "unknown",
        }
    }

    /// Human label, e.g. "in progress"
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TodoStatus {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(&[' ', '-'][..], "_").as_str() {
            "pending" => Ok(TodoStatus::Pending),
            "in_progress" => Ok(TodoStatus::InProgress),
            "done" => Ok(TodoStatus::Done),
            other => Err(ClientError::Validation(format!(
                "status: '{}' is not one of pending, in_progress, done",
                other
            ))),
        }
    }
}

/// Todo as returned by the API
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Todo {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TodoStatus,
    /// Path relative to the API host, e.g. `images/17`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    /// Bare image id, served under `images/{id}`; the list endpoint sends this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Relative path of the attached image, preferring `image_path`
    pub fn attached_image(&self) -> Option<String> {
        let non_empty = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        non_empty(&self.image_path)
            .or_else(|| non_empty(&self.image_id).map(|id| format!("images/{}", id)))
    }
}

/// Image attached to a create or update submission
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ImageUpload {
    /// Detects the content type from the bytes; non-images are rejected
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Result<Self, ClientError> {
        let file_name = file_name.into();
        if data.is_empty() {
            return Err(ClientError::Validation(format!(
                "image: '{}' is empty",
                file_name
            )));
        }

        let content_type = infer::get(&data)
            .map(|t| t.mime_type().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
            return Err(ClientError::Validation(format!(
                "image: '{}' is not a supported image ({})",
                file_name, content_type
            )));
        }

        Ok(Self {
            file_name,
            content_type,
            data,
        })
    }

    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            ClientError::Validation(format!("image: could not read {}: {}", path.display(), e))
        })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        Self::new(file_name, data)
    }
}

/// Body of a create or full-replacement update
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TodoInput {
    pub title: String,
    pub description: String,
    pub status: TodoStatus,
    pub image: Option<ImageUpload>,
}

impl TodoInput {
    pub fn new(title: impl Into<String>, description: impl Into<String>, status: TodoStatus) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status,
            image: None,
        }
    }

    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }

    /// Prefills an edit from the current server copy (image is not resent)
    pub fn from_todo(todo: &Todo) -> Self {
        Self::new(todo.title.clone(), todo.description.clone(), todo.status)
    }
}
