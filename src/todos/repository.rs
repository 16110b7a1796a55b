//! Todo repository: the boundary between the collection manager and the API

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use super::models::{Todo, TodoInput};
use crate::common::ClientError;
use crate::services::ApiClient;

#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Todo>, ClientError>;
    /// Single `GET /todos/{id}`; `TodoManager` refetches the whole list instead
    async fn get_by_id(&self, id: i64) -> Result<Todo, ClientError>;
    async fn create(&self, input: &TodoInput) -> Result<Todo, ClientError>;
    async fn update(&self, id: i64, input: &TodoInput) -> Result<Todo, ClientError>;
    async fn delete(&self, id: i64) -> Result<(), ClientError>;
    async fn fetch_image(&self, image_path: &str) -> Result<Bytes, ClientError>;
    /// Absolute URL of an image path from `Todo::attached_image`
    fn image_url(&self, image_path: &str) -> String;
}

/// REST adapter over /todos and /images
#[derive(Clone)]
pub struct HttpTodoRepository {
    api: ApiClient,
}

impl HttpTodoRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

/// Multipart body: title, description, status and an optional image part
fn todo_form(input: &TodoInput) -> Result<Form, ClientError> {
    let form = Form::new()
        .text("title", input.title.clone())
        .text("description", input.description.clone())
        .text("status", input.status.as_str());

    let form = match &input.image {
        Some(image) => {
            let part = Part::bytes(image.data.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)
                .map_err(|_| {
                    ClientError::Validation(format!(
                        "image: invalid content type '{}'",
                        image.content_type
                    ))
                })?;
            form.part("image", part)
        }
        None => form,
    };

    Ok(form)
}

#[async_trait]
impl TodoRepository for HttpTodoRepository {
    async fn get_all(&self) -> Result<Vec<Todo>, ClientError> {
        self.api.get("/todos").await
    }

    async fn get_by_id(&self, id: i64) -> Result<Todo, ClientError> {
        self.api.get(&format!("/todos/{}", id)).await
    }

    async fn create(&self, input: &TodoInput) -> Result<Todo, ClientError> {
        debug!(title = %input.title, has_image = input.image.is_some(), "POST /todos");
        self.api.post_form("/todos", todo_form(input)?).await
    }

    async fn update(&self, id: i64, input: &TodoInput) -> Result<Todo, ClientError> {
        debug!(todo_id = id, has_image = input.image.is_some(), "PUT /todos/{}", id);
        self.api
            .put_form(&format!("/todos/{}", id), todo_form(input)?)
            .await
    }

    async fn delete(&self, id: i64) -> Result<(), ClientError> {
        debug!(todo_id = id, "DELETE /todos/{}", id);
        self.api.delete(&format!("/todos/{}", id)).await
    }

    async fn fetch_image(&self, image_path: &str) -> Result<Bytes, ClientError> {
        self.api.get_bytes(image_path).await
    }

    fn image_url(&self, image_path: &str) -> String {
        self.api.url(image_path)
    }
}
