//! Local todo collection mirrored from the API
//!
//! The server is the source of truth. Mutations are confirm-then-apply: the
//! local list only changes after the server accepts the request, and a failed
//! request leaves it exactly as it was.

use bytes::Bytes;
use tracing::{debug, error, info};

use super::models::{Todo, TodoInput};
use super::repository::TodoRepository;
use super::validators::TodoInputValidator;
use crate::common::{ClientError, Validator};

pub struct TodoManager<R: TodoRepository> {
    repo: R,
    todos: Vec<Todo>,
}

impl<R: TodoRepository> TodoManager<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            todos: Vec::new(),
        }
    }

    /// Cached todos, in server order with local creations first
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Replaces the cache with the server's current list
    pub async fn fetch_all(&mut self) -> Result<&[Todo], ClientError> {
        let todos = self.repo.get_all().await.map_err(|e| {
            error!(error = %e, "Failed to fetch todos");
            e
        })?;
        info!(count = todos.len(), "Fetched todos");
        self.todos = todos;
        Ok(&self.todos)
    }

    /// Cache hit, or a full refetch followed by a scan
    pub async fn get_by_id(&mut self, id: i64) -> Result<Todo, ClientError> {
        if let Some(todo) = self.find(id) {
            debug!(todo_id = id, "Todo served from cache");
            return Ok(todo.clone());
        }

        debug!(todo_id = id, "Todo not cached, refetching list");
        self.fetch_all().await?;
        self.find(id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("todo {} not found", id)))
    }

    pub async fn create(&mut self, input: TodoInput) -> Result<Todo, ClientError> {
        TodoInputValidator.validate(&input).into_result()?;

        let todo = self.repo.create(&input).await.map_err(|e| {
            error!(error = %e, title = %input.title, "Failed to create todo");
            e
        })?;

        info!(todo_id = todo.id, "Todo created");
        self.todos.insert(0, todo.clone());
        Ok(todo)
    }

    /// Full replacement; the cached entry keeps its position
    pub async fn update(&mut self, id: i64, input: TodoInput) -> Result<Todo, ClientError> {
        TodoInputValidator.validate(&input).into_result()?;

        let updated = self.repo.update(id, &input).await.map_err(|e| {
            error!(error = %e, todo_id = id, "Failed to update todo");
            e
        })?;

        info!(todo_id = id, "Todo updated");
        if let Some(slot) = self.todos.iter_mut().find(|t| t.id == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    pub async fn delete(&mut self, id: i64) -> Result<(), ClientError> {
        self.repo.delete(id).await.map_err(|e| {
            error!(error = %e, todo_id = id, "Failed to delete todo");
            e
        })?;

        info!(todo_id = id, "Todo deleted");
        self.todos.retain(|t| t.id != id);
        Ok(())
    }

    pub fn image_url(&self, todo: &Todo) -> Option<String> {
        todo.attached_image().map(|path| self.repo.image_url(&path))
    }

    /// Downloads the image attached to `todo`, if any
    pub async fn fetch_image(&self, todo: &Todo) -> Result<Option<Bytes>, ClientError> {
        match todo.attached_image() {
            Some(path) => Ok(Some(self.repo.fetch_image(&path).await?)),
            None => Ok(None),
        }
    }

    fn find(&self, id: i64) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }
}
