//! # Todos Module
//!
//! Todo CRUD against the MyList API and the local collection that mirrors it.

pub mod manager;
pub mod models;
pub mod repository;
pub mod validators;

#[cfg(test)]
mod tests;

pub use manager::TodoManager;
pub use models::{ImageUpload, Todo, TodoInput, TodoStatus};
pub use repository::{HttpTodoRepository, TodoRepository};
