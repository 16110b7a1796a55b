// src/todos/validators.rs

use super::models::{TodoInput, TodoStatus, ALLOWED_IMAGE_TYPES};
use crate::common::{ValidationResult, Validator};

// ============================================================================
// Todo Validators
// ============================================================================

pub struct TodoInputValidator;

impl Validator<TodoInput> for TodoInputValidator {
    fn validate(&self, data: &TodoInput) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.require("title", &data.title, "Title is required");

        if data.status == TodoStatus::Unknown {
            result.add_error("status", "Status must be one of pending, in_progress, done");
        }

        if let Some(image) = &data.image {
            if image.data.is_empty() {
                result.add_error("image", "Image file is empty");
            }
            if !ALLOWED_IMAGE_TYPES.contains(&image.content_type.as_str()) {
                result.add_error("image", "Image must be a PNG, JPEG, GIF or WebP file");
            }
        }

        result
    }
}
