// src/auth/validators.rs

use super::models::{LoginRequest, SignupRequest};
use crate::common::{ValidationResult, Validator};

// ============================================================================
// Credential Validators
// ============================================================================

pub struct LoginValidator;

impl Validator<LoginRequest> for LoginValidator {
    fn validate(&self, data: &LoginRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.require("email", &data.email, "Email is required");
        if data.password.is_empty() {
            result.add_error("password", "Password is required");
        }

        result
    }
}

pub struct SignupValidator;

impl Validator<SignupRequest> for SignupValidator {
    fn validate(&self, data: &SignupRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.require("username", &data.username, "Username is required");

        if data.email.trim().is_empty() {
            result.add_error("email", "Email is required");
        } else if !looks_like_email(&data.email) {
            result.add_error("email", "Email address is not valid");
        }

        if data.password.is_empty() {
            result.add_error("password", "Password is required");
        }

        result
    }
}

/// Validates an OAuth provider name before it is placed in a URL path
pub fn validate_provider(provider: &str) -> ValidationResult {
    let mut result = ValidationResult::new();
    if provider.trim().is_empty() {
        result.add_error("provider", "OAuth provider is required");
    } else if !provider
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        result.add_error("provider", "OAuth provider name contains invalid characters");
    }
    result
}

fn looks_like_email(email: &str) -> bool {
    match email.trim().split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}
