use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::{Role, User};

const PASSWORD_SPECIALS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?~";
const PASSWORD_RULE: &str =
    "Password must be 8-16 characters, include one uppercase and one special character";

/// 8-16 characters with at least one uppercase letter and one special character.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let length = password.chars().count();
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));

    if (8..=16).contains(&length) && has_upper && has_special {
        Ok(())
    } else {
        Err(ValidationError::new("password_strength").with_message(Cow::Borrowed(PASSWORD_RULE)))
    }
}

pub fn validate_role(role: &str) -> Result<(), ValidationError> {
    role.parse::<Role>().map(|_| ()).map_err(|_| {
        ValidationError::new("role")
            .with_message(Cow::Borrowed("Role must be admin, normal, or store_owner"))
    })
}

/// Trimmed, lower-cased email used for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Deserialize, Debug, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 7, max = 30, message = "Name must be between 7 and 30 characters"))]
    pub name: String,
    #[validate(email(message = "Please include a valid email"))]
    pub email: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
    #[validate(length(max = 400, message = "Address cannot exceed 400 characters"))]
    pub address: Option<String>,
}

#[derive(Deserialize, Debug, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Please include a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Deserialize, Debug, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[serde(rename = "newPassword")]
    #[validate(custom(function = "validate_password_strength"))]
    pub new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}
