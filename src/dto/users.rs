use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::auth::{validate_password_strength, validate_role},
    models::User,
};

#[derive(Deserialize, Debug, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 7, max = 30, message = "Name must be between 7 and 30 characters"))]
    pub name: String,
    #[validate(email(message = "Please include a valid email"))]
    pub email: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
    #[validate(length(max = 400, message = "Address cannot exceed 400 characters"))]
    pub address: Option<String>,
    #[validate(custom(function = "validate_role"))]
    pub role: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UserListQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
    #[serde(rename = "sortBy", alias = "sort_by")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct UserList {
    #[schema(value_type = Vec<User>)]
    pub items: Vec<User>,
}

/// A user as seen by an admin. Store owners carry their store's average rating.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    #[serde(rename = "storeAverageRating")]
    pub store_average_rating: Option<f64>,
}
