use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Deserialize, Debug, Validate, ToSchema)]
pub struct CreateStoreRequest {
    #[validate(length(min = 1, max = 255, message = "Store name is required"))]
    pub name: String,
    #[validate(email(message = "Provide a valid store contact email"))]
    pub email: Option<String>,
    #[validate(length(
        min = 1,
        max = 400,
        message = "Store address is required and cannot exceed 400 characters"
    ))]
    pub address: String,
    #[validate(range(min = 1, message = "Owner ID must be a valid integer"))]
    pub owner_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AdminStoreQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "sortBy", alias = "sort_by")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UserStoreQuery {
    pub search: Option<String>,
    #[serde(rename = "sortBy", alias = "sort_by")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

/// Admin listing row: the store, its owner's name and its average rating.
#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct AdminStoreView {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub address: String,
    pub owner_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub owner_name: Option<String>,
    #[serde(rename = "averageRating")]
    pub average_rating: Option<f64>,
}

/// Listing row for a rater: the store, its average and the caller's own rating.
#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct UserStoreView {
    pub id: i32,
    pub name: String,
    pub address: String,
    #[serde(rename = "averageRating")]
    pub average_rating: Option<f64>,
    #[serde(rename = "userSubmittedRating")]
    pub user_submitted_rating: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct OwnerRatingView {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub rating_value: i32,
    pub rating_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoreAverage {
    pub store_id: i32,
    #[serde(rename = "averageRating")]
    pub average_rating: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct AdminStoreList {
    #[schema(value_type = Vec<AdminStoreView>)]
    pub items: Vec<AdminStoreView>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct UserStoreList {
    #[schema(value_type = Vec<UserStoreView>)]
    pub items: Vec<UserStoreView>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OwnerRatingList {
    #[schema(value_type = Vec<OwnerRatingView>)]
    pub items: Vec<OwnerRatingView>,
}
