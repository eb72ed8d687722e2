use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entity::{ratings, stores, users},
    error::{AppError, FieldError},
};

/// Account role. Stored as text; every gate matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum Role {
    Admin,
    Normal,
    StoreOwner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Normal => "normal",
            Role::StoreOwner => "store_owner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "normal" => Ok(Role::Normal),
            "store_owner" => Ok(Role::StoreOwner),
            _ => Err(AppError::Validation(vec![FieldError::new(
                "role",
                "Role must be admin, normal, or store_owner",
            )])),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Store {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub address: String,
    pub owner_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Rating {
    pub id: i32,
    pub user_id: i32,
    pub store_id: i32,
    pub rating_value: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A rating score that is known to lie in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingValue(i32);

impl RatingValue {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 5;

    pub fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for RatingValue {
    type Error = AppError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(RatingValue(value as i32))
        } else {
            Err(AppError::Validation(vec![FieldError::new(
                "rating_value",
                "Rating value must be an integer between 1 and 5",
            )]))
        }
    }
}

impl TryFrom<users::Model> for User {
    type Error = AppError;

    fn try_from(model: users::Model) -> Result<Self, Self::Error> {
        let role = model.role.parse::<Role>().map_err(|_| {
            AppError::Internal(anyhow::anyhow!(
                "user {} has unknown role {:?}",
                model.id,
                model.role
            ))
        })?;
        Ok(User {
            id: model.id,
            name: model.name,
            email: model.email,
            role,
            address: model.address,
            created_at: model.created_at.with_timezone(&Utc),
        })
    }
}

impl From<stores::Model> for Store {
    fn from(model: stores::Model) -> Self {
        Store {
            id: model.id,
            name: model.name,
            email: model.email,
            address: model.address,
            owner_id: model.owner_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<ratings::Model> for Rating {
    fn from(model: ratings::Model) -> Self {
        Rating {
            id: model.id,
            user_id: model.user_id,
            store_id: model.store_id,
            rating_value: model.rating_value,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
