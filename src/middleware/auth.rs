use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use sea_orm::EntityTrait;

use crate::{
    entity::Users,
    error::{AppError, AuthFailure},
    models::{Role, User},
    state::AppState,
};

/// The caller, as currently stored. Role checks always use this record, never the token's claim.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub address: Option<String>,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            address: user.address,
        }
    }
}

/// An authenticated caller whose stored role is `admin`.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

/// An authenticated caller whose stored role is `store_owner`.
#[derive(Debug, Clone)]
pub struct StoreOwnerUser(pub AuthUser);

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    match user.role {
        Role::Admin => Ok(()),
        Role::Normal | Role::StoreOwner => Err(AppError::Forbidden(
            "Forbidden: Access restricted to administrators".into(),
        )),
    }
}

pub fn ensure_store_owner(user: &AuthUser) -> Result<(), AppError> {
    match user.role {
        Role::StoreOwner => Ok(()),
        Role::Admin | Role::Normal => Err(AppError::Forbidden(
            "Forbidden: Access restricted to store owners".into(),
        )),
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthFailure> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthFailure::MissingToken)?;

    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .ok_or(AuthFailure::MissingToken)?
        .trim();

    if token.is_empty() {
        return Err(AuthFailure::MissingToken);
    }
    Ok(token)
}

fn reject(reason: AuthFailure) -> AppError {
    tracing::warn!(reason = ?reason, "authentication rejected");
    AppError::Unauthorized(reason)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let token = bearer_token(&parts.headers).map_err(reject)?;
        let claims = state
            .tokens
            .verify(token)
            .map_err(|err| reject(err.into()))?;

        let model = Users::find_by_id(claims.id)
            .one(&state.orm)
            .await?
            .ok_or_else(|| reject(AuthFailure::UnknownUser))?;
        let user = AuthUser::from(User::try_from(model)?);

        if user.role != claims.role {
            tracing::debug!(
                user_id = user.user_id,
                token_role = %claims.role,
                stored_role = %user.role,
                "token role is stale, using stored role"
            );
        }

        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        ensure_admin(&user)?;
        Ok(AdminUser(user))
    }
}

impl FromRequestParts<AppState> for StoreOwnerUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        ensure_store_owner(&user)?;
        Ok(StoreOwnerUser(user))
    }
}
