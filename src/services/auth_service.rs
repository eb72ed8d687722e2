use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::{
    dto::auth::{AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, normalize_email},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    error::{AppError, AppResult, AuthFailure},
    middleware::auth::AuthUser,
    models::{Role, User},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Insert a user with an already-validated role. Shared by registration and admin creation.
pub(crate) async fn insert_user(
    state: &AppState,
    name: String,
    email: &str,
    password: &str,
    address: Option<String>,
    role: Role,
) -> AppResult<User> {
    let exists = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict(
            "User already exists with this email".into(),
        ));
    }

    let now = Utc::now();
    let model = UserActive {
        id: NotSet,
        name: Set(name.trim().to_string()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(password)?),
        role: Set(role.as_str().to_string()),
        address: Set(address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await
    .map_err(|e| {
        let err = AppError::from(e);
        if err.is_unique_violation() {
            AppError::Conflict("User already exists with this email".into())
        } else {
            err
        }
    })?;

    let user = User::try_from(model)?;
    tracing::debug!(user_id = user.id, role = %user.role, "user created");
    Ok(user)
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let RegisterRequest {
        name,
        email,
        password,
        address,
    } = payload;
    let email = normalize_email(&email);

    let user = insert_user(state, name, &email, &password, address, Role::Normal).await?;
    let token = state.tokens.issue(user.id, user.role)?;

    Ok(ApiResponse::success(
        "User registered",
        AuthResponse { user, token },
        Some(Meta::empty()),
    ))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let LoginRequest { email, password } = payload;
    let email = normalize_email(&email);

    let model = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;

    let model = match model {
        Some(m) => m,
        None => return Err(AppError::Unauthorized(AuthFailure::InvalidCredentials)),
    };

    if !verify_password(&password, &model.password_hash)? {
        tracing::warn!(user_id = model.id, "login rejected: wrong password");
        return Err(AppError::Unauthorized(AuthFailure::InvalidCredentials));
    }

    let user = User::try_from(model)?;
    let token = state.tokens.issue(user.id, user.role)?;

    Ok(ApiResponse::success(
        "Logged in",
        AuthResponse { user, token },
        Some(Meta::empty()),
    ))
}

pub async fn change_password(
    state: &AppState,
    user: &AuthUser,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let password_hash = hash_password(&payload.new_password)?;

    let result = sqlx::query(
        "UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2",
    )
    .bind(password_hash)
    .bind(user.user_id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(
            "User not found or password could not be updated".into(),
        ));
    }

    tracing::debug!(user_id = user.user_id, "password changed");
    Ok(ApiResponse::success(
        "Password updated successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
