use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::users::{CreateUserRequest, UserDetail, UserList, UserListQuery},
    error::AppResult,
    middleware::{
        auth::AdminUser,
        validation::{QueryParams, ValidJson},
    },
    models::User,
    response::ApiResponse,
    routes::params::parse_id,
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", get(get_user))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Create user (admin only)", body = ApiResponse<User>),
        (status = 400, description = "Duplicate email or invalid role"),
        (status = 401, description = "Not authorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidJson(payload): ValidJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let resp = user_service::create_user(&state, &admin, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("name" = Option<String>, Query, description = "Case-insensitive name filter"),
        ("email" = Option<String>, Query, description = "Case-insensitive email filter"),
        ("address" = Option<String>, Query, description = "Case-insensitive address filter"),
        ("role" = Option<String>, Query, description = "Exact role: admin, normal, store_owner"),
        ("sortBy" = Option<String>, Query, description = "id, name, email, role, created_at"),
        ("order" = Option<String>, Query, description = "asc or desc")
    ),
    responses(
        (status = 200, description = "List users (admin only)", body = ApiResponse<UserList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    QueryParams(query): QueryParams<UserListQuery>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = user_service::list_users(&state, &admin, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Get user (admin only)", body = ApiResponse<UserDetail>),
        (status = 400, description = "Invalid user id"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<UserDetail>>> {
    let id = parse_id(&id, "id", "Invalid user ID format")?;
    let resp = user_service::get_user(&state, &admin, id).await?;
    Ok(Json(resp))
}
