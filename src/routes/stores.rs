use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::stores::{
        AdminStoreList, AdminStoreQuery, CreateStoreRequest, OwnerRatingList, StoreAverage,
        UserStoreList, UserStoreQuery,
    },
    error::AppResult,
    middleware::{
        auth::{AdminUser, AuthUser, StoreOwnerUser},
        validation::{QueryParams, ValidJson},
    },
    models::Store,
    response::ApiResponse,
    services::store_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stores).post(create_store))
        .route("/admin", get(list_stores_admin))
        .route("/my-store/ratings", get(my_store_ratings))
        .route("/my-store/average-rating", get(my_store_average))
}

#[utoipa::path(
    post,
    path = "/api/stores",
    request_body = CreateStoreRequest,
    responses(
        (status = 201, description = "Create store (admin only)", body = ApiResponse<Store>),
        (status = 400, description = "Duplicate email or invalid owner"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn create_store(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidJson(payload): ValidJson<CreateStoreRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Store>>)> {
    let resp = store_service::create_store(&state, &admin, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/stores",
    params(
        ("search" = Option<String>, Query, description = "Matches name or address, case-insensitive"),
        ("sortBy" = Option<String>, Query, description = "name, address, averageRating"),
        ("order" = Option<String>, Query, description = "asc or desc")
    ),
    responses(
        (status = 200, description = "Stores with average and own rating", body = ApiResponse<UserStoreList>),
        (status = 401, description = "Not authorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn list_stores(
    State(state): State<AppState>,
    user: AuthUser,
    QueryParams(query): QueryParams<UserStoreQuery>,
) -> AppResult<Json<ApiResponse<UserStoreList>>> {
    let resp = store_service::list_stores_for_user(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/stores/admin",
    params(
        ("name" = Option<String>, Query, description = "Case-insensitive name filter"),
        ("email" = Option<String>, Query, description = "Case-insensitive email filter"),
        ("address" = Option<String>, Query, description = "Case-insensitive address filter"),
        ("sortBy" = Option<String>, Query, description = "id, name, email, address, created_at, averageRating, owner_name"),
        ("order" = Option<String>, Query, description = "asc or desc")
    ),
    responses(
        (status = 200, description = "Stores with owner and average rating (admin only)", body = ApiResponse<AdminStoreList>),
        (status = 401, description = "Not authorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn list_stores_admin(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    QueryParams(query): QueryParams<AdminStoreQuery>,
) -> AppResult<Json<ApiResponse<AdminStoreList>>> {
    let resp = store_service::list_stores_admin(&state, &admin, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/stores/my-store/ratings",
    responses(
        (status = 200, description = "Ratings of the caller's store, newest first", body = ApiResponse<OwnerRatingList>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No store for this owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn my_store_ratings(
    State(state): State<AppState>,
    StoreOwnerUser(owner): StoreOwnerUser,
) -> AppResult<Json<ApiResponse<OwnerRatingList>>> {
    let resp = store_service::my_store_ratings(&state, &owner).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/stores/my-store/average-rating",
    responses(
        (status = 200, description = "Average rating of the caller's store", body = ApiResponse<StoreAverage>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No store for this owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn my_store_average(
    State(state): State<AppState>,
    StoreOwnerUser(owner): StoreOwnerUser,
) -> AppResult<Json<ApiResponse<StoreAverage>>> {
    let resp = store_service::my_store_average(&state, &owner).await?;
    Ok(Json(resp))
}
