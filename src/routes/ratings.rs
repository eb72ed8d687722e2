use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};

use crate::{
    dto::ratings::SubmitRatingRequest,
    error::AppResult,
    middleware::{auth::AuthUser, validation::ValidJson},
    models::Rating,
    response::ApiResponse,
    routes::params::parse_id,
    services::rating_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{store_id}", post(submit_rating))
}

#[utoipa::path(
    post,
    path = "/api/ratings/{store_id}",
    params(
        ("store_id" = i32, Path, description = "Store ID")
    ),
    request_body = SubmitRatingRequest,
    responses(
        (status = 200, description = "Rating submitted or updated", body = ApiResponse<Rating>),
        (status = 400, description = "Invalid rating value or store id"),
        (status = 401, description = "Not authorized"),
        (status = 404, description = "Store not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Ratings"
)]
pub async fn submit_rating(
    State(state): State<AppState>,
    user: AuthUser,
    Path(store_id): Path<String>,
    ValidJson(payload): ValidJson<SubmitRatingRequest>,
) -> AppResult<Json<ApiResponse<Rating>>> {
    let store_id = parse_id(&store_id, "storeId", "Store ID must be a valid integer")?;
    let resp = rating_service::submit_rating(&state, &user, store_id, payload.rating_value).await?;
    Ok(Json(resp))
}
