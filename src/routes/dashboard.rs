use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::dashboard::AdminStats,
    error::AppResult,
    middleware::auth::AdminUser,
    response::ApiResponse,
    services::dashboard_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/stats", get(admin_stats))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/admin/stats",
    responses(
        (status = 200, description = "User, store and rating counts (admin only)", body = ApiResponse<AdminStats>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn admin_stats(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> AppResult<Json<ApiResponse<AdminStats>>> {
    let resp = dashboard_service::admin_stats(&state, &admin).await?;
    Ok(Json(resp))
}
