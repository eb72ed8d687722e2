use crate::{
    dto::dashboard::AdminStats,
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn admin_stats(
    state: &AppState,
    admin: &AuthUser,
) -> AppResult<ApiResponse<AdminStats>> {
    ensure_admin(admin)?;

    let (total_users, total_stores, total_ratings) = tokio::try_join!(
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users").fetch_one(&state.pool),
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stores").fetch_one(&state.pool),
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ratings").fetch_one(&state.pool),
    )?;

    Ok(ApiResponse::success(
        "Dashboard stats",
        AdminStats {
            total_users,
            total_stores,
            total_ratings,
        },
        Some(Meta::empty()),
    ))
}
