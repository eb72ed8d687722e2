use chrono::Utc;
use sea_orm::{ActiveValue::NotSet, EntityTrait, Set, sea_query::OnConflict};

use crate::{
    db::DbPool,
    entity::{
        ratings::{ActiveModel as RatingActive, Column as RatingCol, Entity as Ratings},
        stores::Entity as Stores,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Rating, RatingValue},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Submit or revise the caller's rating for a store.
///
/// The write is one `INSERT .. ON CONFLICT (user_id, store_id) DO UPDATE`, so concurrent
/// submissions for the same pair can neither duplicate the row nor lose an update.
/// A revision replaces `rating_value` and `updated_at`; `id` and `created_at` stay.
pub async fn submit_rating(
    state: &AppState,
    user: &AuthUser,
    store_id: i32,
    rating_value: i64,
) -> AppResult<ApiResponse<Rating>> {
    let value = RatingValue::try_from(rating_value)?;

    let store = Stores::find_by_id(store_id).one(&state.orm).await?;
    if store.is_none() {
        return Err(AppError::NotFound("Store not found.".into()));
    }

    let now = Utc::now();
    let row = RatingActive {
        id: NotSet,
        user_id: Set(user.user_id),
        store_id: Set(store_id),
        rating_value: Set(value.get()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    let model = Ratings::insert(row)
        .on_conflict(
            OnConflict::columns([RatingCol::UserId, RatingCol::StoreId])
                .update_columns([RatingCol::RatingValue, RatingCol::UpdatedAt])
                .to_owned(),
        )
        .exec_with_returning(&state.orm)
        .await
        .map_err(|e| {
            let err = AppError::from(e);
            if err.is_foreign_key_violation() {
                AppError::NotFound("User or Store not found.".into())
            } else if err.is_unique_violation() {
                AppError::Conflict("Rating already exists for this store".into())
            } else {
                err
            }
        })?;

    tracing::debug!(
        user_id = user.user_id,
        store_id,
        rating_value = model.rating_value,
        "rating upserted"
    );

    Ok(ApiResponse::success(
        "Rating submitted or updated successfully",
        Rating::from(model),
        Some(Meta::empty()),
    ))
}

/// Mean rating of a store, or `None` when nobody has rated it.
pub async fn average_rating(pool: &DbPool, store_id: i32) -> AppResult<Option<f64>> {
    let average: Option<f64> =
        sqlx::query_scalar("SELECT AVG(rating_value)::FLOAT8 FROM ratings WHERE store_id = $1")
            .bind(store_id)
            .fetch_one(pool)
            .await?;
    Ok(average)
}
