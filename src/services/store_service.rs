use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use sqlx::{Postgres, QueryBuilder};

use crate::{
    dto::{
        auth::normalize_email,
        stores::{
            AdminStoreList, AdminStoreQuery, AdminStoreView, CreateStoreRequest, OwnerRatingList,
            OwnerRatingView, StoreAverage, UserStoreList, UserStoreQuery, UserStoreView,
        },
    },
    entity::{
        stores::{ActiveModel as StoreActive, Column as StoreCol, Entity as Stores},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_store_owner},
    models::{Role, Store},
    response::{ApiResponse, Meta},
    routes::params::{
        AdminStoreSort, UserStoreSort, like_pattern, order_by_clause, resolve_sort, search_term,
    },
    services::rating_service,
    state::AppState,
};

const ADMIN_STORE_SELECT: &str = r#"
    SELECT
        s.id, s.name, s.email, s.address, s.owner_id, s.created_at,
        u.name AS owner_name,
        AVG(r.rating_value)::FLOAT8 AS average_rating
    FROM stores s
    LEFT JOIN users u ON u.id = s.owner_id
    LEFT JOIN ratings r ON r.store_id = s.id
"#;

const OWNER_RATINGS_SELECT: &str = r#"
    SELECT u.id AS user_id, u.name, u.email, r.rating_value, r.updated_at AS rating_timestamp
    FROM ratings r
    JOIN users u ON u.id = r.user_id
    WHERE r.store_id = $1
    ORDER BY r.updated_at DESC, r.id DESC
"#;

pub async fn create_store(
    state: &AppState,
    admin: &AuthUser,
    payload: CreateStoreRequest,
) -> AppResult<ApiResponse<Store>> {
    ensure_admin(admin)?;
    let CreateStoreRequest {
        name,
        email,
        address,
        owner_id,
    } = payload;
    let email = email
        .as_deref()
        .map(normalize_email)
        .filter(|e| !e.is_empty());

    if let Some(owner_id) = owner_id {
        let owner = Users::find_by_id(owner_id)
            .filter(UserCol::Role.eq(Role::StoreOwner.as_str()))
            .one(&state.orm)
            .await?;
        if owner.is_none() {
            return Err(AppError::BadRequest(
                "Invalid owner_id or user is not a store owner".into(),
            ));
        }
    }

    if let Some(email) = email.as_deref() {
        let taken = Stores::find()
            .filter(StoreCol::Email.eq(email))
            .one(&state.orm)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict("Store email already in use".into()));
        }
    }

    let model = StoreActive {
        id: NotSet,
        name: Set(name.trim().to_string()),
        email: Set(email),
        address: Set(address.trim().to_string()),
        owner_id: Set(owner_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await
    .map_err(|e| {
        let err = AppError::from(e);
        if err.is_unique_violation() {
            AppError::Conflict("Store email already in use".into())
        } else if err.is_foreign_key_violation() {
            AppError::BadRequest("Invalid owner_id provided".into())
        } else {
            err
        }
    })?;

    tracing::info!(admin_id = admin.user_id, store_id = model.id, "store created");
    Ok(ApiResponse::success(
        "Store created",
        Store::from(model),
        Some(Meta::empty()),
    ))
}

/// Every store with its owner's name and average rating, filtered and sorted for admins.
pub async fn list_stores_admin(
    state: &AppState,
    admin: &AuthUser,
    query: AdminStoreQuery,
) -> AppResult<ApiResponse<AdminStoreList>> {
    ensure_admin(admin)?;
    let (sort_key, sort_order) =
        resolve_sort::<AdminStoreSort>(query.sort_by.as_deref(), query.order.as_deref())?;

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(ADMIN_STORE_SELECT);
    let mut has_where = false;
    let filters = [
        ("s.name", query.name.as_deref()),
        ("s.email", query.email.as_deref()),
        ("s.address", query.address.as_deref()),
    ];
    for (column, value) in filters {
        if let Some(term) = search_term(value) {
            qb.push(if has_where { " AND " } else { " WHERE " });
            qb.push(column);
            qb.push(" ILIKE ");
            qb.push_bind(like_pattern(term));
            has_where = true;
        }
    }
    qb.push(" GROUP BY s.id, u.name");
    qb.push(order_by_clause(sort_key, sort_order, "s.id"));

    let items = qb
        .build_query_as::<AdminStoreView>()
        .fetch_all(&state.pool)
        .await?;
    let meta = Meta::total(items.len());

    Ok(ApiResponse::success(
        "Stores",
        AdminStoreList { items },
        Some(meta),
    ))
}

/// Every store with its average rating and the caller's own rating.
pub async fn list_stores_for_user(
    state: &AppState,
    user: &AuthUser,
    query: UserStoreQuery,
) -> AppResult<ApiResponse<UserStoreList>> {
    let (sort_key, sort_order) =
        resolve_sort::<UserStoreSort>(query.sort_by.as_deref(), query.order.as_deref())?;

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT s.id, s.name, s.address, AVG(r.rating_value)::FLOAT8 AS average_rating, \
         (SELECT own.rating_value FROM ratings own WHERE own.store_id = s.id AND own.user_id = ",
    );
    qb.push_bind(user.user_id);
    qb.push(") AS user_submitted_rating FROM stores s LEFT JOIN ratings r ON r.store_id = s.id");

    if let Some(term) = search_term(query.search.as_deref()) {
        let pattern = like_pattern(term);
        qb.push(" WHERE (s.name ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR s.address ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    qb.push(" GROUP BY s.id");
    qb.push(order_by_clause(sort_key, sort_order, "s.id"));

    let items = qb
        .build_query_as::<UserStoreView>()
        .fetch_all(&state.pool)
        .await?;
    let meta = Meta::total(items.len());

    Ok(ApiResponse::success(
        "Stores",
        UserStoreList { items },
        Some(meta),
    ))
}

/// The store an owner manages. With several, the lowest id wins.
pub async fn find_owned_store(state: &AppState, owner_id: i32) -> AppResult<Option<Store>> {
    let store = Stores::find()
        .filter(StoreCol::OwnerId.eq(owner_id))
        .order_by_asc(StoreCol::Id)
        .one(&state.orm)
        .await?
        .map(Store::from);
    Ok(store)
}

async fn require_owned_store(state: &AppState, owner: &AuthUser) -> AppResult<Store> {
    find_owned_store(state, owner.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No store found for this owner.".into()))
}

pub async fn my_store_ratings(
    state: &AppState,
    owner: &AuthUser,
) -> AppResult<ApiResponse<OwnerRatingList>> {
    ensure_store_owner(owner)?;
    let store = require_owned_store(state, owner).await?;

    let items = sqlx::query_as::<_, OwnerRatingView>(OWNER_RATINGS_SELECT)
        .bind(store.id)
        .fetch_all(&state.pool)
        .await?;
    let meta = Meta::total(items.len());

    Ok(ApiResponse::success(
        "Store ratings",
        OwnerRatingList { items },
        Some(meta),
    ))
}

pub async fn my_store_average(
    state: &AppState,
    owner: &AuthUser,
) -> AppResult<ApiResponse<StoreAverage>> {
    ensure_store_owner(owner)?;
    let store = require_owned_store(state, owner).await?;
    let average_rating = rating_service::average_rating(&state.pool, store.id).await?;

    Ok(ApiResponse::success(
        "Store average rating",
        StoreAverage {
            store_id: store.id,
            average_rating,
        },
        Some(Meta::empty()),
    ))
}
