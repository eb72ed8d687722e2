use sea_orm::EntityTrait;
use sqlx::{Postgres, QueryBuilder};

use crate::{
    dto::{
        auth::normalize_email,
        users::{CreateUserRequest, UserDetail, UserList, UserListQuery},
    },
    entity::Users,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Role, User},
    response::{ApiResponse, Meta},
    routes::params::{UserSort, like_pattern, order_by_clause, resolve_sort, search_term},
    services::{auth_service::insert_user, rating_service, store_service},
    state::AppState,
};

pub async fn create_user(
    state: &AppState,
    admin: &AuthUser,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(admin)?;
    let CreateUserRequest {
        name,
        email,
        password,
        address,
        role,
    } = payload;
    let role: Role = role.parse()?;
    let email = normalize_email(&email);

    let user = insert_user(state, name, &email, &password, address, role).await?;
    tracing::info!(admin_id = admin.user_id, user_id = user.id, role = %role, "admin created user");

    Ok(ApiResponse::success("User created", user, Some(Meta::empty())))
}

pub async fn list_users(
    state: &AppState,
    admin: &AuthUser,
    query: UserListQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(admin)?;
    let (sort_key, sort_order) =
        resolve_sort::<UserSort>(query.sort_by.as_deref(), query.order.as_deref())?;
    let role = search_term(query.role.as_deref())
        .map(str::parse::<Role>)
        .transpose()?;

    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT id, name, email, role, address, created_at FROM users");
    let mut has_where = false;

    let filters = [
        ("name", query.name.as_deref()),
        ("email", query.email.as_deref()),
        ("address", query.address.as_deref()),
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
    if let Some(role) = role {
        qb.push(if has_where { " AND " } else { " WHERE " });
        qb.push("role = ");
        qb.push_bind(role.as_str());
    }
    qb.push(order_by_clause(sort_key, sort_order, "id"));

    let items = qb.build_query_as::<User>().fetch_all(&state.pool).await?;
    let meta = Meta::total(items.len());

    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

pub async fn get_user(
    state: &AppState,
    admin: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<UserDetail>> {
    ensure_admin(admin)?;
    let model = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    let user = User::try_from(model)?;

    let store_average_rating = match user.role {
        Role::StoreOwner => match store_service::find_owned_store(state, user.id).await? {
            Some(store) => rating_service::average_rating(&state.pool, store.id).await?,
            None => None,
        },
        Role::Admin | Role::Normal => None,
    };

    Ok(ApiResponse::success(
        "User found",
        UserDetail {
            user,
            store_average_rating,
        },
        Some(Meta::empty()),
    ))
}
