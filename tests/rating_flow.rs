use sea_orm::{ConnectionTrait, Statement};
use sqlx::postgres::PgPoolOptions;

use store_rating_api::{
    db::run_migrations,
    dto::{
        auth::{ChangePasswordRequest, LoginRequest, RegisterRequest},
        stores::{AdminStoreQuery, CreateStoreRequest, UserStoreQuery},
        users::{CreateUserRequest, UserListQuery},
    },
    error::{AppError, AuthFailure},
    middleware::auth::AuthUser,
    models::Role,
    services::{
        auth_service, dashboard_service, rating_service, store_service, token_service::TokenService,
        user_service,
    },
    state::AppState,
};

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    run_migrations(&pool).await?;
    let state = AppState::new(pool, TokenService::new("flow-test-secret"));

    state
        .orm
        .execute(Statement::from_string(
            state.orm.get_database_backend(),
            "TRUNCATE TABLE ratings, stores, users RESTART IDENTITY CASCADE",
        ))
        .await?;
    Ok(state)
}

async fn register(state: &AppState, name: &str, email: &str) -> anyhow::Result<AuthUser> {
    let resp = auth_service::register_user(
        state,
        RegisterRequest {
            name: name.into(),
            email: email.into(),
            password: "Passw0rd!".into(),
            address: Some("1 Test Lane".into()),
        },
    )
    .await?;
    let user = resp.data.expect("registered user").user;
    Ok(AuthUser::from(user))
}

async fn create_with_role(
    state: &AppState,
    admin: &AuthUser,
    name: &str,
    email: &str,
    role: &str,
) -> anyhow::Result<AuthUser> {
    let resp = user_service::create_user(
        state,
        admin,
        CreateUserRequest {
            name: name.into(),
            email: email.into(),
            password: "Passw0rd!".into(),
            address: None,
            role: role.into(),
        },
    )
    .await?;
    Ok(AuthUser::from(resp.data.expect("created user")))
}

async fn create_store(
    state: &AppState,
    admin: &AuthUser,
    name: &str,
    owner_id: Option<i32>,
) -> anyhow::Result<i32> {
    let resp = store_service::create_store(
        state,
        admin,
        CreateStoreRequest {
            name: name.into(),
            email: None,
            address: format!("{name} Street"),
            owner_id,
        },
    )
    .await?;
    Ok(resp.data.expect("store").id)
}

// Registration, listing, rating upsert, owner views and admin listings against a live database.
#[tokio::test]
async fn rate_revise_and_aggregate_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    // Bootstrap an admin directly; registration only ever yields normal users.
    let first = register(&state, "Initial Administrator", "root@example.com").await?;
    sqlx::query("UPDATE users SET role = 'admin' WHERE id = $1")
        .bind(first.user_id)
        .execute(&state.pool)
        .await?;
    let admin = AuthUser {
        role: Role::Admin,
        ..first
    };

    let owner = create_with_role(
        &state,
        &admin,
        "Owner Of Shops",
        "owner@example.com",
        "store_owner",
    )
    .await?;
    let rater = register(&state, "Regular Rater", "Rater@Example.com").await?;
    let other = register(&state, "Another Rater", "other@example.com").await?;
    assert_eq!(rater.email, "rater@example.com");

    // Duplicate email is a conflict, regardless of case.
    let dup = auth_service::register_user(
        &state,
        RegisterRequest {
            name: "Copycat Person".into(),
            email: "RATER@example.com".into(),
            password: "Passw0rd!".into(),
            address: None,
        },
    )
    .await;
    assert!(matches!(dup, Err(AppError::Conflict(_))));

    // Stores can only be owned by store owners.
    let bad_owner = store_service::create_store(
        &state,
        &admin,
        CreateStoreRequest {
            name: "Not Allowed".into(),
            email: None,
            address: "Nowhere".into(),
            owner_id: Some(rater.user_id),
        },
    )
    .await;
    assert!(matches!(bad_owner, Err(AppError::BadRequest(_))));

    let alpha = create_store(&state, &admin, "Alpha Books", Some(owner.user_id)).await?;
    let beta = create_store(&state, &admin, "Beta Coffee", None).await?;
    let gamma = create_store(&state, &admin, "Gamma Tools", None).await?;

    // Nothing rated yet: every average is null, not zero.
    let listing = store_service::list_stores_for_user(&state, &rater, UserStoreQuery::default())
        .await?
        .data
        .expect("stores")
        .items;
    assert_eq!(listing.len(), 3);
    assert!(listing.iter().all(|s| s.average_rating.is_none()));
    assert!(listing.iter().all(|s| s.user_submitted_rating.is_none()));

    // First rating inserts, second rating by the same user revises in place.
    let first_rating = rating_service::submit_rating(&state, &rater, alpha, 4)
        .await?
        .data
        .expect("rating");
    assert_eq!(first_rating.rating_value, 4);

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let revised = rating_service::submit_rating(&state, &rater, alpha, 2)
        .await?
        .data
        .expect("rating");
    assert_eq!(revised.id, first_rating.id);
    assert_eq!(revised.rating_value, 2);
    assert_eq!(revised.created_at, first_rating.created_at);
    assert!(revised.updated_at > first_rating.updated_at);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ratings WHERE store_id = $1")
        .bind(alpha)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(count, 1);

    // Out of range values never reach the table.
    let rejected = rating_service::submit_rating(&state, &rater, beta, 9).await;
    assert!(matches!(rejected, Err(AppError::Validation(_))));
    let beta_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ratings WHERE store_id = $1")
        .bind(beta)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(beta_rows, 0);

    let missing = rating_service::submit_rating(&state, &rater, 999_999, 3).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    rating_service::submit_rating(&state, &other, alpha, 5).await?;
    rating_service::submit_rating(&state, &other, gamma, 5).await?;

    assert_eq!(
        rating_service::average_rating(&state.pool, alpha).await?,
        Some(3.5)
    );
    assert_eq!(rating_service::average_rating(&state.pool, beta).await?, None);

    // The rater sees their own value next to the store average.
    let listing = store_service::list_stores_for_user(
        &state,
        &rater,
        UserStoreQuery {
            search: Some("alpha".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("stores")
    .items;
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].average_rating, Some(3.5));
    assert_eq!(listing[0].user_submitted_rating, Some(2));

    // Owner views.
    let ratings = store_service::my_store_ratings(&state, &owner)
        .await?
        .data
        .expect("ratings")
        .items;
    assert_eq!(ratings.len(), 2);
    assert_eq!(ratings[0].user_id, other.user_id);
    let average = store_service::my_store_average(&state, &owner)
        .await?
        .data
        .expect("average");
    assert_eq!(average.store_id, alpha);
    assert_eq!(average.average_rating, Some(3.5));

    // Admin listing sorted by average, unrated stores last in either direction.
    for order in ["desc", "asc"] {
        let stores = store_service::list_stores_admin(
            &state,
            &admin,
            AdminStoreQuery {
                sort_by: Some("averageRating".into()),
                order: Some(order.into()),
                ..Default::default()
            },
        )
        .await?
        .data
        .expect("stores")
        .items;
        let last = stores.last().expect("at least one store");
        assert_eq!(last.id, beta);
        assert!(last.average_rating.is_none());
    }
    let by_desc = store_service::list_stores_admin(
        &state,
        &admin,
        AdminStoreQuery {
            sort_by: Some("averageRating".into()),
            order: Some("desc".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("stores")
    .items;
    assert_eq!(by_desc[0].id, gamma);
    assert_eq!(by_desc[1].owner_name.as_deref(), Some("Owner Of Shops"));

    let bad_sort = store_service::list_stores_admin(
        &state,
        &admin,
        AdminStoreQuery {
            sort_by: Some("id; DROP TABLE stores".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(bad_sort, Err(AppError::Validation(_))));

    // Admin user views.
    let owners = user_service::list_users(
        &state,
        &admin,
        UserListQuery {
            role: Some("store_owner".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("users")
    .items;
    assert_eq!(owners.len(), 1);
    let detail = user_service::get_user(&state, &admin, owner.user_id)
        .await?
        .data
        .expect("user");
    assert_eq!(detail.store_average_rating, Some(3.5));
    let plain = user_service::get_user(&state, &admin, rater.user_id)
        .await?
        .data
        .expect("user");
    assert_eq!(plain.store_average_rating, None);

    let stats = dashboard_service::admin_stats(&state, &admin)
        .await?
        .data
        .expect("stats");
    assert_eq!(stats.total_users, 4);
    assert_eq!(stats.total_stores, 3);
    assert_eq!(stats.total_ratings, 3);

    // Role gates hold at the service layer too.
    let forbidden = dashboard_service::admin_stats(&state, &rater).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden(_))));
    let not_owner = store_service::my_store_ratings(&state, &rater).await;
    assert!(matches!(not_owner, Err(AppError::Forbidden(_))));

    // Password change, then login with the new password only.
    auth_service::change_password(
        &state,
        &rater,
        ChangePasswordRequest {
            new_password: "N3wSecret!".into(),
        },
    )
    .await?;
    let old_login = auth_service::login_user(
        &state,
        LoginRequest {
            email: "rater@example.com".into(),
            password: "Passw0rd!".into(),
        },
    )
    .await;
    assert!(matches!(
        old_login,
        Err(AppError::Unauthorized(AuthFailure::InvalidCredentials))
    ));
    let login = auth_service::login_user(
        &state,
        LoginRequest {
            email: "RATER@example.com".into(),
            password: "N3wSecret!".into(),
        },
    )
    .await?
    .data
    .expect("login");
    let claims = state.tokens.verify(&login.token)?;
    assert_eq!(claims.id, rater.user_id);

    Ok(())
}
