use store_rating_api::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    models::Role,
    services::auth_service::hash_password,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, 2).await?;
    run_migrations(&pool).await?;

    let admin_id = ensure_user(
        &pool,
        "System Administrator",
        "admin@example.com",
        "Admin#1234",
        Role::Admin,
    )
    .await?;
    let owner_id = ensure_user(
        &pool,
        "Default Store Owner",
        "owner@example.com",
        "Owner#1234",
        Role::StoreOwner,
    )
    .await?;
    let user_id = ensure_user(
        &pool,
        "Regular Shopper",
        "user@example.com",
        "User#12345",
        Role::Normal,
    )
    .await?;
    seed_stores(&pool, owner_id).await?;

    println!("Seed completed. Admin ID: {admin_id}, Owner ID: {owner_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &DbPool,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<i32> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (id,): (i32,) = sqlx::query_as(
        r#"
        INSERT INTO users (name, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email}");
    Ok(id)
}

async fn seed_stores(pool: &DbPool, owner_id: i32) -> anyhow::Result<()> {
    let stores = [
        ("Corner Bookshop", "books@example.com", "12 Market Street, Springfield"),
        ("Ferris Coffee Bar", "coffee@example.com", "7 Harbour Road, Shelbyville"),
    ];

    for (name, email, address) in stores {
        sqlx::query(
            r#"
            INSERT INTO stores (name, email, address, owner_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(address)
        .bind(owner_id)
        .execute(pool)
        .await?;
    }

    println!("Seeded stores");
    Ok(())
}
