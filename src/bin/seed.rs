use deskculture_api::{
    config::AppConfig, db::create_pool, services::auth_service::hash_password, slug::generate_slug,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@example.com", "Admin", "admin123", true).await?;
    let user_id = ensure_user(&pool, "user@example.com", "Demo User", "user123", false).await?;
    seed_catalog(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    name: &str,
    password: &str,
    is_admin: bool,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, name, password_hash, is_admin)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET password_hash = EXCLUDED.password_hash
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(name)
    .bind(password_hash)
    .bind(is_admin)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let category_name = "Desks";
    let (category_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO categories (id, name, slug, description)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (slug) DO UPDATE SET description = EXCLUDED.description
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(category_name)
    .bind(generate_slug(category_name))
    .bind("Desks for every workspace")
    .fetch_one(pool)
    .await?;

    // Prices in cents.
    let products: [(&str, i64, i32); 3] = [
        ("Oak Standing Desk", 54900, 12),
        ("Walnut Desk Shelf", 8900, 40),
        ("Cable Tray", 2900, 100),
    ];
    for (name, price, remains) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, slug, description, price, info, remains, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(generate_slug(name))
        .bind(format!("{name} from the demo catalog"))
        .bind(price)
        .bind("")
        .bind(remains)
        .bind(category_id)
        .execute(pool)
        .await?;
    }

    Ok(())
}
