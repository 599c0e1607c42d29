use axum_booking_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
};
use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&pool).await?;

    let host_id = Uuid::new_v4();
    let property_id = ensure_property(&pool, host_id, "Sunrise Villa Da Nang", "villa", "Da Nang").await?;
    let standard = ensure_room_type(&pool, property_id, "Standard Double", 10, 1_000_000, Some(1_200_000)).await?;
    let deluxe = ensure_room_type(&pool, property_id, "Deluxe Seaview", 4, 1_800_000, Some(2_100_000)).await?;
    seed_holidays(&pool).await?;
    seed_coupon(&pool).await?;

    println!(
        "Seed completed. Property: {property_id}, room types: {standard}, {deluxe}"
    );
    Ok(())
}

async fn ensure_property(
    pool: &sqlx::PgPool,
    host_id: Uuid,
    name: &str,
    property_type: &str,
    city: &str,
) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM properties WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO properties (id, host_id, name, property_type, city)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(host_id)
    .bind(name)
    .bind(property_type)
    .bind(city)
    .execute(pool)
    .await?;

    println!("Ensured property {name}");
    Ok(id)
}

async fn ensure_room_type(
    pool: &sqlx::PgPool,
    property_id: Uuid,
    name: &str,
    total_rooms: i32,
    base_price: i64,
    weekend_price: Option<i64>,
) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM room_types WHERE property_id = $1 AND name = $2")
            .bind(property_id)
            .bind(name)
            .fetch_optional(pool)
            .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO room_types (
            id, property_id, name, total_rooms, base_price, weekend_price,
            weekly_discount_percent, monthly_discount_percent,
            max_adults, max_children, max_guests
        )
        VALUES ($1, $2, $3, $4, $5, $6, 10, 20, 2, 1, 3)
        "#,
    )
    .bind(id)
    .bind(property_id)
    .bind(name)
    .bind(total_rooms)
    .bind(base_price)
    .bind(weekend_price)
    .execute(pool)
    .await?;

    println!("Ensured room type {name}");
    Ok(id)
}

async fn seed_holidays(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let holidays = [
        (NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), "New Year"),
        (NaiveDate::from_ymd_opt(2026, 4, 30).unwrap(), "Reunification Day"),
        (NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(), "Labour Day"),
        (NaiveDate::from_ymd_opt(2026, 9, 2).unwrap(), "National Day"),
    ];

    for (date, name) in holidays {
        sqlx::query(
            r#"
            INSERT INTO holidays (date, name)
            VALUES ($1, $2)
            ON CONFLICT (date) DO NOTHING
            "#,
        )
        .bind(date)
        .bind(name)
        .execute(pool)
        .await?;
    }

    println!("Ensured holidays");
    Ok(())
}

async fn seed_coupon(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO coupons (
            id, code, is_active, discount_type, discount_value, max_discount_amount,
            min_order_amount, min_nights, start_date, end_date,
            max_total_uses, max_uses_per_customer, applicable_to
        )
        VALUES ($1, 'WELCOME10', TRUE, 'percentage', 10, 500000,
                1000000, 1, $2, $3, 1000, 1, 'all')
        ON CONFLICT (code) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(now)
    .bind(now + Duration::days(365))
    .execute(pool)
    .await?;

    println!("Ensured coupon WELCOME10");
    Ok(())
}
