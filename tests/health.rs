use axum::extract::State;
use axum_booking_api::{
    config::PlatformSettings,
    db::{create_orm_conn, create_pool},
    routes::health::health_check,
    state::AppState,
};

#[tokio::test]
async fn health_reports_database_up() -> anyhow::Result<()> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run the health test."
                );
                return Ok(());
            }
        };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    let state = AppState::new(pool, orm, PlatformSettings::default());

    let response = health_check(State(state)).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.database, "up");

    Ok(())
}
