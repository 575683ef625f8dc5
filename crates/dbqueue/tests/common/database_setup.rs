//! Schema setup and cleanup shared by the container and external resources

use super::constants::*;
use sqlx::postgres::PgPoolOptions;

/// Recreate `schema` so every test starts from an empty message table.
pub async fn setup_database_common(
    dsn: String,
    schema: &str,
    connection_type: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(CONNECTION_TIMEOUT_SECS))
        .connect(&dsn)
        .await?;

    let _val: i32 = sqlx::query_scalar(VERIFICATION_QUERY)
        .fetch_one(&pool)
        .await?;

    sqlx::query(&format!("DROP SCHEMA IF EXISTS \"{}\" CASCADE", schema))
        .execute(&pool)
        .await?;
    sqlx::query(&format!("CREATE SCHEMA \"{}\"", schema))
        .execute(&pool)
        .await?;

    println!("{} ready with schema '{}'", connection_type, schema);
    pool.close().await;
    Ok(())
}

pub async fn cleanup_database_common(
    dsn: String,
    schemas: &[String],
    connection_type: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(CONNECTION_TIMEOUT_SECS))
        .connect(&dsn)
        .await?;

    for schema in schemas {
        sqlx::query(&format!("DROP SCHEMA IF EXISTS \"{}\" CASCADE", schema))
            .execute(&pool)
            .await?;
    }

    println!("{} dropped {} test schemas", connection_type, schemas.len());
    pool.close().await;
    Ok(())
}
