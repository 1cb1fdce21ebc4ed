use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use super::environment::Config;

pub type DbPool = Pool<Sqlite>;

/// Opens the connection pool and applies pending migrations.
///
/// An in-memory database lives only as long as its connection, so a
/// `:memory:` URL is pinned to a single connection that is never recycled.
pub async fn init_db(config: &Config) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = if is_in_memory(&config.database_url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(config.database_max_connections.max(1))
            .connect_with(options)
            .await?
    };

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Cheap round trip used by the `/health/db` probe.
pub async fn ping(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Drops every application table along with the migration history, so the
/// next start migrates from scratch.
pub async fn drop_all(pool: &DbPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for table in ["tokens", "users", "_sqlx_migrations"] {
        let statement = format!("DROP TABLE IF EXISTS {table}");
        sqlx::query(&statement).execute(&mut *tx).await?;
    }
    tx.commit().await
}
