use libsql::Connection;

use super::error::Result;
use super::models::timestamp_to_i64;

/// Schema version - increment when making schema changes
const SCHEMA_VERSION: i32 = 1;

/// Bring the schema up to `SCHEMA_VERSION`, applying each missing migration once.
pub async fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL,
            description TEXT
        )",
        (),
    )
    .await?;

    let current_version = get_current_version(conn).await?;

    if current_version >= SCHEMA_VERSION {
        tracing::info!("Database schema is up to date (version {})", current_version);
        return Ok(());
    }

    tracing::info!("Running migrations from version {} to {}", current_version, SCHEMA_VERSION);

    if current_version < 1 {
        run_migration_v1(conn).await?;
        record_migration(conn, 1, "Users, websites with embedded history, check result log").await?;
    }

    tracing::info!("Database migrations completed successfully (now at version {})", SCHEMA_VERSION);
    Ok(())
}

async fn get_current_version(conn: &Connection) -> Result<i32> {
    let mut rows = conn.query("SELECT MAX(version) FROM schema_migrations", ()).await?;

    if let Some(row) = rows.next().await? {
        let version: Option<i32> = row.get(0)?;
        Ok(version.unwrap_or(0))
    } else {
        Ok(0)
    }
}

async fn record_migration(conn: &Connection, version: i32, description: &str) -> Result<()> {
    let now = timestamp_to_i64(chrono::Utc::now());

    conn.execute(
        "INSERT INTO schema_migrations (version, applied_at, description) VALUES (?, ?, ?)",
        libsql::params![version, now, description],
    )
    .await?;

    tracing::info!("Applied migration v{}: {}", version, description);
    Ok(())
}

/// Migration v1: initial schema
async fn run_migration_v1(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL
        )",
        (),
    )
    .await?;

    // check_history holds a JSON array of the newest 50 results, oldest first.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS websites (
            id TEXT PRIMARY KEY,
            url TEXT NOT NULL,
            name TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'checking',
            last_check TEXT,
            check_history TEXT NOT NULL DEFAULT '[]',
            added_at INTEGER NOT NULL
        )",
        (),
    )
    .await?;

    // Global log; seq preserves insertion order across equal timestamps.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS check_results (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            url TEXT NOT NULL,
            status TEXT NOT NULL,
            status_code INTEGER,
            load_time INTEGER NOT NULL,
            content_length INTEGER,
            error TEXT,
            timestamp INTEGER NOT NULL,
            performance_score INTEGER NOT NULL,
            ttfb INTEGER
        )",
        (),
    )
    .await?;

    conn.execute("CREATE INDEX IF NOT EXISTS idx_websites_added_at ON websites(added_at)", ()).await?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_check_results_url ON check_results(url)", ()).await?;

    Ok(())
}
