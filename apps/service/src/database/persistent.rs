use async_trait::async_trait;
use libsql::{Row, TransactionBehavior, params};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::error::{Result, StorageError};
use super::locks::WebsiteLocks;
use super::migrations::run_migrations;
use super::models::{MonitoredWebsite, User, WebsiteStatus, i64_to_timestamp, timestamp_to_i64};
use super::repository::Storage;
use crate::history::{BoundedLog, GLOBAL_HISTORY_LIMIT, WEBSITE_HISTORY_LIMIT};
use crate::monitoring::types::{CheckResult, CheckStatus};
use crate::pool::{LibsqlManager, LibsqlPool};

const WEBSITE_COLUMNS: &str = "id, url, name, status, last_check, check_history, added_at";
const CHECK_RESULT_COLUMNS: &str =
    "id, url, status, status_code, load_time, content_length, error, timestamp, performance_score, ttfb";

/// Durable storage on a local libsql (SQLite) database
pub struct LibsqlStorage {
    pool: LibsqlPool,
    website_locks: WebsiteLocks,
    /// Serializes global-history insert + trim
    history_lock: Mutex<()>,
}

impl LibsqlStorage {
    /// Wrap a pool, running pending migrations first
    pub async fn new_from_pool(pool: LibsqlPool) -> Result<Self> {
        {
            let conn = pool.get().await?;
            run_migrations(&conn).await?;
        }

        Ok(Self { pool, website_locks: WebsiteLocks::new(), history_lock: Mutex::new(()) })
    }

    async fn get_conn(&self) -> Result<deadpool::managed::Object<LibsqlManager>> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl Storage for LibsqlStorage {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query("SELECT id, username, password FROM users WHERE id = ?", params![id.to_string()])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(user_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query("SELECT id, username, password FROM users WHERE username = ?", params![username])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(user_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn create_user(&self, username: &str, password: &str) -> Result<User> {
        let conn = self.get_conn().await?;
        let user = User::new(username.to_string(), password.to_string());

        let inserted = conn
            .execute(
                "INSERT INTO users (id, username, password) VALUES (?, ?, ?) ON CONFLICT(username) DO NOTHING",
                params![user.id.to_string(), user.username.clone(), user.password.clone()],
            )
            .await?;

        if inserted == 0 {
            return Err(StorageError::Conflict(format!("username '{username}' is taken")));
        }
        Ok(user)
    }

    async fn get_websites(&self) -> Result<Vec<MonitoredWebsite>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(&format!("SELECT {WEBSITE_COLUMNS} FROM websites ORDER BY added_at ASC, rowid ASC"), ())
            .await?;

        let mut websites = Vec::new();
        while let Some(row) = rows.next().await? {
            websites.push(website_from_row(&row)?);
        }
        Ok(websites)
    }

    async fn get_website(&self, id: Uuid) -> Result<Option<MonitoredWebsite>> {
        let conn = self.get_conn().await?;
        fetch_website(&conn, id).await
    }

    async fn add_website(&self, url: &str, name: &str) -> Result<MonitoredWebsite> {
        let conn = self.get_conn().await?;
        let website = MonitoredWebsite::new(url.to_string(), name.to_string());

        conn.execute(
            "INSERT INTO websites (id, url, name, status, last_check, check_history, added_at) VALUES (?, ?, ?, ?, NULL, ?, ?)",
            params![
                website.id.to_string(),
                website.url.clone(),
                website.name.clone(),
                website.status.as_str(),
                serde_json::to_string(&website.check_history)?,
                timestamp_to_i64(website.added_at)
            ],
        )
        .await?;

        debug!("Registered website {} ({})", website.id, website.url);
        Ok(website)
    }

    async fn remove_website(&self, id: Uuid) -> Result<bool> {
        let _guard = self.website_locks.lock(id).await;
        let conn = self.get_conn().await?;

        let deleted = conn.execute("DELETE FROM websites WHERE id = ?", params![id.to_string()]).await?;
        Ok(deleted > 0)
    }

    async fn update_website_check(&self, id: Uuid, result: CheckResult) -> Result<MonitoredWebsite> {
        let _guard = self.website_locks.lock(id).await;
        let conn = self.get_conn().await?;

        // Take the write lock up front; a deferred read-then-write cannot wait out
        // another writer and fails with `database is locked`.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate).await?;
        let mut website = fetch_website(&tx, id).await?.ok_or(StorageError::NotFound)?;

        website.apply_check(result);

        tx.execute(
            "UPDATE websites SET status = ?, last_check = ?, check_history = ? WHERE id = ?",
            params![
                website.status.as_str(),
                website.last_check.as_ref().map(serde_json::to_string).transpose()?,
                serde_json::to_string(&website.check_history)?,
                id.to_string()
            ],
        )
        .await?;
        tx.commit().await?;

        Ok(website)
    }

    async fn add_check_result(&self, result: CheckResult) -> Result<CheckResult> {
        let _guard = self.history_lock.lock().await;
        let conn = self.get_conn().await?;

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate).await?;
        tx.execute(
            &format!("INSERT INTO check_results ({CHECK_RESULT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"),
            params![
                result.id.to_string(),
                result.url.clone(),
                result.status.as_str(),
                result.status_code.map(i64::from),
                to_i64(result.load_time),
                result.content_length.map(to_i64),
                result.error.clone(),
                timestamp_to_i64(result.timestamp),
                i64::from(result.performance_score),
                result.ttfb.map(to_i64)
            ],
        )
        .await?;

        let evicted = tx
            .execute(
                "DELETE FROM check_results WHERE seq NOT IN (SELECT seq FROM check_results ORDER BY seq DESC LIMIT ?)",
                params![GLOBAL_HISTORY_LIMIT as i64],
            )
            .await?;
        tx.commit().await?;

        if evicted > 0 {
            debug!("Global history full, evicted {evicted} oldest result(s)");
        }
        Ok(result)
    }

    async fn get_check_history(&self, url: Option<&str>) -> Result<Vec<CheckResult>> {
        let conn = self.get_conn().await?;

        let mut rows = match url {
            Some(url) => {
                conn.query(
                    &format!("SELECT {CHECK_RESULT_COLUMNS} FROM check_results WHERE url = ? ORDER BY seq ASC"),
                    params![url],
                )
                .await?
            }
            None => {
                conn.query(&format!("SELECT {CHECK_RESULT_COLUMNS} FROM check_results ORDER BY seq ASC"), ())
                    .await?
            }
        };

        let mut history = Vec::new();
        while let Some(row) = rows.next().await? {
            history.push(check_result_from_row(&row)?);
        }
        Ok(history)
    }
}

async fn fetch_website(conn: &libsql::Connection, id: Uuid) -> Result<Option<MonitoredWebsite>> {
    let mut rows = conn
        .query(&format!("SELECT {WEBSITE_COLUMNS} FROM websites WHERE id = ?"), params![id.to_string()])
        .await?;

    match rows.next().await? {
        Some(row) => Ok(Some(website_from_row(&row)?)),
        None => Ok(None),
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn parse_uuid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| StorageError::InvalidRecord(format!("bad id '{raw}': {e}")))
}

fn parse_timestamp(millis: i64) -> Result<chrono::DateTime<chrono::Utc>> {
    i64_to_timestamp(millis)
        .ok_or_else(|| StorageError::InvalidRecord(format!("timestamp out of range: {millis}")))
}

fn user_from_row(row: &Row) -> Result<User> {
    let id: String = row.get(0)?;

    Ok(User { id: parse_uuid(&id)?, username: row.get(1)?, password: row.get(2)? })
}

fn website_from_row(row: &Row) -> Result<MonitoredWebsite> {
    let id: String = row.get(0)?;
    let status: String = row.get(3)?;
    let last_check: Option<String> = row.get(4)?;
    let check_history: String = row.get(5)?;

    let history: Vec<CheckResult> = serde_json::from_str(&check_history)?;

    Ok(MonitoredWebsite {
        id: parse_uuid(&id)?,
        url: row.get(1)?,
        name: row.get(2)?,
        status: WebsiteStatus::parse(&status)
            .ok_or_else(|| StorageError::InvalidRecord(format!("unknown website status '{status}'")))?,
        last_check: last_check.as_deref().map(serde_json::from_str).transpose()?,
        check_history: BoundedLog::from_entries(history, WEBSITE_HISTORY_LIMIT),
        added_at: parse_timestamp(row.get(6)?)?,
    })
}

fn check_result_from_row(row: &Row) -> Result<CheckResult> {
    let id: String = row.get(0)?;
    let status: String = row.get(2)?;
    let score: i64 = row.get(8)?;

    Ok(CheckResult {
        id: parse_uuid(&id)?,
        url: row.get(1)?,
        status: CheckStatus::parse(&status)
            .ok_or_else(|| StorageError::InvalidRecord(format!("unknown check status '{status}'")))?,
        status_code: row
            .get::<Option<i64>>(3)?
            .map(u16::try_from)
            .transpose()
            .map_err(|e| StorageError::InvalidRecord(format!("bad status code: {e}")))?,
        load_time: row.get::<i64>(4)?.max(0) as u64,
        content_length: row.get::<Option<i64>>(5)?.map(|v| v.max(0) as u64),
        error: row.get(6)?,
        timestamp: parse_timestamp(row.get(7)?)?,
        performance_score: score.clamp(0, 100) as u8,
        ttfb: row.get::<Option<i64>>(9)?.map(|v| v.max(0) as u64),
    })
}
