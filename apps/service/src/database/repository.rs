use async_trait::async_trait;
use uuid::Uuid;

use super::error::Result;
use super::models::{MonitoredWebsite, User};
use crate::monitoring::types::CheckResult;

/// Storage capability set shared by every backend.
///
/// Implementations must serialize mutations of the same website and of the
/// global history, while letting different websites update concurrently.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Get a user by id
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Get a user by exact username
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Create a user; fails with `Conflict` when the username is taken
    async fn create_user(&self, username: &str, password: &str) -> Result<User>;

    /// All monitored websites, oldest registration first
    async fn get_websites(&self) -> Result<Vec<MonitoredWebsite>>;

    /// Get a monitored website by id
    async fn get_website(&self, id: Uuid) -> Result<Option<MonitoredWebsite>>;

    /// Register a website in the `checking` state with an empty history
    async fn add_website(&self, url: &str, name: &str) -> Result<MonitoredWebsite>;

    /// Delete a website, returning whether it existed
    async fn remove_website(&self, id: Uuid) -> Result<bool>;

    /// Apply a check result to a website (append, evict, update last check and status).
    ///
    /// Fails with `NotFound` and mutates nothing when the id is unknown.
    async fn update_website_check(&self, id: Uuid, result: CheckResult) -> Result<MonitoredWebsite>;

    /// Append to the global history, evicting the oldest past the limit
    async fn add_check_result(&self, result: CheckResult) -> Result<CheckResult>;

    /// Global history, oldest first, optionally restricted to an exact URL
    async fn get_check_history(&self, url: Option<&str>) -> Result<Vec<CheckResult>>;
}
