use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::checker::Checker;
use super::summary::HistorySummary;
use super::types::CheckResult;
use crate::database::error::{Result, StorageError};
use crate::database::models::MonitoredWebsite;
use crate::database::repository::Storage;

/// Monitoring executor - runs checks and records their results
///
/// Every check it runs lands in the global history; checks run for a
/// registered website are also applied to that website.
#[derive(Clone)]
pub struct MonitoringExecutor {
    checker: Arc<dyn Checker>,
    storage: Arc<dyn Storage>,
}

impl MonitoringExecutor {
    pub fn new(checker: Arc<dyn Checker>, storage: Arc<dyn Storage>) -> Self {
        Self { checker, storage }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Check an ad-hoc URL and record it in the global history
    pub async fn check_url(&self, url: &str) -> Result<CheckResult> {
        let result = self.checker.check(url).await;
        self.storage.add_check_result(result).await
    }

    /// Register a website, run its first check and return it with that check applied
    pub async fn add_website(&self, url: &str, name: &str) -> Result<MonitoredWebsite> {
        let website = self.storage.add_website(url, name).await?;
        info!("Added website {} ({}) to monitoring", website.name, website.url);

        self.check_website(&website).await
    }

    /// Re-check a registered website.
    ///
    /// Unknown ids fail with `NotFound` before any request is made.
    pub async fn refresh_website(&self, id: Uuid) -> Result<MonitoredWebsite> {
        let website = self.storage.get_website(id).await?.ok_or(StorageError::NotFound)?;
        self.check_website(&website).await
    }

    pub async fn remove_website(&self, id: Uuid) -> Result<bool> {
        let removed = self.storage.remove_website(id).await?;
        if removed {
            info!("Removed website {id} from monitoring");
        }
        Ok(removed)
    }

    pub async fn websites(&self) -> Result<Vec<MonitoredWebsite>> {
        self.storage.get_websites().await
    }

    pub async fn website(&self, id: Uuid) -> Result<Option<MonitoredWebsite>> {
        self.storage.get_website(id).await
    }

    pub async fn history(&self, url: Option<&str>) -> Result<Vec<CheckResult>> {
        self.storage.get_check_history(url).await
    }

    /// Summary of one website's retained history
    pub async fn website_summary(&self, id: Uuid) -> Result<HistorySummary> {
        let website = self.storage.get_website(id).await?.ok_or(StorageError::NotFound)?;
        Ok(HistorySummary::from_history(&website.check_history))
    }

    /// Record the check globally, then apply it to the website.
    ///
    /// A failed global append leaves the website untouched.
    async fn check_website(&self, website: &MonitoredWebsite) -> Result<MonitoredWebsite> {
        let result = self.checker.check(&website.url).await;
        let result = self.storage.add_check_result(result).await?;

        match self.storage.update_website_check(website.id, result).await {
            Err(StorageError::NotFound) => {
                warn!("Website {} was removed during its check", website.id);
                Err(StorageError::NotFound)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStorage;
    use crate::database::models::{User, WebsiteStatus};
    use crate::monitoring::types::CheckStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Checker answering from a fixed script, counting calls
    struct ScriptedChecker {
        calls: AtomicUsize,
        online: bool,
    }

    impl ScriptedChecker {
        fn new(online: bool) -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), online })
        }
    }

    #[async_trait::async_trait]
    impl Checker for ScriptedChecker {
        async fn check(&self, url: &str) -> CheckResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.online {
                CheckResult::new(url).online(250, 200, Some(1024))
            } else {
                CheckResult::new(url).offline(15, "connection refused")
            }
        }
    }

    /// Memory storage whose global history rejects every append
    struct FailingHistory(MemoryStorage);

    #[async_trait::async_trait]
    impl Storage for FailingHistory {
        async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
            self.0.get_user(id).await
        }

        async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
            self.0.get_user_by_username(username).await
        }

        async fn create_user(&self, username: &str, password: &str) -> Result<User> {
            self.0.create_user(username, password).await
        }

        async fn get_websites(&self) -> Result<Vec<MonitoredWebsite>> {
            self.0.get_websites().await
        }

        async fn get_website(&self, id: Uuid) -> Result<Option<MonitoredWebsite>> {
            self.0.get_website(id).await
        }

        async fn add_website(&self, url: &str, name: &str) -> Result<MonitoredWebsite> {
            self.0.add_website(url, name).await
        }

        async fn remove_website(&self, id: Uuid) -> Result<bool> {
            self.0.remove_website(id).await
        }

        async fn update_website_check(&self, id: Uuid, result: CheckResult) -> Result<MonitoredWebsite> {
            self.0.update_website_check(id, result).await
        }

        async fn add_check_result(&self, _result: CheckResult) -> Result<CheckResult> {
            Err(StorageError::Pool("history unavailable".into()))
        }

        async fn get_check_history(&self, url: Option<&str>) -> Result<Vec<CheckResult>> {
            self.0.get_check_history(url).await
        }
    }

    fn executor(checker: Arc<ScriptedChecker>) -> (MonitoringExecutor, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (MonitoringExecutor::new(checker, storage.clone()), storage)
    }

    #[tokio::test]
    async fn test_check_url_records_global_history_only() {
        let (executor, storage) = executor(ScriptedChecker::new(true));

        let result = executor.check_url("https://example.com").await.unwrap();

        assert_eq!(result.status, CheckStatus::Online);
        assert_eq!(result.performance_score, 100);
        assert_eq!(storage.get_check_history(None).await.unwrap(), vec![result]);
        assert!(storage.get_websites().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_website_applies_initial_check() {
        let (executor, storage) = executor(ScriptedChecker::new(true));

        let website = executor.add_website("https://example.com", "Example").await.unwrap();

        assert_eq!(website.status, WebsiteStatus::Online);
        let last_check = website.last_check.clone().unwrap();
        assert!(last_check.performance_score <= 100);
        assert_eq!(website.check_history.len(), 1);

        let history = storage.get_check_history(Some("https://example.com")).await.unwrap();
        assert_eq!(history, vec![last_check]);
    }

    #[tokio::test]
    async fn test_refresh_offline_website() {
        let (executor, _storage) = executor(ScriptedChecker::new(false));

        let website = executor.add_website("https://example.com", "Example").await.unwrap();
        let refreshed = executor.refresh_website(website.id).await.unwrap();

        assert_eq!(refreshed.status, WebsiteStatus::Offline);
        assert_eq!(refreshed.check_history.len(), 2);
        assert_eq!(refreshed.last_check.as_ref().map(|r| r.performance_score), Some(0));
    }

    #[tokio::test]
    async fn test_refresh_unknown_website_does_nothing() {
        let checker = ScriptedChecker::new(true);
        let (executor, storage) = executor(checker.clone());

        let error = executor.refresh_website(Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(error, StorageError::NotFound));
        assert_eq!(checker.calls.load(Ordering::SeqCst), 0);
        assert!(storage.get_check_history(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_history_append_leaves_website_untouched() {
        let storage = Arc::new(FailingHistory(MemoryStorage::new()));
        let executor = MonitoringExecutor::new(ScriptedChecker::new(true), storage.clone());
        let website = storage.add_website("https://example.com", "Example").await.unwrap();

        let error = executor.refresh_website(website.id).await.unwrap_err();
        assert!(matches!(error, StorageError::Pool(_)));

        let stored = storage.get_website(website.id).await.unwrap().unwrap();
        assert_eq!(stored.status, WebsiteStatus::Checking);
        assert!(stored.last_check.is_none());
        assert!(stored.check_history.is_empty());
    }

    #[tokio::test]
    async fn test_website_summary() {
        let (executor, _storage) = executor(ScriptedChecker::new(true));

        let website = executor.add_website("https://example.com", "Example").await.unwrap();
        executor.refresh_website(website.id).await.unwrap();

        let summary = executor.website_summary(website.id).await.unwrap();
        assert_eq!(summary.checks, 2);
        assert_eq!(summary.average_load_time, 250);
        assert_eq!(summary.uptime, 100);
        assert_eq!(summary.grade.grade, "A+");

        assert!(matches!(
            executor.website_summary(Uuid::new_v4()).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_remove_website() {
        let (executor, _storage) = executor(ScriptedChecker::new(true));
        let website = executor.add_website("https://example.com", "Example").await.unwrap();

        assert!(executor.remove_website(website.id).await.unwrap());
        assert!(executor.website(website.id).await.unwrap().is_none());
        assert!(!executor.remove_website(website.id).await.unwrap());
    }
}
