use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use super::error::{Result, StorageError};
use super::models::{MonitoredWebsite, User};
use super::repository::Storage;
use crate::history::{BoundedLog, GLOBAL_HISTORY_LIMIT};
use crate::monitoring::types::CheckResult;

/// Process-memory storage; all state is lost on restart.
///
/// Each website sits behind its own mutex so applying checks to one website
/// never waits on another. The map lock is only held to find, insert or
/// remove an entry.
#[derive(Debug)]
pub struct MemoryStorage {
    users: RwLock<HashMap<Uuid, User>>,
    websites: RwLock<HashMap<Uuid, Arc<Mutex<MonitoredWebsite>>>>,
    check_history: Mutex<BoundedLog<CheckResult>>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            websites: RwLock::new(HashMap::new()),
            check_history: Mutex::new(BoundedLog::new(GLOBAL_HISTORY_LIMIT)),
        }
    }

    async fn website_entry(&self, id: Uuid) -> Option<Arc<Mutex<MonitoredWebsite>>> {
        self.websites.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.username == username).cloned())
    }

    async fn create_user(&self, username: &str, password: &str) -> Result<User> {
        let mut users = self.users.write().await;

        if users.values().any(|user| user.username == username) {
            return Err(StorageError::Conflict(format!("username '{username}' is taken")));
        }

        let user = User::new(username.to_string(), password.to_string());
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_websites(&self) -> Result<Vec<MonitoredWebsite>> {
        let entries: Vec<_> = self.websites.read().await.values().cloned().collect();

        let mut websites = Vec::with_capacity(entries.len());
        for entry in entries {
            websites.push(entry.lock().await.clone());
        }
        websites.sort_by_key(|website| website.added_at);

        Ok(websites)
    }

    async fn get_website(&self, id: Uuid) -> Result<Option<MonitoredWebsite>> {
        match self.website_entry(id).await {
            Some(entry) => Ok(Some(entry.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn add_website(&self, url: &str, name: &str) -> Result<MonitoredWebsite> {
        let website = MonitoredWebsite::new(url.to_string(), name.to_string());

        self.websites
            .write()
            .await
            .insert(website.id, Arc::new(Mutex::new(website.clone())));

        debug!("Registered website {} ({})", website.id, website.url);
        Ok(website)
    }

    async fn remove_website(&self, id: Uuid) -> Result<bool> {
        Ok(self.websites.write().await.remove(&id).is_some())
    }

    async fn update_website_check(&self, id: Uuid, result: CheckResult) -> Result<MonitoredWebsite> {
        let entry = self.website_entry(id).await.ok_or(StorageError::NotFound)?;

        let mut website = entry.lock().await;
        website.apply_check(result);
        Ok(website.clone())
    }

    async fn add_check_result(&self, result: CheckResult) -> Result<CheckResult> {
        let evicted = self.check_history.lock().await.push(result.clone());
        if evicted > 0 {
            debug!("Global history full, evicted {evicted} oldest result(s)");
        }
        Ok(result)
    }

    async fn get_check_history(&self, url: Option<&str>) -> Result<Vec<CheckResult>> {
        let history = self.check_history.lock().await;

        Ok(match url {
            Some(url) => history.iter().filter(|result| result.url == url).cloned().collect(),
            None => history.to_vec(),
        })
    }
}
