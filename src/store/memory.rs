//! In-process backend with the same uniqueness rules as the Postgres schema.
//!
//! Used when no DSN is configured (state is lost on restart) and by tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AdminRecord, AdminStore, BlacklistEntry, BlacklistStore, NewAdmin, NewBlacklistEntry, Store,
    StoreError, StoreResult,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    admin: RwLock<Option<AdminRecord>>,
    // Keyed by normalized address, which is the uniqueness key.
    entries: RwLock<BTreeMap<String, BlacklistEntry>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn admin_count(&self) -> StoreResult<i64> {
        Ok(i64::from(self.admin.read().await.is_some()))
    }

    async fn insert_admin(&self, admin: NewAdmin) -> StoreResult<AdminRecord> {
        let mut slot = self.admin.write().await;
        if let Some(existing) = slot.as_ref() {
            let constraint = if existing.username == admin.username {
                "administrators_username_key"
            } else if existing.access_token == admin.access_token {
                "administrators_access_token_key"
            } else {
                "administrators_singleton_key"
            };
            return Err(StoreError::UniqueViolation(constraint.to_string()));
        }
        let record = AdminRecord {
            id: Uuid::new_v4(),
            username: admin.username,
            password_hash: admin.password_hash,
            access_token: admin.access_token,
            created_at: Utc::now(),
            last_login: None,
        };
        *slot = Some(record.clone());
        Ok(record)
    }

    async fn find_admin(
        &self,
        username: &str,
        access_token: &str,
    ) -> StoreResult<Option<AdminRecord>> {
        Ok(self
            .admin
            .read()
            .await
            .as_ref()
            .filter(|admin| admin.username == username && admin.access_token == access_token)
            .cloned())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()> {
        if let Some(admin) = self.admin.write().await.as_mut()
            && admin.id == id
        {
            admin.last_login = Some(admin.last_login.map_or(at, |previous| previous.max(at)));
        }
        Ok(())
    }
}

#[async_trait]
impl BlacklistStore for MemoryStore {
    async fn find_entry(&self, address: &str) -> StoreResult<Option<BlacklistEntry>> {
        Ok(self.entries.read().await.get(address).cloned())
    }

    async fn find_applicable(
        &self,
        address: &str,
        network: Option<&str>,
    ) -> StoreResult<Option<BlacklistEntry>> {
        Ok(self
            .entries
            .read()
            .await
            .get(address)
            .filter(|entry| match entry.network.as_deref() {
                None => true,
                Some(scoped) => network == Some(scoped),
            })
            .cloned())
    }

    async fn list_entries(&self, network: Option<&str>) -> StoreResult<Vec<BlacklistEntry>> {
        let mut entries: Vec<BlacklistEntry> = self
            .entries
            .read()
            .await
            .values()
            .filter(|entry| network.is_none_or(|wanted| entry.network.as_deref() == Some(wanted)))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.blacklisted_at.cmp(&a.blacklisted_at));
        Ok(entries)
    }

    async fn insert_entry(&self, entry: NewBlacklistEntry) -> StoreResult<BlacklistEntry> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(&entry.address) {
            return Err(StoreError::UniqueViolation(
                "blacklisted_addresses_address_key".to_string(),
            ));
        }
        let stored = BlacklistEntry {
            id: Uuid::new_v4(),
            address: entry.address,
            network: entry.network,
            reason: entry.reason,
            notes: entry.notes,
            blacklisted_by: entry.blacklisted_by,
            blacklisted_at: Utc::now(),
        };
        entries.insert(stored.address.clone(), stored.clone());
        Ok(stored)
    }

    async fn delete_entry(&self, address: &str) -> StoreResult<bool> {
        Ok(self.entries.write().await.remove(address).is_some())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DEFAULT_BLACKLISTED_BY;

    fn entry(address: &str, network: Option<&str>) -> NewBlacklistEntry {
        NewBlacklistEntry {
            address: address.to_string(),
            network: network.map(str::to_string),
            reason: None,
            notes: None,
            blacklisted_by: DEFAULT_BLACKLISTED_BY.to_string(),
        }
    }

    fn admin(username: &str, token: &str) -> NewAdmin {
        NewAdmin {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            access_token: token.to_string(),
        }
    }

    #[tokio::test]
    async fn second_admin_is_a_unique_violation() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.insert_admin(admin("root", "tok12345")).await?;

        let err = store.insert_admin(admin("other", "tok99999")).await;
        assert!(matches!(err, Err(StoreError::UniqueViolation(ref c)) if c == "administrators_singleton_key"));

        let err = store.insert_admin(admin("root", "tok99999")).await;
        assert!(matches!(err, Err(StoreError::UniqueViolation(ref c)) if c == "administrators_username_key"));

        assert_eq!(store.admin_count().await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn find_admin_requires_both_fields() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.insert_admin(admin("root", "tok12345")).await?;

        assert!(store.find_admin("root", "tok12345").await?.is_some());
        assert!(store.find_admin("root", "tok00000").await?.is_none());
        assert!(store.find_admin("Root", "tok12345").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn record_login_never_moves_backwards() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let record = store.insert_admin(admin("root", "tok12345")).await?;
        let later = Utc::now();
        let earlier = later - chrono::Duration::seconds(60);

        store.record_login(record.id, later).await?;
        store.record_login(record.id, earlier).await?;

        let reloaded = store.find_admin("root", "tok12345").await?;
        assert_eq!(reloaded.and_then(|admin| admin.last_login), Some(later));
        Ok(())
    }

    #[tokio::test]
    async fn applicable_entries_respect_scope() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.insert_entry(entry("0xglobal", None)).await?;
        store.insert_entry(entry("0xeth", Some("ETH"))).await?;

        assert!(store.find_applicable("0xglobal", Some("SOL")).await?.is_some());
        assert!(store.find_applicable("0xglobal", None).await?.is_some());
        assert!(store.find_applicable("0xeth", Some("ETH")).await?.is_some());
        assert!(store.find_applicable("0xeth", Some("SOL")).await?.is_none());
        assert!(store.find_applicable("0xeth", None).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn list_filters_exactly_and_orders_newest_first() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.insert_entry(entry("0x1", None)).await?;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.insert_entry(entry("0x2", Some("ETH"))).await?;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.insert_entry(entry("0x3", Some("ETH"))).await?;

        let all: Vec<String> = store
            .list_entries(None)
            .await?
            .into_iter()
            .map(|e| e.address)
            .collect();
        assert_eq!(all, vec!["0x3", "0x2", "0x1"]);

        // Global entries are not pulled into a network filter.
        let eth = store.list_entries(Some("ETH")).await?;
        assert_eq!(eth.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_address_rejected_regardless_of_network() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.insert_entry(entry("0xaa", Some("ETH"))).await?;
        let err = store.insert_entry(entry("0xaa", Some("SOL"))).await;
        assert!(matches!(err, Err(StoreError::UniqueViolation(_))));
        Ok(())
    }
}
