//! Blacklist registry operations.
//!
//! Every address is normalized (trimmed, lower-cased) before it touches the
//! store. Uniqueness is keyed on the address alone, so one address carries at
//! most one entry: either global (no network) or scoped to a single network.
//! `exists` honours that scope; `list` is a raw filter and does not.

use tracing::info;

use crate::api::error::ApiError;
use crate::store::{
    BlacklistEntry, BlacklistStore, DEFAULT_BLACKLISTED_BY, NewBlacklistEntry, StoreError,
    StoreResult,
};

#[derive(Debug, thiserror::Error)]
pub enum BlacklistError {
    #[error("Address is required")]
    MissingAddress,
    /// Carries the existing entry when the pre-check found it; a lost insert
    /// race only knows that the constraint fired.
    #[error("Address is already blacklisted")]
    AlreadyBlacklisted(Option<Box<BlacklistEntry>>),
    #[error("Address not found in blacklist")]
    NotFound,
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for BlacklistError {
    fn from(err: StoreError) -> Self {
        if err.is_unique_violation() {
            Self::AlreadyBlacklisted(None)
        } else {
            Self::Store(err)
        }
    }
}

impl From<BlacklistError> for ApiError {
    fn from(err: BlacklistError) -> Self {
        match err {
            BlacklistError::MissingAddress => Self::Validation("Address is required"),
            BlacklistError::AlreadyBlacklisted(existing) => Self::Conflict {
                message: "Address is already blacklisted",
                existing,
            },
            BlacklistError::NotFound => Self::NotFound("Address not found in blacklist"),
            BlacklistError::Store(err) => Self::from(err),
        }
    }
}

/// Result of a public existence lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub entry: Option<BlacklistEntry>,
}

impl Verdict {
    #[must_use]
    pub fn is_blacklisted(&self) -> bool {
        self.entry.is_some()
    }
}

/// Trim and lower-case an address; `None` when nothing is left.
#[must_use]
pub fn normalize_address(address: &str) -> Option<String> {
    let normalized = address.trim().to_lowercase();
    (!normalized.is_empty()).then_some(normalized)
}

/// Empty optional text is treated as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

/// Fields accepted by [`add`].
#[derive(Clone, Debug, Default)]
pub struct NewEntry {
    pub address: String,
    pub network: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

/// Global entries match any network; scoped entries match only their own.
///
/// # Errors
/// `MissingAddress` for a blank address, `Store` for backend failures.
pub async fn exists<S: BlacklistStore + ?Sized>(
    store: &S,
    address: &str,
    network: Option<&str>,
) -> Result<Verdict, BlacklistError> {
    let address = normalize_address(address).ok_or(BlacklistError::MissingAddress)?;
    let network = network.filter(|network| !network.is_empty());
    let entry = store.find_applicable(&address, network).await?;
    Ok(Verdict { entry })
}

/// Entries newest first; `network` is an exact filter.
///
/// # Errors
/// Returns an error if the store cannot be queried.
pub async fn list<S: BlacklistStore + ?Sized>(
    store: &S,
    network: Option<&str>,
) -> StoreResult<Vec<BlacklistEntry>> {
    let network = network.filter(|network| !network.is_empty());
    store.list_entries(network).await
}

/// # Errors
/// `MissingAddress` for a blank address, `AlreadyBlacklisted` when any entry
/// holds the address (including one inserted concurrently), `Store` otherwise.
pub async fn add<S: BlacklistStore + ?Sized>(
    store: &S,
    entry: NewEntry,
) -> Result<BlacklistEntry, BlacklistError> {
    let address = normalize_address(&entry.address).ok_or(BlacklistError::MissingAddress)?;

    if let Some(existing) = store.find_entry(&address).await? {
        return Err(BlacklistError::AlreadyBlacklisted(Some(Box::new(existing))));
    }

    let created = store
        .insert_entry(NewBlacklistEntry {
            address,
            network: non_empty(entry.network),
            reason: non_empty(entry.reason),
            notes: non_empty(entry.notes),
            blacklisted_by: DEFAULT_BLACKLISTED_BY.to_string(),
        })
        .await?;

    info!(
        address = %created.address,
        network = created.network.as_deref().unwrap_or("global"),
        "Address blacklisted"
    );
    Ok(created)
}

/// Removal is keyed on the address alone.
///
/// # Errors
/// `MissingAddress` for a blank address, `NotFound` when nothing matched,
/// `Store` for backend failures.
pub async fn remove<S: BlacklistStore + ?Sized>(
    store: &S,
    address: &str,
) -> Result<(), BlacklistError> {
    let address = normalize_address(address).ok_or(BlacklistError::MissingAddress)?;
    if !store.delete_entry(&address).await? {
        return Err(BlacklistError::NotFound);
    }
    info!(address = %address, "Address removed from blacklist");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use anyhow::Result;

    fn entry(address: &str, network: Option<&str>) -> NewEntry {
        NewEntry {
            address: address.to_string(),
            network: network.map(str::to_string),
            ..NewEntry::default()
        }
    }

    #[test]
    fn normalization_is_idempotent() {
        assert_eq!(normalize_address("0xABC").as_deref(), Some("0xabc"));
        assert_eq!(normalize_address("0xabc ").as_deref(), Some("0xabc"));
        assert_eq!(normalize_address(" 0xabc").as_deref(), Some("0xabc"));
        let once = normalize_address(" 0xAbC ");
        assert_eq!(once.as_deref().and_then(normalize_address), once);
        assert_eq!(normalize_address("   "), None);
    }

    #[tokio::test]
    async fn lookups_ignore_case_and_padding() -> Result<()> {
        let store = MemoryStore::new();
        add(&store, entry("0xABC", None)).await?;

        for probe in ["0xABC", "0xabc ", " 0xabc"] {
            assert!(exists(&store, probe, None).await?.is_blacklisted());
        }
        Ok(())
    }

    #[tokio::test]
    async fn global_entries_apply_to_every_network() -> Result<()> {
        let store = MemoryStore::new();
        add(&store, entry("0xglobal", None)).await?;

        assert!(exists(&store, "0xglobal", None).await?.is_blacklisted());
        assert!(exists(&store, "0xglobal", Some("ETH")).await?.is_blacklisted());
        assert!(exists(&store, "0xglobal", Some("SOL")).await?.is_blacklisted());
        Ok(())
    }

    #[tokio::test]
    async fn scoped_entries_apply_to_their_network_only() -> Result<()> {
        let store = MemoryStore::new();
        add(&store, entry("0xAA", Some("ETH"))).await?;

        assert!(exists(&store, "0xaa", Some("ETH")).await?.is_blacklisted());
        assert!(!exists(&store, "0xaa", Some("SOL")).await?.is_blacklisted());
        assert!(!exists(&store, "0xaa", None).await?.is_blacklisted());
        assert!(!exists(&store, "0xaa", Some("")).await?.is_blacklisted());
        Ok(())
    }

    #[tokio::test]
    async fn verdict_carries_reason_and_timestamp() -> Result<()> {
        let store = MemoryStore::new();
        let created = add(
            &store,
            NewEntry {
                address: "0xbad".to_string(),
                reason: Some("phishing".to_string()),
                ..NewEntry::default()
            },
        )
        .await?;

        let verdict = exists(&store, "0xBAD", None).await?;
        let found = verdict.entry.as_ref();
        assert_eq!(found.and_then(|e| e.reason.as_deref()), Some("phishing"));
        assert_eq!(found.map(|e| e.blacklisted_at), Some(created.blacklisted_at));
        Ok(())
    }

    #[tokio::test]
    async fn blank_address_is_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(
            exists(&store, "  ", None).await,
            Err(BlacklistError::MissingAddress)
        ));
        assert!(matches!(
            add(&store, entry("", None)).await,
            Err(BlacklistError::MissingAddress)
        ));
        assert!(matches!(
            remove(&store, " ").await,
            Err(BlacklistError::MissingAddress)
        ));
    }

    #[tokio::test]
    async fn second_add_conflicts_with_existing_entry() -> Result<()> {
        let store = MemoryStore::new();
        add(&store, entry("0xdup", Some("ETH"))).await?;

        match add(&store, entry("0xDUP", Some("SOL"))).await {
            Err(BlacklistError::AlreadyBlacklisted(Some(existing))) => {
                assert_eq!(existing.address, "0xdup");
                assert_eq!(existing.network.as_deref(), Some("ETH"));
            }
            other => anyhow::bail!("expected conflict, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn store_race_maps_to_conflict() {
        let err = BlacklistError::from(StoreError::UniqueViolation(
            "blacklisted_addresses_address_key".to_string(),
        ));
        assert!(matches!(err, BlacklistError::AlreadyBlacklisted(None)));
    }

    #[tokio::test]
    async fn empty_optional_fields_are_absent() -> Result<()> {
        let store = MemoryStore::new();
        let created = add(
            &store,
            NewEntry {
                address: "0xempty".to_string(),
                network: Some(String::new()),
                reason: Some(String::new()),
                notes: Some(String::new()),
            },
        )
        .await?;
        assert_eq!(created.network, None);
        assert_eq!(created.reason, None);
        assert_eq!(created.notes, None);
        assert_eq!(created.blacklisted_by, DEFAULT_BLACKLISTED_BY);
        Ok(())
    }

    #[tokio::test]
    async fn remove_then_exists_is_false() -> Result<()> {
        let store = MemoryStore::new();
        add(&store, entry("0xgone", None)).await?;

        remove(&store, " 0xGONE ").await?;
        assert!(!exists(&store, "0xgone", None).await?.is_blacklisted());
        assert!(matches!(
            remove(&store, "0xgone").await,
            Err(BlacklistError::NotFound)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn list_filters_by_exact_network() -> Result<()> {
        let store = MemoryStore::new();
        add(&store, entry("0x1", None)).await?;
        add(&store, entry("0x2", Some("ETH"))).await?;
        add(&store, entry("0x3", Some("SOL"))).await?;

        assert_eq!(list(&store, None).await?.len(), 3);
        assert_eq!(list(&store, Some("")).await?.len(), 3);

        let eth = list(&store, Some("ETH")).await?;
        assert_eq!(eth.len(), 1);
        assert_eq!(eth[0].address, "0x2");
        Ok(())
    }
}
