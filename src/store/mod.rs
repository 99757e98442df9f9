//! Durable state behind the administration surface.
//!
//! Two collections live here: the administrator (zero or one row) and the
//! blacklist entries. Handlers only talk to the [`Store`] trait object so the
//! Postgres backend and the in-memory backend are interchangeable.
//!
//! Uniqueness is enforced by the backend itself, never by the caller alone:
//! a second administrator, a reused username/access token, or a reused address
//! all surface as [`StoreError::UniqueViolation`]. Callers translate that
//! signal into the same domain outcome as their own pre-checks.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Attribution recorded on entries created through the console.
pub const DEFAULT_BLACKLISTED_BY: &str = "admin";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Full administrator row, secrets included. Never serialized.
#[derive(Clone, Debug)]
pub struct AdminRecord {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Values for the one-time administrator insert. Fields are already trimmed
/// and the password already hashed.
#[derive(Clone, Debug)]
pub struct NewAdmin {
    pub username: String,
    pub password_hash: String,
    pub access_token: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlacklistEntry {
    pub id: Uuid,
    pub address: String,
    pub network: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub blacklisted_by: String,
    pub blacklisted_at: DateTime<Utc>,
}

/// Values for a blacklist insert; `address` is already normalized.
#[derive(Clone, Debug)]
pub struct NewBlacklistEntry {
    pub address: String,
    pub network: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub blacklisted_by: String,
}

#[async_trait]
pub trait AdminStore: Send + Sync {
    /// Number of administrator rows (0 or 1).
    async fn admin_count(&self) -> StoreResult<i64>;

    /// Insert the administrator. Fails with `UniqueViolation` if any row exists
    /// or the username/access token collides.
    async fn insert_admin(&self, admin: NewAdmin) -> StoreResult<AdminRecord>;

    /// Exact match on both username and access token.
    async fn find_admin(&self, username: &str, access_token: &str)
    -> StoreResult<Option<AdminRecord>>;

    /// Stamp a successful login.
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()>;
}

#[async_trait]
pub trait BlacklistStore: Send + Sync {
    /// Entry for a normalized address, whatever its network.
    async fn find_entry(&self, address: &str) -> StoreResult<Option<BlacklistEntry>>;

    /// Entry for a normalized address that is global or scoped to `network`.
    /// With `network == None` only global entries match.
    async fn find_applicable(
        &self,
        address: &str,
        network: Option<&str>,
    ) -> StoreResult<Option<BlacklistEntry>>;

    /// Entries newest first, optionally filtered by exact network.
    async fn list_entries(&self, network: Option<&str>) -> StoreResult<Vec<BlacklistEntry>>;

    async fn insert_entry(&self, entry: NewBlacklistEntry) -> StoreResult<BlacklistEntry>;

    /// Returns `false` when nothing matched the normalized address.
    async fn delete_entry(&self, address: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait Store: AdminStore + BlacklistStore {
    /// Cheap liveness probe used by `/health`.
    async fn ping(&self) -> StoreResult<()>;
}
