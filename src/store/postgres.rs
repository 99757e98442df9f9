//! Postgres backend (`sql/schema.sql`).
//!
//! Every statement runs inside a `db.query` span. Unique violations
//! (SQLSTATE `23505`) are lifted into [`StoreError::UniqueViolation`] so the
//! domain layer can match on them without knowing about sqlx.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Connection, FromRow, PgPool, Row, postgres::PgRow};
use tracing::Instrument;
use uuid::Uuid;

use super::{
    AdminRecord, AdminStore, BlacklistEntry, BlacklistStore, NewAdmin, NewBlacklistEntry, Store,
    StoreError, StoreResult,
};

const BLACKLIST_COLUMNS: &str =
    "id, address, network, reason, notes, blacklisted_by, blacklisted_at";

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            let constraint = match &err {
                sqlx::Error::Database(db_err) => {
                    db_err.constraint().unwrap_or("unknown").to_string()
                }
                _ => "unknown".to_string(),
            };
            Self::UniqueViolation(constraint)
        } else {
            Self::Database(err)
        }
    }
}

fn query_span(operation: &'static str, statement: &str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

impl<'r> FromRow<'r, PgRow> for AdminRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            access_token: row.try_get("access_token")?,
            created_at: row.try_get("created_at")?,
            last_login: row.try_get("last_login")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for BlacklistEntry {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            address: row.try_get("address")?,
            network: row.try_get("network")?,
            reason: row.try_get("reason")?,
            notes: row.try_get("notes")?,
            blacklisted_by: row.try_get("blacklisted_by")?,
            blacklisted_at: row.try_get("blacklisted_at")?,
        })
    }
}

#[async_trait]
impl AdminStore for PgStore {
    async fn admin_count(&self) -> StoreResult<i64> {
        let query = "SELECT COUNT(*) AS count FROM administrators";
        let row = sqlx::query(query)
            .fetch_one(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;
        Ok(row.try_get("count")?)
    }

    async fn insert_admin(&self, admin: NewAdmin) -> StoreResult<AdminRecord> {
        let query = r"
            INSERT INTO administrators (id, username, password_hash, access_token)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, access_token, created_at, last_login
        ";
        let record = sqlx::query_as::<_, AdminRecord>(query)
            .bind(Uuid::new_v4())
            .bind(&admin.username)
            .bind(&admin.password_hash)
            .bind(&admin.access_token)
            .fetch_one(&self.pool)
            .instrument(query_span("INSERT", query))
            .await?;
        Ok(record)
    }

    async fn find_admin(
        &self,
        username: &str,
        access_token: &str,
    ) -> StoreResult<Option<AdminRecord>> {
        let query = r"
            SELECT id, username, password_hash, access_token, created_at, last_login
            FROM administrators
            WHERE username = $1 AND access_token = $2
            LIMIT 1
        ";
        let record = sqlx::query_as::<_, AdminRecord>(query)
            .bind(username)
            .bind(access_token)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;
        Ok(record)
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()> {
        // GREATEST keeps last_login monotonic if clocks disagree between instances.
        let query = r"
            UPDATE administrators
            SET last_login = GREATEST(COALESCE(last_login, $2), $2)
            WHERE id = $1
        ";
        sqlx::query(query)
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl BlacklistStore for PgStore {
    async fn find_entry(&self, address: &str) -> StoreResult<Option<BlacklistEntry>> {
        let query =
            format!("SELECT {BLACKLIST_COLUMNS} FROM blacklisted_addresses WHERE address = $1");
        let entry = sqlx::query_as::<_, BlacklistEntry>(&query)
            .bind(address)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", &query))
            .await?;
        Ok(entry)
    }

    async fn find_applicable(
        &self,
        address: &str,
        network: Option<&str>,
    ) -> StoreResult<Option<BlacklistEntry>> {
        // `network = NULL` never matches, so a missing network only hits global rows.
        let query = format!(
            "SELECT {BLACKLIST_COLUMNS} FROM blacklisted_addresses \
             WHERE address = $1 AND (network IS NULL OR network = $2) \
             ORDER BY network NULLS FIRST LIMIT 1"
        );
        let entry = sqlx::query_as::<_, BlacklistEntry>(&query)
            .bind(address)
            .bind(network)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", &query))
            .await?;
        Ok(entry)
    }

    async fn list_entries(&self, network: Option<&str>) -> StoreResult<Vec<BlacklistEntry>> {
        let entries = if let Some(network) = network {
            let query = format!(
                "SELECT {BLACKLIST_COLUMNS} FROM blacklisted_addresses \
                 WHERE network = $1 ORDER BY blacklisted_at DESC"
            );
            sqlx::query_as::<_, BlacklistEntry>(&query)
                .bind(network)
                .fetch_all(&self.pool)
                .instrument(query_span("SELECT", &query))
                .await?
        } else {
            let query = format!(
                "SELECT {BLACKLIST_COLUMNS} FROM blacklisted_addresses ORDER BY blacklisted_at DESC"
            );
            sqlx::query_as::<_, BlacklistEntry>(&query)
                .fetch_all(&self.pool)
                .instrument(query_span("SELECT", &query))
                .await?
        };
        Ok(entries)
    }

    async fn insert_entry(&self, entry: NewBlacklistEntry) -> StoreResult<BlacklistEntry> {
        let query = format!(
            "INSERT INTO blacklisted_addresses (id, address, network, reason, notes, blacklisted_by) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {BLACKLIST_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, BlacklistEntry>(&query)
            .bind(Uuid::new_v4())
            .bind(&entry.address)
            .bind(&entry.network)
            .bind(&entry.reason)
            .bind(&entry.notes)
            .bind(&entry.blacklisted_by)
            .fetch_one(&self.pool)
            .instrument(query_span("INSERT", &query))
            .await?;
        Ok(inserted)
    }

    async fn delete_entry(&self, address: &str) -> StoreResult<bool> {
        let query = "DELETE FROM blacklisted_addresses WHERE address = $1";
        let result = sqlx::query(query)
            .bind(address)
            .execute(&self.pool)
            .instrument(query_span("DELETE", query))
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        let acquire_span = tracing::info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;
        let ping_span =
            tracing::info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;
        Ok(())
    }
}
