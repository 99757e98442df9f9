//! Credential store and verifier for the single administrator.
//!
//! Flow Overview:
//! 1) `bootstrap` checks that no administrator exists, validates the input,
//!    hashes the password with Argon2id and inserts the row.
//! 2) The pre-check is not atomic. A concurrent bootstrap that wins the race
//!    makes our insert hit a unique constraint, which is reported exactly like
//!    the pre-check's "already bootstrapped".
//! 3) `verify` looks the administrator up by trimmed username and access token,
//!    compares the password hash and stamps `last_login` on success. It only
//!    ever answers yes or no.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use super::types::{AdminProfile, Credentials};
use crate::api::error::ApiError;
use crate::store::{AdminStore, NewAdmin, StoreError, StoreResult};

pub const USERNAME_MIN_CHARS: usize = 3;
pub const PASSWORD_MIN_CHARS: usize = 6;
pub const ACCESS_TOKEN_MIN_CHARS: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Admin account already exists")]
    AlreadyBootstrapped,
    #[error("{0}")]
    Validation(&'static str),
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for BootstrapError {
    fn from(err: StoreError) -> Self {
        if err.is_unique_violation() {
            Self::AlreadyBootstrapped
        } else {
            Self::Store(err)
        }
    }
}

impl From<BootstrapError> for ApiError {
    fn from(err: BootstrapError) -> Self {
        match err {
            BootstrapError::AlreadyBootstrapped => Self::conflict("Admin account already exists"),
            BootstrapError::Validation(message) => Self::Validation(message),
            BootstrapError::Hash(detail) => Self::Internal(format!("password hashing: {detail}")),
            BootstrapError::Store(err) => Self::from(err),
        }
    }
}

/// True iff an administrator record exists.
///
/// # Errors
/// Returns an error if the store cannot be queried.
pub async fn is_bootstrapped<S: AdminStore + ?Sized>(store: &S) -> StoreResult<bool> {
    Ok(store.admin_count().await? > 0)
}

/// Create the one administrator and return its public fields.
///
/// # Errors
/// `AlreadyBootstrapped` when an administrator exists (including one created
/// concurrently), `Validation` for inputs under the minimum lengths, `Store`
/// for backend failures.
pub async fn bootstrap<S: AdminStore + ?Sized>(
    store: &S,
    credentials: Credentials,
) -> Result<AdminProfile, BootstrapError> {
    if is_bootstrapped(store).await? {
        return Err(BootstrapError::AlreadyBootstrapped);
    }

    let username = credentials.username.trim().to_string();
    let access_token = credentials.access_token.expose_secret().trim().to_string();
    validate(&username, &credentials.password, &access_token)?;

    let password_hash = hash_password(&credentials.password).await?;
    let record = store
        .insert_admin(NewAdmin {
            username,
            password_hash,
            access_token,
        })
        .await?;

    info!(username = %record.username, "administrator bootstrapped");
    Ok(AdminProfile {
        username: record.username,
        created_at: record.created_at,
    })
}

fn validate(
    username: &str,
    password: &SecretString,
    access_token: &str,
) -> Result<(), BootstrapError> {
    if username.chars().count() < USERNAME_MIN_CHARS {
        return Err(BootstrapError::Validation(
            "Username must be at least 3 characters",
        ));
    }
    if password.expose_secret().chars().count() < PASSWORD_MIN_CHARS {
        return Err(BootstrapError::Validation(
            "Password must be at least 6 characters",
        ));
    }
    if access_token.chars().count() < ACCESS_TOKEN_MIN_CHARS {
        return Err(BootstrapError::Validation(
            "Access token must be at least 8 characters",
        ));
    }
    Ok(())
}

/// Check a login attempt. `false` covers an unknown username, a wrong access
/// token and a wrong password alike.
///
/// # Errors
/// Returns an error only if the store fails.
pub async fn verify<S: AdminStore + ?Sized>(
    store: &S,
    credentials: &Credentials,
) -> StoreResult<bool> {
    let username = credentials.username.trim();
    let access_token = credentials.access_token.expose_secret().trim();
    let Some(admin) = store.find_admin(username, access_token).await? else {
        return Ok(false);
    };

    if !verify_password(&credentials.password, admin.password_hash).await {
        return Ok(false);
    }

    store.record_login(admin.id, Utc::now()).await?;
    Ok(true)
}

async fn hash_password(password: &SecretString) -> Result<String, BootstrapError> {
    let password = SecretString::from(password.expose_secret().to_owned());
    // Argon2 is deliberately slow; keep it off the async workers.
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.expose_secret().as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| BootstrapError::Hash(err.to_string()))
    })
    .await
    .map_err(|err| BootstrapError::Hash(err.to_string()))?
}

async fn verify_password(password: &SecretString, password_hash: String) -> bool {
    let password = SecretString::from(password.expose_secret().to_owned());
    let outcome = tokio::task::spawn_blocking(move || {
        PasswordHash::new(&password_hash).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.expose_secret().as_bytes(), &parsed)
                .is_ok()
        })
    })
    .await;
    outcome.unwrap_or_else(|err| {
        warn!("Password verification task failed: {err}");
        false
    })
}
