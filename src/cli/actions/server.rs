use crate::{
    api::{self, SharedStore, handlers::admin::SessionConfig},
    cli::commands::session::Environment,
    store::{MemoryStore, PgStore},
};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<String>,
    pub environment: Environment,
    pub session_ttl_seconds: i64,
    pub frontend_origin: Option<String>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let store: SharedStore = match &args.dsn {
        Some(dsn) => Arc::new(connect(dsn).await?),
        None => {
            warn!("No DSN configured; using an in-memory store, all data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let session_config = SessionConfig::new()
        .with_ttl_seconds(args.session_ttl_seconds)
        .with_secure(args.environment.secure_cookies());

    api::new(
        args.port,
        store,
        session_config,
        args.frontend_origin.as_deref(),
    )
    .await
}

async fn connect(dsn: &str) -> Result<PgStore> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(dsn)
        .await
        .context("Failed to connect to database")?;
    Ok(PgStore::new(pool))
}

fn log_startup_args(args: &Args) {
    let database = args
        .dsn
        .as_deref()
        .map_or_else(|| "memory".to_string(), redact_dsn);
    info!(
        port = args.port,
        database = %database,
        environment = ?args.environment,
        session_ttl_seconds = args.session_ttl_seconds,
        frontend_origin = args.frontend_origin.as_deref().unwrap_or("none"),
        "Starting warden"
    );
}

/// DSN with the password masked, for logs.
fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("****"));
            }
            url.to_string()
        }
        Err(_) => "<unparseable dsn>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_dsn_masks_password() {
        assert_eq!(
            redact_dsn("postgres://warden:hunter2@db:5432/warden"),
            "postgres://warden:****@db:5432/warden"
        );
        assert_eq!(
            redact_dsn("postgres://warden@db:5432/warden"),
            "postgres://warden@db:5432/warden"
        );
        assert_eq!(redact_dsn("not a url"), "<unparseable dsn>");
    }
}
