use anyhow::{Result, anyhow};
use clap::{Arg, ArgMatches, Command, builder::PossibleValuesParser};

pub const ARG_ENVIRONMENT: &str = "environment";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_FRONTEND_ORIGIN: &str = "frontend-origin";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Production deployments are served over HTTPS, so cookies get `Secure`.
    #[must_use]
    pub fn secure_cookies(self) -> bool {
        self == Self::Production
    }
}

#[derive(Debug, Clone)]
pub struct Options {
    pub environment: Environment,
    pub session_ttl_seconds: i64,
    pub frontend_origin: Option<String>,
}

impl Options {
    /// Parse session and deployment arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the TTL is not positive.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let environment = match matches.get_one::<String>(ARG_ENVIRONMENT).map(String::as_str) {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        };

        let session_ttl_seconds = matches
            .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
            .copied()
            .unwrap_or(crate::api::handlers::admin::session::DEFAULT_SESSION_TTL_SECONDS);
        if session_ttl_seconds <= 0 {
            return Err(anyhow!("--{ARG_SESSION_TTL_SECONDS} must be positive"));
        }

        let frontend_origin = matches
            .get_one::<String>(ARG_FRONTEND_ORIGIN)
            .cloned()
            .filter(|v| !v.trim().is_empty());

        Ok(Self {
            environment,
            session_ttl_seconds,
            frontend_origin,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ENVIRONMENT)
                .long(ARG_ENVIRONMENT)
                .help("Deployment environment; production marks session cookies Secure")
                .env("WARDEN_ENV")
                .default_value("development")
                .value_parser(PossibleValuesParser::new(["development", "production"])),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session cookie TTL in seconds")
                .env("WARDEN_SESSION_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_FRONTEND_ORIGIN)
                .long(ARG_FRONTEND_ORIGIN)
                .help("Console origin allowed to call the API with credentials (enables CORS)")
                .env("WARDEN_FRONTEND_ORIGIN"),
        )
}
