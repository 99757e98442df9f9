//! Request/response types for admin endpoints.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body shared by bootstrap and login: all three fields are required.
#[derive(ToSchema, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    #[schema(format = Password)]
    pub password: Option<String>,
    #[serde(default)]
    #[schema(format = Password)]
    pub access_token: Option<String>,
}

impl CredentialsRequest {
    /// Move the secrets behind `SecretString`; `None` if any field is missing or empty.
    #[must_use]
    pub fn into_credentials(self) -> Option<Credentials> {
        let username = self.username.filter(|value| !value.is_empty())?;
        let password = self.password.filter(|value| !value.is_empty())?;
        let access_token = self.access_token.filter(|value| !value.is_empty())?;
        Some(Credentials {
            username,
            password: SecretString::from(password),
            access_token: SecretString::from(access_token),
        })
    }
}

/// A complete username/password/access-token triple.
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    pub access_token: SecretString,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SetupStatusResponse {
    pub is_setup: bool,
}

/// Public administrator fields; never includes the hash or the access token.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SetupResponse {
    pub success: bool,
    pub message: String,
    pub admin: AdminProfile,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AuthCheckResponse {
    pub authenticated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn credentials_request_reads_camel_case() -> anyhow::Result<()> {
        let request: CredentialsRequest = serde_json::from_value(serde_json::json!({
            "username": "root",
            "password": "secret1",
            "accessToken": "tok12345"
        }))?;
        let credentials = request.into_credentials();
        assert!(credentials.is_some());
        if let Some(credentials) = credentials {
            assert_eq!(credentials.username, "root");
            assert_eq!(credentials.password.expose_secret(), "secret1");
            assert_eq!(credentials.access_token.expose_secret(), "tok12345");
        }
        Ok(())
    }

    #[test]
    fn missing_or_empty_fields_are_incomplete() -> anyhow::Result<()> {
        let request: CredentialsRequest = serde_json::from_value(serde_json::json!({}))?;
        assert!(request.into_credentials().is_none());

        let request: CredentialsRequest = serde_json::from_value(serde_json::json!({
            "username": "root",
            "password": "",
            "accessToken": "tok12345"
        }))?;
        assert!(request.into_credentials().is_none());
        Ok(())
    }

    #[test]
    fn credentials_debug_redacts_secrets() {
        let credentials = Credentials {
            username: "root".to_string(),
            password: SecretString::from("secret1".to_string()),
            access_token: SecretString::from("tok12345".to_string()),
        };
        let debug = format!("{credentials:?}");
        assert!(!debug.contains("secret1"));
        assert!(!debug.contains("tok12345"));
    }

    #[test]
    fn setup_status_uses_camel_case() -> anyhow::Result<()> {
        let value = serde_json::to_value(SetupStatusResponse { is_setup: true })?;
        assert_eq!(value, serde_json::json!({ "isSetup": true }));
        Ok(())
    }
}
