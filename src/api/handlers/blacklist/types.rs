use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::registry::{NewEntry, Verdict};
use crate::store::BlacklistEntry;

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct CheckQuery {
    /// Address to look up; case and surrounding whitespace are ignored.
    pub address: Option<String>,
    /// Network being consulted. Without it only global entries match.
    pub network: Option<String>,
}

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Exact network filter.
    pub network: Option<String>,
}

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct RemoveQuery {
    pub address: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub is_blacklisted: bool,
    pub reason: Option<String>,
    pub blacklisted_at: Option<DateTime<Utc>>,
}

impl From<Verdict> for CheckResponse {
    fn from(verdict: Verdict) -> Self {
        match verdict.entry {
            Some(entry) => Self {
                is_blacklisted: true,
                reason: entry.reason,
                blacklisted_at: Some(entry.blacklisted_at),
            },
            None => Self {
                is_blacklisted: false,
                reason: None,
                blacklisted_at: None,
            },
        }
    }
}

#[derive(ToSchema, Serialize, Debug)]
pub struct ListResponse {
    pub addresses: Vec<BlacklistEntry>,
}

#[derive(ToSchema, Deserialize, Debug, Default)]
pub struct AddRequest {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<AddRequest> for NewEntry {
    fn from(request: AddRequest) -> Self {
        Self {
            address: request.address.unwrap_or_default(),
            network: request.network,
            reason: request.reason,
            notes: request.notes,
        }
    }
}

#[derive(ToSchema, Serialize, Debug)]
pub struct AddResponse {
    pub message: String,
    pub address: BlacklistEntry,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RemoveResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_serializes_nulls() -> anyhow::Result<()> {
        let value = serde_json::to_value(CheckResponse::from(Verdict { entry: None }))?;
        assert_eq!(
            value,
            serde_json::json!({ "isBlacklisted": false, "reason": null, "blacklistedAt": null })
        );
        Ok(())
    }

    #[test]
    fn add_request_tolerates_missing_fields() -> anyhow::Result<()> {
        let request: AddRequest = serde_json::from_value(serde_json::json!({ "address": "0xAA" }))?;
        let entry = NewEntry::from(request);
        assert_eq!(entry.address, "0xAA");
        assert!(entry.network.is_none());
        Ok(())
    }
}
