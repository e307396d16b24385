//! Service account API types

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::common::{nullable_string, ApiResource};

/// A service account authenticating with its own JWKS
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccount {
    pub id: String,
    pub organization_id: String,
    pub email: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub external_id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub jwks_url: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub jwks_url_pattern: String,
    #[serde(default)]
    pub is_admin: bool,
    pub time_created: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub created_by: String,
    #[serde(default)]
    pub enabled: bool,
}

impl ApiResource for ServiceAccount {
    fn api_path() -> &'static str {
        "/service-accounts"
    }
}
