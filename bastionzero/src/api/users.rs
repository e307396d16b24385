//! Organization user API types

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::common::{nullable_string, ApiResource};

/// A user of the organization. `GET /users/{idOrEmail}` accepts either key.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub organization_id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    pub time_created: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl ApiResource for User {
    fn api_path() -> &'static str {
        "/users"
    }
}
