//! Identity provider group API types

use serde::Deserialize;

use super::common::ApiResource;

/// A group synced from the organization's identity provider
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Group {
    #[serde(rename = "idPGroupId")]
    pub id: String,
    pub name: String,
}

impl ApiResource for Group {
    fn api_path() -> &'static str {
        "/organization/groups"
    }
}
