use serde::Deserialize;

use super::TargetCommon;
use crate::api::common::{nullable_string, nullable_vec, ApiResource};
use crate::api::policies::TargetUser;

/// Webhook-driven configuration that provisions targets on demand
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DynamicAccessConfig {
    #[serde(flatten)]
    pub common: TargetCommon,
    #[serde(default, deserialize_with = "nullable_string")]
    pub start_webhook: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub stop_webhook: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub health_webhook: String,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub allowed_target_users: Vec<TargetUser>,
}

impl ApiResource for DynamicAccessConfig {
    fn api_path() -> &'static str {
        "/targets/dynamic-access-configs"
    }
}
