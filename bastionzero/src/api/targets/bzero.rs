use serde::Deserialize;

use super::TargetCommon;
use crate::api::common::{nullable_string, ApiResource};

/// A host running the Bzero agent
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BzeroTarget {
    #[serde(flatten)]
    pub common: TargetCommon,
    #[serde(default, deserialize_with = "nullable_string")]
    pub control_channel_id: String,
}

impl ApiResource for BzeroTarget {
    fn api_path() -> &'static str {
        "/targets/bzero"
    }
}
