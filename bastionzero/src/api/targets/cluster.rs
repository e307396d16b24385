use serde::Deserialize;

use super::TargetCommon;
use crate::api::common::{nullable_vec, ApiResource};

/// A Kubernetes cluster running the Bzero agent
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterTarget {
    #[serde(flatten)]
    pub common: TargetCommon,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub valid_cluster_users: Vec<String>,
}

impl ApiResource for ClusterTarget {
    fn api_path() -> &'static str {
        "/targets/cluster"
    }
}
