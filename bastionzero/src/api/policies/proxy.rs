use serde::{Deserialize, Serialize};

use super::{Policy, PolicyCommon, PolicyEnvironment, PolicyTarget, PolicyType, TargetUser};
use crate::api::common::{nullable_vec, ApiResource, MutableResource};

/// Target types a proxy policy may name
pub const TARGET_TYPES: &[&str] = &["Db", "Web"];

/// Grants access to database and web targets
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProxyPolicy {
    #[serde(flatten)]
    pub common: PolicyCommon,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub environments: Vec<PolicyEnvironment>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub targets: Vec<PolicyTarget>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub target_users: Vec<TargetUser>,
}

impl ApiResource for ProxyPolicy {
    fn api_path() -> &'static str {
        "/policies/proxy"
    }
}

impl MutableResource for ProxyPolicy {
    type CreateRequest = Self;
    type CreateResponse = Self;
    type ModifyRequest = Self;
    type ModifyResponse = Self;
}

impl Policy for ProxyPolicy {
    const POLICY_TYPE: PolicyType = PolicyType::Proxy;

    fn common(&self) -> &PolicyCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut PolicyCommon {
        &mut self.common
    }
}
