use serde::{Deserialize, Serialize};

use super::{Policy, PolicyCommon, PolicyEnvironment, PolicyTarget, PolicyType, TargetUser};
use crate::api::common::{nullable_vec, ApiResource, MutableResource};

/// Target types a target connect policy may name
pub const TARGET_TYPES: &[&str] = &["Bzero", "DynamicAccessConfig"];

/// Actions a target connect policy may allow
pub const VERB_TYPES: &[&str] = &["Shell", "FileTransfer", "Tunnel", "RDP", "SQLServer"];

/// Grants shell, file transfer and tunnel access to Bzero targets
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TargetConnectPolicy {
    #[serde(flatten)]
    pub common: PolicyCommon,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub environments: Vec<PolicyEnvironment>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub targets: Vec<PolicyTarget>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub target_users: Vec<TargetUser>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub verbs: Vec<Verb>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Verb {
    #[serde(rename = "type")]
    pub verb_type: String,
}

impl ApiResource for TargetConnectPolicy {
    fn api_path() -> &'static str {
        "/policies/target-connect"
    }
}

impl MutableResource for TargetConnectPolicy {
    type CreateRequest = Self;
    type CreateResponse = Self;
    type ModifyRequest = Self;
    type ModifyResponse = Self;
}

impl Policy for TargetConnectPolicy {
    const POLICY_TYPE: PolicyType = PolicyType::TargetConnect;

    fn common(&self) -> &PolicyCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut PolicyCommon {
        &mut self.common
    }
}
