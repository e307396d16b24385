use serde::{Deserialize, Serialize};

use super::{Policy, PolicyCommon, PolicyType};
use crate::api::common::{nullable_vec, ApiResource, MutableResource};

/// Grants the child policies on demand for a limited duration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JitPolicy {
    #[serde(flatten)]
    pub common: PolicyCommon,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub child_policies: Vec<ChildPolicy>,
    #[serde(default)]
    pub automatically_approved: bool,
    /// Minutes the granted access lasts
    pub duration: u32,
}

/// Policy granted by a JIT policy. Only the id is sent on writes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ChildPolicy {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub policy_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl ApiResource for JitPolicy {
    fn api_path() -> &'static str {
        "/policies/just-in-time"
    }
}

impl MutableResource for JitPolicy {
    type CreateRequest = Self;
    type CreateResponse = Self;
    type ModifyRequest = Self;
    type ModifyResponse = Self;
}

impl Policy for JitPolicy {
    const POLICY_TYPE: PolicyType = PolicyType::JustInTime;

    fn common(&self) -> &PolicyCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut PolicyCommon {
        &mut self.common
    }
}
