//! Policy API types shared by every policy kind

pub mod jit;
pub mod kubernetes;
pub mod proxy;
pub mod session_recording;
pub mod target_connect;

pub use jit::{ChildPolicy, JitPolicy};
pub use kubernetes::{Cluster, ClusterGroup, ClusterUser, KubernetesPolicy};
pub use proxy::ProxyPolicy;
pub use session_recording::SessionRecordingPolicy;
pub use target_connect::{TargetConnectPolicy, Verb};

use serde::{Deserialize, Serialize};

use super::common::{nullable_string, nullable_vec, MutableResource, Service};
use super::Client;

/// Subject types a policy can grant access to
pub const SUBJECT_TYPES: &[&str] = &["User", "ApiKey", "ServiceAccount"];

/// Policy kinds, as reported in the `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyType {
    TargetConnect,
    Kubernetes,
    Proxy,
    SessionRecording,
    JustInTime,
}

impl PolicyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyType::TargetConnect => "TargetConnect",
            PolicyType::Kubernetes => "Kubernetes",
            PolicyType::Proxy => "Proxy",
            PolicyType::SessionRecording => "SessionRecording",
            PolicyType::JustInTime => "JustInTime",
        }
    }
}

impl std::fmt::Display for PolicyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields every policy carries
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyCommon {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub policy_type: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub subjects: Vec<PolicySubject>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub groups: Vec<PolicyGroup>,
}

/// A user, API key or service account the policy applies to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PolicySubject {
    pub id: String,
    #[serde(rename = "type")]
    pub subject_type: String,
}

/// An identity provider group the policy applies to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PolicyGroup {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PolicyEnvironment {
    pub id: String,
}

/// A specific target a policy applies to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PolicyTarget {
    pub id: String,
    #[serde(rename = "type")]
    pub target_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct TargetUser {
    pub user_name: String,
}

/// Any policy kind, viewed through its common fields. Policies are written
/// and echoed back in the same shape.
pub trait Policy:
    MutableResource<
        CreateRequest = Self,
        CreateResponse = Self,
        ModifyRequest = Self,
        ModifyResponse = Self,
    > + Serialize
    + Clone
    + Sync
{
    const POLICY_TYPE: PolicyType;

    fn common(&self) -> &PolicyCommon;
    fn common_mut(&mut self) -> &mut PolicyCommon;
}

/// Policies API grouping the per-kind services
pub struct PoliciesApi<'a> {
    client: &'a Client,
}

impl<'a> PoliciesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// /policies/target-connect
    pub fn target_connect(&self) -> Service<'a, TargetConnectPolicy> {
        Service::new(self.client)
    }

    /// /policies/kubernetes
    pub fn kubernetes(&self) -> Service<'a, KubernetesPolicy> {
        Service::new(self.client)
    }

    /// /policies/proxy
    pub fn proxy(&self) -> Service<'a, ProxyPolicy> {
        Service::new(self.client)
    }

    /// /policies/session-recording
    pub fn session_recording(&self) -> Service<'a, SessionRecordingPolicy> {
        Service::new(self.client)
    }

    /// /policies/just-in-time
    pub fn jit(&self) -> Service<'a, JitPolicy> {
        Service::new(self.client)
    }
}
