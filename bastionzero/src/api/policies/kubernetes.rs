use serde::{Deserialize, Serialize};

use super::{Policy, PolicyCommon, PolicyEnvironment, PolicyType};
use crate::api::common::{nullable_vec, ApiResource, MutableResource};

/// Grants access to cluster targets as the listed users and groups
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesPolicy {
    #[serde(flatten)]
    pub common: PolicyCommon,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub environments: Vec<PolicyEnvironment>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub clusters: Vec<Cluster>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub cluster_users: Vec<ClusterUser>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub cluster_groups: Vec<ClusterGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Cluster {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ClusterUser {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ClusterGroup {
    pub name: String,
}

impl ApiResource for KubernetesPolicy {
    fn api_path() -> &'static str {
        "/policies/kubernetes"
    }
}

impl MutableResource for KubernetesPolicy {
    type CreateRequest = Self;
    type CreateResponse = Self;
    type ModifyRequest = Self;
    type ModifyResponse = Self;
}

impl Policy for KubernetesPolicy {
    const POLICY_TYPE: PolicyType = PolicyType::Kubernetes;

    fn common(&self) -> &PolicyCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut PolicyCommon {
        &mut self.common
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kubernetes_policy_reads_api_shape() {
        let policy: KubernetesPolicy = serde_json::from_str(
            r#"{
                "id": "p-2",
                "name": "k8s",
                "type": "Kubernetes",
                "clusters": [{"id": "c-1"}],
                "clusterUsers": [{"name": "admin"}],
                "clusterGroups": [{"name": "system:masters"}]
            }"#,
        )
        .unwrap();

        assert!(policy.environments.is_empty());
        assert_eq!(policy.clusters[0].id, "c-1");
        assert_eq!(policy.cluster_users[0].name, "admin");
        assert_eq!(policy.cluster_groups[0].name, "system:masters");
    }
}
