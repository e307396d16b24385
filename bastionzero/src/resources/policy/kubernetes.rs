//! Kubernetes policy

use serde::{Deserialize, Serialize};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::validator::{ConflictsWithValidator, ElementsValidator, UuidValidator};

use super::common::{
    environments_attribute, expand_environments, flatten_environments, string_set_attribute,
    PolicyCommonModel,
};
use super::PolicyKind;
use crate::api::policies::{Cluster, ClusterGroup, ClusterUser, KubernetesPolicy, Policy};
use crate::resources::normalize_empty;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KubernetesPolicyModel {
    #[serde(flatten)]
    pub common: PolicyCommonModel,
    pub environments: Option<Vec<String>>,
    pub clusters: Option<Vec<String>>,
    pub cluster_users: Option<Vec<String>>,
    pub cluster_groups: Option<Vec<String>>,
}

pub fn flatten_clusters(clusters: &[Cluster]) -> Vec<String> {
    clusters.iter().map(|c| c.id.clone()).collect()
}

pub fn expand_clusters(clusters: &[String]) -> Vec<Cluster> {
    clusters.iter().map(|id| Cluster { id: id.clone() }).collect()
}

pub fn flatten_cluster_users(users: &[ClusterUser]) -> Vec<String> {
    users.iter().map(|u| u.name.clone()).collect()
}

pub fn expand_cluster_users(users: &[String]) -> Vec<ClusterUser> {
    users
        .iter()
        .map(|name| ClusterUser { name: name.clone() })
        .collect()
}

pub fn flatten_cluster_groups(groups: &[ClusterGroup]) -> Vec<String> {
    groups.iter().map(|g| g.name.clone()).collect()
}

pub fn expand_cluster_groups(groups: &[String]) -> Vec<ClusterGroup> {
    groups
        .iter()
        .map(|name| ClusterGroup { name: name.clone() })
        .collect()
}

#[derive(Default)]
pub struct KubernetesPolicyKind;

impl PolicyKind for KubernetesPolicyKind {
    type Api = KubernetesPolicy;
    type Model = KubernetesPolicyModel;

    const TYPE_NAME: &'static str = "bastionzero_kubernetes_policy";
    const PLURAL_TYPE_NAME: &'static str = "bastionzero_kubernetes_policies";
    const NOUN: &'static str = "Kubernetes policy";
    const PLURAL_NOUN: &'static str = "Kubernetes policies";

    fn attributes() -> Vec<Attribute> {
        vec![
            environments_attribute("clusters"),
            AttributeBuilder::new("clusters", AttributeType::set(AttributeType::String))
                .description(
                    "Set of cluster target IDs that this policy applies to. Cannot be set together with environments",
                )
                .optional()
                .validator(ElementsValidator::new(Box::new(UuidValidator)))
                .validator(ConflictsWithValidator::new(&["environments"]))
                .build(),
            string_set_attribute(
                "cluster_users",
                "Set of Kubernetes users the subjects may impersonate",
            ),
            string_set_attribute(
                "cluster_groups",
                "Set of Kubernetes groups the subjects may impersonate",
            ),
        ]
    }

    fn flatten(policy: &KubernetesPolicy) -> KubernetesPolicyModel {
        KubernetesPolicyModel {
            common: PolicyCommonModel::flatten(&policy.common),
            environments: Some(flatten_environments(&policy.environments)),
            clusters: Some(flatten_clusters(&policy.clusters)),
            cluster_users: Some(flatten_cluster_users(&policy.cluster_users)),
            cluster_groups: Some(flatten_cluster_groups(&policy.cluster_groups)),
        }
    }

    fn expand(model: &KubernetesPolicyModel) -> KubernetesPolicy {
        KubernetesPolicy {
            common: model.common.expand(KubernetesPolicy::POLICY_TYPE),
            environments: expand_environments(model.environments.as_deref().unwrap_or_default()),
            clusters: expand_clusters(model.clusters.as_deref().unwrap_or_default()),
            cluster_users: expand_cluster_users(model.cluster_users.as_deref().unwrap_or_default()),
            cluster_groups: expand_cluster_groups(
                model.cluster_groups.as_deref().unwrap_or_default(),
            ),
        }
    }

    fn normalize(model: &mut KubernetesPolicyModel, prior: &KubernetesPolicyModel) {
        model.common.normalize(&prior.common);
        model.environments = normalize_empty(model.environments.take(), &prior.environments);
        model.clusters = normalize_empty(model.clusters.take(), &prior.clusters);
        model.cluster_users = normalize_empty(model.cluster_users.take(), &prior.cluster_users);
        model.cluster_groups = normalize_empty(model.cluster_groups.take(), &prior.cluster_groups);
    }
}
