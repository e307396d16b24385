//! Proxy policy

use serde::{Deserialize, Serialize};
use tfplug::schema::Attribute;

use super::common::{
    environments_attribute, expand_environments, expand_target_users, expand_targets,
    flatten_environments, flatten_target_users, flatten_targets, string_set_attribute,
    targets_attribute, PolicyCommonModel, PolicyTargetModel,
};
use super::PolicyKind;
use crate::api::policies::proxy::TARGET_TYPES;
use crate::api::policies::{Policy, ProxyPolicy};
use crate::resources::normalize_empty;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProxyPolicyModel {
    #[serde(flatten)]
    pub common: PolicyCommonModel,
    pub environments: Option<Vec<String>>,
    pub targets: Option<Vec<PolicyTargetModel>>,
    pub target_users: Option<Vec<String>>,
}

#[derive(Default)]
pub struct ProxyPolicyKind;

impl PolicyKind for ProxyPolicyKind {
    type Api = ProxyPolicy;
    type Model = ProxyPolicyModel;

    const TYPE_NAME: &'static str = "bastionzero_proxy_policy";
    const PLURAL_TYPE_NAME: &'static str = "bastionzero_proxy_policies";
    const NOUN: &'static str = "proxy policy";
    const PLURAL_NOUN: &'static str = "proxy policies";

    fn attributes() -> Vec<Attribute> {
        vec![
            environments_attribute("targets"),
            targets_attribute(TARGET_TYPES),
            string_set_attribute(
                "target_users",
                "Set of database usernames the subjects may connect as (split-cert databases only)",
            ),
        ]
    }

    fn flatten(policy: &ProxyPolicy) -> ProxyPolicyModel {
        ProxyPolicyModel {
            common: PolicyCommonModel::flatten(&policy.common),
            environments: Some(flatten_environments(&policy.environments)),
            targets: Some(flatten_targets(&policy.targets)),
            target_users: Some(flatten_target_users(&policy.target_users)),
        }
    }

    fn expand(model: &ProxyPolicyModel) -> ProxyPolicy {
        ProxyPolicy {
            common: model.common.expand(ProxyPolicy::POLICY_TYPE),
            environments: expand_environments(model.environments.as_deref().unwrap_or_default()),
            targets: expand_targets(model.targets.as_deref().unwrap_or_default()),
            target_users: expand_target_users(model.target_users.as_deref().unwrap_or_default()),
        }
    }

    fn normalize(model: &mut ProxyPolicyModel, prior: &ProxyPolicyModel) {
        model.common.normalize(&prior.common);
        model.environments = normalize_empty(model.environments.take(), &prior.environments);
        model.targets = normalize_empty(model.targets.take(), &prior.targets);
        model.target_users = normalize_empty(model.target_users.take(), &prior.target_users);
    }
}
