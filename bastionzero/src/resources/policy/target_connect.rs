//! Target connect policy

use serde::{Deserialize, Serialize};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::validator::{ElementsValidator, OneOfValidator};

use super::common::{
    environments_attribute, expand_environments, expand_target_users, expand_targets,
    flatten_environments, flatten_target_users, flatten_targets, string_set_attribute,
    targets_attribute, PolicyCommonModel, PolicyTargetModel,
};
use super::PolicyKind;
use crate::api::policies::target_connect::{TARGET_TYPES, VERB_TYPES};
use crate::api::policies::{Policy, TargetConnectPolicy, Verb};
use crate::resources::normalize_empty;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TargetConnectPolicyModel {
    #[serde(flatten)]
    pub common: PolicyCommonModel,
    pub environments: Option<Vec<String>>,
    pub targets: Option<Vec<PolicyTargetModel>>,
    pub target_users: Option<Vec<String>>,
    pub verbs: Option<Vec<String>>,
}

pub fn flatten_verbs(verbs: &[Verb]) -> Vec<String> {
    verbs.iter().map(|v| v.verb_type.clone()).collect()
}

pub fn expand_verbs(verbs: &[String]) -> Vec<Verb> {
    verbs
        .iter()
        .map(|v| Verb {
            verb_type: v.clone(),
        })
        .collect()
}

#[derive(Default)]
pub struct TargetConnectPolicyKind;

impl PolicyKind for TargetConnectPolicyKind {
    type Api = TargetConnectPolicy;
    type Model = TargetConnectPolicyModel;

    const TYPE_NAME: &'static str = "bastionzero_target_connect_policy";
    const PLURAL_TYPE_NAME: &'static str = "bastionzero_target_connect_policies";
    const NOUN: &'static str = "target connect policy";
    const PLURAL_NOUN: &'static str = "target connect policies";

    fn attributes() -> Vec<Attribute> {
        vec![
            environments_attribute("targets"),
            targets_attribute(TARGET_TYPES),
            string_set_attribute(
                "target_users",
                "Set of Unix usernames the subjects may connect as",
            ),
            AttributeBuilder::new("verbs", AttributeType::set(AttributeType::String))
                .description(&format!(
                    "Set of actions allowed by this policy, each one of {}",
                    VERB_TYPES.join(", ")
                ))
                .optional()
                .validator(ElementsValidator::new(OneOfValidator::new(VERB_TYPES)))
                .build(),
        ]
    }

    fn flatten(policy: &TargetConnectPolicy) -> TargetConnectPolicyModel {
        TargetConnectPolicyModel {
            common: PolicyCommonModel::flatten(&policy.common),
            environments: Some(flatten_environments(&policy.environments)),
            targets: Some(flatten_targets(&policy.targets)),
            target_users: Some(flatten_target_users(&policy.target_users)),
            verbs: Some(flatten_verbs(&policy.verbs)),
        }
    }

    fn expand(model: &TargetConnectPolicyModel) -> TargetConnectPolicy {
        TargetConnectPolicy {
            common: model.common.expand(TargetConnectPolicy::POLICY_TYPE),
            environments: expand_environments(model.environments.as_deref().unwrap_or_default()),
            targets: expand_targets(model.targets.as_deref().unwrap_or_default()),
            target_users: expand_target_users(model.target_users.as_deref().unwrap_or_default()),
            verbs: expand_verbs(model.verbs.as_deref().unwrap_or_default()),
        }
    }

    fn normalize(model: &mut TargetConnectPolicyModel, prior: &TargetConnectPolicyModel) {
        model.common.normalize(&prior.common);
        model.environments = normalize_empty(model.environments.take(), &prior.environments);
        model.targets = normalize_empty(model.targets.take(), &prior.targets);
        model.target_users = normalize_empty(model.target_users.take(), &prior.target_users);
        model.verbs = normalize_empty(model.verbs.take(), &prior.verbs);
    }
}

#[cfg(test)]
#[path = "./target_connect_test.rs"]
mod target_connect_test;
