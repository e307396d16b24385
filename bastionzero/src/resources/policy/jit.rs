//! Just-in-time (JIT) policy

use serde::{Deserialize, Serialize};
use tfplug::defaults::StaticDefault;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::validator::{ElementsValidator, NumberRangeValidator, SizeValidator, UuidValidator};

use super::common::PolicyCommonModel;
use super::PolicyKind;
use crate::api::policies::{ChildPolicy, JitPolicy, Policy};

pub const DEFAULT_DURATION_MINUTES: u32 = 60;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JitPolicyModel {
    #[serde(flatten)]
    pub common: PolicyCommonModel,
    pub child_policies: Option<Vec<String>>,
    pub auto_approved: Option<bool>,
    pub duration: Option<u32>,
}

pub fn flatten_child_policies(policies: &[ChildPolicy]) -> Vec<String> {
    policies.iter().map(|p| p.id.clone()).collect()
}

pub fn expand_child_policies(ids: &[String]) -> Vec<ChildPolicy> {
    ids.iter()
        .map(|id| ChildPolicy {
            id: id.clone(),
            policy_type: String::new(),
            name: String::new(),
        })
        .collect()
}

#[derive(Default)]
pub struct JitPolicyKind;

impl PolicyKind for JitPolicyKind {
    type Api = JitPolicy;
    type Model = JitPolicyModel;

    const TYPE_NAME: &'static str = "bastionzero_jit_policy";
    const PLURAL_TYPE_NAME: &'static str = "bastionzero_jit_policies";
    const NOUN: &'static str = "JIT policy";
    const PLURAL_NOUN: &'static str = "JIT policies";

    fn attributes() -> Vec<Attribute> {
        vec![
            AttributeBuilder::new("child_policies", AttributeType::set(AttributeType::String))
                .description(
                    "Set of policy IDs (target connect, Kubernetes or proxy) granted when access is approved",
                )
                .required()
                .validator(SizeValidator::at_least(1))
                .validator(ElementsValidator::new(Box::new(UuidValidator)))
                .build(),
            AttributeBuilder::new("auto_approved", AttributeType::Bool)
                .description("If true, requests are approved automatically (defaults to false)")
                .optional()
                .computed()
                .default(StaticDefault::bool(false))
                .build(),
            AttributeBuilder::new("duration", AttributeType::Number)
                .description("Minutes the granted access lasts (defaults to 60)")
                .optional()
                .computed()
                .default(StaticDefault::number(DEFAULT_DURATION_MINUTES as f64))
                .validator(NumberRangeValidator::at_least(1.0))
                .build(),
        ]
    }

    fn flatten(policy: &JitPolicy) -> JitPolicyModel {
        JitPolicyModel {
            common: PolicyCommonModel::flatten(&policy.common),
            child_policies: Some(flatten_child_policies(&policy.child_policies)),
            auto_approved: Some(policy.automatically_approved),
            duration: Some(policy.duration),
        }
    }

    fn expand(model: &JitPolicyModel) -> JitPolicy {
        JitPolicy {
            common: model.common.expand(JitPolicy::POLICY_TYPE),
            child_policies: expand_child_policies(
                model.child_policies.as_deref().unwrap_or_default(),
            ),
            automatically_approved: model.auto_approved.unwrap_or_default(),
            duration: model.duration.unwrap_or(DEFAULT_DURATION_MINUTES),
        }
    }

    fn normalize(model: &mut JitPolicyModel, prior: &JitPolicyModel) {
        model.common.normalize(&prior.common);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::policies::PolicyCommon;

    #[test]
    fn jit_policy_exposes_child_policy_ids_only() {
        let policy = JitPolicy {
            common: PolicyCommon {
                id: "j-1".to_string(),
                name: "jit".to_string(),
                policy_type: "JustInTime".to_string(),
                ..Default::default()
            },
            child_policies: vec![ChildPolicy {
                id: "p-1".to_string(),
                policy_type: "TargetConnect".to_string(),
                name: "shell".to_string(),
            }],
            automatically_approved: true,
            duration: 15,
        };

        let model = JitPolicyKind::flatten(&policy);
        assert_eq!(model.child_policies, Some(vec!["p-1".to_string()]));
        assert_eq!(model.auto_approved, Some(true));
        assert_eq!(model.duration, Some(15));

        let expanded = JitPolicyKind::expand(&model);
        assert_eq!(expanded.child_policies[0].id, "p-1");
        assert!(expanded.child_policies[0].name.is_empty());
    }

    #[test]
    fn jit_policy_duration_falls_back_to_default() {
        let model = JitPolicyModel {
            child_policies: Some(vec!["p-1".to_string()]),
            ..Default::default()
        };
        assert_eq!(JitPolicyKind::expand(&model).duration, DEFAULT_DURATION_MINUTES);
    }

    #[test]
    fn jit_policy_requires_a_child_policy() {
        let attributes = JitPolicyKind::attributes();
        let child_policies = attributes
            .iter()
            .find(|a| a.name == "child_policies")
            .unwrap();
        assert!(child_policies.required);
        assert_eq!(child_policies.validators.len(), 2);
    }
}
