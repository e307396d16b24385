//! Session recording policy

use serde::{Deserialize, Serialize};
use tfplug::defaults::StaticDefault;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};

use super::common::PolicyCommonModel;
use super::PolicyKind;
use crate::api::policies::{Policy, SessionRecordingPolicy};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionRecordingPolicyModel {
    #[serde(flatten)]
    pub common: PolicyCommonModel,
    pub record_input: Option<bool>,
}

#[derive(Default)]
pub struct SessionRecordingPolicyKind;

impl PolicyKind for SessionRecordingPolicyKind {
    type Api = SessionRecordingPolicy;
    type Model = SessionRecordingPolicyModel;

    const TYPE_NAME: &'static str = "bastionzero_session_recording_policy";
    const PLURAL_TYPE_NAME: &'static str = "bastionzero_session_recording_policies";
    const NOUN: &'static str = "session recording policy";
    const PLURAL_NOUN: &'static str = "session recording policies";

    fn attributes() -> Vec<Attribute> {
        vec![AttributeBuilder::new("record_input", AttributeType::Bool)
            .description("If true, also record the keyboard input of recorded sessions (defaults to false)")
            .optional()
            .computed()
            .default(StaticDefault::bool(false))
            .build()]
    }

    fn flatten(policy: &SessionRecordingPolicy) -> SessionRecordingPolicyModel {
        SessionRecordingPolicyModel {
            common: PolicyCommonModel::flatten(&policy.common),
            record_input: Some(policy.record_input),
        }
    }

    fn expand(model: &SessionRecordingPolicyModel) -> SessionRecordingPolicy {
        SessionRecordingPolicy {
            common: model.common.expand(SessionRecordingPolicy::POLICY_TYPE),
            record_input: model.record_input.unwrap_or_default(),
        }
    }

    fn normalize(model: &mut SessionRecordingPolicyModel, prior: &SessionRecordingPolicyModel) {
        model.common.normalize(&prior.common);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_input_defaults_to_false_when_unset() {
        let model = SessionRecordingPolicyModel {
            common: PolicyCommonModel {
                name: "record".to_string(),
                ..Default::default()
            },
            record_input: None,
        };
        let policy = SessionRecordingPolicyKind::expand(&model);
        assert!(!policy.record_input);
        assert_eq!(policy.common.policy_type, "SessionRecording");
    }
}
