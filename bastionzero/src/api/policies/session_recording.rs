use serde::{Deserialize, Serialize};

use super::{Policy, PolicyCommon, PolicyType};
use crate::api::common::{ApiResource, MutableResource};

/// Controls whether shell sessions of the subjects are recorded
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecordingPolicy {
    #[serde(flatten)]
    pub common: PolicyCommon,
    #[serde(default)]
    pub record_input: bool,
}

impl ApiResource for SessionRecordingPolicy {
    fn api_path() -> &'static str {
        "/policies/session-recording"
    }
}

impl MutableResource for SessionRecordingPolicy {
    type CreateRequest = Self;
    type CreateResponse = Self;
    type ModifyRequest = Self;
    type ModifyResponse = Self;
}

impl Policy for SessionRecordingPolicy {
    const POLICY_TYPE: PolicyType = PolicyType::SessionRecording;

    fn common(&self) -> &PolicyCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut PolicyCommon {
        &mut self.common
    }
}
