use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::{Port, VirtualTarget, VirtualTargetCommon};
use crate::api::common::{ApiResource, CreateTargetResponse, MutableResource};

/// A web application reached through a proxy agent
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WebTarget {
    #[serde(flatten)]
    pub common: VirtualTargetCommon,
}

/// Request body for POST /targets/web
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWebTargetRequest {
    pub target_name: String,
    pub proxy_target_id: String,
    pub remote_host: String,
    pub remote_port: Port,
    pub local_port: Port,
    pub environment_id: String,
}

/// Request body for PATCH /targets/web/{id}
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyWebTargetRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_target_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_port: Option<Port>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_port: Option<Port>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<String>,
}

impl ApiResource for WebTarget {
    fn api_path() -> &'static str {
        "/targets/web"
    }
}

impl MutableResource for WebTarget {
    type CreateRequest = CreateWebTargetRequest;
    type CreateResponse = CreateTargetResponse;
    type ModifyRequest = ModifyWebTargetRequest;
    type ModifyResponse = IgnoredAny;
}

impl VirtualTarget for WebTarget {
    fn common(&self) -> &VirtualTargetCommon {
        &self.common
    }
}
