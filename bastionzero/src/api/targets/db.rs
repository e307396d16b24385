use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::{Port, VirtualTarget, VirtualTargetCommon};
use crate::api::common::{nullable_string, ApiResource, CreateTargetResponse, MutableResource};

/// A database reached through a proxy agent
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DbTarget {
    #[serde(flatten)]
    pub common: VirtualTargetCommon,
    #[serde(default)]
    pub is_split_cert: bool,
    #[serde(default, deserialize_with = "nullable_string")]
    pub database_type: String,
}

/// Request body for POST /targets/database
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDbTargetRequest {
    pub target_name: String,
    pub proxy_target_id: String,
    pub remote_host: String,
    pub remote_port: Port,
    pub local_port: Port,
    pub environment_id: String,
    pub is_split_cert: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_type: Option<String>,
}

/// Request body for PATCH /targets/database/{id}
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyDbTargetRequest {
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_split_cert: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_type: Option<String>,
}

impl ApiResource for DbTarget {
    fn api_path() -> &'static str {
        "/targets/database"
    }
}

impl MutableResource for DbTarget {
    type CreateRequest = CreateDbTargetRequest;
    type CreateResponse = CreateTargetResponse;
    type ModifyRequest = ModifyDbTargetRequest;
    type ModifyResponse = IgnoredAny;
}

impl VirtualTarget for DbTarget {
    fn common(&self) -> &VirtualTargetCommon {
        &self.common
    }
}
