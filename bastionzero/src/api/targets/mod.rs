//! Target API types

pub mod bzero;
pub mod cluster;
pub mod db;
pub mod dynamic_access_config;
pub mod web;

pub use bzero::BzeroTarget;
pub use cluster::ClusterTarget;
pub use db::{CreateDbTargetRequest, DbTarget, ModifyDbTargetRequest};
pub use dynamic_access_config::DynamicAccessConfig;
pub use web::{CreateWebTargetRequest, ModifyWebTargetRequest, WebTarget};

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::common::{nullable_string, CreateTargetResponse, MutableResource, Service};
use super::Client;

/// Fields shared by every target kind
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TargetCommon {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub target_type: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub status: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub environment_id: String,
    #[serde(default)]
    pub last_agent_update: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub agent_version: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub region: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub agent_public_key: String,
}

/// Fields shared by targets reached through a proxy agent
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VirtualTargetCommon {
    #[serde(flatten)]
    pub target: TargetCommon,
    #[serde(default, deserialize_with = "nullable_string")]
    pub proxy_target_id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub remote_host: String,
    #[serde(default)]
    pub remote_port: Port,
    #[serde(default)]
    pub local_port: Port,
}

/// Port wrapper used by the API, null when unset
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Port {
    pub value: Option<u16>,
}

impl Port {
    pub fn new(value: Option<u16>) -> Self {
        Self { value }
    }
}

/// Database and web targets
pub trait VirtualTarget:
    MutableResource<CreateResponse = CreateTargetResponse, ModifyResponse = IgnoredAny> + Sync
{
    fn common(&self) -> &VirtualTargetCommon;
}

/// Targets API grouping the per-kind services
pub struct TargetsApi<'a> {
    client: &'a Client,
}

impl<'a> TargetsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// /targets/bzero
    pub fn bzero(&self) -> Service<'a, BzeroTarget> {
        Service::new(self.client)
    }

    /// /targets/cluster
    pub fn cluster(&self) -> Service<'a, ClusterTarget> {
        Service::new(self.client)
    }

    /// /targets/database
    pub fn db(&self) -> Service<'a, DbTarget> {
        Service::new(self.client)
    }

    /// /targets/web
    pub fn web(&self) -> Service<'a, WebTarget> {
        Service::new(self.client)
    }

    /// /targets/dynamic-access-configs
    pub fn dynamic_access_configs(&self) -> Service<'a, DynamicAccessConfig> {
        Service::new(self.client)
    }
}
