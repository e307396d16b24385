//! Target data sources
//!
//! Bzero, cluster and dynamic access config targets are read-only here.
//! Database and web targets reuse their resource schemas.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::DynamicValue;

use crate::api::targets::{BzeroTarget, ClusterTarget, DynamicAccessConfig, TargetCommon};
use crate::api::{ApiError, ApiResource, Client};
use crate::datasource::{string_parameter, ListSource, SingleSource};
use crate::resources::format_timestamp;
use crate::resources::policy::common::flatten_target_users;
use crate::resources::target::{target_attributes, VirtualTargetKind};

/// Attributes every target reports
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TargetModel {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub target_type: String,
    pub status: String,
    pub environment_id: String,
    pub last_agent_update: Option<String>,
    pub agent_version: String,
    pub region: String,
    pub agent_public_key: String,
}

impl TargetModel {
    pub fn flatten(target: &TargetCommon) -> Self {
        Self {
            id: target.id.clone(),
            name: target.name.clone(),
            target_type: target.target_type.clone(),
            status: target.status.clone(),
            environment_id: target.environment_id.clone(),
            last_agent_update: target.last_agent_update.as_ref().map(format_timestamp),
            agent_version: target.agent_version.clone(),
            region: target.region.clone(),
            agent_public_key: target.agent_public_key.clone(),
        }
    }
}

fn computed_string(name: &str, description: &str) -> Attribute {
    AttributeBuilder::new(name, AttributeType::String)
        .description(description)
        .computed()
        .build()
}

fn target_common_attributes() -> Vec<Attribute> {
    vec![
        computed_string("id", "The target's unique ID"),
        computed_string("name", "The target's name"),
        computed_string("type", "The target's type"),
        computed_string("status", "The target's status"),
        computed_string("environment_id", "ID of the environment this target belongs to"),
        computed_string(
            "last_agent_update",
            "Time the target's agent last reported (RFC 3339)",
        ),
        computed_string("agent_version", "Version of the target's agent"),
        computed_string("region", "BastionZero region the agent is connected to"),
        computed_string("agent_public_key", "Public key of the target's agent"),
    ]
}

/// A target type that is only ever read
pub trait TargetView: ApiResource + Sync + 'static {
    type Model: Serialize + Send;

    const TYPE_NAME: &'static str;
    const PLURAL_TYPE_NAME: &'static str;
    const NOUN: &'static str;
    const PLURAL_NOUN: &'static str;

    /// Attributes beyond the common target attributes
    fn attributes() -> Vec<Attribute>;

    fn flatten(&self) -> Self::Model;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BzeroTargetModel {
    #[serde(flatten)]
    pub common: TargetModel,
    pub control_channel_id: String,
}

impl TargetView for BzeroTarget {
    type Model = BzeroTargetModel;

    const TYPE_NAME: &'static str = "bastionzero_bzero_target";
    const PLURAL_TYPE_NAME: &'static str = "bastionzero_bzero_targets";
    const NOUN: &'static str = "Bzero target";
    const PLURAL_NOUN: &'static str = "Bzero targets";

    fn attributes() -> Vec<Attribute> {
        vec![computed_string(
            "control_channel_id",
            "ID of the agent's control channel",
        )]
    }

    fn flatten(&self) -> BzeroTargetModel {
        BzeroTargetModel {
            common: TargetModel::flatten(&self.common),
            control_channel_id: self.control_channel_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClusterTargetModel {
    #[serde(flatten)]
    pub common: TargetModel,
    pub valid_cluster_users: Vec<String>,
}

impl TargetView for ClusterTarget {
    type Model = ClusterTargetModel;

    const TYPE_NAME: &'static str = "bastionzero_cluster_target";
    const PLURAL_TYPE_NAME: &'static str = "bastionzero_cluster_targets";
    const NOUN: &'static str = "cluster target";
    const PLURAL_NOUN: &'static str = "cluster targets";

    fn attributes() -> Vec<Attribute> {
        vec![
            AttributeBuilder::new("valid_cluster_users", AttributeType::set(AttributeType::String))
                .description("Kubernetes users the cluster's agent allows")
                .computed()
                .build(),
        ]
    }

    fn flatten(&self) -> ClusterTargetModel {
        ClusterTargetModel {
            common: TargetModel::flatten(&self.common),
            valid_cluster_users: self.valid_cluster_users.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DynamicAccessConfigModel {
    #[serde(flatten)]
    pub common: TargetModel,
    pub start_webhook: String,
    pub stop_webhook: String,
    pub health_webhook: String,
    pub allowed_target_users: Vec<String>,
}

impl TargetView for DynamicAccessConfig {
    type Model = DynamicAccessConfigModel;

    const TYPE_NAME: &'static str = "bastionzero_dynamic_access_config";
    const PLURAL_TYPE_NAME: &'static str = "bastionzero_dynamic_access_configs";
    const NOUN: &'static str = "dynamic access configuration";
    const PLURAL_NOUN: &'static str = "dynamic access configurations";

    fn attributes() -> Vec<Attribute> {
        vec![
            computed_string("start_webhook", "Webhook called to provision a target"),
            computed_string("stop_webhook", "Webhook called to tear a target down"),
            computed_string("health_webhook", "Webhook called to check the provisioner"),
            AttributeBuilder::new(
                "allowed_target_users",
                AttributeType::set(AttributeType::String),
            )
            .description("Unix usernames allowed on provisioned targets")
            .computed()
            .build(),
        ]
    }

    fn flatten(&self) -> DynamicAccessConfigModel {
        DynamicAccessConfigModel {
            common: TargetModel::flatten(&self.common),
            start_webhook: self.start_webhook.clone(),
            stop_webhook: self.stop_webhook.clone(),
            health_webhook: self.health_webhook.clone(),
            allowed_target_users: flatten_target_users(&self.allowed_target_users),
        }
    }
}

fn view_attributes<T: TargetView>() -> Vec<Attribute> {
    let mut attributes = target_common_attributes();
    attributes.extend(T::attributes());
    attributes
}

pub struct TargetSource<T: TargetView>(PhantomData<T>);

impl<T: TargetView> Default for TargetSource<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

#[async_trait]
impl<T: TargetView> SingleSource for TargetSource<T> {
    type Record = T::Model;

    const TYPE_NAME: &'static str = T::TYPE_NAME;
    const NOUN: &'static str = T::NOUN;

    fn attributes() -> Vec<Attribute> {
        view_attributes::<T>()
    }

    async fn fetch(&self, client: &Client, config: &DynamicValue) -> Result<T::Model, ApiError> {
        let target = client
            .service::<T>()
            .get(&string_parameter(config, "id"))
            .await?;
        Ok(target.flatten())
    }
}

pub struct TargetsSource<T: TargetView>(PhantomData<T>);

impl<T: TargetView> Default for TargetsSource<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

#[async_trait]
impl<T: TargetView> ListSource for TargetsSource<T> {
    type Record = T::Model;

    const TYPE_NAME: &'static str = T::PLURAL_TYPE_NAME;
    const ATTRIBUTE: &'static str = "targets";
    const NOUNS: &'static str = T::PLURAL_NOUN;

    fn attributes() -> Vec<Attribute> {
        view_attributes::<T>()
    }

    async fn list(&self, client: &Client) -> Result<Vec<T::Model>, ApiError> {
        let targets = client.service::<T>().list().await?;
        Ok(targets.iter().map(T::flatten).collect())
    }
}

pub struct VirtualTargetSource<K: VirtualTargetKind>(PhantomData<K>);

impl<K: VirtualTargetKind> Default for VirtualTargetSource<K> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

#[async_trait]
impl<K: VirtualTargetKind> SingleSource for VirtualTargetSource<K> {
    type Record = K::Model;

    const TYPE_NAME: &'static str = K::TYPE_NAME;
    const NOUN: &'static str = K::NOUN;

    fn attributes() -> Vec<Attribute> {
        target_attributes::<K>()
    }

    async fn fetch(&self, client: &Client, config: &DynamicValue) -> Result<K::Model, ApiError> {
        let target = client
            .service::<K::Api>()
            .get(&string_parameter(config, "id"))
            .await?;
        Ok(K::flatten(&target))
    }
}

pub struct VirtualTargetsSource<K: VirtualTargetKind>(PhantomData<K>);

impl<K: VirtualTargetKind> Default for VirtualTargetsSource<K> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

#[async_trait]
impl<K: VirtualTargetKind> ListSource for VirtualTargetsSource<K> {
    type Record = K::Model;

    const TYPE_NAME: &'static str = K::PLURAL_TYPE_NAME;
    const ATTRIBUTE: &'static str = "targets";
    const NOUNS: &'static str = K::PLURAL_NOUN;

    fn attributes() -> Vec<Attribute> {
        target_attributes::<K>()
    }

    async fn list(&self, client: &Client) -> Result<Vec<K::Model>, ApiError> {
        let targets = client.service::<K::Api>().list().await?;
        Ok(targets.iter().map(K::flatten).collect())
    }
}

#[cfg(test)]
#[path = "./targets_test.rs"]
mod targets_test;
