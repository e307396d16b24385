//! Virtual target resources
//!
//! Database and web targets are registered against a proxy agent (a Bzero
//! target) and share one lifecycle. Create POSTs the kind's request and the
//! API answers with only `{targetId}`, so create and update both re-read the
//! target afterwards.

pub mod db;
pub mod web;

pub use db::DbTargetKind;
pub use web::WebTargetKind;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use tfplug::context::Context;
use tfplug::import::import_state_passthrough_id;
use tfplug::plan_modifier::{RequiresReplace, UseStateForUnknown};
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, ResourceWithImportState, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::{NumberRangeValidator, StringLengthValidator, UuidValidator};

use super::{api_error, configure_provider_data, format_timestamp, model_error, not_configured};
use crate::api::targets::{VirtualTarget, VirtualTargetCommon};
use crate::api::MutableResource;
use crate::BastionZeroProviderData;

/// Attributes every virtual target model carries
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VirtualTargetModel {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub environment_id: String,
    #[serde(default)]
    pub proxy_target_id: String,
    #[serde(default)]
    pub remote_host: String,
    pub remote_port: Option<u16>,
    pub local_port: Option<u16>,
    pub status: Option<String>,
    pub last_agent_update: Option<String>,
    pub agent_version: Option<String>,
    pub region: Option<String>,
    pub agent_public_key: Option<String>,
    #[serde(rename = "type")]
    pub target_type: Option<String>,
}

impl VirtualTargetModel {
    pub fn flatten(target: &VirtualTargetCommon) -> Self {
        let common = &target.target;
        Self {
            id: Some(common.id.clone()),
            name: common.name.clone(),
            environment_id: common.environment_id.clone(),
            proxy_target_id: target.proxy_target_id.clone(),
            remote_host: target.remote_host.clone(),
            remote_port: target.remote_port.value,
            local_port: target.local_port.value,
            status: Some(common.status.clone()),
            last_agent_update: common.last_agent_update.as_ref().map(format_timestamp),
            agent_version: Some(common.agent_version.clone()),
            region: Some(common.region.clone()),
            agent_public_key: Some(common.agent_public_key.clone()),
            target_type: Some(common.target_type.clone()),
        }
    }
}

/// `Some(new)` when the planned value differs from state
pub(crate) fn changed<T: PartialEq + Clone>(planned: &T, prior: &T) -> Option<T> {
    (planned != prior).then(|| planned.clone())
}

/// Attributes shared by every virtual target
pub fn virtual_target_attributes(target_type: &str) -> Vec<Attribute> {
    vec![
        AttributeBuilder::new("id", AttributeType::String)
            .description("The target's unique ID")
            .computed()
            .plan_modifier(Box::new(UseStateForUnknown))
            .build(),
        AttributeBuilder::new("name", AttributeType::String)
            .description("The target's name")
            .required()
            .validator(StringLengthValidator::at_least(1))
            .build(),
        AttributeBuilder::new("environment_id", AttributeType::String)
            .description("ID of the environment this target belongs to")
            .required()
            .validator(Box::new(UuidValidator))
            .build(),
        AttributeBuilder::new("proxy_target_id", AttributeType::String)
            .description("ID of the Bzero target that proxies connections to this target")
            .required()
            .validator(Box::new(UuidValidator))
            .plan_modifier(Box::new(RequiresReplace))
            .build(),
        AttributeBuilder::new("remote_host", AttributeType::String)
            .description("Hostname or IP address the proxy connects to")
            .required()
            .validator(StringLengthValidator::at_least(1))
            .build(),
        AttributeBuilder::new("remote_port", AttributeType::Number)
            .description("Port the proxy connects to")
            .required()
            .validator(NumberRangeValidator::between(1.0, 65535.0))
            .build(),
        AttributeBuilder::new("local_port", AttributeType::Number)
            .description("Port the daemon listens on locally when connecting")
            .optional()
            .validator(NumberRangeValidator::between(1.0, 65535.0))
            .build(),
        AttributeBuilder::new("status", AttributeType::String)
            .description("The target's status, as reported by its proxy agent")
            .computed()
            .build(),
        AttributeBuilder::new("last_agent_update", AttributeType::String)
            .description("Time the proxy agent last reported (RFC 3339)")
            .computed()
            .build(),
        AttributeBuilder::new("agent_version", AttributeType::String)
            .description("Version of the proxy agent")
            .computed()
            .build(),
        AttributeBuilder::new("region", AttributeType::String)
            .description("BastionZero region the proxy agent is connected to")
            .computed()
            .build(),
        AttributeBuilder::new("agent_public_key", AttributeType::String)
            .description("Public key of the proxy agent")
            .computed()
            .build(),
        AttributeBuilder::new("type", AttributeType::String)
            .description(&format!("The target's type (constant value \"{}\")", target_type))
            .computed()
            .plan_modifier(Box::new(UseStateForUnknown))
            .build(),
    ]
}

/// One virtual target kind: its API type, Terraform model and schema
pub trait VirtualTargetKind: Send + Sync + 'static {
    type Api: VirtualTarget;
    type Model: Serialize + DeserializeOwned + Default + Clone + Send + Sync;

    const TYPE_NAME: &'static str;
    const PLURAL_TYPE_NAME: &'static str;
    const NOUN: &'static str;
    const PLURAL_NOUN: &'static str;
    /// Value of the computed `type` attribute
    const TARGET_TYPE: &'static str;

    /// Attributes beyond the shared virtual target attributes
    fn attributes() -> Vec<Attribute>;

    fn flatten(target: &Self::Api) -> Self::Model;

    fn create_request(plan: &Self::Model) -> <Self::Api as MutableResource>::CreateRequest;

    /// PATCH body carrying only what changed between state and plan
    fn modify_request(
        plan: &Self::Model,
        prior: &Self::Model,
    ) -> <Self::Api as MutableResource>::ModifyRequest;
}

pub fn target_attributes<K: VirtualTargetKind>() -> Vec<Attribute> {
    let mut attributes = virtual_target_attributes(K::TARGET_TYPE);
    attributes.extend(K::attributes());
    attributes
}

pub struct VirtualTargetResource<K: VirtualTargetKind> {
    provider_data: Option<BastionZeroProviderData>,
    _kind: PhantomData<K>,
}

impl<K: VirtualTargetKind> Default for VirtualTargetResource<K> {
    fn default() -> Self {
        Self {
            provider_data: None,
            _kind: PhantomData,
        }
    }
}

impl<K: VirtualTargetKind> VirtualTargetResource<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description(&format!("Provides a BastionZero {}.", K::NOUN))
            .attributes(target_attributes::<K>())
            .build()
    }

    async fn read_state(
        provider_data: &BastionZeroProviderData,
        id: &str,
    ) -> Result<DynamicValue, Diagnostic> {
        let target = provider_data
            .client
            .service::<K::Api>()
            .get(id)
            .await
            .map_err(|e| api_error(format!("Failed to read {}", K::NOUN), &e))?;
        DynamicValue::from_model(&K::flatten(&target))
            .map_err(|e| model_error(format!("Failed to build {} state", K::NOUN), &e))
    }

    fn read_model(value: &DynamicValue) -> Result<K::Model, Diagnostic> {
        value
            .to_model()
            .map_err(|e| model_error(format!("Failed to read {} plan", K::NOUN), &e))
    }
}

#[async_trait]
impl<K: VirtualTargetKind> Resource for VirtualTargetResource<K> {
    fn type_name(&self) -> &str {
        K::TYPE_NAME
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn create(
        &self,
        _ctx: Context,
        request: CreateResourceRequest,
    ) -> CreateResourceResponse {
        let mut diagnostics = vec![];

        let Some(provider_data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return CreateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics,
            };
        };

        let plan = match Self::read_model(&request.planned_state) {
            Ok(plan) => plan,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                };
            }
        };

        let created = match provider_data
            .client
            .service::<K::Api>()
            .create(&K::create_request(&plan))
            .await
        {
            Ok(created) => created,
            Err(e) => {
                diagnostics.push(api_error(format!("Failed to create {}", K::NOUN), &e));
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                };
            }
        };

        tracing::info!(id = %created.target_id, "created {}", K::NOUN);

        let new_state = match Self::read_state(provider_data, &created.target_id).await {
            Ok(state) => state,
            Err(diag) => {
                // Keep the id so the target stays tracked
                diagnostics.push(diag);
                let mut partial = request.planned_state;
                match partial.set_string(&AttributePath::new("id"), created.target_id) {
                    Ok(()) => partial,
                    Err(_) => DynamicValue::null(),
                }
            }
        };

        CreateResourceResponse {
            new_state,
            private: vec![],
            diagnostics,
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];

        let Some(provider_data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics,
                private: request.private,
                deferred: None,
            };
        };

        let Ok(id) = request.current_state.get_string(&AttributePath::new("id")) else {
            return ReadResourceResponse {
                new_state: None,
                diagnostics,
                private: request.private,
                deferred: None,
            };
        };

        match provider_data.client.service::<K::Api>().get(&id).await {
            Ok(target) => match DynamicValue::from_model(&K::flatten(&target)) {
                Ok(state) => ReadResourceResponse {
                    new_state: Some(state),
                    diagnostics,
                    private: request.private,
                    deferred: None,
                },
                Err(e) => {
                    diagnostics.push(model_error(format!("Failed to build {} state", K::NOUN), &e));
                    ReadResourceResponse {
                        new_state: Some(request.current_state),
                        diagnostics,
                        private: request.private,
                        deferred: None,
                    }
                }
            },
            Err(e) if e.is_not_found() => {
                tracing::warn!(%id, "{} not found, removing from state", K::NOUN);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                    private: request.private,
                    deferred: None,
                }
            }
            Err(e) => {
                diagnostics.push(api_error(format!("Failed to read {}", K::NOUN), &e));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                    private: request.private,
                    deferred: None,
                }
            }
        }
    }

    async fn update(
        &self,
        _ctx: Context,
        request: UpdateResourceRequest,
    ) -> UpdateResourceResponse {
        let mut diagnostics = vec![];

        let Some(provider_data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return UpdateResourceResponse {
                new_state: request.prior_state,
                private: vec![],
                diagnostics,
            };
        };

        let (plan, prior, id) = match (
            Self::read_model(&request.planned_state),
            Self::read_model(&request.prior_state),
            request.prior_state.get_string(&AttributePath::new("id")),
        ) {
            (Ok(plan), Ok(prior), Ok(id)) => (plan, prior, id),
            (Err(diag), _, _) | (_, Err(diag), _) => {
                diagnostics.push(diag);
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    private: vec![],
                    diagnostics,
                };
            }
            (_, _, Err(e)) => {
                diagnostics.push(model_error(format!("Failed to read {} id", K::NOUN), &e));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    private: vec![],
                    diagnostics,
                };
            }
        };

        if let Err(e) = provider_data
            .client
            .service::<K::Api>()
            .modify(&id, &K::modify_request(&plan, &prior))
            .await
        {
            diagnostics.push(api_error(format!("Failed to update {}", K::NOUN), &e));
            return UpdateResourceResponse {
                new_state: request.prior_state,
                private: vec![],
                diagnostics,
            };
        }

        let new_state = match Self::read_state(provider_data, &id).await {
            Ok(state) => state,
            Err(diag) => {
                diagnostics.push(diag);
                request.prior_state
            }
        };

        UpdateResourceResponse {
            new_state,
            private: vec![],
            diagnostics,
        }
    }

    async fn delete(
        &self,
        _ctx: Context,
        request: DeleteResourceRequest,
    ) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let Some(provider_data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return DeleteResourceResponse { diagnostics };
        };

        let Ok(id) = request.prior_state.get_string(&AttributePath::new("id")) else {
            return DeleteResourceResponse { diagnostics };
        };

        match provider_data.client.service::<K::Api>().delete(&id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!(%id, "{} already deleted", K::NOUN);
            }
            Err(e) => diagnostics.push(api_error(format!("Failed to delete {}", K::NOUN), &e)),
        }

        DeleteResourceResponse { diagnostics }
    }

    fn as_import_state(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }
}

#[async_trait]
impl<K: VirtualTargetKind> ResourceWithConfigure for VirtualTargetResource<K> {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let (provider_data, diagnostics) = configure_provider_data(request.provider_data);
        self.provider_data = provider_data;
        ConfigureResourceResponse { diagnostics }
    }
}

#[async_trait]
impl<K: VirtualTargetKind> ResourceWithImportState for VirtualTargetResource<K> {
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
            deferred: None,
        };
        import_state_passthrough_id(&ctx, AttributePath::new("id"), &request, &mut response);
        response
    }
}
