//! Policy resources
//!
//! Every policy kind shares one lifecycle: create POSTs the expanded model
//! and the API echoes the policy back, update PATCHes the full model, and
//! read/delete address the policy by id. `PolicyResource<K>` implements that
//! lifecycle once; each kind supplies its attributes and conversions through
//! [`PolicyKind`].

pub mod common;
pub mod jit;
pub mod kubernetes;
pub mod proxy;
pub mod session_recording;
pub mod target_connect;

pub use jit::JitPolicyKind;
pub use kubernetes::KubernetesPolicyKind;
pub use proxy::ProxyPolicyKind;
pub use session_recording::SessionRecordingPolicyKind;
pub use target_connect::TargetConnectPolicyKind;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use tfplug::context::Context;
use tfplug::import::import_state_passthrough_id;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, ResourceWithImportState, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::{Attribute, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

use super::{api_error, configure_provider_data, model_error, not_configured};
use crate::api::policies::Policy;
use crate::BastionZeroProviderData;

/// One policy kind: its API type, Terraform model and schema
pub trait PolicyKind: Send + Sync + 'static {
    type Api: Policy;
    type Model: Serialize + DeserializeOwned + Default + Clone + Send + Sync;

    /// Resource and single data source type name
    const TYPE_NAME: &'static str;
    /// List data source type name
    const PLURAL_TYPE_NAME: &'static str;
    /// Human-readable name used in descriptions and diagnostics
    const NOUN: &'static str;
    const PLURAL_NOUN: &'static str;

    /// Attributes beyond the common policy attributes
    fn attributes() -> Vec<Attribute>;

    fn flatten(policy: &Self::Api) -> Self::Model;

    fn expand(model: &Self::Model) -> Self::Api;

    /// Turn collections the user left null back into null after a
    /// round trip through the API
    fn normalize(model: &mut Self::Model, prior: &Self::Model);
}

/// Full attribute list of a policy kind
pub fn policy_attributes<K: PolicyKind>() -> Vec<Attribute> {
    let mut attributes = common::common_attributes(<K::Api as Policy>::POLICY_TYPE);
    attributes.extend(K::attributes());
    attributes
}

pub struct PolicyResource<K: PolicyKind> {
    provider_data: Option<BastionZeroProviderData>,
    _kind: PhantomData<K>,
}

impl<K: PolicyKind> Default for PolicyResource<K> {
    fn default() -> Self {
        Self {
            provider_data: None,
            _kind: PhantomData,
        }
    }
}

impl<K: PolicyKind> PolicyResource<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description(&format!("Provides a BastionZero {}.", K::NOUN))
            .attributes(policy_attributes::<K>())
            .build()
    }

    /// Flatten an API policy into state, normalized against `prior`
    fn to_state(policy: &K::Api, prior: &K::Model) -> Result<DynamicValue, Diagnostic> {
        let mut model = K::flatten(policy);
        K::normalize(&mut model, prior);
        DynamicValue::from_model(&model)
            .map_err(|e| model_error(format!("Failed to build {} state", K::NOUN), &e))
    }

    fn read_model(value: &DynamicValue) -> Result<K::Model, Diagnostic> {
        value
            .to_model()
            .map_err(|e| model_error(format!("Failed to read {} plan", K::NOUN), &e))
    }
}

#[async_trait]
impl<K: PolicyKind> Resource for PolicyResource<K> {
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

        let policy = K::expand(&plan);
        let created = match provider_data.client.service::<K::Api>().create(&policy).await {
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

        tracing::info!(
            id = %created.common().id,
            name = %created.common().name,
            "created {}",
            K::NOUN
        );

        let new_state = Self::to_state(&created, &plan).unwrap_or_else(|diag| {
            diagnostics.push(diag);
            DynamicValue::null()
        });

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

        // An imported policy has only its id; everything else reads as null
        let prior: K::Model = request.current_state.to_model().unwrap_or_default();

        match provider_data.client.service::<K::Api>().get(&id).await {
            Ok(policy) => match Self::to_state(&policy, &prior) {
                Ok(state) => ReadResourceResponse {
                    new_state: Some(state),
                    diagnostics,
                    private: request.private,
                    deferred: None,
                },
                Err(diag) => {
                    diagnostics.push(diag);
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

        let plan = match Self::read_model(&request.planned_state) {
            Ok(plan) => plan,
            Err(diag) => {
                diagnostics.push(diag);
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    private: vec![],
                    diagnostics,
                };
            }
        };

        let id = match request.prior_state.get_string(&AttributePath::new("id")) {
            Ok(id) => id,
            Err(e) => {
                diagnostics.push(model_error(format!("Failed to read {} id", K::NOUN), &e));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    private: vec![],
                    diagnostics,
                };
            }
        };

        let policy = K::expand(&plan);
        match provider_data
            .client
            .service::<K::Api>()
            .modify(&id, &policy)
            .await
        {
            Ok(updated) => {
                let new_state = Self::to_state(&updated, &plan).unwrap_or_else(|diag| {
                    diagnostics.push(diag);
                    request.prior_state
                });
                UpdateResourceResponse {
                    new_state,
                    private: vec![],
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error(format!("Failed to update {}", K::NOUN), &e));
                UpdateResourceResponse {
                    new_state: request.prior_state,
                    private: vec![],
                    diagnostics,
                }
            }
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
impl<K: PolicyKind> ResourceWithConfigure for PolicyResource<K> {
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
impl<K: PolicyKind> ResourceWithImportState for PolicyResource<K> {
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
