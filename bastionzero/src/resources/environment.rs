//! Environment resource implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tfplug::context::Context;
use tfplug::defaults::StaticDefault;
use tfplug::import::import_state_passthrough_id;
use tfplug::plan_modifier::{RequiresReplace, UseStateForUnknown};
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, ResourceWithImportState, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::{NumberRangeValidator, StringLengthValidator};

use super::{api_error, configure_provider_data, format_timestamp, model_error, not_configured};
use crate::api::environments::{CreateEnvironmentRequest, Environment, ModifyEnvironmentRequest};
use crate::BastionZeroProviderData;

pub const DEFAULT_OFFLINE_CLEANUP_TIMEOUT_HOURS: u32 = 2160;

/// Terraform view of an environment
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentModel {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub offline_cleanup_timeout_hours: Option<u32>,
    pub organization_id: Option<String>,
    pub is_default: Option<bool>,
    pub time_created: Option<String>,
    pub targets: Option<BTreeMap<String, EnvironmentTargetModel>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentTargetModel {
    pub id: String,
    #[serde(rename = "type")]
    pub target_type: String,
}

impl EnvironmentModel {
    pub fn flatten(env: &Environment) -> Self {
        Self {
            id: Some(env.id.clone()),
            name: env.name.clone(),
            description: Some(env.description.clone()),
            offline_cleanup_timeout_hours: Some(env.offline_cleanup_timeout_hours),
            organization_id: Some(env.organization_id.clone()),
            is_default: Some(env.is_default),
            time_created: Some(format_timestamp(&env.time_created)),
            targets: Some(
                env.targets
                    .iter()
                    .map(|t| {
                        (
                            t.id.clone(),
                            EnvironmentTargetModel {
                                id: t.id.clone(),
                                target_type: t.target_type.clone(),
                            },
                        )
                    })
                    .collect(),
            ),
        }
    }

    fn create_request(&self) -> CreateEnvironmentRequest {
        CreateEnvironmentRequest {
            name: self.name.clone(),
            description: self.description.clone(),
            offline_cleanup_timeout_hours: self.offline_cleanup_timeout_hours,
        }
    }

    fn modify_request(&self) -> ModifyEnvironmentRequest {
        ModifyEnvironmentRequest {
            description: Some(self.description.clone().unwrap_or_default()),
            offline_cleanup_timeout_hours: self.offline_cleanup_timeout_hours,
        }
    }
}

/// Attributes of an environment, shared with the environment data sources
pub fn environment_attributes() -> Vec<tfplug::schema::Attribute> {
    vec![
        AttributeBuilder::new("id", AttributeType::String)
            .description("The environment's unique ID")
            .computed()
            .plan_modifier(Box::new(UseStateForUnknown))
            .build(),
        AttributeBuilder::new("name", AttributeType::String)
            .description("The environment's name")
            .required()
            .validator(StringLengthValidator::at_least(1))
            .plan_modifier(Box::new(RequiresReplace))
            .build(),
        AttributeBuilder::new("description", AttributeType::String)
            .description("The environment's description")
            .optional()
            .computed()
            .default(StaticDefault::string(""))
            .build(),
        AttributeBuilder::new("offline_cleanup_timeout_hours", AttributeType::Number)
            .description(
                "Hours to wait before removing a target that went offline (defaults to 2160, 90 days)",
            )
            .optional()
            .computed()
            .default(StaticDefault::number(DEFAULT_OFFLINE_CLEANUP_TIMEOUT_HOURS as f64))
            .validator(NumberRangeValidator::between(1.0, 8760.0))
            .build(),
        AttributeBuilder::new("organization_id", AttributeType::String)
            .description("The environment's organization's ID")
            .computed()
            .plan_modifier(Box::new(UseStateForUnknown))
            .build(),
        AttributeBuilder::new("is_default", AttributeType::Bool)
            .description("Whether this is the organization's default environment")
            .computed()
            .plan_modifier(Box::new(UseStateForUnknown))
            .build(),
        AttributeBuilder::new("time_created", AttributeType::String)
            .description("Time this environment was created (RFC 3339)")
            .computed()
            .plan_modifier(Box::new(UseStateForUnknown))
            .build(),
        AttributeBuilder::new(
            "targets",
            AttributeType::map(AttributeType::object(&[
                ("id", AttributeType::String),
                ("type", AttributeType::String),
            ])),
        )
        .description("Targets in this environment, keyed by target ID")
        .computed()
        .build(),
    ]
}

#[derive(Default)]
pub struct EnvironmentResource {
    provider_data: Option<BastionZeroProviderData>,
}

impl EnvironmentResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description(
                "Provides a BastionZero environment. Environments group targets and scope policies.",
            )
            .attributes(environment_attributes())
            .build()
    }

    /// Fetch the environment and convert it to state
    async fn read_state(
        provider_data: &BastionZeroProviderData,
        id: &str,
    ) -> Result<DynamicValue, Diagnostic> {
        let env = provider_data
            .client
            .environments()
            .get(id)
            .await
            .map_err(|e| api_error("Failed to read environment", &e))?;
        DynamicValue::from_model(&EnvironmentModel::flatten(&env))
            .map_err(|e| model_error("Failed to build environment state", &e))
    }
}

#[async_trait]
impl Resource for EnvironmentResource {
    fn type_name(&self) -> &str {
        "bastionzero_environment"
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

        let plan: EnvironmentModel = match request.planned_state.to_model() {
            Ok(plan) => plan,
            Err(e) => {
                diagnostics.push(model_error("Failed to read environment plan", &e));
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                };
            }
        };

        let created = match provider_data
            .client
            .environments()
            .create(&plan.create_request())
            .await
        {
            Ok(created) => created,
            Err(e) => {
                diagnostics.push(api_error("Failed to create environment", &e));
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics,
                };
            }
        };

        tracing::info!(id = %created.id, name = %plan.name, "created environment");

        let new_state = match Self::read_state(provider_data, &created.id).await {
            Ok(state) => state,
            Err(diag) => {
                // Keep the id so the environment stays tracked
                diagnostics.push(diag);
                let partial = EnvironmentModel {
                    id: Some(created.id),
                    ..plan
                };
                DynamicValue::from_model(&partial).unwrap_or_else(|_| DynamicValue::null())
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

        let id = match request.current_state.get_string(&AttributePath::new("id")) {
            Ok(id) => id,
            Err(_) => {
                return ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                    private: request.private,
                    deferred: None,
                };
            }
        };

        match provider_data.client.environments().get(&id).await {
            Ok(env) => match DynamicValue::from_model(&EnvironmentModel::flatten(&env)) {
                Ok(state) => ReadResourceResponse {
                    new_state: Some(state),
                    diagnostics,
                    private: request.private,
                    deferred: None,
                },
                Err(e) => {
                    diagnostics.push(model_error("Failed to build environment state", &e));
                    ReadResourceResponse {
                        new_state: Some(request.current_state),
                        diagnostics,
                        private: request.private,
                        deferred: None,
                    }
                }
            },
            Err(e) if e.is_not_found() => {
                tracing::warn!(%id, "environment not found, removing from state");
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                    private: request.private,
                    deferred: None,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to read environment", &e));
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

        let (plan, id) = match (
            request.planned_state.to_model::<EnvironmentModel>(),
            request.prior_state.get_string(&AttributePath::new("id")),
        ) {
            (Ok(plan), Ok(id)) => (plan, id),
            (Err(e), _) | (_, Err(e)) => {
                diagnostics.push(model_error("Failed to read environment plan", &e));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    private: vec![],
                    diagnostics,
                };
            }
        };

        if let Err(e) = provider_data
            .client
            .environments()
            .modify(&id, &plan.modify_request())
            .await
        {
            diagnostics.push(api_error("Failed to update environment", &e));
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

        match provider_data.client.environments().delete(&id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!(%id, "environment already deleted");
            }
            Err(e) => diagnostics.push(api_error("Failed to delete environment", &e)),
        }

        DeleteResourceResponse { diagnostics }
    }

    fn as_import_state(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }
}

#[async_trait]
impl ResourceWithConfigure for EnvironmentResource {
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
impl ResourceWithImportState for EnvironmentResource {
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

#[cfg(test)]
#[path = "./environment_test.rs"]
mod environment_test;
