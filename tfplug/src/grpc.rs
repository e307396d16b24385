//! gRPC service implementation
//!
//! Implements the tfplugin6 Provider service on top of the async Provider,
//! Resource and DataSource traits. Resources and data sources are created
//! per request from the provider's factories and configured with the
//! provider data stored by ConfigureProvider.

use crate::context::{Context, StopSignal};
use crate::data_source::{
    ConfigureDataSourceRequest, DataSourceSchemaRequest, DataSourceWithConfigure,
    ReadDataSourceRequest, ValidateDataSourceConfigRequest,
};
use crate::error::TfplugError;
use crate::plan_modifier::values_equal;
use crate::proto;
use crate::provider::{
    ConfigureProviderRequest, Provider, ProviderMetaSchemaRequest, ProviderMetadataRequest,
    ProviderSchemaRequest, StopProviderRequest, ValidateProviderConfigRequest,
};
use crate::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest, ImportResourceStateRequest,
    ModifyPlanRequest, ReadResourceRequest, ResourceSchemaRequest, ResourceWithConfigure,
    UpdateResourceRequest, UpgradeResourceStateRequest, ValidateResourceConfigRequest,
};
use crate::schema::{Attribute, DefaultRequest, PlanModifierRequest, Schema, StringKind};
use crate::types::{
    has_errors, AttributePath, AttributePathStep, ClientCapabilities, Deferred, DeferredReason,
    Diagnostic, DiagnosticSeverity, Dynamic, DynamicValue, RawState, ServerCapabilities,
};
use crate::validator::run_validators;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::{Request, Response, Status};

type ProviderData = Option<Arc<dyn Any + Send + Sync>>;

/// The tfplugin6 Provider service for a tfplug provider
pub struct GrpcProviderServer<P: Provider> {
    provider: Arc<RwLock<P>>,
    provider_data: Arc<RwLock<ProviderData>>,
    stop: StopSignal,
}

impl<P: Provider + 'static> GrpcProviderServer<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(RwLock::new(provider)),
            provider_data: Arc::new(RwLock::new(None)),
            stop: StopSignal::new(),
        }
    }

    /// Refuse to start remote work once StopProvider has been received
    fn check_stopped(ctx: &Context, diagnostics: &mut Vec<Diagnostic>) {
        if ctx.is_stopped() {
            diagnostics.push(Diagnostic::error(
                "Provider stopped",
                "Terraform asked the provider to stop; no new operations are started",
            ));
        }
    }

    /// Create and configure a resource instance for one request
    async fn resource(
        &self,
        ctx: &Context,
        type_name: &str,
    ) -> Result<(Box<dyn ResourceWithConfigure>, Vec<Diagnostic>), Status> {
        let factory = {
            let provider = self.provider.read().await;
            provider.resources().remove(type_name)
        };
        let factory = factory
            .ok_or_else(|| TfplugError::ResourceNotFound(type_name.to_string()).into_status())?;

        let mut resource = factory();
        let provider_data = self.provider_data.read().await.clone();
        let response = resource
            .configure(ctx.clone(), ConfigureResourceRequest { provider_data })
            .await;
        Ok((resource, response.diagnostics))
    }

    /// Create and configure a data source instance for one request
    async fn data_source(
        &self,
        ctx: &Context,
        type_name: &str,
    ) -> Result<(Box<dyn DataSourceWithConfigure>, Vec<Diagnostic>), Status> {
        let factory = {
            let provider = self.provider.read().await;
            provider.data_sources().remove(type_name)
        };
        let factory = factory
            .ok_or_else(|| TfplugError::DataSourceNotFound(type_name.to_string()).into_status())?;

        let mut data_source = factory();
        let provider_data = self.provider_data.read().await.clone();
        let response = data_source
            .configure(ctx.clone(), ConfigureDataSourceRequest { provider_data })
            .await;
        Ok((data_source, response.diagnostics))
    }
}

#[tonic::async_trait]
impl<P: Provider + 'static> proto::provider_server::Provider for GrpcProviderServer<P> {
    async fn get_metadata(
        &self,
        _request: Request<proto::get_metadata::Request>,
    ) -> Result<Response<proto::get_metadata::Response>, Status> {
        let ctx = self.stop.context();
        tracing::debug!(request_id = ctx.request_id(), "GetMetadata");

        let provider = self.provider.read().await;
        let metadata = provider.metadata(ctx, ProviderMetadataRequest).await;

        let mut resources: Vec<String> = provider.resources().into_keys().collect();
        let mut data_sources: Vec<String> = provider.data_sources().into_keys().collect();
        resources.sort();
        data_sources.sort();

        Ok(Response::new(proto::get_metadata::Response {
            server_capabilities: Some(server_capabilities_to_proto(&metadata.server_capabilities)),
            diagnostics: vec![],
            data_sources: data_sources
                .into_iter()
                .map(|type_name| proto::get_metadata::DataSourceMetadata { type_name })
                .collect(),
            resources: resources
                .into_iter()
                .map(|type_name| proto::get_metadata::ResourceMetadata { type_name })
                .collect(),
        }))
    }

    async fn get_provider_schema(
        &self,
        _request: Request<proto::get_provider_schema::Request>,
    ) -> Result<Response<proto::get_provider_schema::Response>, Status> {
        let ctx = self.stop.context();
        tracing::debug!(request_id = ctx.request_id(), "GetProviderSchema");

        let provider = self.provider.read().await;
        let mut diagnostics = Vec::new();

        let provider_schema = provider.schema(ctx.clone(), ProviderSchemaRequest).await;
        diagnostics.extend(provider_schema.diagnostics);

        let meta_schema = provider
            .meta_schema(ctx.clone(), ProviderMetaSchemaRequest)
            .await;
        diagnostics.extend(meta_schema.diagnostics);

        let metadata = provider.metadata(ctx.clone(), ProviderMetadataRequest).await;

        let mut resource_schemas = HashMap::new();
        for (type_name, factory) in provider.resources() {
            let response = factory().schema(ctx.clone(), ResourceSchemaRequest).await;
            diagnostics.extend(response.diagnostics);
            resource_schemas.insert(type_name, schema_to_proto(&response.schema));
        }

        let mut data_source_schemas = HashMap::new();
        for (type_name, factory) in provider.data_sources() {
            let response = factory().schema(ctx.clone(), DataSourceSchemaRequest).await;
            diagnostics.extend(response.diagnostics);
            data_source_schemas.insert(type_name, schema_to_proto(&response.schema));
        }

        Ok(Response::new(proto::get_provider_schema::Response {
            provider: Some(schema_to_proto(&provider_schema.schema)),
            resource_schemas,
            data_source_schemas,
            diagnostics: diagnostics_to_proto(diagnostics),
            provider_meta: meta_schema.schema.as_ref().map(schema_to_proto),
            server_capabilities: Some(server_capabilities_to_proto(&metadata.server_capabilities)),
        }))
    }

    async fn validate_provider_config(
        &self,
        request: Request<proto::validate_provider_config::Request>,
    ) -> Result<Response<proto::validate_provider_config::Response>, Status> {
        let req = request.into_inner();
        let ctx = self.stop.context();
        tracing::debug!(request_id = ctx.request_id(), "ValidateProviderConfig");

        let config = decode_dynamic_value(req.config)?;
        let provider = self.provider.read().await;

        let schema = provider.schema(ctx.clone(), ProviderSchemaRequest).await;
        let mut diagnostics = schema.diagnostics;
        diagnostics.extend(validate_config(&schema.schema, &config));

        let response = provider
            .validate(ctx, ValidateProviderConfigRequest { config })
            .await;
        diagnostics.extend(response.diagnostics);

        Ok(Response::new(proto::validate_provider_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn validate_resource_config(
        &self,
        request: Request<proto::validate_resource_config::Request>,
    ) -> Result<Response<proto::validate_resource_config::Response>, Status> {
        let req = request.into_inner();
        let ctx = self.stop.context();
        tracing::debug!(
            request_id = ctx.request_id(),
            type_name = %req.type_name,
            "ValidateResourceConfig"
        );

        let (resource, mut diagnostics) = self.resource(&ctx, &req.type_name).await?;
        let config = decode_dynamic_value(req.config)?;

        let schema = resource.schema(ctx.clone(), ResourceSchemaRequest).await;
        diagnostics.extend(schema.diagnostics);
        diagnostics.extend(validate_config(&schema.schema, &config));

        let response = resource
            .validate(
                ctx,
                ValidateResourceConfigRequest {
                    type_name: req.type_name,
                    config,
                    client_capabilities: client_capabilities_from_proto(req.client_capabilities),
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);

        Ok(Response::new(proto::validate_resource_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn validate_data_resource_config(
        &self,
        request: Request<proto::validate_data_resource_config::Request>,
    ) -> Result<Response<proto::validate_data_resource_config::Response>, Status> {
        let req = request.into_inner();
        let ctx = self.stop.context();
        tracing::debug!(
            request_id = ctx.request_id(),
            type_name = %req.type_name,
            "ValidateDataResourceConfig"
        );

        let (data_source, mut diagnostics) = self.data_source(&ctx, &req.type_name).await?;
        let config = decode_dynamic_value(req.config)?;

        let schema = data_source.schema(ctx.clone(), DataSourceSchemaRequest).await;
        diagnostics.extend(schema.diagnostics);
        diagnostics.extend(validate_config(&schema.schema, &config));

        let response = data_source
            .validate(
                ctx,
                ValidateDataSourceConfigRequest {
                    type_name: req.type_name,
                    config,
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);

        Ok(Response::new(proto::validate_data_resource_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn upgrade_resource_state(
        &self,
        request: Request<proto::upgrade_resource_state::Request>,
    ) -> Result<Response<proto::upgrade_resource_state::Response>, Status> {
        let req = request.into_inner();
        let ctx = self.stop.context();
        tracing::debug!(
            request_id = ctx.request_id(),
            type_name = %req.type_name,
            version = req.version,
            "UpgradeResourceState"
        );

        let (resource, mut diagnostics) = self.resource(&ctx, &req.type_name).await?;
        let schema = resource.schema(ctx.clone(), ResourceSchemaRequest).await.schema;

        let raw_state = req.raw_state.unwrap_or_default();
        let raw_state = RawState {
            json: (!raw_state.json.is_empty()).then_some(raw_state.json),
            flatmap: (!raw_state.flatmap.is_empty()).then_some(raw_state.flatmap),
        };

        let upgraded = if req.version == schema.version {
            match &raw_state.json {
                Some(json) => DynamicValue::decode_json(json).map_err(TfplugError::into_status)?,
                None => DynamicValue::null(),
            }
        } else if let Some(upgrader) = resource.as_upgrade_state() {
            let response = upgrader
                .upgrade_state(
                    ctx,
                    UpgradeResourceStateRequest {
                        type_name: req.type_name,
                        version: req.version,
                        raw_state,
                    },
                )
                .await;
            diagnostics.extend(response.diagnostics);
            response.upgraded_state
        } else {
            diagnostics.push(Diagnostic::error(
                "Unable to Upgrade Resource State",
                format!(
                    "Stored state has schema version {} but the resource is at version {} and does not implement state upgrades",
                    req.version, schema.version
                ),
            ));
            DynamicValue::null()
        };

        let upgraded = schema.conform(upgraded);
        Ok(Response::new(proto::upgrade_resource_state::Response {
            upgraded_state: Some(encode_dynamic_value(&upgraded)?),
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn get_resource_identity_schemas(
        &self,
        _request: Request<proto::get_resource_identity_schemas::Request>,
    ) -> Result<Response<proto::get_resource_identity_schemas::Response>, Status> {
        Ok(Response::new(proto::get_resource_identity_schemas::Response {
            identity_schemas: HashMap::new(),
            diagnostics: vec![],
        }))
    }

    async fn upgrade_resource_identity(
        &self,
        request: Request<proto::upgrade_resource_identity::Request>,
    ) -> Result<Response<proto::upgrade_resource_identity::Response>, Status> {
        let req = request.into_inner();
        Ok(Response::new(proto::upgrade_resource_identity::Response {
            upgraded_identity: None,
            diagnostics: diagnostics_to_proto(vec![Diagnostic::error(
                "Resource Identity Not Supported",
                format!("{} does not define a resource identity", req.type_name),
            )]),
        }))
    }

    async fn configure_provider(
        &self,
        request: Request<proto::configure_provider::Request>,
    ) -> Result<Response<proto::configure_provider::Response>, Status> {
        let req = request.into_inner();
        let ctx = self.stop.context();
        tracing::info!(
            request_id = ctx.request_id(),
            terraform_version = %req.terraform_version,
            "ConfigureProvider"
        );

        let config = decode_dynamic_value(req.config)?;
        let response = {
            let mut provider = self.provider.write().await;
            provider
                .configure(
                    ctx,
                    ConfigureProviderRequest {
                        terraform_version: req.terraform_version,
                        config,
                        client_capabilities: client_capabilities_from_proto(
                            req.client_capabilities,
                        ),
                    },
                )
                .await
        };

        if response.provider_data.is_some() {
            *self.provider_data.write().await = response.provider_data;
        }

        Ok(Response::new(proto::configure_provider::Response {
            diagnostics: diagnostics_to_proto(response.diagnostics),
        }))
    }

    async fn read_resource(
        &self,
        request: Request<proto::read_resource::Request>,
    ) -> Result<Response<proto::read_resource::Response>, Status> {
        let req = request.into_inner();
        let ctx = self.stop.context();
        tracing::debug!(
            request_id = ctx.request_id(),
            type_name = %req.type_name,
            "ReadResource"
        );

        let (resource, mut diagnostics) = self.resource(&ctx, &req.type_name).await?;
        Self::check_stopped(&ctx, &mut diagnostics);
        let current_state = decode_dynamic_value(req.current_state)?;
        if has_errors(&diagnostics) {
            return Ok(Response::new(proto::read_resource::Response {
                new_state: Some(encode_dynamic_value(&current_state)?),
                diagnostics: diagnostics_to_proto(diagnostics),
                private: req.private,
                deferred: None,
                new_identity: None,
            }));
        }

        let schema = resource.schema(ctx.clone(), ResourceSchemaRequest).await.schema;
        let response = resource
            .read(
                ctx,
                ReadResourceRequest {
                    type_name: req.type_name.clone(),
                    current_state,
                    private: req.private,
                    provider_meta: decode_optional(req.provider_meta)?,
                    client_capabilities: client_capabilities_from_proto(req.client_capabilities),
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);

        let new_state = match response.new_state {
            Some(state) => schema.conform(state),
            None => {
                tracing::info!(type_name = %req.type_name, "resource no longer exists, removing from state");
                DynamicValue::null()
            }
        };

        Ok(Response::new(proto::read_resource::Response {
            new_state: Some(encode_dynamic_value(&new_state)?),
            diagnostics: diagnostics_to_proto(diagnostics),
            private: response.private,
            deferred: response.deferred.as_ref().map(deferred_to_proto),
            new_identity: None,
        }))
    }

    async fn plan_resource_change(
        &self,
        request: Request<proto::plan_resource_change::Request>,
    ) -> Result<Response<proto::plan_resource_change::Response>, Status> {
        let req = request.into_inner();
        let ctx = self.stop.context();
        tracing::debug!(
            request_id = ctx.request_id(),
            type_name = %req.type_name,
            "PlanResourceChange"
        );

        let (resource, mut diagnostics) = self.resource(&ctx, &req.type_name).await?;
        let prior_state = decode_dynamic_value(req.prior_state)?;
        let proposed = decode_dynamic_value(req.proposed_new_state)?;
        let config = decode_dynamic_value(req.config)?;

        // Destroy plans carry no changes of their own
        if proposed.is_null() || has_errors(&diagnostics) {
            return Ok(Response::new(proto::plan_resource_change::Response {
                planned_state: Some(encode_dynamic_value(&proposed)?),
                requires_replace: vec![],
                planned_private: req.prior_private,
                diagnostics: diagnostics_to_proto(diagnostics),
                legacy_type_system: false,
                deferred: None,
                planned_identity: None,
            }));
        }

        let schema = resource.schema(ctx.clone(), ResourceSchemaRequest).await.schema;
        let plan = plan_attributes(&schema, &prior_state, proposed, &config);
        diagnostics.extend(plan.diagnostics);
        let mut planned_state = plan.planned_state;
        let mut requires_replace = plan.requires_replace;
        let mut planned_private = req.prior_private;

        if let Some(modifier) = resource.as_modify_plan() {
            let response = modifier
                .modify_plan(
                    ctx,
                    ModifyPlanRequest {
                        type_name: req.type_name,
                        config,
                        prior_state,
                        proposed_new_state: planned_state,
                        prior_private: planned_private,
                        provider_meta: decode_optional(req.provider_meta)?,
                    },
                )
                .await;
            planned_state = response.planned_state;
            requires_replace.extend(response.requires_replace);
            planned_private = response.planned_private;
            diagnostics.extend(response.diagnostics);
        }

        let planned_state = schema.conform(planned_state);
        Ok(Response::new(proto::plan_resource_change::Response {
            planned_state: Some(encode_dynamic_value(&planned_state)?),
            requires_replace: requires_replace.iter().map(path_to_proto).collect(),
            planned_private,
            diagnostics: diagnostics_to_proto(diagnostics),
            legacy_type_system: false,
            deferred: None,
            planned_identity: None,
        }))
    }

    async fn apply_resource_change(
        &self,
        request: Request<proto::apply_resource_change::Request>,
    ) -> Result<Response<proto::apply_resource_change::Response>, Status> {
        let req = request.into_inner();
        let ctx = self.stop.context();

        let (resource, mut diagnostics) = self.resource(&ctx, &req.type_name).await?;
        let prior_state = decode_dynamic_value(req.prior_state)?;
        let planned_state = decode_dynamic_value(req.planned_state)?;
        let config = decode_dynamic_value(req.config)?;
        let provider_meta = decode_optional(req.provider_meta)?;
        Self::check_stopped(&ctx, &mut diagnostics);

        if has_errors(&diagnostics) {
            return Ok(Response::new(proto::apply_resource_change::Response {
                new_state: Some(encode_dynamic_value(&prior_state)?),
                private: req.planned_private,
                diagnostics: diagnostics_to_proto(diagnostics),
                legacy_type_system: false,
                new_identity: None,
            }));
        }

        let schema = resource.schema(ctx.clone(), ResourceSchemaRequest).await.schema;

        let (new_state, private) = if planned_state.is_null() {
            tracing::info!(request_id = ctx.request_id(), type_name = %req.type_name, "deleting resource");
            let response = resource
                .delete(
                    ctx,
                    DeleteResourceRequest {
                        type_name: req.type_name,
                        prior_state: prior_state.clone(),
                        planned_private: req.planned_private.clone(),
                        provider_meta,
                    },
                )
                .await;
            let failed = has_errors(&response.diagnostics);
            diagnostics.extend(response.diagnostics);
            // A failed delete keeps the resource in state
            if failed {
                (prior_state, req.planned_private)
            } else {
                (DynamicValue::null(), Vec::new())
            }
        } else if prior_state.is_null() {
            tracing::info!(request_id = ctx.request_id(), type_name = %req.type_name, "creating resource");
            let response = resource
                .create(
                    ctx,
                    CreateResourceRequest {
                        type_name: req.type_name,
                        planned_state,
                        config,
                        planned_private: req.planned_private,
                        provider_meta,
                    },
                )
                .await;
            diagnostics.extend(response.diagnostics);
            (schema.conform(response.new_state), response.private)
        } else {
            tracing::info!(request_id = ctx.request_id(), type_name = %req.type_name, "updating resource");
            let response = resource
                .update(
                    ctx,
                    UpdateResourceRequest {
                        type_name: req.type_name,
                        prior_state,
                        planned_state,
                        config,
                        planned_private: req.planned_private,
                        provider_meta,
                    },
                )
                .await;
            diagnostics.extend(response.diagnostics);
            (schema.conform(response.new_state), response.private)
        };

        Ok(Response::new(proto::apply_resource_change::Response {
            new_state: Some(encode_dynamic_value(&new_state)?),
            private,
            diagnostics: diagnostics_to_proto(diagnostics),
            legacy_type_system: false,
            new_identity: None,
        }))
    }

    async fn import_resource_state(
        &self,
        request: Request<proto::import_resource_state::Request>,
    ) -> Result<Response<proto::import_resource_state::Response>, Status> {
        let req = request.into_inner();
        let ctx = self.stop.context();
        tracing::info!(
            request_id = ctx.request_id(),
            type_name = %req.type_name,
            id = %req.id,
            "ImportResourceState"
        );

        let (resource, mut diagnostics) = self.resource(&ctx, &req.type_name).await?;
        Self::check_stopped(&ctx, &mut diagnostics);
        if has_errors(&diagnostics) {
            return Ok(Response::new(proto::import_resource_state::Response {
                imported_resources: vec![],
                diagnostics: diagnostics_to_proto(diagnostics),
                deferred: None,
            }));
        }
        let Some(importer) = resource.as_import_state() else {
            diagnostics.push(Diagnostic::error(
                "Resource Import Not Implemented",
                format!("{} does not support import", req.type_name),
            ));
            return Ok(Response::new(proto::import_resource_state::Response {
                imported_resources: vec![],
                diagnostics: diagnostics_to_proto(diagnostics),
                deferred: None,
            }));
        };

        let schema = resource.schema(ctx.clone(), ResourceSchemaRequest).await.schema;
        let response = importer
            .import_state(
                ctx,
                ImportResourceStateRequest {
                    type_name: req.type_name,
                    id: req.id,
                    client_capabilities: client_capabilities_from_proto(req.client_capabilities),
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);

        let imported_resources = response
            .imported_resources
            .into_iter()
            .map(|imported| {
                Ok(proto::import_resource_state::ImportedResource {
                    type_name: imported.type_name,
                    state: Some(encode_dynamic_value(&schema.conform(imported.state))?),
                    private: imported.private,
                    identity: None,
                })
            })
            .collect::<Result<Vec<_>, Status>>()?;

        Ok(Response::new(proto::import_resource_state::Response {
            imported_resources,
            diagnostics: diagnostics_to_proto(diagnostics),
            deferred: response.deferred.as_ref().map(deferred_to_proto),
        }))
    }

    async fn move_resource_state(
        &self,
        request: Request<proto::move_resource_state::Request>,
    ) -> Result<Response<proto::move_resource_state::Response>, Status> {
        let req = request.into_inner();
        Ok(Response::new(proto::move_resource_state::Response {
            target_state: None,
            diagnostics: diagnostics_to_proto(vec![Diagnostic::error(
                "Move Resource State Not Supported",
                format!(
                    "{} cannot be moved from {}",
                    req.target_type_name, req.source_type_name
                ),
            )]),
            target_private: vec![],
            target_identity: None,
        }))
    }

    async fn read_data_source(
        &self,
        request: Request<proto::read_data_source::Request>,
    ) -> Result<Response<proto::read_data_source::Response>, Status> {
        let req = request.into_inner();
        let ctx = self.stop.context();
        tracing::debug!(
            request_id = ctx.request_id(),
            type_name = %req.type_name,
            "ReadDataSource"
        );

        let (data_source, mut diagnostics) = self.data_source(&ctx, &req.type_name).await?;
        Self::check_stopped(&ctx, &mut diagnostics);
        let config = decode_dynamic_value(req.config)?;
        if has_errors(&diagnostics) {
            return Ok(Response::new(proto::read_data_source::Response {
                state: Some(encode_dynamic_value(&DynamicValue::null())?),
                diagnostics: diagnostics_to_proto(diagnostics),
                deferred: None,
            }));
        }

        let schema = data_source.schema(ctx.clone(), DataSourceSchemaRequest).await.schema;
        let response = data_source
            .read(
                ctx,
                ReadDataSourceRequest {
                    type_name: req.type_name,
                    config,
                    provider_meta: decode_optional(req.provider_meta)?,
                    client_capabilities: client_capabilities_from_proto(req.client_capabilities),
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);

        Ok(Response::new(proto::read_data_source::Response {
            state: Some(encode_dynamic_value(&schema.conform(response.state))?),
            diagnostics: diagnostics_to_proto(diagnostics),
            deferred: response.deferred.as_ref().map(deferred_to_proto),
        }))
    }

    async fn stop_provider(
        &self,
        _request: Request<proto::stop_provider::Request>,
    ) -> Result<Response<proto::stop_provider::Response>, Status> {
        let ctx = self.stop.context();
        tracing::info!(request_id = ctx.request_id(), "StopProvider");

        self.stop.stop();
        let provider = self.provider.read().await;
        let response = provider.stop(ctx, StopProviderRequest).await;
        Ok(Response::new(proto::stop_provider::Response {
            error: response.error.unwrap_or_default(),
        }))
    }
}

struct AttributePlan {
    planned_state: DynamicValue,
    requires_replace: Vec<AttributePath>,
    diagnostics: Vec<Diagnostic>,
}

/// Framework planning for a create or update:
/// 1. defaults fill attributes left null in configuration
/// 2. computed attributes without configuration become unknown when the
///    resource changes at all
/// 3. attribute plan modifiers run and may request replacement
fn plan_attributes(
    schema: &Schema,
    prior_state: &DynamicValue,
    proposed: DynamicValue,
    config: &DynamicValue,
) -> AttributePlan {
    let mut planned = proposed;
    let mut diagnostics = Vec::new();

    for attr in &schema.block.attributes {
        let path = AttributePath::new(&attr.name);
        if !config.get(&path).is_null() {
            continue;
        }
        if let Some(default) = &attr.default {
            let value = default.default_value(DefaultRequest { path: path.clone() }).value;
            set_planned(&mut planned, &path, value.value, &mut diagnostics);
        }
    }

    let creating = prior_state.is_null();
    if creating || !values_equal(&planned.value, &prior_state.value) {
        for attr in schema.block.attributes.iter().filter(|a| marks_unknown(a)) {
            let path = AttributePath::new(&attr.name);
            if config.get(&path).is_null() {
                set_planned(&mut planned, &path, Dynamic::Unknown, &mut diagnostics);
            }
        }
    }

    let mut requires_replace = Vec::new();
    for attr in &schema.block.attributes {
        let path = AttributePath::new(&attr.name);
        for modifier in &attr.plan_modifiers {
            let response = modifier.modify(PlanModifierRequest {
                config_value: DynamicValue::new(config.get(&path).clone()),
                state_value: DynamicValue::new(prior_state.get(&path).clone()),
                plan_value: DynamicValue::new(planned.get(&path).clone()),
                path: path.clone(),
            });
            diagnostics.extend(response.diagnostics);
            if response.requires_replace && !requires_replace.contains(&path) {
                requires_replace.push(path.clone());
            }
            set_planned(&mut planned, &path, response.plan_value.value, &mut diagnostics);
        }
    }

    AttributePlan {
        planned_state: planned,
        requires_replace,
        diagnostics,
    }
}

fn marks_unknown(attr: &Attribute) -> bool {
    attr.computed && attr.default.is_none()
}

fn set_planned(
    planned: &mut DynamicValue,
    path: &AttributePath,
    value: Dynamic,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if let Err(e) = planned.set(path, value) {
        diagnostics.push(
            Diagnostic::error("Failed to plan attribute", e.to_string()).with_attribute(path.clone()),
        );
    }
}

/// Schema-driven checks shared by provider, resource and data source
/// validation: required attributes, read-only attributes, value types and
/// attribute validators
fn validate_config(schema: &Schema, config: &DynamicValue) -> Vec<Diagnostic> {
    if config.is_null() || config.is_unknown() {
        return vec![];
    }

    let mut diagnostics = Vec::new();
    for attr in &schema.block.attributes {
        let path = AttributePath::new(&attr.name);
        let value = config.get(&path);

        if attr.required && value.is_null() {
            diagnostics.push(
                Diagnostic::error(
                    "Missing required argument",
                    format!("The argument \"{}\" is required, but no definition was found.", attr.name),
                )
                .with_attribute(path.clone()),
            );
            continue;
        }

        if attr.computed && !attr.optional && !attr.required && !value.is_null() {
            diagnostics.push(
                Diagnostic::error(
                    "Invalid Configuration for Read-Only Attribute",
                    format!("Cannot set value for attribute \"{}\" as it is computed only.", attr.name),
                )
                .with_attribute(path.clone()),
            );
            continue;
        }

        if !attr.r#type.accepts(value) {
            diagnostics.push(
                Diagnostic::error(
                    "Incorrect attribute value type",
                    format!(
                        "Attribute \"{}\" expects {} but got {}",
                        attr.name,
                        attr.r#type.to_type_json(),
                        value.type_name()
                    ),
                )
                .with_attribute(path.clone()),
            );
            continue;
        }

        diagnostics.extend(run_validators(&attr.validators, value, config, &path));
    }

    diagnostics
}

#[allow(clippy::result_large_err)]
fn decode_dynamic_value(value: Option<proto::DynamicValue>) -> Result<DynamicValue, Status> {
    let Some(value) = value else {
        return Ok(DynamicValue::null());
    };

    let decoded = if !value.msgpack.is_empty() {
        DynamicValue::decode_msgpack(&value.msgpack)
    } else if !value.json.is_empty() {
        DynamicValue::decode_json(&value.json)
    } else {
        Ok(DynamicValue::null())
    };

    decoded.map_err(TfplugError::into_status)
}

#[allow(clippy::result_large_err)]
fn decode_optional(value: Option<proto::DynamicValue>) -> Result<Option<DynamicValue>, Status> {
    value.map(|v| decode_dynamic_value(Some(v))).transpose()
}

#[allow(clippy::result_large_err)]
fn encode_dynamic_value(value: &DynamicValue) -> Result<proto::DynamicValue, Status> {
    Ok(proto::DynamicValue {
        msgpack: value.encode_msgpack().map_err(TfplugError::into_status)?,
        json: vec![],
    })
}

fn schema_to_proto(schema: &Schema) -> proto::Schema {
    proto::Schema {
        version: schema.version,
        block: Some(proto::schema::Block {
            version: schema.block.version,
            attributes: schema.block.attributes.iter().map(attribute_to_proto).collect(),
            block_types: vec![],
            description: schema.block.description.clone(),
            description_kind: string_kind_to_proto(schema.block.description_kind),
            deprecated: schema.block.deprecated,
        }),
    }
}

fn attribute_to_proto(attr: &Attribute) -> proto::schema::Attribute {
    proto::schema::Attribute {
        name: attr.name.clone(),
        r#type: attr.r#type.to_type_bytes(),
        nested_type: None,
        description: attr.description.clone(),
        required: attr.required,
        optional: attr.optional,
        computed: attr.computed,
        sensitive: attr.sensitive,
        description_kind: proto::StringKind::Plain as i32,
        deprecated: attr.deprecated,
        write_only: false,
    }
}

fn string_kind_to_proto(kind: StringKind) -> i32 {
    match kind {
        StringKind::Plain => proto::StringKind::Plain as i32,
        StringKind::Markdown => proto::StringKind::Markdown as i32,
    }
}

fn path_to_proto(path: &AttributePath) -> proto::AttributePath {
    use proto::attribute_path::step::Selector;

    proto::AttributePath {
        steps: path
            .steps
            .iter()
            .map(|step| proto::attribute_path::Step {
                selector: Some(match step {
                    AttributePathStep::AttributeName(name) => Selector::AttributeName(name.clone()),
                    AttributePathStep::ElementKeyString(key) => {
                        Selector::ElementKeyString(key.clone())
                    }
                    AttributePathStep::ElementKeyInt(idx) => Selector::ElementKeyInt(*idx),
                }),
            })
            .collect(),
    }
}

fn diagnostics_to_proto(diagnostics: Vec<Diagnostic>) -> Vec<proto::Diagnostic> {
    diagnostics
        .into_iter()
        .map(|diag| {
            let severity = match diag.severity {
                DiagnosticSeverity::Invalid => proto::diagnostic::Severity::Invalid,
                DiagnosticSeverity::Error => proto::diagnostic::Severity::Error,
                DiagnosticSeverity::Warning => proto::diagnostic::Severity::Warning,
            };
            proto::Diagnostic {
                severity: severity as i32,
                summary: diag.summary,
                detail: diag.detail,
                attribute: diag.attribute.as_ref().map(path_to_proto),
            }
        })
        .collect()
}

fn client_capabilities_from_proto(
    capabilities: Option<proto::ClientCapabilities>,
) -> ClientCapabilities {
    capabilities
        .map(|c| ClientCapabilities {
            deferral_allowed: c.deferral_allowed,
            write_only_attributes_allowed: c.write_only_attributes_allowed,
        })
        .unwrap_or_default()
}

fn server_capabilities_to_proto(capabilities: &ServerCapabilities) -> proto::ServerCapabilities {
    proto::ServerCapabilities {
        plan_destroy: capabilities.plan_destroy,
        get_provider_schema_optional: capabilities.get_provider_schema_optional,
        move_resource_state: capabilities.move_resource_state,
    }
}

fn deferred_to_proto(deferred: &Deferred) -> proto::Deferred {
    let reason = match deferred.reason {
        DeferredReason::Unknown => proto::deferred::Reason::Unknown,
        DeferredReason::ResourceConfigUnknown => proto::deferred::Reason::ResourceConfigUnknown,
        DeferredReason::ProviderConfigUnknown => proto::deferred::Reason::ProviderConfigUnknown,
        DeferredReason::AbsentPrereq => proto::deferred::Reason::AbsentPrereq,
    };
    proto::Deferred {
        reason: reason as i32,
    }
}

#[cfg(test)]
#[path = "./grpc_test.rs"]
mod grpc_test;
