//! Terraform provider for BastionZero
//!
//! Manages environments, policies and virtual targets, and exposes read-only
//! data sources for every object type the BastionZero API serves.

pub mod api;
pub mod data_sources;
pub mod datasource;
pub mod provider_data;
pub mod resources;
pub mod sweep;

#[cfg(test)]
mod test_helpers;

pub use provider_data::BastionZeroProviderData;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::DataSourceWithConfigure;
use tfplug::defaults::EnvDefault;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderSchemaRequest, ProviderSchemaResponse, ResourceFactory,
};
use tfplug::resource::ResourceWithConfigure;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic};

use crate::api::targets::{BzeroTarget, ClusterTarget, DynamicAccessConfig};
use crate::api::{Client, DEFAULT_HOST};
use crate::data_sources::{
    EnvironmentSource, EnvironmentsSource, GroupsSource, PoliciesSource, PolicySource,
    ServiceAccountSource, ServiceAccountsSource, TargetSource, TargetsSource, UserSource,
    UsersSource, VirtualTargetSource, VirtualTargetsSource,
};
use crate::datasource::{ListDataSource, ListSource, SingleDataSource, SingleSource};
use crate::resources::policy::{
    JitPolicyKind, KubernetesPolicyKind, PolicyKind, ProxyPolicyKind, SessionRecordingPolicyKind,
    TargetConnectPolicyKind,
};
use crate::resources::target::{DbTargetKind, VirtualTargetKind, WebTargetKind};
use crate::resources::{EnvironmentResource, PolicyResource, VirtualTargetResource};

/// Environment variable holding the API endpoint
pub const HOST_ENV_VAR: &str = "BASTIONZERO_HOST";
/// Environment variable holding the API secret
pub const API_SECRET_ENV_VAR: &str = "BASTIONZERO_API_SECRET";

#[derive(Default)]
pub struct BastionZeroProvider;

impl BastionZeroProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Interact with the BastionZero API.")
            .attribute(
                AttributeBuilder::new("api_endpoint", AttributeType::String)
                    .description(&format!(
                        "BastionZero API endpoint. May also be set with the {} environment variable (defaults to {})",
                        HOST_ENV_VAR, DEFAULT_HOST
                    ))
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("api_secret", AttributeType::String)
                    .description(&format!(
                        "BastionZero API key secret. May also be set with the {} environment variable",
                        API_SECRET_ENV_VAR
                    ))
                    .optional()
                    .sensitive()
                    .build(),
            )
            .build()
    }
}

fn resource<R: ResourceWithConfigure + Default + 'static>() -> ResourceFactory {
    Box::new(|| Box::new(R::default()) as Box<dyn ResourceWithConfigure>)
}

fn data_source<D: DataSourceWithConfigure + Default + 'static>() -> DataSourceFactory {
    Box::new(|| Box::new(D::default()) as Box<dyn DataSourceWithConfigure>)
}

fn register_policy<K: PolicyKind>(
    resources: &mut HashMap<String, ResourceFactory>,
    data_sources: &mut HashMap<String, DataSourceFactory>,
) {
    resources.insert(K::TYPE_NAME.to_string(), resource::<PolicyResource<K>>());
    register_data_sources::<PolicySource<K>, PoliciesSource<K>>(data_sources);
}

fn register_virtual_target<K: VirtualTargetKind>(
    resources: &mut HashMap<String, ResourceFactory>,
    data_sources: &mut HashMap<String, DataSourceFactory>,
) {
    resources.insert(
        K::TYPE_NAME.to_string(),
        resource::<VirtualTargetResource<K>>(),
    );
    register_data_sources::<VirtualTargetSource<K>, VirtualTargetsSource<K>>(data_sources);
}

fn register_data_sources<S: SingleSource, L: ListSource>(
    data_sources: &mut HashMap<String, DataSourceFactory>,
) {
    data_sources.insert(S::TYPE_NAME.to_string(), data_source::<SingleDataSource<S>>());
    data_sources.insert(L::TYPE_NAME.to_string(), data_source::<ListDataSource<L>>());
}

/// Every resource and data source factory, keyed by type name
fn factories() -> (
    HashMap<String, ResourceFactory>,
    HashMap<String, DataSourceFactory>,
) {
    let mut resources = HashMap::new();
    let mut data_sources = HashMap::new();

    resources.insert(
        "bastionzero_environment".to_string(),
        resource::<EnvironmentResource>(),
    );
    register_data_sources::<EnvironmentSource, EnvironmentsSource>(&mut data_sources);

    register_policy::<JitPolicyKind>(&mut resources, &mut data_sources);
    register_policy::<KubernetesPolicyKind>(&mut resources, &mut data_sources);
    register_policy::<ProxyPolicyKind>(&mut resources, &mut data_sources);
    register_policy::<SessionRecordingPolicyKind>(&mut resources, &mut data_sources);
    register_policy::<TargetConnectPolicyKind>(&mut resources, &mut data_sources);

    register_virtual_target::<DbTargetKind>(&mut resources, &mut data_sources);
    register_virtual_target::<WebTargetKind>(&mut resources, &mut data_sources);

    register_data_sources::<TargetSource<BzeroTarget>, TargetsSource<BzeroTarget>>(
        &mut data_sources,
    );
    register_data_sources::<TargetSource<ClusterTarget>, TargetsSource<ClusterTarget>>(
        &mut data_sources,
    );
    register_data_sources::<TargetSource<DynamicAccessConfig>, TargetsSource<DynamicAccessConfig>>(
        &mut data_sources,
    );

    register_data_sources::<UserSource, UsersSource>(&mut data_sources);
    register_data_sources::<ServiceAccountSource, ServiceAccountsSource>(&mut data_sources);
    data_sources.insert(
        GroupsSource::TYPE_NAME.to_string(),
        data_source::<ListDataSource<GroupsSource>>(),
    );

    (resources, data_sources)
}

fn configured_string(request: &ConfigureProviderRequest, name: &str) -> Option<String> {
    request.config.get_string(&AttributePath::new(name)).ok()
}

#[async_trait]
impl Provider for BastionZeroProvider {
    fn type_name(&self) -> &str {
        "bastionzero"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let mut diagnostics = vec![];

        let endpoint = EnvDefault::create(HOST_ENV_VAR, DEFAULT_HOST)
            .resolve(configured_string(&request, "api_endpoint"))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let Some(api_secret) = EnvDefault::create_required(API_SECRET_ENV_VAR)
            .resolve(configured_string(&request, "api_secret"))
        else {
            diagnostics.push(
                Diagnostic::error(
                    "Missing API secret",
                    format!(
                        "api_secret must be set in the provider configuration or with the {} environment variable",
                        API_SECRET_ENV_VAR
                    ),
                )
                .with_attribute(AttributePath::new("api_secret")),
            );
            return ConfigureProviderResponse {
                diagnostics,
                provider_data: None,
            };
        };

        let client = match Client::new(&endpoint, &api_secret) {
            Ok(client) => client,
            Err(e) => {
                diagnostics.push(
                    Diagnostic::error("Failed to create API client", e.to_string())
                        .with_attribute(AttributePath::new("api_endpoint")),
                );
                return ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                };
            }
        };

        tracing::info!(endpoint = %client.base_url(), "configured BastionZero provider");

        ConfigureProviderResponse {
            diagnostics,
            provider_data: Some(Arc::new(BastionZeroProviderData::new(client))),
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        factories().0
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        factories().1
    }
}

#[cfg(test)]
#[path = "./lib_test.rs"]
mod lib_test;
