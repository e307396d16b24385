//! Data sources that look up one object

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashSet;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse, ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{Attribute, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use super::{as_computed, id_parameter};
use crate::api::{ApiError, Client};
use crate::resources::{api_error, configure_provider_data, model_error, not_configured};
use crate::BastionZeroProviderData;

/// An object type that can be looked up by its parameters
#[async_trait]
pub trait SingleSource: Default + Send + Sync + 'static {
    type Record: Serialize + Send;

    const TYPE_NAME: &'static str;
    /// Human-readable name used in descriptions and diagnostics
    const NOUN: &'static str;

    /// Attributes the user sets to select the object
    fn parameters() -> Vec<Attribute> {
        vec![id_parameter(Self::NOUN)]
    }

    /// Attributes of the object; converted to computed
    fn attributes() -> Vec<Attribute>;

    /// Extra configuration checks beyond the attribute validators. Runs at
    /// validation and again before every read.
    fn validate_config(_config: &DynamicValue) -> Vec<Diagnostic> {
        vec![]
    }

    /// Fetch the record. Required string parameters are guaranteed set.
    async fn fetch(&self, client: &Client, config: &DynamicValue)
        -> Result<Self::Record, ApiError>;
}

#[derive(Default)]
pub struct SingleDataSource<S: SingleSource> {
    source: S,
    provider_data: Option<BastionZeroProviderData>,
}

impl<S: SingleSource> SingleDataSource<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> Schema {
        let parameters = S::parameters();
        let names: HashSet<String> = parameters.iter().map(|a| a.name.clone()).collect();
        let record = as_computed(S::attributes())
            .into_iter()
            .filter(|a| !names.contains(&a.name));

        SchemaBuilder::new()
            .version(0)
            .description(&format!("Get a BastionZero {}.", S::NOUN))
            .attributes(parameters)
            .attributes(record)
            .build()
    }

    /// Required parameters that are unset, plus the source's own checks
    fn check_parameters(config: &DynamicValue) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<Diagnostic> = S::parameters()
            .iter()
            .filter(|p| p.required)
            .filter(|p| match config.get(&AttributePath::new(&p.name)) {
                Dynamic::String(value) => value.is_empty(),
                _ => true,
            })
            .map(|p| {
                Diagnostic::error(
                    "Missing required attribute",
                    format!("The attribute {} is required to look up a {}", p.name, S::NOUN),
                )
                .with_attribute(AttributePath::new(&p.name))
            })
            .collect();
        diagnostics.extend(S::validate_config(config));
        diagnostics
    }

    /// How the lookup was keyed, for not-found diagnostics
    fn lookup_description(config: &DynamicValue) -> String {
        S::parameters()
            .iter()
            .filter_map(|p| match config.get(&AttributePath::new(&p.name)) {
                Dynamic::String(value) => Some(format!("{} \"{}\"", p.name, value)),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Fetched record with the configured parameters filled in where the
    /// record has no value of its own
    fn merge(record: &S::Record, config: &DynamicValue) -> Result<DynamicValue, Diagnostic> {
        let mut state = DynamicValue::from_model(record)
            .map_err(|e| model_error(format!("Failed to build {} state", S::NOUN), &e))?;

        for parameter in S::parameters() {
            let path = AttributePath::new(&parameter.name);
            let configured = config.get(&path).clone();
            if state.get(&path).is_null() && !configured.is_null() {
                state
                    .set(&path, configured)
                    .map_err(|e| model_error(format!("Failed to build {} state", S::NOUN), &e))?;
            }
        }

        Ok(state)
    }
}

#[async_trait]
impl<S: SingleSource> DataSource for SingleDataSource<S> {
    fn type_name(&self) -> &str {
        S::TYPE_NAME
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: S::validate_config(&request.config),
        }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let mut diagnostics = vec![];

        let Some(provider_data) = &self.provider_data else {
            diagnostics.push(not_configured());
            return ReadDataSourceResponse {
                state: request.config,
                diagnostics,
                deferred: None,
            };
        };

        let problems = Self::check_parameters(&request.config);
        if !problems.is_empty() {
            return ReadDataSourceResponse {
                state: request.config,
                diagnostics: problems,
                deferred: None,
            };
        }

        let state = match self.source.fetch(&provider_data.client, &request.config).await {
            Ok(record) => match Self::merge(&record, &request.config) {
                Ok(state) => state,
                Err(diag) => {
                    diagnostics.push(diag);
                    request.config
                }
            },
            Err(e) if e.is_not_found() => {
                diagnostics.push(Diagnostic::error(
                    format!("{} not found", S::NOUN),
                    format!(
                        "No {} found with {}",
                        S::NOUN,
                        Self::lookup_description(&request.config)
                    ),
                ));
                request.config
            }
            Err(e) => {
                diagnostics.push(api_error(format!("Failed to read {}", S::NOUN), &e));
                request.config
            }
        };

        tracing::debug!(type_name = S::TYPE_NAME, "read data source");

        ReadDataSourceResponse {
            state,
            diagnostics,
            deferred: None,
        }
    }
}

#[async_trait]
impl<S: SingleSource> DataSourceWithConfigure for SingleDataSource<S> {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let (provider_data, diagnostics) = configure_provider_data(request.provider_data);
        self.provider_data = provider_data;
        ConfigureDataSourceResponse { diagnostics }
    }
}
