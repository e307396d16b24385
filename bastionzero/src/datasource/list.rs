//! Data sources that list every object of a type

use async_trait::async_trait;
use serde::Serialize;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{Diagnostic, Dynamic, DynamicValue};

use super::as_computed;
use crate::api::{ApiError, Client};
use crate::resources::{api_error, configure_provider_data, model_error, not_configured};
use crate::BastionZeroProviderData;

#[async_trait]
pub trait ListSource: Default + Send + Sync + 'static {
    type Record: Serialize + Send;

    const TYPE_NAME: &'static str;
    /// Name of the list attribute holding the records
    const ATTRIBUTE: &'static str;
    /// Plural human-readable name
    const NOUNS: &'static str;

    /// Attributes of one record
    fn attributes() -> Vec<Attribute>;

    async fn list(&self, client: &Client) -> Result<Vec<Self::Record>, ApiError>;
}

#[derive(Default)]
pub struct ListDataSource<S: ListSource> {
    source: S,
    provider_data: Option<BastionZeroProviderData>,
}

impl<S: ListSource> ListDataSource<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Object type of one record
    pub fn record_type() -> AttributeType {
        AttributeType::Object(
            as_computed(S::attributes())
                .into_iter()
                .map(|a| (a.name, a.r#type))
                .collect(),
        )
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description(&format!("Get a list of all BastionZero {}.", S::NOUNS))
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Constant identifier of this data source")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(S::ATTRIBUTE, AttributeType::list(Self::record_type()))
                    .description(&format!("List of {}", S::NOUNS))
                    .computed()
                    .build(),
            )
            .build()
    }

    fn to_state(records: &[S::Record]) -> Result<DynamicValue, Diagnostic> {
        let items = records
            .iter()
            .map(|record| DynamicValue::from_model(record).map(|value| value.value))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| model_error(format!("Failed to build {} state", S::NOUNS), &e))?;

        Ok(DynamicValue::new(Dynamic::Map(
            [
                ("id".to_string(), Dynamic::String(S::TYPE_NAME.to_string())),
                (S::ATTRIBUTE.to_string(), Dynamic::List(items)),
            ]
            .into_iter()
            .collect(),
        )))
    }
}

#[async_trait]
impl<S: ListSource> DataSource for ListDataSource<S> {
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

        let state = match self.source.list(&provider_data.client).await {
            Ok(records) => {
                tracing::debug!(count = records.len(), "listed {}", S::NOUNS);
                Self::to_state(&records).unwrap_or_else(|diag| {
                    diagnostics.push(diag);
                    request.config
                })
            }
            Err(e) => {
                diagnostics.push(api_error(format!("Failed to list {}", S::NOUNS), &e));
                request.config
            }
        };

        ReadDataSourceResponse {
            state,
            diagnostics,
            deferred: None,
        }
    }
}

#[async_trait]
impl<S: ListSource> DataSourceWithConfigure for ListDataSource<S> {
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
