//! Environment data sources

use async_trait::async_trait;
use tfplug::schema::Attribute;
use tfplug::types::DynamicValue;

use crate::api::{ApiError, Client};
use crate::datasource::{string_parameter, ListSource, SingleSource};
use crate::resources::environment::{environment_attributes, EnvironmentModel};

#[derive(Default)]
pub struct EnvironmentSource;

#[async_trait]
impl SingleSource for EnvironmentSource {
    type Record = EnvironmentModel;

    const TYPE_NAME: &'static str = "bastionzero_environment";
    const NOUN: &'static str = "environment";

    fn attributes() -> Vec<Attribute> {
        environment_attributes()
    }

    async fn fetch(
        &self,
        client: &Client,
        config: &DynamicValue,
    ) -> Result<EnvironmentModel, ApiError> {
        let env = client
            .environments()
            .get(&string_parameter(config, "id"))
            .await?;
        Ok(EnvironmentModel::flatten(&env))
    }
}

#[derive(Default)]
pub struct EnvironmentsSource;

#[async_trait]
impl ListSource for EnvironmentsSource {
    type Record = EnvironmentModel;

    const TYPE_NAME: &'static str = "bastionzero_environments";
    const ATTRIBUTE: &'static str = "environments";
    const NOUNS: &'static str = "environments";

    fn attributes() -> Vec<Attribute> {
        environment_attributes()
    }

    async fn list(&self, client: &Client) -> Result<Vec<EnvironmentModel>, ApiError> {
        let envs = client.environments().list().await?;
        Ok(envs.iter().map(EnvironmentModel::flatten).collect())
    }
}

#[cfg(test)]
#[path = "./environments_test.rs"]
mod environments_test;
