//! Service account data sources

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::DynamicValue;

use crate::api::service_accounts::ServiceAccount;
use crate::api::{ApiError, Client};
use crate::datasource::{string_parameter, ListSource, SingleSource};
use crate::resources::format_timestamp;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceAccountModel {
    pub id: String,
    pub organization_id: String,
    pub email: String,
    pub external_id: String,
    pub jwks_url: String,
    pub jwks_url_pattern: String,
    pub is_admin: bool,
    pub time_created: String,
    pub last_login: Option<String>,
    pub created_by: String,
    pub enabled: bool,
    #[serde(rename = "type")]
    pub subject_type: String,
}

impl ServiceAccountModel {
    pub fn flatten(account: &ServiceAccount) -> Self {
        Self {
            id: account.id.clone(),
            organization_id: account.organization_id.clone(),
            email: account.email.clone(),
            external_id: account.external_id.clone(),
            jwks_url: account.jwks_url.clone(),
            jwks_url_pattern: account.jwks_url_pattern.clone(),
            is_admin: account.is_admin,
            time_created: format_timestamp(&account.time_created),
            last_login: account.last_login.as_ref().map(format_timestamp),
            created_by: account.created_by.clone(),
            enabled: account.enabled,
            subject_type: "ServiceAccount".to_string(),
        }
    }
}

fn service_account_attributes() -> Vec<Attribute> {
    let string = |name: &str, description: &str| {
        AttributeBuilder::new(name, AttributeType::String)
            .description(description)
            .build()
    };
    let boolean = |name: &str, description: &str| {
        AttributeBuilder::new(name, AttributeType::Bool)
            .description(description)
            .build()
    };

    vec![
        string("id", "The service account's unique ID"),
        string("organization_id", "ID of the service account's organization"),
        string("email", "The service account's email address"),
        string("external_id", "The service account's ID at its identity provider"),
        string("jwks_url", "URL of the service account's JSON Web Key Set"),
        string("jwks_url_pattern", "URL pattern the JWKS URL must match"),
        boolean("is_admin", "Whether the service account is an administrator"),
        string("time_created", "Time the service account was created (RFC 3339)"),
        string("last_login", "Time the service account last logged in (RFC 3339)"),
        string("created_by", "ID of the user that created the service account"),
        boolean("enabled", "Whether the service account may log in"),
        string(
            "type",
            "Subject type of the service account, for use in policy subjects (constant value \"ServiceAccount\")",
        ),
    ]
}

#[derive(Default)]
pub struct ServiceAccountSource;

#[async_trait]
impl SingleSource for ServiceAccountSource {
    type Record = ServiceAccountModel;

    const TYPE_NAME: &'static str = "bastionzero_service_account";
    const NOUN: &'static str = "service account";

    fn attributes() -> Vec<Attribute> {
        service_account_attributes()
    }

    async fn fetch(
        &self,
        client: &Client,
        config: &DynamicValue,
    ) -> Result<ServiceAccountModel, ApiError> {
        let account = client
            .service_accounts()
            .get(&string_parameter(config, "id"))
            .await?;
        Ok(ServiceAccountModel::flatten(&account))
    }
}

#[derive(Default)]
pub struct ServiceAccountsSource;

#[async_trait]
impl ListSource for ServiceAccountsSource {
    type Record = ServiceAccountModel;

    const TYPE_NAME: &'static str = "bastionzero_service_accounts";
    const ATTRIBUTE: &'static str = "service_accounts";
    const NOUNS: &'static str = "service accounts";

    fn attributes() -> Vec<Attribute> {
        service_account_attributes()
    }

    async fn list(&self, client: &Client) -> Result<Vec<ServiceAccountModel>, ApiError> {
        let accounts = client.service_accounts().list().await?;
        Ok(accounts.iter().map(ServiceAccountModel::flatten).collect())
    }
}
