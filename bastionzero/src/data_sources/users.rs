//! User data sources
//!
//! A single user is looked up by either `id` or `email`; the API accepts
//! both in the same path segment.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::{ConflictsWithValidator, UuidValidator};

use crate::api::users::User;
use crate::api::{ApiError, Client};
use crate::datasource::{string_parameter, ListSource, SingleSource};
use crate::resources::format_timestamp;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserModel {
    pub id: String,
    pub organization_id: String,
    pub full_name: String,
    pub email: String,
    pub is_admin: bool,
    pub time_created: String,
    pub last_login: Option<String>,
    #[serde(rename = "type")]
    pub subject_type: String,
}

impl UserModel {
    pub fn flatten(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            organization_id: user.organization_id.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            time_created: format_timestamp(&user.time_created),
            last_login: user.last_login.as_ref().map(format_timestamp),
            subject_type: "User".to_string(),
        }
    }
}

fn user_attributes() -> Vec<Attribute> {
    vec![
        AttributeBuilder::new("id", AttributeType::String)
            .description("The user's unique ID")
            .build(),
        AttributeBuilder::new("organization_id", AttributeType::String)
            .description("ID of the user's organization")
            .build(),
        AttributeBuilder::new("full_name", AttributeType::String)
            .description("The user's full name")
            .build(),
        AttributeBuilder::new("email", AttributeType::String)
            .description("The user's email address")
            .build(),
        AttributeBuilder::new("is_admin", AttributeType::Bool)
            .description("Whether the user is an organization administrator")
            .build(),
        AttributeBuilder::new("time_created", AttributeType::String)
            .description("Time the user was created (RFC 3339)")
            .build(),
        AttributeBuilder::new("last_login", AttributeType::String)
            .description("Time the user last logged in (RFC 3339)")
            .build(),
        AttributeBuilder::new("type", AttributeType::String)
            .description("Subject type of the user, for use in policy subjects (constant value \"User\")")
            .build(),
    ]
}

#[derive(Default)]
pub struct UserSource;

#[async_trait]
impl SingleSource for UserSource {
    type Record = UserModel;

    const TYPE_NAME: &'static str = "bastionzero_user";
    const NOUN: &'static str = "user";

    fn parameters() -> Vec<Attribute> {
        vec![
            AttributeBuilder::new("id", AttributeType::String)
                .description("The user's unique ID. Exactly one of id or email must be set")
                .optional()
                .computed()
                .validator(Box::new(UuidValidator))
                .validator(ConflictsWithValidator::new(&["email"]))
                .build(),
            AttributeBuilder::new("email", AttributeType::String)
                .description("The user's email address. Exactly one of id or email must be set")
                .optional()
                .computed()
                .build(),
        ]
    }

    fn attributes() -> Vec<Attribute> {
        user_attributes()
    }

    fn validate_config(config: &DynamicValue) -> Vec<Diagnostic> {
        let id = config.get(&AttributePath::new("id"));
        let email = config.get(&AttributePath::new("email"));
        if id.is_null() && email.is_null() {
            vec![Diagnostic::error(
                "Missing user lookup",
                "Exactly one of id or email must be set",
            )]
        } else {
            vec![]
        }
    }

    async fn fetch(&self, client: &Client, config: &DynamicValue) -> Result<UserModel, ApiError> {
        let id = string_parameter(config, "id");
        let key = if id.is_empty() {
            string_parameter(config, "email")
        } else {
            id
        };
        let user = client.users().get(&key).await?;
        Ok(UserModel::flatten(&user))
    }
}

#[derive(Default)]
pub struct UsersSource;

#[async_trait]
impl ListSource for UsersSource {
    type Record = UserModel;

    const TYPE_NAME: &'static str = "bastionzero_users";
    const ATTRIBUTE: &'static str = "users";
    const NOUNS: &'static str = "users";

    fn attributes() -> Vec<Attribute> {
        user_attributes()
    }

    async fn list(&self, client: &Client) -> Result<Vec<UserModel>, ApiError> {
        let users = client.users().list().await?;
        Ok(users.iter().map(UserModel::flatten).collect())
    }
}
