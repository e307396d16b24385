//! Environment API types

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::common::{nullable_string, nullable_vec, ApiResource, CreateIdResponse, MutableResource};

/// An environment groups targets and scopes policies
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub id: String,
    pub organization_id: String,
    #[serde(default)]
    pub is_default: bool,
    pub name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: String,
    pub time_created: DateTime<Utc>,
    pub offline_cleanup_timeout_hours: u32,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub targets: Vec<EnvironmentTarget>,
}

/// Target membership entry of an environment
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EnvironmentTarget {
    pub id: String,
    #[serde(rename = "type")]
    pub target_type: String,
}

/// Request body for POST /environments
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnvironmentRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offline_cleanup_timeout_hours: Option<u32>,
}

/// Request body for PATCH /environments/{id}
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyEnvironmentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offline_cleanup_timeout_hours: Option<u32>,
}

impl ApiResource for Environment {
    fn api_path() -> &'static str {
        "/environments"
    }
}

impl MutableResource for Environment {
    type CreateRequest = CreateEnvironmentRequest;
    type CreateResponse = CreateIdResponse;
    type ModifyRequest = ModifyEnvironmentRequest;
    type ModifyResponse = IgnoredAny;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Client;
    use mockito::{Matcher, Server};

    const ENVIRONMENT_JSON: &str = r#"{
        "id": "6f1a3d2e-5b7c-4d8e-9f01-23456789abcd",
        "organizationId": "org-1",
        "isDefault": false,
        "name": "prod",
        "description": null,
        "timeCreated": "2023-04-01T12:30:45.123Z",
        "offlineCleanupTimeoutHours": 2160,
        "targets": [{"id": "t-1", "type": "Bzero"}]
    }"#;

    #[test]
    fn environment_deserializes_with_null_description() {
        let env: Environment = serde_json::from_str(ENVIRONMENT_JSON).unwrap();
        assert_eq!(env.name, "prod");
        assert_eq!(env.description, "");
        assert_eq!(env.offline_cleanup_timeout_hours, 2160);
        assert_eq!(env.targets[0].target_type, "Bzero");
    }

    #[test]
    fn modify_request_omits_unset_fields() {
        let body = serde_json::to_value(ModifyEnvironmentRequest {
            description: Some("new".to_string()),
            offline_cleanup_timeout_hours: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"description": "new"}));
    }

    #[tokio::test]
    async fn environments_create_posts_camel_case_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/environments")
            .match_body(Matcher::Json(serde_json::json!({
                "name": "prod",
                "offlineCleanupTimeoutHours": 24
            })))
            .with_body(r#"{"id":"env-1"}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "secret").unwrap();
        let created = client
            .environments()
            .create(&CreateEnvironmentRequest {
                name: "prod".to_string(),
                description: None,
                offline_cleanup_timeout_hours: Some(24),
            })
            .await
            .unwrap();

        assert_eq!(created.id, "env-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn environments_get_fetches_by_id() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock(
                "GET",
                "/api/v2/environments/6f1a3d2e-5b7c-4d8e-9f01-23456789abcd",
            )
            .with_body(ENVIRONMENT_JSON)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "secret").unwrap();
        let env = client
            .environments()
            .get("6f1a3d2e-5b7c-4d8e-9f01-23456789abcd")
            .await
            .unwrap();
        assert_eq!(env.organization_id, "org-1");
    }
}
