//! Drives the provider through the gRPC service the way Terraform does

#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use std::collections::HashMap;

use bastionzero::BastionZeroProvider;
use mockito::{Matcher, Server};
use tfplug::grpc::GrpcProviderServer;
use tfplug::proto;
use tfplug::proto::provider_server::Provider as _;
use tfplug::types::{AttributePath, Dynamic, DynamicValue};
use tonic::Request;

const ENV_ID: &str = "6f1a3d2e-5b7c-4d8e-9f01-23456789abcd";

fn encode(value: &DynamicValue) -> Option<proto::DynamicValue> {
    Some(proto::DynamicValue {
        msgpack: value.encode_msgpack().unwrap(),
        json: vec![],
    })
}

fn decode(value: Option<proto::DynamicValue>) -> DynamicValue {
    DynamicValue::decode_msgpack(&value.unwrap().msgpack).unwrap()
}

fn object(pairs: &[(&str, Dynamic)]) -> DynamicValue {
    DynamicValue::new(Dynamic::Map(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<HashMap<_, _>>(),
    ))
}

fn environment_json() -> serde_json::Value {
    serde_json::json!({
        "id": ENV_ID,
        "organizationId": "org-1",
        "isDefault": false,
        "name": "tf-acc-test-env",
        "description": "managed by terraform",
        "timeCreated": "2023-04-01T12:30:45.123Z",
        "offlineCleanupTimeoutHours": 2160,
        "targets": []
    })
}

async fn configured_server(url: &str) -> GrpcProviderServer<BastionZeroProvider> {
    let server = GrpcProviderServer::new(BastionZeroProvider::new());
    let response = server
        .configure_provider(Request::new(proto::configure_provider::Request {
            terraform_version: "1.9.0".to_string(),
            config: encode(&object(&[
                ("api_endpoint", Dynamic::String(url.to_string())),
                ("api_secret", Dynamic::String("test-secret".to_string())),
            ])),
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(response.diagnostics.is_empty());
    server
}

#[tokio::test]
async fn schema_lists_all_resources_and_data_sources() {
    let server = GrpcProviderServer::new(BastionZeroProvider::new());
    let response = server
        .get_provider_schema(Request::new(proto::get_provider_schema::Request {}))
        .await
        .unwrap()
        .into_inner();

    assert!(response.diagnostics.is_empty());
    assert_eq!(response.resource_schemas.len(), 8);
    assert_eq!(response.data_source_schemas.len(), 27);
    assert!(response
        .resource_schemas
        .contains_key("bastionzero_target_connect_policy"));
    assert!(response
        .data_source_schemas
        .contains_key("bastionzero_dynamic_access_configs"));
}

#[tokio::test]
async fn environment_create_list_and_delete() {
    let mut api = Server::new_async().await;
    let server = configured_server(&api.url()).await;

    let create = api
        .mock("POST", "/api/v2/environments")
        .match_header("x-api-key", "test-secret")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "name": "tf-acc-test-env",
            "description": "managed by terraform",
            "offlineCleanupTimeoutHours": 2160
        })))
        .with_status(201)
        .with_body(format!(r#"{{"id":"{}"}}"#, ENV_ID))
        .create_async()
        .await;
    let get = api
        .mock("GET", format!("/api/v2/environments/{}", ENV_ID).as_str())
        .with_body(environment_json().to_string())
        .create_async()
        .await;

    let planned = object(&[
        ("id", Dynamic::Unknown),
        ("name", Dynamic::String("tf-acc-test-env".to_string())),
        (
            "description",
            Dynamic::String("managed by terraform".to_string()),
        ),
        ("offline_cleanup_timeout_hours", Dynamic::Number(2160.0)),
        ("organization_id", Dynamic::Unknown),
        ("is_default", Dynamic::Unknown),
        ("time_created", Dynamic::Unknown),
        ("targets", Dynamic::Unknown),
    ]);
    let response = server
        .apply_resource_change(Request::new(proto::apply_resource_change::Request {
            type_name: "bastionzero_environment".to_string(),
            prior_state: encode(&DynamicValue::null()),
            planned_state: encode(&planned),
            config: encode(&planned),
            planned_private: vec![],
            provider_meta: None,
            planned_identity: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(response.diagnostics.is_empty());
    let state = decode(response.new_state);
    assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), ENV_ID);
    assert_eq!(
        state
            .get_string(&AttributePath::new("organization_id"))
            .unwrap(),
        "org-1"
    );
    assert_eq!(
        state.get_string(&AttributePath::new("time_created")).unwrap(),
        "2023-04-01T12:30:45Z"
    );
    create.assert_async().await;
    get.assert_async().await;

    let list = api
        .mock("GET", "/api/v2/environments")
        .with_body(serde_json::json!([environment_json()]).to_string())
        .create_async()
        .await;
    let response = server
        .read_data_source(Request::new(proto::read_data_source::Request {
            type_name: "bastionzero_environments".to_string(),
            config: encode(&DynamicValue::object()),
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(response.diagnostics.is_empty());
    let listed = decode(response.state);
    let environments = listed
        .get_list(&AttributePath::new("environments"))
        .unwrap();
    assert_eq!(environments.len(), 1);
    list.assert_async().await;

    let delete = api
        .mock("DELETE", format!("/api/v2/environments/{}", ENV_ID).as_str())
        .with_status(200)
        .create_async()
        .await;
    let response = server
        .apply_resource_change(Request::new(proto::apply_resource_change::Request {
            type_name: "bastionzero_environment".to_string(),
            prior_state: encode(&state),
            planned_state: encode(&DynamicValue::null()),
            config: encode(&DynamicValue::null()),
            planned_private: vec![],
            provider_meta: None,
            planned_identity: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(response.diagnostics.is_empty());
    assert!(decode(response.new_state).is_null());
    delete.assert_async().await;
}

#[tokio::test]
async fn data_source_lookup_reports_missing_object() {
    let mut api = Server::new_async().await;
    let server = configured_server(&api.url()).await;

    let _get = api
        .mock("GET", format!("/api/v2/environments/{}", ENV_ID).as_str())
        .with_status(404)
        .create_async()
        .await;

    let response = server
        .read_data_source(Request::new(proto::read_data_source::Request {
            type_name: "bastionzero_environment".to_string(),
            config: encode(&object(&[("id", Dynamic::String(ENV_ID.to_string()))])),
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].summary, "environment not found");
}
