#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use super::*;
use crate::api::targets::WebTarget;
use crate::api::MutableResource;
use crate::resources::target::VirtualTargetResource;
use crate::test_helpers::{configured_resource, object, string};
use mockito::{Matcher, Server};
use tfplug::context::Context;
use tfplug::resource::{
    CreateResourceRequest, DeleteResourceRequest, ReadResourceRequest, Resource,
    UpdateResourceRequest,
};
use tfplug::types::{AttributePath, ClientCapabilities, Dynamic, DynamicValue};

const TARGET_ID: &str = "5d4c3b2a-1f0e-4d9c-8b7a-6f5e4d3c2b1a";
const ENV_ID: &str = "6f1a3d2e-5b7c-4d8e-9f01-23456789abcd";
const OTHER_ENV_ID: &str = "0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d";
const PROXY_ID: &str = "1b2c3d4e-5f60-4718-9a2b-3c4d5e6f7a8b";

type DbTargetResource = VirtualTargetResource<DbTargetKind>;

fn target_json(environment_id: &str) -> String {
    serde_json::json!({
        "id": TARGET_ID,
        "name": "tf-postgres",
        "type": "Db",
        "status": "Online",
        "environmentId": environment_id,
        "lastAgentUpdate": "2024-02-10T08:15:30.5Z",
        "agentVersion": "7.3.0",
        "region": "eastus",
        "agentPublicKey": "pubkey",
        "proxyTargetId": PROXY_ID,
        "remoteHost": "db.internal",
        "remotePort": {"value": 5432},
        "localPort": {"value": null},
        "isSplitCert": false,
        "databaseType": null
    })
    .to_string()
}

fn planned() -> DynamicValue {
    object(&[
        ("id", Dynamic::Unknown),
        ("name", string("tf-postgres")),
        ("environment_id", string(ENV_ID)),
        ("proxy_target_id", string(PROXY_ID)),
        ("remote_host", string("db.internal")),
        ("remote_port", Dynamic::Number(5432.0)),
        ("local_port", Dynamic::Null),
        ("is_split_cert", Dynamic::Bool(false)),
        ("database_type", Dynamic::Null),
        ("status", Dynamic::Unknown),
        ("last_agent_update", Dynamic::Unknown),
        ("agent_version", Dynamic::Unknown),
        ("region", Dynamic::Unknown),
        ("agent_public_key", Dynamic::Unknown),
        ("type", Dynamic::Unknown),
    ])
}

fn prior_state() -> DynamicValue {
    let target: DbTarget = serde_json::from_str(&target_json(ENV_ID)).unwrap();
    DynamicValue::from_model(&DbTargetKind::flatten(&target)).unwrap()
}

#[test]
fn db_schema_marks_proxy_change_as_replacement() {
    let schema = DbTargetResource::schema_static();
    assert_eq!(schema.attribute("proxy_target_id").unwrap().plan_modifiers.len(), 1);
    assert!(schema
        .attribute("environment_id")
        .unwrap()
        .plan_modifiers
        .is_empty());
    let split = schema.attribute("is_split_cert").unwrap();
    assert!(split.optional && split.computed && split.default.is_some());
    assert!(schema.attribute("database_type").unwrap().optional);
}

#[test]
fn create_request_carries_ports_and_split_cert() {
    let model: DbTargetModel = planned().to_model().unwrap();
    let body = serde_json::to_value(DbTargetKind::create_request(&model)).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "targetName": "tf-postgres",
            "proxyTargetId": PROXY_ID,
            "remoteHost": "db.internal",
            "remotePort": {"value": 5432},
            "localPort": {"value": null},
            "environmentId": ENV_ID,
            "isSplitCert": false
        })
    );
}

#[tokio::test]
async fn create_posts_then_reads_target() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", "/api/v2/targets/database")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "targetName": "tf-postgres",
            "remotePort": {"value": 5432}
        })))
        .with_body(format!(r#"{{"targetId":"{}"}}"#, TARGET_ID))
        .create_async()
        .await;
    let get = server
        .mock("GET", format!("/api/v2/targets/database/{}", TARGET_ID).as_str())
        .with_body(target_json(ENV_ID))
        .create_async()
        .await;

    let resource = configured_resource(DbTargetResource::new(), &server.url()).await;
    let plan = planned();
    let response = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "bastionzero_db_target".to_string(),
                planned_state: plan.clone(),
                config: plan,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let state = response.new_state;
    assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), TARGET_ID);
    assert_eq!(state.get_string(&AttributePath::new("type")).unwrap(), "Db");
    assert_eq!(
        state.get_string(&AttributePath::new("last_agent_update")).unwrap(),
        "2024-02-10T08:15:30Z"
    );
    assert_eq!(
        state.get_number(&AttributePath::new("remote_port")).unwrap(),
        5432.0
    );
    assert!(state.get(&AttributePath::new("local_port")).is_null());
    assert!(state.get(&AttributePath::new("database_type")).is_null());
    create.assert_async().await;
    get.assert_async().await;
}

fn assert_send<T: Send>() {}

#[test]
fn request_bodies_can_cross_threads() {
    assert_send::<<DbTarget as MutableResource>::CreateRequest>();
    assert_send::<<DbTarget as MutableResource>::ModifyRequest>();
    assert_send::<<WebTarget as MutableResource>::CreateRequest>();
    assert_send::<<WebTarget as MutableResource>::ModifyRequest>();
}

#[tokio::test]
async fn create_and_update_run_on_spawned_tasks() {
    let mut server = Server::new_async().await;
    let _create = server
        .mock("POST", "/api/v2/targets/database")
        .with_body(format!(r#"{{"targetId":"{}"}}"#, TARGET_ID))
        .create_async()
        .await;
    let _patch = server
        .mock("PATCH", format!("/api/v2/targets/database/{}", TARGET_ID).as_str())
        .with_body("{}")
        .create_async()
        .await;
    let _get = server
        .mock("GET", format!("/api/v2/targets/database/{}", TARGET_ID).as_str())
        .with_body(target_json(ENV_ID))
        .create_async()
        .await;

    let resource = configured_resource(DbTargetResource::new(), &server.url()).await;
    let created = tokio::spawn(async move {
        let plan = planned();
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "bastionzero_db_target".to_string(),
                    planned_state: plan.clone(),
                    config: plan,
                    planned_private: vec![],
                    provider_meta: None,
                },
            )
            .await;
        (resource, response)
    })
    .await
    .unwrap();
    let (resource, response) = created;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);

    let mut plan = prior_state();
    plan.set_string(&AttributePath::new("name"), "tf-renamed".to_string())
        .unwrap();
    let response = tokio::spawn(async move {
        resource
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: "bastionzero_db_target".to_string(),
                    prior_state: prior_state(),
                    planned_state: plan.clone(),
                    config: plan,
                    planned_private: vec![],
                    provider_meta: None,
                },
            )
            .await
    })
    .await
    .unwrap();
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
}

#[tokio::test]
async fn create_keeps_id_when_read_back_fails() {
    let mut server = Server::new_async().await;
    let _create = server
        .mock("POST", "/api/v2/targets/database")
        .with_body(format!(r#"{{"targetId":"{}"}}"#, TARGET_ID))
        .create_async()
        .await;
    let _get = server
        .mock("GET", format!("/api/v2/targets/database/{}", TARGET_ID).as_str())
        .with_status(400)
        .with_body("bad request")
        .create_async()
        .await;

    let resource = configured_resource(DbTargetResource::new(), &server.url()).await;
    let plan = planned();
    let response = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "bastionzero_db_target".to_string(),
                planned_state: plan.clone(),
                config: plan,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;

    assert_eq!(response.diagnostics[0].summary, "Failed to read database target");
    assert_eq!(
        response
            .new_state
            .get_string(&AttributePath::new("id"))
            .unwrap(),
        TARGET_ID
    );
}

#[tokio::test]
async fn read_removes_missing_target() {
    let mut server = Server::new_async().await;
    let _get = server
        .mock("GET", format!("/api/v2/targets/database/{}", TARGET_ID).as_str())
        .with_status(404)
        .create_async()
        .await;

    let resource = configured_resource(DbTargetResource::new(), &server.url()).await;
    let response = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "bastionzero_db_target".to_string(),
                current_state: prior_state(),
                private: vec![],
                provider_meta: None,
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;

    assert!(response.diagnostics.is_empty());
    assert!(response.new_state.is_none());
}

#[tokio::test]
async fn environment_change_is_patched_in_place() {
    let mut server = Server::new_async().await;
    let patch = server
        .mock("PATCH", format!("/api/v2/targets/database/{}", TARGET_ID).as_str())
        .match_body(Matcher::Json(serde_json::json!({
            "environmentId": OTHER_ENV_ID
        })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let _get = server
        .mock("GET", format!("/api/v2/targets/database/{}", TARGET_ID).as_str())
        .with_body(target_json(OTHER_ENV_ID))
        .create_async()
        .await;

    let resource = configured_resource(DbTargetResource::new(), &server.url()).await;
    let mut plan = prior_state();
    plan.set_string(&AttributePath::new("environment_id"), OTHER_ENV_ID.to_string())
        .unwrap();

    let response = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: "bastionzero_db_target".to_string(),
                prior_state: prior_state(),
                planned_state: plan.clone(),
                config: plan,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(
        response
            .new_state
            .get_string(&AttributePath::new("environment_id"))
            .unwrap(),
        OTHER_ENV_ID
    );
    patch.assert_async().await;
}

#[tokio::test]
async fn delete_removes_target() {
    let mut server = Server::new_async().await;
    let delete = server
        .mock("DELETE", format!("/api/v2/targets/database/{}", TARGET_ID).as_str())
        .with_status(204)
        .create_async()
        .await;

    let resource = configured_resource(DbTargetResource::new(), &server.url()).await;
    let response = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "bastionzero_db_target".to_string(),
                prior_state: prior_state(),
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;

    assert!(response.diagnostics.is_empty());
    delete.assert_async().await;
}

#[test]
fn split_cert_toggle_is_sent_with_database_type() {
    let prior: DbTargetModel = prior_state().to_model().unwrap();
    let mut plan = prior.clone();
    plan.is_split_cert = Some(true);
    plan.database_type = Some("Postgres".to_string());

    let body = serde_json::to_value(DbTargetKind::modify_request(&plan, &prior)).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"isSplitCert": true, "databaseType": "Postgres"})
    );
}
