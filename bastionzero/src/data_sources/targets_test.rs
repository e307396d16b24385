#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use super::*;
use crate::datasource::{ListDataSource, SingleDataSource};
use crate::resources::target::{DbTargetKind, WebTargetKind};
use crate::test_helpers::{configured_data_source, object, string};
use mockito::Server;
use tfplug::context::Context;
use tfplug::data_source::{DataSource, ReadDataSourceRequest};
use tfplug::types::{AttributePath, ClientCapabilities};

const TARGET_ID: &str = "5d4c3b2a-1f0e-4d9c-8b7a-6f5e4d3c2b1a";

fn read_request(type_name: &str, config: DynamicValue) -> ReadDataSourceRequest {
    ReadDataSourceRequest {
        type_name: type_name.to_string(),
        config,
        provider_meta: None,
        client_capabilities: ClientCapabilities::default(),
    }
}

fn agent_fields(id: &str, name: &str, target_type: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "type": target_type,
        "status": "Online",
        "environmentId": "e-1",
        "lastAgentUpdate": "2023-05-01T10:00:00.250Z",
        "agentVersion": "7.4.0",
        "region": "us-east-1",
        "agentPublicKey": "pk"
    })
}

#[test]
fn bzero_data_source_schema_is_computed() {
    let schema = SingleDataSource::<TargetSource<BzeroTarget>>::schema_static();
    assert!(schema.attribute("id").unwrap().required);
    for name in ["name", "status", "control_channel_id", "last_agent_update"] {
        assert!(schema.attribute(name).unwrap().computed, "{}", name);
    }
}

#[test]
fn db_data_source_reuses_resource_attributes() {
    let schema = SingleDataSource::<VirtualTargetSource<DbTargetKind>>::schema_static();
    let remote_port = schema.attribute("remote_port").unwrap();
    assert!(remote_port.computed && !remote_port.required);
    assert!(remote_port.validators.is_empty());
    assert!(schema.attribute("is_split_cert").unwrap().default.is_none());
}

#[tokio::test]
async fn bzero_target_read_flattens_agent_fields() {
    let mut server = Server::new_async().await;
    let mut body = agent_fields(TARGET_ID, "web-01", "Bzero");
    body["controlChannelId"] = serde_json::json!("cc-1");
    let _get = server
        .mock("GET", format!("/api/v2/targets/bzero/{}", TARGET_ID).as_str())
        .with_body(body.to_string())
        .create_async()
        .await;

    let data_source = configured_data_source(
        SingleDataSource::<TargetSource<BzeroTarget>>::new(),
        &server.url(),
    )
    .await;
    let response = data_source
        .read(
            Context::new(),
            read_request("bastionzero_bzero_target", object(&[("id", string(TARGET_ID))])),
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let state = response.state;
    assert_eq!(
        state.get_string(&AttributePath::new("control_channel_id")).unwrap(),
        "cc-1"
    );
    assert_eq!(
        state.get_string(&AttributePath::new("last_agent_update")).unwrap(),
        "2023-05-01T10:00:00Z"
    );
}

#[tokio::test]
async fn dynamic_access_configs_list_target_users() {
    let mut server = Server::new_async().await;
    let mut dac = agent_fields(TARGET_ID, "dac", "DynamicAccessConfig");
    dac["startWebhook"] = serde_json::json!("https://hooks.example.com/start");
    dac["stopWebhook"] = serde_json::json!("https://hooks.example.com/stop");
    dac["healthWebhook"] = serde_json::json!(null);
    dac["allowedTargetUsers"] = serde_json::json!([{"userName": "ubuntu"}]);
    let _list = server
        .mock("GET", "/api/v2/targets/dynamic-access-configs")
        .with_body(serde_json::json!([dac]).to_string())
        .create_async()
        .await;

    let data_source = configured_data_source(
        ListDataSource::<TargetsSource<DynamicAccessConfig>>::new(),
        &server.url(),
    )
    .await;
    let response = data_source
        .read(
            Context::new(),
            read_request("bastionzero_dynamic_access_configs", object(&[])),
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let first = AttributePath::new("targets").index(0);
    assert_eq!(
        response
            .state
            .get_string(&first.clone().attribute("health_webhook"))
            .unwrap(),
        ""
    );
    assert_eq!(
        response
            .state
            .get_list(&first.attribute("allowed_target_users"))
            .unwrap(),
        vec![string("ubuntu")]
    );
}

#[tokio::test]
async fn web_targets_list_reads_ports() {
    let mut server = Server::new_async().await;
    let mut web = agent_fields(TARGET_ID, "grafana", "Web");
    web["proxyTargetId"] = serde_json::json!("b-1");
    web["remoteHost"] = serde_json::json!("http://localhost");
    web["remotePort"] = serde_json::json!({"value": 3000});
    web["localPort"] = serde_json::json!({"value": 3001});
    let _list = server
        .mock("GET", "/api/v2/targets/web")
        .with_body(serde_json::json!([web]).to_string())
        .create_async()
        .await;

    let data_source = configured_data_source(
        ListDataSource::<VirtualTargetsSource<WebTargetKind>>::new(),
        &server.url(),
    )
    .await;
    let response = data_source
        .read(Context::new(), read_request("bastionzero_web_targets", object(&[])))
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(
        response
            .state
            .get_number(&AttributePath::new("targets").index(0).attribute("local_port"))
            .unwrap(),
        3001.0
    );
}

#[tokio::test]
async fn missing_cluster_target_is_an_error() {
    let mut server = Server::new_async().await;
    let _get = server
        .mock("GET", format!("/api/v2/targets/cluster/{}", TARGET_ID).as_str())
        .with_status(404)
        .create_async()
        .await;

    let data_source = configured_data_source(
        SingleDataSource::<TargetSource<ClusterTarget>>::new(),
        &server.url(),
    )
    .await;
    let response = data_source
        .read(
            Context::new(),
            read_request("bastionzero_cluster_target", object(&[("id", string(TARGET_ID))])),
        )
        .await;

    assert_eq!(response.diagnostics[0].summary, "cluster target not found");
}
