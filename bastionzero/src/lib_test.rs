#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use super::*;
use crate::test_helpers::{object, string};
use serial_test::serial;
use tfplug::types::{ClientCapabilities, Dynamic, DynamicValue};

fn configure_request(config: DynamicValue) -> ConfigureProviderRequest {
    ConfigureProviderRequest {
        terraform_version: "1.9.0".to_string(),
        config,
        client_capabilities: ClientCapabilities::default(),
    }
}

fn configured_base_url(response: &ConfigureProviderResponse) -> String {
    let data = response.provider_data.clone().unwrap();
    let data = data.downcast_ref::<BastionZeroProviderData>().unwrap();
    data.client.base_url().to_string()
}

#[tokio::test]
async fn schema_marks_secret_sensitive() {
    let provider = BastionZeroProvider::new();
    assert_eq!(provider.type_name(), "bastionzero");

    let response = provider
        .schema(Context::new(), ProviderSchemaRequest)
        .await;
    assert!(response.diagnostics.is_empty());

    let secret = response.schema.attribute("api_secret").unwrap();
    assert!(secret.optional);
    assert!(secret.sensitive);

    let endpoint = response.schema.attribute("api_endpoint").unwrap();
    assert!(endpoint.optional);
    assert!(!endpoint.sensitive);
}

#[test]
fn registers_every_resource() {
    let mut names: Vec<String> = BastionZeroProvider::new().resources().into_keys().collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "bastionzero_db_target",
            "bastionzero_environment",
            "bastionzero_jit_policy",
            "bastionzero_kubernetes_policy",
            "bastionzero_proxy_policy",
            "bastionzero_session_recording_policy",
            "bastionzero_target_connect_policy",
            "bastionzero_web_target",
        ]
    );
}

#[test]
fn registers_every_data_source() {
    let data_sources = BastionZeroProvider::new().data_sources();
    assert_eq!(data_sources.len(), 27);

    for name in [
        "bastionzero_environment",
        "bastionzero_environments",
        "bastionzero_bzero_target",
        "bastionzero_bzero_targets",
        "bastionzero_cluster_target",
        "bastionzero_cluster_targets",
        "bastionzero_db_target",
        "bastionzero_db_targets",
        "bastionzero_web_target",
        "bastionzero_web_targets",
        "bastionzero_dynamic_access_config",
        "bastionzero_dynamic_access_configs",
        "bastionzero_user",
        "bastionzero_users",
        "bastionzero_service_account",
        "bastionzero_service_accounts",
        "bastionzero_groups",
        "bastionzero_jit_policy",
        "bastionzero_jit_policies",
        "bastionzero_kubernetes_policy",
        "bastionzero_kubernetes_policies",
        "bastionzero_proxy_policy",
        "bastionzero_proxy_policies",
        "bastionzero_session_recording_policy",
        "bastionzero_session_recording_policies",
        "bastionzero_target_connect_policy",
        "bastionzero_target_connect_policies",
    ] {
        assert!(data_sources.contains_key(name), "missing {}", name);
    }
}

#[test]
fn factories_build_matching_type_names() {
    let provider = BastionZeroProvider::new();
    for (name, factory) in provider.resources() {
        assert_eq!(factory().type_name(), name);
    }
    for (name, factory) in provider.data_sources() {
        assert_eq!(factory().type_name(), name);
    }
}

#[tokio::test]
#[serial]
async fn configure_uses_explicit_values() {
    std::env::remove_var(HOST_ENV_VAR);
    std::env::remove_var(API_SECRET_ENV_VAR);

    let mut provider = BastionZeroProvider::new();
    let response = provider
        .configure(
            Context::new(),
            configure_request(object(&[
                ("api_endpoint", string("https://bz.example.com/")),
                ("api_secret", string("secret")),
            ])),
        )
        .await;

    assert!(response.diagnostics.is_empty());
    assert_eq!(
        configured_base_url(&response),
        "https://bz.example.com/api/v2"
    );
}

#[tokio::test]
#[serial]
async fn configure_falls_back_to_environment() {
    std::env::set_var(HOST_ENV_VAR, "https://env.example.com");
    std::env::set_var(API_SECRET_ENV_VAR, "env-secret");

    let mut provider = BastionZeroProvider::new();
    let response = provider
        .configure(
            Context::new(),
            configure_request(object(&[
                ("api_endpoint", Dynamic::Null),
                ("api_secret", Dynamic::Null),
            ])),
        )
        .await;

    std::env::remove_var(HOST_ENV_VAR);
    std::env::remove_var(API_SECRET_ENV_VAR);

    assert!(response.diagnostics.is_empty());
    assert_eq!(
        configured_base_url(&response),
        "https://env.example.com/api/v2"
    );
}

#[tokio::test]
#[serial]
async fn configure_defaults_the_endpoint() {
    std::env::remove_var(HOST_ENV_VAR);
    std::env::set_var(API_SECRET_ENV_VAR, "env-secret");

    let mut provider = BastionZeroProvider::new();
    let response = provider
        .configure(Context::new(), configure_request(DynamicValue::object()))
        .await;

    std::env::remove_var(API_SECRET_ENV_VAR);

    assert!(response.diagnostics.is_empty());
    assert!(configured_base_url(&response).starts_with(DEFAULT_HOST));
}

#[tokio::test]
#[serial]
async fn configure_requires_a_secret() {
    std::env::remove_var(API_SECRET_ENV_VAR);

    let mut provider = BastionZeroProvider::new();
    let response = provider
        .configure(
            Context::new(),
            configure_request(object(&[("api_secret", string(""))])),
        )
        .await;

    assert!(response.provider_data.is_none());
    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].summary, "Missing API secret");
}

#[tokio::test]
#[serial]
async fn configure_rejects_bad_endpoint() {
    let mut provider = BastionZeroProvider::new();
    let response = provider
        .configure(
            Context::new(),
            configure_request(object(&[
                ("api_endpoint", string("ftp://bz.example.com")),
                ("api_secret", string("secret")),
            ])),
        )
        .await;

    assert!(response.provider_data.is_none());
    assert_eq!(
        response.diagnostics[0].summary,
        "Failed to create API client"
    );
}
