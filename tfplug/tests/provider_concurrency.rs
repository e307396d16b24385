//! Concurrency tests for the provider service

#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use tfplug::context::Context;
use tfplug::grpc::GrpcProviderServer;
use tfplug::proto;
use tfplug::proto::provider_server::Provider as _;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderSchemaRequest, ProviderSchemaResponse, ResourceFactory,
};
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Dynamic, DynamicValue};
use tonic::Request;

// Track concurrent operations
#[derive(Default)]
struct OperationStats {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    configured: AtomicUsize,
}

impl OperationStats {
    fn start(&self) {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
    }

    fn end(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

struct TrackingProvider {
    stats: Arc<OperationStats>,
}

#[async_trait]
impl Provider for TrackingProvider {
    fn type_name(&self) -> &str {
        "tracking"
    }

    async fn schema(&self, _ctx: Context, _request: ProviderSchemaRequest) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: SchemaBuilder::new().build(),
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        _request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        ConfigureProviderResponse {
            diagnostics: vec![],
            provider_data: Some(self.stats.clone()),
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut factories: HashMap<String, ResourceFactory> = HashMap::new();
        factories.insert(
            "tracking_slow".to_string(),
            Box::new(|| Box::new(SlowResource::default()) as Box<dyn ResourceWithConfigure>),
        );
        factories
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        HashMap::new()
    }
}

#[derive(Default)]
struct SlowResource {
    stats: Option<Arc<OperationStats>>,
}

#[async_trait]
impl Resource for SlowResource {
    fn type_name(&self) -> &str {
        "tracking_slow"
    }

    async fn schema(&self, _ctx: Context, _request: ResourceSchemaRequest) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: SchemaBuilder::new()
                .attribute(
                    AttributeBuilder::new("id", AttributeType::String)
                        .computed()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("name", AttributeType::String)
                        .required()
                        .build(),
                )
                .build(),
            diagnostics: vec![],
        }
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let stats = self.stats.as_ref().unwrap();
        stats.start();
        sleep(Duration::from_millis(50)).await;
        stats.end();

        let mut state = request.planned_state;
        let name = state.get_string(&AttributePath::new("name")).unwrap();
        state
            .set_string(&AttributePath::new("id"), format!("id-{}", name))
            .unwrap();
        CreateResourceResponse {
            new_state: state,
            private: vec![],
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        ReadResourceResponse {
            new_state: Some(request.current_state),
            diagnostics: vec![],
            private: vec![],
            deferred: None,
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        UpdateResourceResponse {
            new_state: request.planned_state,
            private: vec![],
            diagnostics: vec![],
        }
    }

    async fn delete(&self, _ctx: Context, _request: DeleteResourceRequest) -> DeleteResourceResponse {
        DeleteResourceResponse {
            diagnostics: vec![],
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for SlowResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        self.stats = request
            .provider_data
            .and_then(|data| data.downcast::<OperationStats>().ok());
        if let Some(stats) = &self.stats {
            stats.configured.fetch_add(1, Ordering::SeqCst);
        }
        ConfigureResourceResponse {
            diagnostics: vec![],
        }
    }
}

fn encode(value: &DynamicValue) -> Option<proto::DynamicValue> {
    Some(proto::DynamicValue {
        msgpack: value.encode_msgpack().unwrap(),
        json: vec![],
    })
}

#[tokio::test]
async fn resources_are_created_per_request_and_run_concurrently() {
    let stats = Arc::new(OperationStats::default());
    let server = Arc::new(GrpcProviderServer::new(TrackingProvider {
        stats: stats.clone(),
    }));

    server
        .configure_provider(Request::new(proto::configure_provider::Request {
            terraform_version: "1.9.0".to_string(),
            config: encode(&DynamicValue::object()),
            client_capabilities: None,
        }))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..5 {
        let server = server.clone();
        handles.push(tokio::spawn(async move {
            let planned = DynamicValue::new(Dynamic::Map(HashMap::from([
                ("name".to_string(), Dynamic::String(format!("r{}", i))),
                ("id".to_string(), Dynamic::Unknown),
            ])));
            server
                .apply_resource_change(Request::new(proto::apply_resource_change::Request {
                    type_name: "tracking_slow".to_string(),
                    prior_state: encode(&DynamicValue::null()),
                    planned_state: encode(&planned),
                    config: encode(&planned),
                    planned_private: vec![],
                    provider_meta: None,
                    planned_identity: None,
                }))
                .await
                .unwrap()
                .into_inner()
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        let response = handle.await.unwrap();
        assert!(response.diagnostics.is_empty());
        let state = DynamicValue::decode_msgpack(&response.new_state.unwrap().msgpack).unwrap();
        ids.push(state.get_string(&AttributePath::new("id")).unwrap());
    }
    ids.sort();

    assert_eq!(ids, vec!["id-r0", "id-r1", "id-r2", "id-r3", "id-r4"]);
    assert_eq!(stats.configured.load(Ordering::SeqCst), 5);
    assert!(stats.max_in_flight.load(Ordering::SeqCst) > 1);
}
