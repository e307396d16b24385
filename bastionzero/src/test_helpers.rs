//! Helpers shared by the resource and data source tests

#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::{ConfigureDataSourceRequest, DataSourceWithConfigure};
use tfplug::resource::{ConfigureResourceRequest, ResourceWithConfigure};
use tfplug::types::{Dynamic, DynamicValue};

use crate::api::Client;
use crate::BastionZeroProviderData;

pub fn provider_data(url: &str) -> BastionZeroProviderData {
    BastionZeroProviderData::new(Client::new(url, "test-secret").unwrap())
}

pub async fn configured_resource<R: ResourceWithConfigure>(mut resource: R, url: &str) -> R {
    let response = resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: Some(Arc::new(provider_data(url))),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());
    resource
}

pub async fn configured_data_source<D: DataSourceWithConfigure>(mut data_source: D, url: &str) -> D {
    let response = data_source
        .configure(
            Context::new(),
            ConfigureDataSourceRequest {
                provider_data: Some(Arc::new(provider_data(url))),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());
    data_source
}

/// Build an object value from attribute name and value pairs
pub fn object(pairs: &[(&str, Dynamic)]) -> DynamicValue {
    DynamicValue::new(Dynamic::Map(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<HashMap<_, _>>(),
    ))
}

pub fn string(value: &str) -> Dynamic {
    Dynamic::String(value.to_string())
}

pub fn strings(values: &[&str]) -> Dynamic {
    Dynamic::List(values.iter().map(|v| string(v)).collect())
}
