//! Managed resources and the helpers they share

pub mod environment;
pub mod policy;
pub mod target;

pub use environment::EnvironmentResource;
pub use policy::PolicyResource;
pub use target::VirtualTargetResource;

use chrono::{DateTime, SecondsFormat, Utc};
use std::any::Any;
use std::sync::Arc;
use tfplug::types::Diagnostic;
use tfplug::TfplugError;

use crate::api::ApiError;
use crate::BastionZeroProviderData;

/// Extract the provider data handed to a resource or data source. A missing
/// value is not an error: validation runs before the provider is configured.
pub(crate) fn configure_provider_data(
    provider_data: Option<Arc<dyn Any + Send + Sync>>,
) -> (Option<BastionZeroProviderData>, Vec<Diagnostic>) {
    let Some(data) = provider_data else {
        return (None, vec![]);
    };

    match data.downcast_ref::<BastionZeroProviderData>() {
        Some(provider_data) => (Some(provider_data.clone()), vec![]),
        None => (
            None,
            vec![Diagnostic::error(
                "Invalid provider data",
                "Failed to extract BastionZeroProviderData from provider data",
            )],
        ),
    }
}

pub(crate) fn not_configured() -> Diagnostic {
    Diagnostic::error(
        "Provider not configured",
        "Provider data was not properly configured",
    )
}

pub(crate) fn api_error(summary: impl Into<String>, err: &ApiError) -> Diagnostic {
    Diagnostic::error(summary, format!("API error: {}", err))
}

pub(crate) fn model_error(summary: impl Into<String>, err: &TfplugError) -> Diagnostic {
    Diagnostic::error(summary, format!("Invalid value: {}", err))
}

/// RFC 3339 in UTC with second precision
pub(crate) fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Collections that are empty in the API keep the null the user wrote
pub(crate) fn normalize_empty<T>(value: Option<Vec<T>>, prior: &Option<Vec<T>>) -> Option<Vec<T>> {
    match value {
        Some(items) if items.is_empty() && prior.is_none() => None,
        other => other,
    }
}
