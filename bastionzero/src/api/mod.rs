//! BastionZero REST API client
//!
//! The client speaks to `/api/v2` with an API key secret. Each object type
//! implements [`common::ApiResource`] and is reached through a typed
//! [`common::Service`], e.g. `client.policies().jit().get(id)`.

pub mod client;
pub mod common;
pub mod environments;
pub mod error;
pub mod groups;
pub mod policies;
pub mod service_accounts;
pub mod targets;
pub mod users;

pub use client::{Client, RetryConfig, DEFAULT_HOST};
pub use common::{ApiResource, MutableResource, Service};
pub use error::ApiError;
