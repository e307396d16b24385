//! Common types and utilities for the BastionZero API

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};
use std::marker::PhantomData;

use super::{ApiError, Client};

/// Error body returned by the API for failed requests
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub error_type: Option<String>,
    pub error_msg: Option<String>,
    pub message: Option<String>,
}

impl ApiErrorResponse {
    pub fn describe(&self) -> Option<String> {
        let message = self.error_msg.as_ref().or(self.message.as_ref())?;
        Some(match &self.error_type {
            Some(kind) => format!("{}: {}", kind, message),
            None => message.clone(),
        })
    }
}

/// Deserialize a JSON array that the API may send as null
pub fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a string that the API may send as null
pub fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// An object type addressable under a fixed collection path
pub trait ApiResource: DeserializeOwned + Send {
    fn api_path() -> &'static str;

    fn resource_path(id: &str) -> String {
        format!("{}/{}", Self::api_path(), urlencoding::encode(id))
    }
}

/// An object type the API lets us create, modify and delete
pub trait MutableResource: ApiResource {
    type CreateRequest: Serialize + Send + Sync;
    type CreateResponse: DeserializeOwned + Send;
    type ModifyRequest: Serialize + Send + Sync;
    type ModifyResponse: DeserializeOwned + Send;
}

/// Response of create calls that only echo the new object's id
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTargetResponse {
    pub target_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateIdResponse {
    pub id: String,
}

/// Typed operations for one object type
pub struct Service<'a, T> {
    client: &'a Client,
    _marker: PhantomData<T>,
}

impl<'a, T: ApiResource> Service<'a, T> {
    pub fn new(client: &'a Client) -> Self {
        Self {
            client,
            _marker: PhantomData,
        }
    }

    /// GET {path}
    pub async fn list(&self) -> Result<Vec<T>, ApiError> {
        self.client.get(T::api_path()).await
    }

    /// GET {path}/{id}
    pub async fn get(&self, id: &str) -> Result<T, ApiError> {
        self.client.get(&T::resource_path(id)).await
    }
}

impl<'a, T: MutableResource> Service<'a, T> {
    /// POST {path}
    pub async fn create(&self, request: &T::CreateRequest) -> Result<T::CreateResponse, ApiError> {
        self.client.post(T::api_path(), request).await
    }

    /// PATCH {path}/{id}
    pub async fn modify(
        &self,
        id: &str,
        request: &T::ModifyRequest,
    ) -> Result<T::ModifyResponse, ApiError> {
        self.client.patch(&T::resource_path(id), request).await
    }

    /// DELETE {path}/{id}
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .delete::<IgnoredAny>(&T::resource_path(id))
            .await
            .map(|_| ())
    }
}
