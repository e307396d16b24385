//! Policy data sources, one pair per policy kind

use async_trait::async_trait;
use std::marker::PhantomData;
use tfplug::schema::Attribute;
use tfplug::types::DynamicValue;

use crate::api::{ApiError, Client};
use crate::datasource::{string_parameter, ListSource, SingleSource};
use crate::resources::policy::{policy_attributes, PolicyKind};

pub struct PolicySource<K: PolicyKind>(PhantomData<K>);

impl<K: PolicyKind> Default for PolicySource<K> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

#[async_trait]
impl<K: PolicyKind> SingleSource for PolicySource<K> {
    type Record = K::Model;

    const TYPE_NAME: &'static str = K::TYPE_NAME;
    const NOUN: &'static str = K::NOUN;

    fn attributes() -> Vec<Attribute> {
        policy_attributes::<K>()
    }

    async fn fetch(&self, client: &Client, config: &DynamicValue) -> Result<K::Model, ApiError> {
        let policy = client
            .service::<K::Api>()
            .get(&string_parameter(config, "id"))
            .await?;
        Ok(K::flatten(&policy))
    }
}

pub struct PoliciesSource<K: PolicyKind>(PhantomData<K>);

impl<K: PolicyKind> Default for PoliciesSource<K> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

#[async_trait]
impl<K: PolicyKind> ListSource for PoliciesSource<K> {
    type Record = K::Model;

    const TYPE_NAME: &'static str = K::PLURAL_TYPE_NAME;
    const ATTRIBUTE: &'static str = "policies";
    const NOUNS: &'static str = K::PLURAL_NOUN;

    fn attributes() -> Vec<Attribute> {
        policy_attributes::<K>()
    }

    async fn list(&self, client: &Client) -> Result<Vec<K::Model>, ApiError> {
        let policies = client.service::<K::Api>().list().await?;
        Ok(policies.iter().map(K::flatten).collect())
    }
}
