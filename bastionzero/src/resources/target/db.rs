//! Database target resource

use serde::{Deserialize, Serialize};
use tfplug::defaults::StaticDefault;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};

use super::{changed, VirtualTargetKind, VirtualTargetModel};
use crate::api::targets::{CreateDbTargetRequest, DbTarget, ModifyDbTargetRequest, Port};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DbTargetModel {
    #[serde(flatten)]
    pub common: VirtualTargetModel,
    pub is_split_cert: Option<bool>,
    pub database_type: Option<String>,
}

pub fn db_attributes() -> Vec<Attribute> {
    vec![
        AttributeBuilder::new("is_split_cert", AttributeType::Bool)
            .description(
                "If true, the database is reached with split-certificate (passwordless) authentication (defaults to false)",
            )
            .optional()
            .computed()
            .default(StaticDefault::bool(false))
            .build(),
        AttributeBuilder::new("database_type", AttributeType::String)
            .description("The database's engine, required when is_split_cert is true (e.g. Postgres)")
            .optional()
            .build(),
    ]
}

#[derive(Default)]
pub struct DbTargetKind;

impl VirtualTargetKind for DbTargetKind {
    type Api = DbTarget;
    type Model = DbTargetModel;

    const TYPE_NAME: &'static str = "bastionzero_db_target";
    const PLURAL_TYPE_NAME: &'static str = "bastionzero_db_targets";
    const NOUN: &'static str = "database target";
    const PLURAL_NOUN: &'static str = "database targets";
    const TARGET_TYPE: &'static str = "Db";

    fn attributes() -> Vec<Attribute> {
        db_attributes()
    }

    fn flatten(target: &DbTarget) -> DbTargetModel {
        DbTargetModel {
            common: VirtualTargetModel::flatten(&target.common),
            is_split_cert: Some(target.is_split_cert),
            database_type: Some(target.database_type.clone()).filter(|t| !t.is_empty()),
        }
    }

    fn create_request(plan: &DbTargetModel) -> CreateDbTargetRequest {
        let common = &plan.common;
        CreateDbTargetRequest {
            target_name: common.name.clone(),
            proxy_target_id: common.proxy_target_id.clone(),
            remote_host: common.remote_host.clone(),
            remote_port: Port::new(common.remote_port),
            local_port: Port::new(common.local_port),
            environment_id: common.environment_id.clone(),
            is_split_cert: plan.is_split_cert.unwrap_or_default(),
            database_type: plan.database_type.clone(),
        }
    }

    fn modify_request(plan: &DbTargetModel, prior: &DbTargetModel) -> ModifyDbTargetRequest {
        let (new, old) = (&plan.common, &prior.common);
        ModifyDbTargetRequest {
            target_name: changed(&new.name, &old.name),
            proxy_target_id: None,
            remote_host: changed(&new.remote_host, &old.remote_host),
            remote_port: changed(&new.remote_port, &old.remote_port).map(Port::new),
            local_port: changed(&new.local_port, &old.local_port).map(Port::new),
            environment_id: changed(&new.environment_id, &old.environment_id),
            is_split_cert: changed(&plan.is_split_cert, &prior.is_split_cert).flatten(),
            database_type: changed(&plan.database_type, &prior.database_type)
                .map(Option::unwrap_or_default),
        }
    }
}

#[cfg(test)]
#[path = "./db_test.rs"]
mod db_test;
