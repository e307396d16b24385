//! Identity provider groups data source

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};

use crate::api::groups::Group;
use crate::api::{ApiError, Client};
use crate::datasource::ListSource;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GroupModel {
    pub id: String,
    pub name: String,
}

#[derive(Default)]
pub struct GroupsSource;

#[async_trait]
impl ListSource for GroupsSource {
    type Record = GroupModel;

    const TYPE_NAME: &'static str = "bastionzero_groups";
    const ATTRIBUTE: &'static str = "groups";
    const NOUNS: &'static str = "groups";

    fn attributes() -> Vec<Attribute> {
        vec![
            AttributeBuilder::new("id", AttributeType::String)
                .description("The group's ID at the identity provider")
                .build(),
            AttributeBuilder::new("name", AttributeType::String)
                .description("The group's name")
                .build(),
        ]
    }

    async fn list(&self, client: &Client) -> Result<Vec<GroupModel>, ApiError> {
        let groups: Vec<Group> = client.groups().list().await?;
        Ok(groups
            .into_iter()
            .map(|g| GroupModel {
                id: g.id,
                name: g.name,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::ListDataSource;

    #[test]
    fn groups_schema_lists_id_and_name() {
        let record = ListDataSource::<GroupsSource>::record_type();
        assert_eq!(
            record,
            AttributeType::object(&[("id", AttributeType::String), ("name", AttributeType::String)])
        );
    }
}
