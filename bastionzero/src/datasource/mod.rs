//! Generic data source scaffolding
//!
//! Every BastionZero object type is exposed twice: a single data source
//! that looks one object up and a list data source that returns all of
//! them. Both are generic over a small source trait so each object type
//! only supplies its schema and how to fetch records.

pub mod list;
pub mod single;

pub use list::{ListDataSource, ListSource};
pub use single::{SingleDataSource, SingleSource};

use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::{AttributePath, DynamicValue};
use tfplug::validator::UuidValidator;

/// Turn resource attributes into read-only data source attributes
pub fn as_computed(attributes: Vec<Attribute>) -> Vec<Attribute> {
    attributes
        .into_iter()
        .map(|mut attribute| {
            attribute.required = false;
            attribute.optional = false;
            attribute.computed = true;
            attribute.validators.clear();
            attribute.plan_modifiers.clear();
            attribute.default = None;
            attribute
        })
        .collect()
}

/// The default lookup parameter: a required UUID `id`
pub fn id_parameter(noun: &str) -> Attribute {
    AttributeBuilder::new("id", AttributeType::String)
        .description(&format!("The {}'s unique ID", noun))
        .required()
        .validator(Box::new(UuidValidator))
        .build()
}

/// String parameter from a data source config; empty when unset
pub fn string_parameter(config: &DynamicValue, name: &str) -> String {
    config
        .get_string(&AttributePath::new(name))
        .unwrap_or_default()
}
