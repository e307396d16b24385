//! Conversions shared by every policy kind
//!
//! Each flatten function maps an API list to its Terraform shape and each
//! expand function maps it back; `expand(flatten(x)) == x` for every list.

use serde::{Deserialize, Serialize};
use tfplug::defaults::StaticDefault;
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::validator::{
    ConflictsWithValidator, ElementsValidator, FieldValidator, OneOfValidator,
    StringLengthValidator, UuidValidator,
};

use crate::api::policies::{
    PolicyCommon, PolicyEnvironment, PolicyGroup, PolicySubject, PolicyTarget, PolicyType,
    TargetUser, SUBJECT_TYPES,
};
use crate::resources::normalize_empty;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PolicySubjectModel {
    pub id: String,
    #[serde(rename = "type")]
    pub subject_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PolicyGroupModel {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PolicyTargetModel {
    pub id: String,
    #[serde(rename = "type")]
    pub target_type: String,
}

/// Attributes every policy model carries
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PolicyCommonModel {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub policy_type: Option<String>,
    pub subjects: Option<Vec<PolicySubjectModel>>,
    pub groups: Option<Vec<PolicyGroupModel>>,
}

impl PolicyCommonModel {
    pub fn flatten(common: &PolicyCommon) -> Self {
        Self {
            id: Some(common.id.clone()),
            name: common.name.clone(),
            description: Some(common.description.clone()),
            policy_type: Some(common.policy_type.clone()),
            subjects: Some(flatten_subjects(&common.subjects)),
            groups: Some(flatten_groups(&common.groups)),
        }
    }

    pub fn expand(&self, policy_type: PolicyType) -> PolicyCommon {
        PolicyCommon {
            id: self.id.clone().unwrap_or_default(),
            name: self.name.clone(),
            policy_type: policy_type.as_str().to_string(),
            description: self.description.clone().unwrap_or_default(),
            subjects: expand_subjects(self.subjects.as_deref().unwrap_or_default()),
            groups: expand_groups(self.groups.as_deref().unwrap_or_default()),
        }
    }

    pub fn normalize(&mut self, prior: &Self) {
        self.subjects = normalize_empty(self.subjects.take(), &prior.subjects);
        self.groups = normalize_empty(self.groups.take(), &prior.groups);
    }
}

pub fn flatten_subjects(subjects: &[PolicySubject]) -> Vec<PolicySubjectModel> {
    subjects
        .iter()
        .map(|s| PolicySubjectModel {
            id: s.id.clone(),
            subject_type: s.subject_type.clone(),
        })
        .collect()
}

pub fn expand_subjects(subjects: &[PolicySubjectModel]) -> Vec<PolicySubject> {
    subjects
        .iter()
        .map(|s| PolicySubject {
            id: s.id.clone(),
            subject_type: s.subject_type.clone(),
        })
        .collect()
}

pub fn flatten_groups(groups: &[PolicyGroup]) -> Vec<PolicyGroupModel> {
    groups
        .iter()
        .map(|g| PolicyGroupModel {
            id: g.id.clone(),
            name: g.name.clone(),
        })
        .collect()
}

pub fn expand_groups(groups: &[PolicyGroupModel]) -> Vec<PolicyGroup> {
    groups
        .iter()
        .map(|g| PolicyGroup {
            id: g.id.clone(),
            name: g.name.clone(),
        })
        .collect()
}

pub fn flatten_environments(environments: &[PolicyEnvironment]) -> Vec<String> {
    environments.iter().map(|e| e.id.clone()).collect()
}

pub fn expand_environments(environments: &[String]) -> Vec<PolicyEnvironment> {
    environments
        .iter()
        .map(|id| PolicyEnvironment { id: id.clone() })
        .collect()
}

pub fn flatten_targets(targets: &[PolicyTarget]) -> Vec<PolicyTargetModel> {
    targets
        .iter()
        .map(|t| PolicyTargetModel {
            id: t.id.clone(),
            target_type: t.target_type.clone(),
        })
        .collect()
}

pub fn expand_targets(targets: &[PolicyTargetModel]) -> Vec<PolicyTarget> {
    targets
        .iter()
        .map(|t| PolicyTarget {
            id: t.id.clone(),
            target_type: t.target_type.clone(),
        })
        .collect()
}

pub fn flatten_target_users(users: &[TargetUser]) -> Vec<String> {
    users.iter().map(|u| u.user_name.clone()).collect()
}

pub fn expand_target_users(users: &[String]) -> Vec<TargetUser> {
    users
        .iter()
        .map(|u| TargetUser {
            user_name: u.clone(),
        })
        .collect()
}

/// Attributes shared by every policy resource
pub fn common_attributes(policy_type: PolicyType) -> Vec<Attribute> {
    vec![
        AttributeBuilder::new("id", AttributeType::String)
            .description("The policy's unique ID")
            .computed()
            .plan_modifier(Box::new(UseStateForUnknown))
            .build(),
        AttributeBuilder::new("name", AttributeType::String)
            .description("The policy's name")
            .required()
            .validator(StringLengthValidator::at_least(1))
            .build(),
        AttributeBuilder::new("description", AttributeType::String)
            .description("The policy's description")
            .optional()
            .computed()
            .default(StaticDefault::string(""))
            .build(),
        AttributeBuilder::new("type", AttributeType::String)
            .description(&format!("The policy's type (constant value \"{}\")", policy_type))
            .computed()
            .plan_modifier(Box::new(UseStateForUnknown))
            .build(),
        AttributeBuilder::new(
            "subjects",
            AttributeType::set(AttributeType::object(&[
                ("id", AttributeType::String),
                ("type", AttributeType::String),
            ])),
        )
        .description(&format!(
            "Set of subjects that this policy applies to. Subject type is one of {}",
            SUBJECT_TYPES.join(", ")
        ))
        .optional()
        .validator(ElementsValidator::new(FieldValidator::new(
            "id",
            Box::new(UuidValidator),
        )))
        .validator(ElementsValidator::new(FieldValidator::new(
            "type",
            OneOfValidator::new(SUBJECT_TYPES),
        )))
        .build(),
        AttributeBuilder::new(
            "groups",
            AttributeType::set(AttributeType::object(&[
                ("id", AttributeType::String),
                ("name", AttributeType::String),
            ])),
        )
        .description("Set of identity provider groups that this policy applies to")
        .optional()
        .build(),
    ]
}

/// `environments` set, exclusive with the attribute naming specific targets
pub fn environments_attribute(exclusive_with: &str) -> Attribute {
    AttributeBuilder::new("environments", AttributeType::set(AttributeType::String))
        .description(&format!(
            "Set of environment IDs that this policy applies to. Cannot be set together with {}",
            exclusive_with
        ))
        .optional()
        .validator(ElementsValidator::new(Box::new(UuidValidator)))
        .validator(ConflictsWithValidator::new(&[exclusive_with]))
        .build()
}

/// `targets` set of `{id, type}`, exclusive with `environments`
pub fn targets_attribute(target_types: &[&str]) -> Attribute {
    AttributeBuilder::new(
        "targets",
        AttributeType::set(AttributeType::object(&[
            ("id", AttributeType::String),
            ("type", AttributeType::String),
        ])),
    )
    .description(&format!(
        "Set of targets that this policy applies to. Target type is one of {}. Cannot be set together with environments",
        target_types.join(", ")
    ))
    .optional()
    .validator(ElementsValidator::new(FieldValidator::new(
        "id",
        Box::new(UuidValidator),
    )))
    .validator(ElementsValidator::new(FieldValidator::new(
        "type",
        OneOfValidator::new(target_types),
    )))
    .validator(ConflictsWithValidator::new(&["environments"]))
    .build()
}

pub fn string_set_attribute(name: &str, description: &str) -> Attribute {
    AttributeBuilder::new(name, AttributeType::set(AttributeType::String))
        .description(description)
        .optional()
        .build()
}
