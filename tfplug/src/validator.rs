//! Built-in attribute validators
//!
//! Validators run during ValidateResourceConfig / ValidateDataResourceConfig.
//! Null and unknown values are skipped; required-ness is checked separately.

use crate::schema::{Validator, ValidatorRequest, ValidatorResponse};
use crate::types::{AttributePath, Diagnostic, Dynamic};

fn respond(diagnostics: Vec<Diagnostic>) -> ValidatorResponse {
    ValidatorResponse { diagnostics }
}

fn invalid(path: &AttributePath, summary: String, detail: String) -> Diagnostic {
    Diagnostic::error(summary, detail).with_attribute(path.clone())
}

/// Checks string length in characters
pub struct StringLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl StringLengthValidator {
    pub fn at_least(min: usize) -> Box<Self> {
        Box::new(Self {
            min: Some(min),
            max: None,
        })
    }

    pub fn between(min: usize, max: usize) -> Box<Self> {
        Box::new(Self {
            min: Some(min),
            max: Some(max),
        })
    }
}

impl Validator for StringLengthValidator {
    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("string length must be between {} and {}", min, max),
            (Some(min), None) => format!("string length must be at least {}", min),
            (None, Some(max)) => format!("string length must be at most {}", max),
            (None, None) => "any string length".to_string(),
        }
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let Some(s) = request.config_value.value.as_string() else {
            return respond(vec![]);
        };

        let len = s.chars().count();
        let too_short = self.min.is_some_and(|min| len < min);
        let too_long = self.max.is_some_and(|max| len > max);
        if too_short || too_long {
            return respond(vec![invalid(
                &request.path,
                "Invalid Attribute Value Length".to_string(),
                format!(
                    "Attribute {} {}, got: {}",
                    request.path,
                    self.description(),
                    len
                ),
            )]);
        }

        respond(vec![])
    }
}

/// Matches strings against a regular expression
pub struct StringPatternValidator {
    pub pattern: regex::Regex,
    pub message: String,
}

impl StringPatternValidator {
    pub fn new(pattern: regex::Regex, message: impl Into<String>) -> Box<Self> {
        Box::new(Self {
            pattern,
            message: message.into(),
        })
    }
}

impl Validator for StringPatternValidator {
    fn description(&self) -> String {
        self.message.clone()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        match request.config_value.value.as_string() {
            Some(s) if !self.pattern.is_match(s) => respond(vec![invalid(
                &request.path,
                "Invalid Attribute Value Match".to_string(),
                format!("Attribute {} {}, got: {}", request.path, self.message, s),
            )]),
            _ => respond(vec![]),
        }
    }
}

/// Requires a string to parse as a UUID
pub struct UuidValidator;

impl Validator for UuidValidator {
    fn description(&self) -> String {
        "value must be a valid UUID".to_string()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        match request.config_value.value.as_string() {
            Some(s) if uuid::Uuid::parse_str(s).is_err() => respond(vec![invalid(
                &request.path,
                "Invalid UUID".to_string(),
                format!(
                    "Attribute {} must be a valid UUID, got: {}",
                    request.path, s
                ),
            )]),
            _ => respond(vec![]),
        }
    }
}

/// Restricts a string to a fixed set of values
pub struct OneOfValidator {
    pub values: Vec<String>,
}

impl OneOfValidator {
    pub fn new(values: &[&str]) -> Box<Self> {
        Box::new(Self {
            values: values.iter().map(|v| v.to_string()).collect(),
        })
    }
}

impl Validator for OneOfValidator {
    fn description(&self) -> String {
        format!("value must be one of: {}", self.values.join(", "))
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        match request.config_value.value.as_string() {
            Some(s) if !self.values.contains(s) => respond(vec![invalid(
                &request.path,
                "Invalid Attribute Value Match".to_string(),
                format!(
                    "Attribute {} {}, got: {}",
                    request.path,
                    self.description(),
                    s
                ),
            )]),
            _ => respond(vec![]),
        }
    }
}

/// Inclusive numeric range
pub struct NumberRangeValidator {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumberRangeValidator {
    pub fn between(min: f64, max: f64) -> Box<Self> {
        Box::new(Self {
            min: Some(min),
            max: Some(max),
        })
    }

    pub fn at_least(min: f64) -> Box<Self> {
        Box::new(Self {
            min: Some(min),
            max: None,
        })
    }
}

impl Validator for NumberRangeValidator {
    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("value must be between {} and {}", min, max),
            (Some(min), None) => format!("value must be at least {}", min),
            (None, Some(max)) => format!("value must be at most {}", max),
            (None, None) => "any number".to_string(),
        }
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let Some(n) = request.config_value.value.as_number() else {
            return respond(vec![]);
        };

        if self.min.is_some_and(|min| n < min) || self.max.is_some_and(|max| n > max) {
            return respond(vec![invalid(
                &request.path,
                "Invalid Attribute Value".to_string(),
                format!(
                    "Attribute {} {}, got: {}",
                    request.path,
                    self.description(),
                    n
                ),
            )]);
        }

        respond(vec![])
    }
}

/// Bounds the number of elements in a list or set
pub struct SizeValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl SizeValidator {
    pub fn at_least(min: usize) -> Box<Self> {
        Box::new(Self {
            min: Some(min),
            max: None,
        })
    }
}

impl Validator for SizeValidator {
    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("must contain between {} and {} elements", min, max),
            (Some(min), None) => format!("must contain at least {} elements", min),
            (None, Some(max)) => format!("must contain at most {} elements", max),
            (None, None) => "any number of elements".to_string(),
        }
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let Some(items) = request.config_value.value.as_list() else {
            return respond(vec![]);
        };

        let len = items.len();
        if self.min.is_some_and(|min| len < min) || self.max.is_some_and(|max| len > max) {
            return respond(vec![invalid(
                &request.path,
                "Invalid Attribute Value".to_string(),
                format!(
                    "Attribute {} {}, got: {}",
                    request.path,
                    self.description(),
                    len
                ),
            )]);
        }

        respond(vec![])
    }
}

/// Applies a validator to every element of a list or set
pub struct ElementsValidator {
    inner: Box<dyn Validator>,
}

impl ElementsValidator {
    pub fn new(inner: Box<dyn Validator>) -> Box<Self> {
        Box::new(Self { inner })
    }
}

impl Validator for ElementsValidator {
    fn description(&self) -> String {
        format!("each element: {}", self.inner.description())
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let Some(items) = request.config_value.value.as_list() else {
            return respond(vec![]);
        };

        let mut diagnostics = Vec::new();
        for (idx, item) in items.iter().enumerate() {
            if item.is_null() || item.is_unknown() {
                continue;
            }
            let response = self.inner.validate(ValidatorRequest {
                config_value: crate::types::DynamicValue::new(item.clone()),
                config: request.config.clone(),
                path: request.path.clone().index(idx as i64),
            });
            diagnostics.extend(response.diagnostics);
        }
        respond(diagnostics)
    }
}

/// Applies a validator to one field of an object value
pub struct FieldValidator {
    field: String,
    inner: Box<dyn Validator>,
}

impl FieldValidator {
    pub fn new(field: &str, inner: Box<dyn Validator>) -> Box<Self> {
        Box::new(Self {
            field: field.to_string(),
            inner,
        })
    }
}

impl Validator for FieldValidator {
    fn description(&self) -> String {
        format!("{}: {}", self.field, self.inner.description())
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let Some(value) = request
            .config_value
            .value
            .as_map()
            .and_then(|m| m.get(&self.field))
        else {
            return respond(vec![]);
        };

        if value.is_null() || value.is_unknown() {
            return respond(vec![]);
        }

        self.inner.validate(ValidatorRequest {
            config_value: crate::types::DynamicValue::new(value.clone()),
            config: request.config,
            path: request.path.attribute(&self.field),
        })
    }
}

/// Rejects configurations that set this attribute together with any of
/// the named sibling attributes
pub struct ConflictsWithValidator {
    pub others: Vec<String>,
}

impl ConflictsWithValidator {
    pub fn new(others: &[&str]) -> Box<Self> {
        Box::new(Self {
            others: others.iter().map(|o| o.to_string()).collect(),
        })
    }
}

impl Validator for ConflictsWithValidator {
    fn description(&self) -> String {
        format!("cannot be set together with: {}", self.others.join(", "))
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        if request.config_value.is_null() {
            return respond(vec![]);
        }

        let diagnostics = self
            .others
            .iter()
            .filter(|other| !request.config.get(&AttributePath::new(other)).is_null())
            .map(|other| {
                invalid(
                    &request.path,
                    "Invalid Attribute Combination".to_string(),
                    format!(
                        "Attribute {} cannot be specified when {} is specified",
                        other, request.path
                    ),
                )
            })
            .collect();

        respond(diagnostics)
    }
}

/// Run every validator of an attribute against its configured value
pub fn run_validators(
    validators: &[Box<dyn Validator>],
    value: &Dynamic,
    config: &crate::types::DynamicValue,
    path: &AttributePath,
) -> Vec<Diagnostic> {
    if value.is_null() || value.is_unknown() {
        return vec![];
    }

    validators
        .iter()
        .flat_map(|v| {
            v.validate(ValidatorRequest {
                config_value: crate::types::DynamicValue::new(value.clone()),
                config: config.clone(),
                path: path.clone(),
            })
            .diagnostics
        })
        .collect()
}
