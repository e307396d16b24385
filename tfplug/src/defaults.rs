//! Default value providers for attributes
//!
//! Defaults are evaluated during planning for optional+computed attributes
//! that are null in configuration. An explicit value always wins.
//!
//! # Examples
//!
//! ```no_run
//! use tfplug::schema::{AttributeBuilder, AttributeType};
//! use tfplug::defaults::StaticDefault;
//!
//! let hours = AttributeBuilder::new("offline_cleanup_timeout_hours", AttributeType::Number)
//!     .optional()
//!     .computed()
//!     .default(StaticDefault::number(2160.0))
//!     .build();
//! ```

use crate::schema::{Default, DefaultRequest, DefaultResponse};
use crate::types::{Dynamic, DynamicValue};
use std::env;

/// StaticDefault provides a static default value
pub struct StaticDefault {
    value: Dynamic,
}

impl StaticDefault {
    pub fn create(value: Dynamic) -> Box<dyn Default> {
        Box::new(Self { value })
    }

    pub fn string(value: &str) -> Box<dyn Default> {
        Self::create(Dynamic::String(value.to_string()))
    }

    pub fn number(value: f64) -> Box<dyn Default> {
        Self::create(Dynamic::Number(value))
    }

    pub fn bool(value: bool) -> Box<dyn Default> {
        Self::create(Dynamic::Bool(value))
    }
}

impl Default for StaticDefault {
    fn description(&self) -> String {
        format!("defaults to {}", self.value.to_json())
    }

    fn default_value(&self, _request: DefaultRequest) -> DefaultResponse {
        DefaultResponse {
            value: DynamicValue::new(self.value.clone()),
        }
    }
}

/// EnvDefault reads the default from an environment variable, falling back
/// to a fixed string or null. Empty variables count as unset.
pub struct EnvDefault {
    env_var: String,
    fallback: Option<String>,
}

impl EnvDefault {
    pub fn create(env_var: &str, fallback: &str) -> Box<Self> {
        Box::new(Self {
            env_var: env_var.to_string(),
            fallback: Some(fallback.to_string()),
        })
    }

    /// Create an environment variable default without a fallback
    pub fn create_required(env_var: &str) -> Box<Self> {
        Box::new(Self {
            env_var: env_var.to_string(),
            fallback: None,
        })
    }

    /// Resolve a configured value: the configuration wins, then the
    /// environment, then the fallback
    pub fn resolve(&self, configured: Option<String>) -> Option<String> {
        configured
            .filter(|v| !v.is_empty())
            .or_else(|| self.lookup())
    }

    fn lookup(&self) -> Option<String> {
        env::var(&self.env_var)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.fallback.clone())
    }
}

impl Default for EnvDefault {
    fn description(&self) -> String {
        match &self.fallback {
            Some(fallback) => format!(
                "defaults to environment variable {} (fallback: {})",
                self.env_var, fallback
            ),
            None => format!("defaults to environment variable {}", self.env_var),
        }
    }

    fn default_value(&self, _request: DefaultRequest) -> DefaultResponse {
        let value = self.lookup().map(Dynamic::String).unwrap_or(Dynamic::Null);
        DefaultResponse {
            value: DynamicValue::new(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributePath;
    use serial_test::serial;

    fn request() -> DefaultRequest {
        DefaultRequest {
            path: AttributePath::new("attr"),
        }
    }

    #[test]
    fn static_default_returns_its_value() {
        let default = StaticDefault::number(60.0);
        assert_eq!(
            default.default_value(request()).value.value,
            Dynamic::Number(60.0)
        );
        assert_eq!(default.description(), "defaults to 60");

        let default = StaticDefault::string("");
        assert_eq!(
            default.default_value(request()).value.value,
            Dynamic::String(String::new())
        );
    }

    #[test]
    #[serial]
    fn env_default_prefers_environment_over_fallback() {
        std::env::set_var("TFPLUG_TEST_ENV_DEFAULT", "from-env");
        let default = EnvDefault::create("TFPLUG_TEST_ENV_DEFAULT", "fallback");
        assert_eq!(
            default.default_value(request()).value.value,
            Dynamic::String("from-env".to_string())
        );

        std::env::remove_var("TFPLUG_TEST_ENV_DEFAULT");
        assert_eq!(
            default.default_value(request()).value.value,
            Dynamic::String("fallback".to_string())
        );
    }

    #[test]
    #[serial]
    fn env_default_resolve_lets_configuration_win() {
        std::env::set_var("TFPLUG_TEST_ENV_RESOLVE", "from-env");
        let default = EnvDefault::create_required("TFPLUG_TEST_ENV_RESOLVE");

        assert_eq!(
            default.resolve(Some("configured".to_string())),
            Some("configured".to_string())
        );
        assert_eq!(default.resolve(Some(String::new())), Some("from-env".to_string()));

        std::env::remove_var("TFPLUG_TEST_ENV_RESOLVE");
        assert_eq!(default.resolve(None), None);
        assert!(default.default_value(request()).value.is_null());
    }
}
