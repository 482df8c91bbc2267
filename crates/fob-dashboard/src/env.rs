//! Build environment lookup.
//!
//! The dashboard shows which `NODE_ENV` a build targets. Hosts expose it
//! through [`BuildEnvironment`]; the bridge only ever sees the resolved string.

use std::collections::HashMap;

/// NODE_ENV reported when the host does not declare one.
pub const DEFAULT_NODE_ENV: &str = "development";

/// Define key that carries the NODE_ENV constant.
pub const NODE_ENV_DEFINE: &str = "process.env.NODE_ENV";

/// Capability supplied by the host integration to report its NODE_ENV.
///
/// Returning `None` means "not declared"; the bridge then falls back to
/// [`DEFAULT_NODE_ENV`].
pub trait BuildEnvironment: Send + Sync {
    /// The NODE_ENV value the build compiles against, if known.
    fn node_env(&self) -> Option<String>;
}

/// Environment provider backed by define-style compile-time constants.
///
/// Values are stored the way bundlers declare them: as source-code literals,
/// so a string constant is JSON-encoded (`"\"production\""`).
#[derive(Debug, Clone, Default)]
pub struct DefineConstants {
    defines: HashMap<String, String>,
}

impl DefineConstants {
    /// Create an empty set of constants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a constant with its source-code literal.
    pub fn define(mut self, key: impl Into<String>, literal: impl Into<String>) -> Self {
        self.defines.insert(key.into(), literal.into());
        self
    }

    /// Get the raw literal of a constant.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.defines.get(key).map(String::as_str)
    }
}

impl BuildEnvironment for DefineConstants {
    fn node_env(&self) -> Option<String> {
        let literal = self.get(NODE_ENV_DEFINE)?;
        serde_json::from_str::<String>(literal).ok()
    }
}

/// Environment provider with a fixed value, or none at all.
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment(pub Option<String>);

impl BuildEnvironment for StaticEnvironment {
    fn node_env(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Resolve the NODE_ENV to report, degrading to the default.
pub fn resolve_node_env(environment: &dyn BuildEnvironment) -> String {
    environment
        .node_env()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_NODE_ENV.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_constant_is_json_decoded() {
        let defines = DefineConstants::new().define(NODE_ENV_DEFINE, r#""production""#);
        assert_eq!(resolve_node_env(&defines), "production");
    }

    #[test]
    fn test_missing_define_uses_default() {
        let defines = DefineConstants::new().define("__DEV__", "true");
        assert_eq!(resolve_node_env(&defines), DEFAULT_NODE_ENV);
    }

    #[test]
    fn test_unparsable_define_uses_default() {
        // Bare identifier, not a JSON string literal
        let defines = DefineConstants::new().define(NODE_ENV_DEFINE, "production");
        assert_eq!(resolve_node_env(&defines), DEFAULT_NODE_ENV);

        let defines = DefineConstants::new().define(NODE_ENV_DEFINE, "42");
        assert_eq!(resolve_node_env(&defines), DEFAULT_NODE_ENV);
    }

    #[test]
    fn test_static_environment() {
        assert_eq!(
            resolve_node_env(&StaticEnvironment(Some("test".to_string()))),
            "test"
        );
        assert_eq!(resolve_node_env(&StaticEnvironment(None)), DEFAULT_NODE_ENV);
        assert_eq!(
            resolve_node_env(&StaticEnvironment(Some(String::new()))),
            DEFAULT_NODE_ENV
        );
    }
}
