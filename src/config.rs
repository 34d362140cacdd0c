use serde::Deserialize;

pub const DEFAULT_ROOT_NAME: &str = "<root>";
pub const DEFAULT_UNIT_PREFIX: &str = "__script_";

/// Registry settings, read from the `[registry]` table of a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Display name of the root package. An adapter package equal to this
    /// name binds directly in the root.
    pub root_name: String,
    /// Prefix for unit names generated by compile environments.
    pub unit_prefix: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            root_name: DEFAULT_ROOT_NAME.to_string(),
            unit_prefix: DEFAULT_UNIT_PREFIX.to_string(),
        }
    }
}
