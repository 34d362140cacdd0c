//! TOML manifests describing a registry: host classes, adapters, globals and
//! declarative bracket handlers.
//!
//! ```toml
//! [registry]
//! root_name = "<root>"
//!
//! [[class]]
//! name = "mods.OreDict"
//! [[class.members]]
//! name = "get"
//! kind = "method"
//! params = ["string"]
//! returns = "mods.OreEntry"
//! static = true
//!
//! [[global]]
//! name = "oreDict"
//! class = "mods.OreDict"
//! field = "INSTANCE"
//!
//! [[bracket]]
//! name = "ore"
//! pattern = "ore:(.+)"
//! class = "mods.OreDict"
//! method = "get"
//! ```

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::brackets::{BracketPattern, PatternBracketHandler};
use crate::config::RegistryConfig;
use crate::diagnostics::{ErrorLogger, ManifestError};
use crate::host::ClassDescriptor;
use crate::registry::Registry;
use crate::symbols::Symbol;
use crate::types::native::NativeMethod;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default, rename = "class")]
    pub classes: Vec<ClassDescriptor>,
    #[serde(default, rename = "adapter")]
    pub adapters: Vec<AdapterEntry>,
    #[serde(default, rename = "global")]
    pub globals: Vec<GlobalEntry>,
    #[serde(default, rename = "bracket")]
    pub brackets: Vec<BracketEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdapterEntry {
    pub class: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub methods: Vec<String>,
}

/// A global bound to either a static field or a static method of a class.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalEntry {
    pub name: String,
    pub class: String,
    pub field: Option<String>,
    pub method: Option<String>,
    #[serde(default)]
    pub params: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BracketEntry {
    pub name: String,
    #[serde(default)]
    pub priority: i32,
    pub pattern: String,
    pub class: String,
    pub method: String,
    /// Required only when `method` is overloaded.
    pub params: Option<Vec<String>>,
}

impl FromStr for Manifest {
    type Err = ManifestError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(source)?)
    }
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| ManifestError::Io { path: path.to_path_buf(), msg: e.to_string() })?;
        source.parse()
    }

    pub fn class(&self, name: &str) -> Result<&ClassDescriptor, ManifestError> {
        self.classes
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ManifestError::UnknownClass { name: name.to_string() })
    }

    /// Build a registry from this manifest.
    ///
    /// Classes and adapters that fail to import are logged to `logger` and
    /// skipped. An adapter naming an undeclared class, and globals or bracket
    /// handlers that reference something missing, are hard errors.
    pub fn build(&self, logger: Arc<dyn ErrorLogger>) -> Result<Registry, ManifestError> {
        let mut registry = Registry::with_config(self.registry.clone(), logger);

        let (expansions, natives): (Vec<&ClassDescriptor>, Vec<&ClassDescriptor>) = self
            .classes
            .iter()
            .partition(|c| c.expansion_targets().next().is_some());
        let imported = registry.register_native_classes(natives.iter().copied());
        let expanded = registry.register_expansions(expansions.iter().copied());

        // Adapter failures are logged by the registry and only counted here.
        let mut adapter_failures = 0;
        for adapter in &self.adapters {
            let class = self.class(&adapter.class)?;
            let methods: Vec<&str> = adapter.methods.iter().map(String::as_str).collect();
            if registry.register_adapter(class, &adapter.package, &methods).is_err() {
                adapter_failures += 1;
            }
        }
        tracing::debug!(
            natives = imported.imported,
            expansions = expanded.imported,
            adapters = self.adapters.len() - adapter_failures,
            failed = imported.failed.len() + expanded.failed.len() + adapter_failures,
            "imported manifest classes"
        );

        for global in &self.globals {
            let symbol = self.global_symbol(&registry, global)?;
            registry.register_global(global.name.clone(), symbol)?;
        }

        for bracket in &self.brackets {
            let handler = self.bracket_handler(&registry, bracket)?;
            registry.register_bracket_handler(Arc::new(handler));
        }

        Ok(registry)
    }

    fn global_symbol(&self, registry: &Registry, global: &GlobalEntry) -> Result<Arc<Symbol>, ManifestError> {
        let class = self.class(&global.class)?;
        match (&global.field, &global.method) {
            (Some(field), None) => registry.get_static_field(class, field).ok_or_else(|| {
                ManifestError::UnknownMember { class: class.name.clone(), name: field.clone() }
            }),
            (None, Some(method)) => {
                let params: Vec<&str> = global.params.iter().map(String::as_str).collect();
                Ok(registry.get_static_function(class, method, &params)?)
            }
            _ => Err(ManifestError::InvalidEntry {
                entry: format!("global '{}'", global.name),
                msg: "exactly one of 'field' or 'method' is required".to_string(),
            }),
        }
    }

    fn bracket_handler(
        &self,
        registry: &Registry,
        bracket: &BracketEntry,
    ) -> Result<PatternBracketHandler, ManifestError> {
        let pattern = BracketPattern::new(&bracket.pattern)
            .map_err(|e| ManifestError::Pattern { name: bracket.name.clone(), msg: e.to_string() })?;
        let class = self.class(&bracket.class)?;

        let params: Vec<&str> = match &bracket.params {
            Some(params) => params.iter().map(String::as_str).collect(),
            None => {
                let mut candidates = class
                    .members_named(&bracket.method)
                    .filter(|m| m.is_method() && m.is_static && m.is_public());
                let Some(first) = candidates.next() else {
                    return Err(ManifestError::UnknownMember {
                        class: class.name.clone(),
                        name: bracket.method.clone(),
                    });
                };
                if candidates.next().is_some() {
                    return Err(ManifestError::InvalidEntry {
                        entry: format!("bracket '{}'", bracket.name),
                        msg: format!("'{}' is overloaded; specify 'params'", bracket.method),
                    });
                }
                first.params().iter().map(String::as_str).collect()
            }
        };

        let symbol = registry.get_static_function(class, &bracket.method, &params)?;
        let method = static_method(&symbol).ok_or_else(|| ManifestError::UnknownMember {
            class: class.name.clone(),
            name: bracket.method.clone(),
        })?;
        Ok(PatternBracketHandler::new(&bracket.name, bracket.priority, pattern, method))
    }
}

fn static_method(symbol: &Symbol) -> Option<Arc<NativeMethod>> {
    match symbol {
        Symbol::StaticMethod(method) => Some(Arc::clone(method)),
        _ => None,
    }
}
