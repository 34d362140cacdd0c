//! Per-compilation view of a [`Registry`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use uuid::Uuid;

use crate::expansion::TypeExpansion;
use crate::lexer::Token;
use crate::namespace::{Binding, Package};
use crate::registry::Registry;
use crate::symbols::Symbol;

/// Result of a name lookup in a compile environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Symbol(&'a Arc<Symbol>),
    Package(&'a Package),
}

impl<'a> Lookup<'a> {
    pub fn as_symbol(self) -> Option<&'a Arc<Symbol>> {
        match self {
            Lookup::Symbol(symbol) => Some(symbol),
            Lookup::Package(_) => None,
        }
    }

    pub fn as_package(self) -> Option<&'a Package> {
        match self {
            Lookup::Package(package) => Some(package),
            Lookup::Symbol(_) => None,
        }
    }
}

impl<'a> From<&'a Binding> for Lookup<'a> {
    fn from(binding: &'a Binding) -> Self {
        match binding {
            Binding::Symbol(symbol) => Lookup::Symbol(symbol),
            Binding::Package(package) => Lookup::Package(package),
        }
    }
}

/// One compilation: the source units being compiled plus values the
/// compilation defines itself. The registry is only borrowed.
pub struct GlobalEnvironment<'r> {
    id: Uuid,
    registry: &'r Registry,
    units: BTreeMap<String, Vec<u8>>,
    locals: HashMap<String, Arc<Symbol>>,
    next_unit: usize,
}

impl<'r> GlobalEnvironment<'r> {
    pub(crate) fn new(registry: &'r Registry, units: BTreeMap<String, Vec<u8>>) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(%id, units = units.len(), "created compile environment");
        Self { id, registry, units, locals: HashMap::new(), next_unit: 0 }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn units(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.units
    }

    pub fn contains_unit(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    /// Add or replace a unit. Returns the previous payload, if any.
    pub fn put_unit(&mut self, name: impl Into<String>, payload: Vec<u8>) -> Option<Vec<u8>> {
        self.units.insert(name.into(), payload)
    }

    /// A unit name not used by any unit in this environment.
    pub fn make_unit_name(&mut self) -> String {
        loop {
            let name = format!("{}{}", self.registry.config().unit_prefix, self.next_unit);
            self.next_unit += 1;
            if !self.units.contains_key(&name) {
                return name;
            }
        }
    }

    /// Define a value local to this compilation. A name that is already
    /// defined is logged and left alone.
    pub fn put_value(&mut self, name: impl Into<String>, symbol: Arc<Symbol>) -> bool {
        let name = name.into();
        if self.locals.contains_key(&name) {
            self.error(&format!("Value already defined: {name}"));
            return false;
        }
        self.locals.insert(name, symbol);
        true
    }

    /// Resolve a top-level name: compilation locals, then registry globals,
    /// then the root package.
    pub fn value(&self, name: &str) -> Option<Lookup<'_>> {
        if let Some(symbol) = self.locals.get(name) {
            return Some(Lookup::Symbol(symbol));
        }
        if let Some(symbol) = self.registry.global(name) {
            return Some(Lookup::Symbol(symbol));
        }
        self.registry.root().get(name).map(Lookup::from)
    }

    pub fn expansion(&self, type_name: &str) -> Option<&'r TypeExpansion> {
        self.registry.expansion(type_name)
    }

    pub fn resolve_bracket(&self, tokens: &[Token]) -> Option<Arc<Symbol>> {
        self.registry.resolve_bracket(self, tokens)
    }

    pub fn error(&self, message: &str) {
        self.registry.error_logger().error(message, None);
    }

    pub fn warning(&self, message: &str) {
        self.registry.error_logger().warning(message);
    }
}

impl std::fmt::Debug for GlobalEnvironment<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalEnvironment")
            .field("id", &self.id)
            .field("units", &self.units.keys().collect::<Vec<_>>())
            .field("locals", &self.locals.len())
            .finish()
    }
}
