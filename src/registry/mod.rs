//! The compile-time registry: global symbols, imported native types, type
//! expansions and the bracket handler chain.
//!
//! Mutation needs `&mut Registry`; compile environments borrow it shared, so
//! setup is finished before the first environment exists.

mod natives;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::brackets::{BracketHandler, BracketHandlers};
use crate::config::RegistryConfig;
use crate::diagnostics::{ErrorLogger, ImportError, RegistryError, TracingLogger};
use crate::environment::GlobalEnvironment;
use crate::expansion::TypeExpansion;
use crate::host::ClassSource;
use crate::lexer::Token;
use crate::namespace::Package;
use crate::symbols::Symbol;
use crate::types::TypeRegistry;

pub struct Registry {
    config: RegistryConfig,
    globals: HashMap<String, Arc<Symbol>>,
    bracket_handlers: BracketHandlers,
    types: TypeRegistry,
    root: Package,
    expansions: HashMap<String, TypeExpansion>,
    error_logger: Arc<dyn ErrorLogger>,
}

/// Outcome of a batch import. Failures have already been logged.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: usize,
    pub failed: Vec<ImportError>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Arc::new(TracingLogger))
    }
}

impl Registry {
    pub fn new(error_logger: Arc<dyn ErrorLogger>) -> Self {
        Self::with_config(RegistryConfig::default(), error_logger)
    }

    pub fn with_config(config: RegistryConfig, error_logger: Arc<dyn ErrorLogger>) -> Self {
        Self {
            root: Package::root(config.root_name.clone()),
            config,
            globals: HashMap::new(),
            bracket_handlers: BracketHandlers::new(),
            types: TypeRegistry::new(),
            expansions: HashMap::new(),
            error_logger,
        }
    }

    // ===== Symbol table =====

    /// Bind a global name. Fails, leaving the table unchanged, if the name is taken.
    pub fn register_global(&mut self, name: impl Into<String>, symbol: Arc<Symbol>) -> Result<(), RegistryError> {
        let name = name.into();
        if self.globals.contains_key(&name) {
            return Err(RegistryError::duplicate(name));
        }
        tracing::debug!(%name, kind = symbol.kind(), "registered global");
        self.globals.insert(name, symbol);
        Ok(())
    }

    pub fn globals(&self) -> &HashMap<String, Arc<Symbol>> {
        &self.globals
    }

    pub fn global(&self, name: &str) -> Option<&Arc<Symbol>> {
        self.globals.get(name)
    }

    // ===== Type expansions =====

    /// Merge `class` into the expansion of every type it is marked to expand.
    /// Returns the number of expansions contributed to; a class without
    /// expansion markers contributes to none.
    ///
    /// Every target is staged before any is committed: if one target rejects
    /// the class, no expansion changes.
    pub fn register_expansion<S: ClassSource + ?Sized>(&mut self, class: &S) -> Result<usize, ImportError> {
        let descriptor = match class.describe() {
            Ok(descriptor) => descriptor,
            Err(err) => {
                self.error_logger.error("Unable to describe expansion class", Some(&err));
                return Err(err);
            }
        };

        let mut staged: Vec<TypeExpansion> = Vec::new();
        for target in descriptor.expansion_targets() {
            // A class naming the same target twice merges once.
            if staged.iter().any(|e| e.target() == target) {
                continue;
            }
            let mut expansion = self
                .expansions
                .get(target)
                .cloned()
                .unwrap_or_else(|| TypeExpansion::new(target));
            if let Err(err) = expansion.expand(&descriptor, &self.types) {
                self.error_logger.error(
                    &format!("Unable to register expansion {} for {target}", descriptor.name),
                    Some(&err),
                );
                return Err(err);
            }
            staged.push(expansion);
        }

        let contributed = staged.len();
        for expansion in staged {
            self.expansions.insert(expansion.target().to_string(), expansion);
        }
        Ok(contributed)
    }

    pub fn register_expansions<'a, S, I>(&mut self, classes: I) -> ImportReport
    where
        S: ClassSource + ?Sized + 'a,
        I: IntoIterator<Item = &'a S>,
    {
        let mut report = ImportReport::default();
        for class in classes {
            match self.register_expansion(class) {
                Ok(_) => report.imported += 1,
                Err(err) => report.failed.push(err),
            }
        }
        report
    }

    pub fn expansions(&self) -> &HashMap<String, TypeExpansion> {
        &self.expansions
    }

    pub fn expansion(&self, target: &str) -> Option<&TypeExpansion> {
        self.expansions.get(target)
    }

    // ===== Bracket handlers =====

    pub fn register_bracket_handler(&mut self, handler: Arc<dyn BracketHandler>) {
        self.bracket_handlers.insert(handler);
    }

    /// Remove a previously registered handler instance. No-op if absent.
    pub fn remove_bracket_handler(&mut self, handler: &Arc<dyn BracketHandler>) -> bool {
        self.bracket_handlers.remove(handler)
    }

    pub fn bracket_handlers(&self) -> &BracketHandlers {
        &self.bracket_handlers
    }

    /// Resolve the tokens of a bracket literal. The first handler (in
    /// priority order) whose pattern matches the concatenated text and which
    /// produces a symbol wins.
    pub fn resolve_bracket(&self, env: &GlobalEnvironment<'_>, tokens: &[Token]) -> Option<Arc<Symbol>> {
        self.bracket_handlers.resolve(env, tokens)
    }

    // ===== Environments =====

    /// Environment for one compilation over `units` (unit name → payload).
    pub fn make_global_environment(&self, units: BTreeMap<String, Vec<u8>>) -> GlobalEnvironment<'_> {
        GlobalEnvironment::new(self, units)
    }

    // ===== Accessors =====

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn root(&self) -> &Package {
        &self.root
    }

    pub fn error_logger(&self) -> &dyn ErrorLogger {
        self.error_logger.as_ref()
    }

    pub fn set_error_logger(&mut self, error_logger: Arc<dyn ErrorLogger>) {
        self.error_logger = error_logger;
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("globals", &self.globals.len())
            .field("types", &self.types.len())
            .field("expansions", &self.expansions.len())
            .field("bracket_handlers", &self.bracket_handlers)
            .finish()
    }
}
