//! The root package tree that types are registered into.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::diagnostics::ErrorLogger;
use crate::symbols::Symbol;

#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Package(Package),
    Symbol(Arc<Symbol>),
}

impl Binding {
    pub fn as_symbol(&self) -> Option<&Arc<Symbol>> {
        match self {
            Binding::Symbol(symbol) => Some(symbol),
            Binding::Package(_) => None,
        }
    }

    pub fn as_package(&self) -> Option<&Package> {
        match self {
            Binding::Package(package) => Some(package),
            Binding::Symbol(_) => None,
        }
    }
}

/// One node of the namespace tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    name: String,
    /// Dotted path from the root; empty for the root itself.
    path: String,
    members: BTreeMap<String, Binding>,
}

impl Package {
    pub fn root(name: impl Into<String>) -> Self {
        Self { name: name.into(), path: String::new(), members: BTreeMap::new() }
    }

    fn child(&self, segment: &str) -> Self {
        let path = self.qualify(segment);
        Self { name: path.clone(), path, members: BTreeMap::new() }
    }

    fn qualify(&self, segment: &str) -> String {
        if self.path.is_empty() {
            segment.to_string()
        } else {
            format!("{}.{segment}", self.path)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Bind `symbol` at dotted `path`, creating intermediate packages.
    ///
    /// Conflicts are reported to `logger` and leave the tree untouched;
    /// the return value says whether the symbol was bound.
    pub fn put(&mut self, path: &str, symbol: Arc<Symbol>, logger: &dyn ErrorLogger) -> bool {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            logger.error(&format!("invalid symbol path '{path}' in {}", self.name), None);
            return false;
        }
        let Some((last, parents)) = segments.split_last() else {
            return false;
        };

        // Check the whole path before creating anything.
        let mut probe: &Package = self;
        for segment in parents {
            match probe.members.get(*segment) {
                Some(Binding::Package(package)) => probe = package,
                Some(Binding::Symbol(_)) => {
                    logger.error(&format!("{} is not a package", probe.qualify(segment)), None);
                    return false;
                }
                None => break,
            }
        }
        if let Some(existing) = self.lookup(path) {
            let what = match existing {
                Binding::Package(_) => "package",
                Binding::Symbol(_) => "symbol",
            };
            logger.error(&format!("Duplicate symbol: {path} is already bound to a {what}"), None);
            return false;
        }

        let mut current = self;
        for segment in parents {
            let child = current.child(segment);
            let binding = current
                .members
                .entry((*segment).to_string())
                .or_insert_with(|| Binding::Package(child));
            current = match binding {
                Binding::Package(package) => package,
                // Ruled out by the probe above.
                Binding::Symbol(_) => return false,
            };
        }
        current.members.insert((*last).to_string(), Binding::Symbol(symbol));
        true
    }

    /// Direct member of this package.
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.members.get(name)
    }

    /// Follow a dotted path from this package.
    pub fn lookup(&self, path: &str) -> Option<&Binding> {
        let mut segments = path.split('.');
        let mut binding = self.members.get(segments.next()?)?;
        for segment in segments {
            binding = binding.as_package()?.members.get(segment)?;
        }
        Some(binding)
    }

    pub fn package(&self, path: &str) -> Option<&Package> {
        self.lookup(path)?.as_package()
    }

    pub fn symbol(&self, path: &str) -> Option<&Arc<Symbol>> {
        self.lookup(path)?.as_symbol()
    }

    pub fn members(&self) -> &BTreeMap<String, Binding> {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Every symbol in the subtree with its qualified path, depth first in
    /// name order.
    pub fn symbols(&self) -> Vec<(String, &Arc<Symbol>)> {
        let mut out = Vec::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols<'a>(&'a self, out: &mut Vec<(String, &'a Arc<Symbol>)>) {
        for (name, binding) in &self.members {
            match binding {
                Binding::Symbol(symbol) => out.push((self.qualify(name), symbol)),
                Binding::Package(package) => package.collect_symbols(out),
            }
        }
    }
}
