//! Bracket handlers resolve `<...>` literals to symbols.
//!
//! The chain is kept sorted on `(priority, identity)`; the lowest priority
//! runs first. Handlers with an equal key stay in registration order.

pub mod pattern;

use std::borrow::Cow;
use std::sync::Arc;

use regex::Regex;

use crate::environment::GlobalEnvironment;
use crate::lexer::{self, Token};
use crate::symbols::Symbol;

pub use pattern::PatternBracketHandler;

pub trait BracketHandler: Send + Sync {
    fn priority(&self) -> i32 {
        0
    }

    /// Matched against the concatenated token text.
    fn pattern(&self) -> &BracketPattern;

    /// `None` lets the next matching handler try.
    fn resolve(&self, env: &GlobalEnvironment<'_>, tokens: &[Token]) -> Option<Arc<Symbol>>;

    /// Tie-break key between handlers of equal priority.
    fn identity(&self) -> Cow<'_, str> {
        Cow::Borrowed(std::any::type_name::<Self>())
    }
}

/// A regular expression that must match the whole literal text.
#[derive(Debug, Clone)]
pub struct BracketPattern {
    source: String,
    regex: Regex,
}

impl BracketPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self { source: pattern.to_string(), regex })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Capture groups of a full match, in order. Groups that did not
    /// participate are returned as empty strings.
    pub fn captures<'t>(&self, text: &'t str) -> Option<Vec<&'t str>> {
        let caps = self.regex.captures(text)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|group| group.map_or("", |m| m.as_str()))
                .collect(),
        )
    }
}

impl PartialEq for BracketPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Ordered handler chain.
#[derive(Clone, Default)]
pub struct BracketHandlers {
    handlers: Vec<Arc<dyn BracketHandler>>,
}

impl BracketHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, handler: Arc<dyn BracketHandler>) {
        let priority = handler.priority();
        let identity = handler.identity().into_owned();
        let pos = self.handlers.partition_point(|h| {
            (h.priority(), &*h.identity()) <= (priority, identity.as_str())
        });
        tracing::debug!(priority, %identity, position = pos, "registered bracket handler");
        self.handlers.insert(pos, handler);
    }

    /// Remove the given handler instance. Returns `false` if it was not registered.
    pub fn remove(&mut self, handler: &Arc<dyn BracketHandler>) -> bool {
        match self.handlers.iter().position(|h| Arc::ptr_eq(h, handler)) {
            Some(pos) => {
                self.handlers.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, handler: &Arc<dyn BracketHandler>) -> bool {
        self.handlers.iter().any(|h| Arc::ptr_eq(h, handler))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn BracketHandler>> {
        self.handlers.iter()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn resolve(&self, env: &GlobalEnvironment<'_>, tokens: &[Token]) -> Option<Arc<Symbol>> {
        if tokens.is_empty() {
            return None;
        }

        let text = lexer::concat(tokens);
        for handler in &self.handlers {
            if !handler.pattern().matches(&text) {
                continue;
            }
            tracing::trace!(%text, handler = %handler.identity(), "bracket pattern matched");
            if let Some(symbol) = handler.resolve(env, tokens) {
                return Some(symbol);
            }
        }

        tracing::trace!(%text, "no bracket handler resolved literal");
        None
    }
}

impl std::fmt::Debug for BracketHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|h| (h.priority(), h.identity().into_owned())))
            .finish()
    }
}
