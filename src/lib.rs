pub mod span;
pub mod diagnostics;
pub mod lexer;
pub mod host;
pub mod types;
pub mod symbols;
pub mod namespace;
pub mod expansion;
pub mod brackets;
pub mod registry;
pub mod environment;
pub mod config;
pub mod manifest;

use std::sync::Arc;

pub use diagnostics::{ErrorLogger, ImportError, LexError, ManifestError, RegistryError};
pub use environment::{GlobalEnvironment, Lookup};
pub use registry::{ImportReport, Registry};
pub use symbols::{Constant, Symbol};

/// Resolve a bracket literal as written in source, e.g. `<ore:ingotIron>`
/// (lex → strip brackets → handler chain).
///
/// `Ok(None)` means the literal is well-formed but no handler produced a symbol.
pub fn resolve_literal(env: &GlobalEnvironment<'_>, literal: &str) -> Result<Option<Arc<Symbol>>, LexError> {
    let tokens = lexer::lex_bracket(literal)?;
    Ok(env.resolve_bracket(&tokens))
}
