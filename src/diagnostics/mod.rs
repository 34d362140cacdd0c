use crate::span::Span;
use serde::Serialize;
use std::error::Error as StdError;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Fatal setup errors. Callers must propagate these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("symbol already exists: {name}")]
    DuplicateSymbol { name: String },
}

impl RegistryError {
    pub fn duplicate(name: impl Into<String>) -> Self {
        Self::DuplicateSymbol { name: name.into() }
    }
}

/// Non-fatal failures while lifting a host class. The registry logs these and
/// carries on with the next class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("cannot describe host class '{class}': {msg}")]
    Source { class: String, msg: String },

    #[error("malformed class descriptor '{class}': {msg}")]
    MalformedDescriptor { class: String, msg: String },

    #[error("malformed member '{class}.{member}': {msg}")]
    MalformedMember { class: String, member: String, msg: String },

    #[error("cannot resolve type '{ty}' used by '{context}'")]
    UnresolvedType { ty: String, context: String },

    #[error("no static method {class}.{name}({args})")]
    NoSuchMethod { class: String, name: String, args: String },

    #[error("no field '{name}' in class {class}")]
    NoSuchField { class: String, name: String },

    #[error("access denied to {class}.{name}")]
    AccessDenied { class: String, name: String },

    #[error("{class}.{name} is not static")]
    NotStatic { class: String, name: String },
}

impl ImportError {
    pub fn host(class: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Source { class: class.into(), msg: msg.into() }
    }

    pub fn malformed(class: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::MalformedDescriptor { class: class.into(), msg: msg.into() }
    }

    pub fn malformed_member(
        class: impl Into<String>,
        member: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::MalformedMember { class: class.into(), member: member.into(), msg: msg.into() }
    }

    pub fn unresolved(ty: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnresolvedType { ty: ty.into(), context: context.into() }
    }
}

/// Errors produced while tokenizing a bracket literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character '{text}'")]
    UnexpectedChar { text: String, span: Span },

    #[error("bracket literal must be enclosed in '<' and '>'")]
    Unbracketed { span: Span },

    #[error("empty bracket literal")]
    Empty { span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. }
            | LexError::Unbracketed { span }
            | LexError::Empty { span } => *span,
        }
    }
}

/// Errors while loading a registry manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("cannot read manifest '{}': {msg}", path.display())]
    Io { path: PathBuf, msg: String },

    #[error("invalid manifest: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("bracket handler '{name}' has an invalid pattern: {msg}")]
    Pattern { name: String, msg: String },

    #[error("unknown class '{name}'")]
    UnknownClass { name: String },

    #[error("class '{class}' has no member '{name}'")]
    UnknownMember { class: String, name: String },

    #[error("{entry}: {msg}")]
    InvalidEntry { entry: String, msg: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Import(#[from] ImportError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// One soft diagnostic recorded by a [`CollectingLogger`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub cause: Option<String>,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{label}: {}", self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, " ({cause})")?;
        }
        Ok(())
    }
}

/// Sink for non-fatal registry diagnostics: duplicate namespace bindings,
/// missing fields, classes that could not be imported.
pub trait ErrorLogger: Send + Sync {
    fn error(&self, message: &str, cause: Option<&(dyn StdError + 'static)>);

    fn warning(&self, message: &str);
}

/// Default logger. Forwards everything to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl ErrorLogger for TracingLogger {
    fn error(&self, message: &str, cause: Option<&(dyn StdError + 'static)>) {
        match cause {
            Some(cause) => tracing::error!(%cause, "{message}"),
            None => tracing::error!("{message}"),
        }
    }

    fn warning(&self, message: &str) {
        tracing::warn!("{message}");
    }
}

/// Records diagnostics in memory. Also forwards them to `tracing` at debug level.
#[derive(Debug, Default)]
pub struct CollectingLogger {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, diagnostic: Diagnostic) {
        tracing::debug!(%diagnostic, "recorded diagnostic");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn errors(&self) -> Vec<Diagnostic> {
        self.diagnostics()
            .into_iter()
            .filter(|d| d.severity == Severity::Error)
            .collect()
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.diagnostics()
            .into_iter()
            .filter(|d| d.severity == Severity::Warning)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).is_empty()
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl ErrorLogger for CollectingLogger {
    fn error(&self, message: &str, cause: Option<&(dyn StdError + 'static)>) {
        self.push(Diagnostic {
            severity: Severity::Error,
            message: message.to_string(),
            cause: cause.map(|c| c.to_string()),
        });
    }

    fn warning(&self, message: &str) {
        self.push(Diagnostic {
            severity: Severity::Warning,
            message: message.to_string(),
            cause: None,
        });
    }
}

/// Render a span-carrying error against the bracket literal it came from.
pub fn render_error(source: &str, message: &str, label: &str, span: Span) -> std::io::Result<()> {
    use ariadne::{Label, Report, ReportKind, Source};

    let end = span.end.min(source.len());
    let start = span.start.min(end);
    Report::build(ReportKind::Error, (), start)
        .with_message(message)
        .with_label(Label::new(start..end).with_message(label))
        .finish()
        .eprint(Source::from(source))
}
