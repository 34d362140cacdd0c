use std::sync::Arc;

use crate::types::ScriptType;
use crate::types::native::{NativeField, NativeMethod, NativeType};

/// Compile-time constant, as produced by bracket handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Constant {
    pub fn ty(&self) -> ScriptType {
        match self {
            Constant::Bool(_) => ScriptType::Bool,
            Constant::Int(_) => ScriptType::Long,
            Constant::Float(_) => ScriptType::Double,
            Constant::String(_) => ScriptType::String,
        }
    }
}

impl std::fmt::Display for Constant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constant::Bool(b) => write!(f, "{b}"),
            Constant::Int(n) => write!(f, "{n}"),
            Constant::Float(x) => write!(f, "{x}"),
            Constant::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// What an identifier or bracket literal resolves to.
///
/// Packages are not symbols here: they live in the namespace tree as
/// [`crate::namespace::Binding::Package`].
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Type(Arc<NativeType>),
    StaticMethod(Arc<NativeMethod>),
    StaticField(Arc<NativeField>),
    /// A static call with constant arguments, evaluated at script load.
    StaticCall { method: Arc<NativeMethod>, args: Vec<Constant> },
    Constant(Constant),
}

impl Symbol {
    pub fn constant(value: Constant) -> Arc<Symbol> {
        Arc::new(Symbol::Constant(value))
    }

    /// Script type of the value this symbol produces.
    pub fn ty(&self) -> ScriptType {
        match self {
            Symbol::Type(ty) => ScriptType::Native(ty.host_name().to_string()),
            Symbol::StaticMethod(method) => method.returns.clone(),
            Symbol::StaticField(field) => field.ty.clone(),
            Symbol::StaticCall { method, .. } => method.returns.clone(),
            Symbol::Constant(c) => c.ty(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Symbol::Type(_) => "type",
            Symbol::StaticMethod(_) => "static method",
            Symbol::StaticField(_) => "static field",
            Symbol::StaticCall { .. } => "static call",
            Symbol::Constant(_) => "constant",
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Type(ty) => write!(f, "type {}", ty.name()),
            Symbol::StaticMethod(method) => write!(f, "{method}"),
            Symbol::StaticField(field) => write!(f, "{field}"),
            Symbol::StaticCall { method, args } => {
                write!(f, "{}.{}(", method.owner, method.name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Symbol::Constant(c) => write!(f, "{c}"),
        }
    }
}
