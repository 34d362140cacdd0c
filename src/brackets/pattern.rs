use std::borrow::Cow;
use std::sync::Arc;

use super::{BracketHandler, BracketPattern};
use crate::environment::GlobalEnvironment;
use crate::lexer::{self, Token};
use crate::symbols::{Constant, Symbol};
use crate::types::ScriptType;
use crate::types::native::NativeMethod;

/// Declarative handler: when the pattern matches, call `method` with the
/// pattern's capture groups as constant arguments.
///
/// `ore:(.+)` bound to `OreDict.get(string)` turns `<ore:ingotIron>` into
/// `OreDict.get("ingotIron")`.
#[derive(Debug, Clone)]
pub struct PatternBracketHandler {
    name: String,
    priority: i32,
    pattern: BracketPattern,
    method: Arc<NativeMethod>,
}

impl PatternBracketHandler {
    pub fn new(
        name: impl Into<String>,
        priority: i32,
        pattern: BracketPattern,
        method: Arc<NativeMethod>,
    ) -> Self {
        Self { name: name.into(), priority, pattern, method }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> &Arc<NativeMethod> {
        &self.method
    }

    fn arguments(&self, captures: &[&str]) -> Option<Vec<Constant>> {
        if captures.len() != self.method.arity() {
            return None;
        }
        captures
            .iter()
            .zip(&self.method.params)
            .map(|(text, ty)| constant_for(text, ty))
            .collect()
    }
}

/// Convert captured text to a constant of the parameter's type.
fn constant_for(text: &str, ty: &ScriptType) -> Option<Constant> {
    match ty {
        ScriptType::String | ScriptType::Any => Some(Constant::String(text.to_string())),
        ScriptType::Bool => text.parse().ok().map(Constant::Bool),
        ScriptType::Byte => integer(text).and_then(|v| i8::try_from(v).ok()).map(|v| Constant::Int(v.into())),
        ScriptType::Short => integer(text).and_then(|v| i16::try_from(v).ok()).map(|v| Constant::Int(v.into())),
        ScriptType::Int => integer(text).and_then(|v| i32::try_from(v).ok()).map(|v| Constant::Int(v.into())),
        ScriptType::Long => integer(text).map(Constant::Int),
        ScriptType::Float | ScriptType::Double => text.parse().ok().map(Constant::Float),
        _ => None,
    }
}

/// Decimal (optionally signed) or `0x` hex. No sign is allowed after `0x`.
fn integer(text: &str) -> Option<i64> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) if hex.starts_with(['+', '-']) => None,
        Some(hex) => i64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

impl BracketHandler for PatternBracketHandler {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn pattern(&self) -> &BracketPattern {
        &self.pattern
    }

    fn resolve(&self, _env: &GlobalEnvironment<'_>, tokens: &[Token]) -> Option<Arc<Symbol>> {
        let text = lexer::concat(tokens);
        let captures = self.pattern.captures(&text)?;
        let args = self.arguments(&captures)?;
        Some(Arc::new(Symbol::StaticCall { method: Arc::clone(&self.method), args }))
    }

    fn identity(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}
