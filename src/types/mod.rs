pub mod native;

use std::collections::HashMap;
use std::sync::Arc;

use crate::diagnostics::ImportError;
use crate::host::{ClassDescriptor, MemberDescriptor, MemberKind};
use native::{NativeField, NativeMethod, NativeType};

/// A type as scripts see it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScriptType {
    Void,
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    Any,
    Array(Box<ScriptType>),
    List(Box<ScriptType>),
    Map(Box<ScriptType>, Box<ScriptType>),
    /// A host class, by qualified host name. Need not be imported yet.
    Native(std::string::String),
}

impl std::fmt::Display for ScriptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptType::Void => write!(f, "void"),
            ScriptType::Bool => write!(f, "bool"),
            ScriptType::Byte => write!(f, "byte"),
            ScriptType::Short => write!(f, "short"),
            ScriptType::Int => write!(f, "int"),
            ScriptType::Long => write!(f, "long"),
            ScriptType::Float => write!(f, "float"),
            ScriptType::Double => write!(f, "double"),
            ScriptType::String => write!(f, "string"),
            ScriptType::Any => write!(f, "any"),
            ScriptType::Array(inner) => write!(f, "{inner}[]"),
            ScriptType::List(inner) => write!(f, "[{inner}]"),
            ScriptType::Map(k, v) => write!(f, "{v}[{k}]"),
            ScriptType::Native(name) => write!(f, "{name}"),
        }
    }
}

impl ScriptType {
    /// Parse a host type name: primitives, `T[]`, `List<T>`, `Map<K, V>` or
    /// a qualified class name. Returns `None` for anything malformed.
    pub fn parse(name: &str) -> Option<ScriptType> {
        let name = name.trim();
        if let Some(element) = name.strip_suffix("[]") {
            return Some(ScriptType::Array(Box::new(ScriptType::parse(element)?)));
        }
        if let Some(inner) = generic_args(name, "List") {
            return Some(ScriptType::List(Box::new(ScriptType::parse(inner)?)));
        }
        if let Some(inner) = generic_args(name, "Map") {
            let (key, value) = split_top_level_comma(inner)?;
            return Some(ScriptType::Map(
                Box::new(ScriptType::parse(key)?),
                Box::new(ScriptType::parse(value)?),
            ));
        }

        let ty = match name {
            "void" => ScriptType::Void,
            "bool" | "boolean" => ScriptType::Bool,
            "byte" => ScriptType::Byte,
            "short" => ScriptType::Short,
            "int" => ScriptType::Int,
            "long" => ScriptType::Long,
            "float" => ScriptType::Float,
            "double" => ScriptType::Double,
            "string" => ScriptType::String,
            "any" => ScriptType::Any,
            _ if is_qualified_name(name) => ScriptType::Native(name.to_string()),
            _ => return None,
        };
        Some(ty)
    }
}

fn generic_args<'a>(name: &'a str, head: &str) -> Option<&'a str> {
    name.strip_prefix(head)?.strip_prefix('<')?.strip_suffix('>')
}

/// Split `K, V` on the first comma at angle-bracket depth 0.
fn split_top_level_comma(inner: &str) -> Option<(&str, &str)> {
    let mut depth = 0i32;
    for (i, ch) in inner.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => return Some((&inner[..i], &inner[i + 1..])),
            _ => {}
        }
    }
    None
}

/// `a.b.C`, `Outer$Inner`: non-empty segments of identifier characters.
pub fn is_qualified_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
                }
                _ => false,
            }
        })
}

/// Every native type known to this compilation session, keyed by host name.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    natives: HashMap<String, Arc<NativeType>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve_type(&self, name: &str, context: &str) -> Result<ScriptType, ImportError> {
        ScriptType::parse(name).ok_or_else(|| ImportError::unresolved(name, context))
    }

    /// Resolve a method member's parameter and return types.
    pub fn resolve_method(
        &self,
        class: &str,
        member: &MemberDescriptor,
    ) -> Result<NativeMethod, ImportError> {
        let context = format!("{class}.{}", member.name);
        let MemberKind::Method { params, returns } = &member.kind else {
            return Err(ImportError::malformed_member(class, &member.name, "expected a method"));
        };
        let params = params
            .iter()
            .map(|p| self.resolve_type(p, &context))
            .collect::<Result<Vec<_>, _>>()?;
        let returns = self.resolve_type(returns, &context)?;
        Ok(NativeMethod {
            owner: class.to_string(),
            name: member.name.clone(),
            params,
            returns,
            is_static: member.is_static,
        })
    }

    pub fn resolve_field(
        &self,
        class: &str,
        member: &MemberDescriptor,
    ) -> Result<NativeField, ImportError> {
        let MemberKind::Field { ty } = &member.kind else {
            return Err(ImportError::malformed_member(class, &member.name, "expected a field"));
        };
        let ty = self.resolve_type(ty, &format!("{class}.{}", member.name))?;
        Ok(NativeField {
            owner: class.to_string(),
            name: member.name.clone(),
            ty,
            is_static: member.is_static,
        })
    }

    /// Lift a host class and remember it. A class that is already known is
    /// returned as-is; the first registration wins.
    pub fn complete(&mut self, descriptor: &ClassDescriptor) -> Result<Arc<NativeType>, ImportError> {
        if let Some(existing) = self.natives.get(&descriptor.name) {
            tracing::debug!(class = %descriptor.name, "native type already completed");
            return Ok(Arc::clone(existing));
        }

        let ty = Arc::new(NativeType::lift(descriptor, self)?);
        tracing::debug!(
            class = %descriptor.name,
            name = %ty.name(),
            instance = ty.instance_members().len(),
            statics = ty.static_members().len(),
            "completed native type"
        );
        self.natives.insert(descriptor.name.clone(), Arc::clone(&ty));
        Ok(ty)
    }

    pub fn get(&self, host_name: &str) -> Option<&Arc<NativeType>> {
        self.natives.get(host_name)
    }

    pub fn contains(&self, host_name: &str) -> bool {
        self.natives.contains_key(host_name)
    }

    pub fn len(&self) -> usize {
        self.natives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.natives.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<NativeType>> {
        self.natives.values()
    }
}
