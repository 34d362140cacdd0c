use std::collections::BTreeMap;
use std::sync::Arc;

use super::{ScriptType, TypeRegistry, is_qualified_name};
use crate::diagnostics::ImportError;
use crate::host::{ClassDescriptor, Exposure, MemberDescriptor, MemberKind};

/// A host method callable from scripts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NativeMethod {
    /// Host class that declares the method.
    pub owner: String,
    pub name: String,
    pub params: Vec<ScriptType>,
    pub returns: ScriptType,
    pub is_static: bool,
}

impl NativeMethod {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Same owner, name and parameter list.
    pub fn same_signature(&self, other: &NativeMethod) -> bool {
        self.owner == other.owner && self.name == other.name && self.params == other.params
    }
}

impl std::fmt::Display for NativeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}(", self.owner, self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{p}")?;
        }
        write!(f, ") {}", self.returns)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NativeField {
    pub owner: String,
    pub name: String,
    pub ty: ScriptType,
    pub is_static: bool,
}

impl std::fmt::Display for NativeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}: {}", self.owner, self.name, self.ty)
    }
}

/// Backing of a getter or setter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    Method(Arc<NativeMethod>),
    Field(Arc<NativeField>),
}

/// Everything visible under one member name: overloads plus accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeMember {
    pub methods: Vec<Arc<NativeMethod>>,
    pub getter: Option<Accessor>,
    pub setter: Option<Accessor>,
}

impl NativeMember {
    /// Add an overload. Returns `false` if an identical one is already present.
    pub fn add_method(&mut self, method: Arc<NativeMethod>) -> bool {
        if self.methods.iter().any(|m| m.same_signature(&method)) {
            return false;
        }
        self.methods.push(method);
        true
    }

    /// Find the overload whose parameters match exactly.
    pub fn method(&self, params: &[ScriptType]) -> Option<&Arc<NativeMethod>> {
        self.methods.iter().find(|m| m.params == params)
    }
}

/// A host class lifted into the script type system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeType {
    name: String,
    host_name: String,
    instance_members: BTreeMap<String, NativeMember>,
    static_members: BTreeMap<String, NativeMember>,
}

impl NativeType {
    pub fn new(name: impl Into<String>, host_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host_name: host_name.into(),
            instance_members: BTreeMap::new(),
            static_members: BTreeMap::new(),
        }
    }

    /// Build the script view of `descriptor`, resolving member signatures
    /// against `types`. Only members carrying an [`Exposure`] are lifted.
    pub fn lift(descriptor: &ClassDescriptor, types: &TypeRegistry) -> Result<Self, ImportError> {
        let class = descriptor.name.as_str();
        if !is_qualified_name(class) {
            return Err(ImportError::malformed(class, "class name is not a qualified name"));
        }
        let name = descriptor.canonical_name();
        if !is_qualified_name(name) {
            return Err(ImportError::malformed(class, format!("invalid script name '{name}'")));
        }

        let mut ty = NativeType::new(name, class);
        for member in &descriptor.members {
            let Some(exposure) = member.expose else { continue };
            if !member.is_public() {
                return Err(ImportError::malformed_member(class, &member.name, "exposed member is not public"));
            }
            ty.lift_member(class, member, exposure, types)?;
        }
        Ok(ty)
    }

    fn lift_member(
        &mut self,
        class: &str,
        member: &MemberDescriptor,
        exposure: Exposure,
        types: &TypeRegistry,
    ) -> Result<(), ImportError> {
        let slot = if member.is_static {
            self.static_members.entry(member.script_name().to_string()).or_default()
        } else {
            self.instance_members.entry(member.script_name().to_string()).or_default()
        };

        match (exposure, &member.kind) {
            (Exposure::Method, MemberKind::Method { .. }) => {
                slot.add_method(Arc::new(types.resolve_method(class, member)?));
            }
            (Exposure::StaticMethod, MemberKind::Method { .. }) if member.is_static => {
                slot.add_method(Arc::new(types.resolve_method(class, member)?));
            }
            (Exposure::StaticMethod, _) => {
                return Err(ImportError::malformed_member(class, &member.name, "static method marker on a non-static method"));
            }
            (Exposure::Getter, MemberKind::Method { params, .. }) if params.is_empty() => {
                let accessor = Accessor::Method(Arc::new(types.resolve_method(class, member)?));
                set_accessor(&mut slot.getter, accessor, class, member, "getter")?;
            }
            (Exposure::Setter, MemberKind::Method { params, .. }) if params.len() == 1 => {
                let accessor = Accessor::Method(Arc::new(types.resolve_method(class, member)?));
                set_accessor(&mut slot.setter, accessor, class, member, "setter")?;
            }
            (Exposure::Getter, MemberKind::Field { .. }) => {
                let accessor = Accessor::Field(Arc::new(types.resolve_field(class, member)?));
                set_accessor(&mut slot.getter, accessor, class, member, "getter")?;
            }
            (Exposure::Setter, MemberKind::Field { .. }) => {
                let accessor = Accessor::Field(Arc::new(types.resolve_field(class, member)?));
                set_accessor(&mut slot.setter, accessor, class, member, "setter")?;
            }
            (Exposure::Method, MemberKind::Field { .. }) => {
                return Err(ImportError::malformed_member(class, &member.name, "method marker on a field"));
            }
            (Exposure::Getter, _) => {
                return Err(ImportError::malformed_member(class, &member.name, "getter must take no parameters"));
            }
            (Exposure::Setter, _) => {
                return Err(ImportError::malformed_member(class, &member.name, "setter must take exactly one parameter"));
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    pub fn instance_members(&self) -> &BTreeMap<String, NativeMember> {
        &self.instance_members
    }

    pub fn static_members(&self) -> &BTreeMap<String, NativeMember> {
        &self.static_members
    }

    pub fn instance_member(&self, name: &str) -> Option<&NativeMember> {
        self.instance_members.get(name)
    }

    pub fn static_member(&self, name: &str) -> Option<&NativeMember> {
        self.static_members.get(name)
    }

    /// Expose `method` as a static member under its own name.
    pub fn add_static_method(&mut self, method: Arc<NativeMethod>) -> bool {
        self.static_members.entry(method.name.clone()).or_default().add_method(method)
    }
}

fn set_accessor(
    slot: &mut Option<Accessor>,
    accessor: Accessor,
    class: &str,
    member: &MemberDescriptor,
    what: &str,
) -> Result<(), ImportError> {
    if slot.is_some() {
        return Err(ImportError::malformed_member(
            class,
            &member.name,
            format!("duplicate {what} for '{}'", member.script_name()),
        ));
    }
    *slot = Some(accessor);
    Ok(())
}
