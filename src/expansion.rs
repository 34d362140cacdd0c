//! Type expansions: members attached to an existing type by other classes.
//!
//! Expansion members are static host functions. Instance-side members take
//! the receiver as their first host parameter; scripts never see it.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::diagnostics::ImportError;
use crate::host::{ClassDescriptor, Exposure, MemberDescriptor};
use crate::types::native::{Accessor, NativeMember, NativeMethod};
use crate::types::{ScriptType, TypeRegistry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpansion {
    target: String,
    instance_members: BTreeMap<String, NativeMember>,
    static_members: BTreeMap<String, NativeMember>,
    contributors: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Method,
    Getter,
    Setter,
}

impl Slot {
    fn accessor(self) -> &'static str {
        match self {
            Slot::Getter => "getter",
            Slot::Setter => "setter",
            Slot::Method => "method",
        }
    }
}

struct Staged {
    is_static: bool,
    name: String,
    slot: Slot,
    method: Arc<NativeMethod>,
}

impl TypeExpansion {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            instance_members: BTreeMap::new(),
            static_members: BTreeMap::new(),
            contributors: BTreeSet::new(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Merge the exposed members of `class` into this expansion.
    ///
    /// Every member is resolved before anything is merged, so an error leaves
    /// the expansion as it was. Members already contributed by the same class
    /// are skipped. Returns how many members were newly added.
    pub fn expand(&mut self, class: &ClassDescriptor, types: &TypeRegistry) -> Result<usize, ImportError> {
        let mut staged: Vec<Staged> = Vec::new();
        for member in &class.members {
            let Some(exposure) = member.expose else { continue };
            let item = self.stage(class, member, exposure, types)?;
            if item.slot != Slot::Method
                && staged
                    .iter()
                    .any(|s| s.slot == item.slot && s.is_static == item.is_static && s.name == item.name)
            {
                return Err(ImportError::malformed_member(
                    &class.name,
                    &member.name,
                    format!("duplicate {} for '{}'", item.slot.accessor(), item.name),
                ));
            }
            staged.push(item);
        }

        let mut added = 0;
        for item in staged {
            let members = if item.is_static { &mut self.static_members } else { &mut self.instance_members };
            let entry = members.entry(item.name).or_default();
            let fresh = match item.slot {
                Slot::Method => entry.add_method(item.method),
                Slot::Getter => fill(&mut entry.getter, item.method),
                Slot::Setter => fill(&mut entry.setter, item.method),
            };
            if fresh {
                added += 1;
            }
        }

        self.contributors.insert(class.name.clone());
        tracing::debug!(target_type = %self.target, class = %class.name, added, "expanded type");
        Ok(added)
    }

    fn stage(
        &self,
        class: &ClassDescriptor,
        member: &MemberDescriptor,
        exposure: Exposure,
        types: &TypeRegistry,
    ) -> Result<Staged, ImportError> {
        let malformed = |msg: &str| ImportError::malformed_member(&class.name, &member.name, msg);

        if !member.is_public() {
            return Err(malformed("expansion member is not public"));
        }
        if !member.is_method() || !member.is_static {
            return Err(malformed("expansion members must be static methods"));
        }

        let arity = member.params().len();
        let (is_static, slot) = match exposure {
            Exposure::StaticMethod => (true, Slot::Method),
            Exposure::Method if arity >= 1 => (false, Slot::Method),
            Exposure::Getter if arity == 1 => (false, Slot::Getter),
            Exposure::Setter if arity == 2 => (false, Slot::Setter),
            Exposure::Method => return Err(malformed("instance expansion method needs a receiver parameter")),
            Exposure::Getter => return Err(malformed("expansion getter takes only the receiver")),
            Exposure::Setter => return Err(malformed("expansion setter takes the receiver and one value")),
        };

        let method = Arc::new(types.resolve_method(&class.name, member)?);
        let name = member.script_name().to_string();

        let members = if is_static { &self.static_members } else { &self.instance_members };
        if let Some(existing) = members.get(&name) {
            let taken = match slot {
                Slot::Getter => existing.getter.as_ref(),
                Slot::Setter => existing.setter.as_ref(),
                Slot::Method => None,
            };
            if let Some(Accessor::Method(current)) = taken {
                if !current.same_signature(&method) {
                    return Err(malformed(&format!(
                        "'{}' already has a {} from {}",
                        name,
                        slot.accessor(),
                        current.owner
                    )));
                }
            }
        }

        Ok(Staged { is_static, name, slot, method })
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

    /// Instance overload by script-visible parameters (receiver excluded).
    pub fn instance_method(&self, name: &str, params: &[ScriptType]) -> Option<&Arc<NativeMethod>> {
        self.instance_members
            .get(name)?
            .methods
            .iter()
            .find(|m| m.params.get(1..) == Some(params))
    }

    /// Host classes that contributed to this expansion.
    pub fn contributors(&self) -> &BTreeSet<String> {
        &self.contributors
    }

    pub fn is_empty(&self) -> bool {
        self.instance_members.is_empty() && self.static_members.is_empty()
    }
}

fn fill(slot: &mut Option<Accessor>, method: Arc<NativeMethod>) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(Accessor::Method(method));
    true
}
