//! Host-platform class descriptors.
//!
//! The registry never reflects over host classes itself. A platform adapter
//! (or a manifest) produces a [`ClassDescriptor`] and hands it in through the
//! [`ClassSource`] trait.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::diagnostics::ImportError;

/// Something that can describe a host class. Adapters that reflect lazily
/// return [`ImportError::Source`] when the class cannot be inspected.
pub trait ClassSource {
    fn describe(&self) -> Result<Cow<'_, ClassDescriptor>, ImportError>;
}

impl ClassSource for ClassDescriptor {
    fn describe(&self) -> Result<Cow<'_, ClassDescriptor>, ImportError> {
        Ok(Cow::Borrowed(self))
    }
}

impl<T: ClassSource + ?Sized> ClassSource for &T {
    fn describe(&self) -> Result<Cow<'_, ClassDescriptor>, ImportError> {
        (**self).describe()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    /// Qualified host name, e.g. `mods.items.ItemStack`.
    pub name: String,
    #[serde(default)]
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub members: Vec<MemberDescriptor>,
}

/// Class-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum Marker {
    /// Contribute this class's members to the expansion of the named type.
    Expansion(String),
    /// Name the class is visible under in scripts.
    Alias(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDescriptor {
    pub name: String,
    #[serde(flatten)]
    pub kind: MemberKind,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub visibility: Visibility,
    /// How the member surfaces in scripts. Unmarked members stay hidden.
    #[serde(default)]
    pub expose: Option<Exposure>,
    /// Script-side name, when it differs from the host name.
    #[serde(default)]
    pub script_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum MemberKind {
    Method {
        #[serde(default)]
        params: Vec<String>,
        #[serde(default = "void_type")]
        returns: String,
    },
    Field {
        #[serde(rename = "type")]
        ty: String,
    },
}

fn void_type() -> String {
    "void".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Exposure {
    Method,
    StaticMethod,
    Getter,
    Setter,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), markers: Vec::new(), members: Vec::new() }
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn with_member(mut self, member: MemberDescriptor) -> Self {
        self.members.push(member);
        self
    }

    /// Last segment of the qualified host name.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit(['.', '$']).next().unwrap_or(&self.name)
    }

    /// Name the class is registered under: the alias if one is applied.
    pub fn canonical_name(&self) -> &str {
        self.markers
            .iter()
            .find_map(|m| match m {
                Marker::Alias(alias) => Some(alias.as_str()),
                _ => None,
            })
            .unwrap_or(&self.name)
    }

    /// Every type this class expands, in declaration order.
    pub fn expansion_targets(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().filter_map(|m| match m {
            Marker::Expansion(target) => Some(target.as_str()),
            _ => None,
        })
    }

    pub fn members_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MemberDescriptor> {
        self.members.iter().filter(move |m| m.name == name)
    }
}

impl MemberDescriptor {
    pub fn method(name: impl Into<String>, params: &[&str], returns: &str) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Method {
                params: params.iter().map(|p| p.to_string()).collect(),
                returns: returns.to_string(),
            },
            is_static: false,
            visibility: Visibility::Public,
            expose: None,
            script_name: None,
        }
    }

    pub fn field(name: impl Into<String>, ty: &str) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Field { ty: ty.to_string() },
            is_static: false,
            visibility: Visibility::Public,
            expose: None,
            script_name: None,
        }
    }

    pub fn make_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    pub fn exposed(mut self, exposure: Exposure) -> Self {
        self.expose = Some(exposure);
        self
    }

    pub fn renamed(mut self, script_name: impl Into<String>) -> Self {
        self.script_name = Some(script_name.into());
        self
    }

    /// Name the member is visible under in scripts.
    pub fn script_name(&self) -> &str {
        self.script_name.as_deref().unwrap_or(&self.name)
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, MemberKind::Method { .. })
    }

    /// Parameter type names, empty for fields.
    pub fn params(&self) -> &[String] {
        match &self.kind {
            MemberKind::Method { params, .. } => params,
            MemberKind::Field { .. } => &[],
        }
    }
}
