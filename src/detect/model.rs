//! Entities recognized from dependency-property idioms.
//!
//! These are owned snapshots: they outlive the syntax tree and travel with
//! each [`Finding`](super::Finding) so fix logic can use them.

use serde::{Deserialize, Serialize};

use crate::analysis::{Span, TypeRef};

/// Where a registration's identity token is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Field,
    Property,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutability {
    ReadOnly,
    Mutable,
}

/// A field or property referenced by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRef {
    pub declaring_type: String,
    pub name: String,
    pub storage: StorageKind,
    pub file: String,
    pub span: Span,
}

/// Outcome of pairing a read-only key with its public member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReadOnlyPairing {
    /// Initialized exactly with `<key>.DependencyProperty`.
    Paired { member: MemberRef },
    /// Named like the public member but initialized with something else.
    Mismatched { member: MemberRef },
    Missing,
}

/// The storage location holding a registration result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackingMember {
    pub declaring_type: String,
    pub name: String,
    pub storage: StorageKind,
    pub mutability: Mutability,
    pub file: String,
    /// Span of the member's name.
    pub span: Span,
    /// Read-only registrations only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairing: Option<ReadOnlyPairing>,
}

impl BackingMember {
    /// The member code outside the type uses: the paired public member for
    /// a read-only key, the member itself otherwise.
    pub fn public_name(&self) -> &str {
        match &self.pairing {
            Some(ReadOnlyPairing::Paired { member }) => &member.name,
            _ => &self.name,
        }
    }
}

/// Kind of registration call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistrationKind {
    Register,
    RegisterReadOnly,
    RegisterAttached,
    RegisterAttachedReadOnly,
    /// Continuation of an existing registration for another owner.
    AddOwner,
    /// Continuation replacing metadata for a derived type.
    OverrideMetadata,
}

impl RegistrationKind {
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            RegistrationKind::RegisterReadOnly | RegistrationKind::RegisterAttachedReadOnly
        )
    }

    pub fn is_attached(&self) -> bool {
        matches!(
            self,
            RegistrationKind::RegisterAttached | RegistrationKind::RegisterAttachedReadOnly
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationKind::Register => "Register",
            RegistrationKind::RegisterReadOnly => "RegisterReadOnly",
            RegistrationKind::RegisterAttached => "RegisterAttached",
            RegistrationKind::RegisterAttachedReadOnly => "RegisterAttachedReadOnly",
            RegistrationKind::AddOwner => "AddOwner",
            RegistrationKind::OverrideMetadata => "OverrideMetadata",
        }
    }
}

/// An argument captured from source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentRef {
    /// Name of the parameter it binds to.
    pub parameter: String,
    pub text: String,
    pub span: Span,
}

/// Default value and callbacks of a metadata construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataDescriptor {
    pub metadata_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<ArgumentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_changed_callback: Option<ArgumentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coerce_value_callback: Option<ArgumentRef>,
    pub span: Span,
}

impl MetadataDescriptor {
    pub fn is_empty(&self) -> bool {
        self.default_value.is_none()
            && self.property_changed_callback.is_none()
            && self.coerce_value_callback.is_none()
    }
}

/// A registration call tied to its backing member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub kind: RegistrationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_name: Option<String>,
    /// Declared value type; for continuations, taken from the continued
    /// registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_type: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataDescriptor>,
    pub backing: BackingMember,
    pub span: Span,
}

/// How the CLR accessors are declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locality {
    InstanceProperty,
    AttachedStaticMethods,
}

/// The dependency-object call an accessor makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueAccess {
    GetValue,
    SetValue,
    SetCurrentValue,
}

/// One side of an accessor pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessorSide {
    /// Property name or `Get<Name>` / `Set<Name>` method name.
    pub member: String,
    pub access: ValueAccess,
    /// Property type, get return type or set value parameter type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<TypeRef>,
    pub is_pure: bool,
    pub span: Span,
}

/// CLR-facing accessors of a dependency property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessorPair {
    pub locality: Locality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<AccessorSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<AccessorSide>,
}
