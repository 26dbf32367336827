//! Two-phase classification of invocations and metadata constructions.
//!
//! The syntactic phase looks only at the invoked member name or the
//! constructed type's simple name. Most nodes stop there. A syntactic match
//! is confirmed against the catalog through the semantic model: the callee
//! must be the expected framework member with an allowed parameter count.

use phf::{phf_map, phf_set};
use tree_sitter::Node;

use crate::analysis::{syntax, SemanticModel, Symbol};
use crate::catalog::{self, KnownMember, KnownMemberKind, QualifiedMember};

use super::model::{RegistrationKind, ValueAccess};

/// Semantic role of a call or construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Register,
    RegisterReadOnly,
    RegisterAttached,
    RegisterAttachedReadOnly,
    AddOwner,
    OverrideMetadata,
    GetValue,
    SetValue,
    SetCurrentValue,
    MetadataConstruction,
}

impl Role {
    /// Registration kind for registration and continuation roles.
    pub fn registration_kind(&self) -> Option<RegistrationKind> {
        match self {
            Role::Register => Some(RegistrationKind::Register),
            Role::RegisterReadOnly => Some(RegistrationKind::RegisterReadOnly),
            Role::RegisterAttached => Some(RegistrationKind::RegisterAttached),
            Role::RegisterAttachedReadOnly => Some(RegistrationKind::RegisterAttachedReadOnly),
            Role::AddOwner => Some(RegistrationKind::AddOwner),
            Role::OverrideMetadata => Some(RegistrationKind::OverrideMetadata),
            _ => None,
        }
    }

    /// Value access kind for `GetValue`, `SetValue` and `SetCurrentValue`.
    pub fn value_access(&self) -> Option<ValueAccess> {
        match self {
            Role::GetValue => Some(ValueAccess::GetValue),
            Role::SetValue => Some(ValueAccess::SetValue),
            Role::SetCurrentValue => Some(ValueAccess::SetCurrentValue),
            _ => None,
        }
    }

    /// Catalog identities accepted for the role.
    fn identities(&self) -> &'static [QualifiedMember] {
        match self {
            Role::Register => &[catalog::REGISTER],
            Role::RegisterReadOnly => &[catalog::REGISTER_READ_ONLY],
            Role::RegisterAttached => &[catalog::REGISTER_ATTACHED],
            Role::RegisterAttachedReadOnly => &[catalog::REGISTER_ATTACHED_READ_ONLY],
            Role::AddOwner => &[catalog::ADD_OWNER],
            Role::OverrideMetadata => &[catalog::OVERRIDE_METADATA, catalog::KEY_OVERRIDE_METADATA],
            Role::GetValue => &[catalog::GET_VALUE],
            Role::SetValue => &[catalog::SET_VALUE],
            Role::SetCurrentValue => &[catalog::SET_CURRENT_VALUE],
            Role::MetadataConstruction => &[],
        }
    }

    /// Allowed parameter counts of the resolved overload.
    fn parameter_counts(&self) -> (usize, usize) {
        match self {
            Role::Register | Role::RegisterAttached => (3, 5),
            Role::RegisterReadOnly | Role::RegisterAttachedReadOnly => (4, 5),
            Role::AddOwner => (1, 2),
            Role::OverrideMetadata => (2, 3),
            Role::GetValue => (1, 1),
            Role::SetValue | Role::SetCurrentValue => (2, 2),
            Role::MetadataConstruction => (0, usize::MAX),
        }
    }
}

/// Invoked member names worth resolving.
static CANDIDATE_NAMES: phf::Map<&'static str, Role> = phf_map! {
    "Register" => Role::Register,
    "RegisterReadOnly" => Role::RegisterReadOnly,
    "RegisterAttached" => Role::RegisterAttached,
    "RegisterAttachedReadOnly" => Role::RegisterAttachedReadOnly,
    "AddOwner" => Role::AddOwner,
    "OverrideMetadata" => Role::OverrideMetadata,
    "GetValue" => Role::GetValue,
    "SetValue" => Role::SetValue,
    "SetCurrentValue" => Role::SetCurrentValue,
};

/// Simple names of the metadata types.
static METADATA_TYPE_NAMES: phf::Set<&'static str> = phf_set! {
    "PropertyMetadata",
    "UIPropertyMetadata",
    "FrameworkPropertyMetadata",
};

/// A confirmed call.
#[derive(Debug, Clone, Copy)]
pub struct ClassifiedCall<'a> {
    pub role: Role,
    pub node: Node<'a>,
    /// The resolved framework member (a constructor for metadata).
    pub member: &'static KnownMember,
}

/// Classification result with an early exit.
#[derive(Debug, Clone, Copy)]
pub enum Classification<'a> {
    /// Failed the syntactic phase; nothing was resolved.
    NotCandidate,
    /// Syntactically plausible but not confirmed.
    Candidate,
    Confirmed(ClassifiedCall<'a>),
}

impl<'a> Classification<'a> {
    pub fn confirmed(self) -> Option<ClassifiedCall<'a>> {
        match self {
            Classification::Confirmed(call) => Some(call),
            _ => None,
        }
    }
}

/// Role suggested by syntax alone.
pub fn syntactic_role(node: Node<'_>, source: &[u8]) -> Option<Role> {
    match node.kind() {
        "invocation_expression" => {
            let name = syntax::invoked_name(node, source)?;
            CANDIDATE_NAMES.get(name).copied()
        }
        "object_creation_expression" => {
            let name = syntax::created_type_name(node, source)?;
            METADATA_TYPE_NAMES
                .contains(name)
                .then_some(Role::MetadataConstruction)
        }
        _ => None,
    }
}

/// Classify an invocation or object creation.
pub fn classify<'a>(node: Node<'a>, model: &SemanticModel<'a>) -> Classification<'a> {
    let Some(source) = model.source_of(node) else {
        return Classification::NotCandidate;
    };
    let Some(role) = syntactic_role(node, source) else {
        return Classification::NotCandidate;
    };

    let Some(Symbol::Known(member)) = model.resolve(node) else {
        return Classification::Candidate;
    };

    let identity_ok = match role {
        Role::MetadataConstruction => {
            member.kind == KnownMemberKind::Constructor
                && model.catalog().is_metadata_type(member.owner)
        }
        _ => {
            member.kind == KnownMemberKind::Method
                && role.identities().iter().any(|id| id.matches(member))
        }
    };
    let (min, max) = role.parameter_counts();
    let count = member.parameters.len();
    if !identity_ok || count < min || count > max {
        tracing::trace!(
            role = ?role,
            member = member.name,
            owner = member.owner,
            "candidate not confirmed"
        );
        return Classification::Candidate;
    }

    Classification::Confirmed(ClassifiedCall { role, node, member })
}

/// Classify and keep only confirmed results with the given role.
pub fn classify_as<'a>(node: Node<'a>, model: &SemanticModel<'a>, role: Role) -> Option<ClassifiedCall<'a>> {
    classify(node, model).confirmed().filter(|c| c.role == role)
}
