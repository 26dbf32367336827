//! CLR accessor matching and purity.
//!
//! Instance registrations are wrapped by a property whose accessors call
//! `GetValue` and `SetValue` (or `SetCurrentValue`). Attached registrations
//! are wrapped by static `Get<Name>` / `Set<Name>` methods. In both cases
//! the qualifying call must pass the backing member, or the public member
//! paired with a read-only key, as the dependency property.

use tree_sitter::Node;

use crate::analysis::{syntax, MemberId, MemberKind, SemanticModel, Span, Symbol, TypeRef};
use crate::catalog::{DEPENDENCY_OBJECT, DEPENDENCY_PROPERTY, DEPENDENCY_PROPERTY_KEY};

use super::backing::Backing;
use super::classify::{classify, Role};
use super::model::{AccessorPair, AccessorSide, Locality, ValueAccess};

/// One matched accessor with its syntax.
#[derive(Debug, Clone)]
pub struct SideMatch<'a> {
    /// Property or method declaration.
    pub member: Node<'a>,
    /// Accessor body or method body.
    pub body: Node<'a>,
    /// The qualifying `GetValue` / `SetValue` / `SetCurrentValue` call.
    pub call: Node<'a>,
    /// Statements other than the one holding the qualifying call.
    pub impure: Vec<Node<'a>>,
    /// Syntax of the value type the side exposes.
    pub value_type: Option<Node<'a>>,
}

/// Matched accessors of one registration.
#[derive(Debug, Clone)]
pub struct AccessorMatch<'a> {
    pub pair: AccessorPair,
    pub get: Option<SideMatch<'a>>,
    pub set: Option<SideMatch<'a>>,
}

/// Find the CLR accessors of a registration.
///
/// `registered_name` is required for attached registrations; it names the
/// `Get<Name>` / `Set<Name>` methods.
pub fn find<'a>(
    backing: &Backing<'a>,
    attached: bool,
    registered_name: Option<&str>,
    model: &SemanticModel<'a>,
) -> Option<AccessorMatch<'a>> {
    if attached {
        find_attached(backing, registered_name?, model)
    } else {
        find_instance(backing, model)
    }
}

fn find_instance<'a>(backing: &Backing<'a>, model: &SemanticModel<'a>) -> Option<AccessorMatch<'a>> {
    let is_backing = |id: MemberId| backing.is_identity(id);

    for (_, member) in model.members_of(backing.id.ty) {
        if member.kind != MemberKind::Property || member.is_static() {
            continue;
        }
        let property = member.node;
        let value_type = property.child_by_field_name("type");
        let mut get = None;
        let mut set = None;

        for accessor in syntax::property_accessors(property) {
            let Some(body) = accessor.body else {
                continue;
            };
            let roles: &[Role] = match accessor.keyword {
                "get" => &[Role::GetValue],
                "set" => &[Role::SetValue, Role::SetCurrentValue],
                _ => continue,
            };
            let calls = qualifying_calls(body, roles, &is_backing, model);
            let Some((call, role)) = calls.first().copied() else {
                continue;
            };
            let side = SideMatch {
                member: property,
                body,
                call,
                impure: impure_statements(body, call),
                value_type,
            };
            let summary = side_summary(&member.name, role, &side, accessor.node, model);
            if accessor.keyword == "get" {
                get = Some((side, summary));
            } else {
                set = Some((side, summary));
            }
        }

        if get.is_some() || set.is_some() {
            let (get, get_summary) = split(get);
            let (set, set_summary) = split(set);
            return Some(AccessorMatch {
                pair: AccessorPair {
                    locality: Locality::InstanceProperty,
                    get: get_summary,
                    set: set_summary,
                },
                get,
                set,
            });
        }
    }
    None
}

fn find_attached<'a>(
    backing: &Backing<'a>,
    registered_name: &str,
    model: &SemanticModel<'a>,
) -> Option<AccessorMatch<'a>> {
    let is_backing = |id: MemberId| backing.is_identity(id);
    let get_name = format!("Get{}", registered_name);
    let set_name = format!("Set{}", registered_name);
    let mut get = None;
    let mut set = None;

    for (_, member) in model.members_of(backing.id.ty) {
        if member.kind != MemberKind::Method || !member.is_static() {
            continue;
        }
        let is_get = member.name == get_name;
        let is_set = member.name == set_name;
        if !is_get && !is_set {
            continue;
        }
        let method = member.node;
        let Some(body) = syntax::member_body(method) else {
            continue;
        };
        let params = &member.parameters;

        let (roles, value_type): (&[Role], Option<Node<'a>>) = if is_get {
            if get.is_some() || params.len() != 1 || !is_dependency_object_parameter(params[0], model) {
                continue;
            }
            (&[Role::GetValue], member.type_syntax)
        } else {
            if set.is_some() || params.len() != 2 {
                continue;
            }
            (
                &[Role::SetValue, Role::SetCurrentValue],
                params[1].child_by_field_name("type"),
            )
        };

        let calls = qualifying_calls(body, roles, &is_backing, model);
        let [(call, role)] = calls.as_slice() else {
            tracing::trace!(method = %member.name, calls = calls.len(), "attached accessor skipped");
            continue;
        };
        let side = SideMatch {
            member: method,
            body,
            call: *call,
            impure: impure_statements(body, *call),
            value_type,
        };
        let anchor = method.child_by_field_name("name").unwrap_or(method);
        let summary = side_summary(&member.name, *role, &side, anchor, model);
        if is_get {
            get = Some((side, summary));
        } else {
            set = Some((side, summary));
        }
    }

    if get.is_none() && set.is_none() {
        return None;
    }
    let (get, get_summary) = split(get);
    let (set, set_summary) = split(set);
    Some(AccessorMatch {
        pair: AccessorPair {
            locality: Locality::AttachedStaticMethods,
            get: get_summary,
            set: set_summary,
        },
        get,
        set,
    })
}

fn split<'a>(side: Option<(SideMatch<'a>, AccessorSide)>) -> (Option<SideMatch<'a>>, Option<AccessorSide>) {
    match side {
        Some((m, s)) => (Some(m), Some(s)),
        None => (None, None),
    }
}

fn side_summary<'a>(
    name: &str,
    role: Role,
    side: &SideMatch<'a>,
    anchor: Node<'a>,
    model: &SemanticModel<'a>,
) -> AccessorSide {
    AccessorSide {
        member: name.to_string(),
        access: role.value_access().unwrap_or(ValueAccess::GetValue),
        value_type: side.value_type.and_then(|t| model.resolve_type_syntax(t)),
        is_pure: side.impure.is_empty(),
        span: Span::from_node(anchor),
    }
}

fn is_dependency_object_parameter<'a>(parameter: Node<'a>, model: &SemanticModel<'a>) -> bool {
    parameter
        .child_by_field_name("type")
        .and_then(|t| model.resolve_type_syntax(t))
        .and_then(|ty| model.converts(&ty, &TypeRef::named(DEPENDENCY_OBJECT)))
        .unwrap_or(false)
}

/// Confirmed value-access calls in `body` whose dependency-property
/// argument satisfies `is_target`.
pub fn qualifying_calls<'a>(
    body: Node<'a>,
    roles: &[Role],
    is_target: &dyn Fn(MemberId) -> bool,
    model: &SemanticModel<'a>,
) -> Vec<(Node<'a>, Role)> {
    let mut found = Vec::new();
    for call in syntax::descendants_of_kind(body, "invocation_expression") {
        let Some(classified) = classify(call, model).confirmed() else {
            continue;
        };
        if !roles.contains(&classified.role) {
            continue;
        }
        let target = property_argument(call, model).and_then(|arg| match model.resolve(arg) {
            Some(Symbol::Member(id)) => Some(id),
            _ => None,
        });
        if target.map(is_target).unwrap_or(false) {
            found.push((call, classified.role));
        }
    }
    found
}

/// The dependency property (or key) argument of a confirmed value-access
/// call.
pub fn property_argument<'a>(call: Node<'a>, model: &SemanticModel<'a>) -> Option<Node<'a>> {
    let symbol = model.resolve(call)?;
    model
        .argument_parameters(call, &symbol)?
        .into_iter()
        .find(|(_, p)| {
            p.ty.as_ref()
                .map(|t| t.is(DEPENDENCY_PROPERTY) || t.is(DEPENDENCY_PROPERTY_KEY))
                .unwrap_or(false)
        })
        .map(|(arg, _)| arg.expression)
}

/// Statements of `body` other than the one containing `call`.
///
/// Expression bodies hold a single expression and are always pure.
pub fn impure_statements<'a>(body: Node<'a>, call: Node<'a>) -> Vec<Node<'a>> {
    if body.kind() != "block" {
        return Vec::new();
    }
    syntax::block_statements(body)
        .into_iter()
        .filter(|statement| !syntax::is_within(call, *statement))
        .collect()
}

/// Whether a member is a source field or property of type
/// `DependencyProperty` or `DependencyPropertyKey`.
fn is_dependency_property_member(id: MemberId, model: &SemanticModel<'_>) -> bool {
    let member = model.member(id);
    if !member.kind.is_storage() {
        return false;
    }
    model
        .symbol_type(&Symbol::Member(id))
        .map(|t| t.is(DEPENDENCY_PROPERTY) || t.is(DEPENDENCY_PROPERTY_KEY))
        .unwrap_or(false)
}

/// Whether a property declaration wraps a dependency property.
pub fn is_dependency_property_wrapper<'a>(property: Node<'a>, model: &SemanticModel<'a>) -> bool {
    if property.kind() != "property_declaration" {
        return false;
    }
    let is_target = |id: MemberId| is_dependency_property_member(id, model);
    syntax::property_accessors(property).iter().any(|accessor| {
        let roles: &[Role] = match accessor.keyword {
            "get" => &[Role::GetValue],
            "set" => &[Role::SetValue, Role::SetCurrentValue],
            _ => return false,
        };
        accessor
            .body
            .map(|body| !qualifying_calls(body, roles, &is_target, model).is_empty())
            .unwrap_or(false)
    })
}

/// Whether a method declaration is the static `Set<Name>` accessor of an
/// attached property.
pub fn is_attached_set_method<'a>(method: Node<'a>, model: &SemanticModel<'a>) -> bool {
    let Some(id) = model.declared_member(method) else {
        return false;
    };
    let member = model.member(id);
    if member.kind != MemberKind::Method
        || !member.is_static()
        || !member.name.starts_with("Set")
        || member.parameters.len() != 2
    {
        return false;
    }
    let is_target = |id: MemberId| is_dependency_property_member(id, model);
    syntax::member_body(method)
        .map(|body| {
            !qualifying_calls(body, &[Role::SetValue, Role::SetCurrentValue], &is_target, model)
                .is_empty()
        })
        .unwrap_or(false)
}
