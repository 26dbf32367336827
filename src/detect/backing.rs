//! Backing member resolution.
//!
//! A registration result is stored in a static field or property whose
//! initializer is the registration call itself. The walk from the call to
//! that member follows parent links and gives up at the first executable
//! body: registrations assigned in a static constructor are not tracked.

use tree_sitter::Node;

use crate::analysis::{syntax, MemberId, MemberKind, SemanticModel, Span, Symbol};
use crate::catalog::KEY_DEPENDENCY_PROPERTY;

use super::model::{BackingMember, MemberRef, Mutability, ReadOnlyPairing, StorageKind};

/// A backing member with its syntax.
#[derive(Debug, Clone)]
pub struct Backing<'a> {
    pub member: BackingMember,
    pub id: MemberId,
    /// Variable declarator or property declaration.
    pub node: Node<'a>,
    /// Public member initialized from a read-only key.
    pub pair: Option<MemberId>,
}

impl<'a> Backing<'a> {
    /// Whether `id` is this member or its read-only pair.
    pub fn is_identity(&self, id: MemberId) -> bool {
        self.id == id || self.pair == Some(id)
    }
}

/// The field declarator or property declaration initialized by `call`.
pub fn storage_of<'a>(call: Node<'a>) -> Option<Node<'a>> {
    for ancestor in syntax::ancestors(call) {
        let kind = ancestor.kind();
        if syntax::BODY_OWNER_KINDS.contains(&kind)
            || syntax::TYPE_DECLARATION_KINDS.contains(&kind)
        {
            return None;
        }
        let storage = match kind {
            "variable_declarator" => {
                let declaration = ancestor.parent()?.parent()?;
                if declaration.kind() != "field_declaration" {
                    return None;
                }
                ancestor
            }
            "property_declaration" => ancestor,
            _ => continue,
        };
        let initializer = syntax::storage_initializer(storage)?;
        return (syntax::unparenthesize(initializer) == call).then_some(storage);
    }
    None
}

/// Resolve the backing member of a registration or continuation call.
pub fn resolve<'a>(call: Node<'a>, model: &SemanticModel<'a>) -> Option<Backing<'a>> {
    let storage = storage_of(call)?;
    let id = model.declared_member(storage)?;
    let member = backing_member(id, model)?;
    Some(Backing {
        member,
        id,
        node: storage,
        pair: None,
    })
}

/// Snapshot of a source field or property as a backing member.
pub fn backing_member(id: MemberId, model: &SemanticModel<'_>) -> Option<BackingMember> {
    let reference = member_ref(id, model)?;
    let symbol = model.member(id);
    let mutability = match symbol.kind {
        MemberKind::Field if symbol.is_readonly() => Mutability::ReadOnly,
        MemberKind::Field => Mutability::Mutable,
        _ => {
            let writable = syntax::property_accessors(symbol.node)
                .iter()
                .any(|a| matches!(a.keyword, "set" | "init"));
            if writable {
                Mutability::Mutable
            } else {
                Mutability::ReadOnly
            }
        }
    };
    Some(BackingMember {
        declaring_type: reference.declaring_type,
        name: reference.name,
        storage: reference.storage,
        mutability,
        file: reference.file,
        span: reference.span,
        pairing: None,
    })
}

/// Reference to a source field or property.
pub fn member_ref(id: MemberId, model: &SemanticModel<'_>) -> Option<MemberRef> {
    let symbol = model.member(id);
    let storage = match symbol.kind {
        MemberKind::Field => StorageKind::Field,
        MemberKind::Property => StorageKind::Property,
        _ => return None,
    };
    let file = model.file_of(symbol.node)?;
    let name = name_node(symbol.node).unwrap_or(symbol.node);
    Some(MemberRef {
        declaring_type: model.type_symbol(id.ty).full_name.clone(),
        name: symbol.name.clone(),
        storage,
        file: file.path.clone(),
        span: Span::from_node(name),
    })
}

/// Name identifier of a declarator or member declaration.
pub fn name_node(member: Node<'_>) -> Option<Node<'_>> {
    member
        .child_by_field_name("name")
        .or_else(|| syntax::child_of_kind(member, "identifier"))
}

/// Pair a read-only key with the public member derived from it.
///
/// Leaves the pairing unset when the conventionally named member has no
/// initializer to judge.
pub fn pair_read_only(backing: &mut Backing<'_>, registered_name: Option<&str>, model: &SemanticModel<'_>) {
    let key = backing.id;
    let mut conventional = None;

    for (id, member) in model.members_of(key.ty) {
        if id == key || !matches!(member.kind, MemberKind::Field | MemberKind::Property) {
            continue;
        }
        if let Some(init) = syntax::storage_initializer(member.node) {
            if derives_from_key(init, key, model) {
                if let Some(reference) = member_ref(id, model) {
                    backing.pair = Some(id);
                    backing.member.pairing = Some(ReadOnlyPairing::Paired { member: reference });
                }
                return;
            }
        }
        if conventional.is_none() && is_conventional_name(&member.name, &backing.member.name, registered_name) {
            conventional = Some(id);
        }
    }

    backing.member.pairing = match conventional {
        Some(id) => {
            if syntax::storage_initializer(model.member(id).node).is_none() {
                tracing::trace!(member = %model.member(id).name, "pair candidate has no initializer");
                None
            } else {
                member_ref(id, model).map(|member| ReadOnlyPairing::Mismatched { member })
            }
        }
        None => Some(ReadOnlyPairing::Missing),
    };
}

/// Whether `init` is exactly `<key>.DependencyProperty`.
pub fn derives_from_key<'a>(init: Node<'a>, key: MemberId, model: &SemanticModel<'a>) -> bool {
    let init = syntax::unparenthesize(init);
    if init.kind() != "member_access_expression" {
        return false;
    }
    let Some(Symbol::Known(member)) = model.resolve(init) else {
        return false;
    };
    if !KEY_DEPENDENCY_PROPERTY.matches(member) {
        return false;
    }
    init.child_by_field_name("expression")
        .and_then(|receiver| model.resolve(receiver))
        == Some(Symbol::Member(key))
}

/// `BarProperty` for the key `BarPropertyKey` or the registered name `Bar`.
fn is_conventional_name(candidate: &str, key_name: &str, registered_name: Option<&str>) -> bool {
    if let Some(stem) = key_name.strip_suffix("Key") {
        if candidate == stem {
            return true;
        }
    }
    registered_name
        .map(|name| candidate.strip_suffix("Property") == Some(name))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Compilation;
    use crate::catalog::SymbolCatalog;

    fn with_backing<F>(source: &str, f: F)
    where
        F: FnOnce(Option<Backing<'_>>, &SemanticModel<'_>),
    {
        let compilation = Compilation::from_sources([("Foo.cs", source)]).unwrap();
        let model = compilation.semantic_model(SymbolCatalog::shared());
        let root = compilation.files()[0].tree.root_node();
        let call = syntax::descendants_of_kind(root, "invocation_expression")
            .into_iter()
            .find(|n| model.text(*n).starts_with("DependencyProperty.Register"))
            .unwrap();
        f(resolve(call, &model), &model);
    }

    #[test]
    fn test_field_backing() {
        with_backing(
            r#"
using System.Windows;
public class Foo : DependencyObject
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register("Bar", typeof(int), typeof(Foo));
}
"#,
            |backing, _| {
                let backing = backing.unwrap();
                assert_eq!(backing.member.name, "BarProperty");
                assert_eq!(backing.member.storage, StorageKind::Field);
                assert_eq!(backing.member.mutability, Mutability::ReadOnly);
                assert_eq!(backing.member.declaring_type, "Foo");
                assert_eq!(backing.member.span.start_line, 5);
            },
        );
    }

    #[test]
    fn test_property_backing_is_read_only_without_setter() {
        with_backing(
            r#"
using System.Windows;
public class Foo : DependencyObject
{
    public static DependencyProperty BarProperty { get; } = DependencyProperty.Register("Bar", typeof(int), typeof(Foo));
}
"#,
            |backing, _| {
                let backing = backing.unwrap();
                assert_eq!(backing.member.storage, StorageKind::Property);
                assert_eq!(backing.member.mutability, Mutability::ReadOnly);
            },
        );
    }

    #[test]
    fn test_registration_in_static_constructor_has_no_backing() {
        with_backing(
            r#"
using System.Windows;
public class Foo : DependencyObject
{
    public static readonly DependencyProperty BarProperty;
    static Foo() { BarProperty = DependencyProperty.Register("Bar", typeof(int), typeof(Foo)); }
}
"#,
            |backing, _| assert!(backing.is_none()),
        );
    }

    #[test]
    fn test_wrapped_call_has_no_backing() {
        with_backing(
            r#"
using System.Windows;
public class Foo : DependencyObject
{
    public static readonly DependencyProperty BarProperty = Wrap(DependencyProperty.Register("Bar", typeof(int), typeof(Foo)));
    static DependencyProperty Wrap(DependencyProperty p) => p;
}
"#,
            |backing, _| assert!(backing.is_none()),
        );
    }

    fn pairing_of(source: &str) -> Option<ReadOnlyPairing> {
        let mut pairing = None;
        with_backing(source, |backing, model| {
            let mut backing = backing.unwrap();
            pair_read_only(&mut backing, Some("Bar"), model);
            pairing = backing.member.pairing.clone();
        });
        pairing
    }

    #[test]
    fn test_read_only_pairing_outcomes() {
        let paired = pairing_of(
            r#"
using System.Windows;
public class Foo : DependencyObject
{
    private static readonly DependencyPropertyKey BarPropertyKey = DependencyProperty.RegisterReadOnly("Bar", typeof(int), typeof(Foo), new PropertyMetadata(1));
    public static readonly DependencyProperty BarProperty = BarPropertyKey.DependencyProperty;
}
"#,
        );
        assert!(matches!(paired, Some(ReadOnlyPairing::Paired { ref member }) if member.name == "BarProperty"));

        let mismatched = pairing_of(
            r#"
using System.Windows;
public class Foo : DependencyObject
{
    private static readonly DependencyPropertyKey BarPropertyKey = DependencyProperty.RegisterReadOnly("Bar", typeof(int), typeof(Foo), new PropertyMetadata(1));
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register("Baz", typeof(int), typeof(Foo));
}
"#,
        );
        assert!(matches!(mismatched, Some(ReadOnlyPairing::Mismatched { .. })));

        let missing = pairing_of(
            r#"
using System.Windows;
public class Foo : DependencyObject
{
    private static readonly DependencyPropertyKey BarPropertyKey = DependencyProperty.RegisterReadOnly("Bar", typeof(int), typeof(Foo), new PropertyMetadata(1));
}
"#,
        );
        assert_eq!(missing, Some(ReadOnlyPairing::Missing));
    }
}
