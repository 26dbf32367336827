//! Registration recognition.
//!
//! Ties a confirmed registration or continuation call to its backing
//! member, metadata and CLR accessors. A continuation (`AddOwner`,
//! `OverrideMetadata`) only yields a record when the dependency property it
//! continues can be traced back to a registration, in source or in the
//! catalog.

use tree_sitter::Node;

use crate::analysis::{syntax, SemanticModel, Span, Symbol, TypeRef};
use crate::catalog::KEY_DEPENDENCY_PROPERTY;

use super::accessors::{self, AccessorMatch};
use super::backing::{self, Backing};
use super::classify::{classify, ClassifiedCall, Role};
use super::metadata::{self, MetadataMatch};
use super::model::{BackingMember, Mutability, RegistrationKind, RegistrationRecord, StorageKind};
use super::types::FindingContext;

/// Cap on `AddOwner` chains and key derivations followed back to a
/// registration.
const MAX_CONTINUATION_DEPTH: usize = 8;

/// A recognized registration with its syntax.
#[derive(Debug, Clone)]
pub struct Registration<'a> {
    pub call: ClassifiedCall<'a>,
    pub record: RegistrationRecord,
    /// Source backing member; `None` when `OverrideMetadata` targets a
    /// framework dependency property.
    pub backing: Option<Backing<'a>>,
    pub metadata: Option<MetadataMatch<'a>>,
    pub accessors: Option<AccessorMatch<'a>>,
}

impl<'a> Registration<'a> {
    pub fn kind(&self) -> RegistrationKind {
        self.record.kind
    }

    /// Structured context for findings produced from this registration.
    pub fn context(&self) -> FindingContext {
        FindingContext {
            backing: Some(self.record.backing.clone()),
            registration: Some(self.record.clone()),
            accessors: self.accessors.as_ref().map(|a| a.pair.clone()),
            metadata: self.record.metadata.clone(),
        }
    }
}

/// The registration a continuation refers to.
#[derive(Debug, Clone, Default)]
struct Prior {
    registered_name: Option<String>,
    value_type: Option<TypeRef>,
}

/// Recognize a registration or continuation call.
pub fn recognize<'a>(node: Node<'a>, model: &SemanticModel<'a>) -> Option<Registration<'a>> {
    let call = classify(node, model).confirmed()?;
    let kind = call.role.registration_kind()?;
    let arguments = model.argument_parameters(node, &Symbol::Known(call.member))?;
    let argument = |name: &str| {
        arguments
            .iter()
            .find(|(_, p)| p.name == name)
            .map(|(a, _)| a.expression)
    };
    let src = model.source_of(node)?;

    let metadata = argument("typeMetadata")
        .or_else(|| argument("defaultMetadata"))
        .and_then(|m| metadata::from_argument(m, model));
    let owner_type = argument(match kind {
        RegistrationKind::OverrideMetadata => "forType",
        _ => "ownerType",
    })
    .and_then(|t| typeof_type(t, model));

    let (registered_name, value_type, backing, backing_member) = match kind {
        RegistrationKind::Register
        | RegistrationKind::RegisterReadOnly
        | RegistrationKind::RegisterAttached
        | RegistrationKind::RegisterAttachedReadOnly => {
            let mut backing = backing::resolve(node, model)?;
            let name = argument("name").and_then(|n| syntax::constant_name(n, src));
            if kind.is_read_only() {
                backing::pair_read_only(&mut backing, name.as_deref(), model);
            }
            let value_type = argument("propertyType").and_then(|t| typeof_type(t, model));
            let member = backing.member.clone();
            (name, value_type, Some(backing), member)
        }
        RegistrationKind::AddOwner => {
            let backing = backing::resolve(node, model)?;
            let prior = prior_registration(syntax::invocation_receiver(node)?, model, 0)?;
            let member = backing.member.clone();
            (prior.registered_name, prior.value_type, Some(backing), member)
        }
        RegistrationKind::OverrideMetadata => {
            let receiver = syntax::invocation_receiver(node)?;
            let prior = prior_registration(receiver, model, 0)?;
            let (backing, member) = receiver_backing(receiver, model)?;
            (prior.registered_name, prior.value_type, backing, member)
        }
    };

    let accessors = match backing.as_ref() {
        Some(b) if kind != RegistrationKind::OverrideMetadata => {
            accessors::find(b, kind.is_attached(), registered_name.as_deref(), model)
        }
        _ => None,
    };

    tracing::trace!(
        kind = kind.as_str(),
        name = registered_name.as_deref().unwrap_or("?"),
        backing = %backing_member.name,
        "registration recognized"
    );

    let record = RegistrationRecord {
        kind,
        registered_name,
        value_type,
        owner_type,
        metadata: metadata.as_ref().map(|m| m.descriptor.clone()),
        backing: backing_member,
        span: Span::from_node(node),
    };

    Some(Registration {
        call,
        record,
        backing,
        metadata,
        accessors,
    })
}

/// `T` in `typeof(T)`.
pub fn typeof_type<'a>(expr: Node<'a>, model: &SemanticModel<'a>) -> Option<TypeRef> {
    let expr = syntax::unparenthesize(expr);
    if expr.kind() != "typeof_expression" {
        return None;
    }
    let ty = expr
        .child_by_field_name("type")
        .or_else(|| syntax::named_children(expr).into_iter().next())?;
    model.resolve_type_syntax(ty)
}

/// Backing member named by the receiver of `OverrideMetadata`.
fn receiver_backing<'a>(
    receiver: Node<'a>,
    model: &SemanticModel<'a>,
) -> Option<(Option<Backing<'a>>, BackingMember)> {
    match model.resolve(receiver)? {
        Symbol::Member(id) => {
            let member = backing::backing_member(id, model)?;
            let node = model.member(id).node;
            Some((
                Some(Backing {
                    member: member.clone(),
                    id,
                    node,
                    pair: None,
                }),
                member,
            ))
        }
        Symbol::Known(known) => {
            let file = model.file_of(receiver)?;
            Some((
                None,
                BackingMember {
                    declaring_type: known.owner.to_string(),
                    name: known.name.to_string(),
                    storage: StorageKind::Field,
                    mutability: Mutability::ReadOnly,
                    file: file.path.clone(),
                    span: Span::from_node(receiver),
                    pairing: None,
                },
            ))
        }
        _ => None,
    }
}

/// Follow a dependency-property expression back to its registration.
fn prior_registration<'a>(expr: Node<'a>, model: &SemanticModel<'a>, depth: usize) -> Option<Prior> {
    if depth > MAX_CONTINUATION_DEPTH {
        return None;
    }
    let expr = syntax::unparenthesize(expr);
    match model.resolve(expr)? {
        Symbol::Known(known) if known.registered_type.is_some() => Some(Prior {
            registered_name: known.name.strip_suffix("Property").map(str::to_string),
            value_type: known.registered_type.map(TypeRef::named),
        }),
        Symbol::Known(known) if KEY_DEPENDENCY_PROPERTY.matches(known) => {
            prior_registration(expr.child_by_field_name("expression")?, model, depth + 1)
        }
        Symbol::Member(id) => {
            let init = syntax::unparenthesize(syntax::storage_initializer(model.member(id).node)?);
            prior_from_initializer(init, model, depth)
        }
        _ => None,
    }
}

fn prior_from_initializer<'a>(init: Node<'a>, model: &SemanticModel<'a>, depth: usize) -> Option<Prior> {
    match init.kind() {
        "invocation_expression" => {
            let call = classify(init, model).confirmed()?;
            match call.role {
                Role::Register | Role::RegisterReadOnly | Role::RegisterAttached | Role::RegisterAttachedReadOnly => {
                    let src = model.source_of(init)?;
                    let arguments = model.argument_parameters(init, &Symbol::Known(call.member))?;
                    let argument = |name: &str| {
                        arguments
                            .iter()
                            .find(|(_, p)| p.name == name)
                            .map(|(a, _)| a.expression)
                    };
                    Some(Prior {
                        registered_name: argument("name").and_then(|n| syntax::constant_name(n, src)),
                        value_type: argument("propertyType").and_then(|t| typeof_type(t, model)),
                    })
                }
                Role::AddOwner => {
                    prior_registration(syntax::invocation_receiver(init)?, model, depth + 1)
                }
                _ => None,
            }
        }
        "member_access_expression" => prior_registration(init, model, depth + 1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Compilation;
    use crate::catalog::SymbolCatalog;
    use crate::detect::model::ReadOnlyPairing;

    fn records(source: &str) -> Vec<RegistrationRecord> {
        let compilation = Compilation::from_sources([("Foo.cs", source)]).unwrap();
        let model = compilation.semantic_model(SymbolCatalog::shared());
        let root = compilation.files()[0].tree.root_node();
        syntax::descendants_of_kind(root, "invocation_expression")
            .into_iter()
            .filter_map(|n| recognize(n, &model))
            .map(|r| r.record)
            .collect()
    }

    #[test]
    fn test_register_record() {
        let found = records(
            r#"
namespace Demo
{
    using System.Windows;

    public class FooControl : FrameworkElement
    {
        public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
            nameof(Bar), typeof(int), typeof(FooControl), new PropertyMetadata(default(int)));

        public int Bar
        {
            get => (int)GetValue(BarProperty);
            set => SetValue(BarProperty, value);
        }
    }
}
"#,
        );
        assert_eq!(found.len(), 1);
        let record = &found[0];
        assert_eq!(record.kind, RegistrationKind::Register);
        assert_eq!(record.registered_name.as_deref(), Some("Bar"));
        assert_eq!(record.value_type, Some(TypeRef::named("System.Int32")));
        assert_eq!(record.owner_type, Some(TypeRef::named("Demo.FooControl")));
        assert_eq!(record.backing.name, "BarProperty");
        assert_eq!(record.metadata.as_ref().unwrap().default_value.as_ref().unwrap().text, "default(int)");
    }

    #[test]
    fn test_read_only_record_carries_pairing() {
        let found = records(
            r#"
using System.Windows;
public class Foo : FrameworkElement
{
    private static readonly DependencyPropertyKey BarPropertyKey = DependencyProperty.RegisterReadOnly(
        "Bar", typeof(string), typeof(Foo), new PropertyMetadata(null));

    public static readonly DependencyProperty BarProperty = BarPropertyKey.DependencyProperty;
}
"#,
        );
        assert_eq!(found.len(), 1);
        assert!(matches!(found[0].backing.pairing, Some(ReadOnlyPairing::Paired { .. })));
        assert_eq!(found[0].backing.public_name(), "BarProperty");
    }

    #[test]
    fn test_add_owner_takes_type_from_source_registration() {
        let found = records(
            r#"
using System.Windows;
public class Foo : FrameworkElement
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        "Bar", typeof(double), typeof(Foo));
}

public class Baz : FrameworkElement
{
    public static readonly DependencyProperty BarProperty = Foo.BarProperty.AddOwner(
        typeof(Baz), new PropertyMetadata(1.0));
}
"#,
        );
        let add_owner = found
            .iter()
            .find(|r| r.kind == RegistrationKind::AddOwner)
            .unwrap();
        assert_eq!(add_owner.registered_name.as_deref(), Some("Bar"));
        assert_eq!(add_owner.value_type, Some(TypeRef::named("System.Double")));
        assert_eq!(add_owner.backing.declaring_type, "Baz");
    }

    #[test]
    fn test_override_metadata_on_framework_property() {
        let found = records(
            r#"
using System.Windows;
public class Foo : FrameworkElement
{
    static Foo()
    {
        WidthProperty.OverrideMetadata(typeof(Foo), new FrameworkPropertyMetadata(10.0));
    }
}
"#,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, RegistrationKind::OverrideMetadata);
        assert_eq!(found[0].value_type, Some(TypeRef::named("System.Double")));
        assert_eq!(found[0].backing.declaring_type, "System.Windows.FrameworkElement");
    }

    #[test]
    fn test_continuation_without_prior_registration_is_dropped() {
        let found = records(
            r#"
using System.Windows;
public class Foo : FrameworkElement
{
    public static DependencyProperty Source { get; set; }
    public static readonly DependencyProperty BarProperty = Source.AddOwner(typeof(Foo));
}
"#,
        );
        assert!(found.is_empty());
    }
}
