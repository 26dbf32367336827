//! WPF0041: set mutable dependency properties with `SetCurrentValue`.
//!
//! `SetValue` and CLR setters replace bindings and other value sources.
//! Writes are accepted in constructors, object initializers, dependency
//! property accessors, attached `Set<Name>` methods and on a receiver
//! that is a local initialized with `new`.

use tree_sitter::Node;

use crate::analysis::{syntax, MemberId, MemberKind, SemanticModel, Symbol, TypeRef};
use crate::catalog::{
    KnownMember, DATA_CONTEXT, DATA_CONTEXT_PROPERTY, DEPENDENCY_PROPERTY, DEPENDENCY_PROPERTY_KEY,
};
use crate::detect::accessors::{self, qualifying_calls};
use crate::detect::backing;
use crate::detect::classify::{classify_as, Role};
use crate::detect::registration;
use crate::detect::types::{Finding, FindingContext, Rule};

use super::NodeContext;

/// The dependency property a write targets.
enum Target {
    Source(MemberId),
    Known(&'static KnownMember),
}

pub fn check(cx: &NodeContext<'_, '_>, out: &mut Vec<Finding>) {
    match cx.node.kind() {
        "assignment_expression" => check_assignment(cx, out),
        "invocation_expression" => check_set_value(cx, out),
        _ => {}
    }
}

fn check_assignment(cx: &NodeContext<'_, '_>, out: &mut Vec<Finding>) {
    let node = cx.node;
    let model = cx.model;
    let is_simple = node
        .child_by_field_name("operator")
        .map(|op| model.text(op) == "=")
        .unwrap_or(false);
    if !is_simple || is_exempt_location(node) {
        return;
    }
    let (Some(left), Some(right)) = (node.child_by_field_name("left"), node.child_by_field_name("right")) else {
        return;
    };

    let target = match model.resolve(left) {
        Some(Symbol::Member(id)) => match single_backing_field(id, model) {
            Some(field) => Target::Source(field),
            None => return,
        },
        Some(Symbol::Known(member)) => {
            if DATA_CONTEXT.matches(member) {
                return;
            }
            let Some(field) = member
                .dependency_property
                .and_then(|name| model.catalog().members_named(member.owner, name).next())
            else {
                return;
            };
            Target::Known(field)
        }
        _ => return,
    };
    if is_fresh_local_receiver(left, model) {
        return;
    }

    let name = property_name(&target, node, model);
    let value = model.text(right).to_string();
    out.push(
        cx.finding(Rule::UseSetCurrentValue, node, vec![name, value])
            .with_context(target_context(&target, model)),
    );
}

fn check_set_value(cx: &NodeContext<'_, '_>, out: &mut Vec<Finding>) {
    let node = cx.node;
    let model = cx.model;
    let Some(call) = classify_as(node, model, Role::SetValue) else {
        return;
    };
    if is_exempt_location(node) {
        return;
    }
    let Some(property) = accessors::property_argument(node, model) else {
        return;
    };
    let target = match model.resolve(property) {
        Some(Symbol::Member(id)) if is_dependency_property(id, model) => Target::Source(id),
        Some(Symbol::Known(member)) if member.ty == DEPENDENCY_PROPERTY => {
            if DATA_CONTEXT_PROPERTY.matches(member) {
                return;
            }
            Target::Known(member)
        }
        _ => return,
    };

    if let Some(wrapper) = syntax::first_ancestor(node, &["property_declaration"]) {
        if accessors::is_dependency_property_wrapper(wrapper, model) {
            return;
        }
    }
    if let Some(method) = syntax::first_ancestor(node, &["method_declaration"]) {
        if accessors::is_attached_set_method(method, model) {
            return;
        }
    }
    let receiver = node.child_by_field_name("function").map(syntax::unparenthesize);
    if let Some(function) = receiver {
        if is_fresh_local_receiver(function, model) {
            return;
        }
    }

    let Some(arguments) = model.argument_parameters(node, &Symbol::Known(call.member)) else {
        return;
    };
    let Some(value) = arguments
        .iter()
        .find(|(_, p)| p.name == "value")
        .map(|(a, _)| model.text(a.expression).to_string())
    else {
        return;
    };
    let name = model.text(property).to_string();
    out.push(
        cx.finding(Rule::UseSetCurrentValue, node, vec![name, value])
            .with_context(target_context(&target, model)),
    );
}

/// Object initializers and statements directly in a constructor body.
fn is_exempt_location(node: Node<'_>) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    if parent.kind() == "initializer_expression" {
        return true;
    }
    if parent.kind() != "expression_statement" {
        return false;
    }
    parent
        .parent()
        .filter(|block| block.kind() == "block")
        .and_then(|block| block.parent())
        .map(|owner| owner.kind() == "constructor_declaration")
        .unwrap_or(false)
}

/// `x.Member` where `x` is a local whose only declarator is initialized
/// with an object creation. One hop; reassignments are not tracked.
fn is_fresh_local_receiver<'a>(member_access: Node<'a>, model: &SemanticModel<'a>) -> bool {
    if member_access.kind() != "member_access_expression" {
        return false;
    }
    let Some(receiver) = member_access.child_by_field_name("expression") else {
        return false;
    };
    if receiver.kind() != "identifier" {
        return false;
    }
    let Some(Symbol::Local(declarator)) = model.resolve(receiver) else {
        return false;
    };
    if declarator.kind() != "variable_declarator" {
        return false;
    }
    let single = declarator
        .parent()
        .map(|declaration| syntax::variable_declarators(declaration).len() == 1)
        .unwrap_or(false);
    single
        && syntax::declarator_initializer(declarator)
            .map(|init| syntax::unparenthesize(init).kind() == "object_creation_expression")
            .unwrap_or(false)
}

fn is_dependency_property(id: MemberId, model: &SemanticModel<'_>) -> bool {
    matches!(model.member(id).kind, MemberKind::Field | MemberKind::Property)
        && model
            .symbol_type(&Symbol::Member(id))
            .map(|t| t.is(DEPENDENCY_PROPERTY))
            .unwrap_or(false)
}

/// The one field a CLR property's setter writes through, when it is a
/// `DependencyProperty` rather than a key.
fn single_backing_field(property: MemberId, model: &SemanticModel<'_>) -> Option<MemberId> {
    let member = model.member(property);
    if member.kind != MemberKind::Property {
        return None;
    }
    let is_target = |id: MemberId| {
        matches!(model.member(id).kind, MemberKind::Field | MemberKind::Property)
            && model
                .symbol_type(&Symbol::Member(id))
                .map(|t| t.is(DEPENDENCY_PROPERTY) || t.is(DEPENDENCY_PROPERTY_KEY))
                .unwrap_or(false)
    };
    let setter = syntax::property_accessors(member.node)
        .into_iter()
        .find(|accessor| accessor.keyword == "set")?;
    let mut fields = Vec::new();
    for (call, _) in qualifying_calls(setter.body?, &[Role::SetValue, Role::SetCurrentValue], &is_target, model) {
        if let Some(Symbol::Member(id)) = accessors::property_argument(call, model).and_then(|a| model.resolve(a)) {
            if !fields.contains(&id) {
                fields.push(id);
            }
        }
    }
    match fields.as_slice() {
        [field] if is_dependency_property(*field, model) => Some(*field),
        _ => None,
    }
}

/// Name to pass to `SetCurrentValue`, qualified when the writing code is
/// outside the declaring type's hierarchy.
fn property_name<'a>(target: &Target, at: Node<'a>, model: &SemanticModel<'a>) -> String {
    let (declaring, simple, name) = match target {
        Target::Source(id) => {
            let ty = model.type_symbol(id.ty);
            (ty.full_name.clone(), ty.name.clone(), model.member(*id).name.clone())
        }
        Target::Known(member) => (
            member.owner.to_string(),
            TypeRef::named(member.owner).simple_name(),
            member.name.to_string(),
        ),
    };
    let inside = model
        .containing_type(at)
        .and_then(|ty| model.is_subtype_of(&model.type_ref(ty), &declaring))
        .unwrap_or(false);
    if inside {
        name
    } else {
        format!("{}.{}", simple, name)
    }
}

fn target_context<'a>(target: &Target, model: &SemanticModel<'a>) -> FindingContext {
    let Target::Source(id) = target else {
        return FindingContext::default();
    };
    let registration = syntax::storage_initializer(model.member(*id).node)
        .map(syntax::unparenthesize)
        .and_then(|init| registration::recognize(init, model));
    match registration {
        Some(registration) => registration.context(),
        None => FindingContext {
            backing: backing::backing_member(*id, model),
            ..FindingContext::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::detect::rules::check_rule;
    use crate::detect::types::Rule;

    fn control(body: &str) -> String {
        format!(
            r#"
namespace Demo
{{
    using System.Windows;
    using System.Windows.Controls;

    public class FooControl : Control
    {{
        public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
            nameof(Bar), typeof(int), typeof(FooControl), new PropertyMetadata(default(int)));

        private static readonly DependencyPropertyKey BazPropertyKey = DependencyProperty.RegisterReadOnly(
            nameof(Baz), typeof(int), typeof(FooControl), new PropertyMetadata(default(int)));

        public static readonly DependencyProperty BazProperty = BazPropertyKey.DependencyProperty;

        public FooControl()
        {{
            this.Bar = 1;
            this.SetValue(BarProperty, 2);
        }}

        public int Bar
        {{
            get => (int)this.GetValue(BarProperty);
            set => this.SetValue(BarProperty, value);
        }}

        public int Baz
        {{
            get => (int)this.GetValue(BazProperty);
            private set => this.SetValue(BazPropertyKey, value);
        }}

        public void Update()
        {{
            {0}
        }}
    }}
}}
"#,
            body
        )
    }

    fn messages(body: &str) -> Vec<String> {
        check_rule(&control(body), Rule::UseSetCurrentValue)
            .into_iter()
            .map(|f| f.message)
            .collect()
    }

    #[test]
    fn test_assignment_outside_constructor() {
        assert_eq!(messages("this.Bar = 5;"), vec!["Use SetCurrentValue(BarProperty, 5)".to_string()]);
    }

    #[test]
    fn test_set_value_outside_constructor() {
        assert_eq!(
            messages("this.SetValue(BarProperty, 5);"),
            vec!["Use SetCurrentValue(BarProperty, 5)".to_string()]
        );
    }

    #[test]
    fn test_exemptions() {
        for body in [
            "this.Baz = 5;",
            "this.SetValue(BazPropertyKey, 5);",
            "this.DataContext = null;",
            "this.SetValue(DataContextProperty, null);",
            "var control = new FooControl(); control.Bar = 3;",
            "var control = new FooControl { Bar = 3 };",
            "this.SetCurrentValue(BarProperty, 5);",
            "this.Bar += 1;",
        ] {
            assert!(messages(body).is_empty(), "{}", body);
        }
    }

    #[test]
    fn test_framework_property_assignment() {
        assert_eq!(
            messages("this.Width = 10;"),
            vec!["Use SetCurrentValue(WidthProperty, 10)".to_string()]
        );
    }

    #[test]
    fn test_other_type_is_qualified() {
        let source = r#"
namespace Demo
{
    using System.Windows;
    using System.Windows.Controls;

    public class FooControl : Control
    {
        public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
            nameof(Bar), typeof(int), typeof(FooControl));

        public int Bar
        {
            get => (int)this.GetValue(BarProperty);
            set => this.SetValue(BarProperty, value);
        }
    }

    public class Writer
    {
        public void Write(FooControl control)
        {
            control.Bar = 2;
        }
    }
}
"#;
        let found = check_rule(source, Rule::UseSetCurrentValue);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "Use SetCurrentValue(FooControl.BarProperty, 2)");
        assert!(found[0].context.registration.is_some());
    }
}
