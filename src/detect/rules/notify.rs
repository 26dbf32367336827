//! WPF1010: mutable public properties should raise `PropertyChanged`.
//!
//! A setter notifies when it creates `PropertyChangedEventArgs` naming the
//! property (or `null` / `""`, which bindings treat as "everything"), or
//! calls a source method that does so with one of its parameters. Only that
//! one hop is followed. An unsupplied `[CallerMemberName]` argument names
//! the calling property.

use tree_sitter::Node;

use crate::analysis::types::simple_metadata_name;
use crate::analysis::{syntax, DeclarationKind, MemberId, MemberKind, SemanticModel, Symbol};
use crate::catalog::{KnownMemberKind, CALLER_MEMBER_NAME, PROPERTY_CHANGED_EVENT_ARGS};
use crate::detect::accessors;
use crate::detect::types::{Finding, Rule};

use super::NodeContext;

/// A name a setter raises `PropertyChanged` for.
#[derive(Debug, Clone, PartialEq)]
enum Raised {
    Name(String),
    /// `null` or empty: every property.
    All,
}

pub fn check(cx: &NodeContext<'_, '_>, out: &mut Vec<Finding>) {
    let node = cx.node;
    if node.kind() != "property_declaration" {
        return;
    }
    let model = cx.model;
    let Some(id) = model.declared_member(node) else {
        return;
    };
    let property = model.member(id);
    if property.kind != MemberKind::Property
        || !property.is_public()
        || property.is_static()
        || property.has_modifier("abstract")
    {
        return;
    }
    let declaring = model.type_symbol(id.ty);
    if !declaring.is_public() || !is_class_like(declaring.kind, declaring.node) {
        return;
    }

    let accessor_list = syntax::property_accessors(node);
    let Some(setter) = accessor_list.iter().find(|a| a.keyword == "set") else {
        // Get-only, init-only or expression-bodied.
        return;
    };
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let name = property.name.clone();

    let is_auto = accessor_list.len() == 2 && accessor_list.iter().all(|a| a.body.is_none());
    if !is_auto {
        if accessors::is_dependency_property_wrapper(node, model) {
            return;
        }
        let Some(body) = setter.body else {
            return;
        };
        let notifies = raised_names(body, &name, model)
            .iter()
            .any(|raised| match raised {
                Raised::All => true,
                Raised::Name(n) => *n == name,
            });
        if notifies {
            return;
        }
    }

    out.push(cx.finding(Rule::PropertyDoesNotNotify, name_node, vec![name]));
}

/// Classes and reference records.
fn is_class_like(kind: DeclarationKind, node: Node<'_>) -> bool {
    match kind {
        DeclarationKind::Class => true,
        DeclarationKind::Record => !syntax::children(node).iter().any(|c| c.kind() == "struct"),
        _ => false,
    }
}

/// Names raised directly in `body` or by a notifier it calls.
fn raised_names<'a>(body: Node<'a>, property: &str, model: &SemanticModel<'a>) -> Vec<Raised> {
    let mut raised: Vec<Raised> = direct_raises(body, model)
        .into_iter()
        .filter_map(|arg| constant_raise(arg, model))
        .collect();

    for call in syntax::descendants_of_kind(body, "invocation_expression") {
        let Some(Symbol::Member(method)) = model.resolve(call) else {
            continue;
        };
        raised.extend(notifier_raises(call, method, property, model));
    }
    raised
}

/// Name arguments of `PropertyChangedEventArgs` creations within `body`.
fn direct_raises<'a>(body: Node<'a>, model: &SemanticModel<'a>) -> Vec<Node<'a>> {
    syntax::descendants_of_kind(body, "object_creation_expression")
        .into_iter()
        .filter(|creation| {
            matches!(
                model.resolve(*creation),
                Some(Symbol::Known(ctor))
                    if ctor.kind == KnownMemberKind::Constructor && ctor.owner == PROPERTY_CHANGED_EVENT_ARGS
            )
        })
        .filter_map(|creation| syntax::call_arguments(creation).into_iter().next())
        .map(|arg| arg.expression)
        .collect()
}

fn constant_raise<'a>(expr: Node<'a>, model: &SemanticModel<'a>) -> Option<Raised> {
    let source = model.source_of(expr)?;
    if syntax::is_null_or_empty_name(expr, source) {
        return Some(Raised::All);
    }
    syntax::constant_name(syntax::unparenthesize(expr), source).map(Raised::Name)
}

/// What a call to a source notifier raises, one hop deep.
fn notifier_raises<'a>(call: Node<'a>, method: MemberId, property: &str, model: &SemanticModel<'a>) -> Vec<Raised> {
    let notifier = model.member(method);
    if notifier.kind != MemberKind::Method {
        return Vec::new();
    }
    let Some(body) = syntax::member_body(notifier.node) else {
        return Vec::new();
    };
    let Some(arguments) = model.argument_parameters(call, &Symbol::Member(method)) else {
        return Vec::new();
    };

    let mut raised = Vec::new();
    for expr in direct_raises(body, model) {
        let parameter = match model.resolve(syntax::unparenthesize(expr)) {
            Some(Symbol::Parameter(p)) if notifier.parameters.contains(&p) => p,
            _ => {
                raised.extend(constant_raise(expr, model));
                continue;
            }
        };
        let Some(source) = model.source_of(parameter) else {
            continue;
        };
        let Some(parameter_name) = syntax::declared_name(parameter, source) else {
            continue;
        };
        match arguments.iter().find(|(_, p)| p.name == parameter_name) {
            Some((arg, _)) => raised.extend(constant_raise(arg.expression, model)),
            None if is_caller_member_name(parameter, source) => raised.push(Raised::Name(property.to_string())),
            None => {}
        }
    }
    raised
}

fn is_caller_member_name(parameter: Node<'_>, source: &[u8]) -> bool {
    let attribute = simple_metadata_name(CALLER_MEMBER_NAME);
    let short = attribute.trim_end_matches("Attribute");
    syntax::attribute_names(parameter, source)
        .iter()
        .any(|name| *name == attribute || *name == short)
}

#[cfg(test)]
mod tests {
    use crate::detect::rules::check_rule;
    use crate::detect::types::Rule;

    fn view_model(members: &str) -> String {
        format!(
            r#"
namespace Demo
{{
    using System.ComponentModel;
    using System.Runtime.CompilerServices;

    public class ViewModel : INotifyPropertyChanged
    {{
        private int bar;

        public event PropertyChangedEventHandler PropertyChanged;

{0}

        protected virtual void OnPropertyChanged([CallerMemberName] string propertyName = null)
        {{
            this.PropertyChanged?.Invoke(this, new PropertyChangedEventArgs(propertyName));
        }}
    }}
}}
"#,
            members
        )
    }

    fn names(members: &str) -> Vec<String> {
        check_rule(&view_model(members), Rule::PropertyDoesNotNotify)
            .into_iter()
            .flat_map(|f| f.arguments)
            .collect()
    }

    #[test]
    fn test_auto_property_is_reported_at_name() {
        let found = check_rule(&view_model("        public int Bar { get; set; }"), Rule::PropertyDoesNotNotify);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "Property 'Bar' must notify when value changes");
        assert_eq!(found[0].span.start_line, 13);
        assert_eq!(found[0].span.start_col, 20);
    }

    #[test]
    fn test_notifying_setters() {
        for setter in [
            "this.OnPropertyChanged();",
            "this.OnPropertyChanged(nameof(Bar));",
            "this.OnPropertyChanged(\"Bar\");",
            "this.OnPropertyChanged(null);",
            "this.OnPropertyChanged(string.Empty);",
            "this.PropertyChanged?.Invoke(this, new PropertyChangedEventArgs(nameof(this.Bar)));",
            "this.PropertyChanged?.Invoke(this, new PropertyChangedEventArgs(\"\"));",
        ] {
            let members = format!(
                "        public int Bar\n        {{\n            get => this.bar;\n            set\n            {{\n                this.bar = value;\n                {}\n            }}\n        }}",
                setter
            );
            assert!(names(&members).is_empty(), "{}", setter);
        }
    }

    #[test]
    fn test_empty_name_through_notifier_raises_everything() {
        for call in [
            "this.OnPropertyChanged(\"\");",
            "this.OnPropertyChanged(propertyName: \"\");",
            "this.OnPropertyChanged(@\"\");",
        ] {
            let members = format!(
                "        public int Bar\n        {{\n            get => this.bar;\n            set\n            {{\n                this.bar = value;\n                {}\n            }}\n        }}",
                call
            );
            assert!(names(&members).is_empty(), "{}", call);
        }

        let other = "        public int Bar\n        {\n            get => this.bar;\n            set\n            {\n                this.bar = value;\n                this.OnPropertyChanged(propertyName: \"Baz\");\n            }\n        }";
        assert_eq!(names(other), vec!["Bar".to_string()]);
    }

    #[test]
    fn test_setter_raising_other_name() {
        let members = r#"
        public int Bar
        {
            get => this.bar;
            set
            {
                this.bar = value;
                this.OnPropertyChanged(nameof(Baz));
            }
        }

        public int Baz => this.bar;
"#;
        assert_eq!(names(members), vec!["Bar".to_string()]);
    }

    #[test]
    fn test_setter_without_notification() {
        let members = r#"
        public int Bar
        {
            get { return this.bar; }
            set { this.bar = value; }
        }
"#;
        assert_eq!(names(members), vec!["Bar".to_string()]);
    }

    #[test]
    fn test_exempt_properties() {
        for members in [
            "        public int Bar { get; }",
            "        public int Bar { get; init; }",
            "        public int Bar => this.bar;",
            "        public static int Bar { get; set; }",
            "        internal int Bar { get; set; }",
            "        private int Bar { get; set; }",
        ] {
            assert!(names(members).is_empty(), "{}", members);
        }
    }

    #[test]
    fn test_exempt_declaring_types() {
        for source in [
            "public struct Foo { public int Bar { get; set; } }",
            "internal class Foo { public int Bar { get; set; } }",
            "public abstract class Foo { public abstract int Bar { get; set; } }",
            "public interface IFoo { int Bar { get; set; } }",
        ] {
            assert!(check_rule(source, Rule::PropertyDoesNotNotify).is_empty(), "{}", source);
        }
    }

    #[test]
    fn test_dependency_property_wrapper_is_exempt() {
        let source = r#"
using System.Windows;
public class Foo : FrameworkElement
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        nameof(Bar), typeof(int), typeof(Foo));

    public int Bar
    {
        get => (int)GetValue(BarProperty);
        set => SetValue(BarProperty, value);
    }
}
"#;
        assert!(check_rule(source, Rule::PropertyDoesNotNotify).is_empty());
    }
}
