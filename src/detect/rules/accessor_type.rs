//! WPF0012 / WPF0013: CLR accessor types must match the registered type.
//!
//! Types are compared after resolution, so `int`, `Int32` and
//! `System.Int32` agree, as do `int?` and `Nullable<int>`. A registered
//! type of `object` accepts anything. Unresolved types and type
//! parameters on either side are not judged.

use tree_sitter::Node;

use crate::analysis::TypeRef;
use crate::detect::accessors::SideMatch;
use crate::detect::model::Locality;
use crate::detect::types::{Finding, Rule};

use super::NodeContext;

pub fn check(cx: &NodeContext<'_, '_>, out: &mut Vec<Finding>) {
    let Some(registration) = cx.registration.as_ref() else {
        return;
    };
    let (Some(accessors), Some(registered)) = (registration.accessors.as_ref(), registration.record.value_type.as_ref())
    else {
        return;
    };
    if registered.is_object() || registered.has_type_parameters() {
        return;
    }

    match accessors.pair.locality {
        Locality::InstanceProperty => {
            // Both sides share the property's type.
            let Some(side) = accessors.get.as_ref().or(accessors.set.as_ref()) else {
                return;
            };
            if let Some(type_node) = mismatched_type(cx, side, registered) {
                let name = accessors
                    .pair
                    .get
                    .as_ref()
                    .or(accessors.pair.set.as_ref())
                    .map(|s| s.member.clone())
                    .unwrap_or_default();
                out.push(
                    cx.finding(Rule::ClrPropertyType, type_node, vec![name, registered.to_string()])
                        .with_context(registration.context()),
                );
            }
        }
        Locality::AttachedStaticMethods => {
            let sides = [
                (accessors.get.as_ref(), accessors.pair.get.as_ref()),
                (accessors.set.as_ref(), accessors.pair.set.as_ref()),
            ];
            for (side, summary) in sides {
                let (Some(side), Some(summary)) = (side, summary) else {
                    continue;
                };
                if let Some(type_node) = mismatched_type(cx, side, registered) {
                    out.push(
                        cx.finding(
                            Rule::ClrMethodType,
                            type_node,
                            vec![summary.member.clone(), registered.to_string()],
                        )
                        .with_context(registration.context()),
                    );
                }
            }
        }
    }
}

/// The side's type syntax when it resolves to something other than
/// `registered`.
fn mismatched_type<'a>(cx: &NodeContext<'a, '_>, side: &SideMatch<'a>, registered: &TypeRef) -> Option<Node<'a>> {
    let type_node = side.value_type?;
    let actual = cx.model.resolve_type_syntax(type_node)?;
    if actual.has_type_parameters() || &actual == registered {
        return None;
    }
    Some(type_node)
}

#[cfg(test)]
mod tests {
    use crate::detect::rules::check_rule;
    use crate::detect::types::Rule;

    fn instance(registered: &str, property: &str) -> String {
        format!(
            r#"
namespace Demo
{{
    using System;
    using System.Windows;

    public class FooControl : FrameworkElement
    {{
        public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
            nameof(Bar), typeof({0}), typeof(FooControl), new PropertyMetadata(default({0})));

        public {1} Bar
        {{
            get => ({1})GetValue(BarProperty);
            set => SetValue(BarProperty, value);
        }}
    }}
}}
"#,
            registered, property
        )
    }

    #[test]
    fn test_instance_property_type_agreement() {
        for (registered, property) in [
            ("int", "int"),
            ("int", "Int32"),
            ("int?", "Nullable<int>"),
            ("object", "string"),
            ("Unknown", "int"),
        ] {
            let found = check_rule(&instance(registered, property), Rule::ClrPropertyType);
            assert!(found.is_empty(), "{} vs {}", registered, property);
        }
    }

    #[test]
    fn test_instance_property_type_mismatch() {
        let found = check_rule(&instance("int", "double"), Rule::ClrPropertyType);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "Property 'Bar' must be of type int");
        assert_eq!(found[0].span.start_line, 12);
        assert!(found[0].context.accessors.is_some());
    }

    #[test]
    fn test_attached_method_types() {
        let source = r#"
using System.Windows;
public static class Foo
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.RegisterAttached(
        "Bar", typeof(int), typeof(Foo), new PropertyMetadata(default(int)));

    public static void SetBar(DependencyObject element, double value) => element.SetValue(BarProperty, value);

    public static int GetBar(DependencyObject element) => (int)element.GetValue(BarProperty);
}
"#;
        let found = check_rule(source, Rule::ClrMethodType);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].arguments, vec!["SetBar".to_string(), "int".to_string()]);
        assert_eq!(found[0].message, "Value type of 'SetBar' must match registered type int");
    }
}
