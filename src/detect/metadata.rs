//! Metadata argument extraction.
//!
//! Slots are filled from the parameter each argument binds to, so
//! `new PropertyMetadata(propertyChangedCallback: OnChanged, defaultValue: 1)`
//! yields the same descriptor as the positional form.

use tree_sitter::Node;

use crate::analysis::types::simple_metadata_name;
use crate::analysis::{syntax, SemanticModel, Span, Symbol};
use crate::catalog::{COERCE_VALUE_CALLBACK, PROPERTY_CHANGED_CALLBACK};

use super::classify::{classify_as, Role};
use super::model::{ArgumentRef, MetadataDescriptor};

/// A metadata construction with its slot expressions.
#[derive(Debug, Clone)]
pub struct MetadataMatch<'a> {
    pub descriptor: MetadataDescriptor,
    pub node: Node<'a>,
    pub default_value: Option<Node<'a>>,
    pub changed: Option<Node<'a>>,
    pub coerce: Option<Node<'a>>,
}

/// Extract the descriptor of a metadata construction.
///
/// Returns `None` unless the constructor resolves to exactly one catalog
/// overload.
pub fn extract<'a>(creation: Node<'a>, model: &SemanticModel<'a>) -> Option<MetadataMatch<'a>> {
    let creation = syntax::unparenthesize(creation);
    let call = classify_as(creation, model, Role::MetadataConstruction)?;
    let pairs = model.argument_parameters(creation, &Symbol::Known(call.member))?;

    let mut found = MetadataMatch {
        descriptor: MetadataDescriptor {
            metadata_type: simple_metadata_name(call.member.owner).to_string(),
            default_value: None,
            property_changed_callback: None,
            coerce_value_callback: None,
            span: Span::from_node(creation),
        },
        node: creation,
        default_value: None,
        changed: None,
        coerce: None,
    };

    for (argument, parameter) in pairs {
        let Some(ty) = parameter.ty.as_ref() else {
            continue;
        };
        let reference = ArgumentRef {
            parameter: parameter.name.clone(),
            text: model.text(argument.expression).to_string(),
            span: Span::from_node(argument.expression),
        };
        if ty.is_object() && found.default_value.is_none() {
            found.default_value = Some(argument.expression);
            found.descriptor.default_value = Some(reference);
        } else if ty.is(PROPERTY_CHANGED_CALLBACK) {
            found.changed = Some(argument.expression);
            found.descriptor.property_changed_callback = Some(reference);
        } else if ty.is(COERCE_VALUE_CALLBACK) {
            found.coerce = Some(argument.expression);
            found.descriptor.coerce_value_callback = Some(reference);
        }
    }

    Some(found)
}

/// Extract metadata passed as a registration argument, if it is written
/// inline as a construction.
pub fn from_argument<'a>(argument: Node<'a>, model: &SemanticModel<'a>) -> Option<MetadataMatch<'a>> {
    let argument = syntax::unparenthesize(argument);
    if argument.kind() != "object_creation_expression" {
        return None;
    }
    extract(argument, model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Compilation;
    use crate::catalog::SymbolCatalog;

    fn descriptor(expression: &str) -> Option<MetadataDescriptor> {
        let source = format!(
            r#"
using System.Windows;
public class Foo : DependencyObject
{{
    public static readonly object Meta = {};
    private static void OnChanged(DependencyObject d, DependencyPropertyChangedEventArgs e) {{ }}
    private static object Coerce(DependencyObject d, object value) => value;
}}
"#,
            expression
        );
        let compilation = Compilation::from_sources([("Foo.cs", source.as_str())]).unwrap();
        let model = compilation.semantic_model(SymbolCatalog::shared());
        let root = compilation.files()[0].tree.root_node();
        let creation = syntax::descendants_of_kind(root, "object_creation_expression")
            .into_iter()
            .next()
            .unwrap();
        extract(creation, &model).map(|m| m.descriptor)
    }

    #[test]
    fn test_zero_arguments_yield_empty_descriptor() {
        let found = descriptor("new PropertyMetadata()").unwrap();
        assert!(found.is_empty());
        assert_eq!(found.metadata_type, "PropertyMetadata");
    }

    #[test]
    fn test_positional_slots() {
        let found = descriptor("new PropertyMetadata(1, OnChanged, Coerce)").unwrap();
        assert_eq!(found.default_value.unwrap().text, "1");
        assert_eq!(found.property_changed_callback.unwrap().text, "OnChanged");
        assert_eq!(found.coerce_value_callback.unwrap().text, "Coerce");
    }

    #[test]
    fn test_named_arguments_fill_slots_by_parameter() {
        let found =
            descriptor("new PropertyMetadata(propertyChangedCallback: OnChanged, defaultValue: 2)").unwrap();
        let default = found.default_value.unwrap();
        assert_eq!(default.text, "2");
        assert_eq!(default.parameter, "defaultValue");
        assert_eq!(found.property_changed_callback.unwrap().text, "OnChanged");
    }

    #[test]
    fn test_callback_only_overload_has_no_default() {
        let found = descriptor("new FrameworkPropertyMetadata(OnChanged)").unwrap();
        assert!(found.default_value.is_none());
        assert_eq!(found.property_changed_callback.unwrap().text, "OnChanged");
    }

    #[test]
    fn test_flags_are_not_a_slot() {
        let found = descriptor(
            "new FrameworkPropertyMetadata(1.0, FrameworkPropertyMetadataOptions.AffectsRender, OnChanged)",
        )
        .unwrap();
        assert_eq!(found.default_value.unwrap().text, "1.0");
        assert_eq!(found.property_changed_callback.unwrap().text, "OnChanged");
        assert!(found.coerce_value_callback.is_none());
    }

    #[test]
    fn test_unresolved_metadata_type_yields_nothing() {
        assert!(descriptor("new Other.PropertyMetadata(1)").is_none());
    }
}
