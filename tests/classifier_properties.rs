//! Classification and metadata slot properties, checked through the
//! public API over in-memory sources.

use wpfcheck::analysis::{syntax, Compilation};
use wpfcheck::catalog::SymbolCatalog;
use wpfcheck::detect::{classify, recognize, Classification, MetadataDescriptor, Role};

/// Classify every invocation whose text starts with `prefix`.
fn classify_calls(source: &str, prefix: &str) -> Vec<(String, Option<Role>)> {
    let compilation = Compilation::from_sources([("Foo.cs", source)]).unwrap();
    let model = compilation.semantic_model(SymbolCatalog::shared());
    let file = &compilation.files()[0];

    syntax::descendants_of_kind(file.tree.root_node(), "invocation_expression")
        .into_iter()
        .filter(|node| file.node_text(*node).starts_with(prefix))
        .map(|node| {
            let role = match classify(node, &model) {
                Classification::Confirmed(call) => Some(call.role),
                _ => None,
            };
            (file.node_text(node).to_string(), role)
        })
        .collect()
}

/// Metadata descriptor of the single `Register` call in a control.
fn registered_metadata(metadata: &str) -> Option<MetadataDescriptor> {
    let source = format!(
        r#"
using System.Windows;
public class FooControl : FrameworkElement
{{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        nameof(Bar), typeof(int), typeof(FooControl), {});

    public int Bar
    {{
        get => (int)this.GetValue(BarProperty);
        set => this.SetValue(BarProperty, value);
    }}

    private static void OnBarChanged(DependencyObject d, DependencyPropertyChangedEventArgs e) {{ }}

    private static object CoerceBar(DependencyObject d, object value) => value;
}}
"#,
        metadata
    );
    let compilation = Compilation::from_sources([("FooControl.cs", source.as_str())]).unwrap();
    let model = compilation.semantic_model(SymbolCatalog::shared());
    let file = &compilation.files()[0];
    let call = syntax::descendants_of_kind(file.tree.root_node(), "invocation_expression")
        .into_iter()
        .find(|node| file.node_text(*node).starts_with("DependencyProperty.Register"))
        .unwrap();

    let registration = recognize(call, &model).unwrap();
    registration.record.metadata
}

const SET_VALUE_SOURCE: &str = r#"
using System.Windows;
public class FooControl : FrameworkElement
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        "Bar", typeof(int), typeof(FooControl));

    public void Update(object value, object extra)
    {
        this.SetValue(BarProperty);
        this.SetValue(BarProperty, value);
        this.SetValue(BarProperty, value, extra);
    }
}
"#;

#[test]
fn set_value_is_confirmed_only_with_two_arguments() {
    let found = classify_calls(SET_VALUE_SOURCE, "this.SetValue");

    assert_eq!(
        found,
        vec![
            ("this.SetValue(BarProperty)".to_string(), None),
            ("this.SetValue(BarProperty, value)".to_string(), Some(Role::SetValue)),
            ("this.SetValue(BarProperty, value, extra)".to_string(), None),
        ]
    );
}

#[test]
fn get_value_on_a_dependency_object_parameter_is_confirmed() {
    let source = r#"
using System.Windows;
public static class Foo
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.RegisterAttached(
        "Bar", typeof(int), typeof(Foo));

    public static int GetBar(DependencyObject element) => (int)element.GetValue(BarProperty);
}
"#;
    let found = classify_calls(source, "element.GetValue");
    assert_eq!(
        found,
        vec![("element.GetValue(BarProperty)".to_string(), Some(Role::GetValue))]
    );
}

#[test]
fn same_named_methods_on_other_types_stay_unconfirmed() {
    let source = r#"
public class Store
{
    public void SetValue(string key, object value) { }
    public object GetValue(string key) => null;

    public void Touch()
    {
        this.SetValue("a", 1);
        this.GetValue("a");
    }
}
"#;
    let found = classify_calls(source, "this.");
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|(_, role)| role.is_none()));
}

#[test]
fn default_value_slot_follows_the_parameter_not_the_position() {
    let positional = registered_metadata("new PropertyMetadata(1, OnBarChanged)").unwrap();
    let named = registered_metadata(
        "new PropertyMetadata(propertyChangedCallback: OnBarChanged, defaultValue: 1)",
    )
    .unwrap();
    let with_flags = registered_metadata(
        "new FrameworkPropertyMetadata(1, FrameworkPropertyMetadataOptions.AffectsRender, OnBarChanged, CoerceBar)",
    )
    .unwrap();

    for descriptor in [&positional, &named, &with_flags] {
        let default = descriptor.default_value.as_ref().unwrap();
        assert_eq!(default.text, "1");
        assert_eq!(default.parameter, "defaultValue");
        assert_eq!(
            descriptor.property_changed_callback.as_ref().unwrap().text,
            "OnBarChanged"
        );
    }
    assert_eq!(with_flags.coerce_value_callback.as_ref().unwrap().text, "CoerceBar");
    assert!(positional.coerce_value_callback.is_none());
}

#[test]
fn callback_only_overloads_leave_the_default_slot_empty() {
    let descriptor = registered_metadata("new PropertyMetadata(OnBarChanged)").unwrap();
    assert!(descriptor.default_value.is_none());
    assert_eq!(descriptor.property_changed_callback.unwrap().text, "OnBarChanged");

    let descriptor =
        registered_metadata("new FrameworkPropertyMetadata(OnBarChanged, CoerceBar)").unwrap();
    assert!(descriptor.default_value.is_none());
    assert_eq!(descriptor.coerce_value_callback.unwrap().text, "CoerceBar");
}

#[test]
fn zero_argument_metadata_has_no_slots() {
    let descriptor = registered_metadata("new UIPropertyMetadata()").unwrap();
    assert!(descriptor.is_empty());
    assert_eq!(descriptor.metadata_type, "UIPropertyMetadata");
}
