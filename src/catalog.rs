//! Built-in catalog of the framework symbols the rules match against.
//!
//! The tables are static (`phf`) and the derived indexes are built once
//! per process behind [`SymbolCatalog::shared`]. Nothing here is mutated
//! after construction, so the catalog is shared by reference across
//! worker threads.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use phf::phf_map;

use crate::analysis::types::{metadata_arity, metadata_namespace, simple_metadata_name};

pub const OBJECT: &str = "System.Object";
pub const STRING: &str = "System.String";
pub const BOOLEAN: &str = "System.Boolean";
pub const INT32: &str = "System.Int32";
pub const DOUBLE: &str = "System.Double";
pub const VOID: &str = "System.Void";
pub const TYPE: &str = "System.Type";

pub const DEPENDENCY_OBJECT: &str = "System.Windows.DependencyObject";
pub const DEPENDENCY_PROPERTY: &str = "System.Windows.DependencyProperty";
pub const DEPENDENCY_PROPERTY_KEY: &str = "System.Windows.DependencyPropertyKey";
pub const PROPERTY_METADATA: &str = "System.Windows.PropertyMetadata";
pub const UI_PROPERTY_METADATA: &str = "System.Windows.UIPropertyMetadata";
pub const FRAMEWORK_PROPERTY_METADATA: &str = "System.Windows.FrameworkPropertyMetadata";
pub const FRAMEWORK_PROPERTY_METADATA_OPTIONS: &str =
    "System.Windows.FrameworkPropertyMetadataOptions";
pub const PROPERTY_CHANGED_CALLBACK: &str = "System.Windows.PropertyChangedCallback";
pub const COERCE_VALUE_CALLBACK: &str = "System.Windows.CoerceValueCallback";
pub const VALIDATE_VALUE_CALLBACK: &str = "System.Windows.ValidateValueCallback";
pub const FRAMEWORK_ELEMENT: &str = "System.Windows.FrameworkElement";

pub const INOTIFY_PROPERTY_CHANGED: &str = "System.ComponentModel.INotifyPropertyChanged";
pub const PROPERTY_CHANGED_EVENT_ARGS: &str = "System.ComponentModel.PropertyChangedEventArgs";
pub const PROPERTY_CHANGED_EVENT_HANDLER: &str =
    "System.ComponentModel.PropertyChangedEventHandler";
pub const CALLER_MEMBER_NAME: &str = "System.Runtime.CompilerServices.CallerMemberNameAttribute";

/// Identity of a known member: owning type and member name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QualifiedMember {
    pub owner: &'static str,
    pub name: &'static str,
}

impl QualifiedMember {
    pub const fn new(owner: &'static str, name: &'static str) -> Self {
        Self { owner, name }
    }

    /// Whether a catalog member has this identity.
    pub fn matches(&self, member: &KnownMember) -> bool {
        member.owner == self.owner && member.name == self.name
    }
}

pub const REGISTER: QualifiedMember = QualifiedMember::new(DEPENDENCY_PROPERTY, "Register");
pub const REGISTER_READ_ONLY: QualifiedMember =
    QualifiedMember::new(DEPENDENCY_PROPERTY, "RegisterReadOnly");
pub const REGISTER_ATTACHED: QualifiedMember =
    QualifiedMember::new(DEPENDENCY_PROPERTY, "RegisterAttached");
pub const REGISTER_ATTACHED_READ_ONLY: QualifiedMember =
    QualifiedMember::new(DEPENDENCY_PROPERTY, "RegisterAttachedReadOnly");
pub const ADD_OWNER: QualifiedMember = QualifiedMember::new(DEPENDENCY_PROPERTY, "AddOwner");
pub const OVERRIDE_METADATA: QualifiedMember =
    QualifiedMember::new(DEPENDENCY_PROPERTY, "OverrideMetadata");
pub const KEY_OVERRIDE_METADATA: QualifiedMember =
    QualifiedMember::new(DEPENDENCY_PROPERTY_KEY, "OverrideMetadata");
pub const KEY_DEPENDENCY_PROPERTY: QualifiedMember =
    QualifiedMember::new(DEPENDENCY_PROPERTY_KEY, "DependencyProperty");
pub const GET_VALUE: QualifiedMember = QualifiedMember::new(DEPENDENCY_OBJECT, "GetValue");
pub const SET_VALUE: QualifiedMember = QualifiedMember::new(DEPENDENCY_OBJECT, "SetValue");
pub const SET_CURRENT_VALUE: QualifiedMember =
    QualifiedMember::new(DEPENDENCY_OBJECT, "SetCurrentValue");
pub const DATA_CONTEXT: QualifiedMember = QualifiedMember::new(FRAMEWORK_ELEMENT, "DataContext");
pub const DATA_CONTEXT_PROPERTY: QualifiedMember =
    QualifiedMember::new(FRAMEWORK_ELEMENT, "DataContextProperty");

/// Kind of a catalog type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownTypeKind {
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
}

impl KnownTypeKind {
    pub fn is_value_type(&self) -> bool {
        matches!(self, KnownTypeKind::Struct | KnownTypeKind::Enum)
    }
}

/// A framework type.
///
/// Generic definitions carry their arity in the metadata name
/// (``List`1``). A base or interface with the same arity is taken to be
/// constructed with the same type arguments.
#[derive(Debug)]
pub struct KnownType {
    pub full_name: &'static str,
    pub kind: KnownTypeKind,
    pub base: Option<&'static str>,
    pub interfaces: &'static [&'static str],
    /// Parameter count of a delegate's `Invoke`.
    pub delegate_arity: usize,
}

/// Kind of a catalog member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownMemberKind {
    Constructor,
    Method,
    Property,
    Field,
    Event,
}

/// A parameter of a catalog method or constructor.
#[derive(Debug, Clone, Copy)]
pub struct KnownParameter {
    pub name: &'static str,
    pub ty: &'static str,
}

/// A framework member.
#[derive(Debug)]
pub struct KnownMember {
    pub owner: &'static str,
    pub name: &'static str,
    pub kind: KnownMemberKind,
    pub is_static: bool,
    pub parameters: &'static [KnownParameter],
    /// Return type for methods, member type for fields, properties and events.
    pub ty: &'static str,
    /// Registered value type of a framework dependency property field.
    pub registered_type: Option<&'static str>,
    /// Backing field of a framework CLR wrapper property.
    pub dependency_property: Option<&'static str>,
}

/// Catalog entries are compared by identity.
impl PartialEq for KnownMember {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for KnownMember {}

const fn p(name: &'static str, ty: &'static str) -> KnownParameter {
    KnownParameter { name, ty }
}

const fn class(full_name: &'static str, base: &'static str) -> KnownType {
    KnownType {
        full_name,
        kind: KnownTypeKind::Class,
        base: Some(base),
        interfaces: &[],
        delegate_arity: 0,
    }
}

const fn class_with(
    full_name: &'static str,
    base: &'static str,
    interfaces: &'static [&'static str],
) -> KnownType {
    KnownType {
        full_name,
        kind: KnownTypeKind::Class,
        base: Some(base),
        interfaces,
        delegate_arity: 0,
    }
}

const fn value(full_name: &'static str) -> KnownType {
    KnownType {
        full_name,
        kind: KnownTypeKind::Struct,
        base: Some("System.ValueType"),
        interfaces: &[],
        delegate_arity: 0,
    }
}

const fn enumeration(full_name: &'static str) -> KnownType {
    KnownType {
        full_name,
        kind: KnownTypeKind::Enum,
        base: Some("System.Enum"),
        interfaces: &[],
        delegate_arity: 0,
    }
}

const fn interface(full_name: &'static str, interfaces: &'static [&'static str]) -> KnownType {
    KnownType {
        full_name,
        kind: KnownTypeKind::Interface,
        base: None,
        interfaces,
        delegate_arity: 0,
    }
}

const fn delegate(full_name: &'static str, arity: usize) -> KnownType {
    KnownType {
        full_name,
        kind: KnownTypeKind::Delegate,
        base: Some("System.MulticastDelegate"),
        interfaces: &[],
        delegate_arity: arity,
    }
}

const fn ctor(owner: &'static str, parameters: &'static [KnownParameter]) -> KnownMember {
    KnownMember {
        owner,
        name: ".ctor",
        kind: KnownMemberKind::Constructor,
        is_static: false,
        parameters,
        ty: owner,
        registered_type: None,
        dependency_property: None,
    }
}

const fn method(
    owner: &'static str,
    name: &'static str,
    is_static: bool,
    parameters: &'static [KnownParameter],
    ty: &'static str,
) -> KnownMember {
    KnownMember {
        owner,
        name,
        kind: KnownMemberKind::Method,
        is_static,
        parameters,
        ty,
        registered_type: None,
        dependency_property: None,
    }
}

const fn property(owner: &'static str, name: &'static str, ty: &'static str) -> KnownMember {
    KnownMember {
        owner,
        name,
        kind: KnownMemberKind::Property,
        is_static: false,
        parameters: &[],
        ty,
        registered_type: None,
        dependency_property: None,
    }
}

const fn static_field(owner: &'static str, name: &'static str, ty: &'static str) -> KnownMember {
    KnownMember {
        owner,
        name,
        kind: KnownMemberKind::Field,
        is_static: true,
        parameters: &[],
        ty,
        registered_type: None,
        dependency_property: None,
    }
}

/// A framework dependency property field (`WidthProperty`).
const fn dp_field(
    owner: &'static str,
    name: &'static str,
    registered_type: &'static str,
) -> KnownMember {
    KnownMember {
        owner,
        name,
        kind: KnownMemberKind::Field,
        is_static: true,
        parameters: &[],
        ty: DEPENDENCY_PROPERTY,
        registered_type: Some(registered_type),
        dependency_property: None,
    }
}

/// The CLR wrapper of a framework dependency property (`Width`).
const fn dp_wrapper(
    owner: &'static str,
    name: &'static str,
    ty: &'static str,
    field: &'static str,
) -> KnownMember {
    KnownMember {
        owner,
        name,
        kind: KnownMemberKind::Property,
        is_static: false,
        parameters: &[],
        ty,
        registered_type: None,
        dependency_property: Some(field),
    }
}

const NAME: KnownParameter = p("name", STRING);
const PROPERTY_TYPE: KnownParameter = p("propertyType", TYPE);
const OWNER_TYPE: KnownParameter = p("ownerType", TYPE);
const TYPE_METADATA: KnownParameter = p("typeMetadata", PROPERTY_METADATA);
const DEFAULT_METADATA: KnownParameter = p("defaultMetadata", PROPERTY_METADATA);
const VALIDATE: KnownParameter = p("validateValueCallback", VALIDATE_VALUE_CALLBACK);
const DEFAULT_VALUE: KnownParameter = p("defaultValue", OBJECT);
const CHANGED: KnownParameter = p("propertyChangedCallback", PROPERTY_CHANGED_CALLBACK);
const COERCE: KnownParameter = p("coerceValueCallback", COERCE_VALUE_CALLBACK);
const FLAGS: KnownParameter = p("flags", FRAMEWORK_PROPERTY_METADATA_OPTIONS);
const ANIMATION: KnownParameter = p("isAnimationProhibited", BOOLEAN);

const OBJECT_MEMBERS: &[KnownMember] = &[
    method(OBJECT, "ToString", false, &[], STRING),
    method(OBJECT, "GetHashCode", false, &[], INT32),
    method(OBJECT, "Equals", false, &[p("obj", OBJECT)], BOOLEAN),
    method(OBJECT, "GetType", false, &[], TYPE),
];

const STRING_MEMBERS: &[KnownMember] = &[
    static_field(STRING, "Empty", STRING),
    method(STRING, "IsNullOrEmpty", true, &[p("value", STRING)], BOOLEAN),
    property(STRING, "Length", INT32),
];

const EVENT_ARGS_MEMBERS: &[KnownMember] = &[static_field("System.EventArgs", "Empty", "System.EventArgs")];

const PROPERTY_CHANGED_EVENT_ARGS_MEMBERS: &[KnownMember] = &[
    ctor(PROPERTY_CHANGED_EVENT_ARGS, &[p("propertyName", STRING)]),
    property(PROPERTY_CHANGED_EVENT_ARGS, "PropertyName", STRING),
];

const PROPERTY_CHANGED_EVENT_HANDLER_MEMBERS: &[KnownMember] = &[method(
    PROPERTY_CHANGED_EVENT_HANDLER,
    "Invoke",
    false,
    &[p("sender", OBJECT), p("e", PROPERTY_CHANGED_EVENT_ARGS)],
    VOID,
)];

const INOTIFY_PROPERTY_CHANGED_MEMBERS: &[KnownMember] = &[KnownMember {
    owner: INOTIFY_PROPERTY_CHANGED,
    name: "PropertyChanged",
    kind: KnownMemberKind::Event,
    is_static: false,
    parameters: &[],
    ty: PROPERTY_CHANGED_EVENT_HANDLER,
    registered_type: None,
    dependency_property: None,
}];

const DEPENDENCY_OBJECT_MEMBERS: &[KnownMember] = &[
    method(DEPENDENCY_OBJECT, "GetValue", false, &[p("dp", DEPENDENCY_PROPERTY)], OBJECT),
    method(
        DEPENDENCY_OBJECT,
        "SetValue",
        false,
        &[p("dp", DEPENDENCY_PROPERTY), p("value", OBJECT)],
        VOID,
    ),
    method(
        DEPENDENCY_OBJECT,
        "SetValue",
        false,
        &[p("key", DEPENDENCY_PROPERTY_KEY), p("value", OBJECT)],
        VOID,
    ),
    method(
        DEPENDENCY_OBJECT,
        "SetCurrentValue",
        false,
        &[p("dp", DEPENDENCY_PROPERTY), p("value", OBJECT)],
        VOID,
    ),
    method(DEPENDENCY_OBJECT, "ClearValue", false, &[p("dp", DEPENDENCY_PROPERTY)], VOID),
    method(DEPENDENCY_OBJECT, "ClearValue", false, &[p("key", DEPENDENCY_PROPERTY_KEY)], VOID),
    method(DEPENDENCY_OBJECT, "CoerceValue", false, &[p("dp", DEPENDENCY_PROPERTY)], VOID),
    method(DEPENDENCY_OBJECT, "InvalidateProperty", false, &[p("dp", DEPENDENCY_PROPERTY)], VOID),
];

const DEPENDENCY_PROPERTY_MEMBERS: &[KnownMember] = &[
    method(DEPENDENCY_PROPERTY, "Register", true, &[NAME, PROPERTY_TYPE, OWNER_TYPE], DEPENDENCY_PROPERTY),
    method(DEPENDENCY_PROPERTY, "Register", true, &[NAME, PROPERTY_TYPE, OWNER_TYPE, TYPE_METADATA], DEPENDENCY_PROPERTY),
    method(DEPENDENCY_PROPERTY, "Register", true, &[NAME, PROPERTY_TYPE, OWNER_TYPE, TYPE_METADATA, VALIDATE], DEPENDENCY_PROPERTY),
    method(DEPENDENCY_PROPERTY, "RegisterReadOnly", true, &[NAME, PROPERTY_TYPE, OWNER_TYPE, TYPE_METADATA], DEPENDENCY_PROPERTY_KEY),
    method(DEPENDENCY_PROPERTY, "RegisterReadOnly", true, &[NAME, PROPERTY_TYPE, OWNER_TYPE, TYPE_METADATA, VALIDATE], DEPENDENCY_PROPERTY_KEY),
    method(DEPENDENCY_PROPERTY, "RegisterAttached", true, &[NAME, PROPERTY_TYPE, OWNER_TYPE], DEPENDENCY_PROPERTY),
    method(DEPENDENCY_PROPERTY, "RegisterAttached", true, &[NAME, PROPERTY_TYPE, OWNER_TYPE, DEFAULT_METADATA], DEPENDENCY_PROPERTY),
    method(DEPENDENCY_PROPERTY, "RegisterAttached", true, &[NAME, PROPERTY_TYPE, OWNER_TYPE, DEFAULT_METADATA, VALIDATE], DEPENDENCY_PROPERTY),
    method(DEPENDENCY_PROPERTY, "RegisterAttachedReadOnly", true, &[NAME, PROPERTY_TYPE, OWNER_TYPE, DEFAULT_METADATA], DEPENDENCY_PROPERTY_KEY),
    method(DEPENDENCY_PROPERTY, "RegisterAttachedReadOnly", true, &[NAME, PROPERTY_TYPE, OWNER_TYPE, DEFAULT_METADATA, VALIDATE], DEPENDENCY_PROPERTY_KEY),
    method(DEPENDENCY_PROPERTY, "AddOwner", false, &[p("ownerType", TYPE)], DEPENDENCY_PROPERTY),
    method(DEPENDENCY_PROPERTY, "AddOwner", false, &[p("ownerType", TYPE), TYPE_METADATA], DEPENDENCY_PROPERTY),
    method(DEPENDENCY_PROPERTY, "OverrideMetadata", false, &[p("forType", TYPE), TYPE_METADATA], VOID),
    method(
        DEPENDENCY_PROPERTY,
        "OverrideMetadata",
        false,
        &[p("forType", TYPE), TYPE_METADATA, p("key", DEPENDENCY_PROPERTY_KEY)],
        VOID,
    ),
    property(DEPENDENCY_PROPERTY, "Name", STRING),
    property(DEPENDENCY_PROPERTY, "PropertyType", TYPE),
    property(DEPENDENCY_PROPERTY, "OwnerType", TYPE),
    property(DEPENDENCY_PROPERTY, "DefaultMetadata", PROPERTY_METADATA),
    static_field(DEPENDENCY_PROPERTY, "UnsetValue", OBJECT),
];

const DEPENDENCY_PROPERTY_KEY_MEMBERS: &[KnownMember] = &[
    property(DEPENDENCY_PROPERTY_KEY, "DependencyProperty", DEPENDENCY_PROPERTY),
    method(
        DEPENDENCY_PROPERTY_KEY,
        "OverrideMetadata",
        false,
        &[p("forType", TYPE), TYPE_METADATA],
        VOID,
    ),
];

const PROPERTY_METADATA_MEMBERS: &[KnownMember] = &[
    ctor(PROPERTY_METADATA, &[]),
    ctor(PROPERTY_METADATA, &[DEFAULT_VALUE]),
    ctor(PROPERTY_METADATA, &[CHANGED]),
    ctor(PROPERTY_METADATA, &[DEFAULT_VALUE, CHANGED]),
    ctor(PROPERTY_METADATA, &[DEFAULT_VALUE, CHANGED, COERCE]),
    property(PROPERTY_METADATA, "DefaultValue", OBJECT),
];

const UI_PROPERTY_METADATA_MEMBERS: &[KnownMember] = &[
    ctor(UI_PROPERTY_METADATA, &[]),
    ctor(UI_PROPERTY_METADATA, &[DEFAULT_VALUE]),
    ctor(UI_PROPERTY_METADATA, &[CHANGED]),
    ctor(UI_PROPERTY_METADATA, &[DEFAULT_VALUE, CHANGED]),
    ctor(UI_PROPERTY_METADATA, &[DEFAULT_VALUE, CHANGED, COERCE]),
    ctor(UI_PROPERTY_METADATA, &[DEFAULT_VALUE, CHANGED, COERCE, ANIMATION]),
];

const FRAMEWORK_PROPERTY_METADATA_MEMBERS: &[KnownMember] = &[
    ctor(FRAMEWORK_PROPERTY_METADATA, &[]),
    ctor(FRAMEWORK_PROPERTY_METADATA, &[DEFAULT_VALUE]),
    ctor(FRAMEWORK_PROPERTY_METADATA, &[CHANGED]),
    ctor(FRAMEWORK_PROPERTY_METADATA, &[CHANGED, COERCE]),
    ctor(FRAMEWORK_PROPERTY_METADATA, &[DEFAULT_VALUE, FLAGS]),
    ctor(FRAMEWORK_PROPERTY_METADATA, &[DEFAULT_VALUE, CHANGED]),
    ctor(FRAMEWORK_PROPERTY_METADATA, &[DEFAULT_VALUE, CHANGED, COERCE]),
    ctor(FRAMEWORK_PROPERTY_METADATA, &[DEFAULT_VALUE, FLAGS, CHANGED]),
    ctor(FRAMEWORK_PROPERTY_METADATA, &[DEFAULT_VALUE, FLAGS, CHANGED, COERCE]),
    ctor(FRAMEWORK_PROPERTY_METADATA, &[DEFAULT_VALUE, FLAGS, CHANGED, COERCE, ANIMATION]),
    ctor(
        FRAMEWORK_PROPERTY_METADATA,
        &[
            DEFAULT_VALUE,
            FLAGS,
            CHANGED,
            COERCE,
            ANIMATION,
            p("defaultUpdateSourceTrigger", "System.Windows.Data.UpdateSourceTrigger"),
        ],
    ),
];

const UI_ELEMENT_MEMBERS: &[KnownMember] = &[
    dp_field("System.Windows.UIElement", "IsEnabledProperty", BOOLEAN),
    dp_wrapper("System.Windows.UIElement", "IsEnabled", BOOLEAN, "IsEnabledProperty"),
    dp_field("System.Windows.UIElement", "VisibilityProperty", "System.Windows.Visibility"),
    dp_wrapper("System.Windows.UIElement", "Visibility", "System.Windows.Visibility", "VisibilityProperty"),
    dp_field("System.Windows.UIElement", "OpacityProperty", DOUBLE),
    dp_wrapper("System.Windows.UIElement", "Opacity", DOUBLE, "OpacityProperty"),
];

const FRAMEWORK_ELEMENT_MEMBERS: &[KnownMember] = &[
    dp_field(FRAMEWORK_ELEMENT, "DataContextProperty", OBJECT),
    dp_wrapper(FRAMEWORK_ELEMENT, "DataContext", OBJECT, "DataContextProperty"),
    dp_field(FRAMEWORK_ELEMENT, "WidthProperty", DOUBLE),
    dp_wrapper(FRAMEWORK_ELEMENT, "Width", DOUBLE, "WidthProperty"),
    dp_field(FRAMEWORK_ELEMENT, "HeightProperty", DOUBLE),
    dp_wrapper(FRAMEWORK_ELEMENT, "Height", DOUBLE, "HeightProperty"),
    dp_field(FRAMEWORK_ELEMENT, "TagProperty", OBJECT),
    dp_wrapper(FRAMEWORK_ELEMENT, "Tag", OBJECT, "TagProperty"),
    dp_field(FRAMEWORK_ELEMENT, "MarginProperty", "System.Windows.Thickness"),
    dp_wrapper(FRAMEWORK_ELEMENT, "Margin", "System.Windows.Thickness", "MarginProperty"),
];

const CONTROL_MEMBERS: &[KnownMember] = &[
    dp_field("System.Windows.Controls.Control", "BackgroundProperty", "System.Windows.Media.Brush"),
    dp_wrapper("System.Windows.Controls.Control", "Background", "System.Windows.Media.Brush", "BackgroundProperty"),
    dp_field("System.Windows.Controls.Control", "ForegroundProperty", "System.Windows.Media.Brush"),
    dp_wrapper("System.Windows.Controls.Control", "Foreground", "System.Windows.Media.Brush", "ForegroundProperty"),
    dp_field("System.Windows.Controls.Control", "FontSizeProperty", DOUBLE),
    dp_wrapper("System.Windows.Controls.Control", "FontSize", DOUBLE, "FontSizeProperty"),
];

const CONTENT_CONTROL_MEMBERS: &[KnownMember] = &[
    dp_field("System.Windows.Controls.ContentControl", "ContentProperty", OBJECT),
    dp_wrapper("System.Windows.Controls.ContentControl", "Content", OBJECT, "ContentProperty"),
];

const TEXT_BOX_MEMBERS: &[KnownMember] = &[
    ctor("System.Windows.Controls.TextBox", &[]),
    dp_field("System.Windows.Controls.TextBox", "TextProperty", STRING),
    dp_wrapper("System.Windows.Controls.TextBox", "Text", STRING, "TextProperty"),
];

const TEXT_BLOCK_MEMBERS: &[KnownMember] = &[
    ctor("System.Windows.Controls.TextBlock", &[]),
    dp_field("System.Windows.Controls.TextBlock", "TextProperty", STRING),
    dp_wrapper("System.Windows.Controls.TextBlock", "Text", STRING, "TextProperty"),
];

const WINDOW_MEMBERS: &[KnownMember] = &[
    ctor("System.Windows.Window", &[]),
    dp_field("System.Windows.Window", "TitleProperty", STRING),
    dp_wrapper("System.Windows.Window", "Title", STRING, "TitleProperty"),
];

static TYPES: phf::Map<&'static str, KnownType> = phf_map! {
    "System.Object" => KnownType {
        full_name: OBJECT,
        kind: KnownTypeKind::Class,
        base: None,
        interfaces: &[],
        delegate_arity: 0,
    },
    "System.ValueType" => class("System.ValueType", OBJECT),
    "System.Enum" => class("System.Enum", "System.ValueType"),
    "System.String" => class_with(STRING, OBJECT, &["System.Collections.IEnumerable"]),
    "System.Boolean" => value(BOOLEAN),
    "System.Char" => value("System.Char"),
    "System.SByte" => value("System.SByte"),
    "System.Byte" => value("System.Byte"),
    "System.Int16" => value("System.Int16"),
    "System.UInt16" => value("System.UInt16"),
    "System.Int32" => value(INT32),
    "System.UInt32" => value("System.UInt32"),
    "System.Int64" => value("System.Int64"),
    "System.UInt64" => value("System.UInt64"),
    "System.Single" => value("System.Single"),
    "System.Double" => value(DOUBLE),
    "System.Decimal" => value("System.Decimal"),
    "System.IntPtr" => value("System.IntPtr"),
    "System.UIntPtr" => value("System.UIntPtr"),
    "System.Void" => value(VOID),
    "System.Nullable`1" => value("System.Nullable`1"),
    "System.DateTime" => value("System.DateTime"),
    "System.TimeSpan" => value("System.TimeSpan"),
    "System.Guid" => value("System.Guid"),
    "System.Type" => class(TYPE, OBJECT),
    "System.Delegate" => class("System.Delegate", OBJECT),
    "System.MulticastDelegate" => class("System.MulticastDelegate", "System.Delegate"),
    "System.Array" => class_with(
        "System.Array",
        OBJECT,
        &["System.Collections.IList", "System.Collections.ICollection", "System.Collections.IEnumerable"]
    ),
    "System.EventArgs" => class("System.EventArgs", OBJECT),
    "System.Attribute" => class("System.Attribute", OBJECT),
    "System.Exception" => class("System.Exception", OBJECT),
    "System.EventHandler" => delegate("System.EventHandler", 2),
    "System.Action" => delegate("System.Action", 0),
    "System.Collections.IEnumerable" => interface("System.Collections.IEnumerable", &[]),
    "System.Collections.ICollection" => interface(
        "System.Collections.ICollection",
        &["System.Collections.IEnumerable"]
    ),
    "System.Collections.IList" => interface(
        "System.Collections.IList",
        &["System.Collections.ICollection", "System.Collections.IEnumerable"]
    ),
    "System.Collections.Generic.IEnumerable`1" => interface(
        "System.Collections.Generic.IEnumerable`1",
        &["System.Collections.IEnumerable"]
    ),
    "System.Collections.Generic.ICollection`1" => interface(
        "System.Collections.Generic.ICollection`1",
        &["System.Collections.Generic.IEnumerable`1", "System.Collections.IEnumerable"]
    ),
    "System.Collections.Generic.IList`1" => interface(
        "System.Collections.Generic.IList`1",
        &[
            "System.Collections.Generic.ICollection`1",
            "System.Collections.Generic.IEnumerable`1",
            "System.Collections.IEnumerable",
        ]
    ),
    "System.Collections.Generic.IReadOnlyList`1" => interface(
        "System.Collections.Generic.IReadOnlyList`1",
        &["System.Collections.Generic.IEnumerable`1", "System.Collections.IEnumerable"]
    ),
    "System.Collections.Generic.List`1" => class_with(
        "System.Collections.Generic.List`1",
        OBJECT,
        &[
            "System.Collections.Generic.IList`1",
            "System.Collections.Generic.ICollection`1",
            "System.Collections.Generic.IEnumerable`1",
            "System.Collections.Generic.IReadOnlyList`1",
            "System.Collections.IList",
            "System.Collections.ICollection",
            "System.Collections.IEnumerable",
        ]
    ),
    "System.Collections.ObjectModel.Collection`1" => class_with(
        "System.Collections.ObjectModel.Collection`1",
        OBJECT,
        &[
            "System.Collections.Generic.IList`1",
            "System.Collections.Generic.ICollection`1",
            "System.Collections.Generic.IEnumerable`1",
            "System.Collections.Generic.IReadOnlyList`1",
            "System.Collections.IList",
            "System.Collections.ICollection",
            "System.Collections.IEnumerable",
        ]
    ),
    "System.Collections.ObjectModel.ObservableCollection`1" => class_with(
        "System.Collections.ObjectModel.ObservableCollection`1",
        "System.Collections.ObjectModel.Collection`1",
        &[
            "System.Collections.Specialized.INotifyCollectionChanged",
            "System.ComponentModel.INotifyPropertyChanged",
        ]
    ),
    "System.Collections.Specialized.INotifyCollectionChanged" => interface(
        "System.Collections.Specialized.INotifyCollectionChanged",
        &[]
    ),
    "System.ComponentModel.INotifyPropertyChanged" => interface(INOTIFY_PROPERTY_CHANGED, &[]),
    "System.ComponentModel.PropertyChangedEventArgs" => class(PROPERTY_CHANGED_EVENT_ARGS, "System.EventArgs"),
    "System.ComponentModel.PropertyChangedEventHandler" => delegate(PROPERTY_CHANGED_EVENT_HANDLER, 2),
    "System.Runtime.CompilerServices.CallerMemberNameAttribute" => class(CALLER_MEMBER_NAME, "System.Attribute"),
    "System.Windows.Threading.DispatcherObject" => class("System.Windows.Threading.DispatcherObject", OBJECT),
    "System.Windows.DependencyObject" => class(DEPENDENCY_OBJECT, "System.Windows.Threading.DispatcherObject"),
    "System.Windows.DependencyProperty" => class(DEPENDENCY_PROPERTY, OBJECT),
    "System.Windows.DependencyPropertyKey" => class(DEPENDENCY_PROPERTY_KEY, OBJECT),
    "System.Windows.PropertyMetadata" => class(PROPERTY_METADATA, OBJECT),
    "System.Windows.UIPropertyMetadata" => class(UI_PROPERTY_METADATA, PROPERTY_METADATA),
    "System.Windows.FrameworkPropertyMetadata" => class(FRAMEWORK_PROPERTY_METADATA, UI_PROPERTY_METADATA),
    "System.Windows.FrameworkPropertyMetadataOptions" => enumeration(FRAMEWORK_PROPERTY_METADATA_OPTIONS),
    "System.Windows.PropertyChangedCallback" => delegate(PROPERTY_CHANGED_CALLBACK, 2),
    "System.Windows.CoerceValueCallback" => delegate(COERCE_VALUE_CALLBACK, 2),
    "System.Windows.ValidateValueCallback" => delegate(VALIDATE_VALUE_CALLBACK, 1),
    "System.Windows.DependencyPropertyChangedEventArgs" => value("System.Windows.DependencyPropertyChangedEventArgs"),
    "System.Windows.Visibility" => enumeration("System.Windows.Visibility"),
    "System.Windows.Thickness" => value("System.Windows.Thickness"),
    "System.Windows.Media.Visual" => class("System.Windows.Media.Visual", DEPENDENCY_OBJECT),
    "System.Windows.Media.Brush" => class("System.Windows.Media.Brush", DEPENDENCY_OBJECT),
    "System.Windows.Media.Color" => value("System.Windows.Media.Color"),
    "System.Windows.UIElement" => class("System.Windows.UIElement", "System.Windows.Media.Visual"),
    "System.Windows.FrameworkElement" => class(FRAMEWORK_ELEMENT, "System.Windows.UIElement"),
    "System.Windows.Window" => class("System.Windows.Window", "System.Windows.Controls.ContentControl"),
    "System.Windows.Controls.Control" => class("System.Windows.Controls.Control", FRAMEWORK_ELEMENT),
    "System.Windows.Controls.ContentControl" => class(
        "System.Windows.Controls.ContentControl",
        "System.Windows.Controls.Control"
    ),
    "System.Windows.Controls.UserControl" => class(
        "System.Windows.Controls.UserControl",
        "System.Windows.Controls.ContentControl"
    ),
    "System.Windows.Controls.Button" => class(
        "System.Windows.Controls.Button",
        "System.Windows.Controls.ContentControl"
    ),
    "System.Windows.Controls.TextBox" => class("System.Windows.Controls.TextBox", "System.Windows.Controls.Control"),
    "System.Windows.Controls.TextBlock" => class("System.Windows.Controls.TextBlock", FRAMEWORK_ELEMENT),
    "System.Windows.Controls.Panel" => class("System.Windows.Controls.Panel", FRAMEWORK_ELEMENT),
    "System.Windows.Controls.StackPanel" => class("System.Windows.Controls.StackPanel", "System.Windows.Controls.Panel"),
    "System.Windows.Data.UpdateSourceTrigger" => enumeration("System.Windows.Data.UpdateSourceTrigger"),
};

static MEMBERS: phf::Map<&'static str, &'static [KnownMember]> = phf_map! {
    "System.Object" => OBJECT_MEMBERS,
    "System.String" => STRING_MEMBERS,
    "System.EventArgs" => EVENT_ARGS_MEMBERS,
    "System.ComponentModel.PropertyChangedEventArgs" => PROPERTY_CHANGED_EVENT_ARGS_MEMBERS,
    "System.ComponentModel.PropertyChangedEventHandler" => PROPERTY_CHANGED_EVENT_HANDLER_MEMBERS,
    "System.ComponentModel.INotifyPropertyChanged" => INOTIFY_PROPERTY_CHANGED_MEMBERS,
    "System.Windows.DependencyObject" => DEPENDENCY_OBJECT_MEMBERS,
    "System.Windows.DependencyProperty" => DEPENDENCY_PROPERTY_MEMBERS,
    "System.Windows.DependencyPropertyKey" => DEPENDENCY_PROPERTY_KEY_MEMBERS,
    "System.Windows.PropertyMetadata" => PROPERTY_METADATA_MEMBERS,
    "System.Windows.UIPropertyMetadata" => UI_PROPERTY_METADATA_MEMBERS,
    "System.Windows.FrameworkPropertyMetadata" => FRAMEWORK_PROPERTY_METADATA_MEMBERS,
    "System.Windows.UIElement" => UI_ELEMENT_MEMBERS,
    "System.Windows.FrameworkElement" => FRAMEWORK_ELEMENT_MEMBERS,
    "System.Windows.Controls.Control" => CONTROL_MEMBERS,
    "System.Windows.Controls.ContentControl" => CONTENT_CONTROL_MEMBERS,
    "System.Windows.Controls.TextBox" => TEXT_BOX_MEMBERS,
    "System.Windows.Controls.TextBlock" => TEXT_BLOCK_MEMBERS,
    "System.Windows.Window" => WINDOW_MEMBERS,
};

/// Read-only view over the framework tables plus lookup indexes.
pub struct SymbolCatalog {
    by_simple_name: HashMap<(String, usize), Vec<&'static KnownType>>,
    namespaces: HashSet<&'static str>,
}

static SHARED: Lazy<SymbolCatalog> = Lazy::new(SymbolCatalog::build);

impl SymbolCatalog {
    /// The process-wide catalog, built on first use.
    pub fn shared() -> &'static SymbolCatalog {
        &SHARED
    }

    fn build() -> Self {
        let mut by_simple_name: HashMap<(String, usize), Vec<&'static KnownType>> = HashMap::new();
        let mut namespaces = HashSet::new();

        for ty in TYPES.values() {
            by_simple_name
                .entry((
                    simple_metadata_name(ty.full_name).to_string(),
                    metadata_arity(ty.full_name),
                ))
                .or_default()
                .push(ty);

            let mut ns = metadata_namespace(ty.full_name);
            while !ns.is_empty() {
                namespaces.insert(ns);
                ns = metadata_namespace(ns);
            }
        }

        Self {
            by_simple_name,
            namespaces,
        }
    }

    /// Look up a type by metadata name.
    pub fn get_type(&self, full_name: &str) -> Option<&'static KnownType> {
        TYPES.get(full_name)
    }

    /// Types with the given simple name and arity in any namespace.
    pub fn types_named(&self, simple_name: &str, arity: usize) -> &[&'static KnownType] {
        self.by_simple_name
            .get(&(simple_name.to_string(), arity))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `name` is a namespace containing catalog types.
    pub fn is_namespace(&self, name: &str) -> bool {
        self.namespaces.contains(name)
    }

    /// Members declared directly on `owner`.
    pub fn members(&self, owner: &str) -> &'static [KnownMember] {
        MEMBERS.get(owner).copied().unwrap_or(&[])
    }

    /// Members declared directly on `owner` with the given name.
    pub fn members_named<'n>(
        &self,
        owner: &str,
        name: &'n str,
    ) -> impl Iterator<Item = &'static KnownMember> + 'n {
        self.members(owner).iter().filter(move |m| m.name == name)
    }

    /// Overloads of a qualified member.
    pub fn overloads(&self, member: QualifiedMember) -> impl Iterator<Item = &'static KnownMember> {
        self.members(member.owner)
            .iter()
            .filter(move |m| member.matches(m))
    }

    /// Whether `full_name` is `ancestor` or derives from it.
    pub fn derives_from(&self, full_name: &str, ancestor: &str) -> bool {
        let mut current = Some(full_name);
        let mut depth = 0;
        while let Some(name) = current {
            if name == ancestor {
                return true;
            }
            depth += 1;
            if depth > 64 {
                return false;
            }
            current = self.get_type(name).and_then(|t| t.base);
        }
        false
    }

    /// Metadata type names recognized as property metadata.
    pub fn is_metadata_type(&self, full_name: &str) -> bool {
        self.derives_from(full_name, PROPERTY_METADATA)
    }
}
