//! Type references and the built-in conversion tables.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const OBJECT: &str = "System.Object";
pub const STRING: &str = "System.String";
pub const VOID: &str = "System.Void";
pub const NULLABLE: &str = "System.Nullable`1";
pub const VALUE_TYPE: &str = "System.ValueType";
pub const ENUM: &str = "System.Enum";
pub const ARRAY: &str = "System.Array";

/// C# keyword aliases for built-in types.
const KEYWORDS: &[(&str, &str)] = &[
    ("object", OBJECT),
    ("string", STRING),
    ("bool", "System.Boolean"),
    ("char", "System.Char"),
    ("sbyte", "System.SByte"),
    ("byte", "System.Byte"),
    ("short", "System.Int16"),
    ("ushort", "System.UInt16"),
    ("int", "System.Int32"),
    ("uint", "System.UInt32"),
    ("long", "System.Int64"),
    ("ulong", "System.UInt64"),
    ("float", "System.Single"),
    ("double", "System.Double"),
    ("decimal", "System.Decimal"),
    ("nint", "System.IntPtr"),
    ("nuint", "System.UIntPtr"),
    ("void", VOID),
    ("dynamic", OBJECT),
];

/// Implicit numeric conversions: (from, to).
const IMPLICIT_NUMERIC: &[(&str, &[&str])] = &[
    ("System.SByte", &["System.Int16", "System.Int32", "System.Int64", "System.Single", "System.Double", "System.Decimal", "System.IntPtr"]),
    ("System.Byte", &["System.Int16", "System.UInt16", "System.Int32", "System.UInt32", "System.Int64", "System.UInt64", "System.Single", "System.Double", "System.Decimal", "System.IntPtr", "System.UIntPtr"]),
    ("System.Int16", &["System.Int32", "System.Int64", "System.Single", "System.Double", "System.Decimal", "System.IntPtr"]),
    ("System.UInt16", &["System.Int32", "System.UInt32", "System.Int64", "System.UInt64", "System.Single", "System.Double", "System.Decimal", "System.IntPtr", "System.UIntPtr"]),
    ("System.Int32", &["System.Int64", "System.Single", "System.Double", "System.Decimal", "System.IntPtr"]),
    ("System.UInt32", &["System.Int64", "System.UInt64", "System.Single", "System.Double", "System.Decimal", "System.UIntPtr"]),
    ("System.Int64", &["System.Single", "System.Double", "System.Decimal"]),
    ("System.UInt64", &["System.Single", "System.Double", "System.Decimal"]),
    ("System.Char", &["System.UInt16", "System.Int32", "System.UInt32", "System.Int64", "System.UInt64", "System.Single", "System.Double", "System.Decimal", "System.IntPtr", "System.UIntPtr"]),
    ("System.Single", &["System.Double"]),
];

/// Map a C# keyword (`int`) to its metadata name (`System.Int32`).
pub fn keyword_type(keyword: &str) -> Option<&'static str> {
    KEYWORDS
        .iter()
        .find(|(k, _)| *k == keyword)
        .map(|(_, full)| *full)
}

/// Map a metadata name back to its keyword, if it has one.
pub fn type_keyword(full_name: &str) -> Option<&'static str> {
    KEYWORDS
        .iter()
        .filter(|(k, _)| *k != "dynamic")
        .find(|(_, full)| *full == full_name)
        .map(|(k, _)| *k)
}

/// Whether `from` converts implicitly to `to` by a numeric conversion.
pub fn implicit_numeric(from: &str, to: &str) -> bool {
    IMPLICIT_NUMERIC
        .iter()
        .find(|(f, _)| *f == from)
        .map(|(_, targets)| targets.contains(&to))
        .unwrap_or(false)
}

/// A resolved reference to a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    /// A named type; generic definitions carry a `` `N`` arity suffix.
    Named { name: String, args: Vec<TypeRef> },
    /// `T?` for a value type `T`.
    Nullable { inner: Box<TypeRef> },
    /// `T[]`.
    Array { element: Box<TypeRef> },
    /// A type parameter in scope (`T`).
    TypeParameter { name: String },
    /// The type of the `null` literal.
    Null,
}

impl TypeRef {
    /// A non-generic named type.
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A constructed generic type; `Nullable<T>` is normalized to `T?`.
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        let name = name.into();
        if name == NULLABLE && args.len() == 1 {
            if let Some(inner) = args.into_iter().next() {
                return TypeRef::nullable(inner);
            }
            return TypeRef::named(NULLABLE);
        }
        TypeRef::Named { name, args }
    }

    /// `T?`; nested nullables collapse.
    pub fn nullable(inner: TypeRef) -> Self {
        match inner {
            TypeRef::Nullable { .. } => inner,
            other => TypeRef::Nullable {
                inner: Box::new(other),
            },
        }
    }

    /// The metadata name for named types.
    pub fn full_name(&self) -> Option<&str> {
        match self {
            TypeRef::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Whether this is the named type `full_name`.
    pub fn is(&self, full_name: &str) -> bool {
        self.full_name() == Some(full_name)
    }

    pub fn is_object(&self) -> bool {
        self.is(OBJECT)
    }

    /// Whether the reference mentions an unbound type parameter anywhere.
    pub fn has_type_parameters(&self) -> bool {
        match self {
            TypeRef::TypeParameter { .. } => true,
            TypeRef::Named { args, .. } => args.iter().any(TypeRef::has_type_parameters),
            TypeRef::Nullable { inner } => inner.has_type_parameters(),
            TypeRef::Array { element } => element.has_type_parameters(),
            TypeRef::Null => false,
        }
    }

    /// Simple name without namespace or arity (`ObservableCollection`).
    pub fn simple_name(&self) -> String {
        match self {
            TypeRef::Named { name, .. } => simple_metadata_name(name).to_string(),
            other => other.to_string(),
        }
    }
}

/// `System.Collections.Generic.List`1` → `List`.
pub fn simple_metadata_name(full_name: &str) -> &str {
    let last = full_name.rsplit('.').next().unwrap_or(full_name);
    last.split('`').next().unwrap_or(last)
}

/// `System.Collections.Generic.List`1` → `System.Collections.Generic`.
pub fn metadata_namespace(full_name: &str) -> &str {
    match full_name.rfind('.') {
        Some(idx) => &full_name[..idx],
        None => "",
    }
}

/// Arity encoded in a metadata name.
pub fn metadata_arity(full_name: &str) -> usize {
    full_name
        .rsplit('`')
        .next()
        .filter(|_| full_name.contains('`'))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named { name, args } => {
                if let Some(kw) = type_keyword(name) {
                    return write!(f, "{}", kw);
                }
                write!(f, "{}", simple_metadata_name(name))?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            TypeRef::Nullable { inner } => write!(f, "{}?", inner),
            TypeRef::Array { element } => write!(f, "{}[]", element),
            TypeRef::TypeParameter { name } => write!(f, "{}", name),
            TypeRef::Null => write!(f, "null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_round_trip() {
        assert_eq!(keyword_type("int"), Some("System.Int32"));
        assert_eq!(type_keyword("System.Int32"), Some("int"));
        assert_eq!(type_keyword(OBJECT), Some("object"));
        assert_eq!(keyword_type("Int32"), None);
    }

    #[test]
    fn test_nullable_normalization() {
        let a = TypeRef::generic(NULLABLE, vec![TypeRef::named("System.Int32")]);
        let b = TypeRef::nullable(TypeRef::named("System.Int32"));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "int?");
        assert_eq!(TypeRef::nullable(b.clone()), b);
    }

    #[test]
    fn test_display_generic() {
        let ty = TypeRef::generic(
            "System.Collections.ObjectModel.ObservableCollection`1",
            vec![TypeRef::named("System.Int32")],
        );
        assert_eq!(ty.to_string(), "ObservableCollection<int>");
        assert_eq!(ty.simple_name(), "ObservableCollection");
    }

    #[test]
    fn test_implicit_numeric() {
        assert!(implicit_numeric("System.Int32", "System.Double"));
        assert!(!implicit_numeric("System.Double", "System.Int32"));
        assert!(!implicit_numeric("System.Int32", "System.Int32"));
    }

    #[test]
    fn test_metadata_name_parts() {
        let name = "System.Collections.Generic.List`1";
        assert_eq!(simple_metadata_name(name), "List");
        assert_eq!(metadata_namespace(name), "System.Collections.Generic");
        assert_eq!(metadata_arity(name), 1);
        assert_eq!(metadata_arity("System.Int32"), 0);
    }
}
