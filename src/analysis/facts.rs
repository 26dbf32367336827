//! Plain facts about declarations, detached from the syntax tree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Kind of type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Class,
    Struct,
    Interface,
    Enum,
    Record,
    Delegate,
}

impl DeclarationKind {
    /// Map a tree-sitter node kind to a declaration kind.
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "class_declaration" => Some(DeclarationKind::Class),
            "struct_declaration" | "record_struct_declaration" => Some(DeclarationKind::Struct),
            "interface_declaration" => Some(DeclarationKind::Interface),
            "enum_declaration" => Some(DeclarationKind::Enum),
            "record_declaration" => Some(DeclarationKind::Record),
            "delegate_declaration" => Some(DeclarationKind::Delegate),
            _ => None,
        }
    }

    /// Convert to a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Class => "class",
            DeclarationKind::Struct => "struct",
            DeclarationKind::Interface => "interface",
            DeclarationKind::Enum => "enum",
            DeclarationKind::Record => "record",
            DeclarationKind::Delegate => "delegate",
        }
    }

    /// Value types box when converted to `object`.
    pub fn is_value_type(&self) -> bool {
        matches!(self, DeclarationKind::Struct | DeclarationKind::Enum)
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of member declared inside a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Field,
    Property,
    Method,
    Constructor,
    Event,
    EnumMember,
}

impl MemberKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberKind::Field => "field",
            MemberKind::Property => "property",
            MemberKind::Method => "method",
            MemberKind::Constructor => "constructor",
            MemberKind::Event => "event",
            MemberKind::EnumMember => "enum member",
        }
    }

    /// Storage members can hold a registration result.
    pub fn is_storage(&self) -> bool {
        matches!(self, MemberKind::Field | MemberKind::Property)
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_display() {
        let span = Span {
            start_byte: 20,
            end_byte: 30,
            start_line: 3,
            start_col: 5,
            end_line: 3,
            end_col: 15,
        };
        assert_eq!(span.to_string(), "3:5");
    }

    #[test]
    fn test_declaration_kind_from_node_kind() {
        assert_eq!(
            DeclarationKind::from_node_kind("class_declaration"),
            Some(DeclarationKind::Class)
        );
        assert_eq!(DeclarationKind::from_node_kind("method_declaration"), None);
        assert!(DeclarationKind::Struct.is_value_type());
        assert!(!DeclarationKind::Record.is_value_type());
    }
}
