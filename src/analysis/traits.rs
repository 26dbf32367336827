//! Core traits for source analysis.

use std::path::Path;

use tree_sitter::Node;

/// File name suffixes produced by code generators.
const GENERATED_SUFFIXES: &[&str] = &[".g.cs", ".g.i.cs", ".designer.cs", ".generated.cs"];

/// Holds a parsed tree-sitter tree and associated metadata.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source code (kept for node text extraction).
    pub source: Vec<u8>,
    /// The file path as reported in findings.
    pub path: String,
}

impl ParsedFile {
    /// Get the source code as a string slice.
    pub fn source_str(&self) -> &str {
        std::str::from_utf8(&self.source).unwrap_or("")
    }

    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// Whether the tree contains ERROR or MISSING nodes.
    pub fn has_parse_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Whether the file was produced by a code generator.
    ///
    /// Matches the conventional generated-file suffixes and an
    /// `<auto-generated` marker in the leading comments.
    pub fn is_generated(&self) -> bool {
        let lower = self.path.to_lowercase();
        if GENERATED_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
            return true;
        }

        self.source_str()
            .lines()
            .map(str::trim)
            .take_while(|l| l.is_empty() || l.starts_with("//") || l.starts_with("/*") || l.starts_with('*'))
            .any(|l| l.contains("<auto-generated"))
    }
}

/// Language-specific front end.
///
/// # Thread Safety
///
/// `tree_sitter::Parser` is not Sync, so implementations create a parser
/// per call.
pub trait LanguageAnalyzer: Send + Sync {
    /// Returns the language identifier (e.g., "csharp").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this analyzer handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// The tree-sitter grammar.
    fn language(&self) -> &tree_sitter::Language;

    /// Parse a source file into a tree-sitter tree.
    ///
    /// Partial parse errors are still returned as a valid tree with ERROR nodes.
    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile>;

    /// Check if this analyzer handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}
