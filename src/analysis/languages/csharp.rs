//! C# front end using tree-sitter.
//!
//! Parses `.cs` files and finds the syntax nodes the detection rules
//! care about:
//! - Invocations and object creations (registration calls, metadata, SetValue)
//! - Assignments (CLR property writes)
//! - Property declarations (notifying properties)

use std::collections::HashSet;
use std::path::Path;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};

use crate::analysis::{LanguageAnalyzer, ParsedFile};

/// Tree-sitter query for nodes that can start a rule evaluation.
const CANDIDATE_QUERY: &str = r#"
(invocation_expression) @invocation
(object_creation_expression) @creation
(assignment_expression) @assignment
(property_declaration) @property
"#;

/// C# language analyzer.
pub struct CSharpAnalyzer {
    language: Language,
}

impl CSharpAnalyzer {
    /// Create a new C# analyzer.
    pub fn new() -> Self {
        Self {
            language: tree_sitter_c_sharp::LANGUAGE.into(),
        }
    }

    /// Create a new parser for this thread.
    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    /// Collect candidate nodes in source order.
    pub fn candidate_nodes<'t>(&self, parsed: &'t ParsedFile) -> anyhow::Result<Vec<Node<'t>>> {
        let query = Query::new(&self.language, CANDIDATE_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, parsed.tree.root_node(), &parsed.source[..]);

        let mut seen = HashSet::new();
        let mut nodes = Vec::new();
        while let Some(m) = matches.next() {
            for capture in m.captures {
                if seen.insert(capture.node.id()) {
                    nodes.push(capture.node);
                }
            }
        }

        nodes.sort_by_key(|n| (n.start_byte(), n.end_byte()));
        Ok(nodes)
    }
}

impl Default for CSharpAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for CSharpAnalyzer {
    fn language_id(&self) -> &'static str {
        "csharp"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["cs"]
    }

    fn language(&self) -> &Language {
        &self.language
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse C# source: {}", path.display()))?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string_lossy().replace('\\', "/"),
        })
    }
}
