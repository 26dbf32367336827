//! Convention rules.
//!
//! Every rule is listed in [`ANALYZERS`]; there is no runtime discovery.
//! The runner builds one [`NodeContext`] per candidate node, so the
//! registration behind a call is recognized once and shared by all rules.

mod accessor_type;
mod default_value;
mod documentation;
mod notify;
mod read_only;
mod set_current_value;
mod side_effects;

use tree_sitter::Node;

use crate::analysis::{ParsedFile, SemanticModel, Span};

use super::registration::{self, Registration};
use super::types::{Finding, Rule};

/// Everything a rule may look at for one node.
pub struct NodeContext<'a, 'm> {
    pub node: Node<'a>,
    pub file: &'a ParsedFile,
    pub model: &'m SemanticModel<'a>,
    /// Set when the node is a recognized registration or continuation.
    pub registration: Option<Registration<'a>>,
}

impl<'a, 'm> NodeContext<'a, 'm> {
    pub fn new(node: Node<'a>, file: &'a ParsedFile, model: &'m SemanticModel<'a>) -> Self {
        let registration = if node.kind() == "invocation_expression" {
            registration::recognize(node, model)
        } else {
            None
        };
        Self {
            node,
            file,
            model,
            registration,
        }
    }

    /// A finding located at `anchor` in this file.
    pub fn finding(&self, rule: Rule, anchor: Node<'a>, arguments: Vec<String>) -> Finding {
        Finding::new(rule, self.file.path.clone(), Span::from_node(anchor), arguments)
    }
}

/// The rule implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analyzer {
    DefaultValue,
    AccessorType,
    ReadOnly,
    SetCurrentValue,
    SideEffects,
    Documentation,
    Notify,
}

pub const ANALYZERS: &[Analyzer] = &[
    Analyzer::DefaultValue,
    Analyzer::AccessorType,
    Analyzer::ReadOnly,
    Analyzer::SetCurrentValue,
    Analyzer::SideEffects,
    Analyzer::Documentation,
    Analyzer::Notify,
];

impl Analyzer {
    pub fn name(&self) -> &'static str {
        match self {
            Analyzer::DefaultValue => "default-value",
            Analyzer::AccessorType => "accessor-type",
            Analyzer::ReadOnly => "read-only",
            Analyzer::SetCurrentValue => "set-current-value",
            Analyzer::SideEffects => "side-effects",
            Analyzer::Documentation => "documentation",
            Analyzer::Notify => "notify",
        }
    }

    /// Rules this analyzer can report.
    pub fn rules(&self) -> &'static [Rule] {
        match self {
            Analyzer::DefaultValue => &[Rule::DefaultValueType],
            Analyzer::AccessorType => &[Rule::ClrPropertyType, Rule::ClrMethodType],
            Analyzer::ReadOnly => &[Rule::ReadOnlyMissingPublicProperty, Rule::ReadOnlyWrongDerivation],
            Analyzer::SetCurrentValue => &[Rule::UseSetCurrentValue],
            Analyzer::SideEffects => &[Rule::AccessorSideEffect],
            Analyzer::Documentation => &[Rule::MissingDocumentation],
            Analyzer::Notify => &[Rule::PropertyDoesNotNotify],
        }
    }

    pub fn check(&self, cx: &NodeContext<'_, '_>, out: &mut Vec<Finding>) {
        match self {
            Analyzer::DefaultValue => default_value::check(cx, out),
            Analyzer::AccessorType => accessor_type::check(cx, out),
            Analyzer::ReadOnly => read_only::check(cx, out),
            Analyzer::SetCurrentValue => set_current_value::check(cx, out),
            Analyzer::SideEffects => side_effects::check(cx, out),
            Analyzer::Documentation => documentation::check(cx, out),
            Analyzer::Notify => notify::check(cx, out),
        }
    }
}

/// Run every analyzer over one node.
pub fn analyze_node<'a>(node: Node<'a>, file: &'a ParsedFile, model: &SemanticModel<'a>) -> Vec<Finding> {
    let cx = NodeContext::new(node, file, model);
    let mut findings = Vec::new();
    for analyzer in ANALYZERS {
        analyzer.check(&cx, &mut findings);
    }
    findings
}

/// Findings for a single in-memory source, in node order.
#[cfg(test)]
pub(crate) fn check_source(source: &str) -> Vec<Finding> {
    use crate::analysis::{csharp, Compilation};
    use crate::catalog::SymbolCatalog;

    let compilation = Compilation::from_sources([("Foo.cs", source)]).unwrap();
    let model = compilation.semantic_model(SymbolCatalog::shared());
    let file = &compilation.files()[0];
    let mut findings = Vec::new();
    for node in csharp().candidate_nodes(file).unwrap() {
        findings.extend(analyze_node(node, file, &model));
    }
    findings
}

/// Findings of one rule for a single in-memory source.
#[cfg(test)]
pub(crate) fn check_rule(source: &str, rule: Rule) -> Vec<Finding> {
    check_source(source)
        .into_iter()
        .filter(|f| f.rule == rule)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_rule_has_one_analyzer() {
        for rule in Rule::ALL {
            let owners = ANALYZERS
                .iter()
                .filter(|a| a.rules().contains(rule))
                .count();
            assert_eq!(owners, 1, "{} is reported by {} analyzers", rule, owners);
        }
    }
}
