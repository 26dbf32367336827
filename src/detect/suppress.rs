//! Inline suppression of findings via comments.
//!
//! Supports suppression comments like:
//! - `// wpfcheck:ignore <rule> - <reason>`
//! - `// wpfcheck:ignore-next-line <rule> - <reason>`
//! - `// wpfcheck:ignore-file <rule> - <reason>`
//!
//! and C# pragma ranges:
//! - `#pragma warning disable WPF0041, WPF0042`
//! - `#pragma warning restore WPF0041`
//!
//! `<rule>` is a rule id such as `WPF0041`, or `*` for every rule.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Finding, Rule};
use crate::analysis::ParsedFile;

/// Line window for `ignore-file` directives below the file header.
const FILE_DIRECTIVE_LINES: usize = 10;

/// How a suppression applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuppressionType {
    /// Applies to the same line
    Line,
    /// Applies to the next line
    NextLine,
    /// Applies to the entire file
    File,
    /// A `#pragma warning disable` / `restore` range
    Pragma,
}

/// An inline suppression directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suppression {
    /// Rule to suppress (e.g., "WPF0041") or "*" for all
    pub rule: String,
    /// Human-readable reason
    pub reason: String,
    /// File containing the suppression
    pub file: String,
    /// Line number (0 for file-level)
    pub line: usize,
    /// Line of the closing `#pragma warning restore`; open to end of file
    /// when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    /// How the suppression applies
    pub suppression_type: SuppressionType,
}

/// A finding that was suppressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuppressedFinding {
    pub finding: Finding,
    pub suppression: Suppression,
}

lazy_static::lazy_static! {
    /// Patterns for matching suppression comments.
    static ref SUPPRESSION_PATTERNS: Vec<Regex> = vec![
        // Line comment: // wpfcheck:...
        Regex::new(r"//\s*wpfcheck:(ignore(?:-file|-next-line)?)\s+(\S+)\s*(?:-\s*(.*))?").unwrap(),
        // Block comment: /* wpfcheck:... */
        Regex::new(r"/\*\s*wpfcheck:(ignore(?:-file|-next-line)?)\s+(\S+)\s*(?:-\s*(.*?))?\s*\*/").unwrap(),
    ];

    /// `#pragma warning disable|restore [ids]`, with an optional trailing comment.
    static ref PRAGMA_PATTERN: Regex =
        Regex::new(r"^\s*#\s*pragma\s+warning\s+(disable|restore)\b([^/]*)(?://\s*(.*))?$").unwrap();
}

/// Parse suppression directives from file content.
pub fn parse_suppressions(file_path: &str, content: &str) -> Vec<Suppression> {
    let mut suppressions = Vec::new();
    let mut in_header = true;
    // Open pragma ranges: rule -> (start line, reason)
    let mut open: HashMap<String, (usize, String)> = HashMap::new();

    for (line_num, line) in content.lines().enumerate() {
        let line_number = line_num + 1;
        let trimmed = line.trim();

        // File-level directives are honored in the leading comment block
        if in_header && !(trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with("/*")) {
            in_header = false;
        }

        if let Some(caps) = PRAGMA_PATTERN.captures(line) {
            let directive = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let reason = caps
                .get(3)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            let rules: Vec<String> = caps
                .get(2)
                .map(|m| {
                    m.as_str()
                        .split(',')
                        .map(|id| id.trim().to_string())
                        .filter(|id| !id.is_empty())
                        .collect()
                })
                .unwrap_or_default();
            let rules = if rules.is_empty() {
                vec!["*".to_string()]
            } else {
                rules
            };

            if directive == "disable" {
                for rule in rules {
                    open.entry(rule).or_insert((line_number, reason.clone()));
                }
            } else {
                let closing: Vec<String> = if rules.iter().any(|r| r == "*") {
                    open.keys().cloned().collect()
                } else {
                    rules
                };
                for rule in closing {
                    if let Some((start, reason)) = open.remove(&rule) {
                        suppressions.push(pragma(file_path, rule, reason, start, Some(line_number)));
                    }
                }
            }
            continue;
        }

        for pattern in SUPPRESSION_PATTERNS.iter() {
            let Some(caps) = pattern.captures(line) else {
                continue;
            };
            let directive = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let rule = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let reason = caps
                .get(3)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();

            let suppression_type = match directive {
                "ignore-file" => {
                    if !in_header && line_number > FILE_DIRECTIVE_LINES {
                        continue;
                    }
                    SuppressionType::File
                }
                "ignore-next-line" => SuppressionType::NextLine,
                "ignore" => {
                    // Alone on its line it covers the next line; after code, its own.
                    let alone = caps
                        .get(0)
                        .map(|m| line[..m.start()].trim().is_empty())
                        .unwrap_or(true);
                    if alone {
                        SuppressionType::NextLine
                    } else {
                        SuppressionType::Line
                    }
                }
                _ => continue,
            };

            suppressions.push(Suppression {
                rule: rule.to_string(),
                reason,
                file: file_path.to_string(),
                line: if suppression_type == SuppressionType::File {
                    0
                } else {
                    line_number
                },
                end_line: None,
                suppression_type,
            });
            break; // Only one suppression per line
        }
    }

    let mut unclosed: Vec<_> = open.into_iter().collect();
    unclosed.sort_by_key(|(_, (start, _))| *start);
    for (rule, (start, reason)) in unclosed {
        suppressions.push(pragma(file_path, rule, reason, start, None));
    }

    suppressions
}

fn pragma(file: &str, rule: String, reason: String, start: usize, end: Option<usize>) -> Suppression {
    Suppression {
        rule,
        reason,
        file: file.to_string(),
        line: start,
        end_line: end,
        suppression_type: SuppressionType::Pragma,
    }
}

/// Check if a finding matches a suppression.
pub fn matches_suppression(finding: &Finding, suppression: &Suppression) -> bool {
    // Must be same file
    if finding.file != suppression.file {
        return false;
    }

    // Must match rule (or suppression is for all rules with "*")
    if suppression.rule != "*" && Rule::parse(&suppression.rule) != Some(finding.rule) {
        return false;
    }

    let line = finding.line();
    match suppression.suppression_type {
        SuppressionType::File => true,
        SuppressionType::Line => line == suppression.line,
        SuppressionType::NextLine => line == suppression.line + 1,
        SuppressionType::Pragma => {
            line > suppression.line && suppression.end_line.map(|end| line < end).unwrap_or(true)
        }
    }
}

/// Separate findings into active and suppressed based on suppressions.
pub fn filter_suppressed(
    findings: Vec<Finding>,
    suppressions: &[Suppression],
) -> (Vec<Finding>, Vec<SuppressedFinding>) {
    let mut active = Vec::new();
    let mut suppressed = Vec::new();

    for finding in findings {
        match suppressions.iter().find(|s| matches_suppression(&finding, s)) {
            Some(suppression) => suppressed.push(SuppressedFinding {
                finding,
                suppression: suppression.clone(),
            }),
            None => active.push(finding),
        }
    }

    (active, suppressed)
}

/// Collect suppressions from all parsed files, keyed by reported path.
pub fn collect_suppressions(files: &[ParsedFile]) -> HashMap<String, Vec<Suppression>> {
    let mut result = HashMap::new();

    for file in files {
        let suppressions = parse_suppressions(&file.path, file.source_str());
        if !suppressions.is_empty() {
            result.insert(file.path.clone(), suppressions);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Span;

    fn finding_at(rule: Rule, line: usize) -> Finding {
        let span = Span {
            start_byte: 0,
            end_byte: 1,
            start_line: line,
            start_col: 1,
            end_line: line,
            end_col: 2,
        };
        Finding::new(rule, "Foo.cs", span, vec!["BarProperty".to_string(), "1".to_string()])
    }

    #[test]
    fn test_parse_suppressions_comment_styles() {
        let content = r#"// wpfcheck:ignore-file WPF0060 - Generated docs elsewhere
namespace Demo
{
    public class Foo
    {
        void M() { this.Bar = 1; } // wpfcheck:ignore WPF0041 - Reset on load
        /* wpfcheck:ignore-next-line WPF1010 */
        public int Baz { get; set; }
    }
}
"#;
        let suppressions = parse_suppressions("Foo.cs", content);
        assert_eq!(suppressions.len(), 3);

        assert_eq!(suppressions[0].suppression_type, SuppressionType::File);
        assert_eq!(suppressions[0].rule, "WPF0060");
        assert_eq!(suppressions[0].reason, "Generated docs elsewhere");

        assert_eq!(suppressions[1].suppression_type, SuppressionType::Line);
        assert_eq!(suppressions[1].line, 6);

        assert_eq!(suppressions[2].suppression_type, SuppressionType::NextLine);
        assert_eq!(suppressions[2].line, 7);
    }

    #[test]
    fn test_ignore_alone_covers_next_line() {
        let content = "class A\n{\n    // wpfcheck:ignore WPF1010 - DTO\n    public int Bar { get; set; }\n}\n";
        let suppressions = parse_suppressions("A.cs", content);
        assert_eq!(suppressions.len(), 1);
        assert_eq!(suppressions[0].suppression_type, SuppressionType::NextLine);
        assert_eq!(suppressions[0].line, 3);
    }

    #[test]
    fn test_ignore_file_below_header_is_dropped() {
        let mut content = String::from("namespace Demo\n{\n");
        for _ in 0..12 {
            content.push_str("    // filler\n");
        }
        content.push_str("    // wpfcheck:ignore-file WPF0060\n}\n");
        assert!(parse_suppressions("A.cs", &content).is_empty());
    }

    #[test]
    fn test_pragma_ranges() {
        let content = r#"namespace Demo
{
#pragma warning disable WPF0041, WPF0042 // legacy setters
    class A { }
#pragma warning restore WPF0041
#pragma warning disable
    class B { }
}
"#;
        let suppressions = parse_suppressions("A.cs", content);
        let ranges: Vec<_> = suppressions
            .iter()
            .map(|s| (s.rule.as_str(), s.line, s.end_line))
            .collect();
        assert_eq!(
            ranges,
            vec![("WPF0041", 3, Some(5)), ("WPF0042", 3, None), ("*", 6, None)]
        );
        assert_eq!(suppressions[0].reason, "legacy setters");
        assert!(suppressions.iter().all(|s| s.suppression_type == SuppressionType::Pragma));
    }

    #[test]
    fn test_matches_suppression() {
        let finding = finding_at(Rule::UseSetCurrentValue, 5);

        let file_suppression = Suppression {
            rule: "WPF0041".to_string(),
            reason: "Generated".to_string(),
            file: "Foo.cs".to_string(),
            line: 0,
            end_line: None,
            suppression_type: SuppressionType::File,
        };
        assert!(matches_suppression(&finding, &file_suppression));

        let next_line = Suppression {
            line: 4,
            suppression_type: SuppressionType::NextLine,
            ..file_suppression.clone()
        };
        assert!(matches_suppression(&finding, &next_line));

        let lowercase = Suppression {
            rule: "wpf0041".to_string(),
            ..file_suppression.clone()
        };
        assert!(matches_suppression(&finding, &lowercase));

        let wrong_rule = Suppression {
            rule: "WPF0042".to_string(),
            ..file_suppression.clone()
        };
        assert!(!matches_suppression(&finding, &wrong_rule));

        let other_file = Suppression {
            file: "Bar.cs".to_string(),
            ..file_suppression.clone()
        };
        assert!(!matches_suppression(&finding, &other_file));

        let wildcard = Suppression {
            rule: "*".to_string(),
            ..file_suppression.clone()
        };
        assert!(matches_suppression(&finding, &wildcard));

        let closed_range = Suppression {
            line: 2,
            end_line: Some(5),
            suppression_type: SuppressionType::Pragma,
            ..file_suppression.clone()
        };
        assert!(!matches_suppression(&finding, &closed_range));
        let open_range = Suppression {
            end_line: None,
            ..closed_range
        };
        assert!(matches_suppression(&finding, &open_range));
    }

    #[test]
    fn test_filter_suppressed() {
        let findings = vec![
            finding_at(Rule::UseSetCurrentValue, 5),
            finding_at(Rule::PropertyDoesNotNotify, 9),
        ];
        let suppressions = parse_suppressions("Foo.cs", "\n\n\n// wpfcheck:ignore-next-line WPF0041 - Reset\n");
        let (active, suppressed) = filter_suppressed(findings, &suppressions);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].rule, Rule::PropertyDoesNotNotify);
        assert_eq!(suppressed.len(), 1);
        assert_eq!(suppressed[0].suppression.reason, "Reset");
    }
}
