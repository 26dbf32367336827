//! Output formatting for wpfcheck results.
//!
//! Supports three output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration

use colored::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::detect::{DetectionResult, Finding, FindingContext, Rule, Severity, SuppressedFinding, SuppressionType};

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report structure.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    pub fail_on: Severity,
    pub passed: bool,
    pub files_scanned: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files_skipped: Vec<String>,
    #[serde(default)]
    pub cancelled: bool,
    pub findings: Vec<JsonFinding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed: Vec<JsonSuppressedFinding>,
    pub suppressed_count: usize,
    pub summary: Vec<SummaryEntry>,
}

/// JSON finding structure.
#[derive(Serialize, Deserialize)]
pub struct JsonFinding {
    pub rule: String,
    pub severity: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
    #[serde(default, skip_serializing_if = "FindingContext::is_empty")]
    pub context: FindingContext,
}

/// Finding count per rule.
#[derive(Serialize, Deserialize)]
pub struct SummaryEntry {
    pub rule: String,
    pub title: String,
    pub findings: usize,
}

/// Suppressed finding with suppression info.
#[derive(Serialize, Deserialize)]
pub struct JsonSuppressedFinding {
    pub finding: JsonFinding,
    pub suppression: JsonSuppression,
}

/// Suppression directive info.
#[derive(Serialize, Deserialize)]
pub struct JsonSuppression {
    pub rule: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    pub file: String,
    pub line: usize,
    #[serde(rename = "type")]
    pub suppression_type: SuppressionType,
}

/// Whether the run passes at `fail_on`.
pub fn passed(result: &DetectionResult, fail_on: Severity) -> bool {
    result.count_at_least(fail_on) == 0
}

/// Build the JSON report.
pub fn json_report(path: &str, config_path: Option<&str>, result: &DetectionResult, fail_on: Severity) -> JsonReport {
    let findings: Vec<JsonFinding> = result.findings.iter().map(finding_to_json).collect();

    let suppressed: Vec<JsonSuppressedFinding> = result
        .suppressed
        .iter()
        .map(|sf| JsonSuppressedFinding {
            finding: finding_to_json(&sf.finding),
            suppression: JsonSuppression {
                rule: sf.suppression.rule.clone(),
                reason: sf.suppression.reason.clone(),
                file: sf.suppression.file.clone(),
                line: sf.suppression.line,
                suppression_type: sf.suppression.suppression_type,
            },
        })
        .collect();

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        config: config_path.map(str::to_string),
        fail_on,
        passed: passed(result, fail_on),
        files_scanned: result.scanned,
        files_skipped: result.skipped.clone(),
        cancelled: result.cancelled,
        findings,
        suppressed,
        suppressed_count: result.suppressed.len(),
        summary: summary(&result.findings),
    }
}

/// Write results in JSON format.
pub fn write_json(
    path: &str,
    config_path: Option<&str>,
    result: &DetectionResult,
    fail_on: Severity,
) -> anyhow::Result<()> {
    let report = json_report(path, config_path, result, fail_on);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

fn finding_to_json(f: &Finding) -> JsonFinding {
    JsonFinding {
        rule: f.rule.id().to_string(),
        severity: f.severity.to_string(),
        file: f.file.clone(),
        line: f.span.start_line,
        column: f.span.start_col,
        end_line: f.span.end_line,
        end_column: f.span.end_col,
        message: f.message.clone(),
        arguments: f.arguments.clone(),
        context: f.context.clone(),
    }
}

fn summary(findings: &[Finding]) -> Vec<SummaryEntry> {
    Rule::ALL
        .iter()
        .map(|rule| SummaryEntry {
            rule: rule.id().to_string(),
            title: rule.title().to_string(),
            findings: findings.iter().filter(|f| f.rule == *rule).count(),
        })
        .filter(|e| e.findings > 0)
        .collect()
}

// =============================================================================
// SARIF Format
// =============================================================================

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const TOOL_NAME: &str = "wpfcheck";

#[derive(Serialize, Deserialize)]
pub struct SarifReport {
    pub version: String,
    #[serde(rename = "$schema")]
    pub schema: String,
    pub runs: Vec<SarifRun>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Serialize, Deserialize)]
pub struct SarifDriver {
    pub name: String,
    pub version: String,
    pub rules: Vec<SarifRule>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRule {
    pub id: String,
    pub name: String,
    #[serde(rename = "shortDescription")]
    pub short_description: SarifMessage,
    #[serde(rename = "defaultConfiguration")]
    pub default_config: SarifRuleConfig,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRuleConfig {
    pub level: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifResult {
    #[serde(rename = "ruleId")]
    pub rule_id: String,
    pub level: String,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Serialize, Deserialize)]
pub struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    pub artifact_location: SarifArtifact,
    pub region: SarifRegion,
}

#[derive(Serialize, Deserialize)]
pub struct SarifArtifact {
    pub uri: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRegion {
    #[serde(rename = "startLine")]
    pub start_line: usize,
    #[serde(rename = "startColumn")]
    pub start_column: usize,
    #[serde(rename = "endLine")]
    pub end_line: usize,
    #[serde(rename = "endColumn")]
    pub end_column: usize,
}

/// PascalCase rule name (`DefaultValueType`).
fn rule_name(rule: Rule) -> String {
    format!("{:?}", rule)
}

fn map_severity_to_level(severity: &Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
    }
}

/// Build the SARIF log.
pub fn sarif_report(result: &DetectionResult) -> SarifReport {
    // Rules that produced findings, in id order
    let rule_set: BTreeSet<Rule> = result.findings.iter().map(|f| f.rule).collect();

    let rules: Vec<SarifRule> = rule_set
        .iter()
        .map(|rule| SarifRule {
            id: rule.id().to_string(),
            name: rule_name(*rule),
            short_description: SarifMessage {
                text: rule.title().to_string(),
            },
            default_config: SarifRuleConfig {
                level: map_severity_to_level(&rule.default_severity()).to_string(),
            },
        })
        .collect();

    let results: Vec<SarifResult> = result
        .findings
        .iter()
        .map(|f| SarifResult {
            rule_id: f.rule.id().to_string(),
            level: map_severity_to_level(&f.severity).to_string(),
            message: SarifMessage {
                text: f.message.clone(),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifact { uri: f.file.clone() },
                    region: SarifRegion {
                        start_line: f.span.start_line.max(1),
                        start_column: f.span.start_col.max(1),
                        end_line: f.span.end_line.max(1),
                        end_column: f.span.end_col.max(1),
                    },
                },
            }],
        })
        .collect();

    SarifReport {
        version: SARIF_VERSION.to_string(),
        schema: SARIF_SCHEMA.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: TOOL_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    rules,
                },
            },
            results,
        }],
    }
}

/// Write results in SARIF format.
pub fn write_sarif(result: &DetectionResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&sarif_report(result))?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(
    path: &str,
    config_path: Option<&str>,
    result: &DetectionResult,
    fail_on: Severity,
    show_suppressed: bool,
) {
    // Header
    println!();
    print!("  ");
    print!("{}", "wpfcheck".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    // Scan info
    print!("  {}", "Scanning: ".dimmed());
    println!("{}", path);
    if let Some(config) = config_path {
        print!("  {}", "Config:   ".dimmed());
        println!("{}", config);
    }
    println!();

    // Findings
    if !result.findings.is_empty() {
        write_findings(&result.findings);
        println!();
    }

    // Suppressed findings
    if !result.suppressed.is_empty() {
        write_suppressed_summary(&result.suppressed, show_suppressed);
        println!();
    }

    if !result.skipped.is_empty() {
        println!("  {} ({}):", "Skipped".dimmed(), result.skipped.len());
        for file in &result.skipped {
            println!("    {}", file.dimmed());
        }
        println!();
    }

    // Final status line
    write_final_status(result, fail_on);
    println!();
}

fn write_findings(findings: &[Finding]) {
    println!("  {} ({}):", "Findings".bold(), findings.len());
    println!();

    for f in findings {
        write_severity_tag(&f.severity);
        print!("   ");
        print!("{:<10}", f.rule.id().dimmed());
        print!("{}", f.file.blue());
        print!("{}", format!(":{}:{}", f.span.start_line, f.span.start_col).dimmed());
        println!();

        // Message on next line, indented
        println!("            {}", f.message);
        println!();
    }
}

fn write_severity_tag(severity: &Severity) {
    match severity {
        Severity::Error => print!("    {} ", "ERROR".red()),
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
        Severity::Info => print!("    {} ", "INFO ".blue()),
    }
}

fn write_final_status(result: &DetectionResult, fail_on: Severity) {
    let errors = result.count_at_least(Severity::Error);
    let warnings = result.count_at_least(Severity::Warning) - errors;
    let infos = result.findings.len() - errors - warnings;

    print!(
        "  {}",
        format!("{} files, {} errors, {} warnings, {} info", result.scanned, errors, warnings, infos).dimmed()
    );
    if result.suppressed_count() > 0 {
        print!("  {}", format!("({} suppressed)", result.suppressed_count()).dimmed());
    }
    print!("  ");

    if result.cancelled {
        print!("{}", "CANCELLED".yellow());
    } else if passed(result, fail_on) {
        print!("{}", "PASSED".green());
    } else {
        print!("{}", "FAILED".red());
    }
    println!();
}

fn write_suppressed_summary(suppressed: &[SuppressedFinding], show_details: bool) {
    println!("  {} ({}):", "Suppressed".dimmed(), suppressed.len());

    if !show_details {
        println!("    {}", "(use --show-suppressed to see details)".dimmed());
        return;
    }

    println!();
    for sf in suppressed {
        let f = &sf.finding;
        let s = &sf.suppression;

        print!("    {:<10}", f.rule.id().dimmed());
        print!("{}", f.file.blue());
        match s.suppression_type {
            SuppressionType::File => print!("{}", ":* (file)".dimmed()),
            SuppressionType::Pragma => print!("{}", format!(":{} (pragma)", f.line()).dimmed()),
            _ => print!("{}", format!(":{}", f.line()).dimmed()),
        }
        println!();

        if !s.reason.is_empty() {
            println!("            {}", format!("reason: {:?}", s.reason).dimmed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Span;

    fn finding(rule: Rule, line: usize) -> Finding {
        let span = Span {
            start_byte: line * 10,
            end_byte: line * 10 + 4,
            start_line: line,
            start_col: 5,
            end_line: line,
            end_col: 9,
        };
        Finding::new(rule, "Controls/FooControl.cs", span, vec!["Bar".to_string(), "int".to_string()])
    }

    fn result() -> DetectionResult {
        DetectionResult {
            findings: vec![finding(Rule::DefaultValueType, 3), finding(Rule::MissingDocumentation, 7)],
            scanned: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_json_report_fields() {
        let report = json_report("src", Some("wpfcheck.yaml"), &result(), Severity::Warning);
        assert!(!report.passed);
        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.findings[0].rule, "WPF0010");
        assert_eq!(report.findings[0].column, 5);
        assert_eq!(report.summary.len(), 2);

        // Only the info finding remains below an error threshold.
        let only_info = DetectionResult {
            findings: vec![finding(Rule::MissingDocumentation, 7)],
            ..Default::default()
        };
        assert!(json_report("src", None, &only_info, Severity::Warning).passed);
        assert!(!json_report("src", None, &only_info, Severity::Info).passed);
    }

    #[test]
    fn test_sarif_levels_and_regions() {
        let report = sarif_report(&result());
        let run = &report.runs[0];
        assert_eq!(run.tool.driver.name, "wpfcheck");
        assert_eq!(run.tool.driver.rules.len(), 2);
        assert_eq!(run.results[0].level, "error");
        assert_eq!(run.results[1].level, "note");
        assert_eq!(run.results[0].locations[0].physical_location.region.start_column, 5);
        assert_eq!(
            run.results[0].locations[0].physical_location.artifact_location.uri,
            "Controls/FooControl.cs"
        );
    }
}
