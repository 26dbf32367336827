//! Core types for detection results.

use serde::{Deserialize, Serialize};

use super::model::{AccessorPair, BackingMember, MetadataDescriptor, RegistrationRecord};
use crate::analysis::Span;

/// Severity levels for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    fn rank(&self) -> u8 {
        match self {
            Severity::Error => 3,
            Severity::Warning => 2,
            Severity::Info => 1,
        }
    }

    /// Whether this severity is `threshold` or more severe.
    pub fn is_at_least(&self, threshold: Severity) -> bool {
        self.rank() >= threshold.rank()
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Rule identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rule {
    #[serde(rename = "WPF0010")]
    DefaultValueType,
    #[serde(rename = "WPF0012")]
    ClrPropertyType,
    #[serde(rename = "WPF0013")]
    ClrMethodType,
    #[serde(rename = "WPF0035")]
    ReadOnlyMissingPublicProperty,
    #[serde(rename = "WPF0036")]
    ReadOnlyWrongDerivation,
    #[serde(rename = "WPF0041")]
    UseSetCurrentValue,
    #[serde(rename = "WPF0042")]
    AccessorSideEffect,
    #[serde(rename = "WPF0060")]
    MissingDocumentation,
    #[serde(rename = "WPF1010")]
    PropertyDoesNotNotify,
}

impl Rule {
    pub const ALL: &'static [Rule] = &[
        Rule::DefaultValueType,
        Rule::ClrPropertyType,
        Rule::ClrMethodType,
        Rule::ReadOnlyMissingPublicProperty,
        Rule::ReadOnlyWrongDerivation,
        Rule::UseSetCurrentValue,
        Rule::AccessorSideEffect,
        Rule::MissingDocumentation,
        Rule::PropertyDoesNotNotify,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Rule::DefaultValueType => "WPF0010",
            Rule::ClrPropertyType => "WPF0012",
            Rule::ClrMethodType => "WPF0013",
            Rule::ReadOnlyMissingPublicProperty => "WPF0035",
            Rule::ReadOnlyWrongDerivation => "WPF0036",
            Rule::UseSetCurrentValue => "WPF0041",
            Rule::AccessorSideEffect => "WPF0042",
            Rule::MissingDocumentation => "WPF0060",
            Rule::PropertyDoesNotNotify => "WPF1010",
        }
    }

    /// Parse a rule id, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        Rule::ALL
            .iter()
            .copied()
            .find(|r| r.id().eq_ignore_ascii_case(s.trim()))
    }

    pub fn title(&self) -> &'static str {
        match self {
            Rule::DefaultValueType => "Default value type must match registered type",
            Rule::ClrPropertyType => "CLR property type should match registered type",
            Rule::ClrMethodType => "CLR accessor for attached property must match registered type",
            Rule::ReadOnlyMissingPublicProperty => {
                "Read-only dependency property must expose a public DependencyProperty"
            }
            Rule::ReadOnlyWrongDerivation => {
                "Public read-only dependency property must come from its key"
            }
            Rule::UseSetCurrentValue => "Set mutable dependency properties using SetCurrentValue",
            Rule::AccessorSideEffect => "Avoid side effects in CLR accessors",
            Rule::MissingDocumentation => "Backing member for a DependencyProperty is missing docs",
            Rule::PropertyDoesNotNotify => "Mutable public property should notify",
        }
    }

    /// Message template; `{0}`, `{1}` are replaced by the finding arguments.
    fn message_format(&self) -> &'static str {
        match self {
            Rule::DefaultValueType => "Default value for '{0}' must be of type {1}",
            Rule::ClrPropertyType => "Property '{0}' must be of type {1}",
            Rule::ClrMethodType => "Value type of '{0}' must match registered type {1}",
            Rule::ReadOnlyMissingPublicProperty => {
                "Read-only key '{0}' has no public member '{1}' initialized with {0}.DependencyProperty"
            }
            Rule::ReadOnlyWrongDerivation => "'{0}' must be initialized with {1}.DependencyProperty",
            Rule::UseSetCurrentValue => "Use SetCurrentValue({0}, {1})",
            Rule::AccessorSideEffect => "Avoid side effects in CLR accessor '{0}'",
            Rule::MissingDocumentation => {
                "Backing member '{0}' for dependency property '{1}' is missing docs"
            }
            Rule::PropertyDoesNotNotify => "Property '{0}' must notify when value changes",
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            Rule::DefaultValueType => Severity::Error,
            Rule::MissingDocumentation => Severity::Info,
            _ => Severity::Warning,
        }
    }

    /// Render the message with its arguments.
    pub fn render(&self, arguments: &[String]) -> String {
        let mut message = self.message_format().to_string();
        for (i, arg) in arguments.iter().enumerate() {
            message = message.replace(&format!("{{{}}}", i), arg);
        }
        message
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Structured entities behind a finding, for fix logic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindingContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backing: Option<BackingMember>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration: Option<RegistrationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessors: Option<AccessorPair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataDescriptor>,
}

impl FindingContext {
    pub fn is_empty(&self) -> bool {
        self.backing.is_none()
            && self.registration.is_none()
            && self.accessors.is_none()
            && self.metadata.is_none()
    }
}

/// A single convention violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rule: Rule,
    pub severity: Severity,
    pub file: String,
    pub span: Span,
    pub message: String,
    #[serde(default)]
    pub arguments: Vec<String>,
    #[serde(default, skip_serializing_if = "FindingContext::is_empty")]
    pub context: FindingContext,
}

impl Finding {
    /// Create a finding with the rule's default severity.
    pub fn new(rule: Rule, file: impl Into<String>, span: Span, arguments: Vec<String>) -> Self {
        Self {
            rule,
            severity: rule.default_severity(),
            file: file.into(),
            span,
            message: rule.render(&arguments),
            arguments,
            context: FindingContext::default(),
        }
    }

    pub fn with_context(mut self, context: FindingContext) -> Self {
        self.context = context;
        self
    }

    pub fn line(&self) -> usize {
        self.span.start_line
    }

    /// Identity used for deduplication: one finding per rule and location.
    pub fn key(&self) -> (Rule, &str, usize, usize) {
        (self.rule, &self.file, self.span.start_byte, self.span.end_byte)
    }
}

/// Results of running detection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionResult {
    pub findings: Vec<Finding>,
    /// Findings silenced by inline comments or pragmas.
    #[serde(default)]
    pub suppressed: Vec<super::SuppressedFinding>,
    /// Number of files analyzed.
    pub scanned: usize,
    /// Files that could not be read or parsed.
    #[serde(default)]
    pub skipped: Vec<String>,
    /// Whether the run stopped early on cancellation.
    #[serde(default)]
    pub cancelled: bool,
}

impl DetectionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort findings by file, position and rule.
    pub fn sort(&mut self) {
        self.findings.sort_by(|a, b| {
            (a.file.as_str(), a.span.start_byte, a.rule).cmp(&(b.file.as_str(), b.span.start_byte, b.rule))
        });
        self.suppressed.sort_by(|a, b| {
            (a.finding.file.as_str(), a.finding.span.start_byte, a.finding.rule).cmp(&(
                b.finding.file.as_str(),
                b.finding.span.start_byte,
                b.finding.rule,
            ))
        });
    }

    /// Number of suppressed findings.
    pub fn suppressed_count(&self) -> usize {
        self.suppressed.len()
    }

    /// Number of findings at or above `threshold`.
    pub fn count_at_least(&self, threshold: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity.is_at_least(threshold))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_ids_round_trip() {
        for rule in Rule::ALL {
            assert_eq!(Rule::parse(rule.id()), Some(*rule));
        }
        assert_eq!(Rule::parse("wpf0041"), Some(Rule::UseSetCurrentValue));
        assert_eq!(Rule::parse("WPF9999"), None);
    }

    #[test]
    fn test_render_message() {
        let message = Rule::UseSetCurrentValue.render(&["BarProperty".to_string(), "5".to_string()]);
        assert_eq!(message, "Use SetCurrentValue(BarProperty, 5)");
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Error.is_at_least(Severity::Warning));
        assert!(Severity::Warning.is_at_least(Severity::Warning));
        assert!(!Severity::Info.is_at_least(Severity::Warning));
        assert_eq!("ERROR".parse::<Severity>(), Ok(Severity::Error));
    }

    #[test]
    fn test_rule_serializes_as_id() {
        let json = serde_json::to_string(&Rule::PropertyDoesNotNotify).unwrap();
        assert_eq!(json, "\"WPF1010\"");
    }
}
