//! Detection runner that orchestrates all checks.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::analysis::{csharp, Compilation, ParsedFile, SemanticModel};
use crate::catalog::SymbolCatalog;
use crate::config::Config;

use super::rules::analyze_node;
use super::{collect_suppressions, filter_suppressed, DetectionResult, Finding};

/// Cooperative cancellation flag shared between a run and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run to stop before its next node.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Executes all rules against a set of files.
pub struct Runner {
    base_dir: PathBuf,
    config: Config,
    cancellation: CancellationToken,
}

impl Runner {
    /// Create a new detection runner with the default config.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            config: Config::default(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Set the config that enables rules and overrides severities.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the token checked before each node.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Parse `files` into one compilation and check it.
    pub fn run(&self, files: &[PathBuf]) -> anyhow::Result<DetectionResult> {
        let compilation = Compilation::load(&self.base_dir, files);
        Ok(self.run_compilation(&compilation))
    }

    /// Check an already loaded compilation.
    pub fn run_compilation(&self, compilation: &Compilation) -> DetectionResult {
        let model = compilation.semantic_model(SymbolCatalog::shared());
        let mut result = DetectionResult::new();
        result.skipped = compilation
            .skipped()
            .iter()
            .map(|e| e.path().to_string())
            .collect();

        let per_file: Vec<Vec<Finding>> = compilation
            .files()
            .par_iter()
            .filter(|file| {
                let skip = file.is_generated() && !self.config.include_generated;
                if skip {
                    debug!(path = %file.path, "skipping generated file");
                }
                !skip
            })
            .map(|file| self.analyze_file(file, &model))
            .collect();
        result.scanned = per_file.len();

        // One finding per rule and location, after config filtering.
        let mut seen = HashSet::new();
        let mut findings = Vec::new();
        for mut finding in per_file.into_iter().flatten() {
            if !self.config.is_enabled(finding.rule) {
                continue;
            }
            let key = (finding.rule, finding.file.clone(), finding.span.start_byte, finding.span.end_byte);
            if !seen.insert(key) {
                continue;
            }
            finding.severity = self.config.severity_for(finding.rule);
            findings.push(finding);
        }

        // Apply suppressions - filter findings and track suppressed ones
        let suppression_map = collect_suppressions(compilation.files());
        let all_suppressions: Vec<_> = suppression_map.values().flatten().cloned().collect();
        let (active, suppressed) = filter_suppressed(findings, &all_suppressions);
        result.findings = active;
        result.suppressed = suppressed;
        result.cancelled = self.cancellation.is_cancelled();
        result.sort();

        info!(
            files = result.scanned,
            findings = result.findings.len(),
            suppressed = result.suppressed.len(),
            cancelled = result.cancelled,
            "detection finished"
        );
        result
    }

    fn analyze_file<'a>(&self, file: &'a ParsedFile, model: &SemanticModel<'a>) -> Vec<Finding> {
        let nodes = match csharp().candidate_nodes(file) {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!(path = %file.path, error = %e, "failed to query file");
                return Vec::new();
            }
        };
        debug!(path = %file.path, candidates = nodes.len(), "analyzing file");

        let mut findings = Vec::new();
        for node in nodes {
            if self.cancellation.is_cancelled() {
                break;
            }
            if node.has_error() {
                continue;
            }
            match panic::catch_unwind(AssertUnwindSafe(|| analyze_node(node, file, model))) {
                Ok(found) => findings.extend(found),
                Err(_) => error!(
                    path = %file.path,
                    line = node.start_position().row + 1,
                    kind = node.kind(),
                    "analysis panicked; node skipped"
                ),
            }
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{Rule, Severity};
    use tempfile::TempDir;

    const CONTROL: &str = r#"
namespace Demo
{
    using System.Windows;
    using System.Windows.Controls;

    public class FooControl : Control
    {
        public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
            nameof(Bar), typeof(int), typeof(FooControl), new PropertyMetadata(1.0));

        public int Bar
        {
            get => (int)this.GetValue(BarProperty);
            set => this.SetValue(BarProperty, value);
        }

        public void Reset()
        {
            this.Bar = 0;
        }
    }
}
"#;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn rules(result: &DetectionResult) -> Vec<Rule> {
        result.findings.iter().map(|f| f.rule).collect()
    }

    #[test]
    fn test_runner_basic() {
        let temp = TempDir::new().unwrap();
        let file = write(temp.path(), "FooControl.cs", CONTROL);

        let result = Runner::new(temp.path()).run(&[file]).unwrap();

        assert_eq!(result.scanned, 1);
        assert_eq!(
            rules(&result),
            vec![Rule::MissingDocumentation, Rule::DefaultValueType, Rule::UseSetCurrentValue]
        );
        assert!(result.findings.iter().all(|f| f.file == "FooControl.cs"));
        assert!(!result.cancelled);
    }

    #[test]
    fn test_runner_with_suppression() {
        let temp = TempDir::new().unwrap();
        let source = CONTROL.replace(
            "            this.Bar = 0;",
            "            // wpfcheck:ignore-next-line WPF0041 - Reset on purpose\n            this.Bar = 0;",
        );
        let file = write(temp.path(), "FooControl.cs", &source);

        let result = Runner::new(temp.path()).run(&[file]).unwrap();

        assert!(!rules(&result).contains(&Rule::UseSetCurrentValue));
        assert_eq!(result.suppressed.len(), 1);
        assert_eq!(result.suppressed[0].finding.rule, Rule::UseSetCurrentValue);
    }

    #[test]
    fn test_runner_applies_config() {
        let temp = TempDir::new().unwrap();
        let file = write(temp.path(), "FooControl.cs", CONTROL);
        let config = Config::parse_str(
            "rules:\n  WPF0060:\n    enabled: false\n  WPF0041:\n    severity: error\n",
        )
        .unwrap();

        let result = Runner::new(temp.path()).with_config(config).run(&[file]).unwrap();

        assert_eq!(rules(&result), vec![Rule::DefaultValueType, Rule::UseSetCurrentValue]);
        assert!(result.findings.iter().all(|f| f.severity == Severity::Error));
    }

    #[test]
    fn test_generated_files_are_skipped() {
        let temp = TempDir::new().unwrap();
        let file = write(temp.path(), "FooControl.g.cs", CONTROL);

        let result = Runner::new(temp.path()).run(&[file.clone()]).unwrap();
        assert_eq!(result.scanned, 0);
        assert!(result.findings.is_empty());

        let config = Config {
            include_generated: true,
            ..Default::default()
        };
        let result = Runner::new(temp.path()).with_config(config).run(&[file]).unwrap();
        assert_eq!(result.scanned, 1);
        assert!(!result.findings.is_empty());
    }

    #[test]
    fn test_cancelled_run_reports_flag() {
        let temp = TempDir::new().unwrap();
        let file = write(temp.path(), "FooControl.cs", CONTROL);
        let token = CancellationToken::new();
        token.cancel();

        let result = Runner::new(temp.path()).with_cancellation(token).run(&[file]).unwrap();

        assert!(result.cancelled);
        assert!(result.findings.is_empty());
    }

    #[test]
    fn test_unreadable_file_is_reported_as_skipped() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("Missing.cs");

        let result = Runner::new(temp.path()).run(&[missing]).unwrap();

        assert_eq!(result.skipped, vec!["Missing.cs".to_string()]);
        assert_eq!(result.scanned, 0);
    }
}
