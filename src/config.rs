//! Configuration schema for wpfcheck.
//!
//! A config file selects which rules run, at what severity, and which
//! files are analyzed. Every key is optional.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::detect::{Rule, Severity};

/// File names searched for in the working directory, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["wpfcheck.yaml", ".wpfcheck.yaml"];

/// Errors loading or validating a config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unknown rule id '{0}' in config")]
    UnknownRule(String),

    #[error("invalid excluded path pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Top-level config definition.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    /// Glob patterns for paths to exclude from analysis (e.g., "**/obj/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Whether to analyze generated files (default: false)
    #[serde(default)]
    pub include_generated: bool,
    /// Lowest severity that fails the run (default: warning)
    #[serde(default)]
    pub fail_on: Option<Severity>,
    /// Per-rule settings keyed by rule id
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfig>,
}

/// Settings for one rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub severity: Option<Severity>,
}

fn default_enabled() -> bool {
    true
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::parse_str(&content).map_err(|source| ConfigError::Yaml { path: display, source })
    }

    /// Parse a config from YAML text.
    pub fn parse_str(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file is a default config.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Find a config file in `dir`.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.as_ref().join(name))
            .find(|p| p.is_file())
    }

    /// Threshold for a failing exit code (defaults to warning).
    pub fn fail_threshold(&self) -> Severity {
        self.fail_on.unwrap_or(Severity::Warning)
    }

    fn rule_config(&self, rule: Rule) -> Option<&RuleConfig> {
        self.rules
            .iter()
            .find(|(id, _)| Rule::parse(id) == Some(rule))
            .map(|(_, c)| c)
    }

    /// Returns whether a rule runs (defaults to true).
    pub fn is_enabled(&self, rule: Rule) -> bool {
        self.rule_config(rule).map(|c| c.enabled).unwrap_or(true)
    }

    /// Configured severity, or the rule's default.
    pub fn severity_for(&self, rule: Rule) -> Severity {
        self.rule_config(rule)
            .and_then(|c| c.severity)
            .unwrap_or_else(|| rule.default_severity())
    }

    /// Compile the excluded path patterns.
    pub fn excluded_matcher(&self) -> Result<GlobSet, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern).map_err(|source| ConfigError::InvalidGlob {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|source| ConfigError::InvalidGlob {
            pattern: self.excluded_paths.join(", "),
            source,
        })
    }

    /// Check if a path should be excluded based on excluded_paths patterns.
    /// Uses globset for matching, which supports `**` for recursive directory matching.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        match self.excluded_matcher() {
            Ok(set) => set.is_match(path),
            Err(_) => false,
        }
    }
}

/// Reject unknown rule ids and malformed globs.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if let Some(id) = config.rules.keys().find(|id| Rule::parse(id).is_none()) {
        return Err(ConfigError::UnknownRule(id.clone()));
    }
    config.excluded_matcher()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
version: "1"
excluded_paths:
  - "**/obj/**"
include_generated: true
fail_on: error
rules:
  WPF0060:
    enabled: false
  wpf0041:
    severity: info
"#;
        let config = Config::parse_str(yaml).unwrap();
        assert!(config.include_generated);
        assert_eq!(config.fail_threshold(), Severity::Error);
        assert!(!config.is_enabled(Rule::MissingDocumentation));
        assert!(config.is_enabled(Rule::UseSetCurrentValue));
        assert_eq!(config.severity_for(Rule::UseSetCurrentValue), Severity::Info);
        assert_eq!(config.severity_for(Rule::DefaultValueType), Severity::Error);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse_str("").unwrap();
        assert!(!config.include_generated);
        assert_eq!(config.fail_threshold(), Severity::Warning);
        assert!(Rule::ALL.iter().all(|r| config.is_enabled(*r)));
    }

    #[test]
    fn test_validate_rejects_unknown_rule() {
        let config = Config::parse_str("rules:\n  WPF9999:\n    enabled: false\n").unwrap();
        assert!(matches!(validate(&config), Err(ConfigError::UnknownRule(id)) if id == "WPF9999"));
    }

    #[test]
    fn test_validate_rejects_bad_glob() {
        let config = Config {
            excluded_paths: vec!["src/[".to_string()],
            ..Default::default()
        };
        assert!(matches!(validate(&config), Err(ConfigError::InvalidGlob { .. })));
    }

    #[test]
    fn test_is_path_excluded() {
        let config = Config {
            excluded_paths: vec!["**/obj/**".to_string(), "**/*.Designer.cs".to_string()],
            ..Default::default()
        };
        assert!(config.is_path_excluded(Path::new("App/obj/Debug/App.g.cs")));
        assert!(config.is_path_excluded(Path::new("App/Views/Main.Designer.cs")));
        assert!(!config.is_path_excluded(Path::new("App/Views/Main.xaml.cs")));
    }

    #[test]
    fn test_discover() {
        let temp = TempDir::new().unwrap();
        assert!(Config::discover(temp.path()).is_none());
        fs::write(temp.path().join(".wpfcheck.yaml"), "version: \"1\"\n").unwrap();
        assert_eq!(
            Config::discover(temp.path()),
            Some(temp.path().join(".wpfcheck.yaml"))
        );
        fs::write(temp.path().join("wpfcheck.yaml"), "version: \"1\"\n").unwrap();
        assert_eq!(
            Config::discover(temp.path()),
            Some(temp.path().join("wpfcheck.yaml"))
        );
    }

    #[test]
    fn test_parse_file_error_names_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("wpfcheck.yaml");
        fs::write(&path, "rules: [unclosed").unwrap();
        let err = Config::parse_file(&path).unwrap_err();
        assert!(err.to_string().contains("wpfcheck.yaml"));
    }
}
