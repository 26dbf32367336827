//! wpfcheck - dependency-property convention checker for WPF.
//!
//! wpfcheck parses C# sources with tree-sitter, builds a small semantic
//! model over them plus a built-in catalog of WPF framework symbols, and
//! reports registrations, backing fields and CLR accessors that break the
//! conventions WPF relies on.
//!
//! # Architecture
//!
//! - `analysis`: parsing, syntax helpers and the semantic model
//! - `catalog`: known WPF and BCL types and members
//! - `detect`: classification, registration recognition and the rules
//! - `config`: YAML config schema
//! - `report`: output formatting (pretty, JSON, SARIF)
//! - `logging`: tracing subscriber setup
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use wpfcheck::Runner;
//!
//! let files = vec![PathBuf::from("src/FooControl.cs")];
//! let result = Runner::new("src").run(&files)?;
//! for finding in &result.findings {
//!     println!("{}:{} {} {}", finding.file, finding.line(), finding.rule.id(), finding.message);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod analysis;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod detect;
pub mod logging;
pub mod report;

pub use analysis::{register_analyzers, Compilation, ParsedFile, SemanticModel, Span};
pub use catalog::SymbolCatalog;
pub use config::Config;
pub use detect::{CancellationToken, DetectionResult, Finding, Rule, Runner, Severity};

/// Initialize all subsystems.
///
/// Call this once at startup.
pub fn init() {
    register_analyzers();
}
