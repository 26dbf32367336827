//! Language-specific analyzer implementations.

mod csharp;

pub use csharp::CSharpAnalyzer;

use super::LanguageAnalyzer;
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};

/// Static storage for the C# analyzer.
static CSHARP_ANALYZER: OnceCell<CSharpAnalyzer> = OnceCell::new();

/// Whether analyzers have been registered.
static REGISTERED: AtomicBool = AtomicBool::new(false);

/// Register all available language analyzers.
///
/// Idempotent; calling it more than once is harmless.
pub fn register_analyzers() {
    if REGISTERED.swap(true, Ordering::SeqCst) {
        return;
    }

    CSHARP_ANALYZER.get_or_init(CSharpAnalyzer::new);
}

/// The C# analyzer.
pub fn csharp() -> &'static CSharpAnalyzer {
    CSHARP_ANALYZER.get_or_init(CSharpAnalyzer::new)
}

/// Get an analyzer for the given file extension.
///
/// Returns None if no analyzer is registered for the extension.
pub fn get_analyzer(ext: &str) -> Option<&'static dyn LanguageAnalyzer> {
    register_analyzers();

    let analyzer = csharp();
    if analyzer.handles_extension(ext) {
        Some(analyzer as &'static dyn LanguageAnalyzer)
    } else {
        None
    }
}

/// Get all registered file extensions.
pub fn registered_extensions() -> Vec<String> {
    csharp()
        .file_extensions()
        .iter()
        .map(|e| e.to_string())
        .collect()
}
