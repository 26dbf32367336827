//! A compilation: the parsed set of C# files analyzed together.
//!
//! All files of one run are parsed up front so the semantic model can
//! resolve symbols across them. Parsing runs in parallel; files that cannot
//! be read or parsed are recorded and left out.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use super::languages::csharp;
use super::{LanguageAnalyzer, ParsedFile, SemanticModel};
use crate::catalog::SymbolCatalog;

/// A file that could not be added to the compilation.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

impl ParseError {
    /// Path of the offending file.
    pub fn path(&self) -> &str {
        match self {
            ParseError::Read { path, .. } | ParseError::Parse { path, .. } => path,
        }
    }
}

/// Parsed sources of one analysis run.
pub struct Compilation {
    base_dir: PathBuf,
    files: Vec<ParsedFile>,
    skipped: Vec<ParseError>,
}

impl Compilation {
    /// Read and parse `paths` in parallel.
    ///
    /// Paths in findings are reported relative to `base_dir`.
    pub fn load<P: AsRef<Path>>(base_dir: P, paths: &[PathBuf]) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let analyzer = csharp();

        let outcomes: Vec<Result<ParsedFile, ParseError>> = paths
            .par_iter()
            .map(|path| {
                let display = relative_path(&base_dir, path);
                let source = fs::read(path).map_err(|source| ParseError::Read {
                    path: display.clone(),
                    source,
                })?;
                analyzer
                    .parse(Path::new(&display), &source)
                    .map_err(|e| ParseError::Parse {
                        path: display,
                        message: e.to_string(),
                    })
            })
            .collect();

        let mut files = Vec::with_capacity(outcomes.len());
        let mut skipped = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(file) => {
                    if file.has_parse_errors() {
                        tracing::debug!(path = %file.path, "file has syntax errors");
                    }
                    files.push(file);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "skipping file");
                    skipped.push(err);
                }
            }
        }

        tracing::debug!(
            parsed = files.len(),
            skipped = skipped.len(),
            "compilation loaded"
        );
        Self {
            base_dir,
            files,
            skipped,
        }
    }

    /// Build a compilation from in-memory sources.
    pub fn from_sources<I, P, S>(sources: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (P, S)>,
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let analyzer = csharp();
        let files = sources
            .into_iter()
            .map(|(path, source)| analyzer.parse(path.as_ref(), source.as_ref().as_bytes()))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self {
            base_dir: PathBuf::from("."),
            files,
            skipped: Vec::new(),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Successfully parsed files, in input order.
    pub fn files(&self) -> &[ParsedFile] {
        &self.files
    }

    /// Files that were left out, with the reason.
    pub fn skipped(&self) -> &[ParseError] {
        &self.skipped
    }

    /// Look up a parsed file by its reported path.
    pub fn file(&self, path: &str) -> Option<&ParsedFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Semantic model over every file of the compilation.
    pub fn semantic_model<'a>(&'a self, catalog: &'a SymbolCatalog) -> SemanticModel<'a> {
        SemanticModel::new(&self.files, catalog)
    }
}

/// `path` relative to `base`, with forward slashes.
fn relative_path(base: &Path, path: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_reports_relative_paths() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("Controls");
        fs::create_dir_all(&dir).unwrap();
        let file = dir.join("FooControl.cs");
        fs::write(&file, "public class FooControl { }").unwrap();

        let compilation = Compilation::load(temp.path(), &[file]);
        assert_eq!(compilation.files().len(), 1);
        assert_eq!(compilation.files()[0].path, "Controls/FooControl.cs");
        assert!(compilation.file("Controls/FooControl.cs").is_some());
    }

    #[test]
    fn test_unreadable_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("Missing.cs");

        let compilation = Compilation::load(temp.path(), &[missing]);
        assert!(compilation.files().is_empty());
        assert_eq!(compilation.skipped().len(), 1);
        assert_eq!(compilation.skipped()[0].path(), "Missing.cs");
        assert!(matches!(compilation.skipped()[0], ParseError::Read { .. }));
    }

    #[test]
    fn test_from_sources() {
        let compilation =
            Compilation::from_sources([("A.cs", "class A { }"), ("B.cs", "class B : A { }")])
                .unwrap();
        assert_eq!(compilation.files().len(), 2);
        let model = compilation.semantic_model(SymbolCatalog::shared());
        assert_eq!(model.types().len(), 2);
    }
}
