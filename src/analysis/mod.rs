//! C# source analysis: parsing, syntax navigation and symbol resolution.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ .cs files       │────▶│ CSharp       │────▶│ Compilation   │
//! └─────────────────┘     │ Analyzer     │     │ (ParsedFiles) │
//!                         └──────────────┘     └───────────────┘
//!                                                      │
//!                         ┌──────────────┐             ▼
//!                         │ Symbol       │     ┌───────────────┐
//!                         │ Catalog      │────▶│ SemanticModel │
//!                         └──────────────┘     └───────────────┘
//!                                                      │
//!                                                      ▼
//!                                              ┌───────────────┐
//!                                              │ Detection     │
//!                                              │ rules         │
//!                                              └───────────────┘
//! ```
//!
//! Syntax questions go through [`syntax`]; anything that needs a symbol
//! goes through [`SemanticModel`], which answers `None` whenever it cannot
//! be certain.

mod context;
mod facts;
mod languages;
mod semantic;
pub mod syntax;
mod traits;
pub mod types;

pub use context::{Compilation, ParseError};
pub use facts::{DeclarationKind, MemberKind, Span};
pub use languages::{csharp, get_analyzer, register_analyzers, registered_extensions, CSharpAnalyzer};
pub use semantic::{
    MemberId, MemberSymbol, ParameterInfo, SemanticModel, Symbol, TypeId, TypeSymbol,
};
pub use traits::{LanguageAnalyzer, ParsedFile};
pub use types::TypeRef;
