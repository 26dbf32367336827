//! Detection of dependency-property convention violations.
//!
//! Candidate nodes are classified, the registration behind them is
//! recognized (backing member, metadata, CLR accessors), and each rule in
//! [`rules::ANALYZERS`] validates the result.

mod accessors;
mod backing;
mod classify;
mod metadata;
mod model;
mod registration;
pub mod rules;
mod runner;
mod suppress;
mod types;

pub use classify::{classify, syntactic_role, ClassifiedCall, Classification, Role};
pub use model::{
    AccessorPair, AccessorSide, ArgumentRef, BackingMember, Locality, MemberRef, MetadataDescriptor,
    Mutability, ReadOnlyPairing, RegistrationKind, RegistrationRecord, StorageKind, ValueAccess,
};
pub use registration::{recognize, Registration};
pub use runner::{CancellationToken, Runner};
pub use suppress::{
    collect_suppressions, filter_suppressed, matches_suppression, parse_suppressions, SuppressedFinding,
    Suppression, SuppressionType,
};
pub use types::{DetectionResult, Finding, FindingContext, Rule, Severity};
