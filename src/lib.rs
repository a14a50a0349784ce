//! **Policy-driven SBOM drift detection for CI pipelines.**
//!
//! `sbom-drift` compares two Software Bill of Materials documents — a
//! baseline and a candidate — and reports structural, identity, integrity,
//! and dependency-graph changes, evaluated against a declarative policy.
//! It exists to catch supply-chain deviations in CI: new packages, removed
//! packages, hash changes without version changes, newly reachable
//! transitive dependencies, duplicate package groups, and denied licenses.
//!
//! ## Pipeline
//!
//! 1. **Ingest** ([`parsers`]): CycloneDX JSON, SPDX JSON, and Syft JSON
//!    are detected by content and parsed into one canonical component
//!    model, preserving each component's original JSON for later display.
//! 2. **Identity** ([`model`]): every component gets a canonical identity
//!    string via a strict precedence chain (PURL → CPE → bom-ref / SPDXID
//!    → namespace/name → name), enabling cross-format matching.
//! 3. **Normalize** ([`normalize`]): trimming, case-folding, and license
//!    sentinel filtering produce a comparison-stable form.
//! 4. **Diff** ([`diff`]): added / removed / changed sets, drift
//!    classification (integrity outranks version), duplicate and collision
//!    detection, and dependency-graph reachability diffing with shortest
//!    paths and depth accounting.
//! 5. **Policy** ([`policy`]): the diff is evaluated into a typed list of
//!    violations whose severities drive the process exit status.
//!
//! ## Example
//!
//! ```no_run
//! use sbom_drift::diff::diff_components;
//! use sbom_drift::normalize::normalize_components;
//! use sbom_drift::parsers::ingest;
//! use sbom_drift::policy::{evaluate, has_errors, Policy};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let baseline = ingest(&std::fs::read("before.json")?, "before.json")?;
//!     let candidate = ingest(&std::fs::read("after.json")?, "after.json")?;
//!
//!     let before = normalize_components(baseline.components);
//!     let after = normalize_components(candidate.components);
//!
//!     let result = diff_components(&before, &after);
//!     let violations = evaluate(&Policy::default(), &result);
//!
//!     let exit_code = i32::from(!result.is_empty() || has_errors(&violations));
//!     std::process::exit(exit_code);
//! }
//! ```

// Discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // usize counters feed report fields of varying widths
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    // # Errors sections are not maintained for internal plumbing
    clippy::missing_errors_doc
)]

pub mod diff;
pub mod error;
pub mod model;
pub mod normalize;
pub mod output;
pub mod parsers;
pub mod policy;
pub mod stats;

// Re-export main types for convenience
pub use diff::{diff_components, DiffResult};
pub use error::{Result, SbomDriftError};
pub use model::{Component, SbomInfo};
pub use normalize::{normalize_component, normalize_components};
pub use output::{render, OutputFormat, RenderInput};
pub use parsers::{detect_dialect, ingest, Dialect, ParseError, ParseOptions, ParseWarning};
pub use policy::{evaluate, has_errors, Policy, Severity, Violation};
pub use stats::{compute_stats, Stats};
