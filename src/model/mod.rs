//! Canonical component model.
//!
//! All three SBOM dialects (CycloneDX, SPDX, Syft) are ingested into the
//! structures defined here before any comparison happens. Downstream code
//! never looks at dialect-specific shapes again.

mod component;
mod identity;

pub use component::*;
pub use identity::*;
