//! Comparison-stable normalization.
//!
//! Runs between ingest and the differ so that cosmetic differences between
//! tools (whitespace, name casing, license sentinels) never show up as
//! drift. Normalization is idempotent: applying it twice is the same as
//! applying it once.

use crate::model::{compute_identity, Component};

/// Trim whitespace and lowercase.
fn normalize_string(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Normalize a license identifier.
///
/// Trims, filters the non-assertion sentinels (`NOASSERTION`, `NONE`,
/// `UNKNOWN`, case-insensitive), and canonicalizes a bare `mit` to `MIT`.
/// Case is otherwise preserved for SPDX identifiers. Returns `None` when
/// the license should be dropped.
#[must_use]
pub fn normalize_license(s: &str) -> Option<String> {
    let s = s.trim();

    let lower = s.to_lowercase();
    if lower == "noassertion" || lower == "none" || lower == "unknown" {
        return None;
    }

    if lower == "mit" {
        return Some("MIT".to_string());
    }

    Some(s.to_string())
}

/// Apply all normalizations to a component.
///
/// The identity is recomputed only when it was previously empty; an
/// identity assigned at ingest time stays stable.
#[must_use]
pub fn normalize_component(c: Component) -> Component {
    let mut normalized = Component {
        id: c.id,
        name: normalize_string(&c.name),
        version: c.version.trim().to_string(),
        purl: c.purl.trim().to_string(),
        licenses: Vec::new(),
        cpes: c.cpes,
        hashes: c.hashes,
        dependencies: c.dependencies,
        bom_ref: c.bom_ref.trim().to_string(),
        spdx_id: c.spdx_id.trim().to_string(),
        namespace: c.namespace.trim().to_string(),
        supplier: c.supplier.trim().to_string(),
        language: c.language,
        found_by: c.found_by,
        package_type: c.package_type,
        raw_json: c.raw_json,
    };

    for lic in &c.licenses {
        if let Some(lic) = normalize_license(lic) {
            normalized.licenses.push(lic);
        }
    }

    if normalized.id.is_empty() {
        normalized.id = compute_identity(&normalized);
    }

    normalized
}

/// Normalize a slice of components, preserving order.
#[must_use]
pub fn normalize_components(comps: Vec<Component>) -> Vec<Component> {
    comps.into_iter().map(normalize_component).collect()
}
