//! Per-SBOM aggregation for single-file runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::diff::{detect_duplicates, DuplicateGroup};
use crate::model::Component;

/// Statistics about one SBOM.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    pub total_components: usize,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_type: BTreeMap<String, usize>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_license: BTreeMap<String, usize>,
    pub without_license: usize,
    pub with_hashes: usize,
    pub without_hashes: usize,
    pub total_dependencies: usize,
    pub with_dependencies: usize,
    pub duplicate_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub duplicates: Vec<DuplicateGroup>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_language: BTreeMap<String, usize>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_found_by: BTreeMap<String, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_categories: Option<LicenseCategories>,
    pub with_cpes: usize,
    pub without_cpes: usize,
    pub with_purl: usize,
    pub without_purl: usize,
}

/// License counts grouped by rough category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseCategories {
    pub copyleft: usize,
    pub permissive: usize,
    pub public_domain: usize,
    pub unknown: usize,
}

/// Compute statistics for a component list.
#[must_use]
pub fn compute_stats(comps: &[Component]) -> Stats {
    let mut stats = Stats {
        total_components: comps.len(),
        ..Stats::default()
    };
    let mut categories = LicenseCategories::default();

    for c in comps {
        let mut ptype = extract_purl_type(&c.purl);
        if ptype == "unknown" && c.purl.is_empty() {
            ptype = extract_purl_type(&c.id);
        }
        *stats.by_type.entry(ptype.to_string()).or_insert(0) += 1;

        if !c.language.is_empty() {
            *stats.by_language.entry(c.language.clone()).or_insert(0) += 1;
        }
        if !c.found_by.is_empty() {
            *stats.by_found_by.entry(c.found_by.clone()).or_insert(0) += 1;
        }

        if c.licenses.is_empty() {
            stats.without_license += 1;
            categories.unknown += 1;
        } else {
            for lic in &c.licenses {
                *stats.by_license.entry(lic.clone()).or_insert(0) += 1;
            }
            match categorize_license(&c.licenses[0]) {
                LicenseCategory::Copyleft => categories.copyleft += 1,
                LicenseCategory::Permissive => categories.permissive += 1,
                LicenseCategory::PublicDomain => categories.public_domain += 1,
                LicenseCategory::Unknown => categories.unknown += 1,
            }
        }

        if c.hashes.is_empty() {
            stats.without_hashes += 1;
        } else {
            stats.with_hashes += 1;
        }

        if c.cpes.is_empty() {
            stats.without_cpes += 1;
        } else {
            stats.with_cpes += 1;
        }

        if c.purl.is_empty() {
            stats.without_purl += 1;
        } else {
            stats.with_purl += 1;
        }

        if !c.dependencies.is_empty() {
            stats.with_dependencies += 1;
            stats.total_dependencies += c.dependencies.len();
        }
    }

    if stats.total_components > 0 {
        stats.license_categories = Some(categories);
    }

    let dups = detect_duplicates(comps);
    stats.duplicate_count = dups.len();
    stats.duplicates = dups;

    stats
}

/// Rough license category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseCategory {
    Copyleft,
    Permissive,
    PublicDomain,
    Unknown,
}

/// Categorize a license expression by prefix matching.
#[must_use]
pub fn categorize_license(license: &str) -> LicenseCategory {
    let lic = license.to_uppercase();

    const COPYLEFT: &[&str] = &["GPL", "LGPL", "AGPL", "MPL", "EPL", "CPL", "CDDL", "EUPL"];
    if COPYLEFT.iter().any(|p| lic.contains(p)) {
        return LicenseCategory::Copyleft;
    }

    const PERMISSIVE: &[&str] = &[
        "MIT", "BSD", "APACHE", "ISC", "ZLIB", "UNLICENSE", "WTFPL", "CC0", "EXPAT", "X11",
    ];
    if PERMISSIVE.iter().any(|p| lic.contains(p)) {
        return LicenseCategory::Permissive;
    }

    if lic.contains("PUBLIC-DOMAIN") || lic.contains("PUBLIC DOMAIN") || lic.contains("PUBLICDOMAIN")
    {
        return LicenseCategory::PublicDomain;
    }

    LicenseCategory::Unknown
}

/// Extract the package type from a PURL (`pkg:type/...`).
#[must_use]
pub fn extract_purl_type(purl: &str) -> &str {
    let Some(rest) = purl.strip_prefix("pkg:") else {
        return "unknown";
    };
    match rest.find('/') {
        Some(idx) => &rest[..idx],
        None => "unknown",
    }
}
