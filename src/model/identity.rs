//! Canonical identity assignment.
//!
//! Cross-dialect matching works by collapsing every component to a single
//! identity string with a strict precedence chain:
//!
//! 1. PURL, with the version segment and any qualifiers removed
//! 2. the first parseable CPE, reduced to `cpe:<vendor>:<product>`
//! 3. `ref:<bom-ref>`
//! 4. `ref:<SPDXID>`
//! 5. `<namespace>/<name>`
//! 6. bare `name`
//!
//! The first non-empty result wins; later identifiers are ignored entirely.
//! Keeping the identity a plain string (instead of a typed enum) is
//! deliberate: it lets a PURL written by one tool coincide with the same
//! PURL written by another, and makes hashmap keys trivial.

use super::Component;

/// Compute the canonical identity for a component.
///
/// Returns an empty string only when every identifier *and* the name are
/// empty; ingest drops such components with a warning.
#[must_use]
pub fn compute_identity(c: &Component) -> String {
    if !c.purl.is_empty() {
        return normalize_purl(&c.purl);
    }

    for cpe in &c.cpes {
        if let Some(normalized) = normalize_cpe(cpe) {
            return normalized;
        }
    }

    if !c.bom_ref.is_empty() {
        return format!("ref:{}", c.bom_ref);
    }
    if !c.spdx_id.is_empty() {
        return format!("ref:{}", c.spdx_id);
    }

    if !c.namespace.is_empty() {
        return format!("{}/{}", c.namespace, c.name);
    }

    c.name.clone()
}

/// Strip a PURL down to its package coordinates.
///
/// Removes the `#subpath` fragment, the `?qualifiers` query, and the final
/// `@version` segment, in that order.
#[must_use]
pub fn normalize_purl(purl: &str) -> String {
    let mut p = purl;
    if let Some(idx) = p.find('#') {
        p = &p[..idx];
    }
    if let Some(idx) = p.find('?') {
        p = &p[..idx];
    }
    if let Some(idx) = p.rfind('@') {
        p = &p[..idx];
    }
    p.to_string()
}

/// Extract the version segment from a PURL, percent-decoded.
#[must_use]
pub fn purl_version(purl: &str) -> String {
    let mut p = purl;
    if let Some(idx) = p.find('#') {
        p = &p[..idx];
    }
    if let Some(idx) = p.find('?') {
        p = &p[..idx];
    }
    match p.rfind('@') {
        Some(idx) => percent_decode(&p[idx + 1..]),
        None => String::new(),
    }
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = &s[i + 1..i + 3];
            if let Ok(b) = u8::from_str_radix(hex, 16) {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Reduce a CPE string to `cpe:<vendor>:<product>`.
///
/// Supports both CPE 2.3 (`cpe:2.3:part:vendor:product:...`) and CPE 2.2
/// (`cpe:/part:vendor:product:...`). Returns `None` when the string does
/// not match either shape or the vendor/product slots are empty or `*`.
#[must_use]
pub fn normalize_cpe(cpe: &str) -> Option<String> {
    if cpe.starts_with("cpe:2.3:") {
        let parts: Vec<&str> = cpe.split(':').collect();
        if parts.len() >= 5 {
            let vendor = parts[3];
            let product = parts[4];
            if !vendor.is_empty() && vendor != "*" && !product.is_empty() && product != "*" {
                return Some(format!("cpe:{vendor}:{product}"));
            }
        }
        return None;
    }

    if let Some(rest) = cpe.strip_prefix("cpe:/") {
        let parts: Vec<&str> = rest.split(':').collect();
        if parts.len() >= 3 {
            let vendor = parts[1];
            let product = parts[2];
            if !vendor.is_empty() && !product.is_empty() {
                return Some(format!("cpe:{vendor}:{product}"));
            }
        }
        return None;
    }

    None
}
