//! Human-readable text rendering.

use std::fmt::Write as _;

use super::RenderInput;
use crate::diff::DriftType;
use crate::parsers::ParseWarning;
use crate::policy::{Severity, Violation};
use crate::stats::Stats;

/// Render the diff, violations, and warnings as plain text.
#[must_use]
pub fn render_text(input: &RenderInput<'_>) -> String {
    let mut out = String::new();
    let diff = input.diff;

    if diff.is_empty() && diff.duplicates.is_none() && diff.dependencies.is_none() {
        out.push_str("No differences found\n");
    } else {
        if let Some(summary) = &diff.drift_summary {
            out.push_str("\nDrift summary:\n");
            if summary.version_drift > 0 {
                let _ = writeln!(out, "  version drift:   {} components", summary.version_drift);
            }
            if summary.integrity_drift > 0 {
                let _ = writeln!(
                    out,
                    "  integrity drift: {} components (hash changed without version change!)",
                    summary.integrity_drift
                );
            }
            if summary.metadata_drift > 0 {
                let _ = writeln!(out, "  metadata drift:  {} components", summary.metadata_drift);
            }
        }

        if !diff.added.is_empty() {
            let _ = writeln!(out, "\n+ Added ({}):", diff.added.len());
            for c in &diff.added {
                let _ = writeln!(out, "  + {}", c.display_name());
            }
        }

        if !diff.removed.is_empty() {
            let _ = writeln!(out, "\n- Removed ({}):", diff.removed.len());
            for c in &diff.removed {
                let _ = writeln!(out, "  - {}", c.display_name());
            }
        }

        if !diff.changed.is_empty() {
            let _ = writeln!(out, "\n~ Changed ({}):", diff.changed.len());
            for c in &diff.changed {
                let marker = match c.drift.drift_type {
                    DriftType::Integrity => " [INTEGRITY]",
                    DriftType::Metadata => " [metadata]",
                    DriftType::Version | DriftType::None => "",
                };
                let _ = writeln!(out, "  ~ {}{}", c.name, marker);
                for change in &c.changes {
                    let _ = writeln!(out, "      {change}");
                }
            }
        }

        if let Some(dups) = &diff.duplicates {
            if !dups.before.is_empty() {
                let _ = writeln!(out, "\n! Duplicates in first SBOM ({}):", dups.before.len());
                for d in &dups.before {
                    let _ = writeln!(out, "  ! {}: {:?}", d.name, d.versions);
                }
            }
            if !dups.after.is_empty() {
                let _ = writeln!(out, "\n! Duplicates in second SBOM ({}):", dups.after.len());
                for d in &dups.after {
                    let _ = writeln!(out, "  ! {}: {:?}", d.name, d.versions);
                }
            }
            if let Some(vd) = &dups.version_diff {
                if !vd.new_duplicates.is_empty() {
                    let _ = writeln!(out, "\n++ New duplicate groups ({}):", vd.new_duplicates.len());
                    for d in &vd.new_duplicates {
                        let _ = writeln!(out, "  ++ {}: {:?}", d.name, d.versions);
                    }
                }
                if !vd.resolved_duplicates.is_empty() {
                    let _ = writeln!(
                        out,
                        "\n-- Resolved duplicate groups ({}):",
                        vd.resolved_duplicates.len()
                    );
                    for d in &vd.resolved_duplicates {
                        let _ = writeln!(out, "  -- {}: {:?}", d.name, d.versions);
                    }
                }
                if !vd.versions_added.is_empty() {
                    out.push_str("\n+v Versions added to duplicates:\n");
                    for (id, versions) in &vd.versions_added {
                        let _ = writeln!(out, "  {id}: +{versions:?}");
                    }
                }
                if !vd.versions_removed.is_empty() {
                    out.push_str("\n-v Versions removed from duplicates:\n");
                    for (id, versions) in &vd.versions_removed {
                        let _ = writeln!(out, "  {id}: -{versions:?}");
                    }
                }
            }
            if !dups.collisions.is_empty() {
                let _ = writeln!(out, "\n! Identity collisions ({}):", dups.collisions.len());
                for c in &dups.collisions {
                    let _ = writeln!(out, "  [{}] {}", c.reason.as_str(), c.id);
                    for comp in &c.components {
                        let _ = writeln!(out, "    - {}", comp.display_name());
                    }
                }
            }
        }

        if let Some(deps) = &diff.dependencies {
            if !deps.added_deps.is_empty() {
                out.push_str("\n>> Added dependencies:\n");
                for (comp, targets) in &deps.added_deps {
                    let _ = writeln!(out, "  {comp}: {targets:?}");
                }
            }
            if !deps.removed_deps.is_empty() {
                out.push_str("\n<< Removed dependencies:\n");
                for (comp, targets) in &deps.removed_deps {
                    let _ = writeln!(out, "  {comp}: {targets:?}");
                }
            }
            if !deps.transitive_new.is_empty() {
                let _ = writeln!(
                    out,
                    "\n>> New transitive dependencies ({}):",
                    deps.transitive_new.len()
                );
                for td in &deps.transitive_new {
                    let _ = writeln!(
                        out,
                        "  {} (depth {}) via {}",
                        td.target,
                        td.depth,
                        td.via.join(" -> ")
                    );
                }
            }
            if !deps.transitive_lost.is_empty() {
                let _ = writeln!(
                    out,
                    "\n<< Lost transitive dependencies ({}):",
                    deps.transitive_lost.len()
                );
                for td in &deps.transitive_lost {
                    let _ = writeln!(out, "  {} (depth {})", td.target, td.depth);
                }
            }
            if let Some(summary) = &deps.depth_summary {
                out.push_str("\nDepth summary for new transitive dependencies:\n");
                let _ = writeln!(out, "  depth 1:  {}", summary.depth_1);
                let _ = writeln!(out, "  depth 2:  {}", summary.depth_2);
                let _ = writeln!(out, "  depth 3+: {}", summary.depth_3_plus);
            }
        }
    }

    out.push_str(&render_violations(input.violations));
    out.push_str(&render_warnings(input.warnings));
    out
}

fn render_violations(violations: &[Violation]) -> String {
    if violations.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    let _ = writeln!(out, "\nPolicy violations ({}):", violations.len());
    for v in violations {
        let label = match v.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        let _ = writeln!(out, "  {} [{}] {}", label, v.rule, v.message);
    }
    out
}

fn render_warnings(warnings: &[ParseWarning]) -> String {
    if warnings.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    let _ = writeln!(out, "\nParse warnings ({}):", warnings.len());
    for w in warnings {
        match &w.field {
            Some(field) => {
                let _ = writeln!(out, "  {} ({}): {}", w.file, field, w.message);
            }
            None => {
                let _ = writeln!(out, "  {}: {}", w.file, w.message);
            }
        }
    }
    out
}

/// Render single-SBOM statistics as plain text.
#[must_use]
pub fn render_stats_text(stats: &Stats, warnings: &[ParseWarning]) -> String {
    let mut out = String::new();

    out.push_str("SBOM statistics\n");
    out.push_str("===============\n\n");
    let _ = writeln!(out, "Total components: {}", stats.total_components);

    if !stats.by_type.is_empty() {
        out.push_str("\nBy package type:\n");
        for (ptype, count) in &stats.by_type {
            let _ = writeln!(out, "  {ptype:<12} {count}");
        }
    }

    out.push_str("\nLicenses:\n");
    let _ = writeln!(
        out,
        "  with license:    {}",
        stats.total_components - stats.without_license
    );
    let _ = writeln!(out, "  without license: {}", stats.without_license);
    if let Some(categories) = &stats.license_categories {
        let _ = writeln!(out, "  permissive:      {}", categories.permissive);
        let _ = writeln!(out, "  copyleft:        {}", categories.copyleft);
        let _ = writeln!(out, "  public domain:   {}", categories.public_domain);
        let _ = writeln!(out, "  unknown:         {}", categories.unknown);
    }

    out.push_str("\nIntegrity:\n");
    let _ = writeln!(out, "  with hashes:    {}", stats.with_hashes);
    let _ = writeln!(out, "  without hashes: {}", stats.without_hashes);

    out.push_str("\nIdentifiers:\n");
    let _ = writeln!(out, "  with PURL: {}   with CPEs: {}", stats.with_purl, stats.with_cpes);

    out.push_str("\nDependencies:\n");
    let _ = writeln!(out, "  components with deps: {}", stats.with_dependencies);
    let _ = writeln!(out, "  total dep relations:  {}", stats.total_dependencies);

    if stats.duplicate_count > 0 {
        let _ = writeln!(out, "\nDuplicates found: {}", stats.duplicate_count);
        for d in &stats.duplicates {
            let _ = writeln!(out, "  {}: {:?}", d.name, d.versions);
        }
    }

    out.push_str(&render_warnings(warnings));
    out
}
