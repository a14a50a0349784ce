//! Markdown report for PR comments and job summaries.

use std::fmt::Write as _;

use super::RenderInput;
use crate::diff::DriftType;
use crate::policy::Severity;

/// Render the diff report as Markdown.
#[must_use]
pub fn render_markdown(input: &RenderInput<'_>) -> String {
    let mut out = String::new();
    let diff = input.diff;

    out.push_str("# SBOM Drift Report\n\n");

    if diff.is_empty() && input.violations.is_empty() {
        out.push_str("No differences found.\n");
        return out;
    }

    out.push_str("| Category | Count |\n|---|---|\n");
    let _ = writeln!(out, "| Added | {} |", diff.added.len());
    let _ = writeln!(out, "| Removed | {} |", diff.removed.len());
    let _ = writeln!(out, "| Changed | {} |", diff.changed.len());
    if let Some(summary) = &diff.drift_summary {
        let _ = writeln!(out, "| Integrity drift | {} |", summary.integrity_drift);
    }
    if let Some(deps) = &diff.dependencies {
        let _ = writeln!(out, "| New transitive deps | {} |", deps.transitive_new.len());
    }
    out.push('\n');

    if !diff.added.is_empty() {
        out.push_str("## Added\n\n");
        for c in &diff.added {
            let _ = writeln!(out, "- `{}`", c.display_name());
        }
        out.push('\n');
    }

    if !diff.removed.is_empty() {
        out.push_str("## Removed\n\n");
        for c in &diff.removed {
            let _ = writeln!(out, "- `{}`", c.display_name());
        }
        out.push('\n');
    }

    if !diff.changed.is_empty() {
        out.push_str("## Changed\n\n");
        for c in &diff.changed {
            let marker = match c.drift.drift_type {
                DriftType::Integrity => " **[integrity]**",
                DriftType::Metadata => " *[metadata]*",
                DriftType::Version | DriftType::None => "",
            };
            let _ = writeln!(out, "- `{}`{}", c.name, marker);
            for change in &c.changes {
                let _ = writeln!(out, "  - {change}");
            }
        }
        out.push('\n');
    }

    if let Some(deps) = &diff.dependencies {
        if !deps.transitive_new.is_empty() {
            out.push_str("## New transitive dependencies\n\n");
            for td in &deps.transitive_new {
                let _ = writeln!(
                    out,
                    "- `{}` at depth {} via `{}`",
                    td.target,
                    td.depth,
                    td.via.join(" -> ")
                );
            }
            out.push('\n');
        }
        if !deps.transitive_lost.is_empty() {
            out.push_str("## Lost transitive dependencies\n\n");
            for td in &deps.transitive_lost {
                let _ = writeln!(out, "- `{}` (was depth {})", td.target, td.depth);
            }
            out.push('\n');
        }
    }

    if let Some(dups) = &diff.duplicates {
        if !dups.after.is_empty() {
            out.push_str("## Duplicates in candidate\n\n");
            for d in &dups.after {
                let _ = writeln!(out, "- `{}`: {}", d.name, d.versions.join(", "));
            }
            out.push('\n');
        }
        if !dups.collisions.is_empty() {
            out.push_str("## Identity collisions\n\n");
            for c in &dups.collisions {
                let _ = writeln!(out, "- `{}` ({})", c.id, c.reason.as_str());
            }
            out.push('\n');
        }
    }

    if !input.violations.is_empty() {
        out.push_str("## Policy violations\n\n");
        for v in input.violations {
            let label = match v.severity {
                Severity::Error => "ERROR",
                Severity::Warning => "WARNING",
            };
            let _ = writeln!(out, "- **{label}** `{}`: {}", v.rule, v.message);
        }
        out.push('\n');
    }

    if !input.warnings.is_empty() {
        out.push_str("## Parse warnings\n\n");
        for w in input.warnings {
            let _ = writeln!(out, "- `{}`: {}", w.file, w.message);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff_components;
    use crate::model::Component;

    fn comp(name: &str, version: &str) -> Component {
        let mut c = Component::new(name, version);
        c.assign_identity();
        c
    }

    #[test]
    fn clean_diff_reports_no_differences() {
        let diff = diff_components(&[], &[]);
        let md = render_markdown(&RenderInput {
            diff: &diff,
            violations: &[],
            warnings: &[],
            sbom_file: "",
        });
        assert!(md.contains("No differences found."));
    }

    #[test]
    fn summary_table_and_sections() {
        let diff = diff_components(&[comp("old", "1.0")], &[comp("new", "1.0")]);
        let md = render_markdown(&RenderInput {
            diff: &diff,
            violations: &[],
            warnings: &[],
            sbom_file: "",
        });
        assert!(md.contains("| Added | 1 |"));
        assert!(md.contains("| Removed | 1 |"));
        assert!(md.contains("## Added"));
        assert!(md.contains("- `new 1.0`"));
    }
}
