//! JUnit XML report for CI test UIs.
//!
//! The diff is presented as a small synthetic test suite: an integrity
//! check, a deep-dependency check, one case per evaluated policy rule, and
//! an informational summary case.

use chrono::{SecondsFormat, Utc};
use std::fmt::Write as _;

use super::RenderInput;
use crate::policy::Severity;

struct TestCase {
    name: String,
    class_name: &'static str,
    failure: Option<Failure>,
}

struct Failure {
    message: String,
    kind: &'static str,
}

/// Render the diff and violations as a JUnit XML document.
#[must_use]
pub fn render_junit(input: &RenderInput<'_>) -> String {
    let mut cases = Vec::new();

    let integrity_drift = input
        .diff
        .drift_summary
        .map_or(0, |summary| summary.integrity_drift);
    cases.push(TestCase {
        name: "No integrity drift".to_string(),
        class_name: "sbom-drift.security",
        failure: (integrity_drift > 0).then(|| Failure {
            message: format!("{integrity_drift} components have hash changes without version changes"),
            kind: "IntegrityDrift",
        }),
    });

    let deep_deps = input
        .diff
        .dependencies
        .as_ref()
        .and_then(|deps| deps.depth_summary)
        .map_or(0, |summary| summary.depth_3_plus);
    cases.push(TestCase {
        name: "No deep transitive dependencies".to_string(),
        class_name: "sbom-drift.dependencies",
        failure: (deep_deps > 0).then(|| Failure {
            message: format!("{deep_deps} new dependencies at depth 3+"),
            kind: "DeepDependency",
        }),
    });

    for v in input.violations {
        cases.push(TestCase {
            name: format!("Policy: {}", v.rule),
            class_name: "sbom-drift.policy",
            failure: (v.severity == Severity::Error).then(|| Failure {
                message: v.message.clone(),
                kind: "PolicyViolation",
            }),
        });
    }

    cases.push(TestCase {
        name: "SBOM diff summary".to_string(),
        class_name: "sbom-drift.diff",
        failure: None,
    });

    let failures = cases.iter().filter(|c| c.failure.is_some()).count();
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        xml,
        "<testsuites name=\"sbom-drift\" tests=\"{}\" failures=\"{failures}\" errors=\"0\" time=\"0.01\">",
        cases.len()
    );
    let _ = writeln!(
        xml,
        "  <testsuite name=\"SBOM Analysis\" tests=\"{}\" failures=\"{failures}\" errors=\"0\" time=\"0.01\" timestamp=\"{timestamp}\">",
        cases.len()
    );
    for case in &cases {
        match &case.failure {
            Some(failure) => {
                let _ = writeln!(
                    xml,
                    "    <testcase name=\"{}\" classname=\"{}\" time=\"0.001\">",
                    escape(&case.name),
                    case.class_name
                );
                let _ = writeln!(
                    xml,
                    "      <failure message=\"{}\" type=\"{}\"/>",
                    escape(&failure.message),
                    failure.kind
                );
                xml.push_str("    </testcase>\n");
            }
            None => {
                let _ = writeln!(
                    xml,
                    "    <testcase name=\"{}\" classname=\"{}\" time=\"0.001\"/>",
                    escape(&case.name),
                    case.class_name
                );
            }
        }
    }
    xml.push_str("  </testsuite>\n");
    xml.push_str("</testsuites>\n");
    xml
}

/// Escape text for XML attribute content.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff_components;
    use crate::model::Component;
    use crate::policy::{evaluate, Policy};

    #[test]
    fn clean_diff_has_no_failures() {
        let diff = diff_components(&[], &[]);
        let xml = render_junit(&RenderInput {
            diff: &diff,
            violations: &[],
            warnings: &[],
            sbom_file: "",
        });
        assert!(xml.contains("failures=\"0\""));
        assert!(xml.contains("No integrity drift"));
    }

    #[test]
    fn integrity_drift_becomes_failure() {
        let mut before = Component::new("x", "1.0");
        before.assign_identity();
        before.hashes.insert("SHA256".to_string(), "a".to_string());
        let mut after = before.clone();
        after.hashes.insert("SHA256".to_string(), "b".to_string());

        let diff = diff_components(&[before], &[after]);
        let xml = render_junit(&RenderInput {
            diff: &diff,
            violations: &[],
            warnings: &[],
            sbom_file: "",
        });
        assert!(xml.contains("type=\"IntegrityDrift\""));
        assert!(xml.contains("failures=\"1\""));
    }

    #[test]
    fn policy_violations_become_cases() {
        let mut c = Component::new("a", "1.0");
        c.assign_identity();
        let diff = diff_components(&[], &[c]);
        let policy = Policy {
            require_licenses: true,
            ..Policy::default()
        };
        let violations = evaluate(&policy, &diff);

        let xml = render_junit(&RenderInput {
            diff: &diff,
            violations: &violations,
            warnings: &[],
            sbom_file: "",
        });
        assert!(xml.contains("Policy: require_licenses"));
        assert!(xml.contains("type=\"PolicyViolation\""));
    }

    #[test]
    fn attribute_values_are_escaped() {
        assert_eq!(escape(r#"a < b & "c""#), "a &lt; b &amp; &quot;c&quot;");
    }
}
