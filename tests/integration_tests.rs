//! End-to-end tests: JSON fixtures through ingest, normalization, diff,
//! and policy evaluation.

use sbom_drift::diff::{diff_components, DriftType};
use sbom_drift::normalize::normalize_components;
use sbom_drift::parsers::{ingest, ingest_with_options, ParseOptions};
use sbom_drift::policy::{evaluate, has_errors, Policy, Severity};
use sbom_drift::Component;

fn load(json: &str, file: &str) -> Vec<Component> {
    let ingested = ingest(json.as_bytes(), file).expect("ingest");
    normalize_components(ingested.components)
}

fn syft_doc(artifacts: &str) -> String {
    format!(r#"{{"artifacts": [{artifacts}]}}"#)
}

// ============================================================================
// Scenario: integrity drift
// ============================================================================

#[test]
fn integrity_drift_detected_end_to_end() {
    let before = load(
        r#"{
            "bomFormat": "CycloneDX",
            "components": [{
                "name": "x", "version": "1.0",
                "purl": "pkg:npm/x@1.0",
                "hashes": [{"alg": "SHA-256", "content": "abc"}]
            }]
        }"#,
        "before.json",
    );
    let after = load(
        r#"{
            "bomFormat": "CycloneDX",
            "components": [{
                "name": "x", "version": "1.0",
                "purl": "pkg:npm/x@1.0",
                "hashes": [{"alg": "SHA-256", "content": "def"}]
            }]
        }"#,
        "after.json",
    );

    let result = diff_components(&before, &after);

    assert!(result.added.is_empty());
    assert!(result.removed.is_empty());
    assert_eq!(result.changed.len(), 1);
    assert_eq!(result.changed[0].id, "pkg:npm/x");
    assert_eq!(result.changed[0].drift.drift_type, DriftType::Integrity);
    assert_eq!(result.drift_summary.expect("summary").integrity_drift, 1);
}

#[test]
fn normal_upgrade_is_not_integrity_drift() {
    let before = load(
        r#"{
            "bomFormat": "CycloneDX",
            "components": [{
                "name": "x", "version": "1.0",
                "purl": "pkg:npm/x@1.0",
                "hashes": [{"alg": "SHA-256", "content": "a"}]
            }]
        }"#,
        "before.json",
    );
    let after = load(
        r#"{
            "bomFormat": "CycloneDX",
            "components": [{
                "name": "x", "version": "1.1",
                "purl": "pkg:npm/x@1.1",
                "hashes": [{"alg": "SHA-256", "content": "b"}]
            }]
        }"#,
        "after.json",
    );

    let result = diff_components(&before, &after);

    assert_eq!(result.changed.len(), 1);
    assert_eq!(result.changed[0].drift.drift_type, DriftType::Version);
    let summary = result.drift_summary.expect("summary");
    assert_eq!(summary.integrity_drift, 0);
    assert_eq!(summary.version_drift, 1);
}

// ============================================================================
// Scenario: deep transitive introduction
// ============================================================================

#[test]
fn deep_transitive_introduction_with_max_depth_policy() {
    let before = load(
        &syft_doc(
            r#"
            {"name": "app", "version": "1.0", "metadata": {"pullDependencies": ["express"]}},
            {"name": "express", "version": "4.18.2"}
        "#,
        ),
        "before.json",
    );
    let after = load(
        &syft_doc(
            r#"
            {"name": "app", "version": "1.0", "metadata": {"pullDependencies": ["express"]}},
            {"name": "express", "version": "4.18.2", "metadata": {"pullDependencies": ["lodash"]}},
            {"name": "lodash", "version": "4.17.21", "metadata": {"pullDependencies": ["underscore"]}},
            {"name": "underscore", "version": "1.13.6"}
        "#,
        ),
        "after.json",
    );

    let result = diff_components(&before, &after);

    let deps = result.dependencies.as_ref().expect("dependency diff");
    let targets: Vec<&str> = deps
        .transitive_new
        .iter()
        .map(|t| t.target.as_str())
        .collect();
    assert_eq!(targets, vec!["lodash", "underscore"]);
    assert_eq!(deps.transitive_new[0].depth, 2);
    assert_eq!(deps.transitive_new[1].depth, 3);
    assert_eq!(
        deps.transitive_new[1].via,
        vec!["app", "express", "lodash", "underscore"]
    );

    let summary = deps.depth_summary.expect("depth summary");
    assert_eq!(summary.depth_1, 0);
    assert_eq!(summary.depth_2, 1);
    assert_eq!(summary.depth_3_plus, 1);

    // max_depth = 3 cites exactly underscore in one aggregate violation.
    let policy = Policy {
        max_depth: 3,
        ..Policy::default()
    };
    let violations = evaluate(&policy, &result);
    let depth_violations: Vec<_> = violations.iter().filter(|v| v.rule == "max_depth").collect();
    assert_eq!(depth_violations.len(), 1);
    assert_eq!(depth_violations[0].severity, Severity::Error);
    assert!(depth_violations[0].message.contains("underscore (depth 3)"));
    assert!(!depth_violations[0].message.contains("lodash (depth"));
}

#[test]
fn every_transitive_entry_has_depth_at_least_two() {
    let before = load(&syft_doc(r#"{"name": "app", "version": "1.0"}"#), "b.json");
    let after = load(
        &syft_doc(
            r#"
            {"name": "app", "version": "1.0", "metadata": {"pullDependencies": ["a"]}},
            {"name": "a", "version": "1", "metadata": {"pullDependencies": ["b"]}},
            {"name": "b", "version": "1", "metadata": {"pullDependencies": ["c"]}},
            {"name": "c", "version": "1"}
        "#,
        ),
        "a.json",
    );

    let result = diff_components(&before, &after);
    let deps = result.dependencies.expect("deps");
    assert!(!deps.transitive_new.is_empty());
    for td in &deps.transitive_new {
        assert!(td.depth >= 2, "depth {} for {}", td.depth, td.target);
    }
    assert_eq!(deps.depth_summary.expect("summary").depth_1, 0);
}

// ============================================================================
// Scenario: duplicate resolution
// ============================================================================

#[test]
fn duplicate_resolved_to_single_version() {
    let before = load(
        &syft_doc(
            r#"
            {"name": "lodash", "version": "4.17.20", "purl": "pkg:npm/lodash@4.17.20"},
            {"name": "lodash", "version": "4.17.21", "purl": "pkg:npm/lodash@4.17.21"}
        "#,
        ),
        "before.json",
    );
    let after = load(
        &syft_doc(r#"{"name": "lodash", "version": "4.17.21", "purl": "pkg:npm/lodash@4.17.21"}"#),
        "after.json",
    );

    let result = diff_components(&before, &after);
    let dups = result.duplicates.expect("duplicates");
    let vd = dups.version_diff.expect("version diff");

    assert_eq!(vd.versions_removed["pkg:npm/lodash"], vec!["4.17.20"]);
    assert!(vd.new_duplicates.is_empty());
    // The identity still exists in the candidate, so the group is not
    // "resolved" — only a version went away.
    assert!(vd.resolved_duplicates.is_empty());
}

#[test]
fn duplicate_group_resolved_when_identity_removed() {
    let before = load(
        &syft_doc(
            r#"
            {"name": "lodash", "version": "4.17.20", "purl": "pkg:npm/lodash@4.17.20"},
            {"name": "lodash", "version": "4.17.21", "purl": "pkg:npm/lodash@4.17.21"}
        "#,
        ),
        "before.json",
    );
    let after = load(&syft_doc(r#"{"name": "other", "version": "1.0"}"#), "after.json");

    let result = diff_components(&before, &after);
    let dups = result.duplicates.expect("duplicates");
    let vd = dups.version_diff.expect("version diff");

    assert_eq!(vd.resolved_duplicates.len(), 1);
    assert_eq!(vd.resolved_duplicates[0].id, "pkg:npm/lodash");
}

// ============================================================================
// Scenario: denied license on addition
// ============================================================================

#[test]
fn denied_license_on_added_component() {
    let before = load(&syft_doc(r#"{"name": "lib1", "version": "1.0"}"#), "b.json");
    let after = load(
        &syft_doc(
            r#"
            {"name": "lib1", "version": "1.0"},
            {"name": "lib2", "version": "1.0", "licenses": [{"value": "GPL-3.0"}]}
        "#,
        ),
        "a.json",
    );

    let result = diff_components(&before, &after);
    let policy = Policy {
        deny_licenses: vec!["GPL-3.0".to_string()],
        ..Policy::default()
    };
    let violations = evaluate(&policy, &result);

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].rule, "deny_licenses");
    assert!(violations[0].message.contains("lib2"));
    assert!(violations[0].message.contains("GPL-3.0"));
    assert!(has_errors(&violations));
}

// ============================================================================
// Scenario: no-op policy still fails on non-empty diff
// ============================================================================

#[test]
fn empty_policy_nonempty_diff_exits_nonzero() {
    let before = load(&syft_doc(r#"{"name": "a", "version": "1.0"}"#), "b.json");
    let after = load(&syft_doc(r#"{"name": "b", "version": "1.0"}"#), "a.json");

    let result = diff_components(&before, &after);
    let violations = evaluate(&Policy::default(), &result);

    assert!(violations.is_empty());
    // Exit contract: 1 when the diff is non-empty OR any error violation.
    let exits_nonzero = !result.is_empty() || has_errors(&violations);
    assert!(exits_nonzero);
}

#[test]
fn identical_sboms_exit_zero() {
    let doc = syft_doc(r#"{"name": "a", "version": "1.0"}"#);
    let before = load(&doc, "b.json");
    let after = load(&doc, "a.json");

    let result = diff_components(&before, &after);
    let violations = evaluate(&Policy::default(), &result);
    assert!(result.is_empty());
    assert!(!has_errors(&violations));
}

// ============================================================================
// Cross-format matching
// ============================================================================

#[test]
fn cyclonedx_component_matches_syft_component_by_purl() {
    let before = load(
        r#"{
            "bomFormat": "CycloneDX",
            "components": [{
                "name": "Lodash", "version": "4.17.21",
                "purl": "pkg:npm/lodash@4.17.21"
            }]
        }"#,
        "before.json",
    );
    let after = load(
        &syft_doc(r#"{"name": "lodash", "version": "4.17.21", "purl": "pkg:npm/lodash@4.17.21"}"#),
        "after.json",
    );

    let result = diff_components(&before, &after);
    assert!(
        result.is_empty(),
        "same package from different tools should match: {result:?}"
    );
}

#[test]
fn spdx_and_cyclonedx_match_by_purl() {
    let before = load(
        r#"{
            "spdxVersion": "SPDX-2.3",
            "packages": [{
                "name": "lodash",
                "SPDXID": "SPDXRef-Package-lodash",
                "versionInfo": "4.17.21",
                "externalRefs": [{
                    "referenceType": "purl",
                    "referenceLocator": "pkg:npm/lodash@4.17.21"
                }]
            }]
        }"#,
        "before.json",
    );
    let after = load(
        r#"{
            "bomFormat": "CycloneDX",
            "components": [{
                "name": "lodash", "version": "4.17.21",
                "purl": "pkg:npm/lodash@4.17.21"
            }]
        }"#,
        "after.json",
    );

    let result = diff_components(&before, &after);
    assert!(result.is_empty(), "cross-dialect purl match failed: {result:?}");
}

// ============================================================================
// Normalization through the pipeline
// ============================================================================

#[test]
fn sentinel_licenses_do_not_cause_metadata_drift() {
    let before = load(
        &syft_doc(r#"{"name": "x", "version": "1.0", "licenses": [{"value": "MIT"}]}"#),
        "b.json",
    );
    let after = load(
        &syft_doc(
            r#"{"name": "x", "version": "1.0", "licenses": [{"value": "MIT"}, {"value": "NOASSERTION"}]}"#,
        ),
        "a.json",
    );

    let result = diff_components(&before, &after);
    assert!(result.is_empty(), "NOASSERTION must be filtered: {result:?}");
}

#[test]
fn name_casing_differences_do_not_diff() {
    let before = load(&syft_doc(r#"{"name": "OpenSSL", "version": "3.0.1"}"#), "b.json");
    let after = load(&syft_doc(r#"{"name": "openssl", "version": "3.0.1"}"#), "a.json");

    let result = diff_components(&before, &after);
    assert!(result.is_empty(), "names are case-folded: {result:?}");
}

// ============================================================================
// Tolerant vs strict ingest
// ============================================================================

#[test]
fn tolerant_mode_collects_warning_and_continues() {
    let mut opts = ParseOptions::tolerant();
    let ingested =
        ingest_with_options(b"not an sbom at all", "junk.json", &mut opts).expect("tolerant");
    assert!(ingested.components.is_empty());
    assert_eq!(opts.warnings.len(), 1);
    assert!(opts.warnings[0].message.contains("unknown SBOM format"));
}

#[test]
fn strict_mode_fails_on_unknown_format() {
    let mut opts = ParseOptions::strict();
    assert!(ingest_with_options(b"not an sbom at all", "junk.json", &mut opts).is_err());
}

#[test]
fn component_without_name_or_identifiers_is_dropped_with_warning() {
    let ingested = ingest(
        syft_doc(r#"{"version": "1.0"}, {"name": "kept", "version": "1.0"}"#).as_bytes(),
        "x.json",
    )
    .expect("ingest");

    assert_eq!(ingested.components.len(), 1);
    assert_eq!(ingested.components[0].name, "kept");
    assert_eq!(ingested.warnings.len(), 1);
}
