//! Declarative policy evaluation over a diff result.
//!
//! A policy is a flat JSON document; absent fields default to zero / empty
//! / false, which makes the empty policy a no-op. A numeric limit of 0
//! means "unlimited" — absent JSON fields decode to zero, so 0 must never
//! mean "forbid all". Violations are emitted in a fixed rule order that
//! serializers can rely on.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::diff::{DiffResult, DriftType};
use crate::error::{Result, SbomDriftError};

/// Rules for evaluating an SBOM diff.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Component count limits; 0 means unlimited.
    pub max_added: usize,
    pub max_removed: usize,
    pub max_changed: usize,

    /// License rules applied to added components.
    pub deny_licenses: Vec<String>,
    pub require_licenses: bool,

    /// Fail when the candidate SBOM contains duplicate groups.
    pub deny_duplicates: bool,

    /// Fail on hash changes without version changes.
    pub deny_integrity_drift: bool,
    /// Fail on new transitive dependencies at depth >= this; 0 disables.
    pub max_depth: usize,

    /// Warning rules; these never affect the exit code by themselves.
    pub warn_supplier_change: bool,
    pub warn_new_transitive: bool,
}

/// Severity of a policy violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A policy rule that was violated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub rule: String,
    pub message: String,
    pub severity: Severity,
}

impl Violation {
    fn error(rule: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            severity: Severity::Error,
        }
    }

    fn warning(rule: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            severity: Severity::Warning,
        }
    }
}

impl Policy {
    /// Decode a policy from JSON. Unknown fields are ignored; any decode
    /// failure is fatal for the run.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data)
            .map_err(|e| SbomDriftError::PolicyDecode(e.to_string()))
    }
}

/// Evaluate a diff result against a policy.
///
/// Rules run in a fixed order; the resulting violation order is observable
/// by serializers and must stay stable.
#[must_use]
pub fn evaluate(policy: &Policy, result: &DiffResult) -> Vec<Violation> {
    let mut violations = Vec::new();

    if policy.max_added > 0 && result.added.len() > policy.max_added {
        violations.push(Violation::error(
            "max_added",
            format!(
                "too many components added: {} > {}",
                result.added.len(),
                policy.max_added
            ),
        ));
    }

    if policy.max_removed > 0 && result.removed.len() > policy.max_removed {
        violations.push(Violation::error(
            "max_removed",
            format!(
                "too many components removed: {} > {}",
                result.removed.len(),
                policy.max_removed
            ),
        ));
    }

    if policy.max_changed > 0 && result.changed.len() > policy.max_changed {
        violations.push(Violation::error(
            "max_changed",
            format!(
                "too many components changed: {} > {}",
                result.changed.len(),
                policy.max_changed
            ),
        ));
    }

    if !policy.deny_licenses.is_empty() {
        let deny: HashSet<&str> = policy.deny_licenses.iter().map(String::as_str).collect();
        for comp in &result.added {
            for lic in &comp.licenses {
                if deny.contains(lic.as_str()) {
                    violations.push(Violation::error(
                        "deny_licenses",
                        format!("component {} has denied license: {}", comp.name, lic),
                    ));
                }
            }
        }
    }

    if policy.require_licenses {
        for comp in &result.added {
            if comp.licenses.is_empty() {
                violations.push(Violation::error(
                    "require_licenses",
                    format!("component {} has no license", comp.name),
                ));
            }
        }
    }

    if policy.deny_duplicates {
        if let Some(dups) = &result.duplicates {
            if !dups.after.is_empty() {
                violations.push(Violation::error(
                    "deny_duplicates",
                    format!("found {} duplicate components in result", dups.after.len()),
                ));
            }
        }
    }

    if policy.deny_integrity_drift {
        let integrity_drift = result
            .drift_summary
            .map_or(0, |summary| summary.integrity_drift);
        if integrity_drift > 0 {
            for changed in &result.changed {
                if changed.drift.drift_type == DriftType::Integrity {
                    violations.push(Violation::error(
                        "deny_integrity_drift",
                        format!(
                            "component {} has hash change without version change (potential supply chain attack)",
                            changed.name
                        ),
                    ));
                }
            }
        }
    }

    if policy.max_depth > 0 {
        if let Some(deps) = &result.dependencies {
            if deps.depth_summary.is_some() {
                let offenders: Vec<String> = deps
                    .transitive_new
                    .iter()
                    .filter(|td| td.depth >= policy.max_depth)
                    .map(|td| format!("{} (depth {})", td.target, td.depth))
                    .collect();
                if !offenders.is_empty() {
                    violations.push(Violation::error(
                        "max_depth",
                        format!(
                            "new transitive dependencies at depth >= {}: [{}]",
                            policy.max_depth,
                            offenders.join(", ")
                        ),
                    ));
                }
            }
        }
    }

    if policy.warn_supplier_change {
        for changed in &result.changed {
            let before = &changed.before.supplier;
            let after = &changed.after.supplier;
            if before != after && (!before.is_empty() || !after.is_empty()) {
                violations.push(Violation::warning(
                    "warn_supplier_change",
                    format!(
                        "component {} supplier changed: {:?} -> {:?}",
                        changed.name, before, after
                    ),
                ));
            }
        }
    }

    if policy.warn_new_transitive {
        if let Some(deps) = &result.dependencies {
            if !deps.transitive_new.is_empty() {
                violations.push(Violation::warning(
                    "warn_new_transitive",
                    format!(
                        "found {} new transitive dependencies",
                        deps.transitive_new.len()
                    ),
                ));
            }
        }
    }

    violations
}

/// True when any violation carries error severity. Warnings never affect
/// the exit code.
#[must_use]
pub fn has_errors(violations: &[Violation]) -> bool {
    violations.iter().any(|v| v.severity == Severity::Error)
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

    fn comp_lic(name: &str, version: &str, licenses: &[&str]) -> Component {
        let mut c = comp(name, version);
        c.licenses = licenses.iter().map(|s| (*s).to_string()).collect();
        c
    }

    #[test]
    fn empty_policy_is_noop() {
        let result = diff_components(&[], &[comp("a", "1"), comp("b", "2"), comp("c", "3")]);
        let violations = evaluate(&Policy::default(), &result);
        assert!(violations.is_empty());
        assert!(!has_errors(&violations));
    }

    #[test]
    fn zero_limits_mean_unlimited() {
        let after: Vec<Component> = (0..100).map(|i| comp(&format!("c{i}"), "1.0")).collect();
        let result = diff_components(&[], &after);

        let policy = Policy {
            max_added: 0,
            max_removed: 0,
            max_changed: 0,
            ..Policy::default()
        };
        assert!(evaluate(&policy, &result).is_empty());
    }

    #[test]
    fn max_added_fires_above_limit() {
        let result = diff_components(&[], &[comp("a", "1"), comp("b", "2")]);
        let policy = Policy {
            max_added: 1,
            ..Policy::default()
        };
        let violations = evaluate(&policy, &result);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, "max_added");
        assert_eq!(violations[0].severity, Severity::Error);
    }

    #[test]
    fn max_added_exactly_at_limit_passes() {
        let result = diff_components(&[], &[comp("a", "1")]);
        let policy = Policy {
            max_added: 1,
            ..Policy::default()
        };
        assert!(evaluate(&policy, &result).is_empty());
    }

    #[test]
    fn denied_license_one_violation_per_component_license_pair() {
        let result = diff_components(
            &[],
            &[
                comp_lic("lib1", "1.0", &["MIT"]),
                comp_lic("lib2", "1.0", &["GPL-3.0"]),
            ],
        );
        let policy = Policy {
            deny_licenses: vec!["GPL-3.0".to_string()],
            ..Policy::default()
        };
        let violations = evaluate(&policy, &result);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, "deny_licenses");
        assert!(violations[0].message.contains("lib2"));
        assert!(violations[0].message.contains("GPL-3.0"));
    }

    #[test]
    fn require_licenses_flags_unlicensed_additions() {
        let result = diff_components(
            &[],
            &[comp("bare", "1.0"), comp_lic("ok", "1.0", &["MIT"])],
        );
        let policy = Policy {
            require_licenses: true,
            ..Policy::default()
        };
        let violations = evaluate(&policy, &result);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("bare"));
    }

    #[test]
    fn deny_duplicates_fires_on_candidate_groups() {
        let result = diff_components(&[], &[comp("x", "1.0"), comp("x", "2.0")]);
        let policy = Policy {
            deny_duplicates: true,
            ..Policy::default()
        };
        let violations = evaluate(&policy, &result);
        assert!(violations.iter().any(|v| v.rule == "deny_duplicates"));
    }

    #[test]
    fn deny_integrity_drift_one_violation_per_component() {
        let make = |hash: &str| {
            let mut a = comp("x", "1.0");
            a.hashes.insert("SHA256".to_string(), hash.to_string());
            let mut b = comp("y", "1.0");
            b.hashes.insert("SHA256".to_string(), format!("{hash}-y"));
            vec![a, b]
        };
        let result = diff_components(&make("one"), &make("two"));
        let policy = Policy {
            deny_integrity_drift: true,
            ..Policy::default()
        };
        let violations = evaluate(&policy, &result);
        let integrity: Vec<_> = violations
            .iter()
            .filter(|v| v.rule == "deny_integrity_drift")
            .collect();
        assert_eq!(integrity.len(), 2);
    }

    #[test]
    fn max_depth_single_aggregate_violation() {
        let mut app_b = comp("app", "1.0");
        app_b.dependencies = vec!["express".to_string()];
        let express_b = comp("express", "4.0");

        let mut app_a = comp("app", "1.0");
        app_a.dependencies = vec!["express".to_string()];
        let mut express_a = comp("express", "4.0");
        express_a.dependencies = vec!["lodash".to_string()];
        let mut lodash = comp("lodash", "4.17.21");
        lodash.dependencies = vec!["underscore".to_string()];
        let underscore = comp("underscore", "1.13.6");

        let result = diff_components(
            &[app_b, express_b],
            &[app_a, express_a, lodash, underscore],
        );

        let policy = Policy {
            max_depth: 3,
            ..Policy::default()
        };
        let violations = evaluate(&policy, &result);
        let depth: Vec<_> = violations.iter().filter(|v| v.rule == "max_depth").collect();
        assert_eq!(depth.len(), 1);
        assert!(depth[0].message.contains("underscore"));
        assert!(!depth[0].message.contains("lodash ("));
    }

    #[test]
    fn supplier_change_is_warning_only() {
        let mut b = comp("x", "1.0");
        b.supplier = "old corp".to_string();
        b.version = "1.0".to_string();
        let mut a = comp("x", "1.1");
        a.supplier = "new corp".to_string();

        let result = diff_components(&[b], &[a]);
        let policy = Policy {
            warn_supplier_change: true,
            ..Policy::default()
        };
        let violations = evaluate(&policy, &result);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Warning);
        assert!(!has_errors(&violations));
    }

    #[test]
    fn warn_new_transitive_single_warning() {
        let mut app_b = comp("app", "1.0");
        app_b.dependencies = vec!["mid".to_string()];
        let mid_b = comp("mid", "1.0");

        let mut app_a = comp("app", "1.0");
        app_a.dependencies = vec!["mid".to_string()];
        let mut mid_a = comp("mid", "1.0");
        mid_a.dependencies = vec!["deep".to_string()];
        let deep = comp("deep", "1.0");

        let result = diff_components(&[app_b, mid_b], &[app_a, mid_a, deep]);
        let policy = Policy {
            warn_new_transitive: true,
            ..Policy::default()
        };
        let violations = evaluate(&policy, &result);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, "warn_new_transitive");
        assert_eq!(violations[0].severity, Severity::Warning);
    }

    #[test]
    fn violation_order_follows_rule_order() {
        let before = vec![comp_lic("keep", "1.0", &["MIT"])];
        let after = vec![
            comp_lic("keep", "2.0", &["MIT"]),
            comp_lic("new1", "1.0", &["GPL-3.0"]),
            comp("new2", "1.0"),
        ];
        let result = diff_components(&before, &after);
        let policy = Policy {
            max_added: 1,
            max_changed: 0,
            deny_licenses: vec!["GPL-3.0".to_string()],
            require_licenses: true,
            ..Policy::default()
        };
        let violations = evaluate(&policy, &result);
        let rules: Vec<&str> = violations.iter().map(|v| v.rule.as_str()).collect();
        assert_eq!(rules, vec!["max_added", "deny_licenses", "require_licenses"]);
    }

    #[test]
    fn policy_decode_ignores_unknown_fields() {
        let policy =
            Policy::from_json(br#"{"max_added": 3, "future_rule": true}"#).expect("decode");
        assert_eq!(policy.max_added, 3);
    }

    #[test]
    fn policy_decode_failure_is_fatal() {
        assert!(Policy::from_json(b"{not json").is_err());
    }
}
