//! Composite JSON report: diff + violations + warnings in one envelope.

use serde::Serialize;

use super::RenderInput;
use crate::diff::DiffResult;
use crate::error::{Result, SbomDriftError};
use crate::parsers::ParseWarning;
use crate::policy::Violation;
use crate::stats::Stats;

fn slice_is_empty<T>(s: &[T]) -> bool {
    s.is_empty()
}

#[derive(Serialize)]
struct DiffEnvelope<'a> {
    diff: &'a DiffResult,
    #[serde(skip_serializing_if = "slice_is_empty")]
    violations: &'a [Violation],
    #[serde(skip_serializing_if = "slice_is_empty")]
    warnings: &'a [ParseWarning],
}

#[derive(Serialize)]
struct StatsEnvelope<'a> {
    stats: &'a Stats,
    #[serde(skip_serializing_if = "slice_is_empty")]
    warnings: &'a [ParseWarning],
}

/// Render the full diff report as pretty-printed JSON.
pub fn render_json(input: &RenderInput<'_>) -> Result<String> {
    let envelope = DiffEnvelope {
        diff: input.diff,
        violations: input.violations,
        warnings: input.warnings,
    };
    serde_json::to_string_pretty(&envelope)
        .map_err(|e| SbomDriftError::Render(e.to_string()))
}

/// Render single-SBOM statistics as pretty-printed JSON.
pub fn render_stats_json(stats: &Stats, warnings: &[ParseWarning]) -> Result<String> {
    let envelope = StatsEnvelope { stats, warnings };
    serde_json::to_string_pretty(&envelope)
        .map_err(|e| SbomDriftError::Render(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff_components;
    use crate::model::Component;

    #[test]
    fn envelope_has_diff_key() {
        let mut c = Component::new("a", "1.0");
        c.assign_identity();
        let diff = diff_components(&[], &[c]);
        let json = render_json(&RenderInput {
            diff: &diff,
            violations: &[],
            warnings: &[],
            sbom_file: "",
        })
        .expect("render");

        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert!(value.get("diff").is_some());
        assert_eq!(value["diff"]["added"][0]["id"], "a");
        assert!(value.get("violations").is_none());
    }

    #[test]
    fn stats_envelope_round_trips() {
        let stats = crate::stats::compute_stats(&[]);
        let json = render_stats_json(&stats, &[]).expect("render");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(value["stats"]["total_components"], 0);
    }
}
