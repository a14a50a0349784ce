//! SARIF 2.1.0 report for GitHub code scanning.

use serde::Serialize;

use super::RenderInput;
use crate::diff::DriftType;
use crate::error::{Result, SbomDriftError};
use crate::policy::Severity;

const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";

#[derive(Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
struct SarifDriver {
    name: &'static str,
    version: &'static str,
    #[serde(rename = "informationUri")]
    information_uri: &'static str,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
struct SarifRule {
    id: &'static str,
    name: &'static str,
    #[serde(rename = "shortDescription")]
    short_description: SarifMessage,
    #[serde(rename = "defaultConfiguration")]
    default_configuration: SarifRuleConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<SarifProperties>,
}

#[derive(Serialize)]
struct SarifRuleConfig {
    level: &'static str,
}

#[derive(Serialize)]
struct SarifProperties {
    tags: Vec<&'static str>,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: &'static str,
    level: &'static str,
    message: SarifMessage,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    locations: Vec<SarifLocation>,
}

#[derive(Serialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifactLocation,
}

#[derive(Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

fn location(sbom_file: &str) -> Vec<SarifLocation> {
    if sbom_file.is_empty() {
        return Vec::new();
    }
    vec![SarifLocation {
        physical_location: SarifPhysicalLocation {
            artifact_location: SarifArtifactLocation {
                uri: sbom_file.to_string(),
            },
        },
    }]
}

fn rule_table() -> Vec<SarifRule> {
    vec![
        SarifRule {
            id: "integrity-drift",
            name: "IntegrityDriftDetected",
            short_description: SarifMessage {
                text: "Component hash changed without version change".to_string(),
            },
            default_configuration: SarifRuleConfig { level: "error" },
            properties: Some(SarifProperties {
                tags: vec!["security", "supply-chain"],
            }),
        },
        SarifRule {
            id: "new-component",
            name: "NewComponentAdded",
            short_description: SarifMessage {
                text: "A new component was added to the SBOM".to_string(),
            },
            default_configuration: SarifRuleConfig { level: "note" },
            properties: None,
        },
        SarifRule {
            id: "removed-component",
            name: "ComponentRemoved",
            short_description: SarifMessage {
                text: "A component was removed from the SBOM".to_string(),
            },
            default_configuration: SarifRuleConfig { level: "note" },
            properties: None,
        },
        SarifRule {
            id: "version-change",
            name: "VersionChanged",
            short_description: SarifMessage {
                text: "Component version was updated".to_string(),
            },
            default_configuration: SarifRuleConfig { level: "note" },
            properties: None,
        },
        SarifRule {
            id: "deep-dependency",
            name: "DeepTransitiveDependency",
            short_description: SarifMessage {
                text: "New dependency introduced at depth 3 or greater".to_string(),
            },
            default_configuration: SarifRuleConfig { level: "warning" },
            properties: Some(SarifProperties {
                tags: vec!["security", "supply-chain"],
            }),
        },
        SarifRule {
            id: "policy-violation",
            name: "PolicyViolation",
            short_description: SarifMessage {
                text: "SBOM policy rule was violated".to_string(),
            },
            default_configuration: SarifRuleConfig { level: "error" },
            properties: None,
        },
    ]
}

/// Render a SARIF 2.1.0 report.
pub fn render_sarif(input: &RenderInput<'_>) -> Result<String> {
    let mut results = Vec::new();

    for changed in &input.diff.changed {
        if changed.drift.drift_type == DriftType::Integrity {
            results.push(SarifResult {
                rule_id: "integrity-drift",
                level: "error",
                message: SarifMessage {
                    text: format!(
                        "Component {} has hash change without version change (potential supply chain attack)",
                        changed.name
                    ),
                },
                locations: location(input.sbom_file),
            });
        }
    }

    if let Some(deps) = &input.diff.dependencies {
        for td in &deps.transitive_new {
            if td.depth >= 3 {
                results.push(SarifResult {
                    rule_id: "deep-dependency",
                    level: "warning",
                    message: SarifMessage {
                        text: format!(
                            "New transitive dependency {} at depth {}",
                            td.target, td.depth
                        ),
                    },
                    locations: location(input.sbom_file),
                });
            }
        }
    }

    for v in input.violations {
        let level = match v.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        results.push(SarifResult {
            rule_id: "policy-violation",
            level,
            message: SarifMessage {
                text: format!("[{}] {}", v.rule, v.message),
            },
            locations: location(input.sbom_file),
        });
    }

    let report = SarifReport {
        schema: SARIF_SCHEMA,
        version: "2.1.0",
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "sbom-drift",
                    version: env!("CARGO_PKG_VERSION"),
                    information_uri: "https://github.com/sbom-drift/sbom-drift",
                    rules: rule_table(),
                },
            },
            results,
        }],
    };

    serde_json::to_string_pretty(&report).map_err(|e| SbomDriftError::Render(e.to_string()))
}
