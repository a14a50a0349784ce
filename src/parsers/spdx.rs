//! SPDX JSON ingestion.
//!
//! Extracts packages, their external references (PURL, CPE), checksums, and
//! `DEPENDS_ON` relationships. SPDX documents carry no source metadata of
//! interest, so `SbomInfo` stays empty.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::value::RawValue;
use std::collections::HashMap;

use super::{Ingest, ParseError, ParseWarning};
use crate::model::Component;

#[derive(Deserialize)]
struct SpdxDocument {
    #[serde(default)]
    packages: Option<Vec<Box<RawValue>>>,
    #[serde(default)]
    relationships: Option<Vec<SpdxRelationship>>,
}

#[derive(Deserialize)]
struct SpdxPackage {
    #[serde(default)]
    name: String,
    #[serde(rename = "SPDXID", default)]
    spdx_id: String,
    #[serde(rename = "versionInfo", default)]
    version: String,
    #[serde(rename = "licenseConcluded", default)]
    license_concluded: String,
    #[serde(default)]
    checksums: Option<Vec<SpdxChecksum>>,
    #[serde(rename = "externalRefs", default)]
    external_refs: Option<Vec<SpdxExternalRef>>,
}

#[derive(Deserialize)]
struct SpdxChecksum {
    #[serde(default)]
    algorithm: String,
    #[serde(rename = "checksumValue", default)]
    checksum_value: String,
}

#[derive(Deserialize)]
struct SpdxExternalRef {
    #[serde(rename = "referenceType", default)]
    reference_type: String,
    #[serde(rename = "referenceLocator", default)]
    reference_locator: String,
}

#[derive(Deserialize)]
struct SpdxRelationship {
    #[serde(rename = "spdxElementId", default)]
    element_id: String,
    #[serde(rename = "relationshipType", default)]
    relationship_type: String,
    #[serde(rename = "relatedSpdxElement", default)]
    related_element: String,
}

/// Parse an SPDX JSON document into canonical components.
pub fn parse_spdx(content: &str, file: &str) -> Result<Ingest, ParseError> {
    let doc: SpdxDocument = serde_json::from_str(content).map_err(|e| ParseError::Malformed {
        dialect: "SPDX",
        message: e.to_string(),
    })?;

    let mut warnings = Vec::new();
    let mut components = Vec::new();

    for raw in doc.packages.unwrap_or_default() {
        let pkg: SpdxPackage = match serde_json::from_str(raw.get()) {
            Ok(p) => p,
            Err(e) => {
                warnings.push(ParseWarning {
                    file: file.to_string(),
                    message: format!("skipping unreadable package: {e}"),
                    field: Some("packages".to_string()),
                });
                continue;
            }
        };

        let mut comp = Component {
            name: pkg.name,
            version: pkg.version,
            spdx_id: pkg.spdx_id,
            raw_json: Some(raw),
            ..Component::default()
        };
        for ext in pkg.external_refs.unwrap_or_default() {
            match ext.reference_type.as_str() {
                "purl" | "package-url" => comp.purl = ext.reference_locator,
                "cpe22Type" | "cpe23Type" => comp.cpes.push(ext.reference_locator),
                _ => {}
            }
        }
        if !pkg.license_concluded.is_empty() {
            comp.licenses.push(pkg.license_concluded);
        }
        let mut hashes = IndexMap::new();
        for cs in pkg.checksums.unwrap_or_default() {
            if !cs.algorithm.is_empty() && !cs.checksum_value.is_empty() {
                hashes.insert(cs.algorithm, cs.checksum_value);
            }
        }
        comp.hashes = hashes;
        comp.assign_identity();
        components.push(comp);
    }

    resolve_relationships(&mut components, doc.relationships.unwrap_or_default());

    Ok(Ingest {
        components,
        info: crate::model::SbomInfo::default(),
        warnings,
    })
}

/// Map `DEPENDS_ON` relationships onto components, translating SPDXIDs to
/// canonical identities. Unknown targets are kept verbatim.
fn resolve_relationships(components: &mut [Component], relationships: Vec<SpdxRelationship>) {
    if relationships.is_empty() {
        return;
    }

    let by_spdx_id: HashMap<String, String> = components
        .iter()
        .filter(|c| !c.spdx_id.is_empty())
        .map(|c| (c.spdx_id.clone(), c.id.clone()))
        .collect();

    let mut deps_for: HashMap<String, Vec<String>> = HashMap::new();
    for rel in relationships {
        if rel.relationship_type != "DEPENDS_ON" {
            continue;
        }
        let target = by_spdx_id
            .get(&rel.related_element)
            .cloned()
            .unwrap_or(rel.related_element);
        deps_for.entry(rel.element_id).or_default().push(target);
    }

    for comp in components.iter_mut() {
        if comp.spdx_id.is_empty() {
            continue;
        }
        if let Some(deps) = deps_for.remove(&comp.spdx_id) {
            comp.dependencies = deps;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "spdxVersion": "SPDX-2.3",
        "SPDXID": "SPDXRef-DOCUMENT",
        "packages": [
            {
                "name": "lodash",
                "SPDXID": "SPDXRef-Package-lodash",
                "versionInfo": "4.17.21",
                "licenseConcluded": "MIT",
                "checksums": [
                    {"algorithm": "SHA256", "checksumValue": "abc123"}
                ],
                "externalRefs": [
                    {
                        "referenceType": "purl",
                        "referenceLocator": "pkg:npm/lodash@4.17.21"
                    }
                ]
            },
            {
                "name": "struts",
                "SPDXID": "SPDXRef-Package-struts",
                "versionInfo": "2.5.10",
                "externalRefs": [
                    {
                        "referenceType": "cpe23Type",
                        "referenceLocator": "cpe:2.3:a:apache:struts:2.5.10:*:*:*:*:*:*:*"
                    }
                ]
            }
        ],
        "relationships": [
            {
                "spdxElementId": "SPDXRef-Package-lodash",
                "relationshipType": "DEPENDS_ON",
                "relatedSpdxElement": "SPDXRef-Package-struts"
            }
        ]
    }"#;

    #[test]
    fn parses_packages_with_purl_identity() {
        let ingested = parse_spdx(MINIMAL, "test.json").expect("parse");
        assert_eq!(ingested.components.len(), 2);
        assert_eq!(ingested.components[0].id, "pkg:npm/lodash");
        assert_eq!(ingested.components[0].licenses, vec!["MIT"]);
        assert_eq!(
            ingested.components[0].hashes.get("SHA256").map(String::as_str),
            Some("abc123")
        );
    }

    #[test]
    fn cpe_identity_when_no_purl() {
        let ingested = parse_spdx(MINIMAL, "test.json").expect("parse");
        assert_eq!(ingested.components[1].id, "cpe:apache:struts");
    }

    #[test]
    fn spdx_id_identity_when_no_purl_or_cpe() {
        let content = r#"{
            "spdxVersion": "SPDX-2.3",
            "packages": [
                {"name": "thing", "SPDXID": "SPDXRef-Package-thing"}
            ]
        }"#;
        let ingested = parse_spdx(content, "test.json").expect("parse");
        assert_eq!(ingested.components[0].id, "ref:SPDXRef-Package-thing");
    }

    #[test]
    fn depends_on_relationships_become_edges() {
        let ingested = parse_spdx(MINIMAL, "test.json").expect("parse");
        assert_eq!(
            ingested.components[0].dependencies,
            vec!["cpe:apache:struts"]
        );
        assert!(ingested.components[1].dependencies.is_empty());
    }

    #[test]
    fn non_depends_on_relationships_ignored() {
        let content = r#"{
            "spdxVersion": "SPDX-2.3",
            "packages": [
                {"name": "a", "SPDXID": "SPDXRef-a"},
                {"name": "b", "SPDXID": "SPDXRef-b"}
            ],
            "relationships": [
                {
                    "spdxElementId": "SPDXRef-a",
                    "relationshipType": "DESCRIBES",
                    "relatedSpdxElement": "SPDXRef-b"
                }
            ]
        }"#;
        let ingested = parse_spdx(content, "test.json").expect("parse");
        assert!(ingested.components[0].dependencies.is_empty());
    }

    #[test]
    fn no_sbom_info_for_spdx() {
        let ingested = parse_spdx(MINIMAL, "test.json").expect("parse");
        assert!(ingested.info.is_empty());
    }
}
