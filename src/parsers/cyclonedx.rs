//! CycloneDX JSON ingestion.
//!
//! Extracts the canonical component fields from a CycloneDX BOM, keeps each
//! component's original JSON fragment, and resolves the `dependencies`
//! section through the bom-ref map so edges use canonical identities.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::value::RawValue;
use std::collections::HashMap;

use super::{Ingest, ParseError, ParseWarning};
use crate::model::{Component, SbomInfo};

#[derive(Deserialize)]
struct CdxDocument {
    #[serde(default)]
    metadata: Option<CdxMetadata>,
    #[serde(default)]
    components: Option<Vec<Box<RawValue>>>,
    #[serde(default)]
    dependencies: Option<Vec<CdxDependency>>,
}

#[derive(Deserialize)]
struct CdxMetadata {
    #[serde(default)]
    component: Option<CdxMetaComponent>,
    #[serde(default)]
    properties: Option<Vec<CdxProperty>>,
}

#[derive(Deserialize)]
struct CdxMetaComponent {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: String,
}

#[derive(Deserialize)]
struct CdxProperty {
    #[serde(default)]
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Deserialize)]
struct CdxComponent {
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    purl: String,
    #[serde(default)]
    cpe: String,
    #[serde(default)]
    group: String,
    #[serde(rename = "bom-ref", default)]
    bom_ref: String,
    #[serde(default)]
    supplier: Option<CdxSupplier>,
    #[serde(default)]
    licenses: Option<Vec<CdxLicenseChoice>>,
    #[serde(default)]
    hashes: Option<Vec<CdxHash>>,
}

#[derive(Deserialize)]
struct CdxSupplier {
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct CdxLicenseChoice {
    #[serde(default)]
    license: Option<CdxLicense>,
}

#[derive(Deserialize)]
struct CdxLicense {
    #[serde(default)]
    id: String,
}

#[derive(Deserialize)]
struct CdxHash {
    #[serde(default)]
    alg: String,
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct CdxDependency {
    #[serde(rename = "ref", default)]
    dep_ref: String,
    #[serde(rename = "dependsOn", default)]
    depends_on: Vec<String>,
}

/// Parse a CycloneDX JSON document into canonical components.
pub fn parse_cyclonedx(content: &str, file: &str) -> Result<Ingest, ParseError> {
    let doc: CdxDocument = serde_json::from_str(content).map_err(|e| ParseError::Malformed {
        dialect: "CycloneDX",
        message: e.to_string(),
    })?;

    let mut warnings = Vec::new();
    let info = extract_info(doc.metadata.as_ref());

    let mut components = Vec::new();
    for raw in doc.components.unwrap_or_default() {
        let cdx: CdxComponent = match serde_json::from_str(raw.get()) {
            Ok(c) => c,
            Err(e) => {
                warnings.push(ParseWarning {
                    file: file.to_string(),
                    message: format!("skipping unreadable component: {e}"),
                    field: Some("components".to_string()),
                });
                continue;
            }
        };

        let mut comp = Component {
            name: cdx.name,
            version: cdx.version,
            purl: cdx.purl,
            bom_ref: cdx.bom_ref,
            namespace: cdx.group,
            raw_json: Some(raw),
            ..Component::default()
        };
        if !cdx.cpe.is_empty() {
            comp.cpes.push(cdx.cpe);
        }
        for choice in cdx.licenses.unwrap_or_default() {
            if let Some(license) = choice.license {
                if !license.id.is_empty() {
                    comp.licenses.push(license.id);
                }
            }
        }
        let mut hashes = IndexMap::new();
        for h in cdx.hashes.unwrap_or_default() {
            if !h.alg.is_empty() && !h.content.is_empty() {
                hashes.insert(h.alg, h.content);
            }
        }
        comp.hashes = hashes;
        if let Some(supplier) = cdx.supplier {
            comp.supplier = supplier.name;
        }
        comp.assign_identity();
        components.push(comp);
    }

    resolve_dependencies(&mut components, doc.dependencies.unwrap_or_default());

    Ok(Ingest {
        components,
        info,
        warnings,
    })
}

/// Map the `dependencies` section onto components, translating bom-refs to
/// canonical identities. Targets without a matching component are kept
/// verbatim as dangling edges.
fn resolve_dependencies(components: &mut [Component], dependencies: Vec<CdxDependency>) {
    if dependencies.is_empty() {
        return;
    }

    let by_ref: HashMap<String, String> = components
        .iter()
        .filter(|c| !c.bom_ref.is_empty())
        .map(|c| (c.bom_ref.clone(), c.id.clone()))
        .collect();

    let mut deps_for: HashMap<&str, &CdxDependency> = HashMap::new();
    for dep in &dependencies {
        // First entry wins for duplicate refs.
        deps_for.entry(dep.dep_ref.as_str()).or_insert(dep);
    }

    for comp in components.iter_mut() {
        if comp.bom_ref.is_empty() {
            continue;
        }
        if let Some(entry) = deps_for.get(comp.bom_ref.as_str()) {
            comp.dependencies = entry
                .depends_on
                .iter()
                .map(|target| by_ref.get(target).cloned().unwrap_or_else(|| target.clone()))
                .collect();
        }
    }
}

/// Extract source metadata from the BOM metadata block.
///
/// The main component's type decides: an OS or container fills the OS
/// fields, an application or file fills the source name. Syft-style
/// properties fill any gaps.
fn extract_info(metadata: Option<&CdxMetadata>) -> SbomInfo {
    let mut info = SbomInfo::default();
    let Some(metadata) = metadata else {
        return info;
    };

    if let Some(mc) = &metadata.component {
        match mc.kind.as_str() {
            "operating-system" | "container" => {
                info.os_name = mc.name.clone();
                info.os_version = mc.version.clone();
                info.source_type = mc.kind.clone();
            }
            "application" | "file" => {
                info.source_name = mc.name.clone();
                info.source_type = mc.kind.clone();
            }
            _ => {}
        }
    }

    for prop in metadata.properties.iter().flatten() {
        match prop.name.to_lowercase().as_str() {
            "syft:distro:name" | "distro:name" | "os:name" => {
                if info.os_name.is_empty() {
                    info.os_name = prop.value.clone();
                }
            }
            "syft:distro:version" | "distro:version" | "os:version" => {
                if info.os_version.is_empty() {
                    info.os_version = prop.value.clone();
                }
            }
            "syft:image:tag" | "image:tag" => {
                if info.source_name.is_empty() {
                    info.source_name = prop.value.clone();
                }
            }
            _ => {}
        }
    }

    info
}
