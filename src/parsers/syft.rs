//! Syft JSON ingestion.
//!
//! Syft's native output predates stable schemas, so several fields have
//! changed shape between releases (`cpes` as objects vs strings, `licenses`
//! likewise, `source.target` as object vs string). Shape mismatches on
//! optional subfields produce field-level warnings and parsing continues.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::Value;

use super::{Ingest, ParseError, ParseWarning};
use crate::model::{Component, SbomInfo};

#[derive(Deserialize)]
struct SyftDocument {
    #[serde(default)]
    artifacts: Vec<Box<RawValue>>,
    #[serde(default)]
    source: Option<Value>,
    #[serde(default)]
    distro: Option<Value>,
}

#[derive(Deserialize)]
struct SyftArtifact {
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    purl: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    language: String,
    #[serde(rename = "foundBy", default)]
    found_by: String,
    #[serde(default)]
    licenses: Option<Value>,
    #[serde(default)]
    cpes: Option<Value>,
    /// Free-form per-ecosystem metadata; only `pullDependencies` is read.
    #[serde(default)]
    metadata: Option<Value>,
}

/// Parse a Syft JSON document into canonical components.
pub fn parse_syft(content: &str, file: &str) -> Result<Ingest, ParseError> {
    let doc: SyftDocument = serde_json::from_str(content).map_err(|e| ParseError::Malformed {
        dialect: "Syft",
        message: e.to_string(),
    })?;

    let mut warnings = Vec::new();
    let info = extract_info(doc.source.as_ref(), doc.distro.as_ref(), file, &mut warnings);

    let mut components = Vec::new();
    for raw in doc.artifacts {
        let artifact: SyftArtifact = match serde_json::from_str(raw.get()) {
            Ok(a) => a,
            Err(e) => {
                warnings.push(ParseWarning {
                    file: file.to_string(),
                    message: format!("skipping unreadable artifact: {e}"),
                    field: Some("artifacts".to_string()),
                });
                continue;
            }
        };

        let mut comp = Component {
            name: artifact.name,
            version: artifact.version,
            purl: artifact.purl,
            package_type: artifact.kind,
            language: artifact.language,
            found_by: artifact.found_by,
            hashes: IndexMap::new(),
            raw_json: Some(raw),
            ..Component::default()
        };
        if let Some(deps) = artifact
            .metadata
            .as_ref()
            .and_then(|m| m.get("pullDependencies"))
            .and_then(Value::as_array)
        {
            comp.dependencies = deps
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
        }
        if let Some(licenses) = artifact.licenses {
            comp.licenses = string_list(&licenses, "value", file, "licenses", &mut warnings);
        }
        if let Some(cpes) = artifact.cpes {
            comp.cpes = string_list(&cpes, "cpe", file, "cpes", &mut warnings);
        }
        comp.assign_identity();
        components.push(comp);
    }

    Ok(Ingest {
        components,
        info,
        warnings,
    })
}

/// Collect strings from a field that is either an array of plain strings or
/// an array of objects carrying the value under `key`. Anything else gets a
/// field-level warning.
fn string_list(
    value: &Value,
    key: &str,
    file: &str,
    field: &str,
    warnings: &mut Vec<ParseWarning>,
) -> Vec<String> {
    let Some(entries) = value.as_array() else {
        warnings.push(ParseWarning {
            file: file.to_string(),
            message: format!("expected an array for artifact field '{field}'"),
            field: Some(field.to_string()),
        });
        return Vec::new();
    };

    let mut out = Vec::new();
    for entry in entries {
        match entry {
            Value::String(s) if !s.is_empty() => out.push(s.clone()),
            Value::Object(obj) => {
                if let Some(Value::String(s)) = obj.get(key) {
                    if !s.is_empty() {
                        out.push(s.clone());
                    }
                }
            }
            _ => {}
        }
    }
    out
}

/// Extract source and distro metadata.
///
/// `source.target` may be an object (image scans, with `userInput`) or a
/// plain string (directory and file scans). `distro.id` stands in for the
/// name only when the name is absent.
fn extract_info(
    source: Option<&Value>,
    distro: Option<&Value>,
    file: &str,
    warnings: &mut Vec<ParseWarning>,
) -> SbomInfo {
    let mut info = SbomInfo::default();

    if let Some(source) = source {
        if let Some(kind) = source.get("type").and_then(Value::as_str) {
            info.source_type = kind.to_string();
        }
        match source.get("target") {
            Some(Value::Object(target)) => {
                if let Some(Value::String(user_input)) = target.get("userInput") {
                    info.source_name = user_input.clone();
                }
            }
            Some(Value::String(target)) => {
                info.source_name = target.clone();
            }
            Some(_) => {
                warnings.push(ParseWarning {
                    file: file.to_string(),
                    message: "unrecognized shape for source.target".to_string(),
                    field: Some("source.target".to_string()),
                });
            }
            None => {}
        }
    }

    if let Some(distro) = distro {
        if let Some(obj) = distro.as_object() {
            let name = obj.get("name").and_then(Value::as_str).unwrap_or_default();
            let id = obj.get("id").and_then(Value::as_str).unwrap_or_default();
            info.os_name = if name.is_empty() {
                id.to_string()
            } else {
                name.to_string()
            };
            if let Some(version) = obj.get("version").and_then(Value::as_str) {
                info.os_version = version.to_string();
            }
        } else {
            warnings.push(ParseWarning {
                file: file.to_string(),
                message: "unrecognized shape for distro".to_string(),
                field: Some("distro".to_string()),
            });
        }
    }

    info
}
