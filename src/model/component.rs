//! Core `Component` and `SbomInfo` data structures.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// A single package record in the canonical model.
///
/// Absent string fields are empty strings rather than `Option`s: the
/// identity precedence chain, the normalizer, and supplier-change detection
/// are all defined over emptiness, and the original documents omit fields
/// freely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Component {
    /// Canonical identity string (see [`compute_identity`]).
    ///
    /// Not guaranteed unique within one SBOM; duplicates are surfaced by
    /// the duplicate detector rather than collapsed here.
    ///
    /// [`compute_identity`]: crate::model::compute_identity
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub purl: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cpes: Vec<String>,
    /// Algorithm label (e.g. "SHA-256") to hex digest, in source order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub hashes: IndexMap<String, String>,
    /// Identity strings of declared dependencies. Edges may dangle when the
    /// document references a component it does not itself list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(rename = "bom-ref", default, skip_serializing_if = "String::is_empty")]
    pub bom_ref: String,
    #[serde(rename = "spdxid", default, skip_serializing_if = "String::is_empty")]
    pub spdx_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub supplier: String,
    /// Programming language, as reported by Syft.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub language: String,
    /// Scanner/cataloger that found this component.
    #[serde(rename = "foundBy", default, skip_serializing_if = "String::is_empty")]
    pub found_by: String,
    /// Package type from the SBOM (e.g. library, application).
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub package_type: String,
    /// The component's original serialization, captured at ingest time.
    /// Never read by the differ; UI collaborators re-parse it for display.
    #[serde(skip)]
    pub raw_json: Option<Box<RawValue>>,
}

impl Component {
    /// Create a component with just a name and version, for tests and
    /// programmatic construction. The identity is left empty until
    /// [`assign_identity`](Component::assign_identity) runs.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Compute and store the canonical identity from current fields.
    pub fn assign_identity(&mut self) {
        self.id = super::compute_identity(self);
    }

    /// Display name with version when available.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.version.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.version)
        }
    }
}

/// Metadata about the SBOM source, extracted by ingest and passed through
/// to presentation. The differ never reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SbomInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub os_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub os_version: String,
    /// e.g. "image", "directory", "file"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_type: String,
    /// e.g. "alpine:latest", "/path/to/dir"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_name: String,
}

impl SbomInfo {
    /// True when nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.os_name.is_empty()
            && self.os_version.is_empty()
            && self.source_type.is_empty()
            && self.source_name.is_empty()
    }
}
