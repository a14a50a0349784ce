//! SBOM ingestion.
//!
//! Three dialects, one contract: a byte buffer goes in, canonical
//! components plus source metadata plus warnings come out. Dialect
//! detection is content-based — there is no MIME negotiation — and the
//! first matching test wins, in the order CycloneDX, SPDX, Syft.

mod cyclonedx;
mod spdx;
mod syft;

pub use cyclonedx::parse_cyclonedx;
pub use spdx::parse_spdx;
pub use syft::parse_syft;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Component, SbomInfo};

/// Errors that can occur during SBOM ingestion.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseError {
    /// None of the dialect detectors matched.
    #[error("unknown SBOM format - expected CycloneDX, SPDX, or Syft markers")]
    UnknownFormat,

    /// A dialect was detected but the outer document failed to decode.
    #[error("malformed {dialect} document: {message}")]
    Malformed {
        dialect: &'static str,
        message: String,
    },
}

/// SBOM dialects this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    CycloneDx,
    Spdx,
    Syft,
}

impl Dialect {
    /// Human-readable dialect name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CycloneDx => "CycloneDX",
            Self::Spdx => "SPDX",
            Self::Syft => "Syft",
        }
    }
}

/// A non-fatal issue found during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    pub file: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Controls ingest behavior across files.
///
/// In strict mode the first ingest error aborts the run; in tolerant mode
/// (the default) errors become warnings and the file contributes whatever
/// could be parsed, possibly nothing.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub strict: bool,
    pub warnings: Vec<ParseWarning>,
}

impl ParseOptions {
    /// Tolerant options with no warnings collected yet.
    #[must_use]
    pub fn tolerant() -> Self {
        Self::default()
    }

    /// Strict options: fail on the first ingest error.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict: true,
            warnings: Vec::new(),
        }
    }

    /// Record a warning against a file, optionally scoped to a field.
    pub fn add_warning(
        &mut self,
        file: impl Into<String>,
        message: impl Into<String>,
        field: Option<String>,
    ) {
        self.warnings.push(ParseWarning {
            file: file.into(),
            message: message.into(),
            field,
        });
    }
}

/// Result of ingesting one SBOM document.
#[derive(Debug, Default)]
pub struct Ingest {
    pub components: Vec<Component>,
    pub info: SbomInfo,
    pub warnings: Vec<ParseWarning>,
}

/// Detect the SBOM dialect from raw document text.
///
/// Detection is substring-based and ordered; the first matching test wins.
#[must_use]
pub fn detect_dialect(content: &str) -> Option<Dialect> {
    if content.contains("\"bomFormat\"")
        || (content.contains("\"$schema\"") && content.contains("cyclonedx"))
    {
        return Some(Dialect::CycloneDx);
    }
    if content.contains("\"spdxVersion\"") || content.contains("\"SPDXID\"") {
        return Some(Dialect::Spdx);
    }
    if content.contains("\"artifacts\"") {
        return Some(Dialect::Syft);
    }
    None
}

/// Ingest an SBOM document from a byte buffer.
///
/// The buffer is presumed UTF-8 JSON in one of the three dialects; invalid
/// UTF-8 sequences are replaced rather than rejected. `file` is only used
/// to attribute warnings.
pub fn ingest(data: &[u8], file: &str) -> Result<Ingest, ParseError> {
    let content = String::from_utf8_lossy(data);
    let dialect = detect_dialect(&content).ok_or(ParseError::UnknownFormat)?;
    tracing::debug!(file, dialect = dialect.name(), "detected SBOM dialect");

    let mut ingested = match dialect {
        Dialect::CycloneDx => parse_cyclonedx(&content, file)?,
        Dialect::Spdx => parse_spdx(&content, file)?,
        Dialect::Syft => parse_syft(&content, file)?,
    };

    drop_empty_identities(&mut ingested, file);
    Ok(ingested)
}

/// Ingest a file under the given options: strict mode propagates the error,
/// tolerant mode records a warning and yields an empty component list.
pub fn ingest_with_options(
    data: &[u8],
    file: &str,
    opts: &mut ParseOptions,
) -> Result<Ingest, ParseError> {
    match ingest(data, file) {
        Ok(mut ingested) => {
            opts.warnings.append(&mut ingested.warnings);
            Ok(Ingest {
                warnings: Vec::new(),
                ..ingested
            })
        }
        Err(err) if !opts.strict => {
            tracing::warn!(file, error = %err, "ingest failed, continuing in tolerant mode");
            opts.add_warning(file, err.to_string(), None);
            Ok(Ingest::default())
        }
        Err(err) => Err(err),
    }
}

/// Remove components whose identity came out empty (no identifiers and no
/// name), recording a field-level warning for each.
fn drop_empty_identities(ingested: &mut Ingest, file: &str) {
    let before = ingested.components.len();
    let warnings = &mut ingested.warnings;
    ingested.components.retain(|c| {
        if c.id.is_empty() {
            warnings.push(ParseWarning {
                file: file.to_string(),
                message: "component has no identifiers and no name, dropped".to_string(),
                field: Some("name".to_string()),
            });
            false
        } else {
            true
        }
    });
    let dropped = before - ingested.components.len();
    if dropped > 0 {
        tracing::warn!(file, dropped, "dropped components with empty identity");
    }
}
