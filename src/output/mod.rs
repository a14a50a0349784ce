//! Report serializers.
//!
//! Every serializer consumes the same public surface: the [`DiffResult`],
//! the policy violations, and the parse warnings. None of them reach back
//! into the analysis pipeline.

mod json;
mod junit;
mod markdown;
mod patch;
mod sarif;
mod text;

pub use json::{render_json, render_stats_json};
pub use junit::render_junit;
pub use markdown::render_markdown;
pub use patch::render_patch;
pub use sarif::render_sarif;
pub use text::{render_stats_text, render_text};

use std::fmt;
use std::str::FromStr;

use crate::diff::DiffResult;
use crate::error::Result;
use crate::parsers::ParseWarning;
use crate::policy::Violation;

/// Supported report formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Sarif,
    Junit,
    Markdown,
    Patch,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "sarif" => Ok(Self::Sarif),
            "junit" => Ok(Self::Junit),
            "markdown" | "md" => Ok(Self::Markdown),
            "patch" => Ok(Self::Patch),
            other => Err(format!(
                "unknown format '{other}' (expected text, json, sarif, junit, markdown, or patch)"
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Sarif => "sarif",
            Self::Junit => "junit",
            Self::Markdown => "markdown",
            Self::Patch => "patch",
        };
        write!(f, "{name}")
    }
}

/// Everything a serializer gets to see.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub diff: &'a DiffResult,
    pub violations: &'a [Violation],
    pub warnings: &'a [ParseWarning],
    /// Path of the candidate SBOM, used for SARIF artifact locations.
    pub sbom_file: &'a str,
}

/// Render a diff report in the requested format.
pub fn render(format: OutputFormat, input: &RenderInput<'_>) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(input)),
        OutputFormat::Json => render_json(input),
        OutputFormat::Sarif => render_sarif(input),
        OutputFormat::Junit => Ok(render_junit(input)),
        OutputFormat::Markdown => Ok(render_markdown(input)),
        OutputFormat::Patch => render_patch(input.diff),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_round_trip() {
        for name in ["text", "json", "sarif", "junit", "markdown", "patch"] {
            let format: OutputFormat = name.parse().expect("parse");
            assert_eq!(format.to_string(), name);
        }
    }

    #[test]
    fn md_alias() {
        assert_eq!("md".parse::<OutputFormat>(), Ok(OutputFormat::Markdown));
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
