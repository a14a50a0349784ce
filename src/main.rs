//! sbom-drift: policy-driven SBOM drift detection for CI pipelines.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use sbom_drift::normalize::normalize_components;
use sbom_drift::output::{
    render, render_stats_json, render_stats_text, OutputFormat, RenderInput,
};
use sbom_drift::parsers::{ingest_with_options, ParseOptions};
use sbom_drift::policy::{evaluate, has_errors, Policy, Violation};
use sbom_drift::stats::compute_stats;
use sbom_drift::{diff_components, Component};

#[derive(Parser)]
#[command(name = "sbom-drift")]
#[command(version)]
#[command(about = "Compare SBOMs and enforce supply-chain policy", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  No changes and no policy errors
    1  Changes detected or a policy rule of error severity fired

EXAMPLES:
    # Diff two SBOMs
    sbom-drift baseline.json candidate.json

    # CI gate with a policy
    sbom-drift baseline.json candidate.json --policy policy.json --format sarif

    # Inspect a single SBOM
    sbom-drift sbom.json --json")]
struct Cli {
    /// One SBOM for statistics, or two (baseline, candidate) for a diff
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Shorthand for --format json
    #[arg(long)]
    json: bool,

    /// Policy file to evaluate the diff against
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Fail on the first parse error instead of collecting warnings
    #[arg(long, conflicts_with = "tolerant")]
    strict: bool,

    /// Collect parse warnings and continue (default)
    #[arg(long)]
    tolerant: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("sbom_drift=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sbom_drift=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let format: OutputFormat = if cli.json {
        OutputFormat::Json
    } else {
        cli.format
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?
    };

    let mut opts = if cli.strict {
        ParseOptions::strict()
    } else {
        ParseOptions::tolerant()
    };

    match cli.files.as_slice() {
        [file] => {
            let comps = load_components(file, &mut opts)?;
            let stats = compute_stats(&comps);
            let rendered = match format {
                OutputFormat::Json => render_stats_json(&stats, &opts.warnings)?,
                _ => render_stats_text(&stats, &opts.warnings),
            };
            print!("{rendered}");
            Ok(ExitCode::SUCCESS)
        }
        [before_file, after_file] => {
            let before = load_components(before_file, &mut opts)?;
            let after = load_components(after_file, &mut opts)?;

            let result = diff_components(&before, &after);

            let violations: Vec<Violation> = match &cli.policy {
                Some(path) => {
                    let data = std::fs::read(path)
                        .with_context(|| format!("reading policy file {}", path.display()))?;
                    let policy = Policy::from_json(&data)?;
                    evaluate(&policy, &result)
                }
                None => Vec::new(),
            };

            let rendered = render(
                format,
                &RenderInput {
                    diff: &result,
                    violations: &violations,
                    warnings: &opts.warnings,
                    sbom_file: &after_file.display().to_string(),
                },
            )?;
            print!("{rendered}");

            // Non-zero on any difference or any error-severity violation.
            if !result.is_empty() || has_errors(&violations) {
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        files => bail!(
            "expected 1 or 2 SBOM files, got {} (usage: sbom-drift <baseline> [candidate])",
            files.len()
        ),
    }
}

fn load_components(path: &PathBuf, opts: &mut ParseOptions) -> Result<Vec<Component>> {
    let data =
        std::fs::read(path).with_context(|| format!("reading SBOM file {}", path.display()))?;
    let file = path.display().to_string();
    let ingested = ingest_with_options(&data, &file, opts)
        .with_context(|| format!("parsing {file}"))?;
    Ok(normalize_components(ingested.components))
}
