//! `clinscribe`: run validated-generation batches from the command line.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clinscribe_core::{
    check_against_schema, clinical_output_schema, InputItem, PipelineState, RunReport, StateUpdate,
};
use clinscribe_runtime::{
    validate, BatchRunner, ClinicalPipeline, ProviderRegistry, RuntimeConfig,
};

mod inputs;

#[derive(Parser)]
#[command(name = "clinscribe")]
#[command(about = "Structured clinical analysis with validated LLM output")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every input file through the pipeline and save the report
    Run {
        /// Prompt template version (reads prompt_<version>.txt)
        #[arg(long, default_value = "v2")]
        prompt_version: String,

        /// Directory of *.txt inputs
        #[arg(long, default_value = "data/input")]
        input_dir: PathBuf,

        /// Template directory (overrides the config file)
        #[arg(long)]
        prompts_dir: Option<PathBuf>,

        /// Where to write the JSON report
        #[arg(long, short, default_value = "results.json")]
        output: PathBuf,

        /// YAML or JSON runtime config
        #[arg(long, short)]
        config: Option<PathBuf>,
    },

    /// Validate a saved model response
    Validate {
        /// File holding the raw response
        file: PathBuf,
    },

    /// Print the clinical output JSON Schema, or check a document against it
    Schema {
        /// JSON document to check
        #[arg(long)]
        check: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clinscribe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            prompt_version,
            input_dir,
            prompts_dir,
            output,
            config,
        } => {
            run(&prompt_version, &input_dir, prompts_dir, &output, config.as_deref()).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate { file } => Ok(exit_code(validate_file(&file)?)),
        Commands::Schema { check } => Ok(exit_code(schema(check.as_deref())?)),
    }
}

async fn run(
    prompt_version: &str,
    input_dir: &Path,
    prompts_dir: Option<PathBuf>,
    output: &Path,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => RuntimeConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RuntimeConfig::default(),
    };
    if let Some(dir) = prompts_dir {
        config.prompts_dir = dir;
    }

    let items = inputs::read_inputs(input_dir)?;
    if items.is_empty() {
        tracing::warn!(dir = %input_dir.display(), "No inputs found");
    }

    let pipeline = ClinicalPipeline::from_config(&config, &ProviderRegistry::with_defaults())
        .context("Failed to set up pipeline")?;
    if !pipeline.health_check().await {
        bail!(
            "Provider '{}' is not usable; check its credentials",
            pipeline.provider_name()
        );
    }
    let report = BatchRunner::new(pipeline).run(&items, prompt_version).await;

    save_report(&report, output)?;
    println!("Saved report to {}", output.display());
    println!("{}", summary(&report));
    Ok(())
}

/// `ok: N | failed: M`, followed by error counts per category when any.
fn summary(report: &RunReport) -> String {
    let mut line = format!("ok: {} | failed: {}", report.ok, report.failed);
    let counts = report.error_counts();
    if !counts.is_empty() {
        let parts: Vec<String> = counts
            .iter()
            .map(|(category, count)| format!("{}={}", category, count))
            .collect();
        line.push_str(&format!(" ({})", parts.join(", ")));
    }
    line
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn save_report(report: &RunReport, path: &Path) -> Result<()> {
    let json = report.to_json_pretty().context("Failed to serialize report")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Print the decoded output or the error list; `Ok(false)` when invalid.
fn validate_file(file: &Path) -> Result<bool> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let item = InputItem::new(name, "saved response")?;
    let state = PipelineState::new(item, "-").apply(StateUpdate::new().raw_response(Some(raw)));
    let update = validate(&state);
    let state = state.apply(update);

    match state.parsed_output() {
        Some(output) if state.errors().is_empty() => {
            println!("{}", serde_json::to_string_pretty(output)?);
            Ok(true)
        }
        _ => {
            for error in state.errors() {
                println!("{}", error);
            }
            Ok(false)
        }
    }
}

/// Print the schema, or check a document against it; `Ok(false)` when the
/// document does not conform.
fn schema(check: Option<&Path>) -> Result<bool> {
    let Some(path) = check else {
        let schema = clinical_output_schema()?;
        println!("{}", serde_json::to_string_pretty(schema)?);
        return Ok(true);
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    match check_against_schema(&document) {
        Ok(()) => {
            println!("{}: valid", path.display());
            Ok(true)
        }
        Err(errors) => {
            for error in errors {
                println!("{}", error);
            }
            Ok(false)
        }
    }
}
