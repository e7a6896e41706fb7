//! titulus - Latin funerary inscription entity extraction CLI
//!
//! Usage examples:
//!   titulus extract "D M GAIVS IVLIVS CAESAR"
//!   titulus extract --report "VIBIUS PAULUS PATER FECIT"
//!   titulus batch --input inscriptions.csv --output entities.json
//!   titulus batch --input corpus.json --output flat.csv --output-format csv

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use titulus::{ExtractOptions, FinalEntity, HybridExtractor};
use titulus_core::{Error, Result};

#[derive(Parser)]
#[command(name = "titulus", version, about = "Entity extraction for Latin funerary inscriptions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

/// Extraction flags shared by both subcommands.
#[derive(clap::Args)]
struct PhaseArgs {
    /// Disable the grammar template phase
    #[arg(long)]
    no_grammar: bool,

    /// Enable the morphology phase (needs an external analyzer;
    /// contributes nothing without one)
    #[arg(long)]
    use_morphology: bool,

    /// Enable the dependency phase (needs an external analyzer;
    /// contributes nothing without one)
    #[arg(long)]
    use_dependencies: bool,

    /// Minimum confidence for an entity to be emitted
    #[arg(long, default_value_t = 0.5)]
    confidence_threshold: f64,

    /// Keep sub-threshold entities, marked ambiguous
    #[arg(long)]
    flag_ambiguous: bool,

    /// Attach agreement and source-phase metadata to each entity
    #[arg(long)]
    verbose_entities: bool,
}

impl PhaseArgs {
    fn to_options(&self) -> ExtractOptions {
        ExtractOptions::default()
            .with_grammar(!self.no_grammar)
            .with_morphology(self.use_morphology)
            .with_dependencies(self.use_dependencies)
            .with_confidence_threshold(self.confidence_threshold)
            .with_flag_ambiguous(self.flag_ambiguous)
            .with_verbose(self.verbose_entities)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract entities from one inscription text
    Extract {
        /// Inscription text (transcription, any orthography)
        text: String,

        /// Emit the full diagnostic report instead of the entity map
        #[arg(long)]
        report: bool,

        #[command(flatten)]
        phases: PhaseArgs,
    },
    /// Process a CSV or JSON file of inscriptions
    Batch {
        /// Input file (.csv with a header row, or .json)
        #[arg(long)]
        input: PathBuf,

        /// Output file
        #[arg(long)]
        output: PathBuf,

        /// Output format; inferred from the output extension when omitted
        #[arg(long, value_enum)]
        output_format: Option<OutputFormat>,

        /// Column/field holding the inscription text
        #[arg(long, default_value = "text")]
        text_column: String,

        #[command(flatten)]
        phases: PhaseArgs,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Extract {
            text,
            report,
            phases,
        } => {
            let extractor = HybridExtractor::new();
            let options = phases.to_options();
            let json = if report {
                let report = extractor.extraction_report(&text, &options)?;
                serde_json::to_string_pretty(&report).map_err(|e| Error::parse(e.to_string()))?
            } else {
                let entities = extractor.extract(&text, &options)?;
                serde_json::to_string_pretty(&entities).map_err(|e| Error::parse(e.to_string()))?
            };
            println!("{json}");
            Ok(())
        }
        Commands::Batch {
            input,
            output,
            output_format,
            text_column,
            phases,
        } => {
            let texts = read_texts(&input, &text_column)?;
            log::debug!("read {} inscription(s) from {}", texts.len(), input.display());
            let extractor = HybridExtractor::new();
            let results = extractor.extract_batch(&texts, &phases.to_options())?;

            let format = output_format.unwrap_or_else(|| infer_format(&output));
            match format {
                OutputFormat::Json => write_json(&output, &results)?,
                OutputFormat::Csv => write_csv(&output, &results)?,
            }
            eprintln!("Processed {} inscription(s) -> {}", texts.len(), output.display());
            Ok(())
        }
    }
}

fn infer_format(path: &Path) -> OutputFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => OutputFormat::Csv,
        _ => OutputFormat::Json,
    }
}

/// Pull the inscription texts out of a CSV or JSON input file.
fn read_texts(path: &Path, text_column: &str) -> Result<Vec<String>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => read_csv_texts(path, text_column),
        Some("json") => read_json_texts(path, text_column),
        _ => Err(Error::parse(format!(
            "unsupported input extension for {}, expected .csv or .json",
            path.display()
        ))),
    }
}

fn read_csv_texts(path: &Path, text_column: &str) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| Error::parse(e.to_string()))?;
    let headers = reader
        .headers()
        .map_err(|e| Error::parse(e.to_string()))?
        .clone();
    let column = headers
        .iter()
        .position(|h| h == text_column)
        .ok_or_else(|| Error::parse(format!("input CSV has no column named {text_column:?}")))?;

    let mut texts = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::parse(e.to_string()))?;
        texts.push(record.get(column).unwrap_or_default().to_string());
    }
    Ok(texts)
}

fn read_json_texts(path: &Path, text_column: &str) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&raw).map_err(|e| Error::parse(e.to_string()))?;

    let field_of = |obj: &Value| -> Result<String> {
        obj.get(text_column)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::parse(format!("JSON record missing string field {text_column:?}")))
    };

    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => field_of(other),
            })
            .collect(),
        other => Ok(vec![field_of(&other)?]),
    }
}

fn write_json(path: &Path, results: &[BTreeMap<String, FinalEntity>]) -> Result<()> {
    let json = serde_json::to_string_pretty(results).map_err(|e| Error::parse(e.to_string()))?;
    fs::write(path, json)?;
    Ok(())
}

/// One row per extracted entity, keyed by input record index.
fn write_csv(path: &Path, results: &[BTreeMap<String, FinalEntity>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| Error::parse(e.to_string()))?;
    writer
        .write_record(["record", "entity", "value", "confidence", "ambiguous"])
        .map_err(|e| Error::parse(e.to_string()))?;
    for (index, entities) in results.iter().enumerate() {
        for (key, entity) in entities {
            writer
                .write_record([
                    index.to_string(),
                    key.clone(),
                    entity.value.clone(),
                    format!("{:.2}", entity.confidence.get()),
                    entity.ambiguous.to_string(),
                ])
                .map_err(|e| Error::parse(e.to_string()))?;
        }
    }
    writer.flush()?;
    Ok(())
}
