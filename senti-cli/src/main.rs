#![warn(clippy::all)]
#![allow(clippy::pedantic)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use senti_common::config::Config;
use senti_common::logging::init_logging;
use senti_core::state::AppState;
use senti_core::{charts, export, parser};
use senti_core::{AnalysisSession, GeminiProvider, SentimentAnalyzer};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod render;

/// `senti` - sentiment analysis of text passages with Gemini.
#[derive(Parser, Debug)]
#[command(name = "senti")]
#[command(version)]
#[command(about = "Score the sentiment of every passage in a spreadsheet or text file.", long_about = None)]
struct Cli {
    /// Config file (default: ~/.senti/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a file and score every passage
    Analyze {
        /// Input file (.xlsx, .xls, .csv, .txt)
        file: PathBuf,

        /// Write the results as CSV (default name: sentiment_analysis_results.csv)
        #[arg(long, num_args = 0..=1, default_missing_value = export::DEFAULT_FILE_NAME)]
        export: Option<PathBuf>,

        /// Print the final state as JSON instead of tables and charts
        #[arg(long)]
        json: bool,

        /// Model to use (overrides llm.model)
        #[arg(long)]
        model: Option<String>,
    },

    /// Print the passages found in a file without scoring them
    Parse {
        /// Input file (.xlsx, .xls, .csv, .txt)
        file: PathBuf,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_with_env(cli.config.as_deref())?;
    init_logging(&config.observability);

    match cli.command {
        Commands::Analyze {
            file,
            export,
            json,
            model,
        } => {
            if let Some(model) = model {
                config.llm.model = model;
            }
            analyze(&config, &file, export.as_deref(), json).await
        }
        Commands::Parse { file } => parse(&file).await,
        Commands::Config => show_config(&config),
    }
}

fn file_name_of(path: &Path) -> Result<String> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("Not a file: {}", path.display()))?;

    if !parser::is_supported_file_name(&file_name) {
        bail!(
            "Unsupported file type: {file_name} (accepted: {})",
            parser::SUPPORTED_EXTENSIONS
                .iter()
                .map(|ext| format!(".{ext}"))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(file_name)
}

async fn analyze(config: &Config, file: &Path, export_to: Option<&Path>, json: bool) -> Result<()> {
    let file_name = file_name_of(file)?;
    config.validate().context("Invalid configuration")?;

    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let provider = Arc::new(GeminiProvider::from_config(
        &config.llm,
        config.gemini_api_key(),
    ));
    let session = AnalysisSession::new(SentimentAnalyzer::new(provider, &config.llm));

    let state = session.submit(&file_name, &bytes).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&state.view())?);
    }

    match &state {
        AppState::Completed { results, .. } => {
            if !json {
                println!("{file_name}: {} passages\n", results.len());
                println!("{}", render::results_table(results));
                println!("{}", render::distribution_chart(&charts::distribution(results)));
                println!("{}", render::scatter_chart(&charts::scatter(results)));
            }
            if let Some(path) = export_to {
                tokio::fs::write(path, export::to_csv(results))
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!("Results exported to {}", path.display());
            }
            Ok(())
        }
        AppState::Error { message, .. } => bail!("Analysis of {file_name} failed: {message}"),
        other => bail!("Run ended in unexpected state '{}'", other.status()),
    }
}

async fn parse(file: &Path) -> Result<()> {
    file_name_of(file)?;
    let passages = parser::parse_file(file)
        .await
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    for (index, passage) in passages.iter().enumerate() {
        println!("[{}] {passage}\n", index + 1);
    }
    eprintln!("{} passages", passages.len());
    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&config.redacted())?);

    match config.validate() {
        Ok(()) => println!("\nConfiguration is valid"),
        Err(e) => println!("\nConfiguration has problems: {e}"),
    }
    if config.gemini_api_key().is_none() {
        println!("No Gemini API key configured (set GEMINI_API_KEY)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analyze_flags() {
        let cli = Cli::try_parse_from([
            "senti",
            "--config",
            "/tmp/c.json",
            "analyze",
            "reviews.xlsx",
            "--json",
            "--model",
            "gemini-2.0-flash",
        ])
        .unwrap();

        assert_eq!(cli.config.as_deref(), Some(Path::new("/tmp/c.json")));
        match cli.command {
            Commands::Analyze {
                file,
                export,
                json,
                model,
            } => {
                assert_eq!(file, PathBuf::from("reviews.xlsx"));
                assert!(export.is_none());
                assert!(json);
                assert_eq!(model.as_deref(), Some("gemini-2.0-flash"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn bare_export_uses_default_name() {
        let cli = Cli::try_parse_from(["senti", "analyze", "a.txt", "--export"]).unwrap();
        let Commands::Analyze { export, .. } = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(export, Some(PathBuf::from("sentiment_analysis_results.csv")));
    }

    #[test]
    fn file_name_must_have_supported_extension() {
        assert_eq!(file_name_of(Path::new("/data/Reviews.XLSX")).unwrap(), "Reviews.XLSX");
        let err = file_name_of(Path::new("notes.pdf")).unwrap_err();
        assert!(err.to_string().contains(".xlsx, .xls, .csv, .txt"));
    }

    #[tokio::test]
    async fn parse_reads_passages_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.txt");
        std::fs::write(&path, "one\n\ntwo").unwrap();
        assert!(parse(&path).await.is_ok());

        let blank = dir.path().join("blank.txt");
        std::fs::write(&blank, "\n\n").unwrap();
        assert!(parse(&blank).await.is_err());
    }
}
