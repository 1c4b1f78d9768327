//! dalgen CLI - compile a schema request into data-access layer sources
//!
//! Runs the schema compiler synchronously against a YAML or JSON request file.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use dalgen::codegen::{compile, load_request, validate_request, write_archive, write_artifacts, GenerationRequest};
use dalgen::error::ValidationError;

#[derive(Parser)]
#[command(name = "dalgen")]
#[command(version, about = "Generate data models, persistence contexts and data-access layers from a schema", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate sources from a request file
    Generate {
        /// Path to the request file (.yaml, .yml or .json)
        #[arg(short, long)]
        request: PathBuf,

        /// Output directory for generated sources
        #[arg(short, long, default_value = "generated")]
        output: PathBuf,

        /// Write <output>.zip instead of the output directory
        #[arg(short, long)]
        archive: bool,
    },

    /// Validate a request file without generating code
    Validate {
        /// Path to the request file (.yaml, .yml or .json)
        #[arg(short, long)]
        request: PathBuf,
    },

    /// Print a starter request as YAML
    Sample,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate { request, output, archive } => generate(request, output, archive),
        Commands::Validate { request } => validate(request),
        Commands::Sample => sample(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn generate(request_path: PathBuf, output: PathBuf, archive: bool) -> Result<(), String> {
    println!("📋 Loading request from {}...", request_path.display());
    let request = load_request(&request_path).map_err(|e| e.to_string())?;
    let tables = validate_request(&request).map_err(describe_validation)?;
    println!("  ✓ {} valid tables", tables.len());

    let files = compile(&request, &tables).map_err(|e| format!("Code generation failed: {}", e))?;

    if archive {
        let archive_path = output.with_extension("zip");
        let count = write_archive(&files, &archive_path).map_err(|e| e.to_string())?;
        println!("  ✓ {} files archived to {}", count, archive_path.display());
    } else {
        write_artifacts(&files, &output).map_err(|e| e.to_string())?;
        println!("  ✓ {} files written to {}", files.len(), output.display());
    }

    println!("✨ Code generation complete!");
    Ok(())
}

fn validate(request_path: PathBuf) -> Result<(), String> {
    println!("🔍 Validating {}...", request_path.display());
    let request = load_request(&request_path).map_err(|e| e.to_string())?;
    let tables = validate_request(&request).map_err(describe_validation)?;

    let skipped = request.tables.len() - tables.len();
    println!("  ✓ {} valid tables", tables.len());
    if skipped > 0 {
        println!("  ⚠ {} tables skipped (blank name or no properties)", skipped);
    }
    println!("✅ Request is valid!");
    Ok(())
}

fn sample() -> Result<(), String> {
    let yaml = serde_yaml::to_string(&GenerationRequest::sample())
        .map_err(|e| format!("Failed to serialize sample: {}", e))?;
    print!("{}", yaml);
    Ok(())
}

fn describe_validation(error: ValidationError) -> String {
    let mut message = error.to_string();
    for field in error.field_errors() {
        message.push_str(&format!("\n  - {}", field));
    }
    message
}
