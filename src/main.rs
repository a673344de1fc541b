use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use locstitch::{
    pipeline::{run, RunConfig},
    report::{generate_run_id, RunReport},
    TracingSink,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Re-assemble per-module translation tables from concatenated locale files
#[derive(Parser, Debug)]
#[command(name = "locstitch")]
#[command(version = "0.1.0")]
#[command(about = "Recover module offsets and stitch locale columns onto module tables", long_about = None)]
struct Args {
    /// Directory of per-module base tables
    #[arg(short, long)]
    modules: PathBuf,

    /// Directory of locale translation tables
    #[arg(short, long)]
    translations: PathBuf,

    /// Directory for merged output tables
    #[arg(short, long)]
    output: PathBuf,

    /// Reference-language column in module tables
    #[arg(long, default_value = "English (US) [Primary]")]
    reference_column: String,

    /// Reference-language column in locale tables
    #[arg(long, default_value = "en_US")]
    source_column: String,

    /// Output a structured JSON report instead of human-readable
    #[arg(short, long)]
    json: bool,

    /// Also write log output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_tracing(log_file: Option<&PathBuf>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("locstitch=info"));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let file_layer = log_file.and_then(|path| match File::create(path) {
        Ok(file) => Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        ),
        Err(e) => {
            eprintln!("Failed to open log file '{}': {}", path.display(), e);
            None
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.log_file.as_ref());

    let config = RunConfig {
        modules_dir: args.modules,
        translations_dir: args.translations,
        output_dir: args.output,
        reference_column: args.reference_column,
        source_column: args.source_column,
    };

    let report = match run(&config, &TracingSink) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("{e}");
            let report = RunReport::failure(generate_run_id(), e.to_string());
            output_report(&report, args.json);
            std::process::exit(1);
        }
    };

    output_report(&report, args.json);

    if !report.success {
        std::process::exit(1);
    }
}

/// Format and output the run report
fn output_report(report: &RunReport, json_mode: bool) {
    let output = if json_mode {
        serde_json::to_string_pretty(report)
            .unwrap_or_else(|_| r#"{"error": "Failed to serialize report"}"#.to_string())
    } else if report.success {
        format!(
            "Merged {} locale(s) into {} module table(s)\nSkipped locales: {}\nAlignment warnings: {}\nTables written: {} ({} failed)",
            report.locales_merged.len(),
            report.modules,
            if report.locales_skipped.is_empty() {
                "none".to_string()
            } else {
                report.locales_skipped.join(", ")
            },
            report.alignment_warnings,
            report.tables_written,
            report.write_failures,
        )
    } else {
        format!(
            "Error: {}",
            report.error.as_deref().unwrap_or("Unknown error")
        )
    };

    println!("{output}");
}
