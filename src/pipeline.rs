use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use crate::diag::{Diagnostic, DiagnosticsSink};
use crate::discover::{discover_tables, SourceFile};
use crate::merge::{MergeEngine, MergedOutputs, SkipReason};
use crate::offsets::{OffsetError, OffsetTable};
use crate::registry::{ModuleRegistry, RegistryError};
use crate::report::{generate_run_id, RunReport};
use crate::table::{read_table, write_table, TableError};

/// Everything a run needs to know: where to read, where to write, and which
/// columns carry the reference text.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory of per-module base tables.
    pub modules_dir: PathBuf,
    /// Directory of locale translation tables.
    pub translations_dir: PathBuf,
    /// Directory for merged outputs.
    pub output_dir: PathBuf,
    /// Reference-language column in module tables.
    pub reference_column: String,
    /// Reference-language column in locale tables.
    pub source_column: String,
}

/// Run-aborting failures. Nothing is written once one of these is raised.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("no locale tables found in {}", dir.display())]
    NoLocaleSources { dir: PathBuf },
    #[error("cannot read reference source '{locale}': {source}")]
    ReferenceSourceUnreadable {
        locale: String,
        source: TableError,
    },
    #[error("reference source '{locale}' missing column '{column}'")]
    MissingSourceColumn { locale: String, column: String },
    #[error(transparent)]
    Offsets(#[from] OffsetError),
    #[error("cannot create output directory: {0}")]
    OutputDir(std::io::Error),
    #[error("cannot scan translations directory: {0}")]
    Scan(std::io::Error),
}

/// Execute one full merge run.
///
/// Phases, in order: load modules, pick the reference source, recover
/// offsets, merge every locale source, write one output table per module.
/// Offset recovery is a hard gate — any fatal error before or during it
/// aborts the run with nothing written. After it, locale sources can only
/// be skipped and writes can only fail individually; the run always reaches
/// finalization.
pub fn run(config: &RunConfig, sink: &dyn DiagnosticsSink) -> Result<RunReport, FatalError> {
    let mut report = RunReport::new(generate_run_id());

    let registry = ModuleRegistry::load(&config.modules_dir, &config.reference_column, sink)?;
    report.modules = registry.modules().len();
    report.total_rows = registry.total_rows();

    let sources =
        discover_tables(&config.translations_dir).map_err(FatalError::Scan)?;
    if sources.is_empty() {
        return Err(FatalError::NoLocaleSources {
            dir: config.translations_dir.clone(),
        });
    }

    let reference = load_reference_sequence(&sources[0], &config.source_column, sink)?;
    let offsets = OffsetTable::build(&reference, &registry, sink)?;

    let engine = MergeEngine::new(&registry, &offsets, &config.source_column);
    let mut outputs = MergedOutputs::from_registry(&registry);

    for source in &sources {
        let locale = source.locale_code();
        sink.emit(
            Diagnostic::info(format!(
                "processing locale source {}",
                source.path.display()
            ))
            .with_locale(&locale),
        );

        let merged = read_table(&source.path)
            .map_err(SkipReason::from)
            .and_then(|table| engine.merge_locale(&locale, &table, &mut outputs, sink));

        match merged {
            Ok(outcome) => {
                report.alignment_warnings += outcome.alignment_warnings;
                report.locales_merged.push(outcome.locale);
            }
            Err(reason) => {
                sink.emit(Diagnostic::error(format!("skipping: {reason}")).with_locale(&locale));
                report.locales_skipped.push(locale);
            }
        }
    }

    fs::create_dir_all(&config.output_dir).map_err(FatalError::OutputDir)?;
    for (name, table) in outputs.into_tables() {
        let out_path = config.output_dir.join(format!("{name}_all_languages.csv"));
        match write_table(&out_path, &table) {
            Ok(()) => {
                report.tables_written += 1;
                sink.emit(
                    Diagnostic::info(format!("wrote merged table {}", out_path.display()))
                        .with_module(&name),
                );
            }
            Err(e) => {
                report.write_failures += 1;
                sink.emit(
                    Diagnostic::error(format!("failed to write {}: {e}", out_path.display()))
                        .with_module(&name),
                );
            }
        }
    }

    Ok(report)
}

/// Read the designated reference source (the first locale source) and
/// extract the concatenated reference-language column.
fn load_reference_sequence(
    source: &SourceFile,
    source_column: &str,
    sink: &dyn DiagnosticsSink,
) -> Result<Vec<String>, FatalError> {
    let locale = source.locale_code();
    sink.emit(
        Diagnostic::info(format!(
            "using '{}' to compute offsets",
            source.path.display()
        ))
        .with_locale(&locale),
    );

    let table = read_table(&source.path).map_err(|e| FatalError::ReferenceSourceUnreadable {
        locale: locale.clone(),
        source: e,
    })?;

    table
        .column_values(source_column)
        .ok_or(FatalError::MissingSourceColumn {
            locale,
            column: source_column.to_string(),
        })
}
