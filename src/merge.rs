use thiserror::Error;

use crate::diag::{Diagnostic, DiagnosticsSink};
use crate::offsets::OffsetTable;
use crate::registry::ModuleRegistry;
use crate::table::{Table, TableError};

/// Why an entire locale source was skipped.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("failed to read table: {0}")]
    Unreadable(#[from] TableError),
    #[error("missing required column '{column}'")]
    MissingReferenceColumn { column: String },
    #[error("expected exactly one translated-text column, found {found:?}")]
    TranslatedColumnCount { found: Vec<String> },
    #[error("has {found} rows but expected {expected}")]
    RowCountMismatch { expected: usize, found: usize },
}

/// Outcome of merging one locale source.
#[derive(Debug)]
pub struct LocaleOutcome {
    pub locale: String,
    /// Modules whose sliced reference text disagreed with the authoritative
    /// reference list. Their columns were still written.
    pub alignment_warnings: usize,
}

/// The per-module accumulating output tables.
///
/// Initialized as copies of the base tables, in registry order; each merged
/// locale appends (or overwrites) one column per table. Owned here, mutated
/// only through [`MergeEngine::merge_locale`], and consumed once at
/// finalization.
#[derive(Debug)]
pub struct MergedOutputs {
    tables: Vec<(String, Table)>,
}

impl MergedOutputs {
    pub fn from_registry(registry: &ModuleRegistry) -> Self {
        Self {
            tables: registry
                .modules()
                .iter()
                .map(|m| (m.name.clone(), m.base.clone()))
                .collect(),
        }
    }

    fn get_mut(&mut self, module: &str) -> Option<&mut Table> {
        self.tables
            .iter_mut()
            .find(|(name, _)| name == module)
            .map(|(_, table)| table)
    }

    pub fn get(&self, module: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|(name, _)| name == module)
            .map(|(_, table)| table)
    }

    /// Finalized tables in registry order.
    pub fn into_tables(self) -> Vec<(String, Table)> {
        self.tables
    }
}

/// Slices locale sources at the recovered offsets and appends their
/// translated column onto each module's output table.
pub struct MergeEngine<'a> {
    registry: &'a ModuleRegistry,
    offsets: &'a OffsetTable,
    /// Name of the reference column inside locale sources.
    source_column: &'a str,
}

impl<'a> MergeEngine<'a> {
    pub fn new(
        registry: &'a ModuleRegistry,
        offsets: &'a OffsetTable,
        source_column: &'a str,
    ) -> Self {
        Self {
            registry,
            offsets,
            source_column,
        }
    }

    /// Merge one locale source into `outputs`.
    ///
    /// Validates shape first: the reference column must be present, exactly
    /// one other column must exist, and the row count must equal the total
    /// module row count. Any of these failing rejects the whole source via
    /// `Err(SkipReason)` — the caller logs it and moves on to the next
    /// locale.
    ///
    /// Per module, the slice's reference text is compared row-by-row against
    /// the module's authoritative list. A mismatch is reported as a warning
    /// and the translated column is appended anyway — offsets, once
    /// computed, are trusted over content; the check only surfaces upstream
    /// data-quality problems.
    pub fn merge_locale(
        &self,
        locale: &str,
        source: &Table,
        outputs: &mut MergedOutputs,
        sink: &dyn DiagnosticsSink,
    ) -> Result<LocaleOutcome, SkipReason> {
        if source.column_index(self.source_column).is_none() {
            return Err(SkipReason::MissingReferenceColumn {
                column: self.source_column.to_string(),
            });
        }

        let candidates: Vec<String> = source
            .columns
            .iter()
            .filter(|c| c.as_str() != self.source_column)
            .cloned()
            .collect();
        if candidates.len() != 1 {
            return Err(SkipReason::TranslatedColumnCount { found: candidates });
        }
        let translated_column = &candidates[0];

        let expected = self.registry.total_rows();
        if source.row_count() != expected {
            return Err(SkipReason::RowCountMismatch {
                expected,
                found: source.row_count(),
            });
        }

        let mut alignment_warnings = 0;
        for module in self.registry.modules() {
            let Some(offset) = self.offsets.get(&module.name) else {
                continue;
            };

            let slice = source.slice(offset.start, offset.end);
            let slice_reference = slice.column_values(self.source_column).unwrap_or_default();

            if slice_reference != module.reference {
                alignment_warnings += 1;
                sink.emit(
                    Diagnostic::warning(format!(
                        "reference text mismatch; first base rows: {:?}, first slice rows: {:?}",
                        preview(&module.reference),
                        preview(&slice_reference),
                    ))
                    .with_module(&module.name)
                    .with_locale(locale),
                );
            }

            let translated = slice.column_values(translated_column).unwrap_or_default();
            let Some(output) = outputs.get_mut(&module.name) else {
                continue;
            };
            if let Err(e) = output.set_column(locale, translated) {
                sink.emit(
                    Diagnostic::error(format!("cannot append locale column: {e}"))
                        .with_module(&module.name)
                        .with_locale(locale),
                );
                continue;
            }

            sink.emit(
                Diagnostic::info(format!("appended locale column ({} rows)", offset.len()))
                    .with_module(&module.name)
                    .with_locale(locale),
            );
        }

        Ok(LocaleOutcome {
            locale: locale.to_string(),
            alignment_warnings,
        })
    }
}

/// First few rows, for mismatch diagnostics.
fn preview(rows: &[String]) -> &[String] {
    &rows[..rows.len().min(3)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::{MemorySink, Severity};
    use crate::offsets::OffsetTable;
    use crate::registry::Module;

    const SOURCE_COL: &str = "en_US";

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn module(name: &str, reference: &[&str]) -> Module {
        let reference = strings(reference);
        let mut base = Table::new(vec!["English (US) [Primary]".to_string()]);
        base.rows = reference.iter().map(|s| vec![s.clone()]).collect();
        Module {
            name: name.to_string(),
            base,
            reference,
        }
    }

    fn locale_table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table {
            columns: strings(columns),
            rows: rows.iter().map(|r| strings(r)).collect(),
        }
    }

    fn setup() -> (ModuleRegistry, Vec<String>) {
        let registry = ModuleRegistry::from_modules(vec![
            module("A", &["hello", "world"]),
            module("B", &["foo"]),
        ]);
        let reference = strings(&["foo", "hello", "world"]);
        (registry, reference)
    }

    #[test]
    fn test_merge_appends_sliced_column_per_module() {
        let (registry, reference) = setup();
        let sink = MemorySink::new();
        let offsets = OffsetTable::build(&reference, &registry, &sink).unwrap();
        let engine = MergeEngine::new(&registry, &offsets, SOURCE_COL);
        let mut outputs = MergedOutputs::from_registry(&registry);

        let source = locale_table(
            &[SOURCE_COL, "Translation"],
            &[&["foo", "F"], &["hello", "H"], &["world", "W"]],
        );
        let outcome = engine
            .merge_locale("de_de", &source, &mut outputs, &sink)
            .unwrap();

        assert_eq!(outcome.alignment_warnings, 0);
        let a = outputs.get("A").unwrap();
        assert_eq!(a.column_values("de_de").unwrap(), vec!["H", "W"]);
        let b = outputs.get("B").unwrap();
        assert_eq!(b.column_values("de_de").unwrap(), vec!["F"]);
    }

    #[test]
    fn test_two_candidate_columns_skips_locale() {
        let (registry, reference) = setup();
        let sink = MemorySink::new();
        let offsets = OffsetTable::build(&reference, &registry, &sink).unwrap();
        let engine = MergeEngine::new(&registry, &offsets, SOURCE_COL);
        let mut outputs = MergedOutputs::from_registry(&registry);

        let source = locale_table(
            &[SOURCE_COL, "Translation", "Reviewer"],
            &[
                &["foo", "F", "x"],
                &["hello", "H", "y"],
                &["world", "W", "z"],
            ],
        );
        let result = engine.merge_locale("de_de", &source, &mut outputs, &sink);

        match result {
            Err(SkipReason::TranslatedColumnCount { found }) => {
                assert_eq!(found, vec!["Translation", "Reviewer"]);
            }
            _ => panic!("Expected SkipReason::TranslatedColumnCount"),
        }
        // no module gained a column
        assert!(outputs.get("A").unwrap().column_values("de_de").is_none());
        assert!(outputs.get("B").unwrap().column_values("de_de").is_none());
    }

    #[test]
    fn test_zero_candidate_columns_skips_locale() {
        let (registry, reference) = setup();
        let sink = MemorySink::new();
        let offsets = OffsetTable::build(&reference, &registry, &sink).unwrap();
        let engine = MergeEngine::new(&registry, &offsets, SOURCE_COL);
        let mut outputs = MergedOutputs::from_registry(&registry);

        let source = locale_table(&[SOURCE_COL], &[&["foo"], &["hello"], &["world"]]);
        let result = engine.merge_locale("de_de", &source, &mut outputs, &sink);
        assert!(matches!(
            result,
            Err(SkipReason::TranslatedColumnCount { found }) if found.is_empty()
        ));
    }

    #[test]
    fn test_missing_reference_column_skips_locale() {
        let (registry, reference) = setup();
        let sink = MemorySink::new();
        let offsets = OffsetTable::build(&reference, &registry, &sink).unwrap();
        let engine = MergeEngine::new(&registry, &offsets, SOURCE_COL);
        let mut outputs = MergedOutputs::from_registry(&registry);

        let source = locale_table(&["other", "Translation"], &[&["foo", "F"]]);
        let result = engine.merge_locale("de_de", &source, &mut outputs, &sink);
        assert!(matches!(
            result,
            Err(SkipReason::MissingReferenceColumn { column }) if column == SOURCE_COL
        ));
    }

    #[test]
    fn test_row_count_mismatch_skips_locale() {
        let (registry, reference) = setup();
        let sink = MemorySink::new();
        let offsets = OffsetTable::build(&reference, &registry, &sink).unwrap();
        let engine = MergeEngine::new(&registry, &offsets, SOURCE_COL);
        let mut outputs = MergedOutputs::from_registry(&registry);

        let source = locale_table(&[SOURCE_COL, "Translation"], &[&["foo", "F"]]);
        let result = engine.merge_locale("de_de", &source, &mut outputs, &sink);
        match result {
            Err(SkipReason::RowCountMismatch { expected, found }) => {
                assert_eq!(expected, 3);
                assert_eq!(found, 1);
            }
            _ => panic!("Expected SkipReason::RowCountMismatch"),
        }
    }

    #[test]
    fn test_reference_mismatch_warns_but_column_is_still_written() {
        let (registry, reference) = setup();
        let sink = MemorySink::new();
        let offsets = OffsetTable::build(&reference, &registry, &sink).unwrap();
        let engine = MergeEngine::new(&registry, &offsets, SOURCE_COL);
        let mut outputs = MergedOutputs::from_registry(&registry);

        // module A's slice reads "hallo" instead of "hello"
        let source = locale_table(
            &[SOURCE_COL, "Translation"],
            &[&["foo", "F"], &["hallo", "H"], &["world", "W"]],
        );
        let outcome = engine
            .merge_locale("de_de", &source, &mut outputs, &sink)
            .unwrap();

        assert_eq!(outcome.alignment_warnings, 1);
        let warnings = sink.with_severity(Severity::Warning);
        let mismatch: Vec<_> = warnings
            .iter()
            .filter(|d| d.message.contains("mismatch"))
            .collect();
        assert_eq!(mismatch.len(), 1);
        assert_eq!(mismatch[0].module.as_deref(), Some("A"));
        assert_eq!(mismatch[0].locale.as_deref(), Some("de_de"));

        // the column still arrives, unaltered
        let a = outputs.get("A").unwrap();
        assert_eq!(a.column_values("de_de").unwrap(), vec!["H", "W"]);
    }

    #[test]
    fn test_rerun_overwrites_same_locale_column() {
        let (registry, reference) = setup();
        let sink = MemorySink::new();
        let offsets = OffsetTable::build(&reference, &registry, &sink).unwrap();
        let engine = MergeEngine::new(&registry, &offsets, SOURCE_COL);
        let mut outputs = MergedOutputs::from_registry(&registry);

        let source = locale_table(
            &[SOURCE_COL, "Translation"],
            &[&["foo", "F"], &["hello", "H"], &["world", "W"]],
        );
        engine
            .merge_locale("de_de", &source, &mut outputs, &sink)
            .unwrap();
        let columns_before = outputs.get("A").unwrap().columns.len();
        engine
            .merge_locale("de_de", &source, &mut outputs, &sink)
            .unwrap();

        let a = outputs.get("A").unwrap();
        assert_eq!(a.columns.len(), columns_before);
        assert_eq!(a.column_values("de_de").unwrap(), vec!["H", "W"]);
    }
}
