use std::collections::BTreeMap;

use thiserror::Error;

use crate::diag::{Diagnostic, DiagnosticsSink};
use crate::locate::find_subsequence;
use crate::registry::ModuleRegistry;

/// Half-open row range `[start, end)` inside the reference sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offset {
    pub start: usize,
    pub end: usize,
}

impl Offset {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    fn overlaps(&self, other: &Offset) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Error types for offset recovery
#[derive(Debug, Error)]
pub enum OffsetError {
    #[error("reference sequence has {found} rows but modules total {expected}")]
    RowCountMismatch { expected: usize, found: usize },
    #[error("cannot locate module '{module}' inside the reference sequence")]
    ModuleNotLocatable { module: String },
}

/// Recovered offsets, one per module. Read-only once built.
#[derive(Debug)]
pub struct OffsetTable {
    entries: BTreeMap<String, Offset>,
}

impl OffsetTable {
    /// Recover every module's offset inside `reference`.
    ///
    /// Precondition, checked before any matching: the reference length must
    /// equal the sum of all modules' row counts.
    ///
    /// Each module is searched independently from position 0 — there is no
    /// advancing cursor between modules, so two modules whose reference
    /// lists share content can land on overlapping ranges. Overlaps are
    /// reported as warnings; the leftmost match itself is never altered.
    ///
    /// Any module that cannot be located fails the whole build; no partial
    /// table is produced.
    pub fn build(
        reference: &[String],
        registry: &ModuleRegistry,
        sink: &dyn DiagnosticsSink,
    ) -> Result<Self, OffsetError> {
        if reference.len() != registry.total_rows() {
            return Err(OffsetError::RowCountMismatch {
                expected: registry.total_rows(),
                found: reference.len(),
            });
        }

        let mut entries = BTreeMap::new();
        for module in registry.modules() {
            let Some(start) = find_subsequence(reference, &module.reference, 0) else {
                return Err(OffsetError::ModuleNotLocatable {
                    module: module.name.clone(),
                });
            };

            let offset = Offset {
                start,
                end: start + module.reference.len(),
            };
            sink.emit(
                Diagnostic::info(format!(
                    "computed offsets: ({}, {})",
                    offset.start, offset.end
                ))
                .with_module(&module.name),
            );
            entries.insert(module.name.clone(), offset);
        }

        let table = Self { entries };
        table.warn_overlaps(sink);
        Ok(table)
    }

    fn warn_overlaps(&self, sink: &dyn DiagnosticsSink) {
        let mut ranges: Vec<(&String, &Offset)> = self.entries.iter().collect();
        ranges.sort_by_key(|(_, offset)| (offset.start, offset.end));

        for pair in ranges.windows(2) {
            let (first_name, first) = pair[0];
            let (second_name, second) = pair[1];
            if first.overlaps(second) {
                sink.emit(Diagnostic::warning(format!(
                    "offset ranges overlap: '{first_name}' ({}, {}) and '{second_name}' ({}, {})",
                    first.start, first.end, second.start, second.end
                )));
            }
        }
    }

    pub fn get(&self, module: &str) -> Option<Offset> {
        self.entries.get(module).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Offset)> {
        self.entries.iter()
    }
}
