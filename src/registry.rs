use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::diag::{Diagnostic, DiagnosticsSink};
use crate::discover::discover_tables;
use crate::table::{read_table, Table, TableError};

/// One named unit of reference-language content.
#[derive(Debug, Clone)]
pub struct Module {
    /// Module identifier, from the source file stem with case preserved.
    pub name: String,
    /// The module's base table as loaded from disk.
    pub base: Table,
    /// The reference-language strings, one per row of `base`.
    pub reference: Vec<String>,
}

/// Error types for module loading
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no module tables found in {}", dir.display())]
    NoModuleSources { dir: PathBuf },
    #[error("cannot load module '{module}': {source}")]
    ModuleUnreadable {
        module: String,
        source: TableError,
    },
    #[error("module '{module}' missing column '{column}'")]
    MissingReferenceColumn { module: String, column: String },
    #[error("cannot scan module directory: {0}")]
    Scan(#[from] std::io::Error),
}

/// Owns the authoritative per-module base tables and reference lists.
///
/// Loaded once, before offset computation; immutable afterward. Modules are
/// kept in discovery order (case-insensitive by file stem).
#[derive(Debug)]
pub struct ModuleRegistry {
    modules: Vec<Module>,
    total_rows: usize,
}

impl ModuleRegistry {
    /// Load every module table in `dir`.
    ///
    /// Any unreadable file or missing reference column aborts the load; a
    /// partial registry is never produced.
    pub fn load(
        dir: &Path,
        reference_column: &str,
        sink: &dyn DiagnosticsSink,
    ) -> Result<Self, RegistryError> {
        let sources = discover_tables(dir)?;
        if sources.is_empty() {
            return Err(RegistryError::NoModuleSources {
                dir: dir.to_path_buf(),
            });
        }

        let mut modules = Vec::with_capacity(sources.len());
        let mut total_rows = 0;

        for source in sources {
            let name = source.module_name();
            let base = read_table(&source.path).map_err(|e| RegistryError::ModuleUnreadable {
                module: name.clone(),
                source: e,
            })?;

            let reference = base.column_values(reference_column).ok_or_else(|| {
                RegistryError::MissingReferenceColumn {
                    module: name.clone(),
                    column: reference_column.to_string(),
                }
            })?;

            total_rows += reference.len();
            sink.emit(
                Diagnostic::info(format!("loaded module ({} rows)", reference.len()))
                    .with_module(&name),
            );

            modules.push(Module {
                name,
                base,
                reference,
            });
        }

        sink.emit(Diagnostic::info(format!(
            "total rows across all modules: {total_rows}"
        )));

        Ok(Self {
            modules,
            total_rows,
        })
    }

    /// Modules in discovery order.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Sum of all modules' row counts.
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn get(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    #[cfg(test)]
    pub(crate) fn from_modules(modules: Vec<Module>) -> Self {
        let total_rows = modules.iter().map(|m| m.reference.len()).sum();
        Self {
            modules,
            total_rows,
        }
    }
}
