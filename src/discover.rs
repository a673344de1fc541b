use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One discovered table file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Full path to the file.
    pub path: PathBuf,
    /// File stem, case preserved.
    pub stem: String,
}

impl SourceFile {
    /// Module identifier for this file: the stem, case preserved.
    pub fn module_name(&self) -> String {
        self.stem.clone()
    }

    /// Locale code for this file: the stem, lowercased.
    pub fn locale_code(&self) -> String {
        self.stem.to_lowercase()
    }
}

/// List the `.csv` files in a directory, sorted case-insensitively by stem.
///
/// The extension match ignores ASCII case, so `DE_de.CSV` is picked up.
/// The sort order is what makes discovery deterministic and decides which
/// locale source becomes the reference source (the first one).
pub fn discover_tables(dir: &Path) -> Result<Vec<SourceFile>, io::Error> {
    let mut sources = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if !is_csv {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        sources.push(SourceFile {
            stem: stem.to_string(),
            path,
        });
    }

    sources.sort_by_key(|s| s.stem.to_lowercase());
    Ok(sources)
}
