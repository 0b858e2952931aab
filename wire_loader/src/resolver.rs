use anyhow::Context as _;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use wire_types::File;

use crate::file::WireFile;

/* Loads format descriptions together with everything they import */
pub struct ImportResolver {
    /* Canonical paths already loaded or being loaded */
    seen: HashSet<PathBuf>,

    /* Searched after the importing file's own directory */
    include_dirs: Vec<PathBuf>,

    /* All loaded files, imports before their importers */
    files: Vec<File>,
}

impl ImportResolver {
    pub fn new(include_dirs: Vec<PathBuf>) -> Self {
        Self {
            seen: HashSet::new(),
            include_dirs,
            files: Vec::new(),
        }
    }

    /* Locate an import: the importer's directory wins over include dirs */
    fn locate_import(&self, import: &str, importer: &Path) -> anyhow::Result<PathBuf> {
        let candidates = importer
            .parent()
            .into_iter()
            .chain(self.include_dirs.iter().map(PathBuf::as_path))
            .map(|dir| dir.join(import));

        for candidate in candidates {
            if candidate.exists() {
                return candidate
                    .canonicalize()
                    .with_context(|| format!("Failed to locate '{}'", candidate.display()));
            }
        }

        anyhow::bail!(
            "Import '{}' of '{}' not found next to it or in any include directory",
            import,
            importer.display()
        )
    }

    /* Load a format description and recursively load its imports */
    pub fn load_file_with_imports(&mut self, file_path: &Path) -> anyhow::Result<()> {
        let canonical_path = file_path
            .canonicalize()
            .with_context(|| format!("Failed to locate '{}'", file_path.display()))?;

        if self.seen.contains(&canonical_path) {
            debug!(path = %file_path.display(), "skipping already loaded file");
            return Ok(());
        }

        /* Marked before its imports are visited, so import cycles end here */
        self.seen.insert(canonical_path.clone());

        debug!(path = %file_path.display(), "loading format description");

        let contents = std::fs::read_to_string(&canonical_path)
            .with_context(|| format!("Failed to read '{}'", file_path.display()))?;
        let document = WireFile::from_yaml(&contents)
            .with_context(|| format!("Failed to parse '{}'", file_path.display()))?;

        for import in document.imports() {
            let import_path = self.locate_import(import, &canonical_path)?;
            debug!(import = %import, resolved = %import_path.display(), "resolving import");
            self.load_file_with_imports(&import_path)?;
        }

        let file = document.into_file(&canonical_path);
        debug!(
            file = %file.name,
            structs = file.structs.len(),
            contexts = file.contexts.len(),
            constants = file.constants.len(),
            "loaded"
        );
        self.files.push(file);

        Ok(())
    }

    pub fn files(&self) -> &[File] {
        &self.files
    }

    pub fn into_files(self) -> Vec<File> {
        self.files
    }

    pub fn loaded_file_count(&self) -> usize {
        self.seen.len()
    }
}
