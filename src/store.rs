use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::Builder;

use crate::domain::{NistId, SpectrumType};
use crate::error::ScrapeError;

pub const STRUCTURE_EXT: &str = "mol";
pub const SPECTRUM_EXT: &str = "jdx";

/// On-disk layout for downloaded artifacts.
#[derive(Debug, Clone)]
pub struct Store {
    structure_root: Utf8PathBuf,
    spectrum_root: Utf8PathBuf,
}

impl Store {
    pub fn new(structure_root: Utf8PathBuf, spectrum_root: Utf8PathBuf) -> Self {
        Self {
            structure_root,
            spectrum_root,
        }
    }

    pub fn structure_root(&self) -> &Utf8Path {
        &self.structure_root
    }

    pub fn spectrum_root(&self) -> &Utf8Path {
        &self.spectrum_root
    }

    pub fn structure_path(&self, id: &NistId) -> Utf8PathBuf {
        self.structure_root.join(format!("{id}.{STRUCTURE_EXT}"))
    }

    pub fn spectrum_path(&self, id: &NistId, spectrum_type: SpectrumType) -> Utf8PathBuf {
        self.spectrum_root
            .join(format!("{id}-{spectrum_type}.{SPECTRUM_EXT}"))
    }

    pub fn exists(&self, path: &Utf8Path) -> bool {
        path.as_std_path().is_file()
    }

    /// Writes into a sibling temp file and renames it over `path`, so an
    /// interrupted run never leaves a truncated artifact behind.
    pub fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), ScrapeError> {
        let parent = path
            .parent()
            .ok_or_else(|| ScrapeError::Filesystem(format!("invalid destination path {path}")))?;
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| ScrapeError::Filesystem(format!("create {parent}: {err}")))?;
        let mut temp = Builder::new()
            .prefix(".nist-scrape")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| ScrapeError::Filesystem(err.to_string()))?;
        temp.write_all(content)
            .map_err(|err| ScrapeError::Filesystem(err.to_string()))?;
        temp.persist(path.as_std_path())
            .map_err(|err| ScrapeError::Filesystem(format!("persist {path}: {err}")))?;
        Ok(())
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(Utf8PathBuf::from("mol"), Utf8PathBuf::from("jdx"))
    }
}
