//! Loading and saving the installer document.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_yaml::Value as YamlValue;
use tempfile::NamedTempFile;

use crate::document::value::ConfigDocument;
use crate::error::{Error, Result};

/// Reads and writes the YAML document at a fixed path.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the backing file.
    pub fn load(&self) -> Result<ConfigDocument> {
        let content = fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))?;
        let value: YamlValue = serde_yaml::from_str(&content)
            .map_err(|e| Error::parse(format!("{}: {}", self.path.display(), e)))?;
        let document = ConfigDocument::try_from(value)?;

        tracing::debug!(
            path = %self.path.display(),
            keys = document.len(),
            "Document loaded"
        );
        Ok(document)
    }

    /// Rewrite the backing file from `document`.
    ///
    /// The new content goes to a temporary file in the same directory which
    /// is then renamed over the original, so readers never observe a
    /// half-written document.
    pub fn save(&self, document: &ConfigDocument) -> Result<()> {
        let rendered = serde_yaml::to_string(document)
            .map_err(|e| Error::parse(format!("failed to render document: {}", e)))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
        tmp.write_all(rendered.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| Error::io(tmp.path(), e))?;

        // Keep the mode of the file being replaced (tempfile creates 0600).
        if let Ok(meta) = fs::metadata(&self.path) {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .map_err(|e| Error::io(&self.path, e))?;
        }

        tmp.persist(&self.path)
            .map_err(|e| Error::io(&self.path, e.error))?;

        tracing::debug!(
            path = %self.path.display(),
            keys = document.len(),
            bytes = rendered.len(),
            "Document saved"
        );
        Ok(())
    }
}
