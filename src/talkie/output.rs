//! Writing the dictionary artifact to disk.

use std::fs;
use std::io::Write;
use std::path::Path;

use log::info;
use tempfile::NamedTempFile;

use super::types::error::Result;
use super::types::models::DictionaryArtifact;

impl DictionaryArtifact {
    /// Write the data and index files.
    ///
    /// Both files are staged next to their destinations and only moved into
    /// place once both have been written completely, so a failure never
    /// leaves a truncated dictionary behind.
    pub fn write_to(&self, data_path: impl AsRef<Path>, index_path: impl AsRef<Path>) -> Result<()> {
        let (data_path, index_path) = (data_path.as_ref(), index_path.as_ref());

        let data_file = stage(data_path, &self.data)?;
        let index_file = stage(index_path, self.index_text().as_bytes())?;

        data_file.persist(data_path).map_err(|e| e.error)?;
        index_file.persist(index_path).map_err(|e| e.error)?;

        info!(
            "Wrote {} ({} bytes) and {} ({} entries)",
            data_path.display(),
            self.data.len(),
            index_path.display(),
            self.index.len()
        );
        Ok(())
    }
}

/// Write `contents` to a temporary file in the directory of `destination`.
fn stage(destination: &Path, contents: &[u8]) -> Result<NamedTempFile> {
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    Ok(file)
}
