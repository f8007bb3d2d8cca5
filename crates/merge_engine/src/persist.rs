use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists and accepts new files; create it if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if !meta.is_dir() => {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir)
                .map_err(|e| PersistError::OutputDir(format!("{}: {e}", dir.display())))?;
        }
        Err(err) => return Err(PersistError::OutputDir(format!("{}: {err}", dir.display()))),
    }
    NamedTempFile::new_in(dir)
        .map_err(|e| PersistError::OutputDir(format!("{}: {e}", dir.display())))?;
    Ok(())
}

/// A file produced by [`AtomicFileWriter::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Writes `{dir}/{filename}` through a temp file in the same directory, then renames it
/// over the target so readers never observe a half-written output.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(
        &self,
        filename: &str,
        content: impl AsRef<[u8]>,
    ) -> Result<WrittenFile, PersistError> {
        ensure_output_dir(&self.dir)?;

        let content = content.as_ref();
        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;

        Ok(WrittenFile {
            path: target,
            bytes: content.len() as u64,
        })
    }
}
