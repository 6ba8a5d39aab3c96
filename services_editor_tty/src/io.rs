//! Document I/O operations
//!
//! Files are byte-for-byte: loading keeps every byte, saving writes the
//! document exactly as it is with no terminator added.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Document I/O error
#[derive(Debug, Error)]
pub enum IoError {
    #[error("{}: not found", .path.display())]
    NotFound { path: PathBuf },

    #[error("{}: permission denied", .path.display())]
    PermissionDenied { path: PathBuf },

    #[error("{}: {}", .path.display(), .source)]
    Other {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IoError {
    pub fn from_io(path: &Path, source: std::io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            ErrorKind::NotFound => IoError::NotFound { path },
            ErrorKind::PermissionDenied => IoError::PermissionDenied { path },
            _ => IoError::Other { path, source },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, IoError::NotFound { .. })
    }
}

/// Editor I/O abstraction.
pub trait EditorIo {
    /// Read the whole file at `path`
    fn load(&mut self, path: &Path) -> Result<Vec<u8>, IoError>;
    /// Replace the file at `path` with `bytes`
    fn save(&mut self, path: &Path, bytes: &[u8]) -> Result<(), IoError>;
}

/// Filesystem-backed editor I/O
#[derive(Debug, Default, Clone, Copy)]
pub struct FsEditorIo;

impl EditorIo for FsEditorIo {
    fn load(&mut self, path: &Path) -> Result<Vec<u8>, IoError> {
        let bytes = fs::read(path).map_err(|err| IoError::from_io(path, err))?;
        log::info!("read {} bytes from {}", bytes.len(), path.display());
        Ok(bytes)
    }

    fn save(&mut self, path: &Path, bytes: &[u8]) -> Result<(), IoError> {
        fs::write(path, bytes).map_err(|err| IoError::from_io(path, err))?;
        log::info!("wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

/// In-memory editor I/O for headless sessions and tests
#[derive(Debug, Default, Clone)]
pub struct MemoryEditorIo {
    files: HashMap<PathBuf, Vec<u8>>,
    read_only: bool,
}

impl MemoryEditorIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), bytes.into());
        self
    }

    /// Refuse every save with `PermissionDenied`
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<&[u8]> {
        self.files.get(path.as_ref()).map(Vec::as_slice)
    }
}

impl EditorIo for MemoryEditorIo {
    fn load(&mut self, path: &Path) -> Result<Vec<u8>, IoError> {
        self.files.get(path).cloned().ok_or_else(|| IoError::NotFound {
            path: path.to_path_buf(),
        })
    }

    fn save(&mut self, path: &Path, bytes: &[u8]) -> Result<(), IoError> {
        if self.read_only {
            return Err(IoError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        self.files.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}
