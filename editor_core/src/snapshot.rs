//! Editor snapshot for deterministic parity testing

use crate::{EditorMode, Position};
use alloc::vec::Vec;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

/// Complete editor state snapshot for parity testing
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct EditorSnapshot {
    pub mode: EditorMode,
    pub cursor: Position,
    pub content: Vec<u8>,
    pub scroll_offset: usize,
    pub dirty: bool,
    pub clipboard: Vec<u8>,
    /// A copy or cut start has been marked
    pub marking: bool,
}

impl EditorSnapshot {
    /// Compute a deterministic hash of the snapshot state
    /// This is used for fast comparison in parity tests
    #[cfg(test)]
    pub fn hash(&self) -> u64 {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update([self.mode as u8]);
        hasher.update(self.cursor.row.to_le_bytes());
        hasher.update(self.cursor.col.to_le_bytes());

        // Length prefixes keep content and clipboard from running together
        hasher.update((self.content.len() as u64).to_le_bytes());
        hasher.update(&self.content);
        hasher.update(self.scroll_offset.to_le_bytes());
        hasher.update([self.dirty as u8, self.marking as u8]);
        hasher.update((self.clipboard.len() as u64).to_le_bytes());
        hasher.update(&self.clipboard);

        let result = hasher.finalize();
        let bytes: [u8; 8] = result[..8].try_into().unwrap();
        u64::from_le_bytes(bytes)
    }
}
