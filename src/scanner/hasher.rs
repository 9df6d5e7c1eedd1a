//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! The [`Hasher`] computes a 256-bit BLAKE3 digest over the complete content
//! of a file. Files are streamed through a fixed-size buffer; very large files
//! are memory-mapped and hashed with rayon so a single huge file does not
//! serialize the whole hashing phase.
//!
//! There is deliberately no prehash or sampling mode: only a digest over every
//! byte can stand in for byte-for-byte equality.
//!
//! # Example
//!
//! ```no_run
//! use linkdupe::scanner::{hash_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let hash = hasher.full_hash(Path::new("photo.jpg")).unwrap();
//! println!("{}", hash_to_hex(&hash));
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::HashError;

/// A BLAKE3 digest.
pub type Hash = [u8; 32];

/// Read buffer size for streaming hashing.
pub const BUFFER_SIZE: usize = 64 * 1024;

/// Files above this size are hashed through a memory map on the rayon pool.
pub const MMAP_THRESHOLD: u64 = 64 * 1024 * 1024;

/// Streaming BLAKE3 file hasher.
#[derive(Debug, Clone, Default)]
pub struct Hasher {
    /// Optional shutdown flag checked between buffers
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Hasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shutdown flag so long reads can be abandoned on Ctrl+C.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Hash the entire content of a file.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the file vanished since it was scanned
    /// - `PermissionDenied` if it can no longer be read
    /// - `Io` for any other read failure
    /// - `Interrupted` if shutdown was requested mid-file
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        let file = File::open(path).map_err(|e| map_io_error(path, e))?;
        let size = file
            .metadata()
            .map_err(|e| map_io_error(path, e))?
            .len();

        let mut hasher = blake3::Hasher::new();

        if size > MMAP_THRESHOLD {
            log::trace!("Hashing {} via mmap ({} bytes)", path.display(), size);
            hasher
                .update_mmap_rayon(path)
                .map_err(|e| map_io_error(path, e))?;
            return Ok(*hasher.finalize().as_bytes());
        }

        self.stream(file, path, &mut hasher)?;
        Ok(*hasher.finalize().as_bytes())
    }

    /// Hash an in-memory byte slice. Equal to [`full_hash`](Self::full_hash)
    /// of a file with the same content.
    #[must_use]
    pub fn hash_bytes(bytes: &[u8]) -> Hash {
        *blake3::hash(bytes).as_bytes()
    }

    fn stream(
        &self,
        mut file: File,
        path: &Path,
        hasher: &mut blake3::Hasher,
    ) -> Result<(), HashError> {
        let mut buffer = vec![0u8; BUFFER_SIZE];
        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted(path.to_path_buf()));
            }
            let read = match file.read(&mut buffer) {
                Ok(0) => return Ok(()),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(map_io_error(path, e)),
            };
            hasher.update(&buffer[..read]);
        }
    }
}

fn map_io_error(path: &Path, error: io::Error) -> HashError {
    let path: PathBuf = path.to_path_buf();
    match error.kind() {
        io::ErrorKind::NotFound => HashError::NotFound(path),
        io::ErrorKind::PermissionDenied => HashError::PermissionDenied(path),
        _ => HashError::Io {
            path,
            source: error,
        },
    }
}

/// Render a hash as lowercase hex.
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    blake3::Hash::from(*hash).to_hex().to_string()
}

/// Parse a 64-character hex string back into a hash.
#[must_use]
pub fn hex_to_hash(hex: &str) -> Option<Hash> {
    blake3::Hash::from_hex(hex).ok().map(|h| *h.as_bytes())
}
