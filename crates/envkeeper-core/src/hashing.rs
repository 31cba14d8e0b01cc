//! Content digests for installed files
//!
//! The digest recorded when an archive entry is extracted must equal the one
//! recomputed later from the file on disk, so every entry point funnels
//! through the same SHA-256 hasher and the same hex rendering.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Read buffer size (64KB)
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Compute the hex digest of everything a reader yields
pub fn digest_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; READ_CHUNK_SIZE];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Compute the hex digest of an in-memory buffer
pub fn digest_bytes(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Compute the hex digest of a file on disk
pub fn digest_file(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    digest_reader(file)
}
