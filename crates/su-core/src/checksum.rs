//! SHA-256 digests of migration scripts for the ledger audit trail.

use crate::error::{CoreError, CoreResult};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::Path;

/// SHA-256 of script text as lowercase hex.
///
/// Equal to [`compute_file_digest`] of a file holding exactly `content`.
pub fn compute_checksum(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}

/// Compute the SHA256 digest of a file's full content as lowercase hex.
///
/// The file is streamed through the hasher rather than read into memory.
pub fn compute_file_digest(path: &Path) -> CoreResult<String> {
    let io_err = |source| CoreError::IoWithPath {
        path: path.display().to_string(),
        source,
    };

    let mut file = File::open(path).map_err(io_err)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(io_err)?;
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
#[path = "checksum_test.rs"]
mod tests;
