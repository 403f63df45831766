use crate::photokeep_core::error::Result;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Computes content fingerprints under a single byte-size threshold.
///
/// Files above the threshold are fingerprinted by their decimal byte size
/// instead of a content hash. Hashing multi-gigabyte videos costs more than
/// the astronomically unlikely size collision is worth, and reading them
/// would force a full download of cloud-placeholder files. Size-surrogate
/// fingerprints are not content-addressed and must not be treated as
/// collision-proof identity.
pub struct Hasher {
    size_threshold: u64,
}

impl Hasher {
    pub fn new(size_threshold: u64) -> Self {
        Hasher { size_threshold }
    }

    /// Fingerprint one file: lowercase hex SHA-256 of the full contents, or
    /// the decimal byte size if the file exceeds the threshold.
    pub fn get_hash(&self, path: &Path) -> Result<String> {
        let size = fs::metadata(path)?.len();
        if size > self.size_threshold {
            return Ok(size.to_string());
        }

        let contents = fs::read(path)?;
        let digest = Sha256::digest(&contents);
        Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
    }
}
