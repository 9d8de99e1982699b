//! Checksum utilities for file identity and verification
//!
//! MD5 is the digest used for content-addressed dedup of raw source files
//! (it is the identity column of the ingestion ledger). SHA-256 is available
//! for integrity verification of published artifacts.

use crate::error::{RadpError, Result};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// Digest algorithm for checksum computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    Md5,
    Sha256,
}

impl std::str::FromStr for ChecksumAlgorithm {
    type Err = RadpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "md5" => Ok(ChecksumAlgorithm::Md5),
            "sha256" | "sha-256" => Ok(ChecksumAlgorithm::Sha256),
            _ => Err(RadpError::Config(format!("Invalid checksum algorithm: {}", s))),
        }
    }
}

impl std::fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChecksumAlgorithm::Md5 => write!(f, "md5"),
            ChecksumAlgorithm::Sha256 => write!(f, "sha256"),
        }
    }
}

/// Compute checksum for a file
pub fn compute_file_checksum(
    path: impl AsRef<Path>,
    algorithm: ChecksumAlgorithm,
) -> Result<String> {
    let mut file = std::fs::File::open(path)?;
    compute_checksum(&mut file, algorithm)
}

/// Compute checksum for any readable source
pub fn compute_checksum<R: Read>(reader: &mut R, algorithm: ChecksumAlgorithm) -> Result<String> {
    match algorithm {
        ChecksumAlgorithm::Md5 => {
            let mut context = md5::Context::new();
            let mut buffer = [0u8; 8192];

            loop {
                let bytes_read = reader.read(&mut buffer)?;
                if bytes_read == 0 {
                    break;
                }
                context.consume(&buffer[..bytes_read]);
            }

            Ok(format!("{:x}", context.compute()))
        },
        ChecksumAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            let mut buffer = [0u8; 8192];

            loop {
                let bytes_read = reader.read(&mut buffer)?;
                if bytes_read == 0 {
                    break;
                }
                hasher.update(&buffer[..bytes_read]);
            }

            Ok(hex::encode(hasher.finalize()))
        },
    }
}

/// Verify checksum for a file
///
/// Hex digests are compared case-insensitively.
pub fn verify_file_checksum(
    path: impl AsRef<Path>,
    expected: &str,
    algorithm: ChecksumAlgorithm,
) -> Result<bool> {
    let actual = compute_file_checksum(path, algorithm)?;
    if actual.eq_ignore_ascii_case(expected) {
        Ok(true)
    } else {
        Err(RadpError::ChecksumMismatch {
            expected: expected.to_string(),
            actual,
        })
    }
}
