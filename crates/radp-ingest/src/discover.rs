//! Raw file discovery
//!
//! Walks the configured root directory (and its immediate subdirectories,
//! the exports are usually grouped per year) looking for the four accident
//! CSV files, and computes the MD5 of each file's bytes. The hash is the
//! file's identity in the ledger: the same content rediscovered under a
//! different name or path is the same file.

use radp_common::checksum::{compute_file_checksum, ChecksumAlgorithm};
use radp_common::RadpError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::FileKind;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Raw files root directory does not exist: {0}")]
    RootMissing(PathBuf),

    #[error("Failed to read directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to hash file: {0}")]
    Checksum(#[from] RadpError),
}

/// A raw file found on disk, classified and hashed
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub kind: FileKind,
    pub path: PathBuf,
    pub file_name: String,
    pub dir_name: String,
    pub md5: String,
}

/// Discover the accident CSV files under `root`
///
/// Returns at most one descriptor per logical kind; when several files on
/// disk classify to the same kind, the first one found wins and the rest
/// are logged and ignored.
pub fn scan(root: &Path) -> Result<BTreeMap<FileKind, DiscoveredFile>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::RootMissing(root.to_path_buf()));
    }

    let mut found = BTreeMap::new();

    for path in candidate_files(root)? {
        let Some(kind) = classify(&path) else {
            debug!(path = %path.display(), "Ignoring unrecognized file");
            continue;
        };

        if found.contains_key(&kind) {
            warn!(
                kind = %kind,
                path = %path.display(),
                "Duplicate file for kind, keeping the first one found"
            );
            continue;
        }

        let md5 = compute_file_checksum(&path, ChecksumAlgorithm::Md5)?;
        let file_name = name_of(&path);
        let dir_name = path
            .parent()
            .map(name_of)
            .unwrap_or_default();

        info!(kind = %kind, file_name = %file_name, md5 = %md5, "Discovered raw file");

        found.insert(
            kind,
            DiscoveredFile {
                kind,
                path,
                file_name,
                dir_name,
                md5,
            },
        );
    }

    Ok(found)
}

/// CSV files in `root` and its immediate subdirectories, in sorted order
fn candidate_files(root: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut files = Vec::new();

    let mut entries: Vec<_> =
        std::fs::read_dir(root)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            let mut nested: Vec<_> =
                std::fs::read_dir(&path)?.collect::<Result<Vec<_>, _>>()?;
            nested.sort_by_key(|e| e.path());
            files.extend(nested.into_iter().map(|e| e.path()).filter(|p| p.is_file()));
        } else if path.is_file() {
            files.push(path);
        }
    }

    Ok(files)
}

fn classify(path: &Path) -> Option<FileKind> {
    let is_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if !is_csv {
        return None;
    }

    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(FileKind::from_stem)
}

fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_scan_missing_root() {
        let result = scan(Path::new("/nonexistent/raw-files"));
        assert!(matches!(result, Err(ScanError::RootMissing(_))));
    }

    #[test]
    fn test_scan_classifies_all_kinds() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "caracteristiques-2021.csv", "a");
        write_file(dir.path(), "lieux-2021.csv", "b");
        write_file(dir.path(), "vehicules-2021.csv", "c");
        write_file(dir.path(), "usagers-2021.csv", "d");
        write_file(dir.path(), "notes.txt", "not a csv");

        let found = scan(dir.path()).unwrap();
        assert_eq!(found.len(), 4);
        assert!(found.contains_key(&FileKind::Characteristics));
        assert!(found.contains_key(&FileKind::Users));
    }

    #[test]
    fn test_scan_descends_into_year_directories() {
        let dir = tempfile::tempdir().unwrap();
        let year = dir.path().join("2021");
        fs::create_dir(&year).unwrap();
        write_file(&year, "usagers-2021.csv", "content");

        let found = scan(dir.path()).unwrap();
        let users = &found[&FileKind::Users];
        assert_eq!(users.file_name, "usagers-2021.csv");
        assert_eq!(users.dir_name, "2021");
    }

    #[test]
    fn test_same_content_same_hash() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "usagers-2021.csv", "identical bytes");
        let first = scan(dir.path()).unwrap()[&FileKind::Users].md5.clone();

        let dir2 = tempfile::tempdir().unwrap();
        write_file(dir2.path(), "users-renamed.csv", "identical bytes");
        let second = scan(dir2.path()).unwrap()[&FileKind::Users].md5.clone();

        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_kind_keeps_first() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "usagers-2020.csv", "first");
        write_file(dir.path(), "usagers-2021.csv", "second");

        let found = scan(dir.path()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[&FileKind::Users].file_name, "usagers-2020.csv");
    }
}
