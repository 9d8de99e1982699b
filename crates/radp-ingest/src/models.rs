//! Ledger domain types
//!
//! The ledger (`raw_accident_files`) tracks every discovered source file by
//! the MD5 of its bytes. A hash that was ever marked processed is terminal;
//! a failed hash stays eligible for retry on the next run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Logical type of a raw accident file
///
/// Declared in referential dependency order: characteristics is the root
/// entity the other three reference by accident number, so it must land
/// first. The derived `Ord` follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Characteristics,
    Locations,
    Vehicles,
    Users,
}

impl FileKind {
    /// Load order for the four entity tables
    pub const LOAD_ORDER: [FileKind; 4] = [
        FileKind::Characteristics,
        FileKind::Locations,
        FileKind::Vehicles,
        FileKind::Users,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Characteristics => "characteristics",
            FileKind::Locations => "locations",
            FileKind::Vehicles => "vehicles",
            FileKind::Users => "users",
        }
    }

    /// Target entity table for this kind
    pub fn table(&self) -> &'static str {
        match self {
            FileKind::Characteristics => "characteristics",
            FileKind::Locations => "locations",
            FileKind::Vehicles => "vehicles",
            FileKind::Users => "users",
        }
    }

    /// Classify a file-name stem
    ///
    /// The upstream exports are published under their French names
    /// (`caracteristiques-2021.csv`, `lieux-2021.csv`, ...); mirrored sets
    /// sometimes carry translated names, so both spellings are accepted.
    pub fn from_stem(stem: &str) -> Option<FileKind> {
        let stem = stem.to_lowercase();
        if stem.starts_with("caracteristiques") || stem.starts_with("characteristics") {
            Some(FileKind::Characteristics)
        } else if stem.starts_with("lieux") || stem.starts_with("locations") {
            Some(FileKind::Locations)
        } else if stem.starts_with("vehicules") || stem.starts_with("vehicles") {
            Some(FileKind::Vehicles)
        } else if stem.starts_with("usagers") || stem.starts_with("users") {
            Some(FileKind::Users)
        } else {
            None
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Processing state of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Pending,
    Processed,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Processed => "processed",
            ProcessingStatus::Failed => "failed",
        }
    }
}

impl From<&str> for ProcessingStatus {
    fn from(s: &str) -> Self {
        match s {
            "processed" => ProcessingStatus::Processed,
            "failed" => ProcessingStatus::Failed,
            _ => ProcessingStatus::Pending,
        }
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ledger entry (maps to the raw_accident_files table)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFileRecord {
    pub id: Uuid,
    pub kind: FileKind,
    pub dir_name: String,
    pub file_name: String,
    pub md5: String,
    pub status: ProcessingStatus,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RawFileRecord {
    /// New pending entry for a freshly discovered file
    pub fn pending(kind: FileKind, dir_name: &str, file_name: &str, md5: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            dir_name: dir_name.to_string(),
            file_name: file_name.to_string(),
            md5: md5.to_string(),
            status: ProcessingStatus::Pending,
            reason: None,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_order_starts_with_characteristics() {
        assert_eq!(FileKind::LOAD_ORDER[0], FileKind::Characteristics);
        assert_eq!(
            FileKind::LOAD_ORDER,
            [
                FileKind::Characteristics,
                FileKind::Locations,
                FileKind::Vehicles,
                FileKind::Users
            ]
        );
    }

    #[test]
    fn test_ord_matches_load_order() {
        let mut kinds = vec![FileKind::Users, FileKind::Characteristics, FileKind::Vehicles];
        kinds.sort();
        assert_eq!(kinds, vec![FileKind::Characteristics, FileKind::Vehicles, FileKind::Users]);
    }

    #[test]
    fn test_from_stem() {
        assert_eq!(
            FileKind::from_stem("caracteristiques-2021"),
            Some(FileKind::Characteristics)
        );
        assert_eq!(FileKind::from_stem("Lieux-2021"), Some(FileKind::Locations));
        assert_eq!(FileKind::from_stem("vehicules_2019"), Some(FileKind::Vehicles));
        assert_eq!(FileKind::from_stem("usagers-2021"), Some(FileKind::Users));
        assert_eq!(FileKind::from_stem("users-2021"), Some(FileKind::Users));
        assert_eq!(FileKind::from_stem("radars-2021"), None);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ProcessingStatus::Pending,
            ProcessingStatus::Processed,
            ProcessingStatus::Failed,
        ] {
            assert_eq!(ProcessingStatus::from(status.as_str()), status);
        }
    }

    #[test]
    fn test_pending_record() {
        let record =
            RawFileRecord::pending(FileKind::Users, "2021", "usagers-2021.csv", "abc123");
        assert_eq!(record.status, ProcessingStatus::Pending);
        assert!(record.reason.is_none());
        assert_eq!(record.file_name, "usagers-2021.csv");
    }
}
