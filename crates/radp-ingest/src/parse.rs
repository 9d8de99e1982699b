//! CSV parsing
//!
//! Reads one raw export into typed rows. The whole file is the unit of
//! work: a single malformed record fails the file, which the orchestrator
//! records as that file's failure without touching the other kinds.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to open CSV file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed CSV record in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

/// Read every row of a delimited file into `T`
pub fn read_rows<T>(path: &Path, delimiter: u8) -> Result<Vec<T>, ParseError>
where
    T: DeserializeOwned,
{
    let file = std::fs::File::open(path).map_err(|source| ParseError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row = result.map_err(|source| ParseError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        rows.push(row);
    }

    debug!(path = %path.display(), rows = rows.len(), "Parsed CSV file");

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::{CharacteristicsRow, UsersRow, VehiclesRow};
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_characteristics() {
        let file = write_csv(
            "Num_Acc;jour;mois;an;hrmn;lum;dep;com;agg;int;atm;col;adr;lat;long\n\
             202100000001;30;11;2021;07:05;5;93;93053;2;1;1;6;AUTOROUTE A3;48,9066;2,4509\n",
        );

        let rows: Vec<CharacteristicsRow> = read_rows(file.path(), b';').unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].num_acc, 202100000001);
        assert_eq!(rows[0].hrmn, "07:05");
        assert_eq!(rows[0].lum, Some(5));
        assert_eq!(rows[0].lat, "48,9066");
    }

    #[test]
    fn test_parse_empty_fields_become_none() {
        let file = write_csv(
            "Num_Acc;id_vehicule;num_veh;senc;catv;obs;obsm;choc;manv;motor;occutc\n\
             202100000001;137 306 745;B01;1;7;0;0;3;1;1;\n",
        );

        let rows: Vec<VehiclesRow> = read_rows(file.path(), b';').unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].catv, Some(7));
        assert_eq!(rows[0].occutc, None);
    }

    #[test]
    fn test_parse_mixed_code_column() {
        let file = write_csv(
            "Num_Acc;id_vehicule;num_veh;place;catu;grav;sexe;an_nais;trajet;secu1;secu2;secu3;locp;actp;etatp\n\
             202100000001;137 306 745;B01;1;1;3;1;1994;5;1;-1;-1;0;A;-1\n",
        );

        let rows: Vec<UsersRow> = read_rows(file.path(), b';').unwrap();
        assert_eq!(rows[0].actp.as_deref(), Some("A"));
        assert_eq!(rows[0].secu2, Some(-1));
    }

    #[test]
    fn test_malformed_numeric_field_fails_file() {
        let file = write_csv(
            "Num_Acc;jour;mois;an;hrmn;lum;dep;com;agg;int;atm;col;adr;lat;long\n\
             not-a-number;30;11;2021;07:05;5;93;93053;2;1;1;6;;48,9066;2,4509\n",
        );

        let result: Result<Vec<CharacteristicsRow>, _> = read_rows(file.path(), b';');
        assert!(matches!(result, Err(ParseError::Csv { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result: Result<Vec<CharacteristicsRow>, _> =
            read_rows(Path::new("/nonexistent.csv"), b';');
        assert!(matches!(result, Err(ParseError::Open { .. })));
    }
}
