//! Typed rows for the four entity tables
//!
//! One struct per raw file kind, deserialized straight from the CSV headers
//! of the BAAC exports (2019+ format). Values are carried as published:
//! categorical codes stay integers (`-1` means "not specified"), coordinates
//! and mixed-format columns stay text. No cleaning happens here.

use serde::Deserialize;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;

/// A row that can be bulk-inserted into its entity table
pub trait EntityRow: Send + Sync + for<'de> Deserialize<'de> {
    /// Target table name
    const TABLE: &'static str;

    /// Insert column list, in bind order
    const COLUMNS: &'static [&'static str];

    /// Bind this row's fields in `COLUMNS` order
    fn bind<'q>(
        &'q self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments>;
}

/// Accident characteristics: one row per accident, the root entity
#[derive(Debug, Clone, Deserialize)]
pub struct CharacteristicsRow {
    #[serde(rename = "Num_Acc")]
    pub num_acc: i64,
    pub jour: i32,
    pub mois: i32,
    pub an: i32,
    pub hrmn: String,
    pub lum: Option<i32>,
    pub dep: String,
    pub com: String,
    pub agg: Option<i32>,
    pub int: Option<i32>,
    pub atm: Option<i32>,
    pub col: Option<i32>,
    pub adr: Option<String>,
    pub lat: String,
    pub long: String,
}

impl EntityRow for CharacteristicsRow {
    const TABLE: &'static str = "characteristics";
    const COLUMNS: &'static [&'static str] = &[
        "num_acc", "jour", "mois", "an", "hrmn", "lum", "dep", "com", "agg", "int", "atm",
        "col", "adr", "lat", "long",
    ];

    fn bind<'q>(
        &'q self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        query
            .bind(self.num_acc)
            .bind(self.jour)
            .bind(self.mois)
            .bind(self.an)
            .bind(&self.hrmn)
            .bind(self.lum)
            .bind(&self.dep)
            .bind(&self.com)
            .bind(self.agg)
            .bind(self.int)
            .bind(self.atm)
            .bind(self.col)
            .bind(&self.adr)
            .bind(&self.lat)
            .bind(&self.long)
    }
}

/// Accident location details, keyed by accident number
#[derive(Debug, Clone, Deserialize)]
pub struct LocationsRow {
    #[serde(rename = "Num_Acc")]
    pub num_acc: i64,
    pub catr: Option<i32>,
    pub voie: Option<String>,
    pub v1: Option<String>,
    pub v2: Option<String>,
    pub circ: Option<i32>,
    pub nbv: Option<i32>,
    pub vosp: Option<i32>,
    pub prof: Option<i32>,
    pub pr: Option<String>,
    pub pr1: Option<String>,
    pub plan: Option<i32>,
    pub lartpc: Option<String>,
    pub larrout: Option<String>,
    pub surf: Option<i32>,
    pub infra: Option<i32>,
    pub situ: Option<i32>,
    pub vma: Option<i32>,
}

impl EntityRow for LocationsRow {
    const TABLE: &'static str = "locations";
    const COLUMNS: &'static [&'static str] = &[
        "num_acc", "catr", "voie", "v1", "v2", "circ", "nbv", "vosp", "prof", "pr", "pr1",
        "plan", "lartpc", "larrout", "surf", "infra", "situ", "vma",
    ];

    fn bind<'q>(
        &'q self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        query
            .bind(self.num_acc)
            .bind(self.catr)
            .bind(&self.voie)
            .bind(&self.v1)
            .bind(&self.v2)
            .bind(self.circ)
            .bind(self.nbv)
            .bind(self.vosp)
            .bind(self.prof)
            .bind(&self.pr)
            .bind(&self.pr1)
            .bind(self.plan)
            .bind(&self.lartpc)
            .bind(&self.larrout)
            .bind(self.surf)
            .bind(self.infra)
            .bind(self.situ)
            .bind(self.vma)
    }
}

/// Vehicles involved in an accident
#[derive(Debug, Clone, Deserialize)]
pub struct VehiclesRow {
    #[serde(rename = "Num_Acc")]
    pub num_acc: i64,
    pub id_vehicule: String,
    pub num_veh: String,
    pub senc: Option<i32>,
    pub catv: Option<i32>,
    pub obs: Option<i32>,
    pub obsm: Option<i32>,
    pub choc: Option<i32>,
    pub manv: Option<i32>,
    pub motor: Option<i32>,
    pub occutc: Option<i32>,
}

impl EntityRow for VehiclesRow {
    const TABLE: &'static str = "vehicles";
    const COLUMNS: &'static [&'static str] = &[
        "num_acc", "id_vehicule", "num_veh", "senc", "catv", "obs", "obsm", "choc", "manv",
        "motor", "occutc",
    ];

    fn bind<'q>(
        &'q self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        query
            .bind(self.num_acc)
            .bind(&self.id_vehicule)
            .bind(&self.num_veh)
            .bind(self.senc)
            .bind(self.catv)
            .bind(self.obs)
            .bind(self.obsm)
            .bind(self.choc)
            .bind(self.manv)
            .bind(self.motor)
            .bind(self.occutc)
    }
}

/// People involved in an accident, keyed by accident and vehicle
#[derive(Debug, Clone, Deserialize)]
pub struct UsersRow {
    #[serde(rename = "Num_Acc")]
    pub num_acc: i64,
    pub id_vehicule: String,
    pub num_veh: String,
    pub place: Option<i32>,
    pub catu: Option<i32>,
    pub grav: Option<i32>,
    pub sexe: Option<i32>,
    pub an_nais: Option<i32>,
    pub trajet: Option<i32>,
    pub secu1: Option<i32>,
    pub secu2: Option<i32>,
    pub secu3: Option<i32>,
    pub locp: Option<i32>,
    // actp mixes digits and letters ("0".."9", "A", "B")
    pub actp: Option<String>,
    pub etatp: Option<i32>,
}

impl EntityRow for UsersRow {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &[
        "num_acc", "id_vehicule", "num_veh", "place", "catu", "grav", "sexe", "an_nais",
        "trajet", "secu1", "secu2", "secu3", "locp", "actp", "etatp",
    ];

    fn bind<'q>(
        &'q self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        query
            .bind(self.num_acc)
            .bind(&self.id_vehicule)
            .bind(&self.num_veh)
            .bind(self.place)
            .bind(self.catu)
            .bind(self.grav)
            .bind(self.sexe)
            .bind(self.an_nais)
            .bind(self.trajet)
            .bind(self.secu1)
            .bind(self.secu2)
            .bind(self.secu3)
            .bind(self.locp)
            .bind(&self.actp)
            .bind(self.etatp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_counts() {
        assert_eq!(CharacteristicsRow::COLUMNS.len(), 15);
        assert_eq!(LocationsRow::COLUMNS.len(), 18);
        assert_eq!(VehiclesRow::COLUMNS.len(), 11);
        assert_eq!(UsersRow::COLUMNS.len(), 15);
    }

    #[test]
    fn test_tables_are_distinct() {
        let tables = [
            CharacteristicsRow::TABLE,
            LocationsRow::TABLE,
            VehiclesRow::TABLE,
            UsersRow::TABLE,
        ];
        for (i, a) in tables.iter().enumerate() {
            for b in tables.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
