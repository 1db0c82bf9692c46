//! Loads the four dataset tables once at start-up.
//! A table that fails to load is logged and left absent; everything else keeps working.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::types::{Delivery, Match, Player, RawTable};

pub const PLAYERS: &str = "players";
pub const MATCHES: &str = "matches";
pub const DELIVERIES: &str = "deliveries";
pub const MATCH_INFO: &str = "match_info";

/// Load outcome of one table, reported by `/health`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableStatus {
    pub table: &'static str,
    pub loaded: bool,
    pub rows: usize,
    pub error: Option<String>,
}

/// Immutable dataset context. Built once, then shared read-only.
#[derive(Debug, Default)]
pub struct Datasets {
    players: Option<Vec<Player>>,
    matches: Option<Vec<Match>>,
    deliveries: Option<Vec<Delivery>>,
    match_info: Option<RawTable>,
    status: Vec<TableStatus>,
}

impl Datasets {
    pub fn load(cfg: &Config) -> Self {
        let mut status = Vec::with_capacity(4);

        let players = track(PLAYERS, read_rows::<Player>(&cfg.players_path), &mut status, Vec::len);
        let matches = track(MATCHES, read_rows::<Match>(&cfg.matches_path), &mut status, Vec::len);
        let deliveries = track(DELIVERIES, read_rows::<Delivery>(&cfg.deliveries_path), &mut status, Vec::len);
        let match_info = track(MATCH_INFO, read_raw(&cfg.match_info_path), &mut status, |t| {
            t.rows.len()
        });

        if status.iter().all(|s| s.loaded) {
            info!("Local dataset loaded successfully!");
        }

        Self { players, matches, deliveries, match_info, status }
    }

    /// Build a context from tables already in memory. `None` marks a table as not loaded.
    pub fn from_parts(
        players: Option<Vec<Player>>,
        matches: Option<Vec<Match>>,
        deliveries: Option<Vec<Delivery>>,
        match_info: Option<RawTable>,
    ) -> Self {
        let status = vec![
            in_memory_status(PLAYERS, players.as_ref().map(Vec::len)),
            in_memory_status(MATCHES, matches.as_ref().map(Vec::len)),
            in_memory_status(DELIVERIES, deliveries.as_ref().map(Vec::len)),
            in_memory_status(MATCH_INFO, match_info.as_ref().map(|t| t.rows.len())),
        ];
        Self { players, matches, deliveries, match_info, status }
    }

    pub fn status(&self) -> &[TableStatus] {
        &self.status
    }

    pub fn players(&self) -> Result<&[Player]> {
        self.players.as_deref().ok_or(AppError::TableUnavailable(PLAYERS))
    }

    pub fn matches(&self) -> Result<&[Match]> {
        self.matches.as_deref().ok_or(AppError::TableUnavailable(MATCHES))
    }

    pub fn deliveries(&self) -> Result<&[Delivery]> {
        self.deliveries.as_deref().ok_or(AppError::TableUnavailable(DELIVERIES))
    }

    pub fn match_info(&self) -> Result<&RawTable> {
        self.match_info.as_ref().ok_or(AppError::TableUnavailable(MATCH_INFO))
    }

    /// Deliveries of one match, in file order. Empty if the match has none.
    pub fn deliveries_for(&self, match_id: u32) -> Result<Vec<Delivery>> {
        Ok(self
            .deliveries()?
            .iter()
            .filter(|d| d.match_id == match_id)
            .cloned()
            .collect())
    }
}

fn track<T>(
    table: &'static str,
    loaded: Result<T>,
    status: &mut Vec<TableStatus>,
    rows: impl Fn(&T) -> usize,
) -> Option<T> {
    match loaded {
        Ok(t) => {
            let n = rows(&t);
            info!(table, rows = n, "Loaded {table}: {n} rows");
            status.push(TableStatus { table, loaded: true, rows: n, error: None });
            Some(t)
        }
        Err(e) => {
            let e = AppError::DataLoad { table, source: Box::new(e) };
            error!(table, "{e}");
            status.push(TableStatus { table, loaded: false, rows: 0, error: Some(e.to_string()) });
            None
        }
    }
}

fn in_memory_status(table: &'static str, rows: Option<usize>) -> TableStatus {
    TableStatus {
        table,
        loaded: rows.is_some(),
        rows: rows.unwrap_or(0),
        error: rows.is_none().then(|| format!("Dataset not loaded: {table}")),
    }
}

fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?)
}

/// Typed rows of a CSV file with a header line.
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut rdr = reader(path)?;
    let rows = rdr.deserialize().collect::<std::result::Result<Vec<T>, _>>()?;
    Ok(rows)
}

/// Header and string cells of a CSV file, untouched.
pub fn read_raw(path: &Path) -> Result<RawTable> {
    let mut rdr = reader(path)?;
    let headers = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const PLAYERS_CSV: &str = "\
Player_Name,Matches,Runs_Scored,Batting_Average,Batting_Strike_Rate,Wickets_Taken,Bowling_Average,Economy_Rate,Bowling_Strike_Rate,Best_Bowling_Match
V Kohli,252,8004,38.67,131.97,4,NA,8.8,NA,2/25
JJ Bumrah,133,69,,84.15,165,22.51,7.3,18.5,5/10
";

    const MATCHES_CSV: &str = "\
id,season,city,team1,team2,toss_winner,toss_decision,winner,result,result_margin,target_runs,super_over,player_of_match
1,2008,Bangalore,KKR,RCB,RCB,field,KKR,runs,140,223,N,BB McCullum
2,2008,,CSK,MI,MI,bat,NA,no result,NA,NA,N,NA
";

    const DELIVERIES_CSV: &str = "\
match_id,inning,batting_team,bowling_team,over,ball,total_runs,is_wicket
1,1,KKR,RCB,0,1,1,0
1,1,KKR,RCB,0,2,0,1
1,2,RCB,KKR,0,1,4,0
2,1,CSK,MI,0,1,6,0
";

    fn write_all(dir: &Path) {
        fs::write(dir.join("players_clean.csv"), PLAYERS_CSV).unwrap();
        fs::write(dir.join("matches_clean.csv"), MATCHES_CSV).unwrap();
        fs::write(dir.join("deliveries_clean.csv"), DELIVERIES_CSV).unwrap();
        fs::write(dir.join("match_info.csv"), "id,venue\n1,Eden Gardens\n").unwrap();
    }

    #[test]
    fn loads_all_tables_with_na_cells() {
        let dir = tempfile::tempdir().unwrap();
        write_all(dir.path());

        let data = Datasets::load(&Config::with_data_dir(dir.path()));
        assert!(data.status().iter().all(|s| s.loaded), "{:?}", data.status());

        let players = data.players().unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].bowling_average, None);
        assert_eq!(players[1].batting_average, None);
        assert_eq!(players[1].bowling_average, Some(22.51));

        let matches = data.matches().unwrap();
        assert_eq!(matches[0].match_id, Some(1));
        assert_eq!(matches[0].winner.as_deref(), Some("KKR"));
        assert_eq!(matches[1].winner, None);
        assert_eq!(matches[1].city, None);
        assert_eq!(matches[1].result_margin, None);

        assert_eq!(data.deliveries_for(1).unwrap().len(), 3);
        assert_eq!(data.match_info().unwrap().headers, vec!["id", "venue"]);
    }

    #[test]
    fn missing_file_leaves_only_that_table_absent() {
        let dir = tempfile::tempdir().unwrap();
        write_all(dir.path());
        fs::remove_file(dir.path().join("players_clean.csv")).unwrap();

        let data = Datasets::load(&Config::with_data_dir(dir.path()));
        assert!(matches!(data.players(), Err(AppError::TableUnavailable(PLAYERS))));
        assert!(data.matches().is_ok());

        let players_status = data.status().iter().find(|s| s.table == PLAYERS).unwrap();
        assert!(!players_status.loaded);
        assert!(players_status.error.as_deref().unwrap().contains("players"));
    }

    #[test]
    fn malformed_rows_fail_the_table() {
        let dir = tempfile::tempdir().unwrap();
        write_all(dir.path());
        fs::write(
            dir.path().join("deliveries_clean.csv"),
            "match_id,inning,batting_team,bowling_team,over,total_runs,is_wicket\n1,one,A,B,0,1,0\n",
        )
        .unwrap();

        let data = Datasets::load(&Config::with_data_dir(dir.path()));
        assert!(data.deliveries().is_err());
        assert!(data.deliveries_for(1).is_err());
    }

    #[test]
    fn unknown_match_has_no_deliveries() {
        let data = Datasets::from_parts(None, None, Some(Vec::new()), None);
        assert!(data.deliveries_for(42).unwrap().is_empty());
    }
}
