use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

pub const DATA_DIR: &str = "./IPL_Analytics_App/data";

pub const PLAYERS_FILE: &str = "players_clean.csv";
pub const MATCHES_FILE: &str = "matches_clean.csv";
pub const DELIVERIES_FILE: &str = "deliveries_clean.csv";
pub const MATCH_INFO_FILE: &str = "match_info.csv";

/// Number of one-over bins per innings. Deliveries in over >= OVER_BINS are not binned.
pub const OVER_BINS: u32 = 20;

/// Rows returned by every ranking view.
pub const TOP_N: usize = 10;

/// Rows returned by table previews when no `limit` is given.
pub const PREVIEW_ROWS: usize = 5;

/// Selectable match identifiers (inclusive).
pub const MATCH_ID_MIN: u32 = 1;
pub const MATCH_ID_MAX: u32 = 1095;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub api_port: u16,
    pub players_path: PathBuf,
    pub matches_path: PathBuf,
    pub deliveries_path: PathBuf,
    pub match_info_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| DATA_DIR.to_string());
        let data_dir = Path::new(&data_dir);

        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            players_path: table_path(data_dir, "PLAYERS_CSV", PLAYERS_FILE),
            matches_path: table_path(data_dir, "MATCHES_CSV", MATCHES_FILE),
            deliveries_path: table_path(data_dir, "DELIVERIES_CSV", DELIVERIES_FILE),
            match_info_path: table_path(data_dir, "MATCH_INFO_CSV", MATCH_INFO_FILE),
        })
    }

    /// All four tables read from `dir` under their default file names.
    pub fn with_data_dir(dir: &Path) -> Self {
        Self {
            log_level: "info".to_string(),
            api_port: 3000,
            players_path: dir.join(PLAYERS_FILE),
            matches_path: dir.join(MATCHES_FILE),
            deliveries_path: dir.join(DELIVERIES_FILE),
            match_info_path: dir.join(MATCH_INFO_FILE),
        }
    }
}

/// An explicit per-table env override wins over `DATA_DIR/<default file>`.
fn table_path(data_dir: &Path, var: &str, default_file: &str) -> PathBuf {
    std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_dir.join(default_file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_joins_default_file_names() {
        let cfg = Config::with_data_dir(Path::new("/srv/ipl"));
        assert_eq!(cfg.players_path, Path::new("/srv/ipl/players_clean.csv"));
        assert_eq!(cfg.deliveries_path, Path::new("/srv/ipl/deliveries_clean.csv"));
        assert_eq!(cfg.match_info_path, Path::new("/srv/ipl/match_info.csv"));
    }
}
