//! Load status for the /health endpoint.

use serde::Serialize;

use crate::loader::{Datasets, TableStatus};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// True when every table loaded.
    pub all_loaded: bool,
    pub tables: Vec<TableStatus>,
}

impl HealthResponse {
    pub fn from_datasets(data: &Datasets) -> Self {
        let tables = data.status().to_vec();
        Self {
            all_loaded: tables.iter().all(|t| t.loaded),
            tables,
        }
    }
}
