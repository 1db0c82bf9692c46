use serde::{Deserialize, Deserializer, Serialize};

/// Text cells the upstream cleaning step leaves behind for "no value".
const MISSING_MARKERS: &[&str] = &["NA", "N/A", "nan", "NaN", "None", "null"];

fn missing_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| !is_missing(v)))
}

/// True for an empty cell or one of the NA spellings found in the source tables.
pub fn is_missing(value: &str) -> bool {
    value.is_empty() || MISSING_MARKERS.contains(&value)
}

// ---------------------------------------------------------------------------
// Source rows — one struct per CSV table, immutable after load
// ---------------------------------------------------------------------------

/// One ball bowled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub match_id: u32,
    /// 1 or 2 for regular innings; super-over innings use higher numbers.
    pub inning: u8,
    /// 0-based over index.
    pub over: u32,
    pub batting_team: String,
    pub bowling_team: String,
    pub total_runs: u32,
    /// 0/1 flag.
    pub is_wicket: u8,
}

/// One completed fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    #[serde(default, alias = "id", deserialize_with = "csv::invalid_option")]
    pub match_id: Option<u32>,
    pub team1: String,
    pub team2: String,
    /// Empty or NA for no-result fixtures.
    #[serde(default, deserialize_with = "missing_as_none")]
    pub winner: Option<String>,
    #[serde(default)]
    pub toss_winner: String,
    #[serde(default)]
    pub toss_decision: String,
    #[serde(default, deserialize_with = "missing_as_none")]
    pub city: Option<String>,
    #[serde(default)]
    pub result: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub result_margin: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub target_runs: Option<f64>,
    #[serde(default)]
    pub super_over: String,
    #[serde(default, deserialize_with = "missing_as_none")]
    pub player_of_match: Option<String>,
}

impl Match {
    pub fn is_super_over(&self) -> bool {
        self.super_over == "Y"
    }
}

/// Career aggregates per player, precomputed upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    #[serde(rename = "Player_Name")]
    pub name: String,
    #[serde(rename = "Matches")]
    pub matches: u32,
    #[serde(rename = "Runs_Scored")]
    pub runs_scored: u32,
    #[serde(rename = "Batting_Average", default, deserialize_with = "csv::invalid_option")]
    pub batting_average: Option<f64>,
    #[serde(rename = "Batting_Strike_Rate", default, deserialize_with = "csv::invalid_option")]
    pub batting_strike_rate: Option<f64>,
    #[serde(rename = "Wickets_Taken")]
    pub wickets_taken: u32,
    #[serde(rename = "Bowling_Average", default, deserialize_with = "csv::invalid_option")]
    pub bowling_average: Option<f64>,
    #[serde(rename = "Economy_Rate", default, deserialize_with = "csv::invalid_option")]
    pub economy_rate: Option<f64>,
    #[serde(rename = "Bowling_Strike_Rate", default, deserialize_with = "csv::invalid_option")]
    pub bowling_strike_rate: Option<f64>,
    #[serde(rename = "Best_Bowling_Match", default)]
    pub best_bowling_match: String,
}

/// Auxiliary per-match metadata, kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn head(&self, n: usize) -> RawTable {
        RawTable {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverBin {
    /// 0-based over number this bin covers.
    pub over: u32,
    pub runs: u32,
    pub wickets: u32,
}

/// Per-over bins of one innings. Overs without deliveries are absent, so
/// `bins[i].over` need not equal `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningsView {
    pub bins: Vec<OverBin>,
    /// Running total of `bins[..=i].runs`.
    pub cumulative: Vec<u32>,
}

impl InningsView {
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn total_runs(&self) -> u32 {
        self.cumulative.last().copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub team: String,
    pub matches: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_percentage: f64,
}
