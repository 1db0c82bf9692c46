use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::TOP_N;
use crate::types::{is_missing, Match, Player};

/// First `n` rows ordered by `key`. Rows with no key go last in either direction;
/// equal keys keep their input order.
pub fn top_n<T, F>(rows: &[T], key: F, ascending: bool, n: usize) -> Vec<&T>
where
    F: Fn(&T) -> Option<f64>,
{
    let mut keyed: Vec<(Option<f64>, &T)> = rows.iter().map(|r| (key(r), r)).collect();
    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) if ascending => a.total_cmp(b),
        (Some(a), Some(b)) => b.total_cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    keyed.into_iter().take(n).map(|(_, r)| r).collect()
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// Column the player leaderboard is ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerRanking {
    #[serde(rename = "Runs_Scored")]
    RunsScored,
    #[serde(rename = "Batting_Average")]
    BattingAverage,
    #[serde(rename = "Batting_Strike_Rate")]
    BattingStrikeRate,
    #[serde(rename = "Wickets_Taken")]
    WicketsTaken,
}

impl PlayerRanking {
    pub const ALL: [PlayerRanking; 4] = [
        PlayerRanking::RunsScored,
        PlayerRanking::BattingAverage,
        PlayerRanking::BattingStrikeRate,
        PlayerRanking::WicketsTaken,
    ];

    pub fn column(self) -> &'static str {
        match self {
            PlayerRanking::RunsScored => "Runs_Scored",
            PlayerRanking::BattingAverage => "Batting_Average",
            PlayerRanking::BattingStrikeRate => "Batting_Strike_Rate",
            PlayerRanking::WicketsTaken => "Wickets_Taken",
        }
    }

    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.column() == column)
    }

    fn value(self, p: &Player) -> Option<f64> {
        match self {
            PlayerRanking::RunsScored => Some(f64::from(p.runs_scored)),
            PlayerRanking::BattingAverage => p.batting_average,
            PlayerRanking::BattingStrikeRate => p.batting_strike_rate,
            PlayerRanking::WicketsTaken => Some(f64::from(p.wickets_taken)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatterRow {
    #[serde(rename = "Player_Name")]
    pub name: String,
    #[serde(rename = "Matches")]
    pub matches: u32,
    #[serde(rename = "Runs_Scored")]
    pub runs_scored: u32,
    #[serde(rename = "Batting_Average")]
    pub batting_average: Option<f64>,
    #[serde(rename = "Batting_Strike_Rate")]
    pub batting_strike_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BowlerRow {
    #[serde(rename = "Player_Name")]
    pub name: String,
    #[serde(rename = "Matches")]
    pub matches: u32,
    #[serde(rename = "Wickets_Taken")]
    pub wickets_taken: u32,
    #[serde(rename = "Bowling_Average")]
    pub bowling_average: Option<f64>,
    #[serde(rename = "Economy_Rate")]
    pub economy_rate: Option<f64>,
    #[serde(rename = "Bowling_Strike_Rate")]
    pub bowling_strike_rate: Option<f64>,
    #[serde(rename = "Best_Bowling_Match")]
    pub best_bowling_match: String,
}

impl From<&Player> for BatterRow {
    fn from(p: &Player) -> Self {
        Self {
            name: p.name.clone(),
            matches: p.matches,
            runs_scored: p.runs_scored,
            batting_average: p.batting_average,
            batting_strike_rate: p.batting_strike_rate,
        }
    }
}

impl From<&Player> for BowlerRow {
    fn from(p: &Player) -> Self {
        Self {
            name: p.name.clone(),
            matches: p.matches,
            wickets_taken: p.wickets_taken,
            bowling_average: p.bowling_average,
            economy_rate: p.economy_rate,
            bowling_strike_rate: p.bowling_strike_rate,
            best_bowling_match: p.best_bowling_match.clone(),
        }
    }
}

/// Wickets rank the bowling projection; every other column ranks batters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", content = "rows")]
pub enum PlayerLeaderboard {
    #[serde(rename = "Top Batters")]
    Batters(Vec<BatterRow>),
    #[serde(rename = "Top Bowlers")]
    Bowlers(Vec<BowlerRow>),
}

pub fn top_players(players: &[Player], by: PlayerRanking) -> PlayerLeaderboard {
    let top = top_n(players, |p| by.value(p), false, TOP_N);
    match by {
        PlayerRanking::WicketsTaken => {
            PlayerLeaderboard::Bowlers(top.into_iter().map(BowlerRow::from).collect())
        }
        _ => PlayerLeaderboard::Batters(top.into_iter().map(BatterRow::from).collect()),
    }
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRanking {
    BiggestMargins,
    HighestFirstInnings,
    HighestChases,
    SuperOvers,
}

impl MatchRanking {
    pub fn title(self) -> &'static str {
        match self {
            MatchRanking::BiggestMargins => "Biggest win margins",
            MatchRanking::HighestFirstInnings => "Highest 1st inning scores",
            MatchRanking::HighestChases => "Highest successful chases",
            MatchRanking::SuperOvers => "Super Over Matches",
        }
    }
}

pub fn rank_matches(matches: &[Match], ranking: MatchRanking) -> Vec<Match> {
    let ranked: Vec<&Match> = match ranking {
        MatchRanking::BiggestMargins => top_n(matches, |m| m.result_margin, false, TOP_N),
        MatchRanking::HighestFirstInnings => {
            let defended: Vec<&Match> = matches.iter().filter(|m| m.result == "runs").collect();
            top_n(&defended, |m| m.target_runs, false, TOP_N)
                .into_iter()
                .copied()
                .collect()
        }
        MatchRanking::HighestChases => {
            let chased: Vec<&Match> = matches.iter().filter(|m| m.result == "wickets").collect();
            top_n(&chased, |m| m.target_runs, false, TOP_N)
                .into_iter()
                .copied()
                .collect()
        }
        MatchRanking::SuperOvers => matches.iter().filter(|m| m.is_super_over()).collect(),
    };
    ranked.into_iter().cloned().collect()
}

// ---------------------------------------------------------------------------
// Value-count leaderboards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaderOption {
    #[serde(rename = "Player of match")]
    PlayerOfMatch,
    #[serde(rename = "Toss winners")]
    TossWinners,
    #[serde(rename = "Toss decisions")]
    TossDecisions,
    #[serde(rename = "City")]
    City,
}

/// Source column and the two display headers of one leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderColumns {
    pub source_column: &'static str,
    pub display_name: &'static str,
    pub count_label: &'static str,
}

impl LeaderOption {
    pub const ALL: [LeaderOption; 4] = [
        LeaderOption::PlayerOfMatch,
        LeaderOption::TossWinners,
        LeaderOption::TossDecisions,
        LeaderOption::City,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LeaderOption::PlayerOfMatch => "Player of match",
            LeaderOption::TossWinners => "Toss winners",
            LeaderOption::TossDecisions => "Toss decisions",
            LeaderOption::City => "City",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.label() == label)
    }

    pub fn columns(self) -> LeaderColumns {
        let (source_column, display_name, count_label) = match self {
            LeaderOption::PlayerOfMatch => ("player_of_match", "Player", "Number of MoM's"),
            LeaderOption::TossWinners => ("toss_winner", "Teams", "Number of Toss wins"),
            LeaderOption::TossDecisions => ("toss_decision", "Toss", "Teams chose"),
            LeaderOption::City => ("city", "City", "Number of Times"),
        };
        LeaderColumns { source_column, display_name, count_label }
    }

    fn value(self, m: &Match) -> Option<&str> {
        let value = match self {
            LeaderOption::PlayerOfMatch => m.player_of_match.as_deref(),
            LeaderOption::TossWinners => Some(m.toss_winner.as_str()),
            LeaderOption::TossDecisions => Some(m.toss_decision.as_str()),
            LeaderOption::City => m.city.as_deref(),
        };
        value.filter(|v| !is_missing(v))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub title: String,
    /// Match column the counts come from.
    pub column: String,
    pub display_name: String,
    pub count_label: String,
    pub rows: Vec<LeaderRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderRow {
    pub value: String,
    pub count: u32,
}

/// Occurrence counts of the option's column, most frequent first, top `TOP_N`.
/// Equal counts keep first-seen order.
pub fn leaderboard(matches: &[Match], option: LeaderOption) -> Leaderboard {
    let mut counts: Vec<LeaderRow> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for value in matches.iter().filter_map(|m| option.value(m)) {
        match index.get(value).copied() {
            Some(i) => counts[i].count += 1,
            None => {
                index.insert(value, counts.len());
                counts.push(LeaderRow { value: value.to_string(), count: 1 });
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_N);

    let cols = option.columns();
    Leaderboard {
        title: format!("Top {}", option.label()),
        column: cols.source_column.to_string(),
        display_name: cols.display_name.to_string(),
        count_label: cols.count_label.to_string(),
        rows: counts,
    }
}
