use std::collections::BTreeMap;

use crate::config::TOP_N;
use crate::error::{AppError, Result};
use crate::types::{Match, TeamRecord};

/// Per-team wins/losses over every fixture, best win percentage first, at most `TOP_N` rows.
///
/// Wins and appearances are joined by team name. A winner that never appears as
/// team1/team2 (or wins more often than it plays) is rejected as a data-integrity error.
pub fn compute_team_records(matches: &[Match]) -> Result<Vec<TeamRecord>> {
    let mut appearances: BTreeMap<&str, u32> = BTreeMap::new();
    for m in matches {
        *appearances.entry(m.team1.as_str()).or_default() += 1;
        *appearances.entry(m.team2.as_str()).or_default() += 1;
    }

    let mut wins: BTreeMap<&str, u32> = BTreeMap::new();
    for winner in matches.iter().filter_map(|m| m.winner.as_deref()) {
        *wins.entry(winner).or_default() += 1;
    }

    for (team, &won) in &wins {
        let played = appearances.get(team).copied().unwrap_or(0);
        if won > played {
            return Err(AppError::DataIntegrity(format!(
                "{team} has {won} wins but only {played} appearances"
            )));
        }
    }

    let mut records = appearances
        .into_iter()
        .map(|(team, played)| {
            let won = wins.get(team).copied().unwrap_or(0);
            Ok(TeamRecord {
                team: team.to_string(),
                matches: played,
                wins: won,
                losses: played - won,
                win_percentage: win_percentage(won, played)?,
            })
        })
        .collect::<Result<Vec<TeamRecord>>>()?;

    // Stable: equal percentages keep alphabetical order.
    records.sort_by(|a, b| b.win_percentage.total_cmp(&a.win_percentage));
    records.truncate(TOP_N);
    Ok(records)
}

/// `wins / played * 100` rounded half-up to 2 decimals, computed on integers so
/// that exact `.xx5` values always round up.
fn win_percentage(wins: u32, played: u32) -> Result<f64> {
    if played == 0 {
        return Err(AppError::DataIntegrity(format!(
            "win percentage of {wins} wins over zero matches"
        )));
    }
    let (wins, played) = (u64::from(wins), u64::from(played));
    let hundredths = (wins * 20_000 + played) / (2 * played);
    Ok(hundredths as f64 / 100.0)
}
