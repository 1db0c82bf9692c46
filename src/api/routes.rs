use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderName},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analytics::{
    bin_innings, compute_team_records, leaderboard, rank_matches, rankings::Leaderboard,
    rankings::PlayerLeaderboard, top_players, LeaderOption, MatchRanking, PlayerRanking,
};
use crate::api::health::HealthResponse;
use crate::charts::{build_match_charts, MatchCharts};
use crate::config::{MATCH_ID_MAX, MATCH_ID_MIN, PREVIEW_ROWS};
use crate::error::{AppError, Result};
use crate::loader::Datasets;
use crate::types::{InningsView, Match, Player, RawTable, TeamRecord};

#[derive(Clone)]
pub struct ApiState {
    pub data: Arc<Datasets>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/players", get(get_players))
        .route("/players/top", get(get_top_players))
        .route("/players/export", get(export_players))
        .route("/matches", get(get_matches))
        .route("/matches/team-records", get(get_team_records))
        .route("/matches/biggest-margins", get(get_biggest_margins))
        .route("/matches/highest-first-innings", get(get_highest_first_innings))
        .route("/matches/highest-chases", get(get_highest_chases))
        .route("/matches/super-overs", get(get_super_overs))
        .route("/matches/leaders", get(get_leaders))
        .route("/matches/:id/overs", get(get_match_overs))
        .route("/matches/:id/charts", get(get_match_charts))
        .route("/match-info", get(get_match_info))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct PreviewQuery {
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct TopPlayersQuery {
    /// Ranking column, e.g. `Runs_Scored`.
    pub by: Option<String>,
}

#[derive(Deserialize)]
pub struct LeadersQuery {
    /// Leaderboard label, e.g. `Toss winners`.
    pub option: Option<String>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct MatchListResponse {
    pub title: String,
    pub rows: Vec<Match>,
}

#[derive(Serialize)]
pub struct OversResponse {
    pub match_id: u32,
    pub first_innings: InningsView,
    pub second_innings: InningsView,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse::from_datasets(&state.data))
}

async fn get_players(
    State(state): State<ApiState>,
    Query(params): Query<PreviewQuery>,
) -> Result<Json<Vec<Player>>> {
    let limit = params.limit.unwrap_or(PREVIEW_ROWS);
    let rows = state.data.players()?.iter().take(limit).cloned().collect();
    Ok(Json(rows))
}

async fn get_top_players(
    State(state): State<ApiState>,
    Query(params): Query<TopPlayersQuery>,
) -> Result<Json<PlayerLeaderboard>> {
    let by = match params.by.as_deref() {
        None => PlayerRanking::RunsScored,
        Some(column) => PlayerRanking::from_column(column)
            .ok_or_else(|| AppError::InvalidSelection(format!("unknown player column {column}")))?,
    };
    let players = state.data.players()?;
    debug!(column = by.column(), "Ranking {} players", players.len());
    Ok(Json(top_players(players, by)))
}

async fn export_players(
    State(state): State<ApiState>,
) -> Result<([(HeaderName, &'static str); 2], Vec<u8>)> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for p in state.data.players()? {
        wtr.serialize(p)?;
    }
    let body = wtr.into_inner().map_err(|e| AppError::Io(e.into_error()))?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"data.csv\""),
        ],
        body,
    ))
}

async fn get_matches(
    State(state): State<ApiState>,
    Query(params): Query<PreviewQuery>,
) -> Result<Json<Vec<Match>>> {
    let limit = params.limit.unwrap_or(PREVIEW_ROWS);
    let rows = state.data.matches()?.iter().take(limit).cloned().collect();
    Ok(Json(rows))
}

async fn get_team_records(State(state): State<ApiState>) -> Result<Json<Vec<TeamRecord>>> {
    let records = compute_team_records(state.data.matches()?)?;
    Ok(Json(records))
}

fn match_list(state: &ApiState, ranking: MatchRanking) -> Result<Json<MatchListResponse>> {
    let rows = rank_matches(state.data.matches()?, ranking);
    Ok(Json(MatchListResponse { title: ranking.title().to_string(), rows }))
}

async fn get_biggest_margins(State(state): State<ApiState>) -> Result<Json<MatchListResponse>> {
    match_list(&state, MatchRanking::BiggestMargins)
}

async fn get_highest_first_innings(
    State(state): State<ApiState>,
) -> Result<Json<MatchListResponse>> {
    match_list(&state, MatchRanking::HighestFirstInnings)
}

async fn get_highest_chases(State(state): State<ApiState>) -> Result<Json<MatchListResponse>> {
    match_list(&state, MatchRanking::HighestChases)
}

async fn get_super_overs(State(state): State<ApiState>) -> Result<Json<MatchListResponse>> {
    match_list(&state, MatchRanking::SuperOvers)
}

async fn get_leaders(
    State(state): State<ApiState>,
    Query(params): Query<LeadersQuery>,
) -> Result<Json<Leaderboard>> {
    let option = match params.option.as_deref() {
        None => LeaderOption::PlayerOfMatch,
        Some(label) => LeaderOption::from_label(label)
            .ok_or_else(|| AppError::InvalidSelection(format!("unknown leaderboard {label}")))?,
    };
    Ok(Json(leaderboard(state.data.matches()?, option)))
}

async fn get_match_info(
    State(state): State<ApiState>,
    Query(params): Query<PreviewQuery>,
) -> Result<Json<RawTable>> {
    let limit = params.limit.unwrap_or(PREVIEW_ROWS);
    Ok(Json(state.data.match_info()?.head(limit)))
}

fn check_match_id(id: u32) -> Result<u32> {
    if (MATCH_ID_MIN..=MATCH_ID_MAX).contains(&id) {
        Ok(id)
    } else {
        Err(AppError::InvalidSelection(format!(
            "match id {id} outside {MATCH_ID_MIN}..={MATCH_ID_MAX}"
        )))
    }
}

async fn get_match_overs(
    State(state): State<ApiState>,
    Path(id): Path<u32>,
) -> Result<Json<OversResponse>> {
    let match_id = check_match_id(id)?;
    let deliveries = state.data.deliveries_for(match_id)?;
    let (first_innings, second_innings) = bin_innings(&deliveries);
    Ok(Json(OversResponse { match_id, first_innings, second_innings }))
}

async fn get_match_charts(
    State(state): State<ApiState>,
    Path(id): Path<u32>,
) -> Result<Json<MatchCharts>> {
    let match_id = check_match_id(id)?;
    let deliveries = state.data.deliveries_for(match_id)?;
    if deliveries.is_empty() {
        debug!(match_id, "No deliveries recorded for match");
    }
    Ok(Json(build_match_charts(match_id, &deliveries)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Delivery;

    fn player(name: &str, runs: u32, wickets: u32) -> Player {
        Player {
            name: name.to_string(),
            matches: 20,
            runs_scored: runs,
            batting_average: Some(30.0),
            batting_strike_rate: None,
            wickets_taken: wickets,
            bowling_average: None,
            economy_rate: Some(8.0),
            bowling_strike_rate: None,
            best_bowling_match: "2/18".to_string(),
        }
    }

    fn fixture(team1: &str, team2: &str, winner: &str) -> Match {
        Match {
            match_id: None,
            team1: team1.to_string(),
            team2: team2.to_string(),
            winner: Some(winner.to_string()),
            toss_winner: team2.to_string(),
            toss_decision: "field".to_string(),
            city: Some("Delhi".to_string()),
            result: "wickets".to_string(),
            result_margin: Some(6.0),
            target_runs: Some(171.0),
            super_over: "N".to_string(),
            player_of_match: Some("Someone".to_string()),
        }
    }

    fn ball(match_id: u32, inning: u8, over: u32, total_runs: u32) -> Delivery {
        Delivery {
            match_id,
            inning,
            over,
            batting_team: "DC".to_string(),
            bowling_team: "PBKS".to_string(),
            total_runs,
            is_wicket: 0,
        }
    }

    fn full_state() -> ApiState {
        let data = Datasets::from_parts(
            Some(vec![player("A", 500, 3), player("B", 700, 30)]),
            Some(vec![fixture("DC", "PBKS", "DC"), fixture("PBKS", "DC", "PBKS")]),
            Some(vec![ball(3, 1, 0, 4), ball(3, 1, 1, 2), ball(3, 2, 0, 1), ball(4, 1, 0, 6)]),
            Some(RawTable {
                headers: vec!["id".to_string()],
                rows: (1..=8).map(|i| vec![i.to_string()]).collect(),
            }),
        );
        ApiState { data: Arc::new(data) }
    }

    fn players_only_state() -> ApiState {
        let data = Datasets::from_parts(Some(vec![player("A", 1, 0)]), None, None, None);
        ApiState { data: Arc::new(data) }
    }

    #[tokio::test]
    async fn top_players_defaults_to_runs() {
        let Json(board) = get_top_players(State(full_state()), Query(TopPlayersQuery { by: None }))
            .await
            .unwrap();
        match board {
            PlayerLeaderboard::Batters(rows) => assert_eq!(rows[0].name, "B"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_ranking_column_is_bad_request() {
        let err = get_top_players(
            State(full_state()),
            Query(TopPlayersQuery { by: Some("Sixes".to_string()) }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidSelection(_)));
    }

    #[tokio::test]
    async fn team_records_from_loaded_matches() {
        let Json(records) = get_team_records(State(full_state())).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.matches == 2 && r.wins == 1 && r.win_percentage == 50.0));
    }

    #[tokio::test]
    async fn views_without_their_table_degrade() {
        let state = players_only_state();
        assert!(matches!(
            get_team_records(State(state.clone())).await,
            Err(AppError::TableUnavailable("matches"))
        ));
        assert!(matches!(
            get_match_charts(State(state.clone()), Path(1)).await,
            Err(AppError::TableUnavailable("deliveries"))
        ));
        assert!(get_players(State(state), Query(PreviewQuery { limit: None })).await.is_ok());
    }

    #[tokio::test]
    async fn player_views_without_players_table_degrade() {
        let data = Datasets::from_parts(None, Some(vec![fixture("DC", "PBKS", "DC")]), None, None);
        let state = ApiState { data: Arc::new(data) };
        assert!(matches!(
            get_top_players(State(state.clone()), Query(TopPlayersQuery { by: None })).await,
            Err(AppError::TableUnavailable("players"))
        ));
        assert!(matches!(
            export_players(State(state.clone())).await,
            Err(AppError::TableUnavailable("players"))
        ));
        assert!(matches!(
            get_players(State(state.clone()), Query(PreviewQuery { limit: None })).await,
            Err(AppError::TableUnavailable("players"))
        ));
        assert!(get_team_records(State(state)).await.is_ok());
    }

    #[tokio::test]
    async fn match_without_deliveries_gives_empty_charts() {
        let Json(charts) = get_match_charts(State(full_state()), Path(1000)).await.unwrap();
        assert_eq!(charts.teams, None);
        assert!(charts.over_bars.series.is_empty());

        let Json(overs) = get_match_overs(State(full_state()), Path(1000)).await.unwrap();
        assert!(overs.first_innings.is_empty());
        assert!(overs.second_innings.is_empty());
    }

    #[tokio::test]
    async fn match_overs_are_binned() {
        let Json(overs) = get_match_overs(State(full_state()), Path(3)).await.unwrap();
        assert_eq!(overs.first_innings.cumulative, vec![4, 6]);
        assert_eq!(overs.second_innings.cumulative, vec![1]);
    }

    #[tokio::test]
    async fn match_id_out_of_range_is_rejected() {
        for id in [0, MATCH_ID_MAX + 1] {
            let err = get_match_charts(State(full_state()), Path(id)).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidSelection(_)), "id {id}");
        }
    }

    #[tokio::test]
    async fn previews_default_to_five_rows() {
        let Json(info) = get_match_info(State(full_state()), Query(PreviewQuery { limit: None }))
            .await
            .unwrap();
        assert_eq!(info.rows.len(), PREVIEW_ROWS);

        let Json(info) = get_match_info(State(full_state()), Query(PreviewQuery { limit: Some(2) }))
            .await
            .unwrap();
        assert_eq!(info.rows.len(), 2);
    }

    #[tokio::test]
    async fn leaders_and_rankings() {
        let Json(board) = get_leaders(
            State(full_state()),
            Query(LeadersQuery { option: Some("Toss winners".to_string()) }),
        )
        .await
        .unwrap();
        assert_eq!(board.display_name, "Teams");
        assert_eq!(board.rows.len(), 2);

        let Json(chases) = get_highest_chases(State(full_state())).await.unwrap();
        assert_eq!(chases.title, "Highest successful chases");
        assert_eq!(chases.rows.len(), 2);

        let Json(supers) = get_super_overs(State(full_state())).await.unwrap();
        assert!(supers.rows.is_empty());
    }

    #[tokio::test]
    async fn export_writes_csv_with_header() {
        let (_, body) = export_players(State(full_state())).await.unwrap();
        let text = String::from_utf8(body).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("Player_Name,Matches,Runs_Scored"));
        assert_eq!(lines.count(), 2);
    }
}
