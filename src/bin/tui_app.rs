use serde::de::DeserializeOwned;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// API response types (mirror routes.rs shapes)
// ---------------------------------------------------------------------------

pub const MATCH_ID_MIN: u32 = 1;
pub const MATCH_ID_MAX: u32 = 1095;
pub const PREVIEW_ROWS: usize = 5;

pub const PLAYER_COLUMNS: [&str; 4] = [
    "Runs_Scored",
    "Batting_Average",
    "Batting_Strike_Rate",
    "Wickets_Taken",
];

pub const LEADER_OPTIONS: [&str; 4] = ["Player of match", "Toss winners", "Toss decisions", "City"];

/// Route suffix under /matches for each match ranking.
pub const MATCH_RANKINGS: [&str; 4] = [
    "biggest-margins",
    "highest-first-innings",
    "highest-chases",
    "super-overs",
];

#[derive(Debug, Clone, Deserialize, Default)]
#[allow(dead_code)]
pub struct TableStatusResponse {
    pub table: String,
    pub loaded: bool,
    pub rows: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct HealthResponse {
    pub all_loaded: bool,
    pub tables: Vec<TableStatusResponse>,
}

/// One player row. Leaderboard projections fill only their own columns; the
/// preview fills all of them.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerRowResponse {
    #[serde(rename = "Player_Name")]
    pub name: String,
    #[serde(rename = "Matches")]
    pub matches: u32,
    #[serde(rename = "Runs_Scored")]
    pub runs_scored: Option<u32>,
    #[serde(rename = "Batting_Average")]
    pub batting_average: Option<f64>,
    #[serde(rename = "Batting_Strike_Rate")]
    pub batting_strike_rate: Option<f64>,
    #[serde(rename = "Wickets_Taken")]
    pub wickets_taken: Option<u32>,
    #[serde(rename = "Bowling_Average")]
    pub bowling_average: Option<f64>,
    #[serde(rename = "Economy_Rate")]
    pub economy_rate: Option<f64>,
    #[serde(rename = "Bowling_Strike_Rate")]
    pub bowling_strike_rate: Option<f64>,
    #[serde(rename = "Best_Bowling_Match")]
    pub best_bowling_match: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerBoardResponse {
    /// "Top Batters" or "Top Bowlers".
    pub view: String,
    pub rows: Vec<PlayerRowResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamRecordResponse {
    pub team: String,
    pub matches: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_percentage: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchRowResponse {
    pub match_id: Option<u32>,
    pub team1: String,
    pub team2: String,
    #[serde(default)]
    pub toss_winner: String,
    #[serde(default)]
    pub toss_decision: String,
    pub winner: Option<String>,
    pub city: Option<String>,
    pub result: String,
    pub result_margin: Option<f64>,
    pub target_runs: Option<f64>,
    pub player_of_match: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchListResponse {
    pub title: String,
    pub rows: Vec<MatchRowResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderRowResponse {
    pub value: String,
    pub count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardResponse {
    pub title: String,
    pub display_name: String,
    pub count_label: String,
    pub rows: Vec<LeaderRowResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeriesResponse {
    pub name: String,
    pub x: Vec<u32>,
    pub y: Vec<u32>,
    pub text: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub series: Vec<SeriesResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamsResponse {
    pub batting: String,
    pub bowling: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchChartsResponse {
    pub match_id: u32,
    pub teams: Option<TeamsResponse>,
    pub headings: Vec<String>,
    pub over_bars: ChartResponse,
    pub over_lines: ChartResponse,
    pub worm: ChartResponse,
}

impl MatchChartsResponse {
    /// Heading of chart `i` (bars, lines, worm), falling back to the chart title.
    pub fn heading(&self, i: usize, chart: &ChartResponse) -> String {
        self.headings.get(i).cloned().unwrap_or_else(|| chart.title.clone())
    }
}

/// Header row plus string cells; `/match-info` answers in this shape and the
/// players/matches previews are flattened into it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviewTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl From<Vec<PlayerRowResponse>> for PreviewTable {
    fn from(players: Vec<PlayerRowResponse>) -> Self {
        let headers = [
            "Player_Name",
            "Matches",
            "Runs_Scored",
            "Batting_Average",
            "Batting_Strike_Rate",
            "Wickets_Taken",
            "Bowling_Average",
            "Economy_Rate",
            "Bowling_Strike_Rate",
            "Best_Bowling_Match",
        ];
        let rows = players
            .into_iter()
            .map(|p| {
                vec![
                    p.name,
                    p.matches.to_string(),
                    format_count(p.runs_scored),
                    format_opt(p.batting_average),
                    format_opt(p.batting_strike_rate),
                    format_count(p.wickets_taken),
                    format_opt(p.bowling_average),
                    format_opt(p.economy_rate),
                    format_opt(p.bowling_strike_rate),
                    p.best_bowling_match.unwrap_or_default(),
                ]
            })
            .collect();
        Self { headers: headers.map(str::to_string).to_vec(), rows }
    }
}

impl From<Vec<MatchRowResponse>> for PreviewTable {
    fn from(matches: Vec<MatchRowResponse>) -> Self {
        let headers = [
            "id",
            "team1",
            "team2",
            "toss_winner",
            "toss_decision",
            "winner",
            "result",
            "result_margin",
            "target_runs",
            "city",
            "player_of_match",
        ];
        let rows = matches
            .into_iter()
            .map(|m| {
                vec![
                    m.match_id.map(|id| id.to_string()).unwrap_or_default(),
                    m.team1,
                    m.team2,
                    m.toss_winner,
                    m.toss_decision,
                    m.winner.unwrap_or_default(),
                    m.result,
                    format_opt(m.result_margin),
                    format_opt(m.target_runs),
                    m.city.unwrap_or_default(),
                    m.player_of_match.unwrap_or_default(),
                ]
            })
            .collect();
        Self { headers: headers.map(str::to_string).to_vec(), rows }
    }
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Error(String),
    Connecting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Players,
    Matches,
    MatchInfo,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Players, Tab::Matches, Tab::MatchInfo];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Players => "Players",
            Tab::Matches => "Matches",
            Tab::MatchInfo => "Match Info",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Tab {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

/// A view fetched from the API: data, or the server's reason for having none.
#[derive(Debug, Clone)]
pub enum View<T> {
    Empty,
    Ready(T),
    Unavailable(String),
}

impl<T> Default for View<T> {
    fn default() -> Self {
        View::Empty
    }
}

impl<T> From<Result<T, String>> for View<T> {
    fn from(r: Result<T, String>) -> Self {
        match r {
            Ok(v) => View::Ready(v),
            Err(e) => View::Unavailable(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub status: ConnectionStatus,
    pub tab: Tab,
    pub health: HealthResponse,
    pub player_column: usize,
    pub players: View<PlayerBoardResponse>,
    pub team_records: View<Vec<TeamRecordResponse>>,
    pub match_ranking: usize,
    pub match_list: View<MatchListResponse>,
    pub leader_option: usize,
    pub leaders: View<LeaderboardResponse>,
    pub match_id: u32,
    pub charts: View<MatchChartsResponse>,
    pub show_preview: bool,
    pub preview: View<PreviewTable>,
    pub last_refresh: std::time::Instant,
    pub base_url: String,
}

impl AppState {
    pub fn new(base_url: String) -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            tab: Tab::Players,
            health: HealthResponse::default(),
            player_column: 0,
            players: View::Empty,
            team_records: View::Empty,
            match_ranking: 0,
            match_list: View::Empty,
            leader_option: 0,
            leaders: View::Empty,
            match_id: MATCH_ID_MIN,
            charts: View::Empty,
            show_preview: false,
            preview: View::Empty,
            last_refresh: std::time::Instant::now(),
            base_url,
        }
    }

    pub fn player_column(&self) -> &'static str {
        PLAYER_COLUMNS[self.player_column % PLAYER_COLUMNS.len()]
    }

    pub fn leader_option(&self) -> &'static str {
        LEADER_OPTIONS[self.leader_option % LEADER_OPTIONS.len()]
    }

    pub fn match_ranking(&self) -> &'static str {
        MATCH_RANKINGS[self.match_ranking % MATCH_RANKINGS.len()]
    }

    /// Cycle the dropdown of the current tab.
    pub fn cycle_option(&mut self) {
        match self.tab {
            Tab::Players => self.player_column = (self.player_column + 1) % PLAYER_COLUMNS.len(),
            Tab::Matches => self.leader_option = (self.leader_option + 1) % LEADER_OPTIONS.len(),
            Tab::MatchInfo => {}
        }
    }

    /// Show or hide the data preview pane above the current tab.
    pub fn toggle_preview(&mut self) {
        self.show_preview = !self.show_preview;
        self.preview = View::Empty;
    }

    pub fn top_players_request(&self, client: &reqwest::Client) -> reqwest::RequestBuilder {
        client
            .get(format!("{}/players/top", self.base_url))
            .query(&[("by", self.player_column())])
    }

    pub fn leaders_request(&self, client: &reqwest::Client) -> reqwest::RequestBuilder {
        client
            .get(format!("{}/matches/leaders", self.base_url))
            .query(&[("option", self.leader_option())])
    }

    /// Preview source of the current tab.
    pub fn preview_request(&self, client: &reqwest::Client) -> reqwest::RequestBuilder {
        let path = match self.tab {
            Tab::Players => "players",
            Tab::Matches => "matches",
            Tab::MatchInfo => "match-info",
        };
        client
            .get(format!("{}/{path}", self.base_url))
            .query(&[("limit", PREVIEW_ROWS)])
    }

    pub fn cycle_match_ranking(&mut self) {
        self.match_ranking = (self.match_ranking + 1) % MATCH_RANKINGS.len();
    }

    /// Move the match slider, clamped to the selectable range.
    pub fn step_match(&mut self, delta: i64) {
        let next = i64::from(self.match_id) + delta;
        self.match_id = next.clamp(i64::from(MATCH_ID_MIN), i64::from(MATCH_ID_MAX)) as u32;
    }

    pub async fn refresh(&mut self, client: &reqwest::Client) {
        let health_url = format!("{}/health", self.base_url);
        match client.get(&health_url).send().await {
            Ok(resp) => match resp.json::<HealthResponse>().await {
                Ok(h) => {
                    self.health = h;
                    self.status = ConnectionStatus::Connected;
                }
                Err(e) => {
                    self.status = ConnectionStatus::Error(format!("parse error: {e}"));
                    return;
                }
            },
            Err(e) => {
                self.status = ConnectionStatus::Error(format!("{e}"));
                return;
            }
        }

        if self.show_preview {
            let request = self.preview_request(client);
            self.preview = match self.tab {
                Tab::Players => fetch_json::<Vec<PlayerRowResponse>>(request)
                    .await
                    .map(PreviewTable::from),
                Tab::Matches => fetch_json::<Vec<MatchRowResponse>>(request)
                    .await
                    .map(PreviewTable::from),
                Tab::MatchInfo => fetch_json::<PreviewTable>(request).await,
            }
            .into();
        }

        match self.tab {
            Tab::Players => {
                self.players = fetch_json(self.top_players_request(client)).await.into();
            }
            Tab::Matches => {
                let records = client.get(format!("{}/matches/team-records", self.base_url));
                let list = client.get(format!("{}/matches/{}", self.base_url, self.match_ranking()));
                let (records, list, leaders) = tokio::join!(
                    fetch_json(records),
                    fetch_json(list),
                    fetch_json(self.leaders_request(client)),
                );
                self.team_records = records.into();
                self.match_list = list.into();
                self.leaders = leaders.into();
            }
            Tab::MatchInfo => {
                let charts = client.get(format!("{}/matches/{}/charts", self.base_url, self.match_id));
                self.charts = fetch_json(charts).await.into();
            }
        }
        self.last_refresh = std::time::Instant::now();
    }
}

/// Sends `request` and decodes JSON. A non-2xx answer becomes its body text.
async fn fetch_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, String> {
    let resp = request.send().await.map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(if body.is_empty() { status.to_string() } else { body });
    }
    resp.json::<T>().await.map_err(|e| format!("parse error: {e}"))
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

pub fn format_opt(v: Option<f64>) -> String {
    v.map_or("—".to_string(), |v| format!("{v:.2}"))
}

pub fn format_count(v: Option<u32>) -> String {
    v.map_or("—".to_string(), |v| v.to_string())
}

/// Runs per over for overs 1..=20, zero where the series has no bin.
pub fn per_over(series: &SeriesResponse) -> [u64; 20] {
    let mut out = [0u64; 20];
    for (&x, &y) in series.x.iter().zip(&series.y) {
        if (1..=20).contains(&x) {
            out[(x - 1) as usize] = u64::from(y);
        }
    }
    out
}

/// Wickets per over for overs 1..=20, read from the "Runs: r<br>Wickets: w" bar annotations.
pub fn wickets_per_over(series: &SeriesResponse) -> [u64; 20] {
    let mut out = [0u64; 20];
    for (&x, text) in series.x.iter().zip(&series.text) {
        let wickets = text
            .split("Wickets: ")
            .nth(1)
            .and_then(|w| w.trim().parse::<u64>().ok());
        if let (true, Some(w)) = ((1..=20).contains(&x), wickets) {
            out[(x - 1) as usize] = w;
        }
    }
    out
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

#[allow(dead_code)]
fn main() {
    // Shared by the ipl-tui binary; entry point lives in src/bin/tui.rs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_clamps_to_match_range() {
        let mut app = AppState::new("http://localhost:3000".to_string());
        app.step_match(-10);
        assert_eq!(app.match_id, MATCH_ID_MIN);
        app.step_match(2000);
        assert_eq!(app.match_id, MATCH_ID_MAX);
        app.step_match(-1);
        assert_eq!(app.match_id, MATCH_ID_MAX - 1);
    }

    #[test]
    fn options_cycle_per_tab() {
        let mut app = AppState::new(String::new());
        app.cycle_option();
        assert_eq!(app.player_column(), "Batting_Average");
        app.tab = app.tab.next();
        app.cycle_option();
        assert_eq!(app.leader_option(), "Toss winners");
        assert_eq!(app.player_column(), "Batting_Average");
        assert_eq!(app.tab.next().next(), Tab::Players);
    }

    #[test]
    fn per_over_places_bins_by_over() {
        let series = SeriesResponse {
            name: "CSK - 1st Inn".to_string(),
            x: vec![1, 3, 21],
            y: vec![5, 9, 4],
            text: Vec::new(),
        };
        let runs = per_over(&series);
        assert_eq!(&runs[..4], &[5, 0, 9, 0]);
        assert_eq!(runs.iter().sum::<u64>(), 14);
    }

    #[test]
    fn query_values_are_percent_encoded() {
        let client = reqwest::Client::new();
        let mut app = AppState::new("http://localhost:3000".to_string());
        app.leader_option = 0;
        let req = app.leaders_request(&client).build().unwrap();
        assert_eq!(req.url().path(), "/matches/leaders");
        assert_eq!(req.url().query(), Some("option=Player+of+match"));

        let pairs: Vec<(String, String)> = client
            .get("http://localhost:3000/matches/leaders")
            .query(&[("option", "A&B+C#D")])
            .build()
            .unwrap()
            .url()
            .query_pairs()
            .into_owned()
            .collect();
        assert_eq!(pairs, vec![("option".to_string(), "A&B+C#D".to_string())]);

        let req = app.top_players_request(&client).build().unwrap();
        assert_eq!(req.url().query(), Some("by=Runs_Scored"));
        assert_eq!(truncate("Royal Challengers Bangalore", 10), "Royal Cha…");
    }

    #[test]
    fn preview_follows_the_tab() {
        let client = reqwest::Client::new();
        let mut app = AppState::new("http://localhost:3000".to_string());
        app.toggle_preview();
        assert!(app.show_preview);
        for (tab, path) in [
            (Tab::Players, "/players"),
            (Tab::Matches, "/matches"),
            (Tab::MatchInfo, "/match-info"),
        ] {
            app.tab = tab;
            let req = app.preview_request(&client).build().unwrap();
            assert_eq!(req.url().path(), path);
            assert_eq!(req.url().query(), Some("limit=5"));
        }
    }

    #[test]
    fn previews_flatten_rows_into_cells() {
        let players: Vec<PlayerRowResponse> = serde_json::from_str(
            r#"[{"Player_Name":"V Kohli","Matches":237,"Runs_Scored":7263,"Batting_Average":37.25,
                "Batting_Strike_Rate":130.02,"Wickets_Taken":4,"Bowling_Average":null,
                "Economy_Rate":8.8,"Bowling_Strike_Rate":null,"Best_Bowling_Match":"2/25"}]"#,
        )
        .unwrap();
        let table = PreviewTable::from(players);
        assert_eq!(table.headers.len(), table.rows[0].len());
        assert_eq!(table.rows[0][2], "7263");
        assert_eq!(table.rows[0][6], "—");

        let info: PreviewTable =
            serde_json::from_str(r#"{"headers":["id","venue"],"rows":[["1","Eden Gardens"]]}"#).unwrap();
        assert_eq!(info.rows[0][1], "Eden Gardens");
    }

    #[test]
    fn wickets_come_from_bar_annotations() {
        let series = SeriesResponse {
            name: "CSK - 1st Inn".to_string(),
            x: vec![1, 4],
            y: vec![5, 12],
            text: vec!["Runs: 5<br>Wickets: 1".to_string(), "Runs: 12<br>Wickets: 2".to_string()],
        };
        let wickets = wickets_per_over(&series);
        assert_eq!(&wickets[..4], &[1, 0, 0, 2]);
        assert_eq!(wickets.iter().sum::<u64>(), 3);
    }
}
