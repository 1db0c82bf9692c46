//! Chart specifications for the match view: per-over bars, per-over lines and the worm graph.
//! Rendering is left to the client; these are plain series with annotations.

use serde::{Deserialize, Serialize};

use crate::analytics::{bin_innings, match_teams};
use crate::config::OVER_BINS;
use crate::types::{Delivery, InningsView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Bar,
    LinesMarkers,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub kind: SeriesKind,
    /// 1-based over numbers.
    pub x: Vec<u32>,
    pub y: Vec<u32>,
    /// Hover annotation per point.
    pub text: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub tick_vals: Vec<u32>,
    /// `Some("group")` for side-by-side bars.
    pub bar_mode: Option<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTeams {
    pub batting: String,
    pub bowling: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCharts {
    pub match_id: u32,
    /// None when the match has no deliveries.
    pub teams: Option<MatchTeams>,
    pub headings: Vec<String>,
    pub over_bars: ChartSpec,
    pub over_lines: ChartSpec,
    pub worm: ChartSpec,
}

/// Builds the three match charts. A match without deliveries yields charts with no series.
pub fn build_match_charts(match_id: u32, deliveries: &[Delivery]) -> MatchCharts {
    let mut over_bars = empty_chart("Runs per Over", "Runs", Some("group"));
    let mut over_lines = empty_chart("Runs per Over", "Runs", None);
    let mut worm = empty_chart("Worm graph - Score comparison", "Cumulative Runs", None);

    let Some((batting, bowling)) = match_teams(deliveries) else {
        return MatchCharts { match_id, teams: None, headings: Vec::new(), over_bars, over_lines, worm };
    };

    let (first, second) = bin_innings(deliveries);
    let innings = [
        (format!("{batting} - 1st Inn"), &first),
        (format!("{bowling} - 2nd Inn"), &second),
    ];

    for (name, view) in innings {
        over_bars.series.push(runs_series(&name, view, SeriesKind::Bar, true));
        over_lines.series.push(runs_series(&name, view, SeriesKind::LinesMarkers, false));
        worm.series.push(cumulative_series(&name, view));
    }

    let headings = vec![
        format!("Over by over - 2 innings - {batting} vs {bowling}"),
        format!("Line graph with two innings - {batting} vs {bowling}"),
        format!("Run graph to compare 2 innings - {batting} vs {bowling}"),
    ];

    MatchCharts {
        match_id,
        teams: Some(MatchTeams { batting, bowling }),
        headings,
        over_bars,
        over_lines,
        worm,
    }
}

fn empty_chart(title: &str, y_axis_title: &str, bar_mode: Option<&str>) -> ChartSpec {
    ChartSpec {
        title: title.to_string(),
        x_axis_title: "Overs".to_string(),
        y_axis_title: y_axis_title.to_string(),
        tick_vals: (1..=OVER_BINS).collect(),
        bar_mode: bar_mode.map(str::to_string),
        series: Vec::new(),
    }
}

// x is the bin's own over, so a skipped over leaves a gap instead of shifting later bars left.
fn runs_series(name: &str, view: &InningsView, kind: SeriesKind, with_wickets: bool) -> Series {
    Series {
        name: name.to_string(),
        kind,
        x: view.bins.iter().map(|b| b.over + 1).collect(),
        y: view.bins.iter().map(|b| b.runs).collect(),
        text: view
            .bins
            .iter()
            .map(|b| {
                if with_wickets {
                    format!("Runs: {}<br>Wickets: {}", b.runs, b.wickets)
                } else {
                    format!("Runs: {}", b.runs)
                }
            })
            .collect(),
    }
}

fn cumulative_series(name: &str, view: &InningsView) -> Series {
    Series {
        name: name.to_string(),
        kind: SeriesKind::LinesMarkers,
        x: view.bins.iter().map(|b| b.over + 1).collect(),
        y: view.cumulative.clone(),
        text: view.cumulative.iter().map(|c| format!("Runs: {c}")).collect(),
    }
}
