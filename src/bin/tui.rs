mod tui_app;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph,
        Row, Table, Tabs,
    },
    Frame, Terminal,
};
use tui_app::{
    format_count, format_opt, per_over, truncate, wickets_per_over, AppState, ChartResponse,
    ConnectionStatus, MatchChartsResponse, Tab, View, MATCH_ID_MAX, MATCH_ID_MIN, PREVIEW_ROWS,
};

const INNINGS_COLORS: [Color; 2] = [Color::LightBlue, Color::LightGreen];

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> io::Result<()> {
    let base_url = std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .map_err(io::Error::other)?;

    let mut app = AppState::new(base_url);

    // Initial fetch before rendering
    app.refresh(&client).await;

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app, &client).await;

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    client: &reqwest::Client,
) -> io::Result<()> {
    let refresh_interval = Duration::from_secs(5);
    let mut last_tick = std::time::Instant::now();

    loop {
        terminal.draw(|f| render(f, app))?;

        let timeout = refresh_interval
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        let mut changed = false;
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    changed = true;
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        KeyCode::Tab => app.tab = app.tab.next(),
                        KeyCode::Char('1') => app.tab = Tab::Players,
                        KeyCode::Char('2') => app.tab = Tab::Matches,
                        KeyCode::Char('3') => app.tab = Tab::MatchInfo,
                        KeyCode::Char('o') => app.cycle_option(),
                        KeyCode::Char('m') => app.cycle_match_ranking(),
                        KeyCode::Char('p') => app.toggle_preview(),
                        KeyCode::Left | KeyCode::Char('h') => app.step_match(-1),
                        KeyCode::Right | KeyCode::Char('l') => app.step_match(1),
                        KeyCode::PageDown => app.step_match(-10),
                        KeyCode::PageUp => app.step_match(10),
                        KeyCode::Char('r') | KeyCode::Char('R') => {}
                        _ => changed = false,
                    }
                }
            }
        }

        if changed || last_tick.elapsed() >= refresh_interval {
            app.refresh(client).await;
            last_tick = std::time::Instant::now();
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, app: &AppState) {
    let area = f.area();

    // Outer vertical split: header | tabs | body | footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(1), // tabs
            Constraint::Min(0),    // body
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_tabs(f, app, chunks[1]);

    let body = if app.show_preview {
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(PREVIEW_ROWS as u16 + 3), Constraint::Min(0)])
            .split(chunks[2]);
        render_preview(f, app, split[0]);
        split[1]
    } else {
        chunks[2]
    };
    match app.tab {
        Tab::Players => render_players(f, app, body),
        Tab::Matches => render_matches(f, app, body),
        Tab::MatchInfo => render_match_info(f, app, body),
    }
    render_footer(f, chunks[3]);
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let (status_text, status_color) = match &app.status {
        ConnectionStatus::Connected => ("● connected".to_string(), Color::Green),
        ConnectionStatus::Connecting => ("◌ connecting".to_string(), Color::Yellow),
        ConnectionStatus::Error(e) => (format!("✗ {}", truncate(e, 40)), Color::Red),
    };

    let mut spans = vec![
        Span::styled(
            " IPL Analytics  ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(status_text, Style::default().fg(status_color)),
    ];
    if app.status == ConnectionStatus::Connected && !app.health.all_loaded {
        spans.push(Span::styled("  partial data", Style::default().fg(Color::Yellow)));
    }
    for t in &app.health.tables {
        spans.push(Span::raw("  │  "));
        if t.loaded {
            spans.push(Span::styled(
                format!("{} {}", t.table, t.rows),
                Style::default().fg(Color::White),
            ));
        } else {
            spans.push(Span::styled(
                format!("{} ✗", t.table),
                Style::default().fg(Color::Red),
            ));
        }
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(
            Style::default().fg(Color::DarkGray),
        ));

    f.render_widget(paragraph, area);
}

fn render_tabs(f: &mut Frame, app: &AppState, area: Rect) {
    let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
        .select(app.tab.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, area);
}

fn titled_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

fn header_row(cells: &[&'static str]) -> Row<'static> {
    Row::new(
        cells
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))),
    )
    .height(1)
}

/// Placeholder for a view the server could not produce.
fn render_notice<T>(f: &mut Frame, view: &View<T>, title: String, area: Rect) -> bool {
    let text = match view {
        View::Ready(_) => return false,
        View::Empty => "loading…".to_string(),
        View::Unavailable(e) => format!("No data: {e}"),
    };
    let paragraph = Paragraph::new(Span::styled(text, Style::default().fg(Color::Red)))
        .block(titled_block(title));
    f.render_widget(paragraph, area);
    true
}

/// First rows of the tab's source table, cells shown verbatim.
fn render_preview(f: &mut Frame, app: &AppState, area: Rect) {
    let title = match app.tab {
        Tab::Players => "DATA OVERVIEW — PLAYERS",
        Tab::Matches => "DATA OVERVIEW — MATCHES",
        Tab::MatchInfo => "MATCH INFO",
    }
    .to_string();
    if render_notice(f, &app.preview, title.clone(), area) {
        return;
    }
    let View::Ready(table) = &app.preview else { return };

    let header = Row::new(
        table
            .headers
            .iter()
            .map(|h| Cell::from(truncate(h, 14)).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))),
    );
    let rows: Vec<Row> = table
        .rows
        .iter()
        .map(|r| Row::new(r.iter().map(|c| Cell::from(truncate(c, 18)))))
        .collect();
    let widths = vec![Constraint::Min(6); table.headers.len().max(1)];

    let table = Table::new(rows, widths).header(header).block(titled_block(title));
    f.render_widget(table, area);
}

fn render_players(f: &mut Frame, app: &AppState, area: Rect) {
    let title = format!("TOP 10 PLAYERS by {}", app.player_column());
    if render_notice(f, &app.players, title.clone(), area) {
        return;
    }
    let View::Ready(board) = &app.players else { return };
    let bowlers = board.view == "Top Bowlers";

    let (header, widths) = if bowlers {
        (
            header_row(&["#", "Player", "M", "Wkts", "Avg", "Econ", "SR", "Best"]),
            vec![
                Constraint::Length(3),
                Constraint::Min(16),
                Constraint::Length(5),
                Constraint::Length(5),
                Constraint::Length(7),
                Constraint::Length(6),
                Constraint::Length(7),
                Constraint::Length(6),
            ],
        )
    } else {
        (
            header_row(&["#", "Player", "M", "Runs", "Avg", "SR"]),
            vec![
                Constraint::Length(3),
                Constraint::Min(16),
                Constraint::Length(5),
                Constraint::Length(6),
                Constraint::Length(7),
                Constraint::Length(7),
            ],
        )
    };

    let rows: Vec<Row> = board
        .rows
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mut cells = vec![
                Cell::from(format!("{}", i + 1)).style(Style::default().fg(Color::DarkGray)),
                Cell::from(truncate(&p.name, 24)),
                Cell::from(p.matches.to_string()),
            ];
            if bowlers {
                cells.extend([
                    Cell::from(format_count(p.wickets_taken)).style(Style::default().fg(Color::Cyan)),
                    Cell::from(format_opt(p.bowling_average)),
                    Cell::from(format_opt(p.economy_rate)),
                    Cell::from(format_opt(p.bowling_strike_rate)),
                    Cell::from(p.best_bowling_match.clone().unwrap_or_default()),
                ]);
            } else {
                cells.extend([
                    Cell::from(format_count(p.runs_scored)).style(Style::default().fg(Color::Cyan)),
                    Cell::from(format_opt(p.batting_average)),
                    Cell::from(format_opt(p.batting_strike_rate)),
                ]);
            }
            Row::new(cells)
        })
        .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .block(titled_block(format!("{} — {title}", board.view.to_uppercase())));
    f.render_widget(table, area);
}

fn render_matches(f: &mut Frame, app: &AppState, area: Rect) {
    // Horizontal split: team records (45%) | rankings (55%)
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(halves[1]);

    render_team_records(f, app, halves[0]);
    render_match_list(f, app, right[0]);
    render_leaders(f, app, right[1]);
}

fn render_team_records(f: &mut Frame, app: &AppState, area: Rect) {
    let title = "TEAM RECORDS".to_string();
    if render_notice(f, &app.team_records, title.clone(), area) {
        return;
    }
    let View::Ready(records) = &app.team_records else { return };

    let rows: Vec<Row> = records
        .iter()
        .map(|r| {
            let pct_color = if r.win_percentage >= 55.0 {
                Color::Green
            } else if r.win_percentage >= 45.0 {
                Color::Yellow
            } else {
                Color::Red
            };
            Row::new(vec![
                Cell::from(truncate(&r.team, 26)),
                Cell::from(r.matches.to_string()),
                Cell::from(r.wins.to_string()),
                Cell::from(r.losses.to_string()),
                Cell::from(format!("{:.2}", r.win_percentage)).style(Style::default().fg(pct_color)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(12),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(7),
        ],
    )
    .header(header_row(&["Team", "M", "W", "L", "Win %"]))
    .block(titled_block(title));
    f.render_widget(table, area);
}

fn render_match_list(f: &mut Frame, app: &AppState, area: Rect) {
    let title = app.match_ranking().to_uppercase();
    if render_notice(f, &app.match_list, title.clone(), area) {
        return;
    }
    let View::Ready(list) = &app.match_list else { return };

    let rows: Vec<Row> = list
        .rows
        .iter()
        .map(|m| {
            Row::new(vec![
                Cell::from(truncate(&format!("{} v {}", m.team1, m.team2), 30)),
                Cell::from(m.winner.clone().unwrap_or_else(|| "—".to_string())),
                Cell::from(m.result.clone()),
                Cell::from(format_opt(m.result_margin)),
                Cell::from(format_opt(m.target_runs)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(7),
            Constraint::Length(7),
        ],
    )
    .header(header_row(&["Fixture", "Winner", "Result", "Margin", "Target"]))
    .block(titled_block(list.title.to_uppercase()));
    f.render_widget(table, area);
}

fn render_leaders(f: &mut Frame, app: &AppState, area: Rect) {
    let title = format!("TOP {}", app.leader_option().to_uppercase());
    if render_notice(f, &app.leaders, title.clone(), area) {
        return;
    }
    let View::Ready(board) = &app.leaders else { return };

    let rows: Vec<Row> = board
        .rows
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(truncate(&r.value, 28)),
                Cell::from(r.count.to_string()).style(Style::default().fg(Color::Cyan)),
            ])
        })
        .collect();

    let header = Row::new(vec![
        Cell::from(board.display_name.clone()),
        Cell::from(board.count_label.clone()),
    ])
    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let table = Table::new(rows, [Constraint::Min(12), Constraint::Length(18)])
        .header(header)
        .block(titled_block(board.title.to_uppercase()));
    f.render_widget(table, area);
}

fn render_match_info(f: &mut Frame, app: &AppState, area: Rect) {
    let title = format!("MATCH {} / {}", app.match_id, MATCH_ID_MAX);
    if render_notice(f, &app.charts, title.clone(), area) {
        return;
    }
    let View::Ready(charts) = &app.charts else { return };

    let Some(teams) = &charts.teams else {
        let paragraph = Paragraph::new(Span::styled(
            format!("No deliveries recorded for match {}", charts.match_id),
            Style::default().fg(Color::DarkGray),
        ))
        .block(titled_block(title));
        f.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45), // per-over bars
            Constraint::Length(4),      // wickets per over
            Constraint::Min(0),         // lines | worm
        ])
        .split(area);
    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);

    let heading = format!("{title} — {} vs {}", teams.batting, teams.bowling);
    render_over_bars(f, charts, heading, chunks[0]);
    render_wickets(f, charts, chunks[1]);
    render_line_chart(f, &charts.over_lines, charts.heading(1, &charts.over_lines), lower[0]);
    render_line_chart(f, &charts.worm, charts.heading(2, &charts.worm), lower[1]);
}

fn render_over_bars(f: &mut Frame, charts: &MatchChartsResponse, heading: String, area: Rect) {
    let per_innings: Vec<[u64; 20]> = charts.over_bars.series.iter().map(per_over).collect();

    let mut chart = BarChart::default()
        .block(titled_block(format!("{heading} — {}", charts.over_bars.title)))
        .bar_width(2)
        .bar_gap(0)
        .group_gap(1)
        .value_style(Style::default().fg(Color::Black));

    for over in 0..20 {
        let bars: Vec<Bar> = per_innings
            .iter()
            .zip(INNINGS_COLORS)
            .map(|(runs, color)| Bar::default().value(runs[over]).style(Style::default().fg(color)))
            .collect();
        chart = chart.data(
            BarGroup::default()
                .label(Line::from((over + 1).to_string()))
                .bars(&bars),
        );
    }
    f.render_widget(chart, area);
}

/// Overs in which wickets fell, one line per innings.
fn render_wickets(f: &mut Frame, charts: &MatchChartsResponse, area: Rect) {
    let lines: Vec<Line> = charts
        .over_bars
        .series
        .iter()
        .zip(INNINGS_COLORS)
        .map(|(s, color)| {
            let wickets = wickets_per_over(s);
            let mut spans = vec![
                Span::styled(format!("{:<22}", truncate(&s.name, 22)), Style::default().fg(color)),
                Span::styled(
                    format!("{:>2} wkts  ", wickets.iter().sum::<u64>()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ];
            spans.extend(
                wickets
                    .iter()
                    .enumerate()
                    .filter(|(_, &w)| w > 0)
                    .map(|(over, w)| Span::raw(format!("o{}×{w}  ", over + 1))),
            );
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(titled_block("WICKETS PER OVER".to_string()));
    f.render_widget(paragraph, area);
}

fn render_line_chart(f: &mut Frame, spec: &ChartResponse, heading: String, area: Rect) {
    let points: Vec<Vec<(f64, f64)>> = spec
        .series
        .iter()
        .map(|s| s.x.iter().zip(&s.y).map(|(&x, &y)| (f64::from(x), f64::from(y))).collect())
        .collect();
    let max_y = points
        .iter()
        .flatten()
        .map(|&(_, y)| y)
        .fold(0.0_f64, f64::max)
        .max(10.0);

    let datasets: Vec<Dataset> = spec
        .series
        .iter()
        .zip(&points)
        .zip(INNINGS_COLORS)
        .map(|((s, data), color)| {
            Dataset::default()
                .name(s.name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(color))
                .data(data)
        })
        .collect();

    let chart = Chart::new(datasets)
        .block(titled_block(heading))
        .x_axis(
            Axis::default()
                .title(spec.x_axis_title.clone())
                .style(Style::default().fg(Color::DarkGray))
                .bounds([1.0, 20.0])
                .labels(["1", "5", "10", "15", "20"]),
        )
        .y_axis(
            Axis::default()
                .title(spec.y_axis_title.clone())
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, max_y])
                .labels([
                    "0".to_string(),
                    format!("{:.0}", max_y / 2.0),
                    format!("{max_y:.0}"),
                ]),
        );
    f.render_widget(chart, area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" [q] ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  "),
        Span::styled("[tab / 1-3] ", Style::default().fg(Color::Yellow)),
        Span::raw("switch tab  "),
        Span::styled("[o] ", Style::default().fg(Color::Yellow)),
        Span::raw("option  "),
        Span::styled("[m] ", Style::default().fg(Color::Yellow)),
        Span::raw("ranking  "),
        Span::styled("[p] ", Style::default().fg(Color::Yellow)),
        Span::raw("preview  "),
        Span::styled("[← → / PgUp PgDn] ", Style::default().fg(Color::Yellow)),
        Span::raw(format!("match id {MATCH_ID_MIN}-{MATCH_ID_MAX}  ")),
        Span::styled("[r] ", Style::default().fg(Color::Yellow)),
        Span::raw("refresh"),
    ]);
    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}
