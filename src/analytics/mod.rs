pub mod over_bins;
pub mod rankings;
pub mod team_records;

pub use over_bins::{bin_innings, match_teams};
pub use rankings::{leaderboard, rank_matches, top_players, LeaderOption, MatchRanking, PlayerRanking};
pub use team_records::compute_team_records;
