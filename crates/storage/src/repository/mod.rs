pub mod leaderboard;
pub mod player;
pub mod snapshot;
pub mod source_file;
