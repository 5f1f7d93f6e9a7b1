pub mod attendance;
pub mod auth;
pub mod faculty;
pub mod leaderboard;
pub mod student;
