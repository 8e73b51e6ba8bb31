pub mod executor;
pub mod query;
pub mod scanner;
pub mod teams;

/// The GitHub CLI binary every external call goes through.
pub const GH: &str = "gh";
