use crate::error::{Result, YagdError};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// An `(organization, team)` pair whose members become author filters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TeamRef {
    pub org: String,
    pub team: String,
}

impl FromStr for TeamRef {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((org, team)) if !org.is_empty() && !team.is_empty() && !team.contains('/') => {
                Ok(TeamRef {
                    org: org.to_string(),
                    team: team.to_string(),
                })
            }
            _ => Err(format!("expected ORG/TEAM, got '{s}'")),
        }
    }
}

impl fmt::Display for TeamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org, self.team)
    }
}

/// Everything a run needs to know. Built once at startup and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    pub repos: Vec<PathBuf>,
    pub authors: Vec<String>,
    pub authors_from_teams: Vec<TeamRef>,
    pub include_reviewed: bool,
    pub include_mine: bool,
    pub show_drafts: bool,
    pub show_urls: bool,
    pub show_headers: bool,
    pub show_branch: bool,
    pub show_author: bool,
}

/// Defaults saved on disk. Every field is optional so a partial file is valid.
#[derive(Debug, Default, Deserialize)]
pub struct SavedConfig {
    pub repos: Option<Vec<PathBuf>>,
    pub authors: Option<Vec<String>>,
    pub authors_from_teams: Option<Vec<TeamRef>>,
    pub include_reviewed: Option<bool>,
    pub include_mine: Option<bool>,
    pub show_drafts: Option<bool>,
    pub show_urls: Option<bool>,
    pub show_headers: Option<bool>,
    pub show_branch: Option<bool>,
    pub show_author: Option<bool>,
}

fn overlay_list<T>(current: Vec<T>, saved: Option<Vec<T>>) -> Vec<T> {
    match saved {
        Some(list) if !list.is_empty() => list,
        _ => current,
    }
}

fn overlay_flag(current: bool, saved: Option<bool>) -> bool {
    if saved == Some(true) {
        true
    } else {
        current
    }
}

impl FilterConfig {
    /// Applies saved values on top of `self`. A saved value wins only when it is
    /// set: a non-empty list or a `true` flag.
    pub fn overlay(self, saved: SavedConfig) -> FilterConfig {
        FilterConfig {
            repos: overlay_list(self.repos, saved.repos),
            authors: overlay_list(self.authors, saved.authors),
            authors_from_teams: overlay_list(self.authors_from_teams, saved.authors_from_teams),
            include_reviewed: overlay_flag(self.include_reviewed, saved.include_reviewed),
            include_mine: overlay_flag(self.include_mine, saved.include_mine),
            show_drafts: overlay_flag(self.show_drafts, saved.show_drafts),
            show_urls: overlay_flag(self.show_urls, saved.show_urls),
            show_headers: overlay_flag(self.show_headers, saved.show_headers),
            show_branch: overlay_flag(self.show_branch, saved.show_branch),
            show_author: overlay_flag(self.show_author, saved.show_author),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.repos.is_empty() {
            return Err(YagdError::MissingConfiguration);
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg).join("yagd").join("config.toml");
        return Ok(path);
    }

    let home =
        dirs::home_dir().ok_or_else(|| YagdError::Config("Cannot find home directory".into()))?;
    Ok(home.join(".config").join("yagd").join("config.toml"))
}

pub fn load_saved_config(path: &Path) -> Result<SavedConfig> {
    if !path.exists() {
        return Err(YagdError::Config(format!(
            "No saved config found at {}",
            path.display()
        )));
    }
    let contents = fs::read_to_string(path)?;
    let config: SavedConfig = toml::from_str(&contents)?;
    Ok(config)
}
