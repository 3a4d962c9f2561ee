use std::env;
use std::path::PathBuf;

use anyhow::{Result, anyhow};

use crate::store::DEFAULT_LIST_LIMIT;

const CACHE_DIR: &str = "league_desk";
const DB_FILE: &str = "league.sqlite";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub list_limit: usize,
}

impl Config {
    /// Reads `.env.local`, then `.env`, then the process environment.
    /// Variables already set in the environment win over the files.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_vars()
    }

    pub fn from_vars() -> Result<Self> {
        let db_path = env::var("LEAGUE_DB_PATH")
            .ok()
            .filter(|val| !val.trim().is_empty())
            .map(PathBuf::from)
            .or_else(default_db_path)
            .ok_or_else(|| anyhow!("unable to resolve database path; set LEAGUE_DB_PATH"))?;
        let list_limit = env::var("LEAGUE_LIST_LIMIT")
            .ok()
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .max(1);
        Ok(Self {
            db_path,
            list_limit,
        })
    }

    pub fn with_db_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.db_path = path;
        }
        self
    }
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(DB_FILE))
}
