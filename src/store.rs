use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use rusqlite::{Connection, OptionalExtension, Params, params};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::model::{Match, MatchStatus, News, Team};
use crate::standings::{MatchSource, TeamSource};

pub const DEFAULT_LIST_LIMIT: usize = 1000;

/// SQLite-backed document store. Each record is kept as a JSON document next
/// to the handful of columns used for filtering and ordering.
pub struct Store {
    conn: Connection,
    list_limit: usize,
}

impl Store {
    pub fn open(path: &Path, list_limit: usize) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn =
            Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
        let mode: String = conn
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
            .context("enable wal journal")?;
        debug!("sqlite journal mode: {mode}");
        init_schema(&conn)?;
        debug!("store opened at {}", path.display());
        Ok(Self {
            conn,
            list_limit: list_limit.max(1),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        init_schema(&conn)?;
        Ok(Self {
            conn,
            list_limit: DEFAULT_LIST_LIMIT,
        })
    }

    pub fn list_limit(&self) -> usize {
        self.list_limit
    }

    // Teams

    pub fn insert_team(&self, team: &Team) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO teams (id, created_at, doc) VALUES (?1, ?2, ?3)",
                params![team.id, timestamp(&team.created_at), encode(team)?],
            )
            .with_context(|| format!("insert team {}", team.id))?;
        Ok(())
    }

    /// Teams in insertion order.
    pub fn list_teams(&self) -> Result<Vec<Team>> {
        self.query_docs(
            "SELECT doc FROM teams ORDER BY rowid ASC LIMIT ?1",
            params![self.limit_param()],
        )
        .context("list teams")
    }

    pub fn get_team(&self, id: &str) -> Result<Option<Team>> {
        self.query_doc("SELECT doc FROM teams WHERE id = ?1", id)
            .with_context(|| format!("get team {id}"))
    }

    pub fn delete_team(&self, id: &str) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM teams WHERE id = ?1", params![id])
            .with_context(|| format!("delete team {id}"))?;
        Ok(n > 0)
    }

    pub fn count_teams(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM teams", [])
            .context("count teams")
    }

    // Matches

    pub fn insert_match(&self, m: &Match) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO matches (id, home_team_id, away_team_id, status, match_date, doc)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    m.id,
                    m.home_team_id,
                    m.away_team_id,
                    m.status.as_str(),
                    timestamp(&m.match_date),
                    encode(m)?
                ],
            )
            .with_context(|| format!("insert match {}", m.id))?;
        Ok(())
    }

    /// Matches ordered by kick-off, earliest first.
    pub fn list_matches(&self) -> Result<Vec<Match>> {
        self.query_docs(
            "SELECT doc FROM matches ORDER BY match_date ASC, rowid ASC LIMIT ?1",
            params![self.limit_param()],
        )
        .context("list matches")
    }

    pub fn get_match(&self, id: &str) -> Result<Option<Match>> {
        self.query_doc("SELECT doc FROM matches WHERE id = ?1", id)
            .with_context(|| format!("get match {id}"))
    }

    /// Replaces the stored document. Returns false when the id is unknown.
    pub fn replace_match(&self, m: &Match) -> Result<bool> {
        let n = self
            .conn
            .execute(
                "UPDATE matches
                 SET home_team_id = ?2, away_team_id = ?3, status = ?4, match_date = ?5, doc = ?6
                 WHERE id = ?1",
                params![
                    m.id,
                    m.home_team_id,
                    m.away_team_id,
                    m.status.as_str(),
                    timestamp(&m.match_date),
                    encode(m)?
                ],
            )
            .with_context(|| format!("update match {}", m.id))?;
        Ok(n > 0)
    }

    pub fn delete_match(&self, id: &str) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM matches WHERE id = ?1", params![id])
            .with_context(|| format!("delete match {id}"))?;
        Ok(n > 0)
    }

    pub fn count_matches(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM matches", [])
            .context("count matches")
    }

    pub fn count_matches_with_status(&self, status: MatchStatus) -> Result<usize> {
        self.count(
            "SELECT COUNT(*) FROM matches WHERE status = ?1",
            params![status.as_str()],
        )
        .with_context(|| format!("count {status} matches"))
    }

    pub fn count_matches_for_team(&self, team_id: &str) -> Result<usize> {
        self.count(
            "SELECT COUNT(*) FROM matches WHERE home_team_id = ?1 OR away_team_id = ?1",
            params![team_id],
        )
        .with_context(|| format!("count matches for team {team_id}"))
    }

    // News

    pub fn insert_news(&self, news: &News) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO news (id, published, created_at, doc) VALUES (?1, ?2, ?3, ?4)",
                params![
                    news.id,
                    news.published,
                    timestamp(&news.created_at),
                    encode(news)?
                ],
            )
            .with_context(|| format!("insert news {}", news.id))?;
        Ok(())
    }

    /// Published articles, newest first.
    pub fn list_published_news(&self) -> Result<Vec<News>> {
        self.query_docs(
            "SELECT doc FROM news WHERE published = 1 ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            params![self.limit_param()],
        )
        .context("list news")
    }

    pub fn get_news(&self, id: &str) -> Result<Option<News>> {
        self.query_doc("SELECT doc FROM news WHERE id = ?1", id)
            .with_context(|| format!("get news {id}"))
    }

    fn limit_param(&self) -> i64 {
        i64::try_from(self.list_limit).unwrap_or(i64::MAX)
    }

    fn query_docs<T: DeserializeOwned, P: Params>(&self, sql: &str, params: P) -> Result<Vec<T>> {
        let mut stmt = self.conn.prepare(sql).context("prepare query")?;
        let rows = stmt
            .query_map(params, |row| row.get::<_, String>(0))
            .context("run query")?;
        let mut out = Vec::new();
        for raw in rows {
            let raw = raw.context("read row")?;
            out.push(decode(&raw)?);
        }
        Ok(out)
    }

    fn query_doc<T: DeserializeOwned>(&self, sql: &str, id: &str) -> Result<Option<T>> {
        let raw = self
            .conn
            .query_row(sql, params![id], |row| row.get::<_, String>(0))
            .optional()
            .context("run query")?;
        raw.map(|raw| decode(&raw)).transpose()
    }

    fn count<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        let n: i64 = self.conn.query_row(sql, params, |row| row.get(0))?;
        Ok(usize::try_from(n).unwrap_or_default())
    }
}

// The table needs every team and every finished match, so these reads ignore
// `list_limit`.
impl TeamSource for Store {
    fn list_all_teams(&self) -> Result<Vec<Team>> {
        self.query_docs("SELECT doc FROM teams ORDER BY rowid ASC", [])
            .context("list all teams")
    }
}

impl MatchSource for Store {
    fn list_matches_with_status(&self, status: MatchStatus) -> Result<Vec<Match>> {
        self.query_docs(
            "SELECT doc FROM matches WHERE status = ?1 ORDER BY match_date ASC, rowid ASC",
            params![status.as_str()],
        )
        .with_context(|| format!("list all {status} matches"))
    }
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS teams (
            id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL,
            doc TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS matches (
            id TEXT PRIMARY KEY,
            home_team_id TEXT NOT NULL,
            away_team_id TEXT NOT NULL,
            status TEXT NOT NULL,
            match_date TEXT NOT NULL,
            doc TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_matches_status ON matches(status);
        CREATE INDEX IF NOT EXISTS idx_matches_date ON matches(match_date);
        CREATE INDEX IF NOT EXISTS idx_matches_home ON matches(home_team_id);
        CREATE INDEX IF NOT EXISTS idx_matches_away ON matches(away_team_id);

        CREATE TABLE IF NOT EXISTS news (
            id TEXT PRIMARY KEY,
            published INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            doc TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_news_created ON news(created_at);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

// Fixed-width UTC so lexical order matches time order.
fn timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn encode<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).context("encode document")
}

fn decode<T: DeserializeOwned>(raw: &str) -> Result<T> {
    serde_json::from_str(raw).context("decode stored document")
}
