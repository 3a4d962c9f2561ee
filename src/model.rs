use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Finished,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Finished => "finished",
            MatchStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(MatchStatus::Scheduled),
            "live" => Ok(MatchStatus::Live),
            "finished" => Ok(MatchStatus::Finished),
            "cancelled" | "canceled" => Ok(MatchStatus::Cancelled),
            other => Err(format!(
                "unknown match status: {other} (expected scheduled, live, finished or cancelled)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub founded_year: Option<i32>,
    pub city: String,
    #[serde(default)]
    pub players_count: Option<u32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamCreate {
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub founded_year: Option<i32>,
    pub city: String,
    #[serde(default)]
    pub players_count: Option<u32>,
}

impl Team {
    pub fn from_create(data: TeamCreate) -> Self {
        Self {
            id: new_id(),
            name: data.name,
            logo_url: data.logo_url,
            founded_year: data.founded_year,
            city: data.city,
            players_count: Some(data.players_count.unwrap_or(0)),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub home_team_id: String,
    pub away_team_id: String,
    #[serde(default)]
    pub home_team_score: Option<u32>,
    #[serde(default)]
    pub away_team_score: Option<u32>,
    pub match_date: DateTime<Utc>,
    pub venue: String,
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(default)]
    pub referee: Option<String>,
    #[serde(default)]
    pub attendance: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub fn from_create(data: MatchCreate) -> Self {
        Self {
            id: new_id(),
            home_team_id: data.home_team_id,
            away_team_id: data.away_team_id,
            home_team_score: None,
            away_team_score: None,
            match_date: data.match_date,
            venue: data.venue,
            status: MatchStatus::Scheduled,
            referee: data.referee,
            attendance: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    /// Final score, only when the match is finished and both sides have a score.
    pub fn final_score(&self) -> Option<(u32, u32)> {
        if self.status != MatchStatus::Finished {
            return None;
        }
        let (Some(home), Some(away)) = (self.home_team_score, self.away_team_score) else {
            return None;
        };
        Some((home, away))
    }

    /// Applies the fields present in `update`; absent fields keep their value.
    pub fn apply_update(&mut self, update: MatchUpdate) {
        if let Some(score) = update.home_team_score {
            self.home_team_score = Some(score);
        }
        if let Some(score) = update.away_team_score {
            self.away_team_score = Some(score);
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(attendance) = update.attendance {
            self.attendance = Some(attendance);
        }
        if let Some(notes) = update.notes {
            self.notes = Some(notes);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCreate {
    pub home_team_id: String,
    pub away_team_id: String,
    pub match_date: DateTime<Utc>,
    pub venue: String,
    #[serde(default)]
    pub referee: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchUpdate {
    #[serde(default)]
    pub home_team_score: Option<u32>,
    #[serde(default)]
    pub away_team_score: Option<u32>,
    #[serde(default)]
    pub status: Option<MatchStatus>,
    #[serde(default)]
    pub attendance: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl MatchUpdate {
    pub fn is_empty(&self) -> bool {
        self.home_team_score.is_none()
            && self.away_team_score.is_none()
            && self.status.is_none()
            && self.attendance.is_none()
            && self.notes.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct News {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsCreate {
    pub title: String,
    pub content: String,
    pub author: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_published")]
    pub published: bool,
}

fn default_published() -> bool {
    true
}

impl News {
    pub fn from_create(data: NewsCreate) -> Self {
        Self {
            id: new_id(),
            title: data.title,
            content: data.content,
            author: data.author,
            image_url: data.image_url,
            published: data.published,
            created_at: Utc::now(),
        }
    }
}

/// One row of the league table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub team_id: String,
    pub team_name: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u64,
    pub goals_against: u64,
    pub goal_difference: i64,
    pub points: u32,
    pub position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub teams_count: usize,
    pub matches_count: usize,
    pub finished_matches: usize,
    pub upcoming_matches: usize,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}
