use log::{info, warn};
use thiserror::Error;

use crate::model::{
    DashboardStats, Match, MatchCreate, MatchStatus, MatchUpdate, News, NewsCreate, Standing,
    Team, TeamCreate,
};
use crate::standings::standings_from_sources;
use crate::store::Store;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl ServiceError {
    /// HTTP-equivalent status for the error.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::NotFound(_) => 404,
            ServiceError::BadRequest(_) => 400,
            ServiceError::Storage(_) => 500,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// CRUD operations over teams, matches and news, plus the derived table.
pub struct LeagueService {
    store: Store,
}

impl LeagueService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn create_team(&self, data: TeamCreate) -> ServiceResult<Team> {
        if data.name.trim().is_empty() {
            return Err(ServiceError::BadRequest("team name must not be empty".to_string()));
        }
        let team = Team::from_create(data);
        self.store.insert_team(&team)?;
        info!("team created: {} ({})", team.name, team.id);
        Ok(team)
    }

    pub fn list_teams(&self) -> ServiceResult<Vec<Team>> {
        Ok(self.store.list_teams()?)
    }

    pub fn get_team(&self, id: &str) -> ServiceResult<Team> {
        self.store
            .get_team(id)?
            .ok_or_else(|| team_not_found(id))
    }

    /// Refuses to delete a team that still has matches attached.
    pub fn delete_team(&self, id: &str) -> ServiceResult<()> {
        let team = self.get_team(id)?;
        let linked = self.store.count_matches_for_team(id)?;
        if linked > 0 {
            return Err(ServiceError::BadRequest(format!(
                "cannot delete team {}: {linked} match(es) reference it",
                team.name
            )));
        }
        self.store.delete_team(id)?;
        info!("team deleted: {} ({id})", team.name);
        Ok(())
    }

    /// Both teams must exist and differ. Existence is checked first.
    pub fn create_match(&self, data: MatchCreate) -> ServiceResult<Match> {
        let home = self.store.get_team(&data.home_team_id)?;
        let away = self.store.get_team(&data.away_team_id)?;
        let (Some(home), Some(away)) = (home, away) else {
            return Err(ServiceError::NotFound(
                "one or more teams not found".to_string(),
            ));
        };
        if home.id == away.id {
            return Err(ServiceError::BadRequest(
                "a team cannot play against itself".to_string(),
            ));
        }
        let m = Match::from_create(data);
        self.store.insert_match(&m)?;
        info!("match created: {} vs {} ({})", home.name, away.name, m.id);
        Ok(m)
    }

    pub fn list_matches(&self) -> ServiceResult<Vec<Match>> {
        Ok(self.store.list_matches()?)
    }

    pub fn get_match(&self, id: &str) -> ServiceResult<Match> {
        self.store
            .get_match(id)?
            .ok_or_else(|| match_not_found(id))
    }

    pub fn update_match(&self, id: &str, update: MatchUpdate) -> ServiceResult<Match> {
        let mut m = self.get_match(id)?;
        if update.is_empty() {
            return Ok(m);
        }
        m.apply_update(update);
        if m.status == MatchStatus::Finished && m.final_score().is_none() {
            warn!("match {id} marked finished without both scores; it will not count in standings");
        }
        if !self.store.replace_match(&m)? {
            // Deleted between the read and the write.
            return Err(match_not_found(id));
        }
        info!("match updated: {id} status={}", m.status);
        Ok(m)
    }

    pub fn delete_match(&self, id: &str) -> ServiceResult<()> {
        if !self.store.delete_match(id)? {
            return Err(match_not_found(id));
        }
        info!("match deleted: {id}");
        Ok(())
    }

    /// Recomputed from stored matches on every call.
    pub fn rankings(&self) -> ServiceResult<Vec<Standing>> {
        Ok(standings_from_sources(&self.store, &self.store)?)
    }

    pub fn create_news(&self, data: NewsCreate) -> ServiceResult<News> {
        let news = News::from_create(data);
        self.store.insert_news(&news)?;
        info!("news created: {} ({})", news.title, news.id);
        Ok(news)
    }

    pub fn list_news(&self) -> ServiceResult<Vec<News>> {
        Ok(self.store.list_published_news()?)
    }

    pub fn get_news(&self, id: &str) -> ServiceResult<News> {
        self.store
            .get_news(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("news article not found: {id}")))
    }

    pub fn dashboard(&self) -> ServiceResult<DashboardStats> {
        Ok(DashboardStats {
            teams_count: self.store.count_teams()?,
            matches_count: self.store.count_matches()?,
            finished_matches: self.store.count_matches_with_status(MatchStatus::Finished)?,
            upcoming_matches: self.store.count_matches_with_status(MatchStatus::Scheduled)?,
        })
    }
}

fn team_not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("team not found: {id}"))
}

fn match_not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("match not found: {id}"))
}
