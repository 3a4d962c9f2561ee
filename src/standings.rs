use std::cmp::Ordering;
use std::collections::HashMap;

use anyhow::{Context, Result};
use log::debug;

use crate::model::{Match, MatchStatus, Standing, Team};

const POINTS_WIN: u32 = 3;
const POINTS_DRAW: u32 = 1;

/// Read access to the full team set.
pub trait TeamSource {
    fn list_all_teams(&self) -> Result<Vec<Team>>;
}

/// Read access to matches filtered by status.
pub trait MatchSource {
    fn list_matches_with_status(&self, status: MatchStatus) -> Result<Vec<Match>>;
}

/// Fetches both snapshots and builds the table. A collaborator failure is
/// returned as-is and the table is not computed.
pub fn standings_from_sources<T, M>(teams: &T, matches: &M) -> Result<Vec<Standing>>
where
    T: TeamSource + ?Sized,
    M: MatchSource + ?Sized,
{
    let teams = teams.list_all_teams().context("load teams for standings")?;
    let matches = matches
        .list_matches_with_status(MatchStatus::Finished)
        .context("load finished matches for standings")?;
    Ok(compute_standings(&teams, &matches))
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    won: u32,
    drawn: u32,
    lost: u32,
    goals_for: u64,
    goals_against: u64,
}

impl Tally {
    fn record(&mut self, scored: u32, conceded: u32) {
        self.goals_for = self.goals_for.saturating_add(u64::from(scored));
        self.goals_against = self.goals_against.saturating_add(u64::from(conceded));
        match scored.cmp(&conceded) {
            Ordering::Greater => self.won = self.won.saturating_add(1),
            Ordering::Equal => self.drawn = self.drawn.saturating_add(1),
            Ordering::Less => self.lost = self.lost.saturating_add(1),
        }
    }

    fn into_standing(self, team: &Team) -> Standing {
        Standing {
            team_id: team.id.clone(),
            team_name: team.name.clone(),
            played: self.won.saturating_add(self.drawn).saturating_add(self.lost),
            won: self.won,
            drawn: self.drawn,
            lost: self.lost,
            goals_for: self.goals_for,
            goals_against: self.goals_against,
            goal_difference: signed(self.goals_for).saturating_sub(signed(self.goals_against)),
            points: POINTS_WIN
                .saturating_mul(self.won)
                .saturating_add(POINTS_DRAW.saturating_mul(self.drawn)),
            position: 0,
        }
    }
}

fn signed(goals: u64) -> i64 {
    i64::try_from(goals).unwrap_or(i64::MAX)
}

/// Builds the league table: one row per team, best first, positions 1..=N.
///
/// Only finished matches with both scores count. Matches naming a team that is
/// not in `teams` (or the same team on both sides) are skipped. Rows tied on
/// points, goal difference and goals scored keep the order of `teams`.
pub fn compute_standings(teams: &[Team], matches: &[Match]) -> Vec<Standing> {
    let mut tallies = vec![Tally::default(); teams.len()];
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(teams.len());
    for (idx, team) in teams.iter().enumerate() {
        index.entry(team.id.as_str()).or_insert(idx);
    }

    let mut counted = 0usize;
    for m in matches {
        let Some((home_score, away_score)) = m.final_score() else {
            continue;
        };
        let (Some(&home), Some(&away)) = (
            index.get(m.home_team_id.as_str()),
            index.get(m.away_team_id.as_str()),
        ) else {
            debug!("match {} references an unknown team; skipped", m.id);
            continue;
        };
        if home == away {
            debug!("match {} has the same team on both sides; skipped", m.id);
            continue;
        }
        tallies[home].record(home_score, away_score);
        tallies[away].record(away_score, home_score);
        counted += 1;
    }

    let mut table: Vec<Standing> = tallies
        .into_iter()
        .zip(teams)
        .map(|(tally, team)| tally.into_standing(team))
        .collect();

    // sort_by is stable
    table.sort_by(compare_standings);
    for (idx, row) in table.iter_mut().enumerate() {
        row.position = idx + 1;
    }

    debug!("standings computed for {} teams from {counted} matches", table.len());
    table
}

/// Descending on points, then goal difference, then goals scored.
pub fn compare_standings(a: &Standing, b: &Standing) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_difference.cmp(&a.goal_difference))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
}
