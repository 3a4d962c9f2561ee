use chrono::{Duration as ChronoDuration, Utc};
use log::info;
use rand::Rng;

use crate::model::{MatchCreate, MatchStatus, MatchUpdate, NewsCreate, TeamCreate};
use crate::service::{LeagueService, ServiceResult};

const CLUBS: &[(&str, &str)] = &[
    ("Riverside Rovers", "Riverside"),
    ("Northgate United", "Northgate"),
    ("Harbour Athletic", "Port Alder"),
    ("Castle Hill FC", "Castleford"),
    ("Millbrook Town", "Millbrook"),
    ("Eastmoor Wanderers", "Eastmoor"),
    ("Kingsbridge City", "Kingsbridge"),
    ("Valley Sporting", "Greenvale"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub teams: usize,
    pub finished: usize,
    pub scheduled: usize,
    pub cancelled: usize,
}

/// Fills the store with a single round robin. Roughly the first
/// `played_share` of the fixtures get random final scores, one fixture is
/// cancelled, the rest stay scheduled.
pub fn seed_demo_league(
    service: &LeagueService,
    team_count: usize,
    played_share: f64,
) -> ServiceResult<SeedSummary> {
    let mut rng = rand::thread_rng();
    let team_count = team_count.clamp(2, CLUBS.len());

    let mut teams = Vec::with_capacity(team_count);
    for (name, city) in CLUBS.iter().take(team_count) {
        teams.push(service.create_team(TeamCreate {
            name: (*name).to_string(),
            city: (*city).to_string(),
            founded_year: Some(rng.gen_range(1878..=1990)),
            players_count: Some(rng.gen_range(18..=30)),
            logo_url: None,
        })?);
    }

    let mut fixtures = Vec::new();
    for (i, home) in teams.iter().enumerate() {
        for away in teams.iter().skip(i + 1) {
            if rng.gen_bool(0.5) {
                fixtures.push((home, away));
            } else {
                fixtures.push((away, home));
            }
        }
    }

    let played = ((fixtures.len() as f64) * played_share.clamp(0.0, 1.0)).round() as usize;
    let kickoff_base = Utc::now() - ChronoDuration::days(played as i64 * 3);
    let mut summary = SeedSummary {
        teams: teams.len(),
        finished: 0,
        scheduled: 0,
        cancelled: 0,
    };

    for (idx, (home, away)) in fixtures.into_iter().enumerate() {
        let m = service.create_match(MatchCreate {
            home_team_id: home.id.clone(),
            away_team_id: away.id.clone(),
            match_date: kickoff_base + ChronoDuration::days(idx as i64 * 3),
            venue: format!("{} Stadium", home.city),
            referee: None,
        })?;

        let update = if idx < played {
            summary.finished += 1;
            MatchUpdate {
                home_team_score: Some(rng.gen_range(0..=4)),
                away_team_score: Some(rng.gen_range(0..=3)),
                status: Some(MatchStatus::Finished),
                attendance: Some(rng.gen_range(2_000..=40_000)),
                notes: None,
            }
        } else if idx == played {
            summary.cancelled += 1;
            MatchUpdate {
                status: Some(MatchStatus::Cancelled),
                notes: Some("waterlogged pitch".to_string()),
                ..MatchUpdate::default()
            }
        } else {
            summary.scheduled += 1;
            continue;
        };
        service.update_match(&m.id, update)?;
    }

    service.create_news(NewsCreate {
        title: "Season under way".to_string(),
        content: format!("{} clubs have kicked off the new campaign.", summary.teams),
        author: "League Office".to_string(),
        image_url: None,
        published: true,
    })?;

    info!(
        "seeded {} teams, {} finished, {} scheduled, {} cancelled",
        summary.teams, summary.finished, summary.scheduled, summary.cancelled
    );
    Ok(summary)
}
