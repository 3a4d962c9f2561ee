use chrono::{TimeZone, Utc};

use league_desk::model::{
    DashboardStats, MatchCreate, MatchStatus, MatchUpdate, NewsCreate, Team, TeamCreate,
};
use league_desk::seed::seed_demo_league;
use league_desk::service::{LeagueService, ServiceError};
use league_desk::store::Store;

fn service() -> LeagueService {
    LeagueService::new(Store::open_in_memory().expect("in-memory store should open"))
}

fn add_team(svc: &LeagueService, name: &str) -> Team {
    svc.create_team(TeamCreate {
        name: name.to_string(),
        city: format!("{name} City"),
        ..TeamCreate::default()
    })
    .expect("team should be created")
}

fn fixture(home: &Team, away: &Team) -> MatchCreate {
    MatchCreate {
        home_team_id: home.id.clone(),
        away_team_id: away.id.clone(),
        match_date: Utc.with_ymd_and_hms(2024, 9, 14, 15, 0, 0).unwrap(),
        venue: "Ground".to_string(),
        referee: None,
    }
}

fn result(home_score: u32, away_score: u32) -> MatchUpdate {
    MatchUpdate {
        home_team_score: Some(home_score),
        away_team_score: Some(away_score),
        status: Some(MatchStatus::Finished),
        ..MatchUpdate::default()
    }
}

#[test]
fn missing_records_map_to_404() {
    let svc = service();
    for err in [
        svc.get_team("nope").unwrap_err(),
        svc.delete_team("nope").unwrap_err(),
        svc.get_match("nope").unwrap_err(),
        svc.update_match("nope", result(1, 0)).unwrap_err(),
        svc.delete_match("nope").unwrap_err(),
        svc.get_news("nope").unwrap_err(),
    ] {
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(err.status_code(), 404);
    }
}

#[test]
fn blank_team_name_is_rejected() {
    let svc = service();
    let err = svc
        .create_team(TeamCreate {
            name: "   ".to_string(),
            city: "X".to_string(),
            ..TeamCreate::default()
        })
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[test]
fn match_creation_checks_teams() {
    let svc = service();
    let a = add_team(&svc, "A");
    let b = add_team(&svc, "B");

    let mut unknown = fixture(&a, &b);
    unknown.away_team_id = "ghost".to_string();
    assert_eq!(svc.create_match(unknown).unwrap_err().status_code(), 404);

    let err = svc.create_match(fixture(&a, &a)).unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));

    // Existence is checked before the self-match rule.
    let mut ghost_vs_ghost = fixture(&a, &a);
    ghost_vs_ghost.home_team_id = "ghost".to_string();
    ghost_vs_ghost.away_team_id = "ghost".to_string();
    assert_eq!(svc.create_match(ghost_vs_ghost).unwrap_err().status_code(), 404);

    let m = svc.create_match(fixture(&a, &b)).expect("valid match");
    assert_eq!(m.status, MatchStatus::Scheduled);
    assert_eq!(m.home_team_score, None);
    assert_eq!(m.away_team_score, None);
}

#[test]
fn team_with_matches_cannot_be_deleted() {
    let svc = service();
    let a = add_team(&svc, "A");
    let b = add_team(&svc, "B");
    let m = svc.create_match(fixture(&a, &b)).unwrap();

    assert_eq!(svc.delete_team(&a.id).unwrap_err().status_code(), 400);

    svc.delete_match(&m.id).expect("match deleted");
    svc.delete_team(&a.id).expect("team deleted once free");
    assert_eq!(svc.list_teams().unwrap().len(), 1);
}

#[test]
fn update_applies_only_present_fields() {
    let svc = service();
    let a = add_team(&svc, "A");
    let b = add_team(&svc, "B");
    let m = svc.create_match(fixture(&a, &b)).unwrap();

    let updated = svc
        .update_match(
            &m.id,
            MatchUpdate {
                home_team_score: Some(2),
                attendance: Some(12_000),
                ..MatchUpdate::default()
            },
        )
        .unwrap();
    assert_eq!(updated.home_team_score, Some(2));
    assert_eq!(updated.away_team_score, None);
    assert_eq!(updated.status, MatchStatus::Scheduled);
    assert_eq!(updated.attendance, Some(12_000));

    let unchanged = svc.update_match(&m.id, MatchUpdate::default()).unwrap();
    assert_eq!(unchanged, updated);

    let finished = svc.update_match(&m.id, result(2, 1)).unwrap();
    assert_eq!(finished.final_score(), Some((2, 1)));
    assert_eq!(svc.get_match(&m.id).unwrap(), finished);
}

#[test]
fn rankings_follow_match_updates() {
    let svc = service();
    let a = add_team(&svc, "A");
    let b = add_team(&svc, "B");
    let c = add_team(&svc, "C");

    let table = svc.rankings().unwrap();
    let names = table.iter().map(|r| r.team_name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["A", "B", "C"]);

    let m1 = svc.create_match(fixture(&c, &a)).unwrap();
    svc.update_match(&m1.id, result(2, 0)).unwrap();
    let m2 = svc.create_match(fixture(&b, &a)).unwrap();
    svc.update_match(&m2.id, result(1, 1)).unwrap();
    // Scores present but not finished: ignored.
    let m3 = svc.create_match(fixture(&a, &b)).unwrap();
    svc.update_match(
        &m3.id,
        MatchUpdate {
            home_team_score: Some(5),
            away_team_score: Some(0),
            status: Some(MatchStatus::Live),
            ..MatchUpdate::default()
        },
    )
    .unwrap();

    let table = svc.rankings().unwrap();
    let names = table.iter().map(|r| r.team_name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["C", "B", "A"]);
    assert_eq!(table[0].points, 3);
    assert_eq!(table[1].points, 1);
    assert_eq!(table[2].played, 2);
    assert_eq!(table[2].goal_difference, -2);
    let positions = table.iter().map(|r| r.position).collect::<Vec<_>>();
    assert_eq!(positions, vec![1, 2, 3]);

    svc.update_match(
        &m1.id,
        MatchUpdate {
            status: Some(MatchStatus::Cancelled),
            ..MatchUpdate::default()
        },
    )
    .unwrap();
    // A and B now level on every key, so insertion order decides.
    let table = svc.rankings().unwrap();
    let names = table.iter().map(|r| r.team_name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["A", "B", "C"]);
    assert_eq!(table[2].played, 0);
}

#[test]
fn news_lists_only_published() {
    let svc = service();
    let published = svc
        .create_news(NewsCreate {
            title: "Derby day".to_string(),
            content: "Big one.".to_string(),
            author: "Desk".to_string(),
            image_url: None,
            published: true,
        })
        .unwrap();
    let draft = svc
        .create_news(NewsCreate {
            title: "Embargoed".to_string(),
            content: "Not yet.".to_string(),
            author: "Desk".to_string(),
            image_url: None,
            published: false,
        })
        .unwrap();

    let listed = svc.list_news().unwrap();
    assert_eq!(listed, vec![published]);
    assert_eq!(svc.get_news(&draft.id).unwrap().title, "Embargoed");
}

#[test]
fn news_payload_defaults_to_published() {
    let raw = r#"{"title":"t","content":"c","author":"a"}"#;
    let data: NewsCreate = serde_json::from_str(raw).expect("payload should parse");
    assert!(data.published);
}

#[test]
fn dashboard_counts_by_status() {
    let svc = service();
    let a = add_team(&svc, "A");
    let b = add_team(&svc, "B");
    let m1 = svc.create_match(fixture(&a, &b)).unwrap();
    svc.create_match(fixture(&b, &a)).unwrap();
    let m3 = svc.create_match(fixture(&a, &b)).unwrap();
    svc.update_match(&m1.id, result(0, 0)).unwrap();
    svc.update_match(
        &m3.id,
        MatchUpdate {
            status: Some(MatchStatus::Cancelled),
            ..MatchUpdate::default()
        },
    )
    .unwrap();

    assert_eq!(
        svc.dashboard().unwrap(),
        DashboardStats {
            teams_count: 2,
            matches_count: 3,
            finished_matches: 1,
            upcoming_matches: 1,
        }
    );
}

#[test]
fn seeded_league_is_consistent() {
    let svc = service();
    let summary = seed_demo_league(&svc, 6, 0.5).expect("seed should succeed");
    assert_eq!(summary.teams, 6);
    assert_eq!(summary.finished + summary.scheduled + summary.cancelled, 15);
    assert_eq!(summary.finished, 8);
    assert_eq!(summary.cancelled, 1);

    let stats = svc.dashboard().unwrap();
    assert_eq!(stats.finished_matches, summary.finished);
    assert_eq!(stats.upcoming_matches, summary.scheduled);

    let table = svc.rankings().unwrap();
    assert_eq!(table.len(), 6);
    let played: u32 = table.iter().map(|r| r.played).sum();
    assert_eq!(played as usize, summary.finished * 2);
    let gf: u64 = table.iter().map(|r| r.goals_for).sum();
    let ga: u64 = table.iter().map(|r| r.goals_against).sum();
    assert_eq!(gf, ga);
    assert_eq!(svc.list_news().unwrap().len(), 1);
}

#[test]
fn rankings_read_past_the_list_limit() {
    let dir = std::env::temp_dir().join(format!("league_desk_limit_{}", std::process::id()));
    let path = dir.join("league.sqlite");
    let _ = std::fs::remove_dir_all(&dir);
    let svc = LeagueService::new(Store::open(&path, 2).expect("open file store"));

    let a = add_team(&svc, "A");
    let b = add_team(&svc, "B");
    add_team(&svc, "C");
    for _ in 0..3 {
        let m = svc.create_match(fixture(&a, &b)).unwrap();
        svc.update_match(&m.id, result(1, 0)).unwrap();
    }

    // CRUD listings stay capped.
    assert_eq!(svc.list_teams().unwrap().len(), 2);
    assert_eq!(svc.list_matches().unwrap().len(), 2);

    let table = svc.rankings().unwrap();
    assert_eq!(table.len(), 3);
    let top = &table[0];
    assert_eq!(top.team_name, "A");
    assert_eq!((top.played, top.won, top.points), (3, 3, 9));
    assert_eq!(table.iter().find(|r| r.team_name == "B").unwrap().lost, 3);
    assert_eq!(table.iter().find(|r| r.team_name == "C").unwrap().played, 0);

    drop(svc);
    let _ = std::fs::remove_dir_all(&dir);
}
