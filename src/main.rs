use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::json;

use league_desk::config::Config;
use league_desk::model::{MatchCreate, MatchStatus, MatchUpdate, NewsCreate, Standing, TeamCreate};
use league_desk::seed::seed_demo_league;
use league_desk::service::{LeagueService, ServiceError};
use league_desk::store::Store;

const USAGE: &str = "\
usage: league_desk [--db PATH] <command> [args]

commands:
  teams list
  teams get <id>
  teams add --name NAME --city CITY [--logo-url URL] [--founded-year N] [--players-count N]
  teams delete <id>
  matches list
  matches get <id>
  matches add --home ID --away ID --date DATE --venue VENUE [--referee NAME]
  matches update <id> [--home-score N] [--away-score N] [--status STATUS] [--attendance N] [--notes TEXT]
  matches delete <id>
  news list
  news get <id>
  news add --title TEXT --content TEXT --author NAME [--image-url URL] [--draft]
  rankings [--table]
  dashboard
  seed [--teams N] [--played SHARE]";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let raw = std::env::args().skip(1).collect::<Vec<_>>();
    match run(&raw) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ServiceError>() {
                Some(service_err) => {
                    eprintln!("error ({}): {service_err}", service_err.status_code())
                }
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(raw: &[String]) -> Result<()> {
    let args = Args::parse(raw)?;
    if args.positional.is_empty() || args.has("help") {
        println!("{USAGE}");
        return Ok(());
    }

    let config = Config::from_env()?.with_db_path(args.get("db").map(PathBuf::from));
    let store = Store::open(&config.db_path, config.list_limit)?;
    let service = LeagueService::new(store);

    let words = args.positional.iter().map(String::as_str).collect::<Vec<_>>();
    match words.as_slice() {
        ["teams", "list"] => print_json(&service.list_teams()?),
        ["teams", "get", id] => print_json(&service.get_team(id)?),
        ["teams", "add"] => print_json(&service.create_team(TeamCreate {
            name: args.require("name")?.to_string(),
            city: args.require("city")?.to_string(),
            logo_url: args.get("logo-url").map(str::to_string),
            founded_year: args.parse_opt("founded-year")?,
            players_count: args.parse_opt("players-count")?,
        })?),
        ["teams", "delete", id] => {
            service.delete_team(id)?;
            print_json(&json!({ "message": "team deleted" }))
        }

        ["matches", "list"] => print_json(&service.list_matches()?),
        ["matches", "get", id] => print_json(&service.get_match(id)?),
        ["matches", "add"] => print_json(&service.create_match(MatchCreate {
            home_team_id: args.require("home")?.to_string(),
            away_team_id: args.require("away")?.to_string(),
            match_date: parse_datetime(args.require("date")?)?,
            venue: args.require("venue")?.to_string(),
            referee: args.get("referee").map(str::to_string),
        })?),
        ["matches", "update", id] => print_json(&service.update_match(
            id,
            MatchUpdate {
                home_team_score: args.parse_opt("home-score")?,
                away_team_score: args.parse_opt("away-score")?,
                status: args
                    .get("status")
                    .map(MatchStatus::from_str)
                    .transpose()
                    .map_err(|err| anyhow!(err))?,
                attendance: args.parse_opt("attendance")?,
                notes: args.get("notes").map(str::to_string),
            },
        )?),
        ["matches", "delete", id] => {
            service.delete_match(id)?;
            print_json(&json!({ "message": "match deleted" }))
        }

        ["news", "list"] => print_json(&service.list_news()?),
        ["news", "get", id] => print_json(&service.get_news(id)?),
        ["news", "add"] => print_json(&service.create_news(NewsCreate {
            title: args.require("title")?.to_string(),
            content: args.require("content")?.to_string(),
            author: args.require("author")?.to_string(),
            image_url: args.get("image-url").map(str::to_string),
            published: !args.has("draft"),
        })?),

        ["rankings"] => {
            let table = service.rankings()?;
            if args.has("table") {
                print_table(&table);
                Ok(())
            } else {
                print_json(&table)
            }
        }
        ["dashboard"] => print_json(&service.dashboard()?),
        ["seed"] => {
            let teams = args.parse_opt::<usize>("teams")?.unwrap_or(6);
            let played = args.parse_opt::<f64>("played")?.unwrap_or(0.6);
            let summary = seed_demo_league(&service, teams, played)?;
            print_json(&json!({
                "teams": summary.teams,
                "finished": summary.finished,
                "scheduled": summary.scheduled,
                "cancelled": summary.cancelled,
            }))
        }
        _ => bail!("unknown command: {}\n\n{USAGE}", words.join(" ")),
    }
}

struct Args {
    positional: Vec<String>,
    flags: HashMap<String, String>,
}

impl Args {
    /// `--key value`, `--key=value`, or a bare `--switch`.
    fn parse(raw: &[String]) -> Result<Self> {
        let mut positional = Vec::new();
        let mut flags = HashMap::new();
        let mut idx = 0;
        while idx < raw.len() {
            let arg = &raw[idx];
            idx += 1;
            let Some(key) = arg.strip_prefix("--") else {
                positional.push(arg.clone());
                continue;
            };
            if key.is_empty() {
                bail!("empty flag name");
            }
            if let Some((key, value)) = key.split_once('=') {
                flags.insert(key.to_string(), value.to_string());
                continue;
            }
            match raw.get(idx) {
                Some(next) if !next.starts_with("--") => {
                    flags.insert(key.to_string(), next.clone());
                    idx += 1;
                }
                _ => {
                    flags.insert(key.to_string(), String::new());
                }
            }
        }
        Ok(Self { positional, flags })
    }

    fn has(&self, key: &str) -> bool {
        self.flags.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.flags
            .get(key)
            .map(|val| val.trim())
            .filter(|val| !val.is_empty())
    }

    fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .with_context(|| format!("missing required flag --{key}"))
    }

    fn parse_opt<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|val| {
                val.parse::<T>()
                    .map_err(|err| anyhow!("invalid value for --{key}: {err}"))
            })
            .transpose()
    }
}

/// RFC 3339, `YYYY-MM-DD HH:MM` (UTC) or a bare date (midnight UTC).
fn parse_datetime(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M") {
        return Ok(naive.and_utc());
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date: {raw}"))?;
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| anyhow!("invalid date: {raw}"))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("serialize response")?;
    println!("{out}");
    Ok(())
}

fn print_table(rows: &[Standing]) {
    let width = rows
        .iter()
        .map(|r| r.team_name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);
    println!(
        "{:>3}  {:<width$}  {:>2} {:>2} {:>2} {:>2}  {:>3}:{:<3} {:>4}  {:>3}",
        "#", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"
    );
    for r in rows {
        println!(
            "{:>3}  {:<width$}  {:>2} {:>2} {:>2} {:>2}  {:>3}:{:<3} {:>+4}  {:>3}",
            r.position,
            r.team_name,
            r.played,
            r.won,
            r.drawn,
            r.lost,
            r.goals_for,
            r.goals_against,
            r.goal_difference,
            r.points
        );
    }
}
