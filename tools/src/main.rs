//! sim-runner: headless possession runner.
//!
//! Plays possessions back and forth between the two teams in
//! `{data_dir}/teams.json` until the quarter runs out.
//!
//! Usage:
//!   sim-runner --seed 12345 --quarter-time 720 --data-dir ./data
//!   sim-runner --seed 12345 --possessions 10 --json

use anyhow::{bail, Context, Result};
use hoopsim_core::{
    result::{BoxScoreLine, PossessionResult},
    rng::SeedBank,
    PossessionEngine, SimConfig, SimulationTeam,
};
use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;

const TEAMS_FILE: &str = "teams.json";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let quarter_time = parse_arg(&args, "--quarter-time", 720.0f64);
    let max_possessions = parse_arg(&args, "--possessions", u64::MAX);
    let json = args.iter().any(|a| a == "--json");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");

    if !json {
        println!("hoopsim: sim-runner");
        println!("  seed:          {seed}");
        println!("  quarter time:  {quarter_time:.1}s");
        println!("  data_dir:      {data_dir}");
        println!();
    }

    let config = Arc::new(SimConfig::load(data_dir)?);
    let teams = load_teams(data_dir)?;
    let [home, away] = match <[SimulationTeam; 2]>::try_from(teams) {
        Ok(pair) => pair,
        Err(teams) => bail!("{TEAMS_FILE} must hold exactly two teams, found {}", teams.len()),
    };

    let engine = PossessionEngine::new(config)?;
    let seeds = SeedBank::new(seed);
    log::info!("running {} vs {} with the {} policy", home.id, away.id, engine.policy_name());

    let mut results: Vec<PossessionResult> = Vec::new();
    let mut remaining = quarter_time;
    let mut index = 0u64;
    let mut next_handler: Option<String> = None;

    while remaining > 0.0 && index < max_possessions {
        let (offense, defense) = if index % 2 == 0 { (&home, &away) } else { (&away, &home) };
        let handler = next_handler
            .take()
            .filter(|id| offense.player(id).is_some())
            .or_else(|| first_player(offense))
            .unwrap_or_default();

        let result = engine.simulate(offense, defense, &handler, seeds.for_possession(index), remaining)?;
        remaining = result.quarter_time_remaining;
        next_handler = result.new_ball_handler.clone();

        if json {
            println!("{}", serde_json::to_string(&result)?);
        } else {
            println!(
                "#{index:<3} {:>4} {:<32} +{} ({:.1}s, {:.1}s left)",
                offense.id, result.terminal_reason.to_string(), result.points, result.duration, remaining
            );
        }
        results.push(result);
        index += 1;
    }

    if !json {
        print_summary(&home, &away, &results);
    }
    Ok(())
}

fn load_teams(data_dir: &str) -> Result<Vec<SimulationTeam>> {
    let path = format!("{data_dir}/{TEAMS_FILE}");
    let content = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let teams: Vec<SimulationTeam> = serde_json::from_str(&content).with_context(|| format!("parsing {path}"))?;
    log::info!("Loaded {} teams from {path}", teams.len());
    Ok(teams)
}

fn first_player(team: &SimulationTeam) -> Option<String> {
    team.lineup.first().or_else(|| team.roster.first().map(|p| &p.id)).cloned()
}

fn print_summary(home: &SimulationTeam, away: &SimulationTeam, results: &[PossessionResult]) {
    let mut score: BTreeMap<&str, u32> = BTreeMap::new();
    let mut turnovers: BTreeMap<&str, u32> = BTreeMap::new();
    for r in results {
        *score.entry(r.offense_team.as_str()).or_default() += r.points;
        if r.turnover {
            *turnovers.entry(r.offense_team.as_str()).or_default() += 1;
        }
    }

    println!();
    println!("=== QUARTER SUMMARY ===");
    println!("  possessions:    {}", results.len());
    for team in [home, away] {
        println!(
            "  {:<24} {:>3} pts  {:>2} TO",
            team.name,
            score.get(team.id.as_str()).copied().unwrap_or(0),
            turnovers.get(team.id.as_str()).copied().unwrap_or(0)
        );
    }

    let mut lines: BTreeMap<&str, BoxScoreLine> = BTreeMap::new();
    for line in results.iter().flat_map(|r| &r.box_score) {
        let total = lines.entry(line.player_id.as_str()).or_insert_with(|| BoxScoreLine {
            player_id: line.player_id.clone(),
            team_id: line.team_id.clone(),
            ..Default::default()
        });
        total.points += line.points;
        total.field_goals_attempted += line.field_goals_attempted;
        total.field_goals_made += line.field_goals_made;
        total.three_pointers_attempted += line.three_pointers_attempted;
        total.three_pointers_made += line.three_pointers_made;
        total.assists += line.assists;
        total.turnovers += line.turnovers;
        total.steals += line.steals;
        total.blocks += line.blocks;
        total.offensive_rebounds += line.offensive_rebounds;
        total.defensive_rebounds += line.defensive_rebounds;
    }

    println!();
    println!("=== BOX SCORE ===");
    println!("  {:<8} {:>3} {:>4} {:>6} {:>6} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4}", "player", "pos", "pts", "fg", "3p", "ast", "reb", "stl", "blk", "to", "team");
    for (id, l) in &lines {
        let pos = [home, away]
            .iter()
            .flat_map(|t| &t.roster)
            .find(|p| p.id == *id)
            .map_or("-", |p| p.position.abbreviation());
        println!(
            "  {id:<8} {pos:>3} {:>4} {:>6} {:>6} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4}",
            l.points,
            format!("{}/{}", l.field_goals_made, l.field_goals_attempted),
            format!("{}/{}", l.three_pointers_made, l.three_pointers_attempted),
            l.assists,
            l.offensive_rebounds + l.defensive_rebounds,
            l.steals,
            l.blocks,
            l.turnovers,
            l.team_id
        );
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
