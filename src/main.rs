use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use briscola_rs::config::SimulationConfig;
use briscola_rs::error::{BriscolaError, Result};
use briscola_rs::games::briscola::cards::Seat;
use briscola_rs::games::briscola::tracker::GameTracker;
use briscola_rs::policy::{build_policy, PolicyKind};
use briscola_rs::training::track_games;
use briscola_rs::utils::parse_seed;
use clap::Parser;
use colored::Colorize;
use log::{error, info};

#[derive(Parser)]
#[command(name = "briscola-rs")]
#[command(about = "Self-play game generator for two-player Briscola")]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of games played in parallel
    #[arg(short = 'n', long)]
    n_games: Option<usize>,

    /// Scheduler rounds per seat (must be 20)
    #[arg(long)]
    n_hands: Option<usize>,

    /// Base seed, decimal or 0x-prefixed hex
    #[arg(short, long, value_parser = parse_seed)]
    seed: Option<u64>,

    /// Seat of the policy being scored
    #[arg(long)]
    current_player: Option<Seat>,

    /// Seat of the opponent
    #[arg(long)]
    other_player: Option<Seat>,

    #[arg(long)]
    current_policy: Option<PolicyKind>,

    #[arg(long)]
    other_policy: Option<PolicyKind>,

    /// JSON weights for neural policies
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Write every trick and game summary as JSON lines
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_file(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(n_games) = self.n_games {
            config.n_games = n_games;
        }
        if let Some(n_hands) = self.n_hands {
            config.n_hands = n_hands;
        }
        if let Some(seed) = self.seed {
            config.base_seed = seed;
        }
        if let Some(seat) = self.current_player {
            config.current_player = seat;
        }
        if let Some(seat) = self.other_player {
            config.other_player = seat;
        }
        if let Some(kind) = self.current_policy {
            config.current_policy = kind;
        }
        if let Some(kind) = self.other_policy {
            config.other_policy = kind;
        }
        if self.model.is_some() {
            config.model_path = self.model;
        }
        if self.output.is_some() {
            config.output = self.output;
        }
        config.validate()?;
        Ok(config)
    }
}

fn write_games(path: &Path, games: &[GameTracker]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for game in games {
        for trick in &game.tricks {
            serde_json::to_writer(&mut writer, trick)?;
            writeln!(writer)?;
        }
        serde_json::to_writer(&mut writer, &game.summary())?;
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

fn run(config: &SimulationConfig) -> Result<()> {
    let model_path = config.model_path.as_deref();
    let current_policy = build_policy(
        config.current_policy,
        model_path,
        config.hidden_size,
        config.base_seed,
    )?;
    let other_policy = build_policy(
        config.other_policy,
        model_path,
        config.hidden_size,
        config.base_seed.wrapping_add(1),
    )?;
    info!(
        "playing {} games: {} as {}, {} as {}",
        config.n_games,
        current_policy.name(),
        config.current_player,
        other_policy.name(),
        config.other_player
    );

    let (vec_env, evaluation) = track_games(
        current_policy.as_ref(),
        other_policy.as_ref(),
        GameTracker::new,
        &config.evaluation_settings(),
    )?;

    println!(
        "Played {} games, score: {} +- {}. The score should be close to 0.5",
        evaluation.n_games,
        format!("{:.4}", evaluation.mean).bold().green(),
        format!("{:.4}", evaluation.standard_error).yellow()
    );

    if let Some(path) = &config.output {
        let games = vec_env.into_envs();
        write_games(path, &games)?;
        info!("wrote {} games to {}", evaluation.n_games, path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let result = Args::parse().into_config().and_then(|config| run(&config));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match &err {
                BriscolaError::Instance { index, source } => {
                    error!("game {} failed: {}", index, source)
                }
                _ => error!("{}", err),
            }
            ExitCode::FAILURE
        }
    }
}
