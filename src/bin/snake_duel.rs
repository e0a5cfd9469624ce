use clap::{Args, Parser, Subcommand};
use snake_duel::config::SnakeConfig;
use snake_duel::error::Result;
use snake_duel::persistence::{reset_checkpoints, CheckpointPaths, ResetOutcome};
use snake_duel::trainer::Trainer;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snake_duel")]
#[command(version, about = "Two snakes learning to compete with deep Q-learning")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train both agents headlessly, resuming from any saved checkpoint
    Train(TrainArgs),
    /// Watch the agents play on an ASCII board while they keep learning
    Play(PlayArgs),
    /// Delete every checkpoint file
    Reset {
        #[arg(long, default_value = "checkpoints")]
        checkpoint_dir: PathBuf,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Directory holding models, memories and the training state
    #[arg(long, default_value = "checkpoints")]
    checkpoint_dir: PathBuf,

    /// JSON configuration file; missing sections use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the environment and both agents
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct TrainArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Number of episodes to run
    #[arg(long, default_value = "1000")]
    episodes: usize,

    /// Step cap per episode (overrides the configuration)
    #[arg(long)]
    max_steps: Option<usize>,

    /// CSV file receiving progress lines
    #[arg(long, default_value = "training_log.csv")]
    log_file: PathBuf,
}

#[derive(Args)]
struct PlayArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Number of episodes to show
    #[arg(long, default_value = "5")]
    episodes: usize,

    /// Frames per second; 0 runs unpaced
    #[arg(long, default_value = "10")]
    fps: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Train(args) => train(args),
        Command::Play(args) => play(args),
        Command::Reset { checkpoint_dir } => reset(checkpoint_dir),
    }
}

fn load_config(common: &CommonArgs) -> Result<SnakeConfig> {
    match &common.config {
        Some(path) => SnakeConfig::from_json_file(path),
        None => Ok(SnakeConfig::default()),
    }
}

fn build_trainer(common: &CommonArgs, config: SnakeConfig) -> Result<Trainer> {
    match common.seed {
        Some(seed) => Trainer::with_seed(config, seed),
        None => Trainer::new(config),
    }
}

fn train(args: TrainArgs) -> Result<()> {
    let mut config = load_config(&args.common)?;
    if let Some(max_steps) = args.max_steps {
        config.game.max_episode_steps = max_steps;
    }
    let paths = CheckpointPaths::in_dir(&args.common.checkpoint_dir);

    let mut trainer = build_trainer(&args.common, config)?.with_log(&args.log_file)?;
    trainer.resume(&paths)?;
    let summaries = trainer.train(args.episodes)?;
    trainer.save_checkpoint(&paths)?;

    let totals = summaries.iter().fold([0u32; 2], |acc, summary| {
        [acc[0] + summary.score_delta[0], acc[1] + summary.score_delta[1]]
    });
    println!(
        "Trained {} episodes: agent 1 scored {}, agent 2 scored {}",
        summaries.len(),
        totals[0],
        totals[1]
    );
    Ok(())
}

fn play(args: PlayArgs) -> Result<()> {
    let config = load_config(&args.common)?;
    let paths = CheckpointPaths::in_dir(&args.common.checkpoint_dir);
    let mut trainer = build_trainer(&args.common, config)?;
    trainer.resume(&paths)?;

    let frame = (args.fps > 0).then(|| Duration::from_secs_f64(1.0 / f64::from(args.fps)));
    for _ in 0..args.episodes {
        let summary = trainer.run_episode_with(|state| {
            println!("\x1B[2J\x1B[H{}", state);
            if let Some(frame) = frame {
                std::thread::sleep(frame);
            }
        })?;
        println!(
            "Episode {} finished after {} steps: +{} / +{}",
            summary.episode, summary.steps, summary.score_delta[0], summary.score_delta[1]
        );
    }

    trainer.save_checkpoint(&paths)?;
    Ok(())
}

fn reset(checkpoint_dir: PathBuf) -> Result<()> {
    let paths = CheckpointPaths::in_dir(checkpoint_dir);
    for (path, outcome) in reset_checkpoints(&paths)? {
        match outcome {
            ResetOutcome::Deleted => println!("Deleted {}", path.display()),
            ResetOutcome::Absent => println!("{} not found, nothing to delete", path.display()),
        }
    }
    println!("Training state reset.");
    Ok(())
}
