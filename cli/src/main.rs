use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use demine_core::{CellCount, Coord, Difficulty, Game, RandomMinefieldGenerator, Stopwatch};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod command;
mod json;
mod play;
mod render;
mod scores;
mod settings;

use play::Interactive;
use scores::JsonScoreFile;
use settings::Settings;

/// Terminal minesweeper.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Board preset: classic, beginner, intermediate or expert
    #[arg(short, long)]
    preset: Option<Difficulty>,

    #[arg(long, conflicts_with = "size")]
    width: Option<Coord>,

    #[arg(long, conflicts_with = "size")]
    height: Option<Coord>,

    /// Square board, same as --width N --height N
    #[arg(short, long)]
    size: Option<Coord>,

    #[arg(short, long)]
    mines: Option<CellCount>,

    /// Seed for reproducible boards; each new game uses the next seed
    #[arg(long)]
    seed: Option<u64>,

    /// Guarantee that the first revealed cell has no adjacent mines
    #[arg(long)]
    zero_start: bool,

    /// Where best times are kept
    #[arg(long, value_name = "FILE")]
    scores: Option<PathBuf>,

    /// TOML settings file, command-line flags take precedence
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Speak JSON lines on stdin/stdout instead of the interactive prompt
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

impl Args {
    fn settings(&self) -> Settings {
        Settings {
            preset: self.preset,
            width: self.width.or(self.size),
            height: self.height.or(self.size),
            mines: self.mines,
            seed: self.seed,
            zero_start: self.zero_start.then_some(true),
            scores: self.scores.clone(),
        }
    }
}

fn init_logging(verbose: &Verbosity<WarnLevel>) {
    let default_level = verbose.log_level_filter().to_string().to_lowercase();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .with_env_filter(filter)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.verbose);

    let file_settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let settings = file_settings.merge(args.settings());
    log::debug!("Settings: {:?}", settings);

    let mut store = JsonScoreFile::new(settings.score_path());

    if args.json {
        return json::run(io::stdin().lock(), io::stdout().lock(), &mut store);
    }

    let config = settings.game_config().context("invalid board settings")?;
    let start_tile = settings.start_tile();
    log::info!(
        "{}x{} board with {} mines, scores in {}",
        config.size.0,
        config.size.1,
        config.mines,
        store.path().display()
    );

    let mut next_seed = settings.seed;
    let new_game = move || {
        let generator = match next_seed {
            Some(seed) => {
                next_seed = Some(seed.wrapping_add(1));
                RandomMinefieldGenerator::new(seed, start_tile)
            }
            None => RandomMinefieldGenerator::from_entropy(start_tile),
        };
        Game::with_generator(config, generator, Stopwatch::default())
    };

    Interactive::new(io::stdin().lock(), io::stdout().lock(), store, new_game)?.run()
}
