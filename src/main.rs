//! Self-play driver and lexicon compiler for the engine.

use clap::{Parser, Subcommand, ValueEnum};
use flexi_logger::Logger;
use scrabble_engine::{
    engine::{Generator, Strategy},
    game::Game,
    lexicon::{Klv, Kwg, KwgBuilder},
};
use std::{error::Error, fs, path::PathBuf};

#[derive(Parser)]
#[command(about = "GADDAG scrabble engine: self-play and lexicon tooling")]
struct Cli {
    /// Log level filter (error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play seeded engine-vs-engine games and print the final scores.
    Selfplay {
        /// Path to the word graph (.kwg).
        #[arg(long)]
        kwg: PathBuf,
        /// Path to the leave values (.klv16).
        #[arg(long)]
        klv: Option<PathBuf>,
        /// First seed to play.
        #[arg(long)]
        seed: Option<u32>,
        /// Number of consecutive seeds to play.
        #[arg(long, default_value_t = 1)]
        games: u32,
        /// Anchor processing strategy.
        #[arg(long, value_enum, default_value_t = StrategyArg::Shadow)]
        strategy: StrategyArg,
    },
    /// Compile a word list (one word per line) into a .kwg file.
    Compile {
        /// Path to the word list.
        #[arg(long)]
        words: PathBuf,
        /// Output path for the packed graph.
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    Shadow,
    NoShadow,
    Hybrid,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Shadow => Strategy::Shadow,
            StrategyArg::NoShadow => Strategy::NoShadow,
            StrategyArg::Hybrid => Strategy::Hybrid,
        }
    }
}

/// Turn cap guarding against pathological stalls.
const MAX_TURNS: usize = 200;

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let _logger = Logger::try_with_env_or_str(&cli.log_level)?
        .log_to_stderr()
        .start()?;

    match cli.command {
        Command::Selfplay {
            kwg,
            klv,
            seed,
            games,
            strategy,
        } => selfplay(kwg, klv, seed, games, strategy.into()),
        Command::Compile { words, out } => compile(words, out),
    }
}

fn selfplay(
    kwg_path: PathBuf,
    klv_path: Option<PathBuf>,
    seed: Option<u32>,
    games: u32,
    strategy: Strategy,
) -> Result<(), Box<dyn Error>> {
    let (kwg, _) = Kwg::from_bytes(&fs::read(&kwg_path)?)?;
    let klv = match klv_path {
        Some(path) => Some(Klv::from_bytes(&fs::read(&path)?)?),
        None => None,
    };
    let generator = match &klv {
        Some(klv) => Generator::with_leaves(&kwg, klv),
        None => Generator::new(&kwg),
    };

    // unseeded runs pick a fresh starting seed.
    let first_seed = seed.unwrap_or_else(rand::random);

    for seed in first_seed..first_seed.wrapping_add(games) {
        let mut game = Game::new(seed);
        let mut turns = 0;

        while !game.is_over() && turns < MAX_TURNS {
            let mover = game.to_play();
            let rack = game.player(mover).rack().clone();
            let opp_rack = game.player(1 - mover).rack().clone();

            let generated = generator.generate(
                game.board(),
                &rack,
                Some(&opp_rack),
                game.bag_len(),
                strategy,
            );
            log::info!(
                "seed {} turn {} p{}: {} ({} anchors, {} cut)",
                seed,
                turns,
                mover,
                generated.play,
                generated.stats.anchors_considered,
                generated.stats.anchors_cut_off,
            );

            game.play(&generated.play, &kwg)?;
            turns += 1;
        }

        println!(
            "{}:{}:{}",
            seed,
            game.player(0).score(),
            game.player(1).score()
        );
    }

    Ok(())
}

fn compile(words_path: PathBuf, out_path: PathBuf) -> Result<(), Box<dyn Error>> {
    let words = fs::read_to_string(&words_path)?;
    let mut builder = KwgBuilder::new();
    for line in words.lines() {
        builder.insert(line.trim());
    }

    let kwg = builder.build();
    fs::write(&out_path, kwg.to_bytes())?;
    log::info!("compiled {} nodes to {}", kwg.len(), out_path.display());

    Ok(())
}
