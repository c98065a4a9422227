mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use dotenv::dotenv;
use env_logger::Env;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use archive::GameArchive;
use cli::{AugmentCommand, Cli, Commands, InspectCommand, PackCommand, VerifyCommand};
use common::{get_env_usize, BOARD_SQ};
use replay::{encode_position, random_symmetry, PackedSample, ScoreArchive};

fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Verify(args) => verify(args),
        Commands::Inspect(args) => inspect(args),
        Commands::Pack(args) => pack(args),
        Commands::Augment(args) => augment(args),
    }
}

fn verify(args: &VerifyCommand) -> Result<()> {
    let archive = GameArchive::load(&args.input, args.framing.into())?;

    let mut total_moves = 0usize;
    let mut total_positions = 0usize;

    for (game_index, record) in archive.games().iter().enumerate() {
        let game = record
            .parsed()
            .with_context(|| format!("game {} failed to parse", game_index))?;

        let mut board = vec![0i8; BOARD_SQ];
        let mut player = 1i8;

        for (step_index, step) in game.steps().iter().enumerate() {
            if !step.is_pass() {
                let pos = step.position as usize;
                if board[pos] != 0 {
                    bail!(
                        "game {} step {}: point {} is already occupied",
                        game_index,
                        step_index,
                        pos
                    );
                }
                board[pos] = player;
            }

            for &rm in &step.removed {
                if board[rm as usize] == 0 {
                    bail!(
                        "game {} step {}: removal of an empty point {}",
                        game_index,
                        step_index,
                        rm
                    );
                }
                board[rm as usize] = 0;
            }

            player = -player;
        }

        total_moves += game.steps().len();
        total_positions += game.valid_indices().len();
    }

    println!(
        "{} games, {} moves, {} sampleable positions",
        archive.len(),
        total_moves,
        total_positions
    );

    Ok(())
}

fn inspect(args: &InspectCommand) -> Result<()> {
    let archive = GameArchive::load(&args.input, args.framing.into())?;

    if args.game >= archive.len() {
        bail!("game {} out of range ({} games)", args.game, archive.len());
    }

    let game = archive.games()[args.game]
        .parsed()
        .with_context(|| format!("game {} failed to parse", args.game))?;

    let summary = serde_json::json!({
        "game": args.game,
        "result": game.result(),
        "steps": game.steps().len(),
        "sampleable": game.valid_indices().len(),
        "passes": game.steps().iter().filter(|s| s.is_pass()).count(),
        "captured": game.steps().iter().map(|s| s.removed.len()).sum::<usize>(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if args.steps {
        println!("{}", serde_json::to_string_pretty(game.steps())?);
    }

    Ok(())
}

fn pack(args: &PackCommand) -> Result<()> {
    if let Some(threads) = get_env_usize("PACK_THREADS") {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    let archive = GameArchive::load(&args.input, args.framing.into())?;

    let entries = archive.sample_positions();
    info!(
        "packing {} positions from {} games",
        entries.len(),
        archive.len()
    );

    let samples: Vec<PackedSample> = entries
        .par_iter()
        .map(|&(game_index, step_index)| {
            // records were parsed while collecting the entry list
            let game = archive.games()[game_index]
                .parsed()
                .expect("indexed game parses");
            PackedSample::from_position(&encode_position(game, step_index))
        })
        .collect();

    ScoreArchive::write(&args.output, &samples)?;
    println!("wrote {} samples to {}", samples.len(), args.output);

    Ok(())
}

fn augment(args: &AugmentCommand) -> Result<()> {
    let archive = ScoreArchive::load(&args.input)?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let augmented: Vec<PackedSample> = archive
        .samples()
        .iter()
        .map(|sample| sample.apply_symmetry(random_symmetry(&mut rng)))
        .collect();

    ScoreArchive::write(&args.output, &augmented)?;
    println!("augmented {} samples into {}", augmented.len(), args.output);

    Ok(())
}
