use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use engine::{prelude::*, Arena, DirStore, MemoryStore, SaveStore};
use rand::Rng;
use tracing_subscriber::EnvFilter;

mod bot;
mod view;

pub const GAME_NAME: &str = "delve";

/// Simulated wall clock time between ticks.
const FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Parser, Debug)]
#[command(about = "Run a dungeon crawl with an automatic player")]
struct Args {
    #[arg(long, help = "Game world seed")]
    seed: Option<u64>,

    #[arg(long, default_value_t = 200, help = "Stop after this many rounds")]
    rounds: u64,

    #[arg(long, help = "Directory for save files, kept in memory if unset")]
    save_dir: Option<PathBuf>,

    #[arg(long, help = "Discard any saved game before starting")]
    fresh: bool,

    #[arg(long, help = "Draw the map after every player action")]
    watch: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn start(mut store: impl SaveStore + 'static, args: &Args) -> Result<Runtime> {
    if args.fresh {
        store.clear_all();
    }
    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    log::info!("seed: {seed}");
    Ok(Runtime::new(ThingDb::builtin()?, store, Arena::default(), seed))
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut r = match &args.save_dir {
        Some(dir) => start(DirStore::new(dir)?, &args)?,
        None => start(MemoryStore::default(), &args)?,
    };

    let mut now = r.now_ms();
    loop {
        now += FRAME_MS;
        r.tick(now);

        for msg in r.drain_msgs() {
            if let Some(line) = view::describe(&msg) {
                println!("{line}");
            }
        }

        if r.status() == ScenarioStatus::Lost {
            break;
        }
        if r.round() >= args.rounds {
            log::info!("Stopping after {} rounds", r.round());
            break;
        }

        if r.is_player_turn() {
            let action = bot::decide(&r);
            log::debug!("bot: {action:?}");
            let before = r.player().economy.action;
            r.act(action);
            // Free actions like bumping a wall would spin forever.
            if r.is_player_turn() && r.player().economy.action == before {
                r.act(Action::Pass);
            }
            if args.watch {
                print!("{}", view::screen(&r));
            }
        }
    }

    r.save();
    print!("{}", view::screen(&r));
    Ok(())
}
