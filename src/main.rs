use std::fs::File;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use log::{info, warn};
use simplelog::{Config, LevelFilter, WriteLogger};

use termsnake::game::SessionEnd;
use termsnake::{terminal, GameConfig, GameController};

#[derive(Parser)]
#[command(name = "termsnake")]
#[command(version, about = "Snake in the terminal")]
struct Cli {
    /// Grid width, walls included
    #[arg(long, default_value_t = 40)]
    width: i32,

    /// Grid height, walls included
    #[arg(long, default_value_t = 20)]
    height: i32,

    /// Size the grid to the current terminal instead
    #[arg(long)]
    fit_terminal: bool,

    /// Print the game state on every tick
    #[arg(long)]
    debug: bool,

    /// Play a fixed move script (e.g. "..8..4..5") instead of reading keys
    #[arg(long)]
    moves: Option<String>,

    /// Start playing right away
    #[arg(long)]
    skip_menu: bool,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Write a log to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> GameConfig {
        let (mut width, mut height) = (self.width, self.height);
        if self.fit_terminal {
            match terminal::window_size() {
                Some((cols, rows)) => (width, height) = terminal::grid_for_window(cols, rows),
                None => warn!("terminal size unavailable, using {}x{}", width, height),
            }
        }
        GameConfig {
            width,
            height,
            debug: self.debug,
            moves: self.moves,
            skip_menu: self.skip_menu,
            seed: self.seed,
            ..Default::default()
        }
    }
}

fn main() -> Result<()> {
    let mut cli = Cli::parse();

    if let Some(path) = cli.log_file.take() {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        WriteLogger::init(LevelFilter::Debug, Config::default(), file)
            .context("Failed to initialize logger")?;
    }

    let config = cli.into_config();
    let scripted = config.is_scripted();
    info!("starting with {:?}", config);

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    if let Err(err) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        warn!("Ctrl+C handler not installed: {}", err);
    }

    let mut game = GameController::new(config, shutdown).context("Failed to set up the game")?;
    let summary = game.run().context("Game loop failed")?;

    // the terminal is back to normal by now
    match summary.end {
        SessionEnd::Interrupted => println!("\n{}", "GAME INTERRUPTED!".red().bold()),
        SessionEnd::InputClosed => println!("\n{}", "Input closed.".yellow()),
        SessionEnd::Quit | SessionEnd::ScriptExhausted | SessionEnd::GameOver => {}
    }
    if summary.end == SessionEnd::Interrupted || scripted {
        println!(
            "Final Score: {}",
            summary.snapshot.score.to_string().yellow()
        );
    }
    if scripted {
        let json = serde_json::to_string_pretty(&summary.snapshot)
            .context("Failed to serialize final state")?;
        println!("\nFINAL STATE: {}", json);
    }
    println!("\n{}", "Thanks for playing Snake!".yellow());

    Ok(())
}
