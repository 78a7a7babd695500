use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use sweeper_core::*;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a board and print it
    Generate {
        #[command(flatten)]
        board: BoardArgs,

        /// Print the summary as JSON instead of a grid
        #[arg(long)]
        json: bool,
    },
    /// Check a play log against the board it was recorded on
    Verify {
        #[command(flatten)]
        board: BoardArgs,

        /// Play log, as a JSON array of actions
        #[arg(short, long)]
        log: PathBuf,
    },
    /// Clear a board by digging every safe cell in reading order and write the play log
    Autoplay {
        #[command(flatten)]
        board: BoardArgs,

        /// Where to write the play log, stdout if omitted
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct BoardArgs {
    /// TOML file with the game settings; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Preset name: easy, normal, hard, expert, mania
    #[arg(short, long)]
    difficulty: Option<Difficulty>,

    #[arg(long)]
    width: Option<i64>,

    #[arg(long)]
    height: Option<i64>,

    /// Percentage of cells holding a bomb
    #[arg(short, long)]
    ratio: Option<String>,

    /// Force a seed instead of random
    #[arg(short, long, conflicts_with = "fixed")]
    seed: Option<i32>,

    /// Use the fixed reproducible seed
    #[arg(long)]
    fixed: bool,
}

impl BoardArgs {
    fn load(&self) -> anyhow::Result<GameConfig> {
        let mut raw = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Could not read config {}", path.display()))?;
                toml::from_str::<RawConfig>(&text)
                    .with_context(|| format!("Invalid config {}", path.display()))?
            }
            None => RawConfig::default(),
        };

        if let Some(difficulty) = self.difficulty {
            raw.difficulty = Some(difficulty);
        }
        if self.width.is_some() || self.height.is_some() || self.ratio.is_some() {
            raw.difficulty = Some(Difficulty::Custom);
        }
        raw.width = self.width.or(raw.width);
        raw.height = self.height.or(raw.height);
        if let Some(ratio) = &self.ratio {
            raw.bomb_ratio = Some(GameConfig::parse_ratio(ratio));
        }
        if let Some(seed) = self.seed {
            raw.seed = Some(SeedChoice::Explicit(seed));
        } else if self.fixed {
            raw.seed = Some(SeedChoice::Fixed);
        }

        let config = GameConfig::from(raw);
        log::debug!("Using {config:?}");
        Ok(config)
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Summary {
    #[serde(flatten)]
    params: BoardParams,
    bomb_total: CellCount,
    openings_total: CellCount,
    three_bv_total: CellCount,
    bombs: Vec<Coord2>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.verbose.tracing_level_filter())
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Generate { board, json } => generate(&board, json),
        Command::Verify { board, log } => verify(&board, &log),
        Command::Autoplay { board, out } => autoplay(&board, out.as_deref()),
    }
}

fn generate(args: &BoardArgs, json: bool) -> anyhow::Result<()> {
    let config = args.load()?;
    let session = GameSession::new(config, ManualClock::default());
    let board = session.board();

    if json {
        let summary = Summary {
            params: session.board_params(),
            bomb_total: board.bomb_total(),
            openings_total: board.openings_total(),
            three_bv_total: board.three_bv_total(),
            bombs: board.bomb_coords(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print!("{}", render(board));
    println!(
        "seed {} | {} bombs | {} openings | 3BV {}",
        board.seed().unwrap_or_default(),
        board.bomb_total(),
        board.openings_total(),
        board.three_bv_total()
    );
    Ok(())
}

fn verify(args: &BoardArgs, log_path: &Path) -> anyhow::Result<()> {
    let config = args.load()?;
    // a zero seed means "no seed" and would generate a fresh board
    if !matches!(config.seed(), SeedChoice::Explicit(seed) if seed != 0)
        && config.seed() != SeedChoice::Fixed
    {
        bail!("Verifying needs the board's non-zero seed, pass --seed or --fixed");
    }
    let board = ShuffleGenerator::from_seed(config.seed()).generate(&config);

    let text = fs::read_to_string(log_path)
        .with_context(|| format!("Could not read play log {}", log_path.display()))?;
    let play_log = log_from_json(&text)?;

    match validate(&board, &play_log) {
        Ok(certificate) => {
            println!(
                "{:?}: 3BV {}/{} in {} actions, {} openings",
                GameResult::Cleared,
                certificate.three_bv_solved,
                board.three_bv_total(),
                certificate.actions,
                certificate.openings_triggered
            );
            Ok(())
        }
        Err(err) => bail!("{:?}: {err}", GameResult::Illegal),
    }
}

fn autoplay(args: &BoardArgs, out: Option<&Path>) -> anyhow::Result<()> {
    let config = args.load()?;
    let clock = ManualClock::default();
    let mut session = GameSession::new(config, clock.clone());
    let size = session.board().size();

    for coords in iter_row_major(size) {
        if session.board()[coords].is_bomb() {
            continue;
        }
        clock.advance(TICK_INTERVAL_MS);
        session.tick();
        if session.click(coords, Button::Left)?.is_finished() {
            break;
        }
    }

    let info = session.info();
    log::info!(
        "Finished {:?} in {} s with {} clicks",
        info.result,
        info.elapsed_display(),
        info.left_clicks
    );
    let json = log_to_json(&info.play_log)?;
    match out {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("Could not write play log {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

/// Board as text, one row per line: `*` for bombs, `.` for empty cells, else the bomb count.
fn render(board: &Board) -> String {
    let (width, height) = board.size();
    let mut out = String::with_capacity((usize::from(width) + 1) * usize::from(height));
    for y in 0..height {
        for x in 0..width {
            let cell = &board[(x, y)];
            let glyph = match (cell.is_bomb(), cell.adjacent_bombs()) {
                (true, _) => '*',
                (false, 0) => '.',
                (false, count) => char::from(b'0' + count),
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}
