//! Snakeshift command line
//!
//! Generates levels, simplifies and checks recorded playthroughs, and offers a
//! bare line-based player for trying levels out.

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use snakeshift::generator::generate_level;
use snakeshift::persistence::{
    LoadedLevel, Playthrough, load_level, load_playthrough, save_playthrough, serialize_level,
    serialize_playthrough,
};
use snakeshift::session::{Command, GameSession, SessionPhase};
use snakeshift::sim::{CollisionLayer, Direction, Entity, Level, Point, replay};
use snakeshift::simplify::simplify_playthrough_with;
use snakeshift::{GeneratorPreset, Settings};

/// Snakeshift puzzle tools
#[derive(Parser, Debug)]
#[command(name = "snakeshift")]
#[command(author, version, about = "Snakeshift level generator and playthrough tools", long_about = None)]
struct Args {
    /// Settings file (JSON); missing fields take defaults
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Generate a level and print it as JSON
    Generate {
        /// RNG seed; random if omitted
        #[arg(long)]
        seed: Option<u64>,

        /// Effort preset (quick, standard, thorough)
        #[arg(long)]
        preset: Option<String>,

        /// Number of generation attempts
        #[arg(long)]
        tries: Option<u32>,

        /// Also write the level with its solution as a playthrough file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Shorten a recorded playthrough and print it
    Simplify {
        playthrough: PathBuf,

        /// Search depth for replacement move sequences
        #[arg(long)]
        depth: Option<usize>,
    },

    /// Replay a playthrough and report whether it wins
    Check { playthrough: PathBuf },

    /// Play a level with line commands (w/a/s/d, c, z, y, r, q)
    Play { level: PathBuf },
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

fn run(args: Args) -> Result<bool, Box<dyn Error>> {
    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    match args.command {
        Cmd::Generate {
            seed,
            preset,
            tries,
            out,
        } => {
            if let Some(name) = preset {
                let preset = GeneratorPreset::from_str(&name)
                    .ok_or_else(|| format!("unknown preset '{name}'"))?;
                settings.generator.apply_preset(preset);
            }
            if let Some(tries) = tries {
                settings.generator.tries = tries;
            }
            let seed = seed.unwrap_or_else(|| rand::rng().random());
            log::info!(
                "Generating with seed {} ({} tries, preset {})",
                seed,
                settings.generator.tries,
                settings.generator.preset.as_str()
            );
            let mut rng = Pcg32::seed_from_u64(seed);
            let Some(generated) = generate_level(&settings.generator, &mut rng) else {
                eprintln!("No level generated; try another seed or more tries");
                return Ok(false);
            };
            println!("{}", serialize_level(&generated.level, None)?);
            if let Some(path) = out {
                let playthrough = Playthrough::new(generated.level, generated.solution);
                save_playthrough(&path, &playthrough)?;
            }
            Ok(true)
        }

        Cmd::Simplify { playthrough, depth } => {
            if let Some(depth) = depth {
                settings.simplifier.max_depth = depth;
            }
            let recorded = load_playthrough(&playthrough)?;
            let moves =
                simplify_playthrough_with(&recorded.moves, &recorded.level.level, &settings.simplifier)?;
            eprintln!("{} -> {} moves", recorded.moves.len(), moves.len());
            let simplified = Playthrough {
                level: recorded.level,
                moves,
            };
            println!("{}", serialize_playthrough(&simplified)?);
            Ok(true)
        }

        Cmd::Check { playthrough } => {
            let recorded = load_playthrough(&playthrough)?;
            let states = replay(&recorded.level.level, &recorded.moves)?;
            let won = states.last().is_some_and(Level::is_won);
            println!(
                "{} moves, {}",
                recorded.moves.len(),
                if won { "wins" } else { "does not win" }
            );
            Ok(won)
        }

        Cmd::Play { level } => play(load_level(&level)?),
    }
}

fn play(loaded: LoadedLevel) -> Result<bool, Box<dyn Error>> {
    let mut session = GameSession::new(loaded.level);
    if let Some(id) = loaded.level_id {
        session = session.with_level_id(id);
    }
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    print!("{}", render_text(&session));
    for line in stdin.lock().lines() {
        let line = line?;
        let command = match line.trim() {
            "w" | "k" => Command::Move(Direction::Up),
            "a" | "h" => Command::Move(Direction::Left),
            "s" | "j" => Command::Move(Direction::Down),
            "d" | "l" => Command::Move(Direction::Right),
            "c" | "tab" => Command::CycleActiveSnake,
            "z" => Command::Undo,
            "y" => Command::Redo,
            "r" => Command::Restart,
            "q" => return Ok(false),
            other => {
                eprintln!("unknown command '{other}'");
                continue;
            }
        };
        let phase = session.apply(command);
        let feedback = session.take_feedback();
        if feedback.blink_encumbered {
            println!("(something is standing on that snake)");
        } else if feedback.blink_snake && matches!(command, Command::Move(_)) {
            println!("(blocked)");
        }
        print!("{}", render_text(&session));
        match phase {
            SessionPhase::Won => {
                println!("Solved in {} moves", session.history().len());
                return Ok(true);
            }
            SessionPhase::Stuck => println!("No snake can move; undo or restart"),
            SessionPhase::Playing => {}
        }
        stdout.flush()?;
    }
    Ok(false)
}

/// Plain-text board: terrain `.`/`#`, food `*`, snakes by the first letter of their ID
fn render_text(session: &GameSession) -> String {
    let level = session.level();
    let mut out = String::new();
    for y in 0..level.height {
        for x in 0..level.width {
            let at = Point::new(x, y);
            let top = level.entities.iter().rev().find_map(|entity| match entity {
                Entity::Snake(snake) if snake.segments.contains(&at) => {
                    let c = snake.id.chars().next().unwrap_or('?');
                    Some(if snake.head() == at { c.to_ascii_uppercase() } else { c })
                }
                Entity::Food(food) if food.position == at => Some('*'),
                _ => None,
            });
            out.push(top.unwrap_or(match level.terrain_at(at) {
                Some(CollisionLayer::White) => '#',
                Some(CollisionLayer::Black) => '.',
                Some(CollisionLayer::Both) => '%',
                _ => ' ',
            }));
        }
        out.push('\n');
    }
    if let Some(index) = session.active_snake_index() {
        let snake = level.snake(index);
        out.push_str(&format!("active: {} ({})\n", snake.id, snake.layer));
    }
    out
}
