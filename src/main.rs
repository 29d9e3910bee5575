mod display;

use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use shooting_gallery::compute::{apply_input, init_state, tick};
use shooting_gallery::entities::{GalleryState, GameStatus};
use shooting_gallery::input::{input_for_key, Input};
use shooting_gallery::GameConfig;

use display::Viewport;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Terminal shooting gallery: clear the round before your magazine runs dry.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON file overriding any of the game constants
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for enemy placement (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Write log output here; the terminal itself is taken by the game
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the player quits or acknowledges the end of the game.
///
/// Key presses are turned into [`Input`]s and applied as pure transitions;
/// the simulation then advances by the real time since the previous frame
/// and the whole frame is redrawn from the resulting state.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GalleryState,
    rx: &mpsc::Receiver<Event>,
    rng: &mut StdRng,
) -> std::io::Result<()> {
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(event) = rx.try_recv() {
            let Event::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) = event
            else {
                continue;
            };
            if kind == KeyEventKind::Release {
                continue;
            }
            if state.status == GameStatus::Closed {
                return Ok(());
            }
            match input_for_key(code, modifiers) {
                Some(Input::Quit) => return Ok(()),
                Some(input) => *state = apply_input(state, input),
                None => {}
            }
        }

        // ── Advance the simulation ────────────────────────────────────────────
        let dt = frame_start.duration_since(last_frame);
        last_frame = frame_start;
        if state.status != GameStatus::Closed {
            *state = tick(state, dt, rng);
        }

        for event in state.events.drain(..) {
            log::debug!("{event:?}");
        }

        let (cols, rows) = terminal::size()?;
        display::render(out, state, Viewport { cols, rows })?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GameConfig::default(),
    };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode().context("failed to enable raw mode")?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Ask for key-repeat events so a held arrow keeps moving the player.
    // Terminals without the kitty protocol fall back to plain presses.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    log::info!("Shooting gallery starting");
    let mut state = init_state(config, &mut rng);
    let result = game_loop(&mut out, &mut state, &rx, &mut rng);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    log::info!(
        "Shooting gallery exiting after round {} with score {}",
        state.game.round,
        state.game.score
    );
    result.context("game loop failed")
}
