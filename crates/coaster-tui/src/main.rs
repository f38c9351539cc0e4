mod app;
mod cli;
mod commands;
mod config;
mod logging;
mod render;
mod theme;

use anyhow::{Context, Result};
use app::App;
use chrono::NaiveDate;
use clap::Parser;
use cli::{Cli, Command};
use coaster_core::{FileStore, Session};
use config::Settings;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Write};
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli)?;
    let _guard = logging::setup_logging(&settings.log_dir(), cli.debug)?;

    let day = cli.day.unwrap_or_else(|| settings.schedule().today());
    let store = FileStore::new(&settings.data_dir);
    tracing::info!(day = %day, data_dir = %settings.data_dir.display(), "starting");

    match cli.command() {
        Command::Play => play(&settings, store, day),
        Command::Generate { seed } => commands::run_generate(&settings, &store, day, seed),
        Command::Share => commands::run_share(&store, day),
        Command::Reset => commands::run_reset(&store, day),
    }
}

fn play(settings: &Settings, store: FileStore, day: NaiveDate) -> Result<()> {
    // A failure here surfaces as the unavailable screen once the session loads.
    if let Err(err) = commands::ensure_puzzle(settings, &store, day, None) {
        tracing::error!(error = ?err, "could not provision puzzle");
    }

    let mut session = Session::new(store.clone());
    // Errors leave the session in the unavailable phase, which the UI renders.
    let _ = session.load(day, &store, &mut rand::thread_rng());
    let mut app = App::new(session, settings.theme);

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let result = run_app(&mut stdout, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;

    result?;
    if let Some(summary) = app.session.summary().filter(|_| app.session.phase().is_finished()) {
        println!("{summary}");
    }
    Ok(())
}

fn run_app(stdout: &mut io::Stdout, app: &mut App<FileStore>) -> io::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        let tick_rate = app.get_tick_rate();

        render::render(stdout, app)?;
        stdout.flush()?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout.min(Duration::from_millis(33)))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                // Handle Ctrl+C
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break;
                }

                match app.handle_key(key) {
                    app::AppAction::Continue => {}
                    app::AppAction::Quit => break,
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}
