//! Respite runner: home screen with rotating content, tab into the game.
//!
//! Single cooperative loop: poll input with a timeout until the next frame,
//! apply actions, tick the engine once per frame, drain content refresh
//! events, draw. The engine never blocks; everything async stays on the
//! content service's runtime.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use tracing::info;

use respite::config::AppConfig;
use respite::content::{
    source, unix_time_ms, BatchConfig, BatchManager, ContentService, DirSource, JsonFileStore,
    RotationPicker, Storage,
};
use respite::core::{GameSnapshot, GameState};
use respite::input::{map_key, AppAction};
use respite::term::{GameView, HomeContent, HomeView, TerminalRenderer, Viewport};
use respite::types::{ContentKind, GameAction, TICK_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Home,
    Game,
}

fn main() -> Result<()> {
    let config = AppConfig::from_env();
    init_logging(&config);

    let storage: Arc<dyn Storage> = Arc::new(JsonFileStore::new(config.data_dir.clone()));
    let manager = Arc::new(BatchManager::new(
        Arc::clone(&storage),
        Arc::new(DirSource::new(config.content_dir.clone())),
        BatchConfig {
            batch_size: config.batch_size,
            seed: config.seed,
            ..BatchConfig::default()
        },
    ));
    let picker = Arc::new(RotationPicker::new(
        Arc::clone(&storage),
        config.window_days,
        config.seed,
    ));
    let mut service = ContentService::start(manager, picker)?;
    service.spawn_refresh_all(unix_time_ms());

    let mut term = TerminalRenderer::new();
    term.enter()?;
    let result = run(&mut term, &mut service, &config);
    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn init_logging(config: &AppConfig) {
    let Some(path) = &config.log_path else {
        return;
    };
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
    else {
        return;
    };
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init();
    info!("logging to {}", path.display());
}

/// Pick a fresh quote and exercise for the home screen.
fn pick_home(service: &ContentService, status: String) -> HomeContent {
    let now = unix_time_ms();

    let quotes = service.batch(ContentKind::Quotes, source::fallback(ContentKind::Quotes));
    let exercises = service.batch(
        ContentKind::Exercises,
        source::fallback(ContentKind::Exercises),
    );

    let quote = service
        .pick(&quotes, 1, now)
        .ok()
        .and_then(|mut v| v.pop());
    let exercise = service
        .pick(&exercises, 1, now)
        .ok()
        .and_then(|mut v| v.pop());

    HomeContent {
        quote,
        exercise,
        status,
    }
}

fn run(term: &mut TerminalRenderer, service: &mut ContentService, config: &AppConfig) -> Result<()> {
    let mut game = GameState::new(config.seed);
    let game_view = GameView::default();
    let home_view = HomeView;

    let mut screen = Screen::Home;
    let mut home = pick_home(service, String::new());
    let mut refreshed = 0usize;

    let clock = Instant::now();
    let mut last_frame = Instant::now();
    let frame_budget = Duration::from_millis(TICK_MS);

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        let frame = match screen {
            Screen::Home => home_view.render(&home, viewport),
            Screen::Game => game_view.render(&GameSnapshot::capture(&game), viewport),
        };
        term.present(&frame)?;

        // Input with timeout until the next frame.
        let timeout = frame_budget
            .checked_sub(last_frame.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                match map_key(key) {
                    Some(AppAction::Quit) => return Ok(()),
                    Some(AppAction::SwitchScreen) => {
                        screen = match screen {
                            Screen::Home => Screen::Game,
                            Screen::Game => {
                                // Leaving the game suspends it.
                                if !game.paused() && !game.game_over() {
                                    game.apply_action(GameAction::Pause);
                                }
                                home = pick_home(service, home.status.clone());
                                Screen::Home
                            }
                        };
                    }
                    Some(AppAction::NextContent) => {
                        if screen == Screen::Home {
                            home = pick_home(service, home.status.clone());
                        }
                    }
                    Some(AppAction::Game(action)) => {
                        if screen == Screen::Game {
                            game.apply_action(action);
                        }
                    }
                    None => {}
                }
            }
        }

        // Tick.
        if last_frame.elapsed() >= frame_budget {
            last_frame = Instant::now();
            game.tick(clock.elapsed().as_millis() as u64);
        }

        // Drain content refresh results.
        while let Some(ev) = service.try_recv() {
            if ev.outcome.is_success() {
                refreshed += 1;
                home.status = format!("content refreshed ({refreshed} kinds)");
            }
        }
    }
}
