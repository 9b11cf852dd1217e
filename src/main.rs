use std::path::Path;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use winit::{
    dpi::LogicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

use yellow_lightning::engine::state::StateManager;
use yellow_lightning::engine::timer::Timer;
use yellow_lightning::levels::loader::load_levels;
use yellow_lightning::save::{JsonFileStore, ProgressStore, default_high_scores};
use yellow_lightning::{GameConfig, GameResult, PlayOutcome, PlayState, Session};

const CONFIG_FILE: &str = "config.json";
const LEVEL_DIR: &str = "assets/levels";
const SAVE_FILE: &str = "save.json";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run() {
        error!(%err, "failed to start");
        std::process::exit(1);
    }
}

fn run() -> GameResult<()> {
    let config_path = Path::new(CONFIG_FILE);
    let config = if config_path.is_file() {
        GameConfig::load(config_path)?
    } else {
        GameConfig::default()
    };

    let levels = load_levels(Path::new(LEVEL_DIR))?;
    let store = JsonFileStore::new(SAVE_FILE);
    let high_scores = store.load_high_scores().unwrap_or_else(|err| {
        warn!(%err, "could not read high scores, starting fresh");
        default_high_scores()
    });
    let session = Session::new(levels, config.clone()).with_high_scores(high_scores);
    let playing = PlayState::new(session, Box::new(store))?;

    // Initialize the event loop
    let event_loop = EventLoop::new();

    // Nothing is drawn here; the title bar carries the status line
    let window = WindowBuilder::new()
        .with_title("Yellow Lightning")
        .with_inner_size(LogicalSize::new(800, 600))
        .build(&event_loop)?;

    let mut state_manager = StateManager::new(window, playing);
    let mut timer = Timer::new(config.max_frame_delta);

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        match event {
            Event::WindowEvent { event, window_id } if window_id == state_manager.window.id() => {
                if let WindowEvent::Focused(false) = event {
                    state_manager.state_mut().input_mut().clear();
                }
                if state_manager.handle_window_event(&event) {
                    info!("exit requested");
                    *control_flow = ControlFlow::Exit;
                }
            }
            Event::MainEventsCleared => {
                let dt = timer.delta();
                let Some(outcome) = state_manager.update(dt) else {
                    return;
                };

                let playing = state_manager.state_mut();
                let next = match outcome {
                    PlayOutcome::Victory { .. } => playing.session().next_level(),
                    PlayOutcome::GameOver { level } => level,
                };
                if let Err(err) = playing.load_level(next) {
                    error!(%err, level = next, "failed to load level");
                    *control_flow = ControlFlow::Exit;
                }
            }
            _ => {}
        }
    });
}
