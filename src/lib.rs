pub mod achievements;
pub mod analysis;
pub mod app;
pub mod db;
pub mod game;
pub mod headless;
pub mod metrics;
pub mod models;
pub mod reminders;
pub mod settings;
pub mod store;
mod utils;

pub use app::{AppState, SessionOutcome};
pub use game::{FinishedSession, GameSession, SessionController};
pub use store::{AppData, KeyValueStore, MemoryStore};

/// Installs `env_logger`, `Info` by default and overridable through `RUST_LOG`.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
}

pub fn run() {
    init_logging();

    log::info!("SynapseFlow starting up...");

    let difficulty = std::env::args().nth(1);
    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(headless::run(difficulty)));

    if let Err(err) = result {
        log::error!("SynapseFlow failed: {err:#}");
        std::process::exit(1);
    }
}
