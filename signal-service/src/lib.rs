// Signal Service
// Configuration, trigger operations and the HTTP surface of the signal bot

pub mod api;
pub mod config;
pub mod desk;

pub use api::{build_router, AppState};
pub use config::{load_config, BotConfig};
pub use desk::{CycleReport, SignalDesk};
