// Signal Generation
// Draws a random instrument and direction, derives the gale levels and publishes the signal

pub mod generator;
pub mod messages;
pub mod random;
pub mod storage;

pub use generator::SignalGenerator;
pub use messages::{format_signal_message, MessageStyle};
pub use random::{FastRandSource, RandomSource, ScriptedRandom};
pub use storage::{FileStore, InMemoryStore};
