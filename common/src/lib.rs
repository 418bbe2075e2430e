// Shared signal model
// Types, schedule math and collaborator traits used by the generator and the evaluator

pub mod clock;
pub mod error;
pub mod schedule;
pub mod signal;
pub mod slot;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod traits;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{SignalError, SignalResult};
pub use schedule::{format_time_of_day, gale_threshold, Expirations, GaleSchedule, MAX_WINDOW_MINUTES};
pub use signal::{Direction, GaleLevel, Outcome, Resolution, Signal, SignalRecord};
pub use slot::PendingSlot;
pub use traits::{MarketDataSource, NotificationSink, SignalStore};
