pub mod scheduler;
pub mod timer;

pub use scheduler::{Scheduled, Scheduler, TimerId};
pub use timer::{DriftLog, DriftStats, HighPrecisionTimer, ManualTimer, Timer};
