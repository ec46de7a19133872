//! Derived metrics over recorded trial results.
//!
//! Everything here is a pure function of a `TrialResult` slice: nothing is
//! cached and results are never mutated.

pub mod capacity;
pub mod contrast;
pub mod sdt;
pub mod summary;
pub mod tasks;

pub use capacity::{CapacityEstimate, cowan_k, mean_capacity};
pub use contrast::{CongruencyStats, rt_contrast};
pub use sdt::{SdtCounts, SignalCategory, classify, inverse_normal_cdf};
pub use summary::{BlockSummary, RtSummary, TimeoutPolicy, accuracy_percent, mean_correct_rt};
pub use tasks::TaskSummary;
