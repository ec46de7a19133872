use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic clock the engine and its drivers share.
pub trait Timer: Clone + Send + Sync {
    type Timestamp: Copy + Clone + Send + Sync;
    fn now(&self) -> Self::Timestamp;
    fn elapsed(&self, ts: Self::Timestamp) -> Duration;
    fn sleep(&self, d: Duration);

    /// Sleeps until `deadline`, returning immediately if it already passed.
    fn sleep_until(&self, deadline: Self::Timestamp);
}

/// Wall-clock timer with nanosecond timestamps from its own creation.
#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    pub start: Instant,
}

impl Timer for HighPrecisionTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
    fn sleep(&self, d: Duration) {
        self.high_precision_sleep(d)
    }
    fn sleep_until(&self, deadline: u64) {
        let now = self.now();
        if deadline > now {
            self.high_precision_sleep(Duration::from_nanos(deadline - now));
        }
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{clock_nanosleep, timespec, CLOCK_MONOTONIC};

        let req = timespec {
            tv_sec: duration.as_secs() as libc::time_t,
            tv_nsec: duration.subsec_nanos() as libc::c_long,
        };

        unsafe {
            clock_nanosleep(CLOCK_MONOTONIC, 0, &req, std::ptr::null_mut());
        }
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Virtual clock. Time only moves when told to, and `sleep` advances it
/// instead of blocking, so a driver loop runs a whole session instantly.
///
/// Clones share the same clock.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    now_ns: Arc<AtomicU64>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(now_ns: u64) -> Self {
        Self {
            now_ns: Arc::new(AtomicU64::new(now_ns)),
        }
    }

    /// Moves the clock to `now_ns`. Never moves it backwards.
    pub fn set(&self, now_ns: u64) {
        self.now_ns.fetch_max(now_ns, Ordering::SeqCst);
    }

    pub fn set_ms(&self, now_ms: u64) {
        self.set(now_ms * 1_000_000);
    }

    pub fn advance(&self, d: Duration) {
        self.now_ns
            .fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Timer for ManualTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
    fn sleep_until(&self, deadline: u64) {
        self.set(deadline);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriftStats {
    pub samples: usize,
    pub mean_lateness_ns: f64,
    pub jitter_ns: f64,
    pub min_lateness_ns: f64,
    pub max_lateness_ns: f64,
}

/// Rolling record of how late scheduled callbacks fired.
#[derive(Debug, Clone)]
pub struct DriftLog {
    lateness: VecDeque<Duration>,
    max_samples: usize,
}

impl DriftLog {
    pub fn new(max_samples: usize) -> Self {
        Self {
            lateness: VecDeque::with_capacity(max_samples.min(1000)),
            max_samples: max_samples.max(1),
        }
    }

    pub fn record(&mut self, d: Duration) {
        if self.lateness.len() >= self.max_samples {
            self.lateness.pop_front();
        }
        self.lateness.push_back(d);
    }

    pub fn stats(&self) -> DriftStats {
        let times: Vec<f64> = self.lateness.iter().map(|d| d.as_nanos() as f64).collect();
        if times.is_empty() {
            return DriftStats {
                samples: 0,
                mean_lateness_ns: 0.0,
                jitter_ns: 0.0,
                min_lateness_ns: 0.0,
                max_lateness_ns: 0.0,
            };
        }
        let avg = times.iter().sum::<f64>() / times.len() as f64;
        let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / times.len() as f64;
        let min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        DriftStats {
            samples: times.len(),
            mean_lateness_ns: avg,
            jitter_ns: var.sqrt(),
            min_lateness_ns: min,
            max_lateness_ns: max,
        }
    }
}

impl Default for DriftLog {
    fn default() -> Self {
        Self::new(1000)
    }
}
