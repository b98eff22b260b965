//! Time model.
//!
//! # Design
//!
//! Time is a monotonically increasing millisecond counter, [`Timestamp`].
//! Where the counter comes from is the caller's business: the runtime only
//! reads it through the [`Clock`] trait, once per agent tick.
//!
//! - [`ManualClock`] is advanced explicitly by the simulation loop (or a
//!   test).  This is the usual choice: simulated time, deterministic runs.
//! - [`SystemClock`] reads the monotonic OS clock relative to its creation.
//!
//! Integer milliseconds keep cooldown arithmetic exact; a u64 of
//! milliseconds lasts ~584 million years.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

// ── Timestamp ─────────────────────────────────────────────────────────────────

/// Milliseconds since an arbitrary, clock-defined epoch.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    /// The timestamp `ms` milliseconds after `self` (saturating).
    #[inline]
    pub fn after_ms(self, ms: u64) -> Timestamp {
        Timestamp(self.0.saturating_add(ms))
    }

    /// Milliseconds elapsed from `earlier` to `self`; zero if `earlier` is
    /// in the future.
    #[inline]
    pub fn since(self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Timestamp {
    type Output = Timestamp;
    #[inline]
    fn add(self, rhs: u64) -> Timestamp {
        self.after_ms(rhs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

// ── Clock ─────────────────────────────────────────────────────────────────────

/// Source of the current time.
///
/// Shared by every worker thread during a population tick, so implementations
/// must be `Send + Sync`.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    #[inline]
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// A clock that only moves when told to.
///
/// Interior mutability (an atomic) lets the simulation advance time while the
/// runtime holds a shared reference.
#[derive(Debug, Default)]
pub struct ManualClock {
    ms: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self { ms: AtomicU64::new(start.0) }
    }

    /// Jump to an absolute time.
    pub fn set(&self, t: Timestamp) {
        self.ms.store(t.0, Ordering::Release);
    }

    /// Move forward by `ms` milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.ms.fetch_add(ms, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Timestamp {
        Timestamp(self.ms.load(Ordering::Acquire))
    }
}

/// Wall-clock time in milliseconds since the clock was created.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.origin.elapsed().as_millis() as u64)
    }
}
