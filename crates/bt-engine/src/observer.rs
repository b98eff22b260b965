//! Population tick observer and per-tick report.

use bt_core::Status;

use crate::AgentTick;

/// Totals for one population tick.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct TickReport {
    pub agents:           usize,
    pub success:          usize,
    pub failure:          usize,
    pub running:          usize,
    /// Agents whose evaluation the template cooldown suppressed.
    pub throttled:        usize,
    /// Agents that ran out of node-visit budget.
    pub budget_exhausted: usize,
    pub nodes_visited:    u64,
}

impl TickReport {
    pub fn record(&mut self, tick: &AgentTick) {
        self.agents += 1;
        match tick.status {
            Status::Success => self.success += 1,
            Status::Failure => self.failure += 1,
            Status::Running => self.running += 1,
        }
        self.throttled += tick.throttled as usize;
        self.budget_exhausted += tick.budget_exhausted as usize;
        self.nodes_visited += tick.visits as u64;
    }

    /// Combine two partial reports (e.g. from different workers).
    pub fn merge(self, other: TickReport) -> TickReport {
        TickReport {
            agents:           self.agents + other.agents,
            success:          self.success + other.success,
            failure:          self.failure + other.failure,
            running:          self.running + other.running,
            throttled:        self.throttled + other.throttled,
            budget_exhausted: self.budget_exhausted + other.budget_exhausted,
            nodes_visited:    self.nodes_visited + other.nodes_visited,
        }
    }
}

/// Callbacks invoked by [`Runtime::tick_population`][crate::Runtime::tick_population].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: stall detector
///
/// ```rust,ignore
/// struct StallDetector;
///
/// impl TickObserver for StallDetector {
///     fn on_tick_end(&mut self, tick: u64, report: &TickReport) {
///         if report.budget_exhausted > 0 {
///             eprintln!("tick {tick}: {} agents hit the visit budget", report.budget_exhausted);
///         }
///     }
/// }
/// ```
pub trait TickObserver {
    /// Called before any agent of tick `tick` is evaluated.
    fn on_tick_start(&mut self, _tick: u64, _agents: usize) {}

    /// Called after every agent of tick `tick` has been evaluated.
    fn on_tick_end(&mut self, _tick: u64, _report: &TickReport) {}
}

/// A [`TickObserver`] that does nothing.
pub struct NoopObserver;

impl TickObserver for NoopObserver {}
