//! The `Runtime` facade: spawn/despawn, variable access, and population ticks.

use std::sync::Arc;

use tracing::debug;

use bt_blackboard::{AgentBlackboard, BlackboardPool, PoolStats, VarValue};
use bt_core::{AgentId, Clock, PathRequester, Status, TemplateId, Timestamp, VarKey};
use bt_tree::TemplateLibrary;

#[cfg(not(feature = "parallel"))]
use bt_core::TickRng;

use crate::{Engine, EngineError, EngineResult, TickObserver, TickReport};

/// Owns the engine and the blackboard pool for one template library.
///
/// Create via [`RuntimeBuilder`][crate::RuntimeBuilder].
///
/// Blackboards are handed out to the caller, who stores them however suits
/// the simulation (typically a `Vec` in agent order) and passes them back to
/// [`tick_population`](Self::tick_population) or
/// [`execute_agent`](Self::execute_agent).
pub struct Runtime<P: PathRequester, C: Clock> {
    pub(crate) engine: Engine<P, C>,
    pub(crate) pool:   BlackboardPool,
    pub(crate) tick:   u64,

    /// Tick-order shuffler for sequential population ticks.
    #[cfg(not(feature = "parallel"))]
    pub(crate) rng: TickRng,

    /// Dedicated worker pool when `num_threads` is set.
    #[cfg(feature = "parallel")]
    pub(crate) workers: Option<rayon::ThreadPool>,
}

impl<P: PathRequester, C: Clock> Runtime<P, C> {
    pub fn engine(&self) -> &Engine<P, C> {
        &self.engine
    }

    pub fn library(&self) -> &Arc<TemplateLibrary> {
        self.engine.library()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Population ticks completed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    #[inline]
    pub fn now(&self) -> Timestamp {
        self.engine.now()
    }

    // ── Spawn / despawn ───────────────────────────────────────────────────

    /// Allocate a blackboard for a new agent running `template_id`.
    ///
    /// # Errors
    ///
    /// `UnknownTemplate`, or `Blackboard(PoolExhausted)` when the pool is at
    /// capacity.  The latter is backpressure: despawn someone and retry.
    pub fn create_agent_blackboard(
        &self,
        agent_id:    AgentId,
        template_id: TemplateId,
    ) -> EngineResult<AgentBlackboard> {
        let layout = self
            .engine
            .library()
            .layout(template_id)
            .ok_or(EngineError::UnknownTemplate(template_id))?;
        let blackboard = self.pool.allocate(agent_id, layout)?;
        debug!(agent = %agent_id, template = %template_id, live = self.pool.live(), "spawned agent");
        Ok(blackboard)
    }

    /// Return a despawned agent's blackboard to the pool.
    pub fn destroy_agent_blackboard(&self, blackboard: AgentBlackboard) {
        let agent = blackboard.agent_id();
        self.pool.release(blackboard);
        debug!(%agent, live = self.pool.live(), "despawned agent");
    }

    // ── Variables ─────────────────────────────────────────────────────────

    /// Write a variable by name (or key), stamped with the current time.
    pub fn set_variable(
        &self,
        blackboard: &mut AgentBlackboard,
        key:        impl Into<VarKey>,
        value:      impl Into<VarValue>,
    ) -> EngineResult<()> {
        blackboard.set_variable(key.into(), &value.into(), self.now())?;
        Ok(())
    }

    /// Read a variable by name (or key).  `None` if undeclared.
    pub fn get_variable(&self, blackboard: &AgentBlackboard, key: impl Into<VarKey>) -> Option<VarValue> {
        blackboard.get_variable(key.into())
    }

    // ── Execution ─────────────────────────────────────────────────────────

    pub fn execute_agent(
        &self,
        agent_id:   AgentId,
        blackboard: &mut AgentBlackboard,
        delta_time: f32,
    ) -> Status {
        self.engine.execute_agent(agent_id, blackboard, delta_time)
    }

    /// Abandon the agent's running behavior.
    pub fn halt_agent(&self, blackboard: &mut AgentBlackboard) {
        self.engine.halt_agent(blackboard);
    }

    /// Halt, then restore the agent's blackboard to its spawn state
    /// (persistent variables excepted).
    pub fn reset_agent(&self, blackboard: &mut AgentBlackboard) {
        self.engine.halt_agent(blackboard);
        blackboard.reset(self.now());
    }

    /// Tick every agent in `agents` once.
    ///
    /// Without the `parallel` feature agents run in descending template
    /// priority, shuffled within a priority when `shuffle_tick_order` is set.
    /// With it, agents run concurrently on Rayon workers in no particular
    /// order.  Either way each agent sees only its own blackboard.
    pub fn tick_population<O: TickObserver>(
        &mut self,
        agents:     &mut [AgentBlackboard],
        delta_time: f32,
        observer:   &mut O,
    ) -> TickReport {
        let tick = self.tick;
        observer.on_tick_start(tick, agents.len());
        let report = self.run_population(agents, delta_time);
        if report.budget_exhausted > 0 {
            debug!(tick, agents = report.budget_exhausted, "agents yielded on visit budget");
        }
        observer.on_tick_end(tick, &report);
        self.tick += 1;
        report
    }

    #[cfg(not(feature = "parallel"))]
    fn run_population(&mut self, agents: &mut [AgentBlackboard], delta_time: f32) -> TickReport {
        let mut order: Vec<usize> = (0..agents.len()).collect();
        if self.engine.config().shuffle_tick_order {
            self.rng.shuffle(&mut order);
        }
        // Stable, so shuffled agents stay shuffled within a priority band.
        let library = self.engine.library();
        order.sort_by_key(|&i| {
            std::cmp::Reverse(library.get(agents[i].template_id()).map_or(0, |t| t.priority()))
        });

        let mut report = TickReport::default();
        for i in order {
            report.record(&self.engine.tick_agent(&mut agents[i], delta_time));
        }
        report
    }

    #[cfg(feature = "parallel")]
    fn run_population(&mut self, agents: &mut [AgentBlackboard], delta_time: f32) -> TickReport {
        let engine = &self.engine;
        match &self.workers {
            Some(pool) => pool.install(|| tick_parallel(engine, agents, delta_time)),
            None => tick_parallel(engine, agents, delta_time),
        }
    }
}

#[cfg(feature = "parallel")]
fn tick_parallel<P: PathRequester, C: Clock>(
    engine:     &Engine<P, C>,
    agents:     &mut [AgentBlackboard],
    delta_time: f32,
) -> TickReport {
    use rayon::prelude::*;

    agents
        .par_iter_mut()
        .map(|bb| engine.tick_agent(bb, delta_time))
        .fold(TickReport::default, |mut report, tick| {
            report.record(&tick);
            report
        })
        .reduce(TickReport::default, TickReport::merge)
}
