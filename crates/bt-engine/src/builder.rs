//! Fluent builder for constructing a [`Runtime`].

use std::sync::Arc;

use tracing::info;

use bt_blackboard::BlackboardPool;
use bt_core::{Clock, EngineConfig, PathRequester};
use bt_tree::TemplateLibrary;

use crate::{Engine, EngineResult, Runtime};

/// Fluent builder for [`Runtime<P, C>`].
///
/// # Required inputs
///
/// - `Arc<TemplateLibrary>` — from [`bt_tree::TemplateStore::finalize`]
/// - `P: PathRequester` — the pathfinding service
/// - `C: Clock` — usually an `Arc<ManualClock>` advanced by the simulation
///
/// # Optional inputs (have defaults)
///
/// | Method        | Default                    |
/// |---------------|----------------------------|
/// | `.config(c)`  | `EngineConfig::default()`  |
///
/// # Example
///
/// ```rust,ignore
/// let clock = Arc::new(ManualClock::default());
/// let mut runtime = RuntimeBuilder::new(library, NoopPathRequester, Arc::clone(&clock))
///     .config(EngineConfig { pool_capacity: 10_000, ..EngineConfig::default() })
///     .build()?;
/// let mut agents = vec![runtime.create_agent_blackboard(AgentId(0), citizen)?];
/// runtime.tick_population(&mut agents, 0.1, &mut NoopObserver);
/// ```
pub struct RuntimeBuilder<P: PathRequester, C: Clock> {
    library:    Arc<TemplateLibrary>,
    pathfinder: P,
    clock:      C,
    config:     EngineConfig,
}

impl<P: PathRequester, C: Clock> RuntimeBuilder<P, C> {
    pub fn new(library: Arc<TemplateLibrary>, pathfinder: P, clock: C) -> Self {
        Self { library, pathfinder, clock, config: EngineConfig::default() }
    }

    /// Use the same config the template store was built with so limits agree.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the config, size the blackboard pool, and return a ready
    /// [`Runtime`].
    pub fn build(self) -> EngineResult<Runtime<P, C>> {
        self.config.validate()?;

        #[cfg(feature = "parallel")]
        let workers = match self.config.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| crate::EngineError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };

        info!(
            templates = self.library.len(),
            pool_capacity = self.config.pool_capacity,
            node_visit_budget = self.config.node_visit_budget,
            "runtime ready"
        );

        Ok(Runtime {
            pool:    BlackboardPool::new(self.config.pool_capacity),
            tick:    0,
            #[cfg(not(feature = "parallel"))]
            rng:     bt_core::TickRng::new(self.config.seed),
            #[cfg(feature = "parallel")]
            workers,
            engine:  Engine::new(self.library, self.pathfinder, self.clock, self.config),
        })
    }
}
