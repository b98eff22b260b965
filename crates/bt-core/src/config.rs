//! Runtime configuration.

use crate::{BtError, BtResult};

/// Top-level runtime limits and tick-loop options.
///
/// Typically built by the application (or deserialized from its own config
/// file with the `serde` feature) and handed to both the template store and
/// the runtime builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Maximum number of templates in one library.  Hard cap: `u16::MAX - 1`
    /// (the last value is the `TemplateId::INVALID` sentinel).
    pub max_templates: usize,

    /// Maximum nodes per template.
    pub max_nodes_per_template: usize,

    /// Maximum declared variables per template.
    pub max_variables_per_template: usize,

    /// Maximum number of concurrently live agent blackboards.
    pub pool_capacity: usize,

    /// Nodes one agent tick may visit before yielding with `Running`.
    /// Bounds worst-case latency for pathological trees.
    pub node_visit_budget: u32,

    /// Shuffle agent order within each priority band on sequential population
    /// ticks.  Exercises the "any order" guarantee; off by default.
    pub shuffle_tick_order: bool,

    /// Seed for tick-order shuffling.  The same seed gives the same order.
    pub seed: u64,

    /// Worker thread count for the `parallel` feature.  `None` uses Rayon's
    /// global pool.
    pub num_threads: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_templates:              256,
            max_nodes_per_template:     1_024,
            max_variables_per_template: 64,
            pool_capacity:              1_000_000,
            node_visit_budget:          4_096,
            shuffle_tick_order:         false,
            seed:                       0,
            num_threads:                None,
        }
    }
}

impl EngineConfig {
    /// Reject limits the runtime cannot honour.
    pub fn validate(&self) -> BtResult<()> {
        if self.max_templates == 0 || self.max_templates >= u16::MAX as usize {
            return Err(BtError::Config(format!(
                "max_templates must be in 1..{}, got {}",
                u16::MAX,
                self.max_templates
            )));
        }
        if self.max_nodes_per_template == 0 || self.max_nodes_per_template >= u32::MAX as usize {
            return Err(BtError::Config(format!(
                "max_nodes_per_template must be positive and below u32::MAX, got {}",
                self.max_nodes_per_template
            )));
        }
        if self.max_variables_per_template > u16::MAX as usize {
            return Err(BtError::Config(format!(
                "max_variables_per_template must be at most {}, got {}",
                u16::MAX,
                self.max_variables_per_template
            )));
        }
        if self.pool_capacity == 0 {
            return Err(BtError::Config("pool_capacity must be positive".into()));
        }
        if self.node_visit_budget == 0 {
            return Err(BtError::Config("node_visit_budget must be positive".into()));
        }
        if self.num_threads == Some(0) {
            return Err(BtError::Config("num_threads must be positive when set".into()));
        }
        Ok(())
    }
}
