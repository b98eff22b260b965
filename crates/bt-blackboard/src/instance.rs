//! Per-(agent, node) execution records.

use bt_core::{NodeIndex, NodeState, Timestamp};

/// Resumption state for one node of one agent.
///
/// Every field the engine needs to continue a `Running` node next tick lives
/// here; nothing is kept on the engine or the call stack.  Which working
/// fields matter depends on the node kind:
///
/// | Kind      | Working fields                    |
/// |-----------|-----------------------------------|
/// | Sequence  | `current_child`                   |
/// | Selector  | `current_child`                   |
/// | Repeater  | `iterations`                      |
/// | Cooldown  | `cooldown_end`, `last_outcome`    |
///
/// The record is `Copy` and fixed-size so a blackboard's node segment is a
/// flat `Vec<NodeInstance>`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeInstance {
    /// Last result, or `Invalid` if never run or reset.
    pub state:           NodeState,
    pub last_executed:   Timestamp,
    /// Number of ticks on which this node was executed.
    pub execution_count: u32,
    /// Child currently being run by a composite; `NodeIndex::NONE` between runs.
    pub current_child:   NodeIndex,
    /// Completed child runs of a repeater in the current cycle.
    pub iterations:      u32,
    /// A cooldown refuses fresh entry before this time.
    pub cooldown_end:    Timestamp,
    /// Last completed outcome of a cooldown's child.
    pub last_outcome:    NodeState,
}

impl NodeInstance {
    /// Freshly spawned record.
    pub const RESET: NodeInstance = NodeInstance {
        state:           NodeState::Invalid,
        last_executed:   Timestamp::ZERO,
        execution_count: 0,
        current_child:   NodeIndex::NONE,
        iterations:      0,
        cooldown_end:    Timestamp::ZERO,
        last_outcome:    NodeState::Invalid,
    };

    /// Abandon an in-flight run: clear the state and working cursors but keep
    /// history (execution count, timestamps, cooldown).
    #[inline]
    pub fn halt(&mut self) {
        self.state = NodeState::Invalid;
        self.current_child = NodeIndex::NONE;
        self.iterations = 0;
    }
}

impl Default for NodeInstance {
    fn default() -> Self {
        Self::RESET
    }
}
