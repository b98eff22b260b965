//! Leaf behavior traits and the registration table.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use bt_blackboard::AgentBlackboard;
use bt_core::{AgentId, BehaviorKey, NodeIndex, PathRequester, Status, Timestamp};

use crate::{Binding, LeafKind};

// ── Contexts ──────────────────────────────────────────────────────────────────

/// Everything an action may touch while it runs for one agent.
///
/// The blackboard is exclusively borrowed: an action can only ever see and
/// change the memory of the agent it is running for.
pub struct LeafContext<'a> {
    pub agent:      AgentId,
    pub node:       NodeIndex,
    pub now:        Timestamp,
    /// Seconds since the previous population tick.
    pub delta_time: f32,
    pub blackboard: &'a mut AgentBlackboard,
    pub pathfinder: &'a dyn PathRequester,
}

/// Read-only view handed to conditions.
pub struct ConditionContext<'a> {
    pub agent:      AgentId,
    pub node:       NodeIndex,
    pub now:        Timestamp,
    pub blackboard: &'a AgentBlackboard,
}

// ── Traits ────────────────────────────────────────────────────────────────────

/// A leaf that does something and may take several ticks to finish.
///
/// One instance is shared by every agent executing the template, so any
/// per-agent progress must be kept in the blackboard, never in `self`.
///
/// # Thread safety
///
/// Population ticks may run on Rayon workers, so implementations must be
/// `Send + Sync`.
///
/// # Example
///
/// ```rust,ignore
/// struct Eat;
///
/// impl Action for Eat {
///     fn execute(&self, ctx: &mut LeafContext<'_>) -> Status {
///         match ctx.blackboard.set(HUNGER, 0_i32, ctx.now) {
///             Ok(()) => Status::Success,
///             Err(_) => Status::Failure,
///         }
///     }
/// }
/// ```
pub trait Action: Send + Sync + 'static {
    /// Called before `execute` when the node is entered fresh (it was not
    /// `Running` at the end of the previous tick).
    fn on_enter(&self, _ctx: &mut LeafContext<'_>) {}

    fn execute(&self, ctx: &mut LeafContext<'_>) -> Status;

    /// Called when a parent abandons this node while it is `Running`.
    fn on_halt(&self, _ctx: &mut LeafContext<'_>) {}
}

/// A side-effect-free test.  Conditions cannot return `Running`.
pub trait Condition: Send + Sync + 'static {
    fn check(&self, ctx: &ConditionContext<'_>) -> bool;
}

// ── BehaviorTable ─────────────────────────────────────────────────────────────

/// Registered leaf behaviors, keyed by name hash.
#[derive(Default)]
pub struct BehaviorTable {
    actions:    FxHashMap<BehaviorKey, Arc<dyn Action>>,
    conditions: FxHashMap<BehaviorKey, Arc<dyn Condition>>,
}

impl BehaviorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` under `name`, replacing any earlier registration.
    pub fn register_action(&mut self, name: &str, action: impl Action) -> BehaviorKey {
        let key = BehaviorKey::from_name(name);
        if self.actions.insert(key, Arc::new(action)).is_some() {
            warn!(name, %key, "action registered twice; keeping the latest");
        } else {
            debug!(name, %key, "registered action");
        }
        key
    }

    /// Register `condition` under `name`, replacing any earlier registration.
    pub fn register_condition(&mut self, name: &str, condition: impl Condition) -> BehaviorKey {
        let key = BehaviorKey::from_name(name);
        if self.conditions.insert(key, Arc::new(condition)).is_some() {
            warn!(name, %key, "condition registered twice; keeping the latest");
        } else {
            debug!(name, %key, "registered condition");
        }
        key
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }

    /// Resolve a leaf to its behavior.  Missing keys bind to
    /// [`Binding::Unbound`].
    pub fn resolve(&self, leaf: LeafKind) -> Binding {
        let found = match leaf {
            LeafKind::Action(key) => self.actions.get(&key).cloned().map(Binding::Action),
            LeafKind::Condition(key) => self.conditions.get(&key).cloned().map(Binding::Condition),
        };
        found.unwrap_or(Binding::Unbound(leaf.key()))
    }
}

impl std::fmt::Debug for BehaviorTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorTable")
            .field("actions", &self.actions.len())
            .field("conditions", &self.conditions.len())
            .finish()
    }
}
