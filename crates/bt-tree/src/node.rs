//! Node kinds and the arena node record.
//!
//! Composite and decorator behavior is a closed set, dispatched by an
//! exhaustive `match` on [`NodeKind`] in the engine.  Only leaves reach user
//! code, through the trait objects held in [`Binding`].

use std::fmt;
use std::sync::Arc;

use bt_core::{BehaviorKey, NodeIndex};

use crate::{Action, Condition};

// ── Static node configuration ─────────────────────────────────────────────────

/// How many children must reach an outcome for a parallel node to adopt it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Policy {
    RequireOne,
    RequireAll,
}

impl Policy {
    #[inline]
    pub fn satisfied(self, count: usize, total: usize) -> bool {
        match self {
            Policy::RequireOne => count >= 1,
            Policy::RequireAll => count == total,
        }
    }
}

/// Success and failure thresholds of a parallel node.  Success is checked
/// first.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParallelPolicy {
    pub success: Policy,
    pub failure: Policy,
}

impl Default for ParallelPolicy {
    /// All children must succeed; any failure fails the node.
    fn default() -> Self {
        Self { success: Policy::RequireAll, failure: Policy::RequireOne }
    }
}

/// What a cooldown decorator returns while its timer blocks entry.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CooldownBlocked {
    #[default]
    Fail,
    /// The child's last completed outcome (Failure if it never completed).
    LastOutcome,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompositeKind {
    Sequence,
    Selector,
    Parallel(ParallelPolicy),
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecoratorKind {
    Inverter,
    /// Re-run the child until it has completed `limit` times (`0` = forever).
    Repeater { limit: u32, until_failure: bool },
    Cooldown { duration_ms: u64, when_blocked: CooldownBlocked },
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LeafKind {
    Action(BehaviorKey),
    Condition(BehaviorKey),
}

impl LeafKind {
    pub fn key(self) -> BehaviorKey {
        match self {
            LeafKind::Action(k) | LeafKind::Condition(k) => k,
        }
    }
}

/// Node type, subtype, and static configuration.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    Composite(CompositeKind),
    Decorator(DecoratorKind),
    Leaf(LeafKind),
}

impl NodeKind {
    pub const fn sequence() -> Self {
        NodeKind::Composite(CompositeKind::Sequence)
    }

    pub const fn selector() -> Self {
        NodeKind::Composite(CompositeKind::Selector)
    }

    pub const fn parallel(success: Policy, failure: Policy) -> Self {
        NodeKind::Composite(CompositeKind::Parallel(ParallelPolicy { success, failure }))
    }

    pub const fn inverter() -> Self {
        NodeKind::Decorator(DecoratorKind::Inverter)
    }

    pub const fn repeater(limit: u32) -> Self {
        NodeKind::Decorator(DecoratorKind::Repeater { limit, until_failure: false })
    }

    pub const fn repeat_until_failure(limit: u32) -> Self {
        NodeKind::Decorator(DecoratorKind::Repeater { limit, until_failure: true })
    }

    pub const fn cooldown(duration_ms: u64) -> Self {
        NodeKind::Decorator(DecoratorKind::Cooldown {
            duration_ms,
            when_blocked: CooldownBlocked::Fail,
        })
    }

    pub const fn action(name: &str) -> Self {
        NodeKind::Leaf(LeafKind::Action(BehaviorKey::from_name(name)))
    }

    pub const fn condition(name: &str) -> Self {
        NodeKind::Leaf(LeafKind::Condition(BehaviorKey::from_name(name)))
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, NodeKind::Composite(_))
    }

    pub fn is_decorator(&self) -> bool {
        matches!(self, NodeKind::Decorator(_))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeKind::Leaf(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Composite(CompositeKind::Sequence)    => "sequence",
            NodeKind::Composite(CompositeKind::Selector)    => "selector",
            NodeKind::Composite(CompositeKind::Parallel(_)) => "parallel",
            NodeKind::Decorator(DecoratorKind::Inverter)    => "inverter",
            NodeKind::Decorator(DecoratorKind::Repeater { .. }) => "repeater",
            NodeKind::Decorator(DecoratorKind::Cooldown { .. }) => "cooldown",
            NodeKind::Leaf(LeafKind::Action(_))    => "action",
            NodeKind::Leaf(LeafKind::Condition(_)) => "condition",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Binding ───────────────────────────────────────────────────────────────────

/// The executable behavior attached to a node.
#[derive(Clone)]
pub enum Binding {
    /// Composite or decorator; executed by the engine itself.
    Builtin,
    Action(Arc<dyn Action>),
    Condition(Arc<dyn Condition>),
    /// A leaf whose key had no matching registration.  Always fails.
    Unbound(BehaviorKey),
}

impl Binding {
    pub fn is_unbound(&self) -> bool {
        matches!(self, Binding::Unbound(_))
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Builtin      => f.write_str("Builtin"),
            Binding::Action(_)    => f.write_str("Action(..)"),
            Binding::Condition(_) => f.write_str("Condition(..)"),
            Binding::Unbound(k)   => write!(f, "Unbound({k})"),
        }
    }
}

// ── BehaviorNode ──────────────────────────────────────────────────────────────

/// One node of a template's arena.
///
/// Nodes are immutable once their template is finalized; per-agent progress
/// lives in the agent's `NodeInstance` at the same index.
#[derive(Clone, Debug)]
pub struct BehaviorNode {
    pub(crate) kind:        NodeKind,
    pub(crate) parent:      NodeIndex,
    pub(crate) children:    Vec<NodeIndex>,
    /// Position in the parent's child list.
    pub(crate) sibling_pos: u32,
    pub(crate) depth:       u32,
    pub(crate) binding:     Binding,
}

impl BehaviorNode {
    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// `NodeIndex::NONE` for the root.
    #[inline]
    pub fn parent(&self) -> NodeIndex {
        self.parent
    }

    /// Children in evaluation order.
    #[inline]
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    #[inline]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn first_child(&self) -> NodeIndex {
        self.children.first().copied().unwrap_or(NodeIndex::NONE)
    }

    #[inline]
    pub fn sibling_pos(&self) -> usize {
        self.sibling_pos as usize
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn binding(&self) -> &Binding {
        &self.binding
    }
}
