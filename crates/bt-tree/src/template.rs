//! The finalized, immutable behavior-tree template.

use std::sync::Arc;

use bt_blackboard::BlackboardLayout;
use bt_core::{NodeIndex, TemplateId};

use crate::BehaviorNode;

/// One tree definition shared by every agent that executes it.
///
/// Nodes sit in an arena in insertion order, which is also topological order
/// (a parent always precedes its children).  Index 0 is not necessarily the
/// root; use [`root`](Self::root).
#[derive(Debug)]
pub struct BehaviorTreeTemplate {
    pub(crate) id:          TemplateId,
    pub(crate) name:        String,
    pub(crate) root:        NodeIndex,
    pub(crate) nodes:       Vec<BehaviorNode>,
    pub(crate) priority:    u8,
    pub(crate) cooldown_ms: u64,
    pub(crate) layout:      Arc<BlackboardLayout>,
}

impl BehaviorTreeTemplate {
    #[inline]
    pub fn id(&self) -> TemplateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Higher priorities are ticked first on sequential population ticks.
    #[inline]
    pub fn priority(&self) -> u8 {
        self.priority
    }

    /// Minimum interval between two evaluations of this tree for one agent.
    #[inline]
    pub fn cooldown_ms(&self) -> u64 {
        self.cooldown_ms
    }

    /// Variable layout shared by every blackboard of this template.
    #[inline]
    pub fn layout(&self) -> &Arc<BlackboardLayout> {
        &self.layout
    }

    /// Bytes of per-agent memory: header, variables, and node records.
    pub fn instance_size(&self) -> usize {
        self.layout.instance_size()
    }

    // ── Navigation ────────────────────────────────────────────────────────

    /// # Panics
    /// Panics if `idx` is out of range.
    #[inline]
    pub fn node(&self, idx: NodeIndex) -> &BehaviorNode {
        &self.nodes[idx.index()]
    }

    #[inline]
    pub fn get(&self, idx: NodeIndex) -> Option<&BehaviorNode> {
        self.nodes.get(idx.index())
    }

    pub fn nodes(&self) -> &[BehaviorNode] {
        &self.nodes
    }

    #[inline]
    pub fn children(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.node(idx).children()
    }

    #[inline]
    pub fn parent(&self, idx: NodeIndex) -> NodeIndex {
        self.node(idx).parent()
    }

    #[inline]
    pub fn first_child(&self, idx: NodeIndex) -> NodeIndex {
        self.node(idx).first_child()
    }

    /// The next node in the parent's child list, or `NodeIndex::NONE`.
    pub fn next_sibling(&self, idx: NodeIndex) -> NodeIndex {
        let node = self.node(idx);
        if !node.parent.is_valid() {
            return NodeIndex::NONE;
        }
        self.node(node.parent)
            .children
            .get(node.sibling_pos() + 1)
            .copied()
            .unwrap_or(NodeIndex::NONE)
    }

    #[inline]
    pub fn depth(&self, idx: NodeIndex) -> u32 {
        self.node(idx).depth()
    }
}
