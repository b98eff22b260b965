//! The per-agent blackboard: header, variable segment, node-instance segment.

use std::sync::Arc;

use tracing::debug;

use bt_core::{AgentId, NodeIndex, TemplateId, Timestamp, VarKey};

use crate::pool::PoolLease;
use crate::value::string_content;
use crate::{
    BlackboardError, BlackboardLayout, BlackboardResult, NodeInstance, VarData, VarFlags,
    VarSlot, VarType, VarValue,
};

/// Fixed-size blackboard header.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlackboardHeader {
    pub agent_id:    AgentId,
    pub template_id: TemplateId,
    /// Time of the last variable write or tree evaluation.
    pub last_update: Timestamp,
    /// Number of completed tree evaluations.
    pub ticks:       u64,
}

/// One agent's memory: typed variables plus one [`NodeInstance`] per node of
/// the bound template.
///
/// A blackboard is owned by whoever ticks it, so exclusive `&mut` access is
/// what keeps agents isolated from one another. There is no shared mutable
/// state to lock.
///
/// Obtain pooled blackboards from [`BlackboardPool::allocate`][crate::BlackboardPool::allocate];
/// [`AgentBlackboard::new`] builds an unpooled one.
#[derive(Debug)]
pub struct AgentBlackboard {
    header: BlackboardHeader,
    layout: Arc<BlackboardLayout>,
    pub(crate) vars:  Vec<u8>,
    pub(crate) nodes: Vec<NodeInstance>,
    pub(crate) lease: Option<PoolLease>,
}

impl AgentBlackboard {
    /// Build a blackboard outside any pool, initialized to defaults.
    pub fn new(agent_id: AgentId, layout: Arc<BlackboardLayout>) -> Self {
        Self::from_parts(agent_id, layout, Vec::new(), Vec::new(), None)
    }

    /// Initialize recycled (or empty) buffers for `layout`.
    pub(crate) fn from_parts(
        agent_id: AgentId,
        layout:   Arc<BlackboardLayout>,
        mut vars:  Vec<u8>,
        mut nodes: Vec<NodeInstance>,
        lease:    Option<PoolLease>,
    ) -> Self {
        vars.clear();
        vars.extend_from_slice(layout.defaults());
        nodes.clear();
        nodes.resize(layout.node_count() as usize, NodeInstance::RESET);
        Self {
            header: BlackboardHeader {
                agent_id,
                template_id: layout.template(),
                last_update: Timestamp::ZERO,
                ticks:       0,
            },
            layout,
            vars,
            nodes,
            lease,
        }
    }

    // ── Header ────────────────────────────────────────────────────────────

    #[inline]
    pub fn agent_id(&self) -> AgentId {
        self.header.agent_id
    }

    #[inline]
    pub fn template_id(&self) -> TemplateId {
        self.header.template_id
    }

    #[inline]
    pub fn last_update(&self) -> Timestamp {
        self.header.last_update
    }

    #[inline]
    pub fn header(&self) -> &BlackboardHeader {
        &self.header
    }

    #[inline]
    pub fn layout(&self) -> &Arc<BlackboardLayout> {
        &self.layout
    }

    /// Bookkeeping after one tree evaluation.
    #[inline]
    pub fn record_tick(&mut self, now: Timestamp) {
        self.header.ticks += 1;
        self.header.last_update = now;
    }

    // ── Node instances ────────────────────────────────────────────────────

    /// # Panics
    /// Panics if `node` is out of range for the bound template.
    #[inline]
    pub fn instance(&self, node: NodeIndex) -> &NodeInstance {
        &self.nodes[node.index()]
    }

    /// # Panics
    /// Panics if `node` is out of range for the bound template.
    #[inline]
    pub fn instance_mut(&mut self, node: NodeIndex) -> &mut NodeInstance {
        &mut self.nodes[node.index()]
    }

    pub fn instances(&self) -> &[NodeInstance] {
        &self.nodes
    }

    // ── Typed variable access ─────────────────────────────────────────────

    /// Read a fixed-size variable.  `None` if undeclared or of another type.
    #[inline]
    pub fn get<T: VarData>(&self, key: VarKey) -> Option<T> {
        let slot = self.layout.slot(key)?;
        if slot.ty != T::TYPE {
            return None;
        }
        Some(T::decode(&self.vars[slot.range()]))
    }

    /// Write a fixed-size variable, clamping numeric values to the declared
    /// range.
    pub fn set<T: VarData>(&mut self, key: VarKey, value: T, now: Timestamp) -> BlackboardResult<()> {
        let mut buf = [0u8; 16];
        value.encode(&mut buf[..T::SIZE]);
        self.set_raw(key, T::TYPE, &buf[..T::SIZE], now)
    }

    /// Read any variable as a [`VarValue`].
    pub fn get_variable(&self, key: VarKey) -> Option<VarValue> {
        let slot = self.layout.slot(key)?;
        VarValue::decode(slot.ty, &self.vars[slot.range()])
    }

    /// Write any variable from a [`VarValue`].
    ///
    /// # Errors
    ///
    /// `UnknownVariable`, `TypeMismatch`, `InvalidString` (interior NUL),
    /// `ValueTooLarge` (strings), or `ReadOnly`.  The blackboard is unchanged
    /// on error.
    pub fn set_variable(&mut self, key: VarKey, value: &VarValue, now: Timestamp) -> BlackboardResult<()> {
        let slot = *self.declared_slot(key)?;
        let ty = value.var_type();
        if slot.ty != ty {
            debug!(agent = %self.header.agent_id, %key, expected = %slot.ty, got = %ty, "variable type mismatch");
            return Err(BlackboardError::TypeMismatch { key, expected: slot.ty, got: ty });
        }
        if let VarValue::Str(text) = value {
            if text.contains('\0') {
                debug!(agent = %self.header.agent_id, %key, "string value contains a NUL byte");
                return Err(BlackboardError::InvalidString(key));
            }
        }
        if value.encoded_len() > slot.size as usize {
            return Err(BlackboardError::ValueTooLarge {
                key,
                capacity: slot.size as usize,
                len:      value.encoded_len(),
            });
        }
        self.check_writable(key, slot.index)?;

        let bytes = &mut self.vars[slot.range()];
        value.encode_into(bytes);
        self.clamp_slot(key);
        self.header.last_update = now;
        Ok(())
    }

    // ── Raw byte access ───────────────────────────────────────────────────

    /// Copy `bytes` into the variable's slot.
    ///
    /// `ty` must match the declared type.  Fixed-size types require exactly
    /// the slot size; strings accept up to the capacity and are zero-padded.
    /// String bytes must be UTF-8 with nothing but NUL padding after the
    /// first NUL, or the write fails with `InvalidString`.
    pub fn set_raw(&mut self, key: VarKey, ty: VarType, bytes: &[u8], now: Timestamp) -> BlackboardResult<()> {
        let slot = *self.declared_slot(key)?;
        if slot.ty != ty {
            debug!(agent = %self.header.agent_id, %key, expected = %slot.ty, got = %ty, "variable type mismatch");
            return Err(BlackboardError::TypeMismatch { key, expected: slot.ty, got: ty });
        }
        let fits = match ty {
            VarType::String => bytes.len() <= slot.size as usize,
            _ => bytes.len() == slot.size as usize,
        };
        if !fits {
            return Err(BlackboardError::ValueTooLarge {
                key,
                capacity: slot.size as usize,
                len:      bytes.len(),
            });
        }
        if ty == VarType::String && string_content(bytes).is_none() {
            debug!(agent = %self.header.agent_id, %key, "raw string is not NUL-free UTF-8");
            return Err(BlackboardError::InvalidString(key));
        }
        self.check_writable(key, slot.index)?;

        let dst = &mut self.vars[slot.range()];
        dst[..bytes.len()].copy_from_slice(bytes);
        dst[bytes.len()..].fill(0);
        self.clamp_slot(key);
        self.header.last_update = now;
        Ok(())
    }

    /// Copy a variable's bytes into `out` and return its type.
    ///
    /// Returns `VarType::Invalid` without touching `out` when the key is not
    /// declared or `out` is shorter than the slot.
    pub fn get_raw(&self, key: VarKey, out: &mut [u8]) -> VarType {
        let Some(slot) = self.layout.slot(key) else {
            return VarType::Invalid;
        };
        let src = &self.vars[slot.range()];
        if out.len() < src.len() {
            return VarType::Invalid;
        }
        out[..src.len()].copy_from_slice(src);
        slot.ty
    }

    /// Borrow a variable's bytes directly.
    pub fn variable_bytes(&self, key: VarKey) -> Option<&[u8]> {
        self.layout.slot(key).map(|s| &self.vars[s.range()])
    }

    // ── Reset ─────────────────────────────────────────────────────────────

    /// Restore defaults (except `PERSISTENT` variables) and clear every node
    /// instance, as if the agent had just spawned.
    pub fn reset(&mut self, now: Timestamp) {
        let layout = Arc::clone(&self.layout);
        for def in layout.variables() {
            if def.flags.contains(VarFlags::PERSISTENT) {
                continue;
            }
            if let Some(slot) = layout.slot(def.key) {
                let r = slot.range();
                self.vars[r.clone()].copy_from_slice(&layout.defaults()[r]);
            }
        }
        self.nodes.fill(NodeInstance::RESET);
        self.header.last_update = now;
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn declared_slot(&self, key: VarKey) -> BlackboardResult<&VarSlot> {
        self.layout.slot(key).ok_or_else(|| {
            debug!(agent = %self.header.agent_id, %key, "variable not declared for this template");
            BlackboardError::UnknownVariable(key)
        })
    }

    fn check_writable(&self, key: VarKey, index: u16) -> BlackboardResult<()> {
        if self.layout.variables()[index as usize].flags.contains(VarFlags::READ_ONLY) {
            return Err(BlackboardError::ReadOnly(key));
        }
        Ok(())
    }

    /// Apply the declared range, if any, to a freshly written numeric slot.
    fn clamp_slot(&mut self, key: VarKey) {
        let Some(def) = self.layout.definition(key) else { return };
        let Some(range) = def.range else { return };
        let Some(slot) = self.layout.slot(key) else { return };
        let bytes = &mut self.vars[slot.range()];
        match slot.ty {
            VarType::Int => range.clamp_i32(i32::decode(bytes)).encode(bytes),
            VarType::Float => range.clamp_f32(f32::decode(bytes)).encode(bytes),
            _ => {}
        }
    }
}
