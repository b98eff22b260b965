//! Variable registry (setup phase) and the frozen per-template layout.
//!
//! # Offset table
//!
//! Variables are named at authoring time but accessed every tick by every
//! agent, so name resolution must not scan.  At finalize time the registry
//! assigns each variable a fixed byte offset and stores `VarKey → VarSlot` in
//! an `FxHashMap`: one multiply-xor hash and one probe per access.  The same
//! `Arc<BlackboardLayout>` is shared by every blackboard of the template.

use std::mem::size_of;

use rustc_hash::FxHashMap;
use tracing::debug;

use bt_core::{TemplateId, VarKey};

use crate::{
    BlackboardError, BlackboardHeader, BlackboardResult, NodeInstance, VarType,
    VariableDefinition,
};

/// Slots start on 4-byte boundaries so numeric fields never straddle words.
const SLOT_ALIGN: u32 = 4;

// ── VariableRegistry ──────────────────────────────────────────────────────────

/// Mutable collection of variable declarations for one template.
///
/// Declaration order is preserved and determines slot order.
#[derive(Debug, Clone)]
pub struct VariableRegistry {
    limit: usize,
    defs:  Vec<VariableDefinition>,
    index: FxHashMap<VarKey, usize>,
}

impl VariableRegistry {
    /// An empty registry accepting up to `limit` variables.
    pub fn new(limit: usize) -> Self {
        Self { limit, defs: Vec::new(), index: FxHashMap::default() }
    }

    /// Declare a variable.
    ///
    /// # Errors
    ///
    /// - `VariableCapacity` when `limit` declarations already exist.
    /// - `DuplicateVariable` when the name hash is taken (same name, or an
    ///   FNV collision between two names).
    /// - `InvalidDefinition` for inconsistent type/size/default/range.
    pub fn define(&mut self, def: VariableDefinition) -> BlackboardResult<VarKey> {
        if self.defs.len() >= self.limit {
            return Err(BlackboardError::VariableCapacity { limit: self.limit });
        }
        if let Some(&i) = self.index.get(&def.key) {
            return Err(BlackboardError::DuplicateVariable {
                name:     def.name,
                existing: self.defs[i].name.clone(),
            });
        }
        def.check().map_err(BlackboardError::InvalidDefinition)?;

        let key = def.key;
        self.index.insert(key, self.defs.len());
        self.defs.push(def);
        Ok(key)
    }

    pub fn get(&self, key: VarKey) -> Option<&VariableDefinition> {
        self.index.get(&key).map(|&i| &self.defs[i])
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Assign offsets, pre-encode defaults, and freeze into a layout for a
    /// template with `node_count` nodes.
    pub fn build_layout(&self, template: TemplateId, node_count: u32) -> BlackboardLayout {
        let mut slots = FxHashMap::with_capacity_and_hasher(self.defs.len(), Default::default());
        let mut offset: u32 = 0;
        for (i, def) in self.defs.iter().enumerate() {
            slots.insert(def.key, VarSlot {
                offset,
                size:  def.size,
                ty:    def.ty,
                index: i as u16,
            });
            offset = (offset + def.size).next_multiple_of(SLOT_ALIGN);
        }

        let mut defaults = vec![0u8; offset as usize].into_boxed_slice();
        for def in &self.defs {
            let slot = slots[&def.key];
            def.default.encode_into(&mut defaults[slot.range()]);
        }

        debug!(
            %template,
            variables = self.defs.len(),
            var_bytes = offset,
            node_count,
            "built blackboard layout"
        );

        BlackboardLayout {
            template,
            slots,
            defs: self.defs.clone(),
            defaults,
            node_count,
        }
    }
}

// ── VarSlot ───────────────────────────────────────────────────────────────────

/// Where one variable lives in the variable segment.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct VarSlot {
    pub offset: u32,
    pub size:   u32,
    pub ty:     VarType,
    /// Position in declaration order.
    pub index:  u16,
}

impl VarSlot {
    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset as usize..(self.offset + self.size) as usize
    }
}

// ── BlackboardLayout ──────────────────────────────────────────────────────────

/// Immutable memory layout shared by every blackboard of one template.
#[derive(Debug)]
pub struct BlackboardLayout {
    template: TemplateId,
    slots:    FxHashMap<VarKey, VarSlot>,
    defs:     Vec<VariableDefinition>,
    defaults: Box<[u8]>,
    node_count: u32,
}

impl BlackboardLayout {
    /// Look up a variable's slot.  O(1).
    #[inline]
    pub fn slot(&self, key: VarKey) -> Option<&VarSlot> {
        self.slots.get(&key)
    }

    pub fn definition(&self, key: VarKey) -> Option<&VariableDefinition> {
        self.slots.get(&key).map(|s| &self.defs[s.index as usize])
    }

    /// Declarations in slot order.
    pub fn variables(&self) -> &[VariableDefinition] {
        &self.defs
    }

    pub fn template(&self) -> TemplateId {
        self.template
    }

    pub fn node_count(&self) -> u32 {
        self.node_count
    }

    /// Encoded default values for the whole variable segment.
    pub fn defaults(&self) -> &[u8] {
        &self.defaults
    }

    /// Size of the variable segment in bytes.
    pub fn var_segment_size(&self) -> usize {
        self.defaults.len()
    }

    /// Header + variable segment + one instance record per node.
    pub fn instance_size(&self) -> usize {
        size_of::<BlackboardHeader>()
            + self.var_segment_size()
            + self.node_count as usize * size_of::<NodeInstance>()
    }
}
