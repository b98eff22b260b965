//! Setup-phase template store and the finalized library.
//!
//! # Two phases
//!
//! ```text
//! TemplateStore (mutable)                 TemplateLibrary (immutable, Sync)
//!   register_action / register_condition
//!   create_template                  ──►  finalize()  ──►  Arc<TemplateLibrary>
//!   add_node / define_variable                              shared by every
//!   set_cooldown                                            engine worker
//! ```
//!
//! Every structural rule is checked at insertion time, so `finalize` only has
//! to confirm that each template received a root.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use bt_blackboard::{BlackboardLayout, VariableDefinition, VariableRegistry};
use bt_core::{BehaviorKey, EngineConfig, NodeIndex, TemplateId, VarKey};

use crate::{
    Action, BehaviorNode, BehaviorTable, BehaviorTreeTemplate, Binding, Condition, NodeKind,
    TreeError, TreeResult,
};

// ── TemplateStore ─────────────────────────────────────────────────────────────

/// A template under construction.
#[derive(Debug)]
struct Draft {
    name:        String,
    priority:    u8,
    cooldown_ms: u64,
    root:        NodeIndex,
    nodes:       Vec<BehaviorNode>,
    registry:    VariableRegistry,
}

/// Mutable builder for a [`TemplateLibrary`].
///
/// # Example
///
/// ```rust,ignore
/// let mut store = TemplateStore::new(EngineConfig::default())?;
/// store.register_condition("hungry", Compare::new("hunger", CompareOp::Gt, 50.0));
/// store.register_action("eat", Eat);
///
/// let citizen = store.create_template("citizen", 10)?;
/// store.define_variable(citizen, VariableDefinition::new("hunger", 0_i32))?;
/// let root = store.add_node(citizen, NodeKind::sequence(), NodeIndex::NONE)?;
/// store.add_node(citizen, NodeKind::condition("hungry"), root)?;
/// store.add_node(citizen, NodeKind::action("eat"), root)?;
///
/// let library = Arc::new(store.finalize()?);
/// ```
#[derive(Debug)]
pub struct TemplateStore {
    config:    EngineConfig,
    drafts:    Vec<Draft>,
    by_name:   FxHashMap<String, TemplateId>,
    behaviors: BehaviorTable,
}

impl TemplateStore {
    /// # Errors
    ///
    /// `Config` if `config` fails validation.
    pub fn new(config: EngineConfig) -> TreeResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            drafts:    Vec::new(),
            by_name:   FxHashMap::default(),
            behaviors: BehaviorTable::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Leaves added after this call can bind to `action`.
    pub fn register_action(&mut self, name: &str, action: impl Action) -> BehaviorKey {
        self.behaviors.register_action(name, action)
    }

    /// Leaves added after this call can bind to `condition`.
    pub fn register_condition(&mut self, name: &str, condition: impl Condition) -> BehaviorKey {
        self.behaviors.register_condition(name, condition)
    }

    pub fn behaviors(&self) -> &BehaviorTable {
        &self.behaviors
    }

    pub fn template_count(&self) -> usize {
        self.drafts.len()
    }

    /// Start a new, empty template.
    ///
    /// # Errors
    ///
    /// `TemplateCapacity` once `max_templates` exist; `DuplicateTemplate` if
    /// the name is taken.
    pub fn create_template(&mut self, name: &str, priority: u8) -> TreeResult<TemplateId> {
        if self.drafts.len() >= self.config.max_templates {
            return Err(TreeError::TemplateCapacity { limit: self.config.max_templates });
        }
        if self.by_name.contains_key(name) {
            return Err(TreeError::DuplicateTemplate(name.to_owned()));
        }
        let id = TemplateId(self.drafts.len() as u16);
        self.drafts.push(Draft {
            name:        name.to_owned(),
            priority,
            cooldown_ms: 0,
            root:        NodeIndex::NONE,
            nodes:       Vec::new(),
            registry:    VariableRegistry::new(self.config.max_variables_per_template),
        });
        self.by_name.insert(name.to_owned(), id);
        debug!(%id, name, priority, "created template");
        Ok(id)
    }

    /// Append a node.  `parent = NodeIndex::NONE` makes it the root; otherwise
    /// it becomes the last child of `parent`.
    ///
    /// Leaf behaviors are resolved now; an unregistered key binds the leaf to
    /// a behavior that always fails.
    pub fn add_node(
        &mut self,
        template: TemplateId,
        kind:     NodeKind,
        parent:   NodeIndex,
    ) -> TreeResult<NodeIndex> {
        let limit = self.config.max_nodes_per_template;
        let draft = self
            .drafts
            .get_mut(template.index())
            .ok_or(TreeError::UnknownTemplate(template))?;

        if draft.nodes.len() >= limit {
            return Err(TreeError::NodeCapacity { template, limit });
        }

        let idx = NodeIndex(draft.nodes.len() as u32);
        let (sibling_pos, depth) = if parent.is_valid() {
            let p = draft
                .nodes
                .get(parent.index())
                .ok_or(TreeError::InvalidParent { template, parent })?;
            match p.kind {
                NodeKind::Leaf(_) => return Err(TreeError::LeafChild { template, parent }),
                NodeKind::Decorator(_) if !p.children.is_empty() => {
                    return Err(TreeError::DecoratorArity { template, parent });
                }
                _ => {}
            }
            (p.children.len() as u32, p.depth + 1)
        } else {
            if draft.root.is_valid() {
                return Err(TreeError::DuplicateRoot { template, existing: draft.root });
            }
            (0, 0)
        };

        let binding = match kind {
            NodeKind::Leaf(leaf) => {
                let binding = self.behaviors.resolve(leaf);
                if binding.is_unbound() {
                    warn!(
                        %template,
                        node = %idx,
                        kind = %kind,
                        key = %leaf.key(),
                        "leaf has no registered behavior; it will always fail"
                    );
                }
                binding
            }
            _ => Binding::Builtin,
        };

        draft.nodes.push(BehaviorNode {
            kind,
            parent,
            children: Vec::new(),
            sibling_pos,
            depth,
            binding,
        });
        if parent.is_valid() {
            draft.nodes[parent.index()].children.push(idx);
        } else {
            draft.root = idx;
        }
        Ok(idx)
    }

    /// Declare a blackboard variable for `template`'s agents.
    pub fn define_variable(
        &mut self,
        template:   TemplateId,
        definition: VariableDefinition,
    ) -> TreeResult<VarKey> {
        let draft = self
            .drafts
            .get_mut(template.index())
            .ok_or(TreeError::UnknownTemplate(template))?;
        Ok(draft.registry.define(definition)?)
    }

    /// Minimum interval between whole-tree evaluations for one agent.
    pub fn set_cooldown(&mut self, template: TemplateId, cooldown_ms: u64) -> TreeResult<()> {
        let draft = self
            .drafts
            .get_mut(template.index())
            .ok_or(TreeError::UnknownTemplate(template))?;
        draft.cooldown_ms = cooldown_ms;
        Ok(())
    }

    /// Freeze every template.
    ///
    /// # Errors
    ///
    /// `NoRoot` for a template that never received a node.
    pub fn finalize(self) -> TreeResult<TemplateLibrary> {
        let mut templates = Vec::with_capacity(self.drafts.len());
        for (i, draft) in self.drafts.into_iter().enumerate() {
            let id = TemplateId(i as u16);
            if !draft.root.is_valid() {
                return Err(TreeError::NoRoot { template: id, name: draft.name });
            }
            let layout = Arc::new(draft.registry.build_layout(id, draft.nodes.len() as u32));
            debug!(
                %id,
                name = %draft.name,
                nodes = draft.nodes.len(),
                instance_size = layout.instance_size(),
                "finalized template"
            );
            templates.push(BehaviorTreeTemplate {
                id,
                name:        draft.name,
                root:        draft.root,
                nodes:       draft.nodes,
                priority:    draft.priority,
                cooldown_ms: draft.cooldown_ms,
                layout,
            });
        }
        info!(templates = templates.len(), "template library finalized");
        Ok(TemplateLibrary { templates, by_name: self.by_name })
    }
}

// ── TemplateLibrary ───────────────────────────────────────────────────────────

/// Immutable set of finalized templates.  Share it behind an `Arc`.
#[derive(Debug)]
pub struct TemplateLibrary {
    templates: Vec<BehaviorTreeTemplate>,
    by_name:   FxHashMap<String, TemplateId>,
}

impl TemplateLibrary {
    #[inline]
    pub fn get(&self, id: TemplateId) -> Option<&BehaviorTreeTemplate> {
        self.templates.get(id.index())
    }

    pub fn template_by_name(&self, name: &str) -> Option<&BehaviorTreeTemplate> {
        self.by_name.get(name).and_then(|&id| self.get(id))
    }

    pub fn layout(&self, id: TemplateId) -> Option<&Arc<BlackboardLayout>> {
        self.get(id).map(|t| t.layout())
    }

    pub fn iter(&self) -> impl Iterator<Item = &BehaviorTreeTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
