//! `bt-tree` — behavior-tree templates and the setup-phase store.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                          |
//! |--------------|-------------------------------------------------------------------|
//! | [`node`]     | `NodeKind` (type, subtype, static config), `BehaviorNode`, `Binding` |
//! | [`behavior`] | `Action` / `Condition` leaf traits, their contexts, `BehaviorTable` |
//! | [`leaves`]   | Built-in leaves: `RequestPath`, `SetValue`, `IsTrue`, `Compare`    |
//! | [`template`] | `BehaviorTreeTemplate` — one frozen tree plus its blackboard layout |
//! | [`store`]    | `TemplateStore` (setup) and `TemplateLibrary` (finalized)          |
//! | [`error`]    | `TreeError`, `TreeResult<T>`                                       |
//!
//! # Design notes
//!
//! A template is an arena of nodes addressed by `NodeIndex`.  Children are an
//! explicit ordered list on the parent, so sibling order, insertion order and
//! evaluation order are the same thing.  Because a parent must exist before
//! its children are added, the arena is topologically ordered and cycles are
//! impossible by construction.
//!
//! Templates hold no per-agent state.  Everything the engine needs to resume
//! a running node lives in the agent's blackboard, which lets one
//! `Arc<TemplateLibrary>` serve any number of worker threads.

pub mod behavior;
pub mod error;
pub mod leaves;
pub mod node;
pub mod store;
pub mod template;


pub use behavior::{Action, BehaviorTable, Condition, ConditionContext, LeafContext};
pub use error::{TreeError, TreeResult};
pub use leaves::{Compare, CompareOp, IsTrue, RequestPath, SetValue};
pub use node::{
    BehaviorNode, Binding, CompositeKind, CooldownBlocked, DecoratorKind, LeafKind, NodeKind,
    ParallelPolicy, Policy,
};
pub use store::{TemplateLibrary, TemplateStore};
pub use template::BehaviorTreeTemplate;
