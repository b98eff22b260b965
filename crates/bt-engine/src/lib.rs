//! `bt-engine` — resumable behavior-tree execution for large agent populations.
//!
//! # Per-agent tick
//!
//! ```text
//! execute_agent(agent, blackboard, dt):
//!   ① Resolve   — template = library[blackboard.template_id]
//!                 (foreign blackboard → error!, Failure)
//!   ② Throttle  — template cooldown not yet elapsed → root's recorded state
//!   ③ Walk      — depth-first from the root, resuming Running nodes from
//!                 their NodeInstance; stop at the node-visit budget
//!   ④ Record    — every visited node stores state, timestamp, count
//! ```
//!
//! # Population tick
//!
//! [`Runtime::tick_population`] runs step ① – ④ for a slice of blackboards.
//! The library is immutable and each blackboard is `&mut`-borrowed by exactly
//! one caller, so agents cannot observe each other however they are
//! scheduled.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs population ticks on Rayon's thread pool.          |
//! | `serde`    | Forwards serde derives to the lower crates.            |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use bt_core::{AgentId, EngineConfig, ManualClock, NodeIndex, NoopPathRequester};
//! use bt_engine::{NoopObserver, RuntimeBuilder};
//! use bt_tree::{NodeKind, TemplateStore};
//!
//! let mut store = TemplateStore::new(EngineConfig::default())?;
//! let idle = store.create_template("idle", 0)?;
//! store.add_node(idle, NodeKind::sequence(), NodeIndex::NONE)?;
//! let library = Arc::new(store.finalize()?);
//!
//! let clock = Arc::new(ManualClock::default());
//! let mut runtime = RuntimeBuilder::new(library, NoopPathRequester, Arc::clone(&clock)).build()?;
//! let mut agents = vec![runtime.create_agent_blackboard(AgentId(0), idle)?];
//! runtime.tick_population(&mut agents, 0.1, &mut NoopObserver);
//! ```

pub mod builder;
pub mod engine;
pub mod error;
pub mod observer;
pub mod runtime;


pub use builder::RuntimeBuilder;
pub use engine::{AgentTick, Engine};
pub use error::{EngineError, EngineResult};
pub use observer::{NoopObserver, TickObserver, TickReport};
pub use runtime::Runtime;
