//! `bt-core` — foundational types for the swarm behavior-tree runtime.
//!
//! This crate is a dependency of every other `bt-*` crate.  It has no `bt-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`ids`]       | `AgentId`, `TemplateId`, `NodeIndex`, `EntityId`, `VarKey`, `BehaviorKey` |
//! | [`status`]    | `Status` (tick result), `NodeState` (persisted state)     |
//! | [`time`]      | `Timestamp`, `Clock`, `ManualClock`, `SystemClock`        |
//! | [`geo`]       | `Vec2`, `Vec3`                                            |
//! | [`path`]      | `PathRequester` collaborator trait, `PathStatus`          |
//! | [`config`]    | `EngineConfig`                                            |
//! | [`rng`]       | `TickRng` (seeded tick-order shuffling)                   |
//! | [`error`]     | `BtError`, `BtResult`                                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, config, and values. |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod path;
pub mod rng;
pub mod status;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::EngineConfig;
pub use error::{BtError, BtResult};
pub use geo::{Vec2, Vec3};
pub use ids::{AgentId, BehaviorKey, EntityId, NodeIndex, TemplateId, VarKey, fnv1a};
pub use path::{NoopPathRequester, PathRequester, PathStatus};
pub use rng::TickRng;
pub use status::{NodeState, Status};
pub use time::{Clock, ManualClock, SystemClock, Timestamp};
