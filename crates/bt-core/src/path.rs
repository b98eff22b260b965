//! Pathfinding collaborator interface.
//!
//! # Pluggability
//!
//! Action leaves issue path requests through the [`PathRequester`] trait; the
//! search itself (A*, hierarchical, flow fields…) lives outside the runtime.
//! Requests are fire-and-poll: an implementation that answers asynchronously
//! returns [`PathStatus::Pending`] until the route is ready, and the action
//! keeps returning `Running` until then.

use crate::{AgentId, Vec3};

/// Outcome of one `request_path` call.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathStatus {
    /// A route is available.
    Found,
    /// The request is queued or being searched; ask again next tick.
    Pending,
    /// No route exists, or the request was rejected.
    NoPath,
}

/// External path search service.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`: a population tick may call
/// `request_path` from many Rayon workers at once.
pub trait PathRequester: Send + Sync {
    /// Ask for a route from `current` to `target` on behalf of `agent`.
    ///
    /// Calling again for the same agent and target while a search is pending
    /// must be idempotent.
    fn request_path(&self, agent: AgentId, target: Vec3, current: Vec3) -> PathStatus;
}

impl<P: PathRequester + ?Sized> PathRequester for std::sync::Arc<P> {
    #[inline]
    fn request_path(&self, agent: AgentId, target: Vec3, current: Vec3) -> PathStatus {
        (**self).request_path(agent, target, current)
    }
}

/// A [`PathRequester`] for populations that never move: every request fails.
pub struct NoopPathRequester;

impl PathRequester for NoopPathRequester {
    fn request_path(&self, _agent: AgentId, _target: Vec3, _current: Vec3) -> PathStatus {
        PathStatus::NoPath
    }
}
