//! Bounded pool of agent blackboards.
//!
//! # Contract
//!
//! - At most `capacity` blackboards are live at once.  Allocation beyond that
//!   fails immediately with [`BlackboardError::PoolExhausted`]; it never
//!   blocks.  Callers treat the error as spawn backpressure.
//! - [`release`](BlackboardPool::release) returns a blackboard's buffers to a
//!   free list so the next spawn reuses them instead of allocating.
//! - A live slot is held by a lease inside the blackboard.  Dropping a
//!   blackboard without releasing it still frees the slot; only buffer reuse
//!   is lost.
//!
//! # Concurrency
//!
//! The live count is a compare-and-swap counter and the free list sits
//! behind a `parking_lot::Mutex` held only for a push or pop, so spawn and
//! despawn may run from any number of threads.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::{debug, warn};

use bt_core::AgentId;

use crate::{AgentBlackboard, BlackboardError, BlackboardLayout, BlackboardResult, NodeInstance};

/// Recycled buffers from a released blackboard.
#[derive(Default)]
struct Storage {
    vars:  Vec<u8>,
    nodes: Vec<NodeInstance>,
}

struct PoolShared {
    capacity:    usize,
    live:        AtomicUsize,
    peak:        AtomicUsize,
    allocations: AtomicU64,
    releases:    AtomicU64,
    exhausted:   AtomicU64,
    free:        Mutex<Vec<Storage>>,
}

/// Holds one live slot; returns it to the pool on drop.
pub(crate) struct PoolLease {
    shared: Arc<PoolShared>,
}

impl Drop for PoolLease {
    fn drop(&mut self) {
        self.shared.live.fetch_sub(1, Ordering::AcqRel);
    }
}

impl std::fmt::Debug for PoolLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolLease").field("capacity", &self.shared.capacity).finish()
    }
}

/// Point-in-time pool counters.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct PoolStats {
    pub capacity:    usize,
    pub live:        usize,
    /// Highest `live` value observed.
    pub peak:        usize,
    pub allocations: u64,
    pub releases:    u64,
    /// Allocation attempts refused because the pool was full.
    pub exhausted:   u64,
}

/// Thread-safe, bounded blackboard allocator.
///
/// Cloning is cheap and yields a handle to the same pool.
#[derive(Clone)]
pub struct BlackboardPool {
    shared: Arc<PoolShared>,
}

impl BlackboardPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            shared: Arc::new(PoolShared {
                capacity,
                live:        AtomicUsize::new(0),
                peak:        AtomicUsize::new(0),
                allocations: AtomicU64::new(0),
                releases:    AtomicU64::new(0),
                exhausted:   AtomicU64::new(0),
                free:        Mutex::new(Vec::new()),
            }),
        }
    }

    /// Create a blackboard for `agent_id` bound to `layout`'s template.
    ///
    /// Variables start at their defaults; every node instance starts reset.
    ///
    /// # Errors
    ///
    /// `PoolExhausted` when `capacity` blackboards are already live.
    pub fn allocate(
        &self,
        agent_id: AgentId,
        layout:   &Arc<BlackboardLayout>,
    ) -> BlackboardResult<AgentBlackboard> {
        let shared = &self.shared;
        let claimed = shared
            .live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
                (live < shared.capacity).then_some(live + 1)
            });
        let live = match claimed {
            Ok(prev) => prev + 1,
            Err(_) => {
                shared.exhausted.fetch_add(1, Ordering::Relaxed);
                debug!(agent = %agent_id, capacity = shared.capacity, "blackboard pool exhausted");
                return Err(BlackboardError::PoolExhausted { capacity: shared.capacity });
            }
        };
        shared.peak.fetch_max(live, Ordering::Relaxed);
        shared.allocations.fetch_add(1, Ordering::Relaxed);

        let storage = shared.free.lock().pop().unwrap_or_default();
        let lease = PoolLease { shared: Arc::clone(shared) };
        Ok(AgentBlackboard::from_parts(
            agent_id,
            Arc::clone(layout),
            storage.vars,
            storage.nodes,
            Some(lease),
        ))
    }

    /// Return a blackboard to the pool.  Its slot becomes available
    /// immediately and its buffers are kept for reuse.
    pub fn release(&self, mut blackboard: AgentBlackboard) {
        let ours = blackboard
            .lease
            .as_ref()
            .is_some_and(|l| Arc::ptr_eq(&l.shared, &self.shared));
        if !ours {
            warn!(
                agent = %blackboard.agent_id(),
                "released a blackboard that was not allocated by this pool"
            );
            return;
        }

        let storage = Storage {
            vars:  std::mem::take(&mut blackboard.vars),
            nodes: std::mem::take(&mut blackboard.nodes),
        };
        {
            let mut free = self.shared.free.lock();
            if free.len() < self.shared.capacity {
                free.push(storage);
            }
        }
        self.shared.releases.fetch_add(1, Ordering::Relaxed);
        // Dropping the blackboard drops its lease, which frees the slot.
        drop(blackboard);
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Number of currently live blackboards.
    pub fn live(&self) -> usize {
        self.shared.live.load(Ordering::Acquire)
    }

    pub fn available(&self) -> usize {
        self.capacity().saturating_sub(self.live())
    }

    pub fn stats(&self) -> PoolStats {
        let s = &self.shared;
        PoolStats {
            capacity:    s.capacity,
            live:        s.live.load(Ordering::Acquire),
            peak:        s.peak.load(Ordering::Relaxed),
            allocations: s.allocations.load(Ordering::Relaxed),
            releases:    s.releases.load(Ordering::Relaxed),
            exhausted:   s.exhausted.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for BlackboardPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlackboardPool").field("stats", &self.stats()).finish()
    }
}
