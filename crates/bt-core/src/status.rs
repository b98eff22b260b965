//! Execution results.
//!
//! [`Status`] is what a node returns from one tick.  [`NodeState`] is what the
//! blackboard remembers about a node between ticks; it adds `Invalid` for
//! "never executed, or reset since".

use std::fmt;

/// Result of executing a node (or a whole tree) for one tick.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    Success,
    Failure,
    /// Not finished; resume from stored state next tick.
    Running,
}

impl Status {
    /// `true` for `Success` and `Failure`.
    #[inline]
    pub fn is_done(self) -> bool {
        !matches!(self, Status::Running)
    }

    /// Swap `Success` and `Failure`; `Running` is unchanged.
    #[inline]
    pub fn invert(self) -> Status {
        match self {
            Status::Success => Status::Failure,
            Status::Failure => Status::Success,
            Status::Running => Status::Running,
        }
    }

    #[inline]
    pub fn from_bool(ok: bool) -> Status {
        if ok { Status::Success } else { Status::Failure }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Failure => "failure",
            Status::Running => "running",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-agent persisted state of one node.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum NodeState {
    #[default]
    Invalid,
    Success,
    Failure,
    Running,
}

impl NodeState {
    /// The completed outcome, if any.  `Invalid` and `Running` yield `None`.
    #[inline]
    pub fn outcome(self) -> Option<Status> {
        match self {
            NodeState::Success => Some(Status::Success),
            NodeState::Failure => Some(Status::Failure),
            NodeState::Invalid | NodeState::Running => None,
        }
    }

    #[inline]
    pub fn is_running(self) -> bool {
        self == NodeState::Running
    }
}

impl From<Status> for NodeState {
    #[inline]
    fn from(s: Status) -> NodeState {
        match s {
            Status::Success => NodeState::Success,
            Status::Failure => NodeState::Failure,
            Status::Running => NodeState::Running,
        }
    }
}
