//! Ready-made leaves for common blackboard and movement tasks.

use std::fmt;

use tracing::debug;

use bt_blackboard::VarValue;
use bt_core::{PathStatus, Status, Vec3, VarKey};

use crate::{Action, Condition, ConditionContext, LeafContext};

// ── RequestPath ───────────────────────────────────────────────────────────────

/// Ask the path requester for a route from the agent's position to a target,
/// both read from `Vec3` variables.
///
/// | Requester answer | Result  |
/// |------------------|---------|
/// | `Found`          | Success |
/// | `Pending`        | Running |
/// | `NoPath`         | Failure |
///
/// Missing or mistyped variables fail the leaf.
#[derive(Copy, Clone, Debug)]
pub struct RequestPath {
    pub target:   VarKey,
    pub position: VarKey,
}

impl RequestPath {
    pub fn new(target: impl Into<VarKey>, position: impl Into<VarKey>) -> Self {
        Self { target: target.into(), position: position.into() }
    }
}

impl Action for RequestPath {
    fn execute(&self, ctx: &mut LeafContext<'_>) -> Status {
        let bb = &*ctx.blackboard;
        let (Some(target), Some(current)) = (bb.get::<Vec3>(self.target), bb.get::<Vec3>(self.position))
        else {
            debug!(agent = %ctx.agent, node = %ctx.node, "path request without vec3 target/position");
            return Status::Failure;
        };
        match ctx.pathfinder.request_path(ctx.agent, target, current) {
            PathStatus::Found   => Status::Success,
            PathStatus::Pending => Status::Running,
            PathStatus::NoPath  => Status::Failure,
        }
    }
}

// ── SetValue ──────────────────────────────────────────────────────────────────

/// Write a constant into a variable.  Fails if the write is rejected.
#[derive(Clone, Debug)]
pub struct SetValue {
    pub key:   VarKey,
    pub value: VarValue,
}

impl SetValue {
    pub fn new(key: impl Into<VarKey>, value: impl Into<VarValue>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

impl Action for SetValue {
    fn execute(&self, ctx: &mut LeafContext<'_>) -> Status {
        match ctx.blackboard.set_variable(self.key, &self.value, ctx.now) {
            Ok(()) => Status::Success,
            Err(e) => {
                debug!(agent = %ctx.agent, node = %ctx.node, error = %e, "set_value rejected");
                Status::Failure
            }
        }
    }
}

// ── IsTrue ────────────────────────────────────────────────────────────────────

/// Passes when a bool variable is `true`.
#[derive(Copy, Clone, Debug)]
pub struct IsTrue(pub VarKey);

impl IsTrue {
    pub fn new(key: impl Into<VarKey>) -> Self {
        Self(key.into())
    }
}

impl Condition for IsTrue {
    fn check(&self, ctx: &ConditionContext<'_>) -> bool {
        ctx.blackboard.get::<bool>(self.0).unwrap_or(false)
    }
}

// ── Compare ───────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum CompareOp {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
}

impl CompareOp {
    #[inline]
    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            CompareOp::Lt => lhs < rhs,
            CompareOp::Le => lhs <= rhs,
            CompareOp::Eq => lhs == rhs,
            CompareOp::Ne => lhs != rhs,
            CompareOp::Ge => lhs >= rhs,
            CompareOp::Gt => lhs > rhs,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Ge => ">=",
            CompareOp::Gt => ">",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compare an int or float variable against a constant.  Non-numeric or
/// missing variables fail the check.
#[derive(Copy, Clone, Debug)]
pub struct Compare {
    pub key: VarKey,
    pub op:  CompareOp,
    pub rhs: f64,
}

impl Compare {
    pub fn new(key: impl Into<VarKey>, op: CompareOp, rhs: f64) -> Self {
        Self { key: key.into(), op, rhs }
    }
}

impl Condition for Compare {
    fn check(&self, ctx: &ConditionContext<'_>) -> bool {
        ctx.blackboard
            .get_variable(self.key)
            .and_then(|v| v.as_f64())
            .is_some_and(|lhs| self.op.apply(lhs, self.rhs))
    }
}
