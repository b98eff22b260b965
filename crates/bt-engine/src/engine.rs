//! Resumable, budgeted tree evaluation for one agent at a time.
//!
//! # Resumption
//!
//! A tick is a single depth-first pass.  `Running` is a return value, never a
//! block: a node that cannot finish records `NodeState::Running` (plus any
//! cursor, counter, or timer) in the agent's `NodeInstance` and unwinds.  The
//! next tick walks the same path and picks up from those records.  Nothing
//! survives on the engine between calls.
//!
//! # Composite semantics
//!
//! | Node      | Child result | Node result                                  |
//! |-----------|--------------|----------------------------------------------|
//! | Sequence  | Success      | advance cursor, Running (Success after last) |
//! |           | Failure      | reset cursor, Failure                        |
//! | Selector  | Failure      | advance cursor, Running (Failure after last) |
//! |           | Success      | reset cursor, Success                        |
//! | Parallel  | all children | per `ParallelPolicy`, success checked first  |
//!
//! Running always passes straight up.  Empty sequences and parallels
//! succeed, empty selectors fail.

use std::sync::Arc;

use tracing::{error, warn};

use bt_blackboard::AgentBlackboard;
use bt_core::{
    AgentId, Clock, EngineConfig, NodeIndex, NodeState, PathRequester, Status, Timestamp,
};
use bt_tree::{
    BehaviorNode, BehaviorTreeTemplate, Binding, CompositeKind, ConditionContext, CooldownBlocked,
    DecoratorKind, LeafContext, NodeKind, ParallelPolicy, TemplateLibrary,
};

/// Outcome of one agent tick, with the bookkeeping population ticks report.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct AgentTick {
    pub status:           Status,
    /// Nodes visited this tick.
    pub visits:           u32,
    /// The visit budget ran out before the pass finished.
    pub budget_exhausted: bool,
    /// The template cooldown suppressed evaluation.
    pub throttled:        bool,
}

impl AgentTick {
    fn skipped(status: Status, throttled: bool) -> Self {
        Self { status, visits: 0, budget_exhausted: false, throttled }
    }
}

/// Per-call evaluation state.  Lives on the stack for one agent tick.
struct TickCtx<'a> {
    template:   &'a BehaviorTreeTemplate,
    agent:      AgentId,
    now:        Timestamp,
    delta_time: f32,
    visits:     u32,
    budget:     u32,
    exhausted:  bool,
}

/// Executes templates from a shared [`TemplateLibrary`] against agent
/// blackboards.
///
/// The engine holds only immutable data, so `&Engine` can be shared across
/// threads; each call mutates exactly the blackboard it is handed.
pub struct Engine<P: PathRequester, C: Clock> {
    library:    Arc<TemplateLibrary>,
    pathfinder: P,
    clock:      C,
    config:     EngineConfig,
}

impl<P: PathRequester, C: Clock> Engine<P, C> {
    pub fn new(library: Arc<TemplateLibrary>, pathfinder: P, clock: C, config: EngineConfig) -> Self {
        Self { library, pathfinder, clock, config }
    }

    pub fn library(&self) -> &Arc<TemplateLibrary> {
        &self.library
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pathfinder(&self) -> &P {
        &self.pathfinder
    }

    #[inline]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // ── Public entry points ───────────────────────────────────────────────

    /// Run one tick of `agent_id`'s tree.
    ///
    /// A blackboard bound to a template this library does not own yields
    /// `Failure` (logged at `error`).
    pub fn execute_agent(
        &self,
        agent_id:   AgentId,
        blackboard: &mut AgentBlackboard,
        delta_time: f32,
    ) -> Status {
        debug_assert_eq!(agent_id, blackboard.agent_id(), "blackboard belongs to another agent");
        self.tick_agent(blackboard, delta_time).status
    }

    /// [`execute_agent`](Self::execute_agent) plus per-tick bookkeeping.
    pub fn tick_agent(&self, blackboard: &mut AgentBlackboard, delta_time: f32) -> AgentTick {
        let Some(template) = self.template_for(blackboard) else {
            return AgentTick::skipped(Status::Failure, false);
        };
        let now = self.clock.now();
        let root = template.root();

        if template.cooldown_ms() > 0 {
            let rec = blackboard.instance(root);
            if rec.execution_count > 0 && now.since(rec.last_executed) < template.cooldown_ms() {
                return AgentTick::skipped(rec.state.outcome().unwrap_or(Status::Running), true);
            }
        }

        let mut cx = TickCtx {
            template,
            agent: blackboard.agent_id(),
            now,
            delta_time,
            visits: 0,
            budget: self.config.node_visit_budget,
            exhausted: false,
        };
        let status = self.execute_node(&mut cx, root, blackboard);
        blackboard.record_tick(now);

        AgentTick {
            status,
            visits:           cx.visits,
            budget_exhausted: cx.exhausted,
            throttled:        false,
        }
    }

    /// Run the subtree rooted at `node` once, with a fresh visit budget.
    ///
    /// Unlike [`execute_agent`](Self::execute_agent) this ignores the
    /// template cooldown and does not count as a tree evaluation.
    pub fn execute_subtree(
        &self,
        node:       NodeIndex,
        blackboard: &mut AgentBlackboard,
        delta_time: f32,
    ) -> Status {
        let Some(template) = self.template_for(blackboard) else {
            return Status::Failure;
        };
        if template.get(node).is_none() {
            warn!(agent = %blackboard.agent_id(), %node, "subtree root is not a node of the template");
            return Status::Failure;
        }
        let mut cx = self.context(template, blackboard, delta_time);
        self.execute_node(&mut cx, node, blackboard)
    }

    /// Abandon whatever the agent's tree is running.  Running actions get
    /// `on_halt`; every running node goes back to `Invalid`.
    pub fn halt_agent(&self, blackboard: &mut AgentBlackboard) {
        let Some(template) = self.template_for(blackboard) else { return };
        let cx = self.context(template, blackboard, 0.0);
        self.halt(&cx, template.root(), blackboard);
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    fn template_for(&self, blackboard: &AgentBlackboard) -> Option<&BehaviorTreeTemplate> {
        match self.library.get(blackboard.template_id()) {
            Some(t) if Arc::ptr_eq(t.layout(), blackboard.layout()) => Some(t),
            _ => {
                error!(
                    agent = %blackboard.agent_id(),
                    template = %blackboard.template_id(),
                    "blackboard is not bound to a template of this library"
                );
                None
            }
        }
    }

    fn context<'a>(
        &self,
        template:   &'a BehaviorTreeTemplate,
        blackboard: &AgentBlackboard,
        delta_time: f32,
    ) -> TickCtx<'a> {
        TickCtx {
            template,
            agent: blackboard.agent_id(),
            now: self.clock.now(),
            delta_time,
            visits: 0,
            budget: self.config.node_visit_budget,
            exhausted: false,
        }
    }

    /// Execute one node and record the result in its instance.
    fn execute_node(&self, cx: &mut TickCtx<'_>, idx: NodeIndex, bb: &mut AgentBlackboard) -> Status {
        if cx.visits >= cx.budget {
            if !cx.exhausted {
                cx.exhausted = true;
                warn!(
                    agent = %cx.agent,
                    template = %cx.template.id(),
                    budget = cx.budget,
                    "node visit budget exhausted; resuming next tick"
                );
            }
            return Status::Running;
        }
        cx.visits += 1;

        let template = cx.template;
        let node = template.node(idx);
        let fresh = !bb.instance(idx).state.is_running();

        let status = match *node.kind() {
            NodeKind::Composite(CompositeKind::Sequence) => {
                self.run_ordered(cx, idx, node, Status::Success, fresh, bb)
            }
            NodeKind::Composite(CompositeKind::Selector) => {
                self.run_ordered(cx, idx, node, Status::Failure, fresh, bb)
            }
            NodeKind::Composite(CompositeKind::Parallel(policy)) => {
                self.run_parallel(cx, node, policy, fresh, bb)
            }
            NodeKind::Decorator(DecoratorKind::Inverter) => match node.children().first() {
                Some(&child) => self.execute_node(cx, child, bb).invert(),
                None => Status::Failure,
            },
            NodeKind::Decorator(DecoratorKind::Repeater { limit, until_failure }) => {
                self.run_repeater(cx, idx, node, limit, until_failure, fresh, bb)
            }
            NodeKind::Decorator(DecoratorKind::Cooldown { duration_ms, when_blocked }) => {
                self.run_cooldown(cx, idx, node, duration_ms, when_blocked, fresh, bb)
            }
            NodeKind::Leaf(_) => self.run_leaf(cx, idx, node, fresh, bb),
        };

        let rec = bb.instance_mut(idx);
        rec.state = status.into();
        rec.last_executed = cx.now;
        rec.execution_count = rec.execution_count.saturating_add(1);
        status
    }

    // ── Composites ────────────────────────────────────────────────────────

    /// Sequence (`advance_on = Success`) or selector (`advance_on = Failure`).
    ///
    /// One child runs per tick.  When it returns `advance_on` the cursor moves
    /// to the next sibling and the composite reports `Running`; the sibling
    /// starts on the following tick.
    fn run_ordered(
        &self,
        cx:         &mut TickCtx<'_>,
        idx:        NodeIndex,
        node:       &BehaviorNode,
        advance_on: Status,
        fresh:      bool,
        bb:         &mut AgentBlackboard,
    ) -> Status {
        let children = node.children();
        if children.is_empty() {
            return advance_on;
        }

        let cursor = if fresh { NodeIndex::NONE } else { bb.instance(idx).current_child };
        let pos = cursor_position(cx.template, children, cursor);
        let child = children[pos];
        bb.instance_mut(idx).current_child = child;

        let result = self.execute_node(cx, child, bb);
        if result == Status::Running {
            return Status::Running;
        }
        if result == advance_on {
            if let Some(&next) = children.get(pos + 1) {
                bb.instance_mut(idx).current_child = next;
                return Status::Running;
            }
        }
        bb.instance_mut(idx).current_child = NodeIndex::NONE;
        result
    }

    /// Children that already finished during the current run keep their
    /// outcome and are not ticked again until the parallel itself restarts.
    fn run_parallel(
        &self,
        cx:     &mut TickCtx<'_>,
        node:   &BehaviorNode,
        policy: ParallelPolicy,
        fresh:  bool,
        bb:     &mut AgentBlackboard,
    ) -> Status {
        let children = node.children();
        if children.is_empty() {
            return Status::Success;
        }
        if fresh {
            for &child in children {
                if bb.instance(child).state.is_running() {
                    self.halt(cx, child, bb);
                }
                bb.instance_mut(child).state = NodeState::Invalid;
            }
        }

        let (mut succeeded, mut failed, mut running) = (0, 0, 0);
        for &child in children {
            let status = match bb.instance(child).state.outcome() {
                Some(done) => done,
                None => self.execute_node(cx, child, bb),
            };
            match status {
                Status::Success => succeeded += 1,
                Status::Failure => failed += 1,
                Status::Running => running += 1,
            }
        }

        let total = children.len();
        let result = if policy.success.satisfied(succeeded, total) {
            Status::Success
        } else if policy.failure.satisfied(failed, total) {
            Status::Failure
        } else if running == 0 {
            // Everything finished without meeting either threshold.
            Status::Failure
        } else {
            Status::Running
        };

        if result.is_done() {
            for &child in children {
                self.halt(cx, child, bb);
            }
        }
        result
    }

    // ── Decorators ────────────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    fn run_repeater(
        &self,
        cx:            &mut TickCtx<'_>,
        idx:           NodeIndex,
        node:          &BehaviorNode,
        limit:         u32,
        until_failure: bool,
        fresh:         bool,
        bb:            &mut AgentBlackboard,
    ) -> Status {
        let Some(&child) = node.children().first() else {
            return Status::Failure;
        };
        if fresh {
            bb.instance_mut(idx).iterations = 0;
        }

        match self.execute_node(cx, child, bb) {
            Status::Running => Status::Running,
            Status::Failure if until_failure => {
                bb.instance_mut(idx).iterations = 0;
                Status::Failure
            }
            _ => {
                let rec = bb.instance_mut(idx);
                rec.iterations = rec.iterations.saturating_add(1);
                if limit != 0 && rec.iterations >= limit {
                    rec.iterations = 0;
                    Status::Success
                } else {
                    Status::Running
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn run_cooldown(
        &self,
        cx:           &mut TickCtx<'_>,
        idx:          NodeIndex,
        node:         &BehaviorNode,
        duration_ms:  u64,
        when_blocked: CooldownBlocked,
        fresh:        bool,
        bb:           &mut AgentBlackboard,
    ) -> Status {
        let Some(&child) = node.children().first() else {
            return Status::Failure;
        };

        // A running child is always resumed; the timer only gates fresh entry.
        if fresh {
            let rec = bb.instance(idx);
            if cx.now < rec.cooldown_end {
                return match when_blocked {
                    CooldownBlocked::Fail => Status::Failure,
                    CooldownBlocked::LastOutcome => rec.last_outcome.outcome().unwrap_or(Status::Failure),
                };
            }
            bb.instance_mut(idx).cooldown_end = cx.now.after_ms(duration_ms);
        }

        let result = self.execute_node(cx, child, bb);
        if result.is_done() {
            bb.instance_mut(idx).last_outcome = result.into();
        }
        result
    }

    // ── Leaves ────────────────────────────────────────────────────────────

    fn run_leaf(
        &self,
        cx:    &mut TickCtx<'_>,
        idx:   NodeIndex,
        node:  &BehaviorNode,
        fresh: bool,
        bb:    &mut AgentBlackboard,
    ) -> Status {
        match node.binding() {
            Binding::Action(action) => {
                let mut ctx = LeafContext {
                    agent:      cx.agent,
                    node:       idx,
                    now:        cx.now,
                    delta_time: cx.delta_time,
                    blackboard: bb,
                    pathfinder: &self.pathfinder,
                };
                if fresh {
                    action.on_enter(&mut ctx);
                }
                action.execute(&mut ctx)
            }
            Binding::Condition(condition) => Status::from_bool(condition.check(&ConditionContext {
                agent:      cx.agent,
                node:       idx,
                now:        cx.now,
                blackboard: bb,
            })),
            Binding::Unbound(_) | Binding::Builtin => Status::Failure,
        }
    }

    // ── Halting ───────────────────────────────────────────────────────────

    /// Reset every running node under (and including) `idx`.
    fn halt(&self, cx: &TickCtx<'_>, idx: NodeIndex, bb: &mut AgentBlackboard) {
        if !bb.instance(idx).state.is_running() {
            return;
        }
        let node = cx.template.node(idx);
        for &child in node.children() {
            self.halt(cx, child, bb);
        }
        if let Binding::Action(action) = node.binding() {
            action.on_halt(&mut LeafContext {
                agent:      cx.agent,
                node:       idx,
                now:        cx.now,
                delta_time: cx.delta_time,
                blackboard: bb,
                pathfinder: &self.pathfinder,
            });
        }
        bb.instance_mut(idx).halt();
    }
}

/// Position of `cursor` in `children`, or 0 when the cursor is unset or does
/// not belong to this composite.
fn cursor_position(template: &BehaviorTreeTemplate, children: &[NodeIndex], cursor: NodeIndex) -> usize {
    if !cursor.is_valid() {
        return 0;
    }
    let pos = template.get(cursor).map_or(0, |n| n.sibling_pos());
    if children.get(pos) == Some(&cursor) { pos } else { 0 }
}
