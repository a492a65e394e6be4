/*!
# Code Path Analyzer

Builds control flow graphs while the engine traverses the AST. The
analyzer mirrors the traversal with a stack of per-construct contexts:
choices fork and join the segment frontier, loops wire back edges,
switches chain case tests, try statements collect the segments that
can throw into the catch entry.

`enter` and `leave` return the path and segment lifecycle events the
engine interleaves with node events: path start and the initial
segment start precede the owning node's enter event, path end follows
its exit event, and segment starts and ends fire as the frontier
moves. Only reachable segments produce lifecycle events.
*/

use tracing::trace;

use crate::parser::ast::{Ast, ChildRole, NodeId, NodeType};

use super::path::{CodePath, PathId};
use super::segment::SegmentId;

/// Lifecycle event emitted while building code paths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEvent {
    Start { path: PathId, node: NodeId },
    End { path: PathId, node: NodeId },
    SegmentStart { path: PathId, segment: SegmentId, node: NodeId },
    SegmentEnd { path: PathId, segment: SegmentId, node: NodeId },
}

/// Fork bookkeeping for if, conditional and logical expressions
#[derive(Default)]
struct ChoiceCtx {
    node: NodeId,
    fork_origin: Vec<SegmentId>,
    then_exit: Option<Vec<SegmentId>>,
}

struct LoopData {
    /// Test segment; the iteration segment for for-in
    test_seg: Option<SegmentId>,
    /// First body segment, back edge target for do-while and test-less for
    body_entry: Option<SegmentId>,
    update_seg: Option<SegmentId>,
    /// Frontier captured just before the update segment detached it
    pre_update: Vec<SegmentId>,
    /// Continue frontiers waiting for the do-while test segment
    pending_continues: Vec<SegmentId>,
}

#[derive(Default)]
struct SwitchData {
    /// Frontier where the next case test evaluates
    chain: Option<Vec<SegmentId>>,
    /// Exit of the previous case, merged into the next case body
    fallthrough: Vec<SegmentId>,
    body_created: bool,
    saw_default: bool,
}

enum BreakableKind {
    Loop(LoopData),
    Switch(SwitchData),
}

struct BreakableCtx {
    node: NodeId,
    label: Option<String>,
    breaks: Vec<SegmentId>,
    kind: BreakableKind,
}

struct TryCtx {
    /// Segments live inside the try block, potential catch predecessors
    thrown: Vec<SegmentId>,
    collecting: bool,
    try_exit: Option<Vec<SegmentId>>,
    has_finalizer: bool,
}

struct LabelCtx {
    name: String,
    breaks: Vec<SegmentId>,
}

/// Builder state of one path, parallel to the analyzer's path list
#[derive(Default)]
struct BuildState {
    current: Vec<SegmentId>,
    choice_stack: Vec<ChoiceCtx>,
    breakable_stack: Vec<BreakableCtx>,
    try_stack: Vec<TryCtx>,
    label_stack: Vec<LabelCtx>,
    returned: Vec<SegmentId>,
    thrown_final: Vec<SegmentId>,
}

#[derive(Default)]
pub struct CodePathAnalyzer {
    paths: Vec<CodePath>,
    states: Vec<BuildState>,
    /// Stack of active path indices; the top owns the frontier
    active: Vec<PathId>,
    counter: usize,
}

impl CodePathAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self, id: PathId) -> &CodePath {
        &self.paths[id]
    }

    pub fn paths(&self) -> &[CodePath] {
        &self.paths
    }

    /// Current frontier of a path, empty once the path ended
    pub fn current_segments(&self, id: PathId) -> &[SegmentId] {
        &self.states[id].current
    }

    fn cur(&self) -> PathId {
        *self.active.last().expect("no active code path")
    }

    // ----- frontier plumbing -----

    fn create_segment(&mut self, prevs: &[SegmentId], forced_unreachable: bool) -> SegmentId {
        let p = self.cur();
        let segment = self.paths[p].new_segment(prevs, forced_unreachable);
        if self.paths[p].segment(segment).reachable {
            for ctx in self.states[p].try_stack.iter_mut().filter(|c| c.collecting) {
                ctx.thrown.push(segment);
            }
        }
        segment
    }

    fn replace_frontier(&mut self, new: Vec<SegmentId>, node: NodeId, events: &mut Vec<PathEvent>) {
        let p = self.cur();
        let old = std::mem::take(&mut self.states[p].current);
        for &s in &old {
            if !new.contains(&s) && self.paths[p].segment(s).reachable {
                events.push(PathEvent::SegmentEnd {
                    path: p,
                    segment: s,
                    node,
                });
            }
        }
        for &s in &new {
            if !old.contains(&s) && self.paths[p].segment(s).reachable {
                events.push(PathEvent::SegmentStart {
                    path: p,
                    segment: s,
                    node,
                });
            }
        }
        self.states[p].current = new;
    }

    /// Moves the frontier into a fresh segment wired to `prevs`
    fn advance_to(
        &mut self,
        prevs: &[SegmentId],
        forced_unreachable: bool,
        node: NodeId,
        events: &mut Vec<PathEvent>,
    ) -> SegmentId {
        let segment = self.create_segment(prevs, forced_unreachable);
        self.replace_frontier(vec![segment], node, events);
        segment
    }

    fn current(&self) -> Vec<SegmentId> {
        self.states[self.cur()].current.clone()
    }

    // ----- path lifecycle -----

    fn start_path(&mut self, node: NodeId, events: &mut Vec<PathEvent>) {
        self.counter += 1;
        let upper = self.active.last().copied();
        let path = CodePath::new(self.counter, upper);
        let initial = path.initial_segment();
        let id = self.paths.len();
        trace!(path = %path.id, "code path started");
        self.paths.push(path);
        self.states.push(BuildState {
            current: vec![initial],
            ..Default::default()
        });
        self.active.push(id);
        events.push(PathEvent::Start { path: id, node });
        events.push(PathEvent::SegmentStart {
            path: id,
            segment: initial,
            node,
        });
    }

    fn end_path(&mut self, node: NodeId, pre: &mut Vec<PathEvent>, post: &mut Vec<PathEvent>) {
        let Some(p) = self.active.pop() else {
            return;
        };
        let state = std::mem::take(&mut self.states[p]);
        for &s in &state.returned {
            self.paths[p].add_final_segment(s);
        }
        for &s in &state.thrown_final {
            self.paths[p].add_final_segment(s);
        }
        for &s in &state.current {
            if self.paths[p].segment(s).reachable {
                pre.push(PathEvent::SegmentEnd {
                    path: p,
                    segment: s,
                    node,
                });
                self.paths[p].add_final_segment(s);
            }
        }
        trace!(path = %self.paths[p].id, segments = self.paths[p].segment_count(), "code path ended");
        post.push(PathEvent::End { path: p, node });
    }

    // ----- context lookup -----

    fn state(&mut self) -> &mut BuildState {
        let p = self.cur();
        &mut self.states[p]
    }

    fn breakable_for(&mut self, node: NodeId) -> Option<&mut BreakableCtx> {
        self.state()
            .breakable_stack
            .iter_mut()
            .rev()
            .find(|c| c.node == node)
    }

    // ----- traversal hooks -----

    /// Called before a node's enter event; returns lifecycle events
    /// to dispatch first
    pub fn enter(&mut self, ast: &Ast, id: NodeId) -> Vec<PathEvent> {
        let mut events = Vec::new();
        let node = ast.node(id);

        if !self.active.is_empty() {
            if let Some(parent) = node.parent {
                self.preprocess_enter(ast, id, parent, &mut events);
            }
        }

        match node.node_type {
            NodeType::Program | NodeType::FunctionDeclaration | NodeType::FunctionExpression => {
                self.start_path(id, &mut events);
            }
            NodeType::IfStatement
            | NodeType::ConditionalExpression
            | NodeType::LogicalExpression => {
                self.state().choice_stack.push(ChoiceCtx {
                    node: id,
                    ..Default::default()
                });
            }
            NodeType::WhileStatement
            | NodeType::DoWhileStatement
            | NodeType::ForStatement
            | NodeType::ForInStatement => {
                let label = label_of(ast, id);
                self.state().breakable_stack.push(BreakableCtx {
                    node: id,
                    label,
                    breaks: Vec::new(),
                    kind: BreakableKind::Loop(LoopData {
                        test_seg: None,
                        body_entry: None,
                        update_seg: None,
                        pre_update: Vec::new(),
                        pending_continues: Vec::new(),
                    }),
                });
            }
            NodeType::SwitchStatement => {
                let label = label_of(ast, id);
                self.state().breakable_stack.push(BreakableCtx {
                    node: id,
                    label,
                    breaks: Vec::new(),
                    kind: BreakableKind::Switch(SwitchData::default()),
                });
            }
            NodeType::SwitchCase => {
                self.enter_switch_case(ast, id, &mut events);
            }
            NodeType::TryStatement => {
                let thrown = self.current();
                let has_finalizer = node.flag("has_finalizer");
                self.state().try_stack.push(TryCtx {
                    thrown,
                    collecting: true,
                    try_exit: None,
                    has_finalizer,
                });
            }
            NodeType::LabeledStatement => {
                let name = node.value.clone().unwrap_or_default();
                self.state().label_stack.push(LabelCtx {
                    name,
                    breaks: Vec::new(),
                });
            }
            _ => {}
        }
        events
    }

    /// Frontier moves keyed off the role a node plays in its parent
    fn preprocess_enter(
        &mut self,
        ast: &Ast,
        id: NodeId,
        parent: NodeId,
        events: &mut Vec<PathEvent>,
    ) {
        let role = ast.child_role(parent, id);
        let parent_type = ast.node(parent).node_type;
        match (parent_type, role) {
            // Then branch: remember the origin, fork a new segment
            (NodeType::IfStatement, ChildRole::Consequent)
            | (NodeType::ConditionalExpression, ChildRole::Consequent)
            | (NodeType::LogicalExpression, ChildRole::Right) => {
                let origin = self.current();
                if let Some(ctx) = self
                    .state()
                    .choice_stack
                    .iter_mut()
                    .rev()
                    .find(|c| c.node == parent)
                {
                    ctx.fork_origin = origin.clone();
                }
                self.advance_to(&origin, false, id, events);
            }
            // Else branch: record the then exit, fork from the origin
            (NodeType::IfStatement, ChildRole::Alternate)
            | (NodeType::ConditionalExpression, ChildRole::Alternate) => {
                let then_exit = self.current();
                let mut origin = Vec::new();
                if let Some(ctx) = self
                    .state()
                    .choice_stack
                    .iter_mut()
                    .rev()
                    .find(|c| c.node == parent)
                {
                    ctx.then_exit = Some(then_exit);
                    origin = ctx.fork_origin.clone();
                }
                self.advance_to(&origin, false, id, events);
            }
            (NodeType::WhileStatement, ChildRole::Test) => {
                let prevs = self.current();
                let test = self.advance_to(&prevs, false, id, events);
                if let Some(BreakableCtx {
                    kind: BreakableKind::Loop(data),
                    ..
                }) = self.breakable_for(parent)
                {
                    data.test_seg = Some(test);
                }
            }
            (NodeType::WhileStatement, ChildRole::Body)
            | (NodeType::ForInStatement, ChildRole::Body) => {
                let test = match self.breakable_for(parent) {
                    Some(BreakableCtx {
                        kind: BreakableKind::Loop(data),
                        ..
                    }) => data.test_seg,
                    _ => None,
                };
                let prevs: Vec<SegmentId> = test.into_iter().collect();
                let body = self.advance_to(&prevs, false, id, events);
                if let Some(BreakableCtx {
                    kind: BreakableKind::Loop(data),
                    ..
                }) = self.breakable_for(parent)
                {
                    data.body_entry = Some(body);
                }
            }
            (NodeType::DoWhileStatement, ChildRole::Body) => {
                let prevs = self.current();
                let body = self.advance_to(&prevs, false, id, events);
                if let Some(BreakableCtx {
                    kind: BreakableKind::Loop(data),
                    ..
                }) = self.breakable_for(parent)
                {
                    data.body_entry = Some(body);
                }
            }
            (NodeType::DoWhileStatement, ChildRole::Test) => {
                // Continues inside the body jump forward to the test
                let mut prevs = self.current();
                if let Some(BreakableCtx {
                    kind: BreakableKind::Loop(data),
                    ..
                }) = self.breakable_for(parent)
                {
                    prevs.append(&mut data.pending_continues);
                }
                let test = self.advance_to(&prevs, false, id, events);
                if let Some(BreakableCtx {
                    kind: BreakableKind::Loop(data),
                    ..
                }) = self.breakable_for(parent)
                {
                    data.test_seg = Some(test);
                }
            }
            (NodeType::ForStatement, ChildRole::Test) => {
                let prevs = self.current();
                let test = self.advance_to(&prevs, false, id, events);
                if let Some(BreakableCtx {
                    kind: BreakableKind::Loop(data),
                    ..
                }) = self.breakable_for(parent)
                {
                    data.test_seg = Some(test);
                }
            }
            (NodeType::ForStatement, ChildRole::Update) => {
                // Detached; the body exit wires into it at loop end
                let pre_update = self.current();
                let update = self.advance_to(&[], false, id, events);
                if let Some(BreakableCtx {
                    kind: BreakableKind::Loop(data),
                    ..
                }) = self.breakable_for(parent)
                {
                    data.update_seg = Some(update);
                    data.pre_update = pre_update;
                }
            }
            (NodeType::ForStatement, ChildRole::Body) => {
                let prevs = match self.breakable_for(parent) {
                    Some(BreakableCtx {
                        kind: BreakableKind::Loop(data),
                        ..
                    }) => match data.test_seg {
                        Some(test) => vec![test],
                        None if data.update_seg.is_some() => data.pre_update.clone(),
                        None => Vec::new(),
                    },
                    _ => Vec::new(),
                };
                let prevs = if prevs.is_empty() { self.current() } else { prevs };
                let body = self.advance_to(&prevs, false, id, events);
                if let Some(BreakableCtx {
                    kind: BreakableKind::Loop(data),
                    ..
                }) = self.breakable_for(parent)
                {
                    data.body_entry = Some(body);
                }
            }
            // Implicit has-more test, evaluated after the iterated object
            (NodeType::ForInStatement, ChildRole::Left) => {
                let prevs = self.current();
                let test = self.advance_to(&prevs, false, id, events);
                if let Some(BreakableCtx {
                    kind: BreakableKind::Loop(data),
                    ..
                }) = self.breakable_for(parent)
                {
                    data.test_seg = Some(test);
                }
            }
            (NodeType::SwitchCase, ChildRole::CaseBody) => {
                self.enter_case_body(ast, id, parent, events);
            }
            (NodeType::TryStatement, ChildRole::Handler) => {
                let exit = self.current();
                let mut prevs = Vec::new();
                if let Some(ctx) = self.state().try_stack.last_mut() {
                    ctx.try_exit = Some(exit);
                    ctx.collecting = false;
                    prevs = ctx.thrown.clone();
                }
                self.advance_to(&prevs, false, id, events);
            }
            (NodeType::TryStatement, ChildRole::Finalizer) => {
                let exit = self.current();
                let mut prevs = Vec::new();
                if let Some(ctx) = self.state().try_stack.last_mut() {
                    match &ctx.try_exit {
                        Some(try_exit) => {
                            // Catch ran; merge try and catch exits
                            prevs = try_exit.clone();
                            prevs.extend(exit);
                        }
                        None => {
                            // No handler: exceptions reach the finalizer
                            ctx.try_exit = Some(exit.clone());
                            ctx.collecting = false;
                            prevs = exit;
                            prevs.extend(ctx.thrown.clone());
                        }
                    }
                }
                self.advance_to(&prevs, false, id, events);
            }
            _ => {}
        }
    }

    fn enter_switch_case(&mut self, ast: &Ast, id: NodeId, events: &mut Vec<PathEvent>) {
        let has_test = ast.node(id).flag("has_test");
        let Some(parent) = ast.parent(id) else {
            return;
        };
        let current = self.current();
        let mut chain_to_fork = None;
        if let Some(BreakableCtx {
            kind: BreakableKind::Switch(data),
            ..
        }) = self.breakable_for(parent)
        {
            data.body_created = false;
            if !has_test {
                data.saw_default = true;
                return;
            }
            match &data.chain {
                // First test evaluates in the discriminant's frontier
                None => data.chain = Some(current),
                Some(chain) => chain_to_fork = Some(chain.clone()),
            }
        }
        if let Some(chain) = chain_to_fork {
            let test = self.advance_to(&chain, false, id, events);
            if let Some(BreakableCtx {
                kind: BreakableKind::Switch(data),
                ..
            }) = self.breakable_for(parent)
            {
                data.chain = Some(vec![test]);
            }
        }
    }

    fn enter_case_body(
        &mut self,
        ast: &Ast,
        id: NodeId,
        case: NodeId,
        events: &mut Vec<PathEvent>,
    ) {
        let Some(switch) = ast.parent(case) else {
            return;
        };
        let has_test = ast.node(case).flag("has_test");
        let current = self.current();
        let mut prevs = Vec::new();
        let mut already = true;
        if let Some(BreakableCtx {
            kind: BreakableKind::Switch(data),
            ..
        }) = self.breakable_for(switch)
        {
            already = data.body_created;
            if !already {
                data.body_created = true;
                prevs = if has_test {
                    current
                } else {
                    data.chain.clone().unwrap_or(current)
                };
                prevs.append(&mut data.fallthrough);
            }
        }
        if !already {
            self.advance_to(&prevs, false, id, events);
        }
    }

    /// Called after a node's children were traversed. Returns events
    /// to dispatch before the node's exit event and events (path ends)
    /// to dispatch after it.
    pub fn leave(&mut self, ast: &Ast, id: NodeId) -> (Vec<PathEvent>, Vec<PathEvent>) {
        let mut pre = Vec::new();
        let mut post = Vec::new();
        let node = ast.node(id);

        match node.node_type {
            NodeType::Program | NodeType::FunctionDeclaration | NodeType::FunctionExpression => {
                self.end_path(id, &mut pre, &mut post);
            }
            NodeType::IfStatement | NodeType::ConditionalExpression => {
                if let Some(ctx) = self.state().choice_stack.pop() {
                    if !ctx.fork_origin.is_empty() {
                        let mut prevs = match ctx.then_exit {
                            Some(then_exit) => {
                                let mut p = then_exit;
                                p.extend(self.current());
                                p
                            }
                            None => {
                                let mut p = self.current();
                                p.extend(ctx.fork_origin);
                                p
                            }
                        };
                        prevs.dedup();
                        self.advance_to(&prevs, false, id, &mut pre);
                    }
                }
            }
            NodeType::LogicalExpression => {
                if let Some(ctx) = self.state().choice_stack.pop() {
                    if !ctx.fork_origin.is_empty() {
                        let mut prevs = self.current();
                        prevs.extend(ctx.fork_origin);
                        self.advance_to(&prevs, false, id, &mut pre);
                    }
                }
            }
            NodeType::WhileStatement => self.leave_while(id, &mut pre),
            NodeType::DoWhileStatement => self.leave_do_while(id, &mut pre),
            NodeType::ForStatement => self.leave_for(id, &mut pre),
            NodeType::ForInStatement => self.leave_for_in(id, &mut pre),
            NodeType::SwitchStatement => self.leave_switch(id, &mut pre),
            NodeType::SwitchCase => self.leave_switch_case(ast, id),
            NodeType::TryStatement => {
                if let Some(ctx) = self.state().try_stack.pop() {
                    if !ctx.has_finalizer {
                        // Join try and catch exits
                        let mut prevs = ctx.try_exit.unwrap_or_default();
                        prevs.extend(self.current());
                        self.advance_to(&prevs, false, id, &mut pre);
                    }
                }
            }
            NodeType::ReturnStatement => {
                let current = self.current();
                self.state().returned.extend(current.clone());
                self.advance_to(&current, true, id, &mut pre);
            }
            NodeType::ThrowStatement => {
                let current = self.current();
                let escapes = !self.state().try_stack.iter().any(|c| c.collecting);
                if escapes {
                    self.state().thrown_final.extend(current.clone());
                }
                self.advance_to(&current, true, id, &mut pre);
            }
            NodeType::BreakStatement => self.leave_break(ast, id, &mut pre),
            NodeType::ContinueStatement => self.leave_continue(ast, id, &mut pre),
            NodeType::LabeledStatement => {
                if let Some(ctx) = self.state().label_stack.pop() {
                    if !ctx.breaks.is_empty() {
                        let mut prevs = self.current();
                        prevs.extend(ctx.breaks);
                        self.advance_to(&prevs, false, id, &mut pre);
                    }
                }
            }
            _ => {}
        }
        (pre, post)
    }

    fn pop_breakable(&mut self, node: NodeId) -> Option<BreakableCtx> {
        let stack = &mut self.state().breakable_stack;
        if stack.last().map(|c| c.node == node).unwrap_or(false) {
            stack.pop()
        } else {
            None
        }
    }

    fn leave_while(&mut self, id: NodeId, pre: &mut Vec<PathEvent>) {
        let Some(ctx) = self.pop_breakable(id) else {
            return;
        };
        let BreakableKind::Loop(data) = ctx.kind else {
            return;
        };
        let p = self.cur();
        let body_exit = self.current();
        if let Some(test) = data.test_seg {
            for &s in &body_exit {
                self.paths[p].add_edge(s, test, true);
            }
            let mut prevs = vec![test];
            prevs.extend(ctx.breaks);
            self.advance_to(&prevs, false, id, pre);
        }
    }

    fn leave_do_while(&mut self, id: NodeId, pre: &mut Vec<PathEvent>) {
        let Some(ctx) = self.pop_breakable(id) else {
            return;
        };
        let BreakableKind::Loop(data) = ctx.kind else {
            return;
        };
        let p = self.cur();
        let test_exit = self.current();
        if let Some(body) = data.body_entry {
            for &s in &test_exit {
                self.paths[p].add_edge(s, body, true);
            }
        }
        let mut prevs = test_exit;
        prevs.extend(ctx.breaks);
        self.advance_to(&prevs, false, id, pre);
    }

    fn leave_for(&mut self, id: NodeId, pre: &mut Vec<PathEvent>) {
        let Some(ctx) = self.pop_breakable(id) else {
            return;
        };
        let BreakableKind::Loop(data) = ctx.kind else {
            return;
        };
        let p = self.cur();
        let body_exit = self.current();
        let back_target = data.test_seg.or(data.body_entry);
        if let Some(update) = data.update_seg {
            for &s in &body_exit {
                self.paths[p].add_edge(s, update, false);
            }
            if let Some(target) = back_target {
                self.paths[p].add_edge(update, target, true);
            }
        } else if let Some(target) = back_target {
            for &s in &body_exit {
                self.paths[p].add_edge(s, target, true);
            }
        }
        let mut prevs: Vec<SegmentId> = data.test_seg.into_iter().collect();
        prevs.extend(ctx.breaks);
        // A for without test or break never exits normally
        let forced = prevs.is_empty();
        let after = self.create_segment(&prevs, forced);
        self.replace_frontier(vec![after], id, pre);
    }

    fn leave_for_in(&mut self, id: NodeId, pre: &mut Vec<PathEvent>) {
        let Some(ctx) = self.pop_breakable(id) else {
            return;
        };
        let BreakableKind::Loop(data) = ctx.kind else {
            return;
        };
        let p = self.cur();
        let body_exit = self.current();
        if let Some(test) = data.test_seg {
            for &s in &body_exit {
                self.paths[p].add_edge(s, test, true);
            }
            let mut prevs = vec![test];
            prevs.extend(ctx.breaks);
            self.advance_to(&prevs, false, id, pre);
        }
    }

    fn leave_switch(&mut self, id: NodeId, pre: &mut Vec<PathEvent>) {
        let Some(ctx) = self.pop_breakable(id) else {
            return;
        };
        let BreakableKind::Switch(data) = ctx.kind else {
            return;
        };
        let mut prevs = data.fallthrough;
        prevs.extend(ctx.breaks);
        if !data.saw_default {
            match data.chain {
                Some(chain) => prevs.extend(chain),
                None => prevs.extend(self.current()),
            }
        }
        self.advance_to(&prevs, false, id, pre);
    }

    fn leave_switch_case(&mut self, ast: &Ast, id: NodeId) {
        let Some(switch) = ast.parent(id) else {
            return;
        };
        let current = self.current();
        if let Some(BreakableCtx {
            kind: BreakableKind::Switch(data),
            ..
        }) = self.breakable_for(switch)
        {
            if data.body_created {
                data.fallthrough = current;
            } else {
                data.fallthrough.extend(current);
            }
            data.body_created = false;
        }
    }

    fn leave_break(&mut self, ast: &Ast, id: NodeId, pre: &mut Vec<PathEvent>) {
        let label = ast.node(id).value.clone();
        let current = self.current();
        let state = self.state();
        let target = state.breakable_stack.iter_mut().rev().find(|c| match &label {
            Some(l) => c.label.as_deref() == Some(l.as_str()),
            None => true,
        });
        if let Some(ctx) = target {
            ctx.breaks.extend(current.clone());
        } else if let Some(l) = &label {
            if let Some(ctx) = state.label_stack.iter_mut().rev().find(|c| &c.name == l) {
                ctx.breaks.extend(current.clone());
            }
        }
        self.advance_to(&current, true, id, pre);
    }

    fn leave_continue(&mut self, ast: &Ast, id: NodeId, pre: &mut Vec<PathEvent>) {
        let label = ast.node(id).value.clone();
        let current = self.current();
        let p = self.cur();
        let mut target_seg = None;
        if let Some(ctx) = self.states[p]
            .breakable_stack
            .iter_mut()
            .rev()
            .find(|c| {
                matches!(c.kind, BreakableKind::Loop(_))
                    && match &label {
                        Some(l) => c.label.as_deref() == Some(l.as_str()),
                        None => true,
                    }
            })
        {
            let is_do_while = ast.node(ctx.node).node_type == NodeType::DoWhileStatement;
            if let BreakableKind::Loop(data) = &mut ctx.kind {
                if is_do_while {
                    // The test segment does not exist yet; it picks
                    // these up as forward predecessors when created
                    data.pending_continues.extend(current.clone());
                } else if let Some(update) = data.update_seg {
                    // Forward jump into the update segment
                    target_seg = Some((update, false));
                } else if let Some(back) = data.test_seg.or(data.body_entry) {
                    target_seg = Some((back, true));
                }
            }
        }
        if let Some((target, looped)) = target_seg {
            for &s in &current {
                self.paths[p].add_edge(s, target, looped);
            }
        }
        self.advance_to(&current, true, id, pre);
    }
}

/// Label attached to a loop or switch through a labeled statement
fn label_of(ast: &Ast, id: NodeId) -> Option<String> {
    let parent = ast.parent(id)?;
    let node = ast.node(parent);
    if node.node_type == NodeType::LabeledStatement {
        node.value.clone()
    } else {
        None
    }
}
