/*!
# Code Paths

A `CodePath` owns the segments of one traversable unit: the program
itself or one function body. Paths nest; `upper` points at the path
that was active when a function expression or declaration started a
new one.

`traverse_segments` walks the reachable segment graph depth-first,
visiting a segment only after all of its non-looped predecessors were
visited, with a controller that can break off the walk or skip a
branch.
*/

use serde::Serialize;

use super::segment::{CodePathSegment, SegmentId};

/// Index of a path within the analyzer's path list
pub type PathId = usize;

#[derive(Debug, Serialize)]
pub struct CodePath {
    /// Stable textual id, `"1"` for the first path of a run
    pub id: String,
    /// Index of the enclosing path, `None` for the program path
    pub upper: Option<PathId>,
    segments: Vec<CodePathSegment>,
    initial_segment: SegmentId,
    final_segments: Vec<SegmentId>,
    /// Creation counter feeding the `s<path>_<n>` ids
    counter: usize,
    /// Path number used in segment ids
    number: usize,
}

/// Bounds for `traverse_segments`
#[derive(Debug, Clone, Copy, Default)]
pub struct TraverseOptions {
    /// Segment to start from, defaults to the initial segment
    pub first: Option<SegmentId>,
    /// Segment to stop at: visited, but its successors are not expanded
    pub last: Option<SegmentId>,
}

/// Controls a running traversal from inside the callback
pub struct Controller {
    broken: bool,
    skip_requested: bool,
}

impl Controller {
    /// Stops the traversal entirely
    pub fn break_traversal(&mut self) {
        self.broken = true;
    }

    /// Suppresses callbacks until the skipped branch rejoins
    pub fn skip(&mut self) {
        self.skip_requested = true;
    }
}

impl CodePath {
    pub(crate) fn new(number: usize, upper: Option<PathId>) -> Self {
        let mut path = Self {
            id: number.to_string(),
            upper,
            segments: Vec::new(),
            initial_segment: 0,
            final_segments: Vec::new(),
            counter: 0,
            number,
        };
        path.initial_segment = path.new_segment(&[], false);
        path
    }

    pub fn initial_segment(&self) -> SegmentId {
        self.initial_segment
    }

    pub fn final_segments(&self) -> &[SegmentId] {
        &self.final_segments
    }

    pub fn segment(&self, id: SegmentId) -> &CodePathSegment {
        &self.segments[id]
    }

    pub fn segments(&self) -> &[CodePathSegment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Creates a segment wired to `prevs`. Reachability follows the
    /// predecessors unless `forced_unreachable`; edges to or from an
    /// unreachable segment live only in the `all_*` lists.
    pub(crate) fn new_segment(&mut self, prevs: &[SegmentId], forced_unreachable: bool) -> SegmentId {
        self.counter += 1;
        let id = self.segments.len();
        let mut deduped: Vec<SegmentId> = Vec::new();
        for &prev in prevs {
            if !deduped.contains(&prev) {
                deduped.push(prev);
            }
        }
        let reachable = !forced_unreachable
            && (deduped.is_empty() || deduped.iter().any(|&p| self.segments[p].reachable));
        self.segments.push(CodePathSegment::new(
            format!("s{}_{}", self.number, self.counter),
            reachable,
        ));
        for &prev in &deduped {
            self.wire(prev, id);
        }
        id
    }

    /// Adds an edge after the fact; `looped` marks a loop back edge
    pub(crate) fn add_edge(&mut self, from: SegmentId, to: SegmentId, looped: bool) {
        self.wire(from, to);
        if looped {
            self.segments[to].mark_looped_prev(from);
        }
    }

    fn wire(&mut self, from: SegmentId, to: SegmentId) {
        if self.segments[from].all_next_segments.contains(&to) {
            return;
        }
        self.segments[from].all_next_segments.push(to);
        self.segments[to].all_prev_segments.push(from);
        if self.segments[from].reachable && self.segments[to].reachable {
            self.segments[from].next_segments.push(to);
            self.segments[to].prev_segments.push(from);
        }
    }

    pub(crate) fn add_final_segment(&mut self, segment: SegmentId) {
        if !self.final_segments.contains(&segment) {
            self.final_segments.push(segment);
        }
    }

    /// Depth-first walk over the reachable segment graph.
    ///
    /// A segment is visited once, only after all of its non-looped
    /// predecessors were visited. The callback's controller can break
    /// the walk or skip the branch entered at the current segment.
    pub fn traverse_segments<F>(&self, options: TraverseOptions, mut callback: F)
    where
        F: FnMut(&CodePathSegment, &mut Controller),
    {
        let first = options.first.unwrap_or(self.initial_segment);
        let last = options.last;
        let mut visited = vec![false; self.segments.len()];
        let mut skipped_from: Option<SegmentId> = None;
        let mut stack: Vec<(SegmentId, usize)> = vec![(first, 0)];

        while let Some(&(segment, index)) = stack.last() {
            if index == 0 {
                if visited[segment] {
                    stack.pop();
                    continue;
                }
                let seg = &self.segments[segment];
                // Wait until all non-looped predecessors were visited
                if segment != first
                    && !seg.prev_segments.is_empty()
                    && !seg
                        .prev_segments
                        .iter()
                        .all(|&p| visited[p] || seg.is_looped_prev(p))
                {
                    stack.pop();
                    continue;
                }
                if let Some(skipped) = skipped_from {
                    if seg.prev_segments.contains(&skipped) {
                        skipped_from = None;
                    }
                }
                visited[segment] = true;
                if skipped_from.is_none() {
                    let mut controller = Controller {
                        broken: false,
                        skip_requested: false,
                    };
                    callback(seg, &mut controller);
                    if controller.broken {
                        return;
                    }
                    if controller.skip_requested {
                        if stack.len() < 2 {
                            return;
                        }
                        skipped_from = Some(stack[stack.len() - 2].0);
                    }
                    if Some(segment) == last {
                        stack.pop();
                        continue;
                    }
                }
            }

            let nexts = &self.segments[segment].next_segments;
            if index < nexts.len() {
                let next = nexts[index];
                let top = stack.last_mut().unwrap();
                if index + 1 < nexts.len() {
                    top.1 += 1;
                    stack.push((next, 0));
                } else {
                    // Tail position: reuse the frame
                    *top = (next, 0);
                }
            } else {
                stack.pop();
            }
        }
    }

    /// Traversal order of reachable segment ids, for tests and dumps
    pub fn traversed_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        self.traverse_segments(TraverseOptions::default(), |segment, _| {
            ids.push(segment.id.clone());
        });
        ids
    }
}
