/*!
# Code Path Segments

A segment is a maximal straight-line portion of a code path. Segments
keep two adjacency sets: `next_segments`/`prev_segments` hold edges
between reachable segments and drive `traverse_segments`, while
`all_next_segments`/`all_prev_segments` additionally include edges
touching unreachable segments (the continuation after a `return` or
`break` exists in the graph but is flagged unreachable).

Loop back edges are recorded on the target as looped predecessors so
the traversal's predecessor gate can ignore them.
*/

use serde::Serialize;

/// Index of a segment within its owning `CodePath`
pub type SegmentId = usize;

#[derive(Debug, Clone, Serialize)]
pub struct CodePathSegment {
    /// Stable textual id, `s<path>_<n>` with `n` in creation order
    pub id: String,
    /// Reachable successors, in edge creation order
    pub next_segments: Vec<SegmentId>,
    /// Reachable predecessors
    pub prev_segments: Vec<SegmentId>,
    /// Successors including unreachable ones
    pub all_next_segments: Vec<SegmentId>,
    /// Predecessors including unreachable ones
    pub all_prev_segments: Vec<SegmentId>,
    /// False for continuations after return/throw/break/continue
    pub reachable: bool,
    /// Predecessors reaching this segment through a loop back edge
    looped_prev: Vec<SegmentId>,
}

impl CodePathSegment {
    pub(crate) fn new(id: String, reachable: bool) -> Self {
        Self {
            id,
            next_segments: Vec::new(),
            prev_segments: Vec::new(),
            all_next_segments: Vec::new(),
            all_prev_segments: Vec::new(),
            reachable,
            looped_prev: Vec::new(),
        }
    }

    /// True when `prev` reaches this segment only through a back edge
    pub fn is_looped_prev(&self, prev: SegmentId) -> bool {
        self.looped_prev.contains(&prev)
    }

    pub(crate) fn mark_looped_prev(&mut self, prev: SegmentId) {
        if !self.looped_prev.contains(&prev) {
            self.looped_prev.push(prev);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looped_prev_marking() {
        let mut segment = CodePathSegment::new("s1_2".to_string(), true);
        assert!(!segment.is_looped_prev(3));
        segment.mark_looped_prev(3);
        segment.mark_looped_prev(3);
        assert!(segment.is_looped_prev(3));
        assert_eq!(segment.looped_prev.len(), 1);
    }
}
