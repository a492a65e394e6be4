/*!
# Event Dispatch

The engine turns the traversal into a stream of typed events: one
enter and one exit event per node, framed by code path and segment
lifecycle events from the analyzer. Rules subscribe by `EventKey`;
listeners of one key fire in rule activation order.
*/

use crate::code_path::{CodePath, CodePathSegment};
use crate::parser::ast::{AstNode, NodeId, NodeType};

/// Subscription key of a rule listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKey {
    Enter(NodeType),
    Exit(NodeType),
    CodePathStart,
    CodePathEnd,
    SegmentStart,
    SegmentEnd,
}

/// Payload handed to a listener
pub enum Event<'a> {
    Node {
        node: &'a AstNode,
        id: NodeId,
        exit: bool,
    },
    CodePath {
        path: &'a CodePath,
        /// Node that owns the path: the program or a function
        node: &'a AstNode,
        id: NodeId,
        start: bool,
    },
    Segment {
        segment: &'a CodePathSegment,
        path: &'a CodePath,
        /// Node the traversal was at when the segment started or ended
        node: &'a AstNode,
        id: NodeId,
        start: bool,
    },
}

impl<'a> Event<'a> {
    /// Node the event is anchored at
    pub fn node(&self) -> &'a AstNode {
        match self {
            Event::Node { node, .. } | Event::CodePath { node, .. } | Event::Segment { node, .. } => {
                node
            }
        }
    }

    pub fn node_id(&self) -> NodeId {
        match self {
            Event::Node { id, .. } | Event::CodePath { id, .. } | Event::Segment { id, .. } => *id,
        }
    }

    /// Code path of a path or segment event
    pub fn code_path(&self) -> Option<&'a CodePath> {
        match self {
            Event::Node { .. } => None,
            Event::CodePath { path, .. } | Event::Segment { path, .. } => Some(path),
        }
    }

    pub fn segment(&self) -> Option<&'a CodePathSegment> {
        match self {
            Event::Segment { segment, .. } => Some(segment),
            _ => None,
        }
    }
}
