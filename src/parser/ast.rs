/*!
# Abstract Syntax Tree

Arena-backed AST shared by the parser, the traverser and the rules.
Nodes live in a flat vector and refer to each other through `NodeId`
indices; every node keeps a link to its parent so rule contexts can
walk ancestor chains without rebuilding them.
*/

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::core::position::Span;

/// Index of a node in the AST arena
pub type NodeId = usize;

/// Closed set of node kinds produced by the parser.
///
/// Adapters for other grammars map unknown constructs to `Unknown`;
/// the engine traverses them but rules cannot subscribe to them by a
/// more specific name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Program,
    FunctionDeclaration,
    FunctionExpression,
    VariableDeclaration,
    VariableDeclarator,
    BlockStatement,
    EmptyStatement,
    ExpressionStatement,
    IfStatement,
    WhileStatement,
    DoWhileStatement,
    ForStatement,
    ForInStatement,
    SwitchStatement,
    SwitchCase,
    TryStatement,
    CatchClause,
    ReturnStatement,
    ThrowStatement,
    BreakStatement,
    ContinueStatement,
    LabeledStatement,
    AssignmentExpression,
    ConditionalExpression,
    LogicalExpression,
    BinaryExpression,
    UnaryExpression,
    UpdateExpression,
    CallExpression,
    NewExpression,
    MemberExpression,
    ArrayExpression,
    ObjectExpression,
    Property,
    Identifier,
    Literal,
    Unknown,
}

impl NodeType {
    /// True for node kinds that own a lexical scope
    pub fn creates_scope(&self) -> bool {
        matches!(
            self,
            NodeType::Program
                | NodeType::FunctionDeclaration
                | NodeType::FunctionExpression
                | NodeType::CatchClause
        )
    }

    /// True for function-like nodes that start a nested code path
    pub fn is_function(&self) -> bool {
        matches!(
            self,
            NodeType::FunctionDeclaration | NodeType::FunctionExpression
        )
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Structural role a child node plays inside its parent.
///
/// The traverser visits children in stored order; the code path
/// analyzer keys its fork and join points off these roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildRole {
    Init,
    Test,
    Update,
    Consequent,
    Alternate,
    Body,
    Left,
    Right,
    Discriminant,
    CaseTest,
    CaseBody,
    TryBlock,
    Handler,
    Finalizer,
    Other,
}

/// Single node in the arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstNode {
    pub node_type: NodeType,
    pub span: Span,
    /// Primary payload: identifier name, operator, literal text, label
    pub value: Option<String>,
    /// Secondary shape flags, e.g. `has_test` on a switch case
    pub attributes: HashMap<String, String>,
    /// Children in visitation order
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

impl AstNode {
    pub fn new(node_type: NodeType, span: Span) -> Self {
        Self {
            node_type,
            span,
            value: None,
            attributes: HashMap::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn with_value(node_type: NodeType, span: Span, value: impl Into<String>) -> Self {
        let mut node = Self::new(node_type, span);
        node.value = Some(value.into());
        node
    }

    pub fn flag(&self, name: &str) -> bool {
        self.attributes.get(name).map(|v| v == "true").unwrap_or(false)
    }

    pub fn set_flag(&mut self, name: &str) {
        self.attributes.insert(name.to_string(), "true".to_string());
    }
}

/// Arena holding every node of one parse
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ast {
    nodes: Vec<AstNode>,
    root: NodeId,
}

impl Ast {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: 0,
        }
    }

    /// Adds a node to the arena without attaching it anywhere
    pub fn push(&mut self, node: AstNode) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        id
    }

    /// Appends `child` to `parent`'s children and records the back link
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &AstNode {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut AstNode {
        &mut self.nodes[id]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Position of `child` within `parent`'s child list
    pub fn child_index(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.nodes[parent].children.iter().position(|&c| c == child)
    }

    /// Classifies the role `child` plays inside `parent`
    pub fn child_role(&self, parent: NodeId, child: NodeId) -> ChildRole {
        let Some(index) = self.child_index(parent, child) else {
            return ChildRole::Other;
        };
        let p = &self.nodes[parent];
        match p.node_type {
            NodeType::IfStatement | NodeType::ConditionalExpression => match index {
                0 => ChildRole::Test,
                1 => ChildRole::Consequent,
                _ => ChildRole::Alternate,
            },
            NodeType::WhileStatement => match index {
                0 => ChildRole::Test,
                _ => ChildRole::Body,
            },
            NodeType::DoWhileStatement => match index {
                0 => ChildRole::Body,
                _ => ChildRole::Test,
            },
            NodeType::ForStatement => {
                let mut slot = 0;
                for (flag, role) in [
                    ("has_init", ChildRole::Init),
                    ("has_test", ChildRole::Test),
                    ("has_update", ChildRole::Update),
                ] {
                    if p.flag(flag) {
                        if index == slot {
                            return role;
                        }
                        slot += 1;
                    }
                }
                ChildRole::Body
            }
            NodeType::ForInStatement => match index {
                0 => ChildRole::Right,
                1 => ChildRole::Left,
                _ => ChildRole::Body,
            },
            NodeType::SwitchStatement => match index {
                0 => ChildRole::Discriminant,
                _ => ChildRole::Other,
            },
            NodeType::SwitchCase => {
                if p.flag("has_test") && index == 0 {
                    ChildRole::CaseTest
                } else {
                    ChildRole::CaseBody
                }
            }
            NodeType::TryStatement => match index {
                0 => ChildRole::TryBlock,
                1 => {
                    if p.flag("has_handler") {
                        ChildRole::Handler
                    } else {
                        ChildRole::Finalizer
                    }
                }
                _ => ChildRole::Finalizer,
            },
            NodeType::LogicalExpression => match index {
                0 => ChildRole::Left,
                _ => ChildRole::Right,
            },
            NodeType::LabeledStatement => ChildRole::Body,
            _ => ChildRole::Other,
        }
    }

    /// Ancestor chain of `id` from the root down to its direct parent
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.nodes[id].parent;
        while let Some(p) = current {
            chain.push(p);
            current = self.nodes[p].parent;
        }
        chain.reverse();
        chain
    }

    /// Structural hash over the whole arena.
    ///
    /// Computed once after parsing and again after traversal; a
    /// difference means a rule mutated the tree.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.root.hash(&mut hasher);
        for node in &self.nodes {
            node.node_type.hash(&mut hasher);
            node.span.start.offset.hash(&mut hasher);
            node.span.end.offset.hash(&mut hasher);
            node.value.hash(&mut hasher);
            node.children.hash(&mut hasher);
            node.parent.hash(&mut hasher);
            let mut attrs: Vec<_> = node.attributes.iter().collect();
            attrs.sort();
            attrs.hash(&mut hasher);
        }
        hasher.finish()
    }
}
