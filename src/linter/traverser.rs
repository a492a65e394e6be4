/*!
# AST Traversal

Depth-first walk producing one enter and one exit step per node, in
the child order the parser stored. The engine drives the code path
analyzer and the event dispatch off this step sequence.
*/

use crate::parser::ast::{Ast, NodeId};

/// One step of a depth-first walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub node: NodeId,
    pub enter: bool,
}

/// Enter and exit steps for the subtree under `root`
pub fn steps(ast: &Ast, root: NodeId) -> Vec<Step> {
    let mut out = Vec::with_capacity(ast.len() * 2);
    // (node, false) frames expand to children, (node, true) emit exits
    let mut stack: Vec<(NodeId, bool)> = vec![(root, false)];
    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            out.push(Step { node, enter: false });
            continue;
        }
        out.push(Step { node, enter: true });
        stack.push((node, true));
        for &child in ast.children(node).iter().rev() {
            stack.push((child, false));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::parser::ast::NodeType;
    use crate::parser::{ParserAdapter, ReferenceParser};

    #[test]
    fn test_steps_are_balanced_and_nested() {
        let output = ReferenceParser::new().parse("if (a) foo();").unwrap();
        let ast = output.ast;
        let walk = steps(&ast, ast.root());

        assert_eq!(walk.len(), ast.len() * 2);
        assert_eq!(walk.first().unwrap().node, ast.root());
        assert!(walk.first().unwrap().enter);
        assert_eq!(walk.last().unwrap().node, ast.root());
        assert!(!walk.last().unwrap().enter);

        // Every node exits after it enters, children inside the parent
        let mut open = Vec::new();
        for step in &walk {
            if step.enter {
                open.push(step.node);
            } else {
                assert_eq!(open.pop(), Some(step.node));
            }
        }
        assert!(open.is_empty());
    }

    #[test]
    fn test_steps_visit_children_in_stored_order() {
        let output = ReferenceParser::new().parse("a; b;").unwrap();
        let ast = output.ast;
        let walk = steps(&ast, ast.root());
        let enters: Vec<NodeId> = walk.iter().filter(|s| s.enter).map(|s| s.node).collect();

        let root_children = ast.children(ast.root());
        let first = enters.iter().position(|&n| n == root_children[0]).unwrap();
        let second = enters.iter().position(|&n| n == root_children[1]).unwrap();
        assert!(first < second);
        assert_eq!(ast.node(root_children[0]).node_type, NodeType::ExpressionStatement);
    }
}
