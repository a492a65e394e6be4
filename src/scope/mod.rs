/*!
# Scope Analysis

Builds the scope tree the rule context exposes through `get_scope`.
Scopes are Global, Function and Catch; `var` declarations and function
declarations hoist to the nearest function (or global) scope, catch
scopes hold only their parameter. Name resolution walks the `upper`
chain at query time, so globals injected after analysis are visible
without a rebuild.
*/

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::parser::ast::{Ast, NodeId, NodeType};

pub type ScopeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeType {
    Global,
    Function,
    Catch,
}

/// Variable known to a scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    /// Whether assignment to the variable is allowed; false for
    /// read-only globals
    pub writeable: bool,
    /// Set by `mark_variable_as_used`
    pub used: bool,
    /// Declaring node, absent for injected globals
    pub node: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub scope_type: ScopeType,
    /// Node owning this scope: Program, function or catch clause
    pub block: NodeId,
    pub upper: Option<ScopeId>,
    pub child_scopes: Vec<ScopeId>,
    pub variables: Vec<Variable>,
}

impl Scope {
    pub fn get_variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScopeManager {
    scopes: Vec<Scope>,
    by_block: HashMap<NodeId, ScopeId>,
}

impl ScopeManager {
    /// Builds the scope tree for a parsed program
    pub fn analyze(ast: &Ast) -> Self {
        let mut manager = Self::default();
        let root = ast.root();
        let global = manager.new_scope(ScopeType::Global, root, None);
        manager.collect(ast, root, global, global);
        manager
    }

    fn new_scope(&mut self, scope_type: ScopeType, block: NodeId, upper: Option<ScopeId>) -> ScopeId {
        let id = self.scopes.len();
        self.scopes.push(Scope {
            scope_type,
            block,
            upper,
            child_scopes: Vec::new(),
            variables: Vec::new(),
        });
        if let Some(upper) = upper {
            self.scopes[upper].child_scopes.push(id);
        }
        self.by_block.insert(block, id);
        id
    }

    /// Walks `node`'s subtree collecting declarations. `var_scope` is
    /// where hoisted names land; `lexical_scope` is the parent for
    /// nested scopes (they differ inside catch bodies).
    fn collect(&mut self, ast: &Ast, node: NodeId, var_scope: ScopeId, lexical_scope: ScopeId) {
        for &child in ast.children(node) {
            match ast.node(child).node_type {
                NodeType::VariableDeclaration => {
                    for &declarator in ast.children(child) {
                        if let Some(name) = ast.node(declarator).value.clone() {
                            self.define(var_scope, name, true, Some(declarator));
                        }
                        self.collect(ast, declarator, var_scope, lexical_scope);
                    }
                }
                NodeType::FunctionDeclaration => {
                    if let Some(name) = ast.node(child).value.clone() {
                        self.define(var_scope, name, true, Some(child));
                    }
                    self.build_function(ast, child, lexical_scope);
                }
                NodeType::FunctionExpression => {
                    self.build_function(ast, child, lexical_scope);
                }
                NodeType::CatchClause => {
                    let catch = self.new_scope(ScopeType::Catch, child, Some(lexical_scope));
                    let children = ast.children(child);
                    if let Some(&param) = children.first() {
                        if let Some(name) = ast.node(param).value.clone() {
                            self.define(catch, name, true, Some(param));
                        }
                    }
                    if let Some(&body) = children.get(1) {
                        self.collect(ast, body, var_scope, catch);
                    }
                }
                _ => {
                    self.collect(ast, child, var_scope, lexical_scope);
                }
            }
        }
    }

    fn build_function(&mut self, ast: &Ast, function: NodeId, upper: ScopeId) {
        let scope = self.new_scope(ScopeType::Function, function, Some(upper));
        // Named function expressions see their own name
        if ast.node(function).node_type == NodeType::FunctionExpression {
            if let Some(name) = ast.node(function).value.clone() {
                self.define(scope, name, true, Some(function));
            }
        }
        let mut body = None;
        for &child in ast.children(function) {
            let node = ast.node(child);
            if node.node_type == NodeType::Identifier && node.flag("parameter") {
                if let Some(name) = node.value.clone() {
                    self.define(scope, name, true, Some(child));
                }
            } else {
                body = Some(child);
            }
        }
        if let Some(body) = body {
            self.collect(ast, body, scope, scope);
        }
    }

    fn define(&mut self, scope: ScopeId, name: String, writeable: bool, node: Option<NodeId>) {
        if self.scopes[scope].get_variable(&name).is_some() {
            return;
        }
        self.scopes[scope].variables.push(Variable {
            name,
            writeable,
            used: false,
            node,
        });
    }

    /// Adds a global, or updates its writeable flag when it exists
    pub fn define_global(&mut self, name: &str, writeable: bool) {
        let global = &mut self.scopes[0];
        if let Some(var) = global.variables.iter_mut().find(|v| v.name == name) {
            var.writeable = writeable;
        } else {
            global.variables.push(Variable {
                name: name.to_string(),
                writeable,
                used: false,
                node: None,
            });
        }
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn global_scope(&self) -> &Scope {
        &self.scopes[0]
    }

    pub fn scope_for_block(&self, block: NodeId) -> Option<ScopeId> {
        self.by_block.get(&block).copied()
    }

    /// Scope governing `node`: the nearest enclosing (or own)
    /// scope-creating node's scope
    pub fn innermost_scope(&self, ast: &Ast, node: NodeId) -> ScopeId {
        let mut current = Some(node);
        while let Some(id) = current {
            if ast.node(id).node_type.creates_scope() {
                if let Some(scope) = self.scope_for_block(id) {
                    return scope;
                }
            }
            current = ast.parent(id);
        }
        0
    }

    /// Resolves `name` from `from` outward
    pub fn resolve(&self, from: ScopeId, name: &str) -> Option<(ScopeId, &Variable)> {
        let mut current = Some(from);
        while let Some(id) = current {
            if let Some(var) = self.scopes[id].get_variable(name) {
                return Some((id, var));
            }
            current = self.scopes[id].upper;
        }
        None
    }

    /// Flags `name` as used in the first scope that knows it; false
    /// when no scope does
    pub fn mark_used(&mut self, from: ScopeId, name: &str) -> bool {
        let mut current = Some(from);
        while let Some(id) = current {
            if let Some(var) = self.scopes[id].variables.iter_mut().find(|v| v.name == name) {
                var.used = true;
                return true;
            }
            current = self.scopes[id].upper;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParserAdapter, ReferenceParser};
    use pretty_assertions::assert_eq;

    fn analyze(text: &str) -> (Ast, ScopeManager) {
        let output = ReferenceParser::new().parse(text).unwrap();
        let manager = ScopeManager::analyze(&output.ast);
        (output.ast, manager)
    }

    #[test]
    fn test_global_vars() {
        let (_, manager) = analyze("var a = 1; var b;");
        let global = manager.global_scope();
        assert_eq!(global.scope_type, ScopeType::Global);
        assert!(global.get_variable("a").is_some());
        assert!(global.get_variable("b").is_some());
    }

    #[test]
    fn test_function_scope_holds_params_and_vars() {
        let (ast, manager) = analyze("function f(x, y) { var z; }");
        let f = ast.children(ast.root())[0];
        let scope_id = manager.scope_for_block(f).unwrap();
        let scope = manager.scope(scope_id);
        assert_eq!(scope.scope_type, ScopeType::Function);
        for name in ["x", "y", "z"] {
            assert!(scope.get_variable(name).is_some(), "missing {}", name);
        }
        assert!(manager.global_scope().get_variable("f").is_some());
        assert!(manager.global_scope().get_variable("z").is_none());
    }

    #[test]
    fn test_catch_scope() {
        let (ast, manager) = analyze("try { foo(); } catch (e) { var v; bar(e); }");
        let try_stmt = ast.children(ast.root())[0];
        let clause = ast.children(try_stmt)[1];
        let catch_id = manager.scope_for_block(clause).unwrap();
        let catch = manager.scope(catch_id);
        assert_eq!(catch.scope_type, ScopeType::Catch);
        assert!(catch.get_variable("e").is_some());
        // var inside catch body hoists past the catch scope
        assert!(catch.get_variable("v").is_none());
        assert!(manager.global_scope().get_variable("v").is_some());
    }

    #[test]
    fn test_resolve_walks_upward() {
        let (ast, manager) = analyze("var g; function f() { var l; }");
        let f = ast.children(ast.root())[1];
        let scope_id = manager.scope_for_block(f).unwrap();
        let (found_in, _) = manager.resolve(scope_id, "g").unwrap();
        assert_eq!(found_in, 0);
        let (found_in, _) = manager.resolve(scope_id, "l").unwrap();
        assert_eq!(found_in, scope_id);
        assert!(manager.resolve(scope_id, "missing").is_none());
    }

    #[test]
    fn test_innermost_scope() {
        let (ast, manager) = analyze("function f() { foo(); }");
        let f = ast.children(ast.root())[0];
        let body = *ast.children(f).last().unwrap();
        let call_stmt = ast.children(body)[0];
        let f_scope = manager.scope_for_block(f).unwrap();
        assert_eq!(manager.innermost_scope(&ast, call_stmt), f_scope);
        assert_eq!(manager.innermost_scope(&ast, ast.root()), 0);
    }

    #[test]
    fn test_mark_used() {
        let (_, mut manager) = analyze("var a;");
        assert!(manager.mark_used(0, "a"));
        assert!(manager.global_scope().get_variable("a").unwrap().used);
        assert!(!manager.mark_used(0, "nope"));
    }

    #[test]
    fn test_define_global_updates_writeable() {
        let (_, mut manager) = analyze("foo();");
        manager.define_global("undef", false);
        manager.define_global("undef", true);
        let var = manager.global_scope().get_variable("undef").unwrap();
        assert!(var.writeable);
    }
}
