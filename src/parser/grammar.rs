/*!
# Reference Grammar

Recursive-descent parser for the built-in JavaScript-like grammar,
building the arena AST. Child order is the traversal order the engine
relies on: `if` stores test, consequent, alternate; `for`-`in` stores
right, left, body; `do`-`while` stores body before test.

Semicolons may be omitted only before `}` and at end of input.
*/

use crate::core::position::{Position, Span};
use crate::parser::ast::{Ast, AstNode, NodeId, NodeType};
use crate::parser::lexer::{Token, TokenKind};
use crate::parser::ParseError;

const ASSIGNMENT_OPS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "<<=", ">>=", ">>>=", "&=", "|=", "^=",
];

/// Binary operator precedence tiers, loosest first
const BINARY_TIERS: &[&[&str]] = &[
    &["|"],
    &["^"],
    &["&"],
    &["==", "!=", "===", "!=="],
    &["<", ">", "<=", ">=", "in", "instanceof"],
    &["<<", ">>", ">>>"],
    &["+", "-"],
    &["*", "/", "%"],
];

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    ast: Ast,
    /// End position of the most recently consumed token
    last_end: Position,
    /// Suppresses the `in` binary operator inside classic `for` headers
    no_in: bool,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            ast: Ast::new(),
            last_end: Position::start(),
            no_in: false,
        }
    }

    /// Parses a complete program and returns the finished arena
    pub fn parse_program(mut self) -> Result<Ast, ParseError> {
        let start = self.current_start();
        let program = self.begin(NodeType::Program);
        while !self.at_end() {
            let stmt = self.parse_statement()?;
            self.ast.attach(program, stmt);
        }
        self.finish(program, start);
        self.ast.set_root(program);
        Ok(self.ast)
    }

    // ----- token helpers -----

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn current_start(&self) -> Position {
        self.peek().map(|t| t.span.start).unwrap_or(self.last_end)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos)?;
        self.last_end = token.span.end;
        self.pos += 1;
        Some(token)
    }

    fn check(&self, value: &str) -> bool {
        self.peek().map(|t| t.value == value).unwrap_or(false)
    }

    fn check_kind(&self, kind: TokenKind) -> bool {
        self.peek().map(|t| t.kind == kind).unwrap_or(false)
    }

    fn eat(&mut self, value: &str) -> bool {
        if self.check(value) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, value: &str) -> Result<(), ParseError> {
        if self.eat(value) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(token) => ParseError {
                message: format!("Unexpected token '{}'", token.value),
                line: token.span.start.line,
                column: token.span.start.column,
            },
            None => ParseError {
                message: "Unexpected end of input".to_string(),
                line: self.last_end.line,
                column: self.last_end.column,
            },
        }
    }

    /// Statement terminator: `;`, or nothing before `}` / end of input
    fn consume_semicolon(&mut self) -> Result<(), ParseError> {
        if self.eat(";") || self.check("}") || self.at_end() {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    // ----- node helpers -----

    fn begin(&mut self, node_type: NodeType) -> NodeId {
        self.ast
            .push(AstNode::new(node_type, Span::new(self.current_start(), self.current_start())))
    }

    fn finish(&mut self, id: NodeId, start: Position) {
        self.ast.node_mut(id).span = Span::new(start, self.last_end);
    }

    // ----- statements -----

    fn parse_statement(&mut self) -> Result<NodeId, ParseError> {
        let Some(token) = self.peek() else {
            return Err(self.unexpected());
        };
        let kind = token.kind;
        let value = token.value.clone();
        match value.as_str() {
            "{" => self.parse_block(),
            "var" | "let" | "const" => {
                let decl = self.parse_variable_declaration()?;
                self.consume_semicolon()?;
                Ok(decl)
            }
            "function" => self.parse_function(NodeType::FunctionDeclaration),
            ";" => {
                let start = self.current_start();
                let node = self.begin(NodeType::EmptyStatement);
                self.advance();
                self.finish(node, start);
                Ok(node)
            }
            "if" => self.parse_if(),
            "while" => self.parse_while(),
            "do" => self.parse_do_while(),
            "for" => self.parse_for(),
            "switch" => self.parse_switch(),
            "try" => self.parse_try(),
            "return" => self.parse_return(),
            "throw" => self.parse_throw(),
            "break" => self.parse_break_or_continue(NodeType::BreakStatement),
            "continue" => self.parse_break_or_continue(NodeType::ContinueStatement),
            _ => {
                if kind == TokenKind::Identifier
                    && self
                        .tokens
                        .get(self.pos + 1)
                        .map(|t| t.value == ":")
                        .unwrap_or(false)
                {
                    return self.parse_labeled();
                }
                self.parse_expression_statement()
            }
        }
    }

    fn parse_block(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_start();
        let block = self.begin(NodeType::BlockStatement);
        self.expect("{")?;
        while !self.check("}") {
            if self.at_end() {
                return Err(self.unexpected());
            }
            let stmt = self.parse_statement()?;
            self.ast.attach(block, stmt);
        }
        self.expect("}")?;
        self.finish(block, start);
        Ok(block)
    }

    /// Declaration without the trailing semicolon, shared with `for` headers
    fn parse_variable_declaration(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_start();
        let kind = self.advance().map(|t| t.value.clone()).unwrap_or_default();
        let decl = self.begin(NodeType::VariableDeclaration);
        self.ast.node_mut(decl).value = Some(kind);
        loop {
            let declarator = self.parse_variable_declarator()?;
            self.ast.attach(decl, declarator);
            if !self.eat(",") {
                break;
            }
        }
        self.finish(decl, start);
        Ok(decl)
    }

    fn parse_variable_declarator(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_start();
        let name = self.expect_identifier()?;
        let declarator = self.begin(NodeType::VariableDeclarator);
        self.ast.node_mut(declarator).value = Some(name);
        if self.eat("=") {
            let init = self.parse_assignment()?;
            self.ast.attach(declarator, init);
        }
        self.finish(declarator, start);
        Ok(declarator)
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if self.check_kind(TokenKind::Identifier) {
            Ok(self.advance().map(|t| t.value.clone()).unwrap_or_default())
        } else {
            Err(self.unexpected())
        }
    }

    /// Function declaration or expression: name, params, body block
    fn parse_function(&mut self, node_type: NodeType) -> Result<NodeId, ParseError> {
        let start = self.current_start();
        self.expect("function")?;
        let function = self.begin(node_type);
        if self.check_kind(TokenKind::Identifier) {
            let name = self.expect_identifier()?;
            self.ast.node_mut(function).value = Some(name);
        } else if node_type == NodeType::FunctionDeclaration {
            return Err(self.unexpected());
        }
        self.expect("(")?;
        while !self.check(")") {
            let param_start = self.current_start();
            let name = self.expect_identifier()?;
            let param = self.begin(NodeType::Identifier);
            self.ast.node_mut(param).value = Some(name);
            self.ast.node_mut(param).set_flag("parameter");
            self.finish(param, param_start);
            self.ast.attach(function, param);
            if !self.eat(",") {
                break;
            }
        }
        self.expect(")")?;
        let body = self.parse_block()?;
        self.ast.attach(function, body);
        self.finish(function, start);
        Ok(function)
    }

    fn parse_if(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_start();
        let node = self.begin(NodeType::IfStatement);
        self.expect("if")?;
        self.expect("(")?;
        let test = self.parse_expression()?;
        self.expect(")")?;
        self.ast.attach(node, test);
        let consequent = self.parse_statement()?;
        self.ast.attach(node, consequent);
        if self.eat("else") {
            let alternate = self.parse_statement()?;
            self.ast.attach(node, alternate);
        }
        self.finish(node, start);
        Ok(node)
    }

    fn parse_while(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_start();
        let node = self.begin(NodeType::WhileStatement);
        self.expect("while")?;
        self.expect("(")?;
        let test = self.parse_expression()?;
        self.expect(")")?;
        self.ast.attach(node, test);
        let body = self.parse_statement()?;
        self.ast.attach(node, body);
        self.finish(node, start);
        Ok(node)
    }

    fn parse_do_while(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_start();
        let node = self.begin(NodeType::DoWhileStatement);
        self.expect("do")?;
        let body = self.parse_statement()?;
        self.ast.attach(node, body);
        self.expect("while")?;
        self.expect("(")?;
        let test = self.parse_expression()?;
        self.expect(")")?;
        self.ast.attach(node, test);
        self.consume_semicolon()?;
        self.finish(node, start);
        Ok(node)
    }

    fn parse_for(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_start();
        self.expect("for")?;
        self.expect("(")?;

        // Classic for keeps [init?, test?, update?, body]; for-in keeps
        // [right, left, body] so the iteration source is visited first.
        let mut init: Option<NodeId> = None;
        if !self.eat(";") {
            if self.check("var") || self.check("let") || self.check("const") {
                self.no_in = true;
                let decl = self.parse_variable_declaration()?;
                self.no_in = false;
                if self.eat("in") {
                    return self.parse_for_in_tail(start, decl);
                }
                init = Some(decl);
            } else {
                self.no_in = true;
                let expr = self.parse_expression()?;
                self.no_in = false;
                if self.eat("in") {
                    return self.parse_for_in_tail(start, expr);
                }
                init = Some(expr);
            }
            self.expect(";")?;
        }

        let mut test: Option<NodeId> = None;
        if !self.check(";") {
            test = Some(self.parse_expression()?);
        }
        self.expect(";")?;

        let mut update: Option<NodeId> = None;
        if !self.check(")") {
            update = Some(self.parse_expression()?);
        }
        self.expect(")")?;

        let node = self.begin(NodeType::ForStatement);
        if let Some(init) = init {
            self.ast.node_mut(node).set_flag("has_init");
            self.ast.attach(node, init);
        }
        if let Some(test) = test {
            self.ast.node_mut(node).set_flag("has_test");
            self.ast.attach(node, test);
        }
        if let Some(update) = update {
            self.ast.node_mut(node).set_flag("has_update");
            self.ast.attach(node, update);
        }
        let body = self.parse_statement()?;
        self.ast.attach(node, body);
        self.finish(node, start);
        Ok(node)
    }

    fn parse_for_in_tail(&mut self, start: Position, left: NodeId) -> Result<NodeId, ParseError> {
        let right = self.parse_expression()?;
        self.expect(")")?;
        let node = self.begin(NodeType::ForInStatement);
        self.ast.attach(node, right);
        self.ast.attach(node, left);
        let body = self.parse_statement()?;
        self.ast.attach(node, body);
        self.finish(node, start);
        Ok(node)
    }

    fn parse_switch(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_start();
        let node = self.begin(NodeType::SwitchStatement);
        self.expect("switch")?;
        self.expect("(")?;
        let discriminant = self.parse_expression()?;
        self.expect(")")?;
        self.ast.attach(node, discriminant);
        self.expect("{")?;
        let mut seen_default = false;
        while !self.check("}") {
            if self.at_end() {
                return Err(self.unexpected());
            }
            let case_start = self.current_start();
            let case = self.begin(NodeType::SwitchCase);
            if self.eat("case") {
                let test = self.parse_expression()?;
                self.ast.node_mut(case).set_flag("has_test");
                self.ast.attach(case, test);
            } else if self.eat("default") {
                if seen_default {
                    return Err(self.unexpected());
                }
                seen_default = true;
            } else {
                return Err(self.unexpected());
            }
            self.expect(":")?;
            while !self.check("case") && !self.check("default") && !self.check("}") {
                if self.at_end() {
                    return Err(self.unexpected());
                }
                let stmt = self.parse_statement()?;
                self.ast.attach(case, stmt);
            }
            self.finish(case, case_start);
            self.ast.attach(node, case);
        }
        self.expect("}")?;
        self.finish(node, start);
        Ok(node)
    }

    fn parse_try(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_start();
        let node = self.begin(NodeType::TryStatement);
        self.expect("try")?;
        let block = self.parse_block()?;
        self.ast.attach(node, block);
        let mut has_clause = false;
        if self.eat("catch") {
            has_clause = true;
            self.ast.node_mut(node).set_flag("has_handler");
            let clause_start = self.current_start();
            let clause = self.begin(NodeType::CatchClause);
            self.expect("(")?;
            let param_start = self.current_start();
            let name = self.expect_identifier()?;
            let param = self.begin(NodeType::Identifier);
            self.ast.node_mut(param).value = Some(name);
            self.ast.node_mut(param).set_flag("parameter");
            self.finish(param, param_start);
            self.ast.attach(clause, param);
            self.expect(")")?;
            let body = self.parse_block()?;
            self.ast.attach(clause, body);
            self.finish(clause, clause_start);
            self.ast.attach(node, clause);
        }
        if self.eat("finally") {
            has_clause = true;
            self.ast.node_mut(node).set_flag("has_finalizer");
            let finalizer = self.parse_block()?;
            self.ast.attach(node, finalizer);
        }
        if !has_clause {
            return Err(self.unexpected());
        }
        self.finish(node, start);
        Ok(node)
    }

    fn parse_return(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_start();
        let node = self.begin(NodeType::ReturnStatement);
        self.expect("return")?;
        if !self.check(";") && !self.check("}") && !self.at_end() {
            let argument = self.parse_expression()?;
            self.ast.attach(node, argument);
        }
        self.consume_semicolon()?;
        self.finish(node, start);
        Ok(node)
    }

    fn parse_throw(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_start();
        let node = self.begin(NodeType::ThrowStatement);
        self.expect("throw")?;
        let argument = self.parse_expression()?;
        self.ast.attach(node, argument);
        self.consume_semicolon()?;
        self.finish(node, start);
        Ok(node)
    }

    fn parse_break_or_continue(&mut self, node_type: NodeType) -> Result<NodeId, ParseError> {
        let start = self.current_start();
        let node = self.begin(node_type);
        self.advance();
        if self.check_kind(TokenKind::Identifier) {
            let label = self.expect_identifier()?;
            self.ast.node_mut(node).value = Some(label);
        }
        self.consume_semicolon()?;
        self.finish(node, start);
        Ok(node)
    }

    fn parse_labeled(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_start();
        let label = self.expect_identifier()?;
        let node = self.begin(NodeType::LabeledStatement);
        self.ast.node_mut(node).value = Some(label);
        self.expect(":")?;
        let body = self.parse_statement()?;
        self.ast.attach(node, body);
        self.finish(node, start);
        Ok(node)
    }

    fn parse_expression_statement(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_start();
        let node = self.begin(NodeType::ExpressionStatement);
        let expr = self.parse_expression()?;
        self.ast.attach(node, expr);
        self.consume_semicolon()?;
        self.finish(node, start);
        Ok(node)
    }

    // ----- expressions -----

    fn parse_expression(&mut self) -> Result<NodeId, ParseError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_start();
        let left = self.parse_conditional()?;
        let Some(op) = self
            .peek()
            .filter(|t| ASSIGNMENT_OPS.contains(&t.value.as_str()))
            .map(|t| t.value.clone())
        else {
            return Ok(left);
        };
        self.advance();
        let node = self.begin(NodeType::AssignmentExpression);
        self.ast.node_mut(node).value = Some(op);
        self.ast.attach(node, left);
        let right = self.parse_assignment()?;
        self.ast.attach(node, right);
        self.finish(node, start);
        Ok(node)
    }

    fn parse_conditional(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_start();
        let test = self.parse_logical(0)?;
        if !self.eat("?") {
            return Ok(test);
        }
        let node = self.begin(NodeType::ConditionalExpression);
        self.ast.attach(node, test);
        let consequent = self.parse_assignment()?;
        self.ast.attach(node, consequent);
        self.expect(":")?;
        let alternate = self.parse_assignment()?;
        self.ast.attach(node, alternate);
        self.finish(node, start);
        Ok(node)
    }

    /// `||` then `&&`, both left-associative
    fn parse_logical(&mut self, level: usize) -> Result<NodeId, ParseError> {
        let op = ["||", "&&"][level];
        let start = self.current_start();
        let mut left = if level == 0 {
            self.parse_logical(1)?
        } else {
            self.parse_binary(0)?
        };
        while self.check(op) {
            self.advance();
            let node = self.begin(NodeType::LogicalExpression);
            self.ast.node_mut(node).value = Some(op.to_string());
            self.ast.attach(node, left);
            let right = if level == 0 {
                self.parse_logical(1)?
            } else {
                self.parse_binary(0)?
            };
            self.ast.attach(node, right);
            self.finish(node, start);
            left = node;
        }
        Ok(left)
    }

    fn parse_binary(&mut self, tier: usize) -> Result<NodeId, ParseError> {
        if tier >= BINARY_TIERS.len() {
            return self.parse_unary();
        }
        let start = self.current_start();
        let mut left = self.parse_binary(tier + 1)?;
        loop {
            let Some(op) = self
                .peek()
                .filter(|t| BINARY_TIERS[tier].contains(&t.value.as_str()))
                .map(|t| t.value.clone())
            else {
                break;
            };
            if op == "in" && self.no_in {
                break;
            }
            self.advance();
            let node = self.begin(NodeType::BinaryExpression);
            self.ast.node_mut(node).value = Some(op);
            self.ast.attach(node, left);
            let right = self.parse_binary(tier + 1)?;
            self.ast.attach(node, right);
            self.finish(node, start);
            left = node;
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<NodeId, ParseError> {
        let start = self.current_start();
        if let Some(op) = self
            .peek()
            .filter(|t| {
                matches!(
                    t.value.as_str(),
                    "!" | "~" | "+" | "-" | "typeof" | "void" | "delete"
                )
            })
            .map(|t| t.value.clone())
        {
            self.advance();
            let node = self.begin(NodeType::UnaryExpression);
            self.ast.node_mut(node).value = Some(op);
            let argument = self.parse_unary()?;
            self.ast.attach(node, argument);
            self.finish(node, start);
            return Ok(node);
        }
        if let Some(op) = self
            .peek()
            .filter(|t| t.value == "++" || t.value == "--")
            .map(|t| t.value.clone())
        {
            self.advance();
            let node = self.begin(NodeType::UpdateExpression);
            self.ast.node_mut(node).value = Some(op);
            self.ast.node_mut(node).set_flag("prefix");
            let argument = self.parse_unary()?;
            self.ast.attach(node, argument);
            self.finish(node, start);
            return Ok(node);
        }
        let expr = self.parse_call_member(false)?;
        if let Some(op) = self
            .peek()
            .filter(|t| t.value == "++" || t.value == "--")
            .map(|t| t.value.clone())
        {
            self.advance();
            let node = self.begin(NodeType::UpdateExpression);
            self.ast.node_mut(node).value = Some(op);
            self.ast.attach(node, expr);
            self.finish(node, start);
            return Ok(node);
        }
        Ok(expr)
    }

    /// Member and call chain; `new_callee` restricts the chain so
    /// `new a.b()` binds the arguments to the `new` expression.
    fn parse_call_member(&mut self, new_callee: bool) -> Result<NodeId, ParseError> {
        let start = self.current_start();
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(".") {
                let prop_start = self.current_start();
                let name = self.expect_identifier()?;
                let prop = self.begin(NodeType::Identifier);
                self.ast.node_mut(prop).value = Some(name);
                self.finish(prop, prop_start);
                let node = self.begin(NodeType::MemberExpression);
                self.ast.attach(node, expr);
                self.ast.attach(node, prop);
                self.finish(node, start);
                expr = node;
            } else if self.eat("[") {
                let prop = self.parse_expression()?;
                self.expect("]")?;
                let node = self.begin(NodeType::MemberExpression);
                self.ast.node_mut(node).set_flag("computed");
                self.ast.attach(node, expr);
                self.ast.attach(node, prop);
                self.finish(node, start);
                expr = node;
            } else if !new_callee && self.check("(") {
                let node = self.begin(NodeType::CallExpression);
                self.ast.attach(node, expr);
                self.parse_arguments(node)?;
                self.finish(node, start);
                expr = node;
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_arguments(&mut self, node: NodeId) -> Result<(), ParseError> {
        self.expect("(")?;
        while !self.check(")") {
            let arg = self.parse_assignment()?;
            self.ast.attach(node, arg);
            if !self.eat(",") {
                break;
            }
        }
        self.expect(")")
    }

    fn parse_primary(&mut self) -> Result<NodeId, ParseError> {
        let Some(token) = self.peek() else {
            return Err(self.unexpected());
        };
        let start = token.span.start;
        let token_kind = token.kind;
        let token_value = token.value.clone();
        match token_kind {
            TokenKind::Identifier => {
                let name = self.expect_identifier()?;
                let node = self.begin(NodeType::Identifier);
                self.ast.node_mut(node).value = Some(name);
                self.finish(node, start);
                Ok(node)
            }
            TokenKind::Numeric | TokenKind::String | TokenKind::Boolean | TokenKind::Null => {
                let kind = match token_kind {
                    TokenKind::Numeric => "number",
                    TokenKind::String => "string",
                    TokenKind::Boolean => "boolean",
                    _ => "null",
                };
                let value = self.advance().map(|t| t.value.clone()).unwrap_or_default();
                let node = self.begin(NodeType::Literal);
                self.ast.node_mut(node).value = Some(value);
                self.ast
                    .node_mut(node)
                    .attributes
                    .insert("kind".to_string(), kind.to_string());
                self.finish(node, start);
                Ok(node)
            }
            _ => match token_value.as_str() {
                "(" => {
                    self.advance();
                    let expr = self.parse_expression()?;
                    self.expect(")")?;
                    Ok(expr)
                }
                "[" => {
                    self.advance();
                    let node = self.begin(NodeType::ArrayExpression);
                    while !self.check("]") {
                        let element = self.parse_assignment()?;
                        self.ast.attach(node, element);
                        if !self.eat(",") {
                            break;
                        }
                    }
                    self.expect("]")?;
                    self.finish(node, start);
                    Ok(node)
                }
                "{" => self.parse_object(start),
                "function" => self.parse_function_expression(start),
                "new" => {
                    self.advance();
                    let node = self.begin(NodeType::NewExpression);
                    let callee = self.parse_call_member(true)?;
                    self.ast.attach(node, callee);
                    if self.check("(") {
                        self.parse_arguments(node)?;
                    }
                    self.finish(node, start);
                    Ok(node)
                }
                "this" => {
                    self.advance();
                    let node = self.begin(NodeType::Identifier);
                    self.ast.node_mut(node).value = Some("this".to_string());
                    self.finish(node, start);
                    Ok(node)
                }
                _ => Err(self.unexpected()),
            },
        }
    }

    fn parse_object(&mut self, start: Position) -> Result<NodeId, ParseError> {
        self.expect("{")?;
        let node = self.begin(NodeType::ObjectExpression);
        while !self.check("}") {
            let prop_start = self.current_start();
            let key = match self.peek().map(|t| t.kind) {
                Some(TokenKind::Identifier) | Some(TokenKind::Keyword) => {
                    let name = self.advance().map(|t| t.value.clone()).unwrap_or_default();
                    let key = self.begin(NodeType::Identifier);
                    self.ast.node_mut(key).value = Some(name);
                    self.finish(key, prop_start);
                    key
                }
                Some(TokenKind::String) | Some(TokenKind::Numeric) => {
                    let value = self.advance().map(|t| t.value.clone()).unwrap_or_default();
                    let key = self.begin(NodeType::Literal);
                    self.ast.node_mut(key).value = Some(value);
                    self.finish(key, prop_start);
                    key
                }
                _ => return Err(self.unexpected()),
            };
            let prop = self.begin(NodeType::Property);
            self.ast.attach(prop, key);
            self.expect(":")?;
            let value = self.parse_assignment()?;
            self.ast.attach(prop, value);
            self.finish(prop, prop_start);
            self.ast.attach(node, prop);
            if !self.eat(",") {
                break;
            }
        }
        self.expect("}")?;
        self.finish(node, start);
        Ok(node)
    }

    fn parse_function_expression(&mut self, start: Position) -> Result<NodeId, ParseError> {
        let function = self.parse_function(NodeType::FunctionExpression)?;
        self.finish(function, start);
        Ok(function)
    }
}
