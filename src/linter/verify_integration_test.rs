use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::json;

use crate::config::LintConfig;
use crate::core::errors::EngineError;
use crate::diagnostics::Severity;
use crate::parser::ast::NodeType;
use crate::rules::{Rule, RuleInit, RuleListeners, RuleMeta};

use super::context::Report;
use super::events::EventKey;
use super::Linter;

struct NoEval;

impl Rule for NoEval {
    fn meta(&self) -> RuleMeta {
        RuleMeta::new("no-eval")
            .description("disallow eval()")
            .message("unexpected", "{{name}} can be harmful.")
    }

    fn create(&self, _init: &RuleInit<'_>) -> RuleListeners {
        RuleListeners::new().enter(NodeType::Identifier, |ctx, event| {
            if event.node().value.as_deref() == Some("eval") {
                ctx.report(
                    Report::on(event.node_id())
                        .message_id("unexpected")
                        .data("name", "eval"),
                )?;
            }
            Ok(())
        })
    }
}

struct MaxParams;

impl Rule for MaxParams {
    fn meta(&self) -> RuleMeta {
        RuleMeta::new("max-params")
            .description("limit function parameters")
            .schema(vec![json!({"type": "integer"})])
    }

    fn create(&self, init: &RuleInit<'_>) -> RuleListeners {
        let max = init.options.first().and_then(|v| v.as_u64()).unwrap_or(3) as usize;
        RuleListeners::new().enter(NodeType::FunctionDeclaration, move |ctx, event| {
            let params = ctx
                .source_code()
                .ast()
                .children(event.node_id())
                .iter()
                .filter(|&&c| ctx.source_code().node(c).flag("parameter"))
                .count();
            if params > max {
                ctx.report(Report::on(event.node_id()).message(format!(
                    "This function has too many parameters ({params}). Maximum allowed is {max}."
                )))?;
            }
            Ok(())
        })
    }
}

struct RequireAnswer;

impl Rule for RequireAnswer {
    fn meta(&self) -> RuleMeta {
        RuleMeta::new("require-answer").message("missing", "'answer' is not defined.")
    }

    fn create(&self, _init: &RuleInit<'_>) -> RuleListeners {
        RuleListeners::new().exit(NodeType::Program, |ctx, event| {
            if ctx.get_scope().get_variable("answer").is_none() {
                ctx.report(Report::on(event.node_id()).message_id("missing"))?;
            }
            Ok(())
        })
    }
}

#[derive(Default)]
struct PathSpy {
    starts: Rc<RefCell<Vec<String>>>,
    segments: Rc<RefCell<Vec<String>>>,
}

impl Rule for PathSpy {
    fn meta(&self) -> RuleMeta {
        RuleMeta::new("path-spy")
    }

    fn create(&self, _init: &RuleInit<'_>) -> RuleListeners {
        let starts = Rc::clone(&self.starts);
        let segments = Rc::clone(&self.segments);
        RuleListeners::new()
            .on(EventKey::CodePathStart, move |_ctx, event| {
                if let Some(path) = event.code_path() {
                    starts.borrow_mut().push(path.id.clone());
                }
                Ok(())
            })
            .on(EventKey::SegmentStart, move |_ctx, event| {
                if let Some(segment) = event.segment() {
                    segments.borrow_mut().push(segment.id.clone());
                }
                Ok(())
            })
    }
}

fn config_with(rule: &str, value: serde_json::Value) -> LintConfig {
    let mut config = LintConfig::new();
    config.set_rule(rule, value);
    config
}

#[test]
fn test_verify_reports_with_position_and_source() {
    let mut linter = Linter::new();
    linter.define_rule(Rc::new(NoEval));
    let messages = linter
        .verify("foo();\neval('x');\n", &config_with("no-eval", json!(2)))
        .unwrap();

    assert_eq!(messages.len(), 1);
    let message = &messages[0];
    assert_eq!(message.message, "eval can be harmful.");
    assert_eq!(message.rule_id.as_deref(), Some("no-eval"));
    assert_eq!(message.severity, Severity::Error);
    assert_eq!((message.line, message.column), (2, 1));
    assert_eq!(message.source.as_deref(), Some("eval"));
    assert_eq!(message.node_type, Some(NodeType::Identifier));
    assert!(!message.fatal);
}

#[test]
fn test_severity_words() {
    let mut linter = Linter::new();
    linter.define_rule(Rc::new(NoEval));
    let messages = linter
        .verify("eval('x');", &config_with("no-eval", json!("warn")))
        .unwrap();
    assert_eq!(messages[0].severity, Severity::Warning);
}

#[test]
fn test_unknown_rule_is_an_error() {
    let mut linter = Linter::new();
    let err = linter
        .verify("a;", &config_with("no-such-rule", json!(2)))
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownRule(name) if name == "no-such-rule"));
}

#[test]
fn test_disabled_unknown_rule_is_ignored() {
    let mut linter = Linter::new();
    let messages = linter
        .verify("a;", &config_with("no-such-rule", json!(0)))
        .unwrap();
    assert!(messages.is_empty());
}

#[test]
fn test_rule_options_and_validation() {
    let mut linter = Linter::new();
    linter.define_rule(Rc::new(MaxParams));

    let messages = linter
        .verify(
            "function f(a, b, c) { return a; }",
            &config_with("max-params", json!([2, 2])),
        )
        .unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].message.contains("(3)"));

    let err = linter
        .verify(
            "function f(a) {}",
            &config_with("max-params", json!([2, "two"])),
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRuleOptions { .. }));
}

#[test]
fn test_parse_error_becomes_fatal_message() {
    let mut linter = Linter::new();
    let messages = linter.verify("var = ;", &LintConfig::new()).unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].fatal);
    assert!(messages[0].message.starts_with("Parsing error:"));
    assert_eq!(messages[0].rule_id, None);
    assert_eq!(messages[0].line, 1);
}

#[test]
fn test_empty_text_yields_no_messages() {
    let mut linter = Linter::new();
    linter.define_rule(Rc::new(NoEval));
    let messages = linter
        .verify("  \n\t\n", &config_with("no-eval", json!(2)))
        .unwrap();
    assert!(messages.is_empty());
    assert!(linter.source_code().is_none());
}

#[test]
fn test_inline_eslint_directive_activates_rule() {
    let mut linter = Linter::new();
    linter.define_rule(Rc::new(NoEval));
    let messages = linter
        .verify("/* eslint no-eval: 2 */\neval('x');", &LintConfig::new())
        .unwrap();
    assert_eq!(messages.len(), 1);
    assert!(!messages[0].fatal);
    assert_eq!(messages[0].rule_id.as_deref(), Some("no-eval"));
    assert_eq!(messages[0].line, 2);
}

#[test]
fn test_inline_directive_overrides_config_severity() {
    let mut linter = Linter::new();
    linter.define_rule(Rc::new(NoEval));
    let messages = linter
        .verify(
            "/* eslint no-eval: 1 */\neval('x');",
            &config_with("no-eval", json!(2)),
        )
        .unwrap();
    assert_eq!(messages[0].severity, Severity::Warning);
}

#[test]
fn test_global_directive_defines_variable() {
    let mut linter = Linter::new();
    linter.define_rule(Rc::new(RequireAnswer));
    let config = config_with("require-answer", json!(2));

    let messages = linter.verify("answer;", &config).unwrap();
    assert_eq!(messages.len(), 1);

    let messages = linter
        .verify("/* global answer */\nanswer;", &config)
        .unwrap();
    assert!(messages.is_empty());
}

#[test]
fn test_config_globals_and_envs() {
    let mut linter = Linter::new();
    linter.define_rule(Rc::new(RequireAnswer));
    let mut config = config_with("require-answer", json!(2));
    config.globals.insert("answer".to_string(), json!(true));
    assert!(linter.verify("answer;", &config).unwrap().is_empty());

    let scopes = linter.scope_manager().unwrap();
    assert!(scopes.global_scope().get_variable("parseInt").is_some());
    assert!(scopes.global_scope().get_variable("process").is_none());

    let mut config = LintConfig::new();
    config.env.insert("node".to_string(), json!(true));
    linter.verify("require('x');", &config).unwrap();
    let scopes = linter.scope_manager().unwrap();
    assert!(scopes.global_scope().get_variable("process").is_some());
}

#[test]
fn test_code_path_events_reach_rules() {
    let spy = Rc::new(PathSpy::default());
    let starts = Rc::clone(&spy.starts);
    let segments = Rc::clone(&spy.segments);

    let mut linter = Linter::new();
    linter.define_rule(spy);
    linter
        .verify(
            "if (a) { foo(); }\nfunction f() { return 1; }",
            &config_with("path-spy", json!(2)),
        )
        .unwrap();

    assert_eq!(*starts.borrow(), vec!["1", "2"]);
    assert_eq!(*segments.borrow(), vec!["s1_1", "s1_2", "s1_3", "s2_1"]);
}

#[test]
fn test_messages_follow_emission_order() {
    let mut linter = Linter::new();
    linter.define_rule(Rc::new(NoEval));
    linter.define_rule(Rc::new(RequireAnswer));
    let mut config = LintConfig::new();
    config.set_rule("no-eval", json!(1));
    config.set_rule("require-answer", json!(2));

    let messages = linter.verify("eval('x');", &config).unwrap();
    assert_eq!(messages.len(), 2);
    // Node events precede the program exit report
    assert_eq!(messages[0].rule_id.as_deref(), Some("no-eval"));
    assert_eq!(messages[1].rule_id.as_deref(), Some("require-answer"));
}

#[test]
fn test_repeated_verify_is_idempotent() {
    let mut linter = Linter::new();
    linter.define_rule(Rc::new(NoEval));
    let config = config_with("no-eval", json!(2));
    let text = "foo();\neval('x');\neval('y');\n";

    let first = linter.verify(text, &config).unwrap();
    let second = linter.verify(text, &config).unwrap();
    assert_eq!(first.len(), 2);
    let render = |m: &[crate::diagnostics::LintMessage]| {
        m.iter().map(ToString::to_string).collect::<Vec<_>>()
    };
    assert_eq!(render(&first), render(&second));
}

#[test]
fn test_source_code_available_after_verify() {
    let mut linter = Linter::new();
    linter.verify("var x = 1;", &LintConfig::new()).unwrap();
    let source = linter.source_code().unwrap();
    assert_eq!(source.text(), "var x = 1;");
    assert!(source.tokens().len() > 3);
    linter.reset();
    assert!(linter.source_code().is_none());
}
