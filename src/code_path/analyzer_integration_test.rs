use pretty_assertions::assert_eq;

use crate::parser::ast::{Ast, NodeId};
use crate::parser::{ParserAdapter, ReferenceParser};

use super::analyzer::{CodePathAnalyzer, PathEvent};
use super::path::{CodePath, TraverseOptions};
use super::segment::SegmentId;

fn walk(ast: &Ast, id: NodeId, analyzer: &mut CodePathAnalyzer, events: &mut Vec<PathEvent>) {
    events.extend(analyzer.enter(ast, id));
    for index in 0..ast.children(id).len() {
        let child = ast.children(id)[index];
        walk(ast, child, analyzer, events);
    }
    let (pre, post) = analyzer.leave(ast, id);
    events.extend(pre);
    events.extend(post);
}

fn analyze(source: &str) -> (CodePathAnalyzer, Vec<PathEvent>) {
    let output = ReferenceParser::new().parse(source).unwrap();
    let mut analyzer = CodePathAnalyzer::new();
    let mut events = Vec::new();
    walk(&output.ast, output.ast.root(), &mut analyzer, &mut events);
    (analyzer, events)
}

fn ids(path: &CodePath, segments: &[SegmentId]) -> Vec<String> {
    segments
        .iter()
        .map(|&s| path.segment(s).id.clone())
        .collect()
}

fn find(path: &CodePath, id: &str) -> SegmentId {
    path.segments()
        .iter()
        .position(|s| s.id == id)
        .unwrap_or_else(|| panic!("no segment {id}"))
}

fn render(analyzer: &CodePathAnalyzer, events: &[PathEvent]) -> Vec<String> {
    events
        .iter()
        .map(|event| match *event {
            PathEvent::Start { path, .. } => format!("path-start {}", analyzer.path(path).id),
            PathEvent::End { path, .. } => format!("path-end {}", analyzer.path(path).id),
            PathEvent::SegmentStart { path, segment, .. } => {
                format!("segment-start {}", analyzer.path(path).segment(segment).id)
            }
            PathEvent::SegmentEnd { path, segment, .. } => {
                format!("segment-end {}", analyzer.path(path).segment(segment).id)
            }
        })
        .collect()
}

#[test]
fn test_if_else_forks_and_joins() {
    let (analyzer, _) = analyze("if (a) { foo(); } else { bar(); } baz();");
    let path = analyzer.path(0);
    assert_eq!(path.segment_count(), 4);
    assert_eq!(path.traversed_ids(), vec!["s1_1", "s1_2", "s1_3", "s1_4"]);
    let join = find(path, "s1_4");
    assert_eq!(
        ids(path, &path.segment(join).prev_segments),
        vec!["s1_2", "s1_3"]
    );
    assert_eq!(ids(path, path.final_segments()), vec!["s1_4"]);
}

#[test]
fn test_if_without_else_joins_with_origin() {
    let (analyzer, _) = analyze("if (a) foo(); bar();");
    let path = analyzer.path(0);
    assert_eq!(path.segment_count(), 3);
    let join = find(path, "s1_3");
    assert_eq!(
        ids(path, &path.segment(join).prev_segments),
        vec!["s1_2", "s1_1"]
    );
}

#[test]
fn test_if_event_order() {
    let (analyzer, events) = analyze("if (a) foo();");
    assert_eq!(
        render(&analyzer, &events),
        vec![
            "path-start 1",
            "segment-start s1_1",
            "segment-end s1_1",
            "segment-start s1_2",
            "segment-end s1_2",
            "segment-start s1_3",
            "segment-end s1_3",
            "path-end 1",
        ]
    );
}

#[test]
fn test_conditional_expression_forks() {
    let (analyzer, _) = analyze("var x = a ? b : c; foo();");
    let path = analyzer.path(0);
    assert_eq!(path.segment_count(), 4);
    assert_eq!(path.traversed_ids(), vec!["s1_1", "s1_2", "s1_3", "s1_4"]);
}

#[test]
fn test_logical_expression_short_circuit() {
    let (analyzer, _) = analyze("var x = a || b; foo();");
    let path = analyzer.path(0);
    assert_eq!(path.segment_count(), 3);
    let join = find(path, "s1_3");
    assert_eq!(
        ids(path, &path.segment(join).prev_segments),
        vec!["s1_2", "s1_1"]
    );
}

#[test]
fn test_while_loop_back_edge() {
    let (analyzer, _) = analyze("while (a) { foo(); } bar();");
    let path = analyzer.path(0);
    assert_eq!(path.segment_count(), 4);
    let test = find(path, "s1_2");
    let body = find(path, "s1_3");
    assert!(path.segment(test).is_looped_prev(body));
    assert_eq!(path.traversed_ids(), vec!["s1_1", "s1_2", "s1_3", "s1_4"]);
    let after = find(path, "s1_4");
    assert_eq!(ids(path, &path.segment(after).prev_segments), vec!["s1_2"]);
}

#[test]
fn test_do_while_loop() {
    let (analyzer, _) = analyze("do { foo(); } while (a); bar();");
    let path = analyzer.path(0);
    assert_eq!(path.segment_count(), 4);
    let body = find(path, "s1_2");
    let test = find(path, "s1_3");
    assert!(path.segment(body).is_looped_prev(test));
    assert_eq!(path.traversed_ids(), vec!["s1_1", "s1_2", "s1_3", "s1_4"]);
}

#[test]
fn test_do_while_continue_jumps_forward_to_test() {
    let (analyzer, _) = analyze("do { if (a) continue; foo(); } while (b); bar();");
    let path = analyzer.path(0);
    let test = find(path, "s1_6");
    // The continue frontier and the body exit both feed the test
    assert_eq!(
        ids(path, &path.segment(test).prev_segments),
        vec!["s1_5", "s1_3"]
    );
    assert!(!path.segment(test).is_looped_prev(find(path, "s1_3")));
}

#[test]
fn test_for_loop_update_segment_order() {
    let (analyzer, _) = analyze("for (var i = 0; i < 3; i++) { foo(); } bar();");
    let path = analyzer.path(0);
    assert_eq!(path.segment_count(), 5);
    // s1_3 is the update, created before the body but traversed after
    assert_eq!(
        path.traversed_ids(),
        vec!["s1_1", "s1_2", "s1_4", "s1_3", "s1_5"]
    );
    let test = find(path, "s1_2");
    let update = find(path, "s1_3");
    assert!(path.segment(test).is_looped_prev(update));
    let after = find(path, "s1_5");
    assert_eq!(ids(path, &path.segment(after).prev_segments), vec!["s1_2"]);
}

#[test]
fn test_for_without_test_never_exits() {
    let (analyzer, _) = analyze("for (;;) { foo(); }");
    let path = analyzer.path(0);
    // initial, body, unreachable after
    assert_eq!(path.segment_count(), 3);
    let body = find(path, "s1_2");
    assert!(path.segment(body).is_looped_prev(body));
    assert!(!path.segment(find(path, "s1_3")).reachable);
    assert!(path.final_segments().is_empty());
}

#[test]
fn test_for_in_iteration_segment() {
    let (analyzer, _) = analyze("for (var key in obj) { foo(); } bar();");
    let path = analyzer.path(0);
    assert_eq!(path.segment_count(), 4);
    let iter = find(path, "s1_2");
    let body = find(path, "s1_3");
    assert!(path.segment(iter).is_looped_prev(body));
    assert_eq!(path.traversed_ids(), vec!["s1_1", "s1_2", "s1_3", "s1_4"]);
}

#[test]
fn test_switch_with_break_and_fallthrough_chain() {
    let (analyzer, _) = analyze("switch (a) { case 0: foo(); break; case 1: bar(); } baz();");
    let path = analyzer.path(0);
    assert_eq!(path.segment_count(), 6);
    // s1_3 is the dead continuation after break
    assert!(!path.segment(find(path, "s1_3")).reachable);
    assert_eq!(
        path.traversed_ids(),
        vec!["s1_1", "s1_2", "s1_4", "s1_5", "s1_6"]
    );
    let after = find(path, "s1_6");
    assert_eq!(
        ids(path, &path.segment(after).prev_segments),
        vec!["s1_5", "s1_2", "s1_4"]
    );
    // The fallthrough edge from the dead continuation survives in all_prev
    assert_eq!(
        ids(path, &path.segment(find(path, "s1_5")).all_prev_segments),
        vec!["s1_4", "s1_3"]
    );
}

#[test]
fn test_switch_empty_cases_merge_into_one_body() {
    let (analyzer, _) = analyze("switch (a) { case 1: case 2: foo(); } bar();");
    let path = analyzer.path(0);
    assert_eq!(path.segment_count(), 4);
    assert_eq!(path.traversed_ids(), vec!["s1_1", "s1_2", "s1_3", "s1_4"]);
    // Both case entries flow into the shared body segment
    let body = find(path, "s1_3");
    assert_eq!(
        ids(path, &path.segment(body).prev_segments),
        vec!["s1_2", "s1_1"]
    );
    // Fall-out joins the body exit with the unmatched chain
    let after = find(path, "s1_4");
    assert_eq!(
        ids(path, &path.segment(after).prev_segments),
        vec!["s1_3", "s1_2"]
    );
    assert_eq!(ids(path, path.final_segments()), vec!["s1_4"]);
}

#[test]
fn test_switch_with_default_consumes_chain() {
    let (analyzer, _) = analyze("switch (a) { case 0: foo(); break; default: bar(); } baz();");
    let path = analyzer.path(0);
    let after = path
        .final_segments()
        .first()
        .copied()
        .expect("one final segment");
    // No fall-out edge from the case chain once a default exists
    let prevs = ids(path, &path.segment(after).prev_segments);
    assert!(!prevs.contains(&"s1_1".to_string()), "got {prevs:?}");
}

#[test]
fn test_return_detaches_and_becomes_final() {
    let (analyzer, _) = analyze("foo(); return; bar();");
    let path = analyzer.path(0);
    assert_eq!(path.segment_count(), 2);
    assert!(!path.segment(find(path, "s1_2")).reachable);
    assert_eq!(ids(path, path.final_segments()), vec!["s1_1"]);
}

#[test]
fn test_throw_outside_try_is_final() {
    let (analyzer, _) = analyze("throw err;");
    let path = analyzer.path(0);
    assert_eq!(ids(path, path.final_segments()), vec!["s1_1"]);
    assert!(!path.segment(find(path, "s1_2")).reachable);
}

#[test]
fn test_try_catch_join() {
    let (analyzer, _) = analyze("try { foo(); } catch (e) { bar(); } baz();");
    let path = analyzer.path(0);
    assert_eq!(path.segment_count(), 3);
    let after = find(path, "s1_3");
    assert_eq!(
        ids(path, &path.segment(after).prev_segments),
        vec!["s1_1", "s1_2"]
    );
    assert_eq!(path.traversed_ids(), vec!["s1_1", "s1_2", "s1_3"]);
}

#[test]
fn test_try_finally_without_catch() {
    let (analyzer, _) = analyze("try { foo(); } finally { bar(); } baz();");
    let path = analyzer.path(0);
    assert_eq!(path.segment_count(), 2);
    assert_eq!(
        ids(path, &path.segment(find(path, "s1_2")).prev_segments),
        vec!["s1_1"]
    );
    assert_eq!(ids(path, path.final_segments()), vec!["s1_2"]);
}

#[test]
fn test_try_collects_segments_created_inside_block() {
    let (analyzer, _) = analyze("try { if (a) { foo(); } bar(); } catch (e) { baz(); } qux();");
    let path = analyzer.path(0);
    // Catch entry is preceded by every segment live inside the try
    let catch = path
        .segments()
        .iter()
        .position(|s| {
            s.prev_segments.len() == 3
        })
        .map(|i| &path.segments()[i]);
    let catch = catch.expect("catch segment with three predecessors");
    assert_eq!(
        ids(path, &catch.prev_segments),
        vec!["s1_1", "s1_2", "s1_3"]
    );
}

#[test]
fn test_labeled_break_targets_outer_loop() {
    let (analyzer, _) =
        analyze("outer: while (a) { while (b) { break outer; } } done();");
    let path = analyzer.path(0);
    assert_eq!(path.segment_count(), 8);
    assert!(!path.segment(find(path, "s1_6")).reachable);
    let after = find(path, "s1_8");
    assert_eq!(
        ids(path, &path.segment(after).prev_segments),
        vec!["s1_2", "s1_5"]
    );
}

#[test]
fn test_labeled_block_break() {
    let (analyzer, _) = analyze("block: { foo(); break block; bar(); } baz();");
    let path = analyzer.path(0);
    assert_eq!(path.segment_count(), 3);
    assert!(!path.segment(find(path, "s1_2")).reachable);
    let join = find(path, "s1_3");
    assert_eq!(ids(path, &path.segment(join).prev_segments), vec!["s1_1"]);
}

#[test]
fn test_function_declaration_starts_nested_path() {
    let (analyzer, events) = analyze("var x = 1; function f() { return 2; } x = 3;");
    assert_eq!(analyzer.paths().len(), 2);
    let program = analyzer.path(0);
    let function = analyzer.path(1);
    assert_eq!(program.id, "1");
    assert_eq!(function.id, "2");
    assert_eq!(function.upper, Some(0));
    assert_eq!(program.segment_count(), 1);
    assert_eq!(ids(function, function.final_segments()), vec!["s2_1"]);

    // The inner path starts and ends strictly inside the outer one
    let rendered = render(&analyzer, &events);
    let outer_start = rendered.iter().position(|e| e == "path-start 1").unwrap();
    let inner_start = rendered.iter().position(|e| e == "path-start 2").unwrap();
    let inner_end = rendered.iter().position(|e| e == "path-end 2").unwrap();
    let outer_end = rendered.iter().position(|e| e == "path-end 1").unwrap();
    assert!(outer_start < inner_start && inner_start < inner_end && inner_end < outer_end);
}

#[test]
fn test_function_expression_keeps_outer_frontier() {
    let (analyzer, _) = analyze("var f = function () { foo(); }; bar();");
    assert_eq!(analyzer.paths().len(), 2);
    let program = analyzer.path(0);
    assert_eq!(program.segment_count(), 1);
    assert_eq!(ids(program, program.final_segments()), vec!["s1_1"]);
}

#[test]
fn test_traverse_skip_suppresses_branch() {
    let (analyzer, _) =
        analyze("if (a) { if (b) { foo(); } baz(); } else { bar(); } qux();");
    let path = analyzer.path(0);
    assert_eq!(path.segment_count(), 6);

    let mut seen = Vec::new();
    path.traverse_segments(TraverseOptions::default(), |segment, controller| {
        seen.push(segment.id.clone());
        if segment.id == "s1_2" {
            controller.skip();
        }
    });
    assert_eq!(seen, vec!["s1_1", "s1_2", "s1_5", "s1_6"]);
}

#[test]
fn test_traverse_first_last_bounds() {
    let (analyzer, _) =
        analyze("if (a) { if (b) { foo(); } baz(); } else { bar(); } qux();");
    let path = analyzer.path(0);
    let mut seen = Vec::new();
    path.traverse_segments(
        TraverseOptions {
            first: Some(find(path, "s1_2")),
            last: Some(find(path, "s1_4")),
        },
        |segment, _| seen.push(segment.id.clone()),
    );
    assert_eq!(seen, vec!["s1_2", "s1_3", "s1_4"]);
}

#[test]
fn test_unreachable_code_after_return_gets_no_events() {
    let (analyzer, events) = analyze("return; foo();");
    let rendered = render(&analyzer, &events);
    assert_eq!(
        rendered,
        vec![
            "path-start 1",
            "segment-start s1_1",
            "segment-end s1_1",
            "path-end 1",
        ]
    );
}
