// Integration tests for try/catch/finally, switches and labels

use crate::common::{lines, lint, Fixture};
use liveguard::tree::NodeKind;

#[test]
fn test_await_in_try_body_reaches_after_try() {
    // try { await x; } finally {} use(context);
    let mut f = Fixture::new();
    let gap = f.gap();
    let try_ = f.try_(vec![gap], vec![], Some(vec![]));
    let use_stmt = f.use_at(3);
    f.function(vec![try_, use_stmt]);
    assert_eq!(lines(&lint(&f.finish())), vec![3]);
}

#[test]
fn test_await_in_catch_reaches_after_try() {
    let mut f = Fixture::new();
    let noop = f.noop();
    let gap = f.gap();
    let try_ = f.try_(vec![noop], vec![vec![gap]], None);
    let use_stmt = f.use_at(3);
    f.function(vec![try_, use_stmt]);
    assert_eq!(lines(&lint(&f.finish())), vec![3]);
}

#[test]
fn test_await_in_finally_reaches_after_try() {
    let mut f = Fixture::new();
    let noop = f.noop();
    let gap = f.gap();
    let try_ = f.try_(vec![noop], vec![], Some(vec![gap]));
    let use_stmt = f.use_at(3);
    f.function(vec![try_, use_stmt]);
    assert_eq!(lines(&lint(&f.finish())), vec![3]);
}

#[test]
fn test_check_in_finally_guards_after_try() {
    // try { await x; } finally { if (!context.mounted) return; } use(context);
    let mut f = Fixture::new();
    let gap = f.gap();
    let bail = f.bail_unless_live();
    let try_ = f.try_(vec![gap], vec![], Some(vec![bail]));
    let use_stmt = f.use_at(3);
    f.function(vec![try_, use_stmt]);
    assert!(lint(&f.finish()).is_empty());
}

#[test]
fn test_check_in_try_body_does_not_guard_after_try() {
    // await x; try { if (!context.mounted) return; } catch {} use(context);
    let mut f = Fixture::new();
    let gap = f.gap();
    let bail = f.bail_unless_live();
    let try_ = f.try_(vec![bail], vec![vec![]], None);
    let use_stmt = f.use_at(4);
    f.function(vec![gap, try_, use_stmt]);
    assert_eq!(lines(&lint(&f.finish())), vec![4]);
}

#[test]
fn test_catch_sees_await_in_try_body() {
    // try { await x; } catch { use(context); }
    let mut f = Fixture::new();
    let gap = f.gap();
    let use_stmt = f.use_at(2);
    let try_ = f.try_(vec![gap], vec![vec![use_stmt]], None);
    f.function(vec![try_]);
    assert_eq!(lines(&lint(&f.finish())), vec![2]);
}

#[test]
fn test_finally_sees_await_in_try_body() {
    let mut f = Fixture::new();
    let gap = f.gap();
    let use_stmt = f.use_at(2);
    let try_ = f.try_(vec![gap], vec![], Some(vec![use_stmt]));
    f.function(vec![try_]);
    assert_eq!(lines(&lint(&f.finish())), vec![2]);
}

#[test]
fn test_switch_fallthrough_all_guarded() {
    // switch (v) { case _ when context.mounted: case _ when context.mounted: use(context); }
    let mut f = Fixture::new();
    let gap = f.gap();
    let first_guard = f.live();
    let first = f.member(true, Some(first_guard), vec![]);
    let second_guard = f.live();
    let use_stmt = f.use_at(4);
    let second = f.member(true, Some(second_guard), vec![use_stmt]);
    let switch = f.switch(vec![first, second]);
    f.function(vec![gap, switch]);
    assert!(lint(&f.finish()).is_empty());
}

#[test]
fn test_switch_fallthrough_from_unguarded_member() {
    // switch (v) { case _: case _ when context.mounted: use(context); }
    let mut f = Fixture::new();
    let gap = f.gap();
    let first = f.member(true, None, vec![]);
    let guard = f.live();
    let use_stmt = f.use_at(4);
    let second = f.member(true, Some(guard), vec![use_stmt]);
    let switch = f.switch(vec![first, second]);
    f.function(vec![gap, switch]);
    assert_eq!(lines(&lint(&f.finish())), vec![4]);
}

#[test]
fn test_switch_member_with_body_stops_fallthrough() {
    // switch (v) { case _: break; case _ when context.mounted: use(context); }
    let mut f = Fixture::new();
    let gap = f.gap();
    let brk = f.b.add(NodeKind::Break);
    let first = f.member(true, None, vec![brk]);
    let guard = f.live();
    let use_stmt = f.use_at(4);
    let second = f.member(true, Some(guard), vec![use_stmt]);
    let switch = f.switch(vec![first, second]);
    f.function(vec![gap, switch]);
    assert!(lint(&f.finish()).is_empty());
}

#[test]
fn test_switch_default_member() {
    let mut f = Fixture::new();
    let gap = f.gap();
    let use_stmt = f.use_at(3);
    let default = f.member(false, None, vec![use_stmt]);
    let switch = f.switch(vec![default]);
    f.function(vec![gap, switch]);
    assert_eq!(lines(&lint(&f.finish())), vec![3]);
}

#[test]
fn test_check_inside_switch_member() {
    // switch (v) { default: if (!context.mounted) return; use(context); }
    let mut f = Fixture::new();
    let gap = f.gap();
    let bail = f.bail_unless_live();
    let use_stmt = f.use_at(4);
    let default = f.member(false, None, vec![bail, use_stmt]);
    let switch = f.switch(vec![default]);
    f.function(vec![gap, switch]);
    assert!(lint(&f.finish()).is_empty());
}

#[test]
fn test_switch_expression_case_guard() {
    // v switch { _ when context.mounted => consume(context), _ => consume(context) }
    let mut f = Fixture::new();
    let gap = f.gap();

    let pattern = f.b.add(NodeKind::Pattern);
    let guard = f.live();
    let value = f.use_expr_at(3);
    let guarded = f.b.add(NodeKind::SwitchExprCase {
        pattern,
        guard: Some(guard),
        value,
    });
    let pattern = f.b.add(NodeKind::Pattern);
    let value = f.use_expr_at(4);
    let plain = f.b.add(NodeKind::SwitchExprCase {
        pattern,
        guard: None,
        value,
    });
    let scrutinee = f.value();
    let switch = f.b.add(NodeKind::SwitchExpr {
        scrutinee,
        cases: vec![guarded, plain],
    });
    let stmt = f.stmt(switch);
    f.function(vec![gap, stmt]);
    assert_eq!(lines(&lint(&f.finish())), vec![4]);
}

#[test]
fn test_labeled_bail() {
    // await x; outer: if (!context.mounted) return; use(context);
    let mut f = Fixture::new();
    let gap = f.gap();
    let bail = f.bail_unless_live();
    let labeled = f.b.add(NodeKind::Labeled(bail));
    let use_stmt = f.use_at(3);
    f.function(vec![gap, labeled, use_stmt]);
    assert!(lint(&f.finish()).is_empty());
}

#[test]
fn test_throw_counts_as_exit() {
    // await x; if (!context.mounted) throw e; use(context);
    let mut f = Fixture::new();
    let gap = f.gap();
    let live = f.live();
    let dead = f.not(live);
    let error = f.value();
    let throw = f.b.add(NodeKind::Throw(error));
    let throw_stmt = f.stmt(throw);
    let bail = f.if_then(dead, vec![throw_stmt]);
    let use_stmt = f.use_at(4);
    f.function(vec![gap, bail, use_stmt]);
    assert!(lint(&f.finish()).is_empty());
}
