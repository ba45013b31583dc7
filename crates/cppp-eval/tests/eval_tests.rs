//! Integration tests composing `defined` resolution with expression
//! evaluation, the way `cppp-pp`'s `#if` handling will.

use cppp_eval::{defined, evaluate};
use cppp_lex::Lexer;
use cppp_util::SourceMap;

fn eval_with_macros(src: &str, defined_names: &[&str]) -> i64 {
    let (passed, _) = cppp_lex::prepass(src);
    let mut sources = SourceMap::new();
    let buf = sources.add_buffer("t.c", passed.clone());
    let mut lexer = Lexer::new(buf, &passed);
    let tokens = lexer.tokenize();

    let mut errors = Vec::new();
    let resolved = defined::resolve_defined(
        &tokens,
        |name| defined_names.contains(&name),
        &mut sources,
        &mut errors,
    );
    assert!(errors.is_empty(), "unexpected defined() errors: {errors:?}");

    evaluate(&resolved, &sources).value
}

#[test]
fn defined_true_combines_with_arithmetic() {
    assert_eq!(eval_with_macros("defined(DEBUG) + 1", &["DEBUG"]), 2);
}

#[test]
fn defined_false_short_circuits_and() {
    assert_eq!(
        eval_with_macros("defined(MISSING) && 1 / 0", &["DEBUG"]),
        0
    );
}

#[test]
fn bare_defined_without_parens() {
    assert_eq!(eval_with_macros("defined FOO", &["FOO"]), 1);
}

#[test]
fn combined_version_gate_expression() {
    let src = "defined(VERSION) && VERSION >= 10";
    // VERSION isn't actually in the macro table here, so after `defined`
    // resolution it is an ordinary (non-macro) identifier and evaluates to
    // 0 under spec's "remaining identifiers replace with 0" rule.
    assert_eq!(eval_with_macros(src, &["VERSION"]), 0);
}
