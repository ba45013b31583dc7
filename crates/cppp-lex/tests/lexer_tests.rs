//! Integration tests driving the pre-pass and lexer together, the way
//! `cppp-pp` will: pre-pass a whole buffer, then tokenize it.

use cppp_lex::{Lexer, TokenKind};
use cppp_util::{BufferId, SourceMap};

fn tokenize(source: &str) -> Vec<TokenKind> {
    let (passed, _) = cppp_lex::prepass(source);
    let mut lexer = Lexer::new(BufferId(0), &passed);
    lexer.tokenize().into_iter().map(|t| t.kind).collect()
}

#[test]
fn splice_then_lex_joins_a_macro_name_split_across_lines() {
    let (passed, _) = cppp_lex::prepass("#define FOO\\\nBAR 1\n");
    let mut sources = SourceMap::new();
    let buf = sources.add_buffer("t.c", passed.clone());
    let mut lexer = Lexer::new(buf, &passed);
    let idents: Vec<&str> = lexer
        .tokenize()
        .into_iter()
        .filter(|t| t.kind == TokenKind::Identifier)
        .map(|t| sources.span_text(t.span).unwrap())
        .collect();
    assert_eq!(idents, vec!["define", "FOOBAR"]);
}

#[test]
fn block_comment_between_tokens_becomes_whitespace() {
    let kinds = tokenize("int/**/x;\n");
    assert!(kinds.contains(&TokenKind::Whitespace));
}

#[test]
fn line_comment_does_not_consume_following_line() {
    let kinds = tokenize("A // comment\nB\n");
    let idents = kinds.iter().filter(|k| **k == TokenKind::Identifier).count();
    assert_eq!(idents, 2);
}

#[test]
fn full_line_round_trips_through_prepass_and_lexer() {
    let kinds = tokenize("#if defined(FOO) && FOO > 1\n#endif\n");
    assert!(kinds.contains(&TokenKind::Identifier));
    assert!(kinds
        .iter()
        .any(|k| matches!(k, TokenKind::Punct(cppp_lex::Punct::Hash))));
}

#[test]
fn string_literal_survives_prepass_comment_stripping() {
    let kinds = tokenize(r#"char *p = "not // a comment";"#);
    assert!(kinds.contains(&TokenKind::StringLiteral));
}
