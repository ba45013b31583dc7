//! Integration tests built directly from the end-to-end scenarios table:
//! whole `PreprocessSession::preprocess` runs, checked against the
//! meaningful (non-whitespace) tokens they emit.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cppp_lex::{HeaderKind, TokenKind};
use cppp_pp::{EmittedToken, IncludeError, IncludeResolver, PreprocessSession, SessionConfig};

fn meaningful(tokens: &[EmittedToken]) -> Vec<&str> {
    tokens
        .iter()
        .filter(|t| !matches!(t.kind, TokenKind::Whitespace | TokenKind::Newline | TokenKind::Eof))
        .map(|t| t.text.as_str())
        .collect()
}

struct MapResolver(HashMap<String, String>);

impl IncludeResolver for MapResolver {
    fn resolve(
        &self,
        name: &str,
        _kind: HeaderKind,
        _from: Option<&Path>,
    ) -> Result<(PathBuf, String), IncludeError> {
        self.0
            .get(name)
            .map(|text| (PathBuf::from(name), text.clone()))
            .ok_or_else(|| IncludeError::NotFound(name.to_string()))
    }
}

#[test]
fn object_like_macro_no_recursion() {
    let mut session = PreprocessSession::new(SessionConfig::default());
    let (tokens, diags) = session.preprocess("#define X 1+2\nX*X\n", "t.c");
    assert!(diags.is_empty());
    assert_eq!(meaningful(&tokens), vec!["1", "+", "2", "*", "1", "+", "2"]);
}

#[test]
fn self_reference_guarded() {
    let mut session = PreprocessSession::new(SessionConfig::default());
    let (tokens, diags) = session.preprocess("#define A A+1\nA\n", "t.c");
    assert!(diags.is_empty());
    assert_eq!(meaningful(&tokens), vec!["A", "+", "1"]);
}

#[test]
fn function_like_with_stringize_and_paste() {
    let mut session = PreprocessSession::new(SessionConfig::default());
    let src = "#define S(x) #x\n#define CAT(a,b) a##b\nS(hello world) CAT(foo, 123)\n";
    let (tokens, diags) = session.preprocess(src, "t.c");
    assert!(diags.is_empty());
    assert_eq!(meaningful(&tokens), vec!["\"hello world\"", "foo123"]);
}

#[test]
fn variadic_with_comma_elision_on_empty() {
    let mut session = PreprocessSession::new(SessionConfig::default());
    let src = "#define LOG(fmt, ...) printf(fmt, ##__VA_ARGS__)\nLOG(\"hi\")\n";
    let (tokens, diags) = session.preprocess(src, "t.c");
    assert!(diags.is_empty());
    assert_eq!(meaningful(&tokens), vec!["printf", "(", "\"hi\"", ")"]);
}

#[test]
fn conditional_with_expression() {
    let mut session = PreprocessSession::new(SessionConfig::default());
    let src = "#define V 3\n#if V > 2 && defined(V)\nyes\n#else\nno\n#endif\n";
    let (tokens, diags) = session.preprocess(src, "t.c");
    assert!(diags.is_empty());
    assert_eq!(meaningful(&tokens), vec!["yes"]);
}

#[test]
fn include_splicing() {
    let mut headers = HashMap::new();
    headers.insert("a.h".to_string(), "#define K 7\n".to_string());
    let mut session = PreprocessSession::new(SessionConfig::default());
    session.set_include_resolver(Box::new(MapResolver(headers)));
    let (tokens, diags) = session.preprocess("#include \"a.h\"\nK\n", "t.c");
    assert!(diags.is_empty());
    assert_eq!(meaningful(&tokens), vec!["7"]);
}

#[test]
fn paste_failure_keeps_both_tokens_and_reports_a_diagnostic() {
    let mut session = PreprocessSession::new(SessionConfig::default());
    let src = "#define CAT(a,b) a##b\nCAT(1, +)\n";
    let (tokens, diags) = session.preprocess(src, "t.c");
    assert!(!diags.is_empty(), "expected a paste diagnostic");
    assert_eq!(meaningful(&tokens), vec!["1", "+"]);
}

#[test]
fn function_like_call_spans_multiple_physical_lines() {
    let mut session = PreprocessSession::new(SessionConfig::default());
    let src = "#define ADD(a, b) a + b\nADD(\n1,\n2\n)\n";
    let (tokens, diags) = session.preprocess(src, "t.c");
    assert!(diags.is_empty());
    assert_eq!(meaningful(&tokens), vec!["1", "+", "2"]);
}

#[test]
fn unterminated_block_comment_is_a_fatal_diagnostic() {
    let mut session = PreprocessSession::new(SessionConfig::default());
    let (_tokens, diags) = session.preprocess("int x; /* never closed\n", "t.c");
    assert!(
        diags.iter().any(|d| d.level == cppp_util::diagnostic::Level::Fatal),
        "expected a fatal diagnostic for the unterminated comment, got {diags:?}"
    );
}

#[test]
fn tempfile_backed_filesystem_include_resolves_through_a_session() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.h"), "#define LIMIT 42\n").unwrap();
    std::fs::write(
        dir.path().join("main.c"),
        "#include \"config.h\"\nLIMIT\n",
    )
    .unwrap();

    let mut config = SessionConfig::default();
    config.include_path.quote_dirs.push(dir.path().to_path_buf());
    let mut session = PreprocessSession::new(config);

    let source = std::fs::read_to_string(dir.path().join("main.c")).unwrap();
    let (tokens, diags) = session.preprocess(&source, "main.c");
    assert!(diags.is_empty());
    assert_eq!(meaningful(&tokens), vec!["42"]);
}

#[test]
fn tempfile_backed_include_missing_from_search_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("main.c"), "#include \"missing.h\"\n").unwrap();

    let mut config = SessionConfig::default();
    config.include_path.quote_dirs.push(dir.path().to_path_buf());
    let mut session = PreprocessSession::new(config);

    let source = std::fs::read_to_string(dir.path().join("main.c")).unwrap();
    let (_tokens, diags) = session.preprocess(&source, "main.c");
    assert!(diags.iter().any(|d| d.level == cppp_util::diagnostic::Level::Error));
}
