use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cppp_lex::Lexer;
use cppp_util::BufferId;

const SAMPLE: &str = include_str!("sample.c");

fn bench_lex(c: &mut Criterion) {
    c.bench_function("lex sample.c", |b| {
        b.iter(|| {
            let (passed, _) = cppp_lex::prepass(black_box(SAMPLE));
            let mut lexer = Lexer::new(BufferId(0), &passed);
            black_box(lexer.tokenize())
        })
    });
}

criterion_group!(benches, bench_lex);
criterion_main!(benches);
