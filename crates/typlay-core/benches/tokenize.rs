use criterion::{Criterion, black_box, criterion_group, criterion_main};
use typlay_core::{resolve, tokenize};
use typlay_lang::LanguageConfig;

fn region_text(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 64);
    for i in 0..line_count {
        out.push_str(&format!(
            "#let v{i} = f(g[{i}], \"value {i}\") // trailing note\n"
        ));
    }
    out
}

fn bench_tokenize(c: &mut Criterion) {
    let config = LanguageConfig::typst_markdown();
    let text = region_text(2_000);
    c.bench_function("tokenize/2k_lines", |b| {
        b.iter(|| black_box(tokenize(black_box(&text), &config)).len())
    });
}

fn bench_resolve_with_cursor(c: &mut Criterion) {
    let config = LanguageConfig::typst_markdown();
    let text = region_text(2_000);
    let tokens = tokenize(&text, &config);
    let cursor = text.chars().count() / 2;
    c.bench_function("resolve/2k_lines", |b| {
        b.iter(|| black_box(resolve(black_box(&tokens), Some(cursor))))
    });
}

criterion_group!(benches, bench_tokenize, bench_resolve_with_cursor);
criterion_main!(benches);
