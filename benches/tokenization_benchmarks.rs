use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scrye::search::tokenization::{extract_visible_text, tokenize};

const HTML: &str = r#"
<html><body>
<h1>The Quick Brown Fox</h1>
<p>The quick brown fox jumps over the lazy dog. It's a sentence that has
been used for decades to exercise every letter of the alphabet, and it
makes a reasonably representative paragraph of prose for benchmarking a
tokenizer's throughput on realistic corpus text.</p>
<p>Repeated phrases help exercise the stemmer's cache: running, runs, ran,
runner, runners, jumping, jumps, jumped.</p>
</body></html>
"#;

fn bench_tokenize(c: &mut Criterion) {
    let text = extract_visible_text(HTML);
    c.bench_function("tokenize_paragraph", |b| {
        b.iter(|| tokenize(black_box(&text)))
    });
}

fn bench_extract_visible_text(c: &mut Criterion) {
    c.bench_function("extract_visible_text", |b| {
        b.iter(|| extract_visible_text(black_box(HTML)))
    });
}

criterion_group!(benches, bench_tokenize, bench_extract_visible_text);
criterion_main!(benches);
