//! Parser throughput benchmark.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use minic_lex::lex;
use minic_par::parse;

fn sample_program(functions: usize) -> String {
    let mut source = String::from("#include <stdio.h>\n\n");
    for i in 0..functions {
        source.push_str(&format!(
            "int work{i}(int n) {{\n    int sum = 0;\n    for (int j = 0; j < n; j = j + 1) {{\n        if (j % 2 == 0) sum = sum + j * 3;\n        else sum = sum - 1;\n    }}\n    return sum;\n}}\n\n"
        ));
    }
    source.push_str("int main() { return work0(10); }\n");
    source
}

fn bench_parser(c: &mut Criterion) {
    let small = lex(&sample_program(4));
    let large = lex(&sample_program(128));

    c.bench_function("parse_small", |b| b.iter(|| parse(black_box(small.clone()))));
    c.bench_function("parse_large", |b| b.iter(|| parse(black_box(large.clone()))));
}

criterion_group!(benches, bench_parser);
criterion_main!(benches);
