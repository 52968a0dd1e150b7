mod common;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use toyc::backend::transpiler::Generate;
use toyc::{lexer, parser};

fn bench_frontend(c: &mut Criterion) {
    for workload in common::workloads() {
        let label = workload.label;
        let source = workload.source.as_str();
        let program = common::load_program(source);

        c.bench_function(&format!("frontend_tokenize_{label}"), |b| {
            b.iter(|| {
                let out = lexer::tokenize(black_box(source));
                black_box(out);
            })
        });

        c.bench_function(&format!("frontend_parse_{label}"), |b| {
            b.iter(|| {
                let out = parser::parse(black_box(source)).expect("parse");
                black_box(out);
            })
        });

        c.bench_function(&format!("frontend_generate_{label}"), |b| {
            b.iter(|| {
                let out = black_box(&program).generate();
                black_box(out);
            })
        });
    }
}

criterion_group!(benches, bench_frontend);
criterion_main!(benches);
