use criterion::{black_box, criterion_group, criterion_main, Criterion};

use jpeg_baseline::{HuffmanTable, QuantizationTable};

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("tables");

    group.bench_function("quantization tables", |b| {
        b.iter(|| {
            let luma = QuantizationTable::default_luma(black_box(75));
            let chroma = QuantizationTable::default_chroma(black_box(75));
            black_box((luma.scale_factors(), chroma.scale_factors()));
        })
    });

    group.bench_function("huffman tables", |b| {
        b.iter(|| {
            black_box((
                HuffmanTable::default_luma_dc(),
                HuffmanTable::default_luma_ac(),
                HuffmanTable::default_chroma_dc(),
                HuffmanTable::default_chroma_ac(),
            ));
        })
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
