use criterion::{black_box, criterion_group, criterion_main, Criterion};
use spectral::signal::{synthesize, Tone};
use spectral::{BearingThresholds, LowPassFilter, SpectralAnalyzer};

const FS: f64 = 44100.0;
const N: usize = 4096;

fn test_block() -> Vec<i16> {
    let mut block = vec![0; N];
    synthesize(
        &[Tone::new(1000.0, 8000.0), Tone::new(60.0, 1500.0)],
        FS,
        0,
        &mut block,
    );
    block
}

fn bench_dominant_frequency(c: &mut Criterion) {
    let mut analyzer = SpectralAnalyzer::new(N, FS).expect("valid block size");
    let block = test_block();
    c.bench_function("dominant_frequency_4096", |b| {
        b.iter(|| analyzer.dominant_frequency(black_box(&block), 10000.0))
    });
}

fn bench_detect_fault(c: &mut Criterion) {
    let mut analyzer = SpectralAnalyzer::new(N, FS).expect("valid block size");
    let thresholds = BearingThresholds::default();
    let block = test_block();
    c.bench_function("detect_fault_4096", |b| {
        b.iter(|| analyzer.detect_fault(black_box(&block), &thresholds))
    });
}

fn bench_low_pass(c: &mut Criterion) {
    let filter = LowPassFilter::new(1000.0, FS);
    let block = test_block();
    c.bench_function("low_pass_4096", |b| {
        b.iter(|| {
            let mut work = block.clone();
            filter.apply(black_box(&mut work));
            work
        })
    });
}

criterion_group!(benches, bench_dominant_frequency, bench_detect_fault, bench_low_pass);
criterion_main!(benches);
