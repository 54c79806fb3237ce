use criterion::{criterion_group, criterion_main, Criterion};
use batchshrink::discovery::scan_candidates;
use batchshrink::ScanConfig;
use tempfile::TempDir;

// Listing and name filtering only; no image is opened
fn benchmark_scan(c: &mut Criterion) {
    let dir = TempDir::new().expect("temp dir");
    let names = ["photo", "MindsOn_intro", "diagram", "unit_action", "scan"];
    let extensions = ["jpg", "PNG", "jpeg", "gif", "txt"];
    for i in 0..500 {
        let name = format!(
            "{}_{}.{}",
            names[i % names.len()],
            i,
            extensions[i % extensions.len()]
        );
        std::fs::write(dir.path().join(name), b"x").expect("fixture file");
    }

    let config = ScanConfig::default();
    c.bench_function("scan_candidates_500", |b| {
        b.iter(|| scan_candidates(dir.path(), &config).expect("scan"))
    });
}

criterion_group!(benches, benchmark_scan);
criterion_main!(benches);
