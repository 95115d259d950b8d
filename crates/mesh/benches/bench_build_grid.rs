use std::hint::black_box;
use std::time::Instant;

use heightfield_common::GridSize;
use heightfield_mesh::{GridMesh, build_grid};

fn bench_build(width: u32, height: u32, iterations: usize) {
    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(build_grid(black_box(width), black_box(height)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  build_grid ({width}x{height}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_summary(size: GridSize, iterations: usize) {
    let mesh = GridMesh::from_size(size);

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(black_box(&mesh).summary());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  summary ({size}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn main() {
    println!("=== Grid Mesh Benchmarks ===\n");

    println!("Grid build:");
    bench_build(64, 64, 1000);
    bench_build(256, 256, 50);
    bench_build(512, 512, 10);
    bench_build(1024, 512, 5);

    println!("\nSummary:");
    if let Ok(size) = GridSize::square(256) {
        bench_summary(size, 10000);
    }

    println!("\n=== Done ===");
}
