use std::hint::black_box;
use std::time::Instant;

use folio_stream::{ChunkCoord, ChunkWindow, hash01};

fn bench_window_walk(radius: i32, iterations: usize) {
    let mut window: ChunkWindow<f32> = ChunkWindow::new(radius, usize::MAX);

    let start = Instant::now();
    for i in 0..iterations {
        // Walk forward one chunk every few frames, as the corridor does.
        let center = ChunkCoord::new(0, -((i / 4) as i32));
        let _ = black_box(window.update(black_box(center), |c| hash01(c.x, c.z, 1)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  window walk (r={radius}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_hash(iterations: usize) {
    let start = Instant::now();
    let mut acc = 0.0_f32;
    for i in 0..iterations as i32 {
        acc += hash01(black_box(i), black_box(-i), 7);
    }
    black_box(acc);
    let elapsed = start.elapsed();
    println!("  hash01 ({iterations} iters): total {elapsed:?}");
}

fn main() {
    println!("=== Chunk Window Benchmarks ===\n");

    println!("Window walk:");
    bench_window_walk(1, 10000);
    bench_window_walk(2, 10000);
    bench_window_walk(4, 1000);

    println!("\nDecoration hash:");
    bench_hash(1_000_000);

    println!("\n=== Done ===");
}
