// CPU throughput benchmark: arithmetic loop over RAM

use criterion::{criterion_group, criterion_main, Criterion};
use famicore::{Bus, Cpu};
use std::hint::black_box;

/// Tight loop: INC $10; LDA $10; ADC #$01; STA $11; JMP $8000
const LOOP_PROGRAM: &[u8] = &[
    0xE6, 0x10, // INC $10
    0xA5, 0x10, // LDA $10
    0x69, 0x01, // ADC #$01
    0x85, 0x11, // STA $11
    0x4C, 0x00, 0x80, // JMP $8000
];

fn cpu_loop_bench(c: &mut Criterion) {
    c.bench_function("cpu_100k_cycles", |b| {
        let mut bus = Bus::new();
        for (i, &byte) in LOOP_PROGRAM.iter().enumerate() {
            bus.write(0x8000 + i as u16, byte);
        }
        bus.write(0xFFFC, 0x00);
        bus.write(0xFFFD, 0x80);

        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);

        b.iter(|| {
            for _ in 0..100_000 {
                cpu.clock(&mut bus);
            }
            black_box(cpu.cycles)
        });
    });
}

criterion_group!(benches, cpu_loop_bench);
criterion_main!(benches);
