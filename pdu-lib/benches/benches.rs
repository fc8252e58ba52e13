use rand::Rng;
use std::io::Cursor;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pdu_utils::deframer::{
    deframe, BitFormat, Deframer, DeframerConfig, Frame, OutputPolicy, RecoveryPolicy,
};

const ASM: [u8; 4] = [0x1a, 0xcf, 0xfc, 0x1d];

// 64 CADU-like blocks of random data, each preceded by the ASM
fn stream() -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let mut dat = Vec::new();
    for _ in 0..64 {
        dat.extend(ASM);
        dat.extend((0..1020).map(|_| rng.gen::<u8>()));
    }
    dat
}

fn bench_deframe(c: &mut Criterion) {
    let data = stream();
    let mut group = c.benchmark_group("deframe");
    group.throughput(Throughput::Bytes(data.len() as u64));
    for recovery in [
        RecoveryPolicy::Strict,
        RecoveryPolicy::Reset,
        RecoveryPolicy::Permissive,
    ] {
        let config = DeframerConfig::builder()
            .access_code("0x1acffc1d")
            .burst_len(1024 * 8)
            .threshold(3)
            .output(OutputPolicy::Discard)
            .recovery(recovery)
            .build();
        group.bench_with_input(
            BenchmarkId::from_parameter(recovery),
            &config,
            |b, config| {
                b.iter(|| {
                    let deframer = Deframer::new(config).unwrap();
                    let _: Vec<Frame> =
                        deframe(Cursor::new(&data), deframer, BitFormat::Packed)
                            .map_while(Result::ok)
                            .collect();
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_deframe);
criterion_main!(benches);
