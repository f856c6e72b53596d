use bytes::BytesMut;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use registry_protocol::palette::{BitStorage, ContainerFormat, PaletteProfile, PalettedContainer};

fn fill_pattern(container: &mut PalettedContainer, distinct: u32) {
    for index in 0..container.len() {
        container.set(index, (index as u32).wrapping_mul(0x9E37_79B9) % distinct);
    }
}

#[allow(clippy::unwrap_used)]
fn bench_container_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("container_fill");
    group.throughput(Throughput::Elements(PaletteProfile::BLOCKS.storage_len as u64));

    // distinct value counts landing in list, map, and global palettes
    for &distinct in &[8u32, 200, 2000] {
        group.bench_function(format!("{distinct}_distinct"), |b| {
            b.iter_batched(
                || PalettedContainer::new(PaletteProfile::BLOCKS, 11),
                |mut container| fill_pattern(&mut container, distinct),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

#[allow(clippy::unwrap_used)]
fn bench_container_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("container_codec");

    for &distinct in &[8u32, 200, 2000] {
        let mut container = PalettedContainer::new(PaletteProfile::BLOCKS, 11);
        fill_pattern(&mut container, distinct);

        let mut encoded = BytesMut::new();
        container.write(&mut encoded, ContainerFormat::MODERN);
        group.throughput(Throughput::Bytes(encoded.len() as u64));

        group.bench_function(format!("encode_{distinct}_distinct"), |b| {
            b.iter(|| {
                let mut buf = BytesMut::with_capacity(encoded.len());
                container.write(&mut buf, ContainerFormat::MODERN);
                buf
            })
        });
        group.bench_function(format!("decode_{distinct}_distinct"), |b| {
            b.iter(|| {
                let mut slice = &encoded[..];
                PalettedContainer::read(&mut slice, PaletteProfile::BLOCKS, 11, ContainerFormat::MODERN)
                    .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_bit_storage(c: &mut Criterion) {
    let mut group = c.benchmark_group("bit_storage");
    let len = 4096usize;
    group.throughput(Throughput::Elements(len as u64));

    for &bits in &[4u8, 8, 15] {
        group.bench_function(format!("set_{bits}bit"), |b| {
            b.iter_batched(
                || BitStorage::new(bits, len),
                |mut storage| {
                    for index in 0..len {
                        storage.set(index, index as u32 & ((1 << bits) - 1));
                    }
                    storage
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("get_{bits}bit"), |b| {
            let mut storage = BitStorage::new(bits, len);
            for index in 0..len {
                storage.set(index, index as u32 & ((1 << bits) - 1));
            }
            b.iter(|| {
                let mut sum = 0u64;
                for index in 0..len {
                    sum += u64::from(storage.get(index));
                }
                sum
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_container_fill,
    bench_container_codec,
    bench_bit_storage
);
criterion_main!(benches);
