use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use stream_wire::protocol::message::{
    Deliver, OsirisChunk, PROTOCOL_VERSION, Publish, PublishedMessage,
};
use stream_wire::protocol::{Record, frame};
use stream_wire::{Bytes, Key, ServerCommand};

fn publish(messages: usize, size: usize) -> Publish {
    Publish {
        key: Key::Publish.as_u16(),
        version: PROTOCOL_VERSION,
        publisher_id: 1,
        published_messages: (0..messages as u64)
            .map(|publishing_id| PublishedMessage {
                publishing_id,
                message: Bytes::from(vec![0u8; size]),
            })
            .collect(),
    }
}

fn deliver(records: u32, size: usize) -> Deliver {
    Deliver {
        key: Key::Deliver.as_u16(),
        version: PROTOCOL_VERSION,
        subscription_id: 1,
        osiris_chunk: OsirisChunk {
            magic_version: 0x50,
            num_entries: 1,
            num_records: records,
            epoch: 1,
            chunk_first_offset: 0,
            chunk_crc: 0,
            data_length: records * (size as u32 + 4),
            messages: (0..records).map(|_| Bytes::from(vec![0u8; size])).collect(),
        },
    }
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    // Single small message
    let small = publish(1, 64);
    group.throughput(Throughput::Bytes(64));
    group.bench_function("encode_publish_1x64b", |b| {
        b.iter(|| {
            black_box(small.to_bytes().unwrap());
        });
    });

    // Batch of 100 x 1 KB
    let batch = publish(100, 1024);
    group.throughput(Throughput::Bytes(100 * 1024));
    group.bench_function("encode_publish_100x1kb", |b| {
        b.iter(|| {
            black_box(frame::encode_frame(&batch).unwrap());
        });
    });

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    let batch = publish(100, 1024).to_bytes().unwrap();
    group.throughput(Throughput::Bytes(100 * 1024));
    group.bench_function("decode_publish_100x1kb", |b| {
        b.iter(|| {
            black_box(Publish::from_bytes(batch.clone()).unwrap());
        });
    });

    // Chunk entries are counted by num_records
    let chunk = deliver(500, 256).to_bytes().unwrap();
    group.throughput(Throughput::Bytes(500 * 256));
    group.bench_function("decode_deliver_500x256b", |b| {
        b.iter(|| {
            black_box(ServerCommand::decode(chunk.clone()).unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
