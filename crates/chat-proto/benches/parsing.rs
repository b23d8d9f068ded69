//! Benchmarks for command parsing and envelope encoding.

use bytes::BytesMut;
use chat_proto::{Command, Envelope, LineCodec, ServerCodec};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tokio_util::codec::{Decoder, Encoder};

/// Liveness reply
const HEARTBEAT_LINE: &str = "HEARTBEAT";

/// Private message with a multi-word body
const MSG_LINE: &str = "MSG bob are we still on for lunch tomorrow at noon?";

/// Free text broadcast
const TEXT_LINE: &str = "hello everyone, the deploy finished without errors";

fn benchmark_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Command Parsing");

    group.bench_function("heartbeat", |b| {
        b.iter(|| black_box(Command::parse(black_box(HEARTBEAT_LINE))))
    });

    group.bench_function("private_message", |b| {
        b.iter(|| black_box(Command::parse(black_box(MSG_LINE))))
    });

    group.bench_function("free_text", |b| {
        b.iter(|| black_box(Command::parse(black_box(TEXT_LINE))))
    });

    group.finish();
}

fn benchmark_framing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Line Framing");
    let mut batch = String::new();
    for _ in 0..64 {
        batch.push_str(MSG_LINE);
        batch.push_str("\r\n");
    }
    group.throughput(Throughput::Bytes(batch.len() as u64));

    group.bench_function("decode_64_lines", |b| {
        b.iter(|| {
            let mut codec = LineCodec::new();
            let mut buf = BytesMut::from(batch.as_bytes());
            let mut count = 0;
            while let Ok(Some(_)) = codec.decode(&mut buf) {
                count += 1;
            }
            black_box(count)
        })
    });

    group.finish();
}

fn benchmark_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("Envelope Encoding");
    let chat = Envelope::new("alice", TEXT_LINE);
    let probe = Envelope::heartbeat();

    group.bench_function("chat_line", |b| {
        let mut codec = ServerCodec::default();
        let mut buf = BytesMut::with_capacity(256);
        b.iter(|| {
            buf.clear();
            codec.encode(black_box(&chat), &mut buf).unwrap();
            black_box(buf.len())
        })
    });

    group.bench_function("heartbeat_probe", |b| {
        let mut codec = ServerCodec::default();
        let mut buf = BytesMut::with_capacity(64);
        b.iter(|| {
            buf.clear();
            codec.encode(black_box(&probe), &mut buf).unwrap();
            black_box(buf.len())
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_parsing, benchmark_framing, benchmark_encoding);
criterion_main!(benches);
