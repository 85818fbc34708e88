//! Benchmarks for the handle codec, predicate evaluation and the list
//! strategy over a seeded in-process provider

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;
use unified_compute::providers::gogrid::{server_to_node_metadata, GoGridClient, GoGridConfig};
use unified_compute::{
    decode_handle, encode_handle, ComputeService, NodeLifecycleStrategy, NodeMetadata,
    NodePredicate, NodeStatus, SeedNode, SuspendOptions,
};

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("handle_codec");
    group.throughput(Throughput::Elements(1));

    group.bench_function("encode", |b| {
        b.iter(|| encode_handle(black_box("us-east-1"), black_box("i-0123456789abcdef0")));
    });

    group.bench_function("decode", |b| {
        b.iter(|| decode_handle(black_box("us-east-1/i-0123456789abcdef0")));
    });

    group.bench_function("decode_malformed", |b| {
        b.iter(|| decode_handle(black_box("us-east-1/i-1/extra")));
    });

    group.finish();
}

fn bench_predicate(c: &mut Criterion) {
    let mut group = c.benchmark_group("predicate");

    let nodes: Vec<NodeMetadata> = (0..1000)
        .map(|i| {
            let status = if i % 3 == 0 {
                NodeStatus::Running
            } else {
                NodeStatus::Suspended
            };
            NodeMetadata::new(encode_handle("us-east-1", &format!("i-{:04}", i)), "aws-ec2", status)
                .with_location(if i % 2 == 0 { "us-east-1a" } else { "us-east-1b" })
        })
        .collect();
    group.throughput(Throughput::Elements(nodes.len() as u64));

    let predicate = NodePredicate::running()
        .and(NodePredicate::in_location("us-east-1a"))
        .and(NodePredicate::with_ids(["us-east-1/i-0000", "us-east-1/i-0006"]).negate());

    group.bench_function("filter_1000", |b| {
        b.iter(|| {
            nodes
                .iter()
                .filter(|n| predicate.matches(black_box(n)))
                .count()
        });
    });

    group.finish();
}

fn bench_list_strategy(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_strategy");

    let datacenters = vec!["US-West-1".to_string(), "US-East-1".to_string()];
    let client = GoGridClient::new(GoGridConfig {
        datacenters: datacenters.clone(),
        ..Default::default()
    });
    tokio_test::block_on(async {
        for i in 0..1000 {
            let node = SeedNode {
                region: datacenters[i % 2].clone(),
                id: i.to_string(),
                name: None,
                state: if i % 4 == 0 { "Off" } else { "On" }.to_string(),
                addresses: vec![],
            };
            let _ = client.seed(&node).await;
        }
    });

    let service = ComputeService::new(
        Arc::new(client),
        server_to_node_metadata,
        SuspendOptions::default(),
    );
    group.throughput(Throughput::Elements(1000));

    group.bench_function("list_1000", |b| {
        b.iter(|| tokio_test::block_on(service.list_nodes()));
    });

    group.bench_function("list_running", |b| {
        let predicate = NodePredicate::running();
        b.iter(|| tokio_test::block_on(service.list_nodes_matching(black_box(&predicate))));
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_predicate, bench_list_strategy);
criterion_main!(benches);
