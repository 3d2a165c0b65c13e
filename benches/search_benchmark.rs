use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use graphsuite::graph::property::from_json;
use graphsuite::graph::{Graph, GraphEdit, MemoryGraph, NodeBody, PropertyMap};
use graphsuite::query::{types_of, Searcher};
use graphsuite::FsGraph;
use serde_json::json;
use tokio::runtime::Runtime;

const TYPES: [&str; 4] = ["Person", "Company", "Doc", "Tag"];

fn props(i: usize) -> PropertyMap {
    from_json(json!({"name": format!("item{}", i), "bucket": i % 10}))
}

async fn populate<G: GraphEdit>(graph: &G, size: usize) {
    for i in 0..size {
        graph
            .create_node(NodeBody::new(TYPES[i % TYPES.len()], props(i)))
            .await
            .unwrap();
    }
}

fn narrowed() -> Searcher {
    Searcher::and(vec![
        Searcher::type_eq("Doc"),
        Searcher::property_eq("$.bucket", 3),
    ])
}

fn unnarrowed() -> Searcher {
    Searcher::property_eq("$.bucket", 3)
}

/// Benchmark planning of nested searchers
fn bench_planner(c: &mut Criterion) {
    let searcher = Searcher::and(vec![
        Searcher::or(vec![Searcher::type_eq("A"), Searcher::type_eq("B")]),
        Searcher::and(vec![Searcher::type_eq("A"), Searcher::property_eq("$.x", 1)]),
        Searcher::not(Searcher::property_eq("$.y", 2)),
    ]);
    c.bench_function("types_of_nested", |b| {
        b.iter(|| criterion::black_box(types_of(&searcher).unwrap()));
    });
}

/// Benchmark full-scan search in memory
fn bench_memory_search(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("memory_search");

    for size in [100, 1000, 10_000].iter() {
        let graph = MemoryGraph::new();
        rt.block_on(populate(&graph, *size));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let found = rt.block_on(graph.search_nodes(&narrowed())).unwrap();
                criterion::black_box(found.len());
            });
        });
    }
    group.finish();
}

/// Benchmark type-pruned vs unpruned search on the filesystem engine
fn bench_filesystem_search(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("filesystem_search");
    group.sample_size(20);

    for size in [100, 1000].iter() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let graph = rt.block_on(FsGraph::open(temp_dir.path())).unwrap();
        rt.block_on(populate(&graph, *size));

        group.bench_with_input(BenchmarkId::new("by_type", size), size, |b, _| {
            b.iter(|| {
                let found = rt.block_on(graph.search_nodes(&narrowed())).unwrap();
                criterion::black_box(found.len());
            });
        });
        group.bench_with_input(BenchmarkId::new("all_types", size), size, |b, _| {
            b.iter(|| {
                let found = rt.block_on(graph.search_nodes(&unnarrowed())).unwrap();
                criterion::black_box(found.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_planner,
    bench_memory_search,
    bench_filesystem_search
);
criterion_main!(benches);
