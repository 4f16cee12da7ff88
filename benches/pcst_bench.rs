use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use subgraph_retriever::pcst::PcstSolver;
use subgraph_retriever::prize::Prizes;
use subgraph_retriever::{Edge, Graph, Node, Query, RetrievalConfig, RetrievalLoader};
use tokio::runtime::Runtime;

const DIM: usize = 16;

fn embedding(seed: usize) -> Vec<f32> {
    (0..DIM)
        .map(|i| ((seed * 7 + i * 13) % 100) as f32 / 100.0 - 0.5)
        .collect()
}

/// `side x side` grid with right and down edges
fn grid(side: usize) -> Graph {
    let id = |r: usize, c: usize| (r * side + c) as u64;
    let nodes = (0..side * side)
        .map(|i| Node::new(i as u64, embedding(i)))
        .collect();

    let mut edges = Vec::new();
    for r in 0..side {
        for c in 0..side {
            if c + 1 < side {
                let e = edges.len();
                edges.push(Edge::new(e as u64, id(r, c), id(r, c + 1), embedding(e + 1000)));
            }
            if r + 1 < side {
                let e = edges.len();
                edges.push(Edge::new(e as u64, id(r, c), id(r + 1, c), embedding(e + 1000)));
            }
        }
    }
    Graph::new(nodes, edges).unwrap()
}

/// Every tenth node carries a prize
fn sparse_prizes(graph: &Graph) -> Prizes {
    let node_prizes = (0..graph.node_count())
        .map(|i| if i % 10 == 0 { (i % 7 + 1) as f64 } else { 0.0 })
        .collect();
    Prizes::new(node_prizes, vec![0.0; graph.edge_count()])
}

fn bench_solver(c: &mut Criterion) {
    let mut group = c.benchmark_group("pcst_solve");
    let solver = PcstSolver::default();

    for side in [10, 20, 40, 80].iter() {
        let graph = grid(*side);
        let prizes = sparse_prizes(&graph);
        group.throughput(Throughput::Elements(graph.edge_count() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(side), side, |b, _| {
            b.iter(|| solver.solve(black_box(&graph), black_box(&prizes)).unwrap());
        });
    }

    group.finish();
}

fn bench_retrieve_batch(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let config = RetrievalConfig {
        topk_nodes: 20,
        topk_edges: 10,
        ..RetrievalConfig::default()
    };
    let loader = RetrievalLoader::new(grid(30), config).unwrap();
    let queries: Vec<Query> = (0..32).map(|i| Query::new(embedding(i * 31))).collect();

    c.bench_function("retrieve_batch_32", |b| {
        b.iter(|| rt.block_on(loader.retrieve_batch(black_box(queries.clone()))).unwrap());
    });
}

criterion_group!(benches, bench_solver, bench_retrieve_batch);
criterion_main!(benches);
