use common::OrderRef;
use criterion::{Criterion, criterion_group, criterion_main};
use stock::{InMemoryStockLedger, StockLedger, StockLine};

fn bench_check_availability(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let ledger = InMemoryStockLedger::new();
    rt.block_on(async {
        for i in 0..100 {
            ledger.seed(format!("P{i}"), None, 1_000_000).await;
        }
    });

    let lines: Vec<StockLine> = (0..5)
        .map(|i| StockLine::new(format!("P{i}"), None, 1))
        .collect();

    c.bench_function("stock/check_availability_5_lines", |b| {
        b.iter(|| {
            rt.block_on(async {
                ledger.check_availability(&lines).await.unwrap();
            });
        });
    });
}

fn bench_decrement(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let ledger = InMemoryStockLedger::new();
    rt.block_on(async {
        ledger.seed("P1", None, u32::MAX).await;
    });

    c.bench_function("stock/decrement_single_line", |b| {
        b.iter(|| {
            rt.block_on(async {
                ledger
                    .decrement(OrderRef::new(), &[StockLine::new("P1", None, 1)])
                    .await
                    .unwrap();
            });
        });
    });
}

criterion_group!(benches, bench_check_availability, bench_decrement);
criterion_main!(benches);
