//! 重組搜尋與出庫選擇的效能測試

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use wms::wms_alloc::defrag;
use wms::wms_alloc::{FirstFitUnitLoadPolicy, SmallestSufficientUnitLoadPolicy, UnitLoadPolicy};
use wms::wms_core::{Location, LocationId, Product, ProductId, Store, StoreId, StoreKind, UnitLoad};
use wms::wms_store::RackStore;

const P: ProductId = ProductId(1);

/// 每個儲位兩個不同箱數的料盤，混入其他產品
fn fragmented_locations(n: u32) -> Vec<Location> {
    (0..n)
        .map(|i| {
            let mut location = Location::new(LocationId(i));
            let product = if i % 5 == 0 { ProductId(2) } else { P };
            location.put(UnitLoad::tray(product, 1 + i % 7)).ok();
            location.put(UnitLoad::tray(product, 1 + i % 3)).ok();
            location
        })
        .collect()
}

fn fragmented_store(id: u32, n: u32) -> Arc<dyn Store> {
    let store = RackStore::new(StoreId(id), StoreKind::Avsrs, n);
    for location in fragmented_locations(n) {
        for unit_load in location.unit_loads() {
            store.put(location.id, unit_load.clone()).ok();
        }
    }
    Arc::new(store)
}

fn bench_defragment(c: &mut Criterion) {
    let mut group = c.benchmark_group("defragment");

    for n in [100u32, 1_000, 10_000] {
        let stores: Vec<(StoreId, Vec<Location>)> = (0..4)
            .map(|s| (StoreId(s), fragmented_locations(n)))
            .collect();

        group.bench_with_input(BenchmarkId::new("satisfied", n), &stores, |b, stores| {
            b.iter(|| defrag::defragment(stores.clone(), P, black_box(50)))
        });
        group.bench_with_input(BenchmarkId::new("insufficient", n), &stores, |b, stores| {
            b.iter(|| defrag::defragment(stores.clone(), P, black_box(u32::MAX)))
        });
    }

    group.finish();
}

fn bench_unit_load_policies(c: &mut Criterion) {
    let mut group = c.benchmark_group("unit_load_policy");
    let product = Product::new(P, 4, 5);

    for n in [100u32, 1_000] {
        let stores: Vec<Arc<dyn Store>> = (0..4).map(|s| fragmented_store(s, n)).collect();

        group.bench_with_input(BenchmarkId::new("smallest_sufficient", n), &stores, |b, stores| {
            b.iter(|| SmallestSufficientUnitLoadPolicy.select(stores, &product, black_box(5)))
        });
        group.bench_with_input(BenchmarkId::new("first_fit", n), &stores, |b, stores| {
            b.iter(|| FirstFitUnitLoadPolicy.select(stores, &product, black_box(5)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_defragment, bench_unit_load_policies);
criterion_main!(benches);
