//! 集成測試

use chrono::{Duration, NaiveDate};
use futures::StreamExt;
use rstest::{fixture, rstest};
use std::sync::Arc;
use wms::wms_core::*;
use wms::wms_store::{Agv, ChannelSink, ManualClock, RackStore, RecordingSink};
use wms::{StoresManager, WarmupMode};

const A: ProductId = ProductId(81);
const B: ProductId = ProductId(7);

fn catalog() -> ProductCatalog {
    ProductCatalog::new(vec![
        // 每棧板 5 層 × 4 箱
        Product::new(A, 4, 5)
            .with_family("A")
            .with_thresholds(ContainerType::Pallet, 20, 60)
            .with_thresholds(ContainerType::Tray, 8, 40),
        // 每棧板 2 層 × 6 箱
        Product::new(B, 6, 2)
            .with_family("B")
            .with_thresholds(ContainerType::Pallet, 12, 24)
            .with_thresholds(ContainerType::Tray, 6, 12),
    ])
    .unwrap()
}

struct Warehouse {
    manager: StoresManager,
    asrs: Arc<RackStore>,
    avsrs: Arc<RackStore>,
    sink: Arc<RecordingSink>,
    clock: Arc<ManualClock>,
}

impl Warehouse {
    fn new(config: AllocationConfig) -> Self {
        let sink = Arc::new(RecordingSink::new());
        let clock = Arc::new(ManualClock::new());
        let manager = StoresManager::new(config, Arc::new(catalog()), sink.clone(), clock.clone());
        let asrs = Arc::new(RackStore::new(StoreId(1), StoreKind::Asrs, 10));
        let avsrs = Arc::new(RackStore::new(StoreId(2), StoreKind::Avsrs, 20));
        manager.register(asrs.clone());
        manager.register(avsrs.clone());
        Self {
            manager,
            asrs,
            avsrs,
            sink,
            clock,
        }
    }

    fn warmed_up(config: AllocationConfig) -> Self {
        let warehouse = Self::new(config);
        warehouse.manager.warmup(WarmupMode::Products).unwrap();
        warehouse
    }

    /// 預約出庫並立即從倉儲取走
    fn pick(&self, kind: StoreKind, product: ProductId, n_cases: u32) -> UnitLoad {
        let assignment = self
            .manager
            .unload(kind, &PickRequest::new(product, n_cases), true)
            .unwrap()
            .unwrap();
        assignment
            .store
            .take(assignment.location, assignment.slot)
            .unwrap()
    }

    /// 現有庫存必須等於倉內尚未預約出庫的實際箱數
    fn assert_conserved(&self, product: ProductId) {
        for (store, container) in [
            (&self.asrs, ContainerType::Pallet),
            (&self.avsrs, ContainerType::Tray),
        ] {
            let on_hand = self.manager.stock(product, container).unwrap().on_hand;
            assert_eq!(on_hand, resident_cases(store, product), "{} {}", product, container);
        }
    }
}

fn resident_cases(store: &RackStore, product: ProductId) -> i64 {
    store
        .locations()
        .iter()
        .map(|location| {
            location
                .unit_loads()
                .filter(|ul| ul.product == product && !ul.is_synthetic())
                .filter(|ul| !location.booked_pickups.contains(&ul.id))
                .map(|ul| i64::from(ul.n_cases()))
                .sum::<i64>()
        })
        .sum()
}

#[fixture]
fn warehouse() -> Warehouse {
    Warehouse::warmed_up(AllocationConfig::default())
}

#[rstest]
fn test_warmup_seeds_both_store_kinds(warehouse: Warehouse) {
    let a_pallet = warehouse.manager.stock(A, ContainerType::Pallet).unwrap();
    let a_tray = warehouse.manager.stock(A, ContainerType::Tray).unwrap();
    let b_pallet = warehouse.manager.stock(B, ContainerType::Pallet).unwrap();
    let b_tray = warehouse.manager.stock(B, ContainerType::Tray).unwrap();

    assert_eq!(a_pallet, StockEntry { on_hand: 60, on_transit: 0 });
    assert_eq!(a_tray.on_hand, 40);
    assert_eq!(b_pallet.on_hand, 24);
    assert_eq!(b_tray.on_hand, 12);

    warehouse.assert_conserved(A);
    warehouse.assert_conserved(B);
    assert!(warehouse.sink.is_empty());
}

#[tokio::test]
async fn test_pallet_remainder_returns_through_load() {
    let warehouse = Warehouse::warmed_up(AllocationConfig::default());

    let mut pallet = warehouse.pick(StoreKind::Asrs, A, 4);
    assert_eq!(pallet.n_cases(), 20);

    // 剩餘 16 箱在途
    let entry = warehouse.manager.stock(A, ContainerType::Pallet).unwrap();
    assert_eq!(entry, StockEntry { on_hand: 40, on_transit: 16 });
    warehouse.assert_conserved(A);

    pallet.remove_layer();
    let agv = Agv::new(CarrierId(1), pallet);
    warehouse
        .manager
        .load(warehouse.asrs.as_ref(), &agv)
        .await
        .unwrap();

    let entry = warehouse.manager.stock(A, ContainerType::Pallet).unwrap();
    assert_eq!(entry, StockEntry { on_hand: 56, on_transit: 0 });
    warehouse.assert_conserved(A);
    assert!(warehouse.sink.is_empty());
}

#[tokio::test]
async fn test_load_then_pick_consumes_only_requested_cases() {
    let warehouse = Warehouse::new(AllocationConfig::default());
    warehouse
        .manager
        .update_stock(B, ContainerType::Tray, InventoryKind::OnTransit, 12)
        .unwrap();
    let position = || {
        warehouse
            .manager
            .inventory_position(B, ContainerType::Tray)
            .unwrap()
    };
    assert_eq!(position(), 12);

    // 入庫只把在途轉為現有
    let agv = Agv::new(CarrierId(1), UnitLoad::tray(B, 12));
    warehouse
        .manager
        .load(warehouse.avsrs.as_ref(), &agv)
        .await
        .unwrap();
    assert_eq!(position(), 12);

    // 取出整個料盤，位置只減少需求的 4 箱，剩餘 8 箱留在在途
    let tray = warehouse.pick(StoreKind::Avsrs, B, 4);
    assert_eq!(tray.n_cases(), 12);
    assert_eq!(position(), 12 - 4);
    assert_eq!(
        warehouse.manager.stock(B, ContainerType::Tray).unwrap(),
        StockEntry { on_hand: 0, on_transit: 8 }
    );

    // 剩餘量送回後位置不變
    let agv = Agv::new(CarrierId(2), UnitLoad::tray(B, 8));
    warehouse
        .manager
        .load(warehouse.avsrs.as_ref(), &agv)
        .await
        .unwrap();
    assert_eq!(position(), 8);
    assert_eq!(
        warehouse.manager.stock(B, ContainerType::Tray).unwrap(),
        StockEntry { on_hand: 8, on_transit: 0 }
    );
    assert!(warehouse.sink.is_empty());
    warehouse.assert_conserved(B);
}

#[tokio::test]
async fn test_tray_depletion_replenishment_cycle() {
    let warehouse = Warehouse::warmed_up(AllocationConfig::default());

    for _ in 0..7 {
        warehouse.pick(StoreKind::Avsrs, A, 4);
    }
    assert!(warehouse.sink.is_empty());

    // 位置降到 8 = s → 補到 40：ceil(32 / 20) = 2 棧板
    warehouse.pick(StoreKind::Avsrs, A, 4);
    assert_eq!(warehouse.sink.count_for(A, ContainerType::Tray), 2);
    let entry = warehouse.manager.stock(A, ContainerType::Tray).unwrap();
    assert_eq!(entry, StockEntry { on_hand: 8, on_transit: 40 });
    warehouse.assert_conserved(A);

    // 補貨流程把每棧板拆成料盤送回
    let mut carrier = 0;
    for task in warehouse.sink.drain() {
        let product = warehouse.manager.catalog().get(task.product).unwrap();
        for _ in 0..product.layers_per_pallet {
            carrier += 1;
            let agv = Agv::new(
                CarrierId(carrier),
                UnitLoad::tray(task.product, product.cases_per_layer),
            );
            warehouse
                .manager
                .load(warehouse.avsrs.as_ref(), &agv)
                .await
                .unwrap();
        }
    }

    let entry = warehouse.manager.stock(A, ContainerType::Tray).unwrap();
    assert_eq!(entry, StockEntry { on_hand: 48, on_transit: 0 });
    warehouse.assert_conserved(A);
}

#[rstest]
fn test_defragmented_pick(warehouse: Warehouse) {
    let occupied = warehouse.avsrs.occupancy();

    // 單一料盤只有 4 箱，需合併三個儲位的料盤
    let assignment = warehouse
        .manager
        .unload(StoreKind::Avsrs, &PickRequest::new(A, 10), true)
        .unwrap()
        .unwrap();

    assert_eq!(assignment.unit_load.n_cases(), 12);
    assert!(!assignment.under_supplied);
    assert_eq!(warehouse.avsrs.occupancy(), occupied - 2);

    let entry = warehouse.manager.stock(A, ContainerType::Tray).unwrap();
    assert_eq!(entry, StockEntry { on_hand: 28, on_transit: 2 });
    warehouse.assert_conserved(A);
}

#[rstest]
fn test_periodic_sweep_tops_up_to_s_max(warehouse: Warehouse) {
    // 全部位於 S，週期檢查不發出任務
    assert_eq!(warehouse.manager.replenishment_sweep().unwrap(), 0);

    warehouse.pick(StoreKind::Avsrs, A, 4);
    warehouse.pick(StoreKind::Avsrs, A, 4);
    // 位置 32 仍高於 s，事件觸發不發出任務
    assert!(warehouse.sink.is_empty());

    assert_eq!(warehouse.manager.replenishment_sweep().unwrap(), 1);
    assert_eq!(warehouse.sink.count_for(A, ContainerType::Tray), 1);
    assert_eq!(
        warehouse.manager.stock(A, ContainerType::Tray).unwrap().on_transit,
        20
    );
}

#[test]
fn test_synthesized_shortfall_stays_out_of_on_hand() {
    let warehouse = Warehouse::warmed_up(
        AllocationConfig::new().with_shortfall_policy(ShortfallPolicy::Synthesize),
    );

    let assignment = warehouse
        .manager
        .unload(StoreKind::Avsrs, &PickRequest::new(B, 30), true)
        .unwrap()
        .unwrap();

    assert!(assignment.unit_load.is_synthetic());
    assert_eq!(assignment.unit_load.n_cases(), 30);

    let stats = warehouse.manager.shortfall_stats();
    assert_eq!(stats.tray.topped_up, 1);
    assert_eq!(stats.tray.from_nothing, 0);
    let event = &warehouse.manager.shortfalls()[0];
    assert_eq!((event.available, event.synthesized), (6, 24));

    // 位置 6 = s → 補一棧板
    let entry = warehouse.manager.stock(B, ContainerType::Tray).unwrap();
    assert_eq!(entry, StockEntry { on_hand: 6, on_transit: 12 });
    assert_eq!(warehouse.sink.count_for(B, ContainerType::Tray), 1);
    warehouse.assert_conserved(B);
}

#[test]
fn test_under_supply_by_default() {
    let warehouse = Warehouse::warmed_up(AllocationConfig::default());

    let assignment = warehouse
        .manager
        .unload(StoreKind::Avsrs, &PickRequest::new(B, 30), true)
        .unwrap()
        .unwrap();

    assert!(assignment.under_supplied);
    assert_eq!(assignment.unit_load.n_cases(), 6);
    assert!(warehouse.manager.shortfalls().is_empty());
    warehouse.assert_conserved(B);
}

#[test]
fn test_history_is_timestamped_from_epoch() {
    let epoch = NaiveDate::from_ymd_opt(2025, 1, 6)
        .unwrap()
        .and_hms_opt(6, 0, 0)
        .unwrap();
    let warehouse = Warehouse::new(AllocationConfig::new().with_simulation_epoch(epoch));
    warehouse.clock.advance(3600.0);
    warehouse.manager.warmup(WarmupMode::Products).unwrap();

    let history = warehouse.manager.history();
    // 棧板 2 + 3，料盤 2 + 10
    assert_eq!(history.len(), 17);
    assert!(history.iter().all(|s| s.at == epoch + Duration::hours(1)));

    let last = history.last().unwrap();
    assert_eq!(last.product, A);
    assert_eq!(last.tray_on_hand, 40);
    assert_eq!(last.pallet_on_hand, 60);
    assert!(warehouse.manager.history_json().unwrap().starts_with('['));
}

#[tokio::test]
async fn test_channel_sink_delivers_replenishment() {
    let (sink, rx) = ChannelSink::channel();
    let manager = StoresManager::new(
        AllocationConfig::default(),
        Arc::new(catalog()),
        Arc::new(sink),
        Arc::new(ManualClock::new()),
    );
    manager.register(Arc::new(RackStore::new(StoreId(1), StoreKind::Asrs, 4)));
    manager
        .update_stock(B, ContainerType::Pallet, InventoryKind::OnHand, 0)
        .unwrap();

    // 位置 0 → 補到 24：2 棧板
    assert_eq!(
        manager
            .check_replenishment(B, ContainerType::Pallet, false)
            .unwrap(),
        2
    );
    manager.close();
    drop(manager);

    let tasks: Vec<ReplenishmentTask> = rx.collect().await;
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|t| t.product == B && t.n_cases == 12));
}

#[test]
fn test_configuration_errors() {
    let warehouse = Warehouse::new(AllocationConfig::default());

    let err = warehouse
        .manager
        .unload(StoreKind::Avsrs, &PickRequest::new(ProductId(999), 1), true)
        .unwrap_err();
    assert!(err.is_configuration());

    assert!(warehouse.manager.warmup(WarmupMode::Random).is_err());
    assert!(ProductCatalog::new(vec![
        Product::new(A, 4, 5).with_thresholds(ContainerType::Tray, 50, 10)
    ])
    .is_err());
}
