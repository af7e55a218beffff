//! # 倉儲班次模擬範例
//!
//! 展示一個班次內的完整分配流程：
//! - 倉儲：一座棧板 ASRS、一座料盤 AVSRS
//! - 預熱：依產品門檻補到 S
//! - 出庫：揀貨、剩餘量送回入庫
//! - 補貨：(s, S) 觸發與週期檢查

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use wms::wms_core::*;
use wms::wms_store::{Agv, ManualClock, RackStore, RecordingSink};
use wms::{StoresManager, WarmupMode};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("===== 倉儲班次模擬 =====\n");

    // ========== 1. 產品與配置 ==========
    println!("[1] 建立產品目錄");
    let catalog = Arc::new(ProductCatalog::new(vec![
        Product::new(ProductId(81), 4, 5)
            .with_family("A")
            .with_thresholds(ContainerType::Pallet, 20, 60)
            .with_thresholds(ContainerType::Tray, 8, 40),
        Product::new(ProductId(12), 6, 4)
            .with_family("B")
            .with_thresholds(ContainerType::Pallet, 24, 48)
            .with_thresholds(ContainerType::Tray, 12, 36),
    ])?);
    println!("    產品數: {}\n", catalog.len());

    let config = AllocationConfig::new().with_shortfall_policy(ShortfallPolicy::UnderSupply);
    let clock = Arc::new(ManualClock::new());
    let sink = Arc::new(RecordingSink::new());
    let manager = StoresManager::new(config, catalog.clone(), sink.clone(), clock.clone());

    // ========== 2. 倉儲與預熱 ==========
    println!("[2] 註冊倉儲並預熱");
    let asrs = Arc::new(RackStore::new(StoreId(1), StoreKind::Asrs, 40));
    let avsrs = Arc::new(
        RackStore::new(StoreId(2), StoreKind::Avsrs, 80).with_handling_time(clock.clone(), 30.0),
    );
    manager.register(asrs.clone());
    manager.register(avsrs.clone());

    let report = manager.warmup(WarmupMode::Products)?;
    println!(
        "    棧板: {} ({} 箱), 料盤: {} ({} 箱)\n",
        report.unit_loads.pallet, report.cases.pallet, report.unit_loads.tray, report.cases.tray
    );

    // ========== 3. 揀貨 ==========
    println!("[3] 執行揀貨");
    let picks = [
        (StoreKind::Avsrs, ProductId(81), 3),
        (StoreKind::Avsrs, ProductId(12), 10),
        (StoreKind::Asrs, ProductId(81), 8),
        (StoreKind::Avsrs, ProductId(81), 4),
        (StoreKind::Asrs, ProductId(12), 30),
        (StoreKind::Avsrs, ProductId(12), 6),
    ];

    let mut carrier = 0;
    for (kind, product, n_cases) in picks {
        clock.advance(120.0);
        let Some(assignment) = manager.unload(kind, &PickRequest::new(product, n_cases), false)? else {
            println!("    {} {}: 無可用負載", kind, product);
            continue;
        };

        let mut unit_load = assignment.store.take(assignment.location, assignment.slot)?;
        println!(
            "    {} {} 需求 {} 箱 → {} {} 取出 {} 箱",
            kind,
            product,
            n_cases,
            assignment.location,
            assignment.slot,
            unit_load.n_cases()
        );

        // 整層揀取，剩餘層送回原倉儲
        let mut picked = 0;
        while picked < n_cases {
            match unit_load.remove_layer() {
                Some(layer) => picked += layer.n_cases,
                None => break,
            }
        }
        if unit_load.n_cases() > 0 {
            carrier += 1;
            let store = if kind == StoreKind::Asrs { &asrs } else { &avsrs };
            let agv = Agv::new(CarrierId(carrier), unit_load);
            let location = manager.load(store.as_ref(), &agv).await?;
            println!("      剩餘 {} 箱送回 {}", agv.unit_load().n_cases(), location);
        }
    }
    println!();

    // ========== 4. 補貨 ==========
    println!("[4] 補貨");
    let tasks = sink.drain();
    println!("    事件觸發補貨任務: {}", tasks.len());
    for task in &tasks {
        let product = catalog.get(task.product)?;
        let store = if task.container == ContainerType::Pallet { &asrs } else { &avsrs };
        let unit_loads = match task.container {
            ContainerType::Pallet => vec![UnitLoad::full_pallet(product)],
            ContainerType::Tray => (0..product.layers_per_pallet)
                .map(|_| UnitLoad::tray(product.id, product.cases_per_layer))
                .collect(),
        };
        for unit_load in unit_loads {
            carrier += 1;
            manager
                .load(store.as_ref(), &Agv::new(CarrierId(carrier), unit_load))
                .await?;
        }
    }

    let periodic = manager.replenishment_sweep()?;
    println!("    週期檢查補貨任務: {}\n", periodic);

    // ========== 5. 結果 ==========
    println!("[5] 班次結束庫存");
    for product in manager.tracked_products() {
        for container in ContainerType::ALL {
            if let Some(entry) = manager.stock(product, container) {
                println!(
                    "    {} {:<6} 現有 {:>4}  在途 {:>4}  位置 {:>4}",
                    product,
                    container,
                    entry.on_hand,
                    entry.on_transit,
                    entry.inventory_position()
                );
            }
        }
    }
    println!("    快照筆數: {}", manager.history().len());
    println!("    模擬時間: {:.0} 秒", clock.now());

    manager.close();
    Ok(())
}
