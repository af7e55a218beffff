//! 庫存帳
//!
//! 以 (產品, 容器類型) 為鍵的現有/在途計數。只由分配管理器寫入。

use std::collections::BTreeMap;

use wms_core::{
    AllocationConfig, ContainerType, InventoryKind, PerContainer, ProductId, Result, StockEntry,
    StockGuard, StockSnapshot, WmsError,
};

/// 一筆計數變動
pub type StockChange = (InventoryKind, i64);

/// 庫存帳
#[derive(Debug, Clone)]
pub struct StockLedger {
    entries: BTreeMap<ProductId, PerContainer<StockEntry>>,
    history: Vec<StockSnapshot>,
    config: AllocationConfig,
}

impl StockLedger {
    pub fn new(config: AllocationConfig) -> Self {
        Self {
            entries: BTreeMap::new(),
            history: Vec::new(),
            config,
        }
    }

    /// 單筆變動，首次引用產品時兩種容器類型皆初始化為 0
    pub fn update(
        &mut self,
        product: ProductId,
        container: ContainerType,
        kind: InventoryKind,
        delta: i64,
        sim_time: f64,
    ) -> Result<StockEntry> {
        self.apply(product, container, &[(kind, delta)], sim_time)
    }

    /// 檢查一組變動是否違反邊界（不寫入）
    pub fn ensure(
        &self,
        product: ProductId,
        container: ContainerType,
        changes: &[StockChange],
    ) -> Result<()> {
        if self.config.stock_guard == StockGuard::Permissive {
            return Ok(());
        }

        let mut projected = self.entry(product, container).unwrap_or_default();
        for &(kind, delta) in changes {
            let current = projected.get(kind);
            let next = current + delta;
            if next < 0 {
                return Err(WmsError::NegativeStock {
                    product,
                    container,
                    kind,
                    current,
                    delta,
                });
            }
            *projected.get_mut(kind) = next;
        }
        Ok(())
    }

    /// 套用一組變動：全部通過檢查後才寫入，每筆變動記錄一次快照
    pub fn apply(
        &mut self,
        product: ProductId,
        container: ContainerType,
        changes: &[StockChange],
        sim_time: f64,
    ) -> Result<StockEntry> {
        self.ensure(product, container, changes)?;

        let mut totals = *self.entries.entry(product).or_default();
        for &(kind, delta) in changes {
            totals = {
                let entry = self.entries.entry(product).or_default();
                *entry.get_mut(container).get_mut(kind) += delta;
                *entry
            };

            let value = totals.get(container).get(kind);
            if value < 0 {
                tracing::warn!(%product, %container, %kind, value, delta, "庫存計數為負");
            }
            self.record(product, &totals, sim_time);
        }
        Ok(*totals.get(container))
    }

    fn record(&mut self, product: ProductId, totals: &PerContainer<StockEntry>, sim_time: f64) {
        if !self.config.record_history {
            return;
        }
        self.history.push(StockSnapshot {
            at: self.config.timestamp(sim_time),
            sim_time,
            product,
            pallet_on_hand: totals.pallet.on_hand,
            pallet_on_transit: totals.pallet.on_transit,
            tray_on_hand: totals.tray.on_hand,
            tray_on_transit: totals.tray.on_transit,
        });
    }

    /// 庫存位置；產品尚未建立紀錄時返回錯誤
    pub fn inventory_position(&self, product: ProductId, container: ContainerType) -> Result<i64> {
        self.entry(product, container)
            .map(|entry| entry.inventory_position())
            .ok_or(WmsError::UntrackedProduct(product))
    }

    pub fn entry(&self, product: ProductId, container: ContainerType) -> Option<StockEntry> {
        self.entries.get(&product).map(|e| *e.get(container))
    }

    pub fn is_tracked(&self, product: ProductId) -> bool {
        self.entries.contains_key(&product)
    }

    /// 已建立紀錄的產品（依ID排序）
    pub fn tracked_products(&self) -> Vec<ProductId> {
        self.entries.keys().copied().collect()
    }

    pub fn history(&self) -> &[StockSnapshot] {
        &self.history
    }
}
