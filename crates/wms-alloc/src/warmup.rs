//! 預熱
//!
//! 模擬開始前依產品門檻把倉儲補到 S，並記入現有庫存。

use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;

use wms_core::{
    ContainerType, InventoryKind, PerContainer, Product, Result, Store, StoreKind, UnitLoad,
    WmsError,
};

use crate::manager::StoresManager;

/// 預熱儲位模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmupMode {
    /// 依產品門檻放置
    Products,
    /// 隨機放置（不支援）
    Random,
}

impl FromStr for WarmupMode {
    type Err = WmsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "products" => Ok(WarmupMode::Products),
            "random" => Ok(WarmupMode::Random),
            other => Err(WmsError::UnsupportedWarmup(other.to_string())),
        }
    }
}

/// 預熱結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WarmupReport {
    /// 放置的單元負載數
    pub unit_loads: PerContainer<u32>,
    /// 放置的箱數
    pub cases: PerContainer<u64>,
}

impl WarmupReport {
    fn record(&mut self, container: ContainerType, unit_load: &UnitLoad) {
        *self.unit_loads.get_mut(container) += 1;
        *self.cases.get_mut(container) += u64::from(unit_load.n_cases());
    }
}

/// 預熱時每種容器類型放置的棧板數，至少一棧板
fn warmup_pallets(product: &Product, container: ContainerType) -> u32 {
    let per_pallet = i64::from(product.case_per_pallet.max(1));
    let s_max = product.s_max(container).max(0);
    let n_pallets = (s_max + per_pallet - 1) / per_pallet;
    u32::try_from(n_pallets).unwrap_or(u32::MAX).max(1)
}

impl StoresManager {
    /// 預熱所有已註冊倉儲
    ///
    /// 對目錄中每個產品、每種已註冊的倉儲類型放置 `max(1, ceil(S / 每棧板箱數))` 棧板的量：
    /// ASRS 放整棧板，輪流分配到各倉儲；AVSRS 每棧板拆成每層一個料盤。
    pub fn warmup(&self, mode: WarmupMode) -> Result<WarmupReport> {
        if mode == WarmupMode::Random {
            return Err(WmsError::UnsupportedWarmup("random".to_string()));
        }

        let mut report = WarmupReport::default();
        let registered = self.registered_stores();

        for product in self.catalog().iter() {
            for (&kind, stores) in &registered {
                let container = kind.container_type();
                let n_pallets = warmup_pallets(product, container);

                match kind {
                    StoreKind::Asrs => {
                        for store in stores.iter().cycle().take(n_pallets as usize) {
                            let unit_load = UnitLoad::full_pallet(product);
                            self.seed(store, unit_load, &mut report)?;
                        }
                    }
                    StoreKind::Avsrs => {
                        for _ in 0..n_pallets {
                            let layers = product.layers_per_pallet as usize;
                            for store in stores.iter().cycle().take(layers) {
                                let unit_load = UnitLoad::tray(product.id, product.cases_per_layer);
                                self.seed(store, unit_load, &mut report)?;
                            }
                        }
                    }
                }
            }
        }

        tracing::info!(
            pallets = report.unit_loads.pallet,
            trays = report.unit_loads.tray,
            pallet_cases = report.cases.pallet,
            tray_cases = report.cases.tray,
            "預熱完成"
        );
        Ok(report)
    }

    fn seed(
        &self,
        store: &Arc<dyn Store>,
        unit_load: UnitLoad,
        report: &mut WarmupReport,
    ) -> Result<()> {
        let location = store
            .first_available_location_for_warmup(&unit_load)
            .ok_or(WmsError::NoFreeLocation {
                store: store.id(),
                product: unit_load.product,
            })?;
        let container = store.container_type();
        let product = unit_load.product;
        let n_cases = i64::from(unit_load.n_cases());

        report.record(container, &unit_load);
        self.freeze(store.as_ref(), location, &unit_load)?;
        store.put(location, unit_load)?;
        self.update_stock(product, container, InventoryKind::OnHand, n_cases)?;
        Ok(())
    }
}
