//! 儲位策略與單元負載策略
//!
//! - [`LocationPolicy`]：入庫時為負載挑選儲位
//! - [`UnitLoadPolicy`]：出庫時挑選足以滿足揀貨量的負載

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;
use wms_core::{Location, LocationId, PickSource, Product, Store};

/// 入庫儲位策略
///
/// 返回的儲位必須可被預約（未凍結滿、未預約出庫）。
pub trait LocationPolicy: Send + Sync {
    fn select(&self, store: &dyn Store, product: &Product) -> Option<LocationId>;
}

/// 出庫單元負載策略
///
/// 返回的位置必須存放此產品、未預約出庫，且箱數不少於 `quantity`。
pub trait UnitLoadPolicy: Send + Sync {
    fn select(
        &self,
        stores: &[Arc<dyn Store>],
        product: &Product,
        quantity: u32,
    ) -> Option<PickSource>;
}

/// 倉儲提供的第一個可用儲位（同產品儲位優先）
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstAvailableLocationPolicy;

impl LocationPolicy for FirstAvailableLocationPolicy {
    fn select(&self, store: &dyn Store, product: &Product) -> Option<LocationId> {
        store.first_available_location_for_product(product.id)
    }
}

/// 在所有可接收此產品的儲位中隨機挑選
#[derive(Debug)]
pub struct RandomLocationPolicy {
    rng: Mutex<StdRng>,
}

impl RandomLocationPolicy {
    /// 固定種子，可重現
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl LocationPolicy for RandomLocationPolicy {
    fn select(&self, store: &dyn Store, product: &Product) -> Option<LocationId> {
        let candidates: Vec<LocationId> = store
            .locations()
            .into_iter()
            .filter(|l| l.accepts_inbound(product.id))
            .map(|l| l.id)
            .collect();
        candidates.choose(&mut *self.rng.lock()).copied()
    }
}

/// 位置是否可供此產品出庫 `quantity` 箱
fn pickable<'a>(
    location: &'a Location,
    product: &'a Product,
    quantity: u32,
) -> impl Iterator<Item = (wms_core::Slot, u32)> + 'a {
    location
        .positions()
        .filter(move |_| !location.has_booked_pickup() && !location.is_frozen())
        .filter_map(move |position| {
            let unit_load = position.unit_load.as_ref()?;
            (unit_load.product == product.id && unit_load.n_cases() >= quantity)
                .then(|| (position.slot, unit_load.n_cases()))
        })
}

/// 跨倉儲挑選箱數最少但足夠的負載，減少退回的剩餘量
#[derive(Debug, Clone, Copy, Default)]
pub struct SmallestSufficientUnitLoadPolicy;

impl UnitLoadPolicy for SmallestSufficientUnitLoadPolicy {
    fn select(
        &self,
        stores: &[Arc<dyn Store>],
        product: &Product,
        quantity: u32,
    ) -> Option<PickSource> {
        let mut best: Option<(u32, PickSource)> = None;
        for store in stores {
            for location in store.locations() {
                for (slot, n_cases) in pickable(&location, product, quantity) {
                    if best.map_or(true, |(cases, _)| n_cases < cases) {
                        best = Some((
                            n_cases,
                            PickSource {
                                store: store.id(),
                                location: location.id,
                                slot,
                            },
                        ));
                    }
                }
            }
        }
        best.map(|(_, source)| source)
    }
}

/// 第一個足夠的負載
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFitUnitLoadPolicy;

impl UnitLoadPolicy for FirstFitUnitLoadPolicy {
    fn select(
        &self,
        stores: &[Arc<dyn Store>],
        product: &Product,
        quantity: u32,
    ) -> Option<PickSource> {
        stores.iter().find_map(|store| {
            store.locations().iter().find_map(|location| {
                pickable(location, product, quantity)
                    .next()
                    .map(|(slot, _)| PickSource {
                        store: store.id(),
                        location: location.id,
                        slot,
                    })
            })
        })
    }
}
