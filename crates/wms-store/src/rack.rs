//! 雙深貨架倉儲

use futures::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;
use std::sync::Arc;
use wms_core::{
    CarrierId, Location, LocationId, ProductId, Result, SimClock, Slot, Store, StoreId,
    StoreKind, UnitLoad, WmsError,
};

/// 入庫搬運耗時
struct Handling {
    clock: Arc<dyn SimClock>,
    secs: f64,
}

/// 記憶體內的雙深貨架倉儲（ASRS 或 AVSRS）
pub struct RackStore {
    id: StoreId,
    kind: StoreKind,
    locations: Arc<Mutex<Vec<Location>>>,
    handling: Option<Handling>,
}

impl RackStore {
    /// 創建含 `n_locations` 個空儲位的倉儲
    pub fn new(id: StoreId, kind: StoreKind, n_locations: u32) -> Self {
        let locations = (0..n_locations).map(|i| Location::new(LocationId(i))).collect();
        Self {
            id,
            kind,
            locations: Arc::new(Mutex::new(locations)),
            handling: None,
        }
    }

    /// 建構器模式：設置入庫搬運耗時
    pub fn with_handling_time(mut self, clock: Arc<dyn SimClock>, secs: f64) -> Self {
        self.handling = Some(Handling { clock, secs });
        self
    }

    pub fn n_locations(&self) -> usize {
        self.locations.lock().len()
    }

    /// 已佔用的實體位置數
    pub fn occupancy(&self) -> usize {
        self.locations.lock().iter().map(Location::occupied).sum()
    }

    /// 完全空的儲位數
    pub fn empty_locations(&self) -> usize {
        self.locations.lock().iter().filter(|l| l.is_empty()).count()
    }

    /// 倉內某產品的實體箱數
    pub fn n_cases(&self, product: ProductId) -> u32 {
        self.locations
            .lock()
            .iter()
            .flat_map(|l| l.unit_loads())
            .filter(|ul| ul.product == product)
            .map(UnitLoad::n_cases)
            .sum()
    }

    fn with_location<T>(
        &self,
        id: LocationId,
        f: impl FnOnce(&mut Location) -> Result<T>,
    ) -> Result<T> {
        let mut locations = self.locations.lock();
        f(find_mut(&mut locations, self.id, id)?)
    }
}

fn find_mut(locations: &mut [Location], store: StoreId, id: LocationId) -> Result<&mut Location> {
    locations
        .get_mut(id.0 as usize)
        .filter(|l| l.id == id)
        .ok_or_else(|| WmsError::Store(format!("{} 沒有儲位 {}", store, id)))
}

impl Store for RackStore {
    fn id(&self) -> StoreId {
        self.id
    }

    fn kind(&self) -> StoreKind {
        self.kind
    }

    fn locations(&self) -> Vec<Location> {
        self.locations.lock().clone()
    }

    fn location(&self, id: LocationId) -> Option<Location> {
        self.locations.lock().get(id.0 as usize).filter(|l| l.id == id).cloned()
    }

    fn first_available_location(&self) -> Option<LocationId> {
        self.locations
            .lock()
            .iter()
            .find(|l| l.is_empty())
            .map(|l| l.id)
    }

    /// 優先補滿已存放同產品的儲位，否則取第一個空儲位
    fn first_available_location_for_product(&self, product: ProductId) -> Option<LocationId> {
        let locations = self.locations.lock();
        locations
            .iter()
            .find(|l| l.occupied() > 0 && l.accepts_inbound(product))
            .or_else(|| locations.iter().find(|l| l.is_empty()))
            .map(|l| l.id)
    }

    fn book_location(&self, location: LocationId, unit_load: &UnitLoad) -> Result<()> {
        self.with_location(location, |l| l.freeze(unit_load))
    }

    fn book_pickup(&self, location: LocationId, slot: Slot) -> Result<UnitLoad> {
        self.with_location(location, |l| l.book_pickup(slot))
    }

    fn put(&self, location: LocationId, unit_load: UnitLoad) -> Result<Slot> {
        self.with_location(location, |l| l.put(unit_load))
    }

    fn take(&self, location: LocationId, slot: Slot) -> Result<UnitLoad> {
        self.with_location(location, |l| l.take(slot))
    }

    fn accept(
        &self,
        location: LocationId,
        unit_load: UnitLoad,
        carrier: CarrierId,
    ) -> BoxFuture<'static, Result<()>> {
        let locations = Arc::clone(&self.locations);
        let handling = self.handling.as_ref().map(|h| h.clock.timeout(h.secs));
        let store = self.id;

        async move {
            if let Some(wait) = handling {
                wait.await;
            }
            let slot = {
                let mut locations = locations.lock();
                find_mut(&mut locations, store, location)?.put(unit_load)?
            };
            tracing::debug!(%store, %location, %slot, %carrier, "入庫放置完成");
            Ok(())
        }
        .boxed()
    }
}
