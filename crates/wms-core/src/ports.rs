//! 外部協作者介面：倉儲、搬運車、補貨流程與模擬時鐘
//!
//! 分配引擎只透過這些介面與外部世界互動。所有方法皆為同步呼叫，
//! 只有實體放置（[`Store::accept`]）與計時等待（[`SimClock::timeout`]）
//! 會返回需等待的 future。

use crate::{
    ContainerType, Location, LocationId, ProductId, ReplenishmentTask, Result, Slot, StoreId,
    StoreKind, UnitLoad,
};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 搬運車ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarrierId(pub u32);

impl fmt::Display for CarrierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "carrier-{}", self.0)
    }
}

/// 倉儲
///
/// 儲位由倉儲擁有；分配管理器只透過預約、放置與取出操作改變儲位狀態。
pub trait Store: Send + Sync {
    fn id(&self) -> StoreId;

    fn kind(&self) -> StoreKind;

    /// 此倉儲處理的容器類型
    fn container_type(&self) -> ContainerType {
        self.kind().container_type()
    }

    /// 所有儲位的快照（依儲位順序）
    fn locations(&self) -> Vec<Location>;

    fn location(&self, id: LocationId) -> Option<Location>;

    /// 第一個可入庫的儲位
    fn first_available_location(&self) -> Option<LocationId>;

    /// 第一個可存放此產品的儲位
    fn first_available_location_for_product(&self, product: ProductId) -> Option<LocationId> {
        let _ = product;
        self.first_available_location()
    }

    /// 預熱時使用的儲位搜尋
    fn first_available_location_for_warmup(&self, unit_load: &UnitLoad) -> Option<LocationId> {
        self.first_available_location_for_product(unit_load.product)
    }

    /// 為即將入庫的負載預約（凍結）儲位
    fn book_location(&self, location: LocationId, unit_load: &UnitLoad) -> Result<()>;

    /// 預約出庫，返回被預約負載的副本
    fn book_pickup(&self, location: LocationId, slot: Slot) -> Result<UnitLoad>;

    /// 立即放置負載（不經搬運流程）
    fn put(&self, location: LocationId, unit_load: UnitLoad) -> Result<Slot>;

    /// 立即取出負載
    fn take(&self, location: LocationId, slot: Slot) -> Result<UnitLoad>;

    /// 接收搬運車上的負載並放置於已預約儲位，完成實體放置後 future 才完成
    fn accept(
        &self,
        location: LocationId,
        unit_load: UnitLoad,
        carrier: CarrierId,
    ) -> BoxFuture<'static, Result<()>>;
}

/// 搬運車（正在倉儲前等待卸貨）
pub trait Carrier: Send + Sync {
    fn id(&self) -> CarrierId;

    fn unit_load(&self) -> &UnitLoad;
}

/// 補貨流程：每需要一棧板呼叫一次，不等待結果
///
/// 實作不可同步回呼分配管理器。
pub trait ReplenishmentSink: Send + Sync {
    fn store_replenishment(&self, task: ReplenishmentTask);
}

/// 模擬時鐘
pub trait SimClock: Send + Sync {
    /// 目前模擬時間（秒）
    fn now(&self) -> f64;

    /// 等待一段模擬時間
    fn timeout(&self, secs: f64) -> BoxFuture<'static, ()>;
}
