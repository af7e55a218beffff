//! # WMS Core
//!
//! 倉儲分配引擎的核心資料模型、配置與協作者介面

pub mod config;
pub mod container;
pub mod location;
pub mod ports;
pub mod product;
pub mod stock;
pub mod task;
pub mod unit_load;

// Re-export 主要類型
pub use config::{AllocationConfig, ShortfallPolicy, StockGuard};
pub use container::{ContainerType, PerContainer, StoreKind};
pub use location::{Location, LocationId, PhysicalPosition, Slot, StoreId};
pub use ports::{Carrier, CarrierId, ReplenishmentSink, SimClock, Store};
pub use product::{Product, ProductCatalog, ProductId};
pub use stock::{InventoryKind, StockEntry, StockSnapshot};
pub use task::{PickRequest, PickSource, ReplenishmentTask, ShortfallEvent, ShortfallKind};
pub use unit_load::{Layer, UnitLoad};

/// 倉儲分配錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum WmsError {
    #[error("沒有已註冊的倉儲: {0}")]
    NoStoresRegistered(StoreKind),

    #[error("產品 {product} 配置無效: {reason}")]
    InvalidProduct { product: ProductId, reason: String },

    #[error("找不到產品: {0}")]
    UnknownProduct(ProductId),

    #[error("產品尚未建立庫存紀錄: {0}")]
    UntrackedProduct(ProductId),

    #[error("找不到產品 {product} 的儲位（需求 {quantity} 箱）")]
    LocationNotFound { product: ProductId, quantity: u32 },

    #[error("倉儲 {store} 沒有可存放產品 {product} 的儲位")]
    NoFreeLocation { store: StoreId, product: ProductId },

    #[error("無效的單元負載: {0}")]
    InvalidUnitLoad(String),

    #[error("儲位不可用: {0}")]
    LocationUnavailable(String),

    #[error("儲位 {location} 的 {slot} 位置為空")]
    PositionEmpty { location: LocationId, slot: Slot },

    #[error("庫存不可為負: 產品 {product} {container} {kind} 現為 {current}，變動 {delta}")]
    NegativeStock {
        product: ProductId,
        container: ContainerType,
        kind: InventoryKind,
        current: i64,
        delta: i64,
    },

    #[error("不支援的預熱模式: {0}")]
    UnsupportedWarmup(String),

    #[error("管理器已關閉")]
    ManagerClosed,

    #[error("倉儲錯誤: {0}")]
    Store(String),

    #[error("序列化錯誤: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WmsError {
    /// 是否為配置錯誤（不應重試）
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            WmsError::NoStoresRegistered(_)
                | WmsError::InvalidProduct { .. }
                | WmsError::UnknownProduct(_)
                | WmsError::UnsupportedWarmup(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, WmsError>;
