//! # WMS
//!
//! 自動化倉儲的分配與庫存引擎
//!
//! - [`wms_core`]：資料模型、配置、錯誤與協作者介面
//! - [`wms_alloc`]：庫存帳、重組搜尋、補貨觸發與分配管理器
//! - [`wms_store`]：記憶體內的倉儲、時鐘與補貨接收端

pub use wms_alloc;
pub use wms_core;
pub use wms_store;

pub use wms_alloc::{
    PickAssignment, ShortfallStats, ShutdownHandle, StoresManager, WarmupMode, WarmupReport,
};
pub use wms_core::{Result, WmsError};
