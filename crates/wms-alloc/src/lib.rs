//! # WMS Allocation Engine
//!
//! 倉儲分配引擎：庫存帳、重組搜尋、(s, S) 補貨與分配管理器

pub mod defrag;
pub mod ledger;
pub mod manager;
pub mod policy;
pub mod replenishment;
pub mod warmup;

// Re-export 主要類型
pub use defrag::{DefragOutcome, DefragPlan};
pub use ledger::{StockChange, StockLedger};
pub use manager::{PickAssignment, ShortfallStats, ShutdownHandle, StoresManager};
pub use policy::{
    FirstAvailableLocationPolicy, FirstFitUnitLoadPolicy, LocationPolicy, RandomLocationPolicy,
    SmallestSufficientUnitLoadPolicy, UnitLoadPolicy,
};
pub use replenishment::ReplenishmentDecision;
pub use warmup::{WarmupMode, WarmupReport};
