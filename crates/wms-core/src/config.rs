//! 分配引擎配置

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 預設週期補貨間隔：8 小時
pub const DEFAULT_REPLENISHMENT_INTERVAL_SECS: u64 = 60 * 60 * 8;

/// 重組搜尋無法滿足需求時的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortfallPolicy {
    /// 以現有最大累積量出庫（不足量），完全無庫存時視為找不到儲位
    #[default]
    UnderSupply,
    /// 合成缺少的箱數並記錄缺貨事件
    Synthesize,
}

/// 庫存計數的邊界檢查
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockGuard {
    /// 拒絕任何使計數為負的變動
    #[default]
    Strict,
    /// 允許暫時為負，只記錄警告
    Permissive,
}

/// 分配管理器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// 週期補貨間隔（模擬秒）
    pub replenishment_interval_secs: u64,

    /// 缺貨處理方式
    pub shortfall_policy: ShortfallPolicy,

    /// 庫存邊界檢查
    pub stock_guard: StockGuard,

    /// 模擬時間 0 對應的日曆時間
    pub simulation_epoch: NaiveDateTime,

    /// 是否記錄庫存快照
    pub record_history: bool,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            replenishment_interval_secs: DEFAULT_REPLENISHMENT_INTERVAL_SECS,
            shortfall_policy: ShortfallPolicy::default(),
            stock_guard: StockGuard::default(),
            simulation_epoch: NaiveDateTime::default(),
            record_history: true,
        }
    }
}

impl AllocationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置週期補貨間隔
    pub fn with_replenishment_interval_secs(mut self, secs: u64) -> Self {
        self.replenishment_interval_secs = secs;
        self
    }

    /// 建構器模式：設置缺貨處理方式
    pub fn with_shortfall_policy(mut self, policy: ShortfallPolicy) -> Self {
        self.shortfall_policy = policy;
        self
    }

    /// 建構器模式：設置庫存邊界檢查
    pub fn with_stock_guard(mut self, guard: StockGuard) -> Self {
        self.stock_guard = guard;
        self
    }

    /// 建構器模式：設置模擬起始日曆時間
    pub fn with_simulation_epoch(mut self, epoch: NaiveDateTime) -> Self {
        self.simulation_epoch = epoch;
        self
    }

    /// 建構器模式：設置是否記錄庫存快照
    pub fn with_record_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }

    /// 模擬秒數轉日曆時間
    pub fn timestamp(&self, sim_time: f64) -> NaiveDateTime {
        self.simulation_epoch + Duration::milliseconds((sim_time * 1000.0).round() as i64)
    }
}
