//! 庫存帳模型

use crate::ProductId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 庫存類別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryKind {
    /// 現有庫存（實體存放於已註冊倉儲）
    OnHand,
    /// 在途庫存（已承諾、尚未放置）
    OnTransit,
}

impl fmt::Display for InventoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryKind::OnHand => f.write_str("on_hand"),
            InventoryKind::OnTransit => f.write_str("on_transit"),
        }
    }
}

/// 單一 (產品, 容器類型) 的庫存計數
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StockEntry {
    pub on_hand: i64,
    pub on_transit: i64,
}

impl StockEntry {
    /// 庫存位置 = 現有 + 在途
    pub fn inventory_position(&self) -> i64 {
        self.on_hand + self.on_transit
    }

    pub fn get(&self, kind: InventoryKind) -> i64 {
        match kind {
            InventoryKind::OnHand => self.on_hand,
            InventoryKind::OnTransit => self.on_transit,
        }
    }

    pub fn get_mut(&mut self, kind: InventoryKind) -> &mut i64 {
        match kind {
            InventoryKind::OnHand => &mut self.on_hand,
            InventoryKind::OnTransit => &mut self.on_transit,
        }
    }
}

/// 庫存快照（每次庫存變動記錄一筆）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    /// 日曆時間
    pub at: NaiveDateTime,
    /// 模擬時間（秒）
    pub sim_time: f64,
    pub product: ProductId,
    pub pallet_on_hand: i64,
    pub pallet_on_transit: i64,
    pub tray_on_hand: i64,
    pub tray_on_transit: i64,
}
