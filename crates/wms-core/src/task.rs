//! 揀貨請求、補貨任務與缺貨事件

use crate::{ContainerType, LocationId, ProductId, Slot, StoreId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 出庫揀貨請求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickRequest {
    pub id: Uuid,
    pub product: ProductId,
    pub n_cases: u32,
}

impl PickRequest {
    pub fn new(product: ProductId, n_cases: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            product,
            n_cases,
        }
    }
}

/// 揀貨來源：(倉儲, 儲位, 位置)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PickSource {
    pub store: StoreId,
    pub location: LocationId,
    pub slot: Slot,
}

/// 補貨任務：請外部補貨流程生產一棧板的量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplenishmentTask {
    pub id: Uuid,
    pub product: ProductId,
    pub container: ContainerType,
    /// 預留的箱數（一棧板）
    pub n_cases: u32,
    /// 發出時的模擬時間（秒）
    pub issued_at: f64,
}

impl ReplenishmentTask {
    pub fn new(product: ProductId, container: ContainerType, n_cases: u32, issued_at: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            product,
            container,
            n_cases,
            issued_at,
        }
    }
}

/// 缺貨類別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortfallKind {
    /// 倉內完全無庫存，整個負載皆為合成
    FromNothing,
    /// 以合成箱數補足現有不足的負載
    ToppedUp,
}

/// 缺貨事件：重組搜尋無法滿足需求時的合成補足紀錄
///
/// 合成箱數只記錄於此，不進入現有庫存。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortfallEvent {
    pub id: Uuid,
    pub product: ProductId,
    pub container: ContainerType,
    pub requested: u32,
    /// 實際可取得的箱數
    pub available: u32,
    /// 合成的箱數
    pub synthesized: u32,
    pub kind: ShortfallKind,
    pub sim_time: f64,
}

impl ShortfallEvent {
    /// 記錄一次缺貨：合成箱數 = 需求 - 可取得
    pub fn new(
        product: ProductId,
        container: ContainerType,
        requested: u32,
        available: u32,
        sim_time: f64,
    ) -> Self {
        let kind = if available == 0 {
            ShortfallKind::FromNothing
        } else {
            ShortfallKind::ToppedUp
        };
        Self {
            id: Uuid::new_v4(),
            product,
            container,
            requested,
            available,
            synthesized: requested.saturating_sub(available),
            kind,
            sim_time,
        }
    }
}
