//! 補貨觸發（(s, S) 策略）

use wms_core::{ContainerType, Product};

/// 補貨決策
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplenishmentDecision {
    /// 評估時的庫存位置
    pub inventory_position: i64,
    /// 補到 S 所需箱數
    pub needed: i64,
    /// 需要的棧板數
    pub n_pallets: u32,
    /// 預留為在途的箱數
    pub reserved_cases: i64,
}

/// 評估是否需要補貨
///
/// 庫存位置落到 s 或以下（或週期檢查）時補到 S，按整棧板向上取整。
/// 位置介於 s 與 S 之間時不觸發。
pub fn evaluate(
    product: &Product,
    container: ContainerType,
    inventory_position: i64,
    periodic_check: bool,
) -> Option<ReplenishmentDecision> {
    if !periodic_check && inventory_position > product.s_min(container) {
        return None;
    }

    let needed = (product.s_max(container) - inventory_position).max(0);
    let per_pallet = i64::from(product.case_per_pallet.max(1));
    let n_pallets = (needed + per_pallet - 1) / per_pallet;

    Some(ReplenishmentDecision {
        inventory_position,
        needed,
        n_pallets: u32::try_from(n_pallets).unwrap_or(u32::MAX),
        reserved_cases: n_pallets * per_pallet,
    })
}
