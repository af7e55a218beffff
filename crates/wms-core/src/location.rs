//! 儲位與實體位置模型

use crate::{ProductId, Result, UnitLoad, WmsError};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 倉儲ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(pub u32);

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store-{}", self.0)
    }
}

/// 儲位ID（倉儲內唯一）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub u32);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loc-{}", self.0)
    }
}

/// 儲位內的實體位置：`First` 在前（靠通道），`Second` 在後（深位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    First,
    Second,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::First => f.write_str("first"),
            Slot::Second => f.write_str("second"),
        }
    }
}

/// 實體位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalPosition {
    pub slot: Slot,
    pub unit_load: Option<UnitLoad>,
}

impl PhysicalPosition {
    fn empty(slot: Slot) -> Self {
        Self {
            slot,
            unit_load: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.unit_load.is_none()
    }

    pub fn n_cases(&self) -> u32 {
        self.unit_load.as_ref().map_or(0, UnitLoad::n_cases)
    }
}

/// 雙深儲位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub first_position: PhysicalPosition,
    pub second_position: PhysicalPosition,

    /// 已預約出庫的單元負載
    pub booked_pickups: Vec<Uuid>,

    /// 已預約入庫、尚未放置的單元負載（凍結）
    pub future_unit_loads: Vec<Uuid>,
}

impl Location {
    pub const DEPTH: usize = 2;

    pub fn new(id: LocationId) -> Self {
        Self {
            id,
            first_position: PhysicalPosition::empty(Slot::First),
            second_position: PhysicalPosition::empty(Slot::Second),
            booked_pickups: Vec::new(),
            future_unit_loads: Vec::new(),
        }
    }

    pub fn position(&self, slot: Slot) -> &PhysicalPosition {
        match slot {
            Slot::First => &self.first_position,
            Slot::Second => &self.second_position,
        }
    }

    fn position_mut(&mut self, slot: Slot) -> &mut PhysicalPosition {
        match slot {
            Slot::First => &mut self.first_position,
            Slot::Second => &mut self.second_position,
        }
    }

    /// 前位優先
    pub fn positions(&self) -> impl Iterator<Item = &PhysicalPosition> {
        [&self.first_position, &self.second_position].into_iter()
    }

    pub fn unit_loads(&self) -> impl Iterator<Item = &UnitLoad> {
        self.positions().filter_map(|p| p.unit_load.as_ref())
    }

    pub fn occupied(&self) -> usize {
        self.unit_loads().count()
    }

    /// 剩餘可預約的位置數（已預約入庫也佔位）
    pub fn free_capacity(&self) -> usize {
        Self::DEPTH.saturating_sub(self.occupied() + self.future_unit_loads.len())
    }

    pub fn is_empty(&self) -> bool {
        self.occupied() == 0 && self.future_unit_loads.is_empty()
    }

    pub fn n_cases(&self) -> u32 {
        self.positions().map(PhysicalPosition::n_cases).sum()
    }

    /// 儲位內所有負載為同一產品時返回該產品
    pub fn physically_available_product(&self) -> Option<ProductId> {
        let mut products = self.unit_loads().map(|ul| ul.product);
        let first = products.next()?;
        products.all(|p| p == first).then_some(first)
    }

    pub fn has_booked_pickup(&self) -> bool {
        !self.booked_pickups.is_empty()
    }

    /// 已凍結給即將入庫的負載
    pub fn is_frozen(&self) -> bool {
        !self.future_unit_loads.is_empty()
    }

    /// 可否接收此產品的入庫
    pub fn accepts_inbound(&self, product: ProductId) -> bool {
        self.free_capacity() > 0
            && !self.has_booked_pickup()
            && (self.occupied() == 0 || self.physically_available_product() == Some(product))
    }

    /// 兩個位置皆有負載時取較小者，否則取儲位總箱數
    pub fn smallest_load_cases(&self) -> u32 {
        match (&self.first_position.unit_load, &self.second_position.unit_load) {
            (Some(first), Some(second)) => first.n_cases().min(second.n_cases()),
            _ => self.n_cases(),
        }
    }

    /// 持有最小負載的位置（同箱數時取深位）
    pub fn smallest_slot(&self) -> Option<Slot> {
        let smallest = self.smallest_load_cases();
        if !self.second_position.is_empty() && self.second_position.n_cases() == smallest {
            Some(Slot::Second)
        } else if !self.first_position.is_empty() {
            Some(Slot::First)
        } else {
            None
        }
    }

    /// 凍結一個位置給即將入庫的負載
    pub fn freeze(&mut self, unit_load: &UnitLoad) -> Result<()> {
        if self.future_unit_loads.contains(&unit_load.id) {
            return Ok(());
        }
        if self.free_capacity() == 0 {
            return Err(WmsError::LocationUnavailable(format!(
                "{} 已無可預約位置",
                self.id
            )));
        }
        self.future_unit_loads.push(unit_load.id);
        Ok(())
    }

    /// 預約出庫，返回被預約負載的副本
    pub fn book_pickup(&mut self, slot: Slot) -> Result<UnitLoad> {
        let id = self.id;
        let unit_load = self
            .position(slot)
            .unit_load
            .clone()
            .ok_or(WmsError::PositionEmpty { location: id, slot })?;
        if self.booked_pickups.contains(&unit_load.id) {
            return Err(WmsError::LocationUnavailable(format!(
                "{} 的 {} 位置已預約出庫",
                id, slot
            )));
        }
        self.booked_pickups.push(unit_load.id);
        Ok(unit_load)
    }

    /// 放置負載：深位優先
    pub fn put(&mut self, unit_load: UnitLoad) -> Result<Slot> {
        match self.future_unit_loads.iter().position(|id| *id == unit_load.id) {
            Some(index) => {
                self.future_unit_loads.remove(index);
            }
            None if self.free_capacity() == 0 => {
                return Err(WmsError::LocationUnavailable(format!(
                    "{} 已滿",
                    self.id
                )));
            }
            None => {}
        }

        let slot = if self.second_position.is_empty() {
            Slot::Second
        } else if self.first_position.is_empty() {
            Slot::First
        } else {
            return Err(WmsError::LocationUnavailable(format!("{} 已滿", self.id)));
        };
        self.position_mut(slot).unit_load = Some(unit_load);
        Ok(slot)
    }

    /// 取出負載；取出深位時前位負載後移
    pub fn take(&mut self, slot: Slot) -> Result<UnitLoad> {
        let id = self.id;
        let unit_load = self
            .position_mut(slot)
            .unit_load
            .take()
            .ok_or(WmsError::PositionEmpty { location: id, slot })?;

        if slot == Slot::Second {
            self.second_position.unit_load = self.first_position.unit_load.take();
        }
        self.booked_pickups.retain(|booked| *booked != unit_load.id);
        Ok(unit_load)
    }
}
