//! 容器類型與倉儲類型

use serde::{Deserialize, Serialize};
use std::fmt;

/// 庫存追蹤所用的實體聚合單位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerType {
    /// 棧板
    Pallet,
    /// 料盤（實體上仍裝載於棧板型外殼中）
    Tray,
}

impl ContainerType {
    pub const ALL: [ContainerType; 2] = [ContainerType::Pallet, ContainerType::Tray];

    pub fn as_str(self) -> &'static str {
        match self {
            ContainerType::Pallet => "pallet",
            ContainerType::Tray => "tray",
        }
    }
}

impl fmt::Display for ContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 按容器類型區分的數值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PerContainer<T> {
    pub pallet: T,
    pub tray: T,
}

impl<T> PerContainer<T> {
    pub fn new(pallet: T, tray: T) -> Self {
        Self { pallet, tray }
    }

    pub fn get(&self, container: ContainerType) -> &T {
        match container {
            ContainerType::Pallet => &self.pallet,
            ContainerType::Tray => &self.tray,
        }
    }

    pub fn get_mut(&mut self, container: ContainerType) -> &mut T {
        match container {
            ContainerType::Pallet => &mut self.pallet,
            ContainerType::Tray => &mut self.tray,
        }
    }
}

/// 倉儲技術類型
///
/// 每種倉儲技術固定對應一種容器類型：
/// - `Asrs`（自動倉儲）處理棧板
/// - `Avsrs`（穿梭車倉儲）處理料盤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    Asrs,
    Avsrs,
}

impl StoreKind {
    pub const fn container_type(self) -> ContainerType {
        match self {
            StoreKind::Asrs => ContainerType::Pallet,
            StoreKind::Avsrs => ContainerType::Tray,
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Asrs => f.write_str("ASRS"),
            StoreKind::Avsrs => f.write_str("AVSRS"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_kind_mapping() {
        assert_eq!(StoreKind::Asrs.container_type(), ContainerType::Pallet);
        assert_eq!(StoreKind::Avsrs.container_type(), ContainerType::Tray);
    }

    #[test]
    fn test_per_container_access() {
        let mut values = PerContainer::new(10, 3);
        assert_eq!(*values.get(ContainerType::Pallet), 10);
        assert_eq!(*values.get(ContainerType::Tray), 3);

        *values.get_mut(ContainerType::Tray) += 2;
        assert_eq!(values.tray, 5);
    }
}
