//! 單元負載模型

use crate::{Product, ProductId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 單層（棧板的一層，或單獨存放的料盤）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub n_cases: u32,
}

/// 單元負載：單一產品、可整體搬運的箱數集合
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitLoad {
    /// 單元負載ID
    pub id: Uuid,

    /// 產品ID
    pub product: ProductId,

    layers: Vec<Layer>,

    /// 是否為缺貨補足而合成（不代表真實庫存）
    synthetic: bool,
}

impl UnitLoad {
    /// 由層組成單元負載
    pub fn from_layers(product: ProductId, layers: Vec<Layer>) -> Self {
        Self {
            id: Uuid::new_v4(),
            product,
            layers,
            synthetic: false,
        }
    }

    /// 滿棧板：`layers_per_pallet` 層，每層 `cases_per_layer` 箱
    pub fn full_pallet(product: &Product) -> Self {
        let layers = (0..product.layers_per_pallet)
            .map(|_| Layer {
                n_cases: product.cases_per_layer,
            })
            .collect();
        Self::from_layers(product.id, layers)
    }

    /// 單層料盤
    pub fn tray(product: ProductId, n_cases: u32) -> Self {
        Self::from_layers(product, vec![Layer { n_cases }])
    }

    /// 總箱數（由各層加總）
    pub fn n_cases(&self) -> u32 {
        self.layers.iter().map(|layer| layer.n_cases).sum()
    }

    pub fn n_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// 移除最上層
    pub fn remove_layer(&mut self) -> Option<Layer> {
        self.layers.pop()
    }

    pub fn push_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// 標記為合成負載
    pub fn mark_synthetic(&mut self) {
        self.synthetic = true;
    }
}
