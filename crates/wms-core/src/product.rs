//! 產品配置模型

use crate::{ContainerType, PerContainer, Result, WmsError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 產品ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 產品參數（唯讀參考資料）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// 產品ID
    pub id: ProductId,

    /// 產品族群（ABC 分類等）
    pub family: Option<String>,

    /// 再訂購點 s（按容器類型）
    pub s_min: PerContainer<i64>,

    /// 補貨上限 S（按容器類型）
    pub s_max: PerContainer<i64>,

    /// 每棧板箱數
    pub case_per_pallet: u32,

    /// 每層箱數
    pub cases_per_layer: u32,

    /// 每棧板層數
    pub layers_per_pallet: u32,
}

impl Product {
    /// 創建新的產品配置，每棧板箱數 = 每層箱數 × 層數
    pub fn new(id: ProductId, cases_per_layer: u32, layers_per_pallet: u32) -> Self {
        Self {
            id,
            family: None,
            s_min: PerContainer::default(),
            s_max: PerContainer::default(),
            case_per_pallet: cases_per_layer.checked_mul(layers_per_pallet).unwrap_or(0),
            cases_per_layer,
            layers_per_pallet,
        }
    }

    /// 建構器模式：設置產品族群
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    /// 建構器模式：設置某容器類型的 (s, S) 門檻
    pub fn with_thresholds(mut self, container: ContainerType, s_min: i64, s_max: i64) -> Self {
        *self.s_min.get_mut(container) = s_min;
        *self.s_max.get_mut(container) = s_max;
        self
    }

    /// 建構器模式：覆寫每棧板箱數
    pub fn with_case_per_pallet(mut self, case_per_pallet: u32) -> Self {
        self.case_per_pallet = case_per_pallet;
        self
    }

    pub fn s_min(&self, container: ContainerType) -> i64 {
        *self.s_min.get(container)
    }

    pub fn s_max(&self, container: ContainerType) -> i64 {
        *self.s_max.get(container)
    }

    /// 檢查配置完整性
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| WmsError::InvalidProduct {
            product: self.id,
            reason,
        };

        if self
            .cases_per_layer
            .checked_mul(self.layers_per_pallet)
            .is_none()
        {
            return Err(invalid("每棧板箱數超出範圍".to_string()));
        }
        if self.case_per_pallet == 0 {
            return Err(invalid("每棧板箱數必須大於 0".to_string()));
        }
        if self.cases_per_layer == 0 || self.layers_per_pallet == 0 {
            return Err(invalid("每層箱數與層數必須大於 0".to_string()));
        }
        for container in ContainerType::ALL {
            let (s_min, s_max) = (self.s_min(container), self.s_max(container));
            if s_min < 0 || s_max < 0 {
                return Err(invalid(format!("{} 門檻不可為負", container)));
            }
            if s_min > s_max {
                return Err(invalid(format!(
                    "{} 門檻 s_min {} 大於 s_max {}",
                    container, s_min, s_max
                )));
            }
        }
        Ok(())
    }
}

/// 產品目錄
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: BTreeMap<ProductId, Product>,
}

impl ProductCatalog {
    /// 建立目錄，逐一驗證產品配置
    pub fn new(products: impl IntoIterator<Item = Product>) -> Result<Self> {
        let mut catalog = BTreeMap::new();
        for product in products {
            product.validate()?;
            let id = product.id;
            if catalog.insert(id, product).is_some() {
                return Err(WmsError::InvalidProduct {
                    product: id,
                    reason: "產品ID重複".to_string(),
                });
            }
        }
        Ok(Self { products: catalog })
    }

    pub fn get(&self, id: ProductId) -> Result<&Product> {
        self.products.get(&id).ok_or(WmsError::UnknownProduct(id))
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.products.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
