//! 搬運車

use wms_core::{Carrier, CarrierId, UnitLoad};

/// 自動導引車，載運一個單元負載
#[derive(Debug, Clone)]
pub struct Agv {
    id: CarrierId,
    unit_load: UnitLoad,
}

impl Agv {
    pub fn new(id: CarrierId, unit_load: UnitLoad) -> Self {
        Self { id, unit_load }
    }

    /// 卸下負載
    pub fn into_unit_load(self) -> UnitLoad {
        self.unit_load
    }
}

impl Carrier for Agv {
    fn id(&self) -> CarrierId {
        self.id
    }

    fn unit_load(&self) -> &UnitLoad {
        &self.unit_load
    }
}
