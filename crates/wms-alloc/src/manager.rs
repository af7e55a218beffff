//! 分配管理器
//!
//! 庫存帳、倉儲註冊與策略呼叫的唯一協調者。
//!
//! 所有對庫存帳的讀取與寫入都在同步函式內完成，鎖在任何等待點之前釋放：
//! 入庫時 [`StoresManager::load`] 先同步完成儲位預約與庫存更新，之後才等待實體放置。
//! 補貨任務在釋放庫存帳鎖之後才送出。

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use wms_core::{
    AllocationConfig, Carrier, ContainerType, InventoryKind, LocationId, PerContainer,
    PickRequest, PickSource, Product, ProductCatalog, ProductId, ReplenishmentSink,
    ReplenishmentTask, Result, ShortfallEvent, ShortfallKind, ShortfallPolicy, SimClock, Slot,
    StockEntry, StockSnapshot, Store, StoreId, StoreKind, UnitLoad, WmsError,
};

use crate::defrag::{self, DefragOutcome};
use crate::ledger::{StockChange, StockLedger};
use crate::policy::{
    FirstAvailableLocationPolicy, LocationPolicy, SmallestSufficientUnitLoadPolicy,
    UnitLoadPolicy,
};
use crate::replenishment;

/// 關閉訊號，可在協作者之間共享
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shutdown(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// 出庫指派
#[derive(Clone)]
pub struct PickAssignment {
    pub store: Arc<dyn Store>,
    pub location: LocationId,
    pub slot: Slot,
    /// 已預約出庫的負載
    pub unit_load: UnitLoad,
    /// 實際箱數少於需求
    pub under_supplied: bool,
}

impl PickAssignment {
    pub fn source(&self) -> PickSource {
        PickSource {
            store: self.store.id(),
            location: self.location,
            slot: self.slot,
        }
    }
}

impl fmt::Debug for PickAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickAssignment")
            .field("store", &self.store.id())
            .field("location", &self.location)
            .field("slot", &self.slot)
            .field("unit_load", &self.unit_load)
            .field("under_supplied", &self.under_supplied)
            .finish()
    }
}

/// 缺貨統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShortfallStats {
    /// 整個負載皆為合成
    pub from_nothing: u32,
    /// 以合成箱數補足現有負載
    pub topped_up: u32,
}

/// 重組後的出庫來源
struct Consolidated {
    source: PickSource,
    synthesized: u32,
    under_supplied: bool,
}

/// 分配管理器（倉儲管理器）
pub struct StoresManager {
    config: AllocationConfig,
    catalog: Arc<ProductCatalog>,
    location_policy: Box<dyn LocationPolicy>,
    unit_load_policy: Box<dyn UnitLoadPolicy>,
    sink: Arc<dyn ReplenishmentSink>,
    clock: Arc<dyn SimClock>,
    stores: RwLock<BTreeMap<StoreKind, Vec<Arc<dyn Store>>>>,
    ledger: Mutex<StockLedger>,
    shortfalls: Mutex<Vec<ShortfallEvent>>,
    shutdown: ShutdownHandle,
}

impl StoresManager {
    /// 創建分配管理器，預設使用第一可用儲位策略與最小足量負載策略
    pub fn new(
        config: AllocationConfig,
        catalog: Arc<ProductCatalog>,
        sink: Arc<dyn ReplenishmentSink>,
        clock: Arc<dyn SimClock>,
    ) -> Self {
        let ledger = StockLedger::new(config.clone());
        Self {
            config,
            catalog,
            location_policy: Box::new(FirstAvailableLocationPolicy),
            unit_load_policy: Box::new(SmallestSufficientUnitLoadPolicy),
            sink,
            clock,
            stores: RwLock::new(BTreeMap::new()),
            ledger: Mutex::new(ledger),
            shortfalls: Mutex::new(Vec::new()),
            shutdown: ShutdownHandle::new(),
        }
    }

    /// 建構器模式：設置入庫儲位策略
    pub fn with_location_policy(mut self, policy: impl LocationPolicy + 'static) -> Self {
        self.location_policy = Box::new(policy);
        self
    }

    /// 建構器模式：設置出庫負載策略
    pub fn with_unit_load_policy(mut self, policy: impl UnitLoadPolicy + 'static) -> Self {
        self.unit_load_policy = Box::new(policy);
        self
    }

    /// 建構器模式：共用外部的關閉訊號
    pub fn with_shutdown_handle(mut self, handle: ShutdownHandle) -> Self {
        self.shutdown = handle;
        self
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_shutdown()
    }

    /// 關閉管理器；之後所有操作返回 `ManagerClosed`，週期補貨在下一次喚醒時結束
    pub fn close(&self) {
        if self.shutdown.is_shutdown() {
            return;
        }
        self.shutdown.shutdown();
        tracing::info!(
            tracked_products = self.ledger.lock().tracked_products().len(),
            shortfalls = self.shortfalls.lock().len(),
            "分配管理器已關閉"
        );
    }

    fn ensure_open(&self) -> Result<()> {
        if self.shutdown.is_shutdown() {
            Err(WmsError::ManagerClosed)
        } else {
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // 倉儲註冊
    // ------------------------------------------------------------------

    /// 註冊倉儲；同一倉儲重複註冊會被略過
    pub fn register(&self, store: Arc<dyn Store>) {
        let mut stores = self.stores.write();
        let registered = stores.entry(store.kind()).or_default();
        if registered.iter().any(|s| s.id() == store.id()) {
            tracing::warn!(store = %store.id(), "倉儲已註冊，略過");
            return;
        }
        tracing::info!(store = %store.id(), kind = %store.kind(), "註冊倉儲");
        registered.push(store);
    }

    /// 某類型的已註冊倉儲（依註冊順序）
    pub fn stores(&self, kind: StoreKind) -> Vec<Arc<dyn Store>> {
        self.stores.read().get(&kind).cloned().unwrap_or_default()
    }

    /// 所有已註冊倉儲
    pub fn registered_stores(&self) -> BTreeMap<StoreKind, Vec<Arc<dyn Store>>> {
        self.stores.read().clone()
    }

    fn stores_of(&self, kind: StoreKind) -> Result<Vec<Arc<dyn Store>>> {
        let stores = self.stores(kind);
        if stores.is_empty() {
            return Err(WmsError::NoStoresRegistered(kind));
        }
        Ok(stores)
    }

    fn is_registered(&self, store: &dyn Store) -> bool {
        self.stores
            .read()
            .get(&store.kind())
            .map_or(false, |stores| stores.iter().any(|s| s.id() == store.id()))
    }

    // ------------------------------------------------------------------
    // 庫存帳
    // ------------------------------------------------------------------

    /// 變動某產品的現有或在途庫存；產品必須在目錄中
    pub fn update_stock(
        &self,
        product: ProductId,
        container: ContainerType,
        kind: InventoryKind,
        delta: i64,
    ) -> Result<StockEntry> {
        self.ensure_open()?;
        self.catalog.get(product)?;
        self.ledger
            .lock()
            .update(product, container, kind, delta, self.clock.now())
    }

    /// 庫存位置 = 現有 + 在途
    pub fn inventory_position(&self, product: ProductId, container: ContainerType) -> Result<i64> {
        self.ledger.lock().inventory_position(product, container)
    }

    pub fn stock(&self, product: ProductId, container: ContainerType) -> Option<StockEntry> {
        self.ledger.lock().entry(product, container)
    }

    pub fn tracked_products(&self) -> Vec<ProductId> {
        self.ledger.lock().tracked_products()
    }

    pub fn history(&self) -> Vec<StockSnapshot> {
        self.ledger.lock().history().to_vec()
    }

    /// 庫存快照紀錄（JSON）
    pub fn history_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self.ledger.lock().history())?)
    }

    pub fn shortfalls(&self) -> Vec<ShortfallEvent> {
        self.shortfalls.lock().clone()
    }

    /// 按容器類型統計的缺貨次數
    pub fn shortfall_stats(&self) -> PerContainer<ShortfallStats> {
        let mut stats = PerContainer::<ShortfallStats>::default();
        for event in self.shortfalls.lock().iter() {
            let entry = stats.get_mut(event.container);
            match event.kind {
                ShortfallKind::FromNothing => entry.from_nothing += 1,
                ShortfallKind::ToppedUp => entry.topped_up += 1,
            }
        }
        stats
    }

    // ------------------------------------------------------------------
    // 入庫
    // ------------------------------------------------------------------

    /// 入庫：搬運車已在倉儲前等待卸貨
    ///
    /// 同步完成儲位預約與庫存更新（在途 → 現有），再等待倉儲完成實體放置。
    pub async fn load(&self, store: &dyn Store, carrier: &dyn Carrier) -> Result<LocationId> {
        let unit_load = carrier.unit_load().clone();
        let location = self.reserve_inbound(store, &unit_load)?;

        tracing::debug!(
            store = %store.id(),
            %location,
            carrier = %carrier.id(),
            n_cases = unit_load.n_cases(),
            "入庫儲位已預約"
        );
        store.accept(location, unit_load, carrier.id()).await?;
        Ok(location)
    }

    fn reserve_inbound(&self, store: &dyn Store, unit_load: &UnitLoad) -> Result<LocationId> {
        self.ensure_open()?;
        if !self.is_registered(store) {
            return Err(WmsError::Store(format!("{} 未註冊", store.id())));
        }
        if unit_load.n_cases() == 0 {
            return Err(WmsError::InvalidUnitLoad(format!(
                "{} 沒有任何箱數",
                unit_load.id
            )));
        }
        if unit_load.is_synthetic() {
            return Err(WmsError::InvalidUnitLoad(format!(
                "{} 為缺貨合成負載，不可入庫",
                unit_load.id
            )));
        }

        let container = store.container_type();
        let product = self.catalog.get(unit_load.product)?;
        let n_cases = i64::from(unit_load.n_cases());
        let changes = [
            (InventoryKind::OnTransit, -n_cases),
            (InventoryKind::OnHand, n_cases),
        ];

        let mut ledger = self.ledger.lock();
        ledger.ensure(product.id, container, &changes)?;
        let location = self.get_location_for_unit_load(store, unit_load)?;
        ledger.apply(product.id, container, &changes, self.clock.now())?;
        Ok(location)
    }

    /// 依儲位策略找儲位（不預約）
    pub fn find_location_for_product(
        &self,
        store: &dyn Store,
        product: &Product,
    ) -> Result<LocationId> {
        self.location_policy
            .select(store, product)
            .ok_or(WmsError::NoFreeLocation {
                store: store.id(),
                product: product.id,
            })
    }

    /// 為入庫負載找儲位並預約
    pub fn get_location_for_unit_load(
        &self,
        store: &dyn Store,
        unit_load: &UnitLoad,
    ) -> Result<LocationId> {
        let product = self.catalog.get(unit_load.product)?;
        let location = self.find_location_for_product(store, product)?;
        store.book_location(location, unit_load)?;
        Ok(location)
    }

    /// 凍結儲位，防止其他負載放入
    pub fn freeze(&self, store: &dyn Store, location: LocationId, unit_load: &UnitLoad) -> Result<()> {
        store.book_location(location, unit_load)
    }

    // ------------------------------------------------------------------
    // 出庫
    // ------------------------------------------------------------------

    /// 依出庫負載策略找來源（不預約）
    pub fn get_unit_load(
        &self,
        stores: &[Arc<dyn Store>],
        product: &Product,
        quantity: u32,
        raise_on_none: bool,
    ) -> Result<Option<PickSource>> {
        let source = self.unit_load_policy.select(stores, product, quantity);
        if source.is_none() && raise_on_none {
            return Err(WmsError::LocationNotFound {
                product: product.id,
                quantity,
            });
        }
        Ok(source)
    }

    /// 出庫：為揀貨請求挑選來源並預約
    ///
    /// 單一負載不足時進行重組搜尋。不觸發倉儲的實體出庫流程。
    /// 找不到任何來源時，`raise_on_none` 決定返回錯誤或 `None`。
    pub fn unload(
        &self,
        kind: StoreKind,
        request: &PickRequest,
        raise_on_none: bool,
    ) -> Result<Option<PickAssignment>> {
        self.ensure_open()?;
        let container = kind.container_type();
        let stores = self.stores_of(kind)?;
        let product = self.catalog.get(request.product)?;
        let now = self.clock.now();

        let (assignment, tasks) = {
            let mut ledger = self.ledger.lock();

            let selected = match self.get_unit_load(&stores, product, request.n_cases, false)? {
                Some(source) => Some(Consolidated {
                    source,
                    synthesized: 0,
                    under_supplied: false,
                }),
                None => self.consolidate(&stores, product, container, request, now)?,
            };
            let Some(selected) = selected else {
                tracing::warn!(
                    product = %product.id,
                    requested = request.n_cases,
                    %kind,
                    "找不到可出庫的負載"
                );
                return if raise_on_none {
                    Err(WmsError::LocationNotFound {
                        product: product.id,
                        quantity: request.n_cases,
                    })
                } else {
                    Ok(None)
                };
            };

            let source = selected.source;
            let store = find_store(&stores, source.store)?;
            let resident = store
                .location(source.location)
                .and_then(|l| l.position(source.slot).unit_load.clone())
                .ok_or(WmsError::PositionEmpty {
                    location: source.location,
                    slot: source.slot,
                })?;
            let changes = pick_changes(&resident, request.n_cases, selected.synthesized);

            ledger.ensure(product.id, container, &changes)?;
            let unit_load = store.book_pickup(source.location, source.slot)?;
            ledger.apply(product.id, container, &changes, now)?;

            let tasks = self.replenish_locked(&mut ledger, product, container, false, now)?;
            let assignment = PickAssignment {
                store,
                location: source.location,
                slot: source.slot,
                unit_load,
                under_supplied: selected.under_supplied,
            };
            (assignment, tasks)
        };

        tracing::debug!(
            product = %product.id,
            requested = request.n_cases,
            store = %assignment.store.id(),
            location = %assignment.location,
            slot = %assignment.slot,
            n_cases = assignment.unit_load.n_cases(),
            "出庫已預約"
        );
        self.emit(tasks);
        Ok(Some(assignment))
    }

    /// 套用重組計畫：取出各儲位的較小負載，合併後放回第一個儲位
    fn consolidate(
        &self,
        stores: &[Arc<dyn Store>],
        product: &Product,
        container: ContainerType,
        request: &PickRequest,
        now: f64,
    ) -> Result<Option<Consolidated>> {
        let candidates = stores.iter().map(|s| (s.id(), s.locations()));
        let Some(DefragOutcome {
            plan,
            fully_satisfied,
        }) = defrag::defragment(candidates, product.id, request.n_cases)
        else {
            return Ok(None);
        };

        let synthesize =
            !fully_satisfied && self.config.shortfall_policy == ShortfallPolicy::Synthesize;
        if !fully_satisfied && !synthesize && plan.accumulated == 0 {
            return Ok(None);
        }

        let store = find_store(stores, plan.store)?;
        let target = match plan.locations.first() {
            Some(&location) => location,
            None => store
                .first_available_location()
                .ok_or(WmsError::NoFreeLocation {
                    store: store.id(),
                    product: product.id,
                })?,
        };

        for &location in &plan.locations {
            let slot = store
                .location(location)
                .and_then(|l| l.smallest_slot())
                .ok_or_else(|| {
                    WmsError::Store(format!("{} 的 {} 已無負載可重組", store.id(), location))
                })?;
            store.take(location, slot)?;
        }

        let synthesized = if synthesize {
            request.n_cases.saturating_sub(plan.accumulated)
        } else {
            0
        };
        let mut merged = UnitLoad::tray(product.id, plan.accumulated + synthesized);

        if synthesize {
            merged.mark_synthetic();
            let event = ShortfallEvent::new(
                product.id,
                container,
                request.n_cases,
                plan.accumulated,
                now,
            );
            tracing::warn!(
                product = %product.id,
                %container,
                requested = request.n_cases,
                available = plan.accumulated,
                synthesized,
                kind = ?event.kind,
                "庫存不足，合成缺少的箱數"
            );
            self.shortfalls.lock().push(event);
        } else if !fully_satisfied {
            tracing::warn!(
                product = %product.id,
                %container,
                requested = request.n_cases,
                available = plan.accumulated,
                "庫存不足，以現有最大累積量出庫"
            );
        }

        store.book_location(target, &merged)?;
        let slot = store.put(target, merged)?;
        tracing::debug!(
            product = %product.id,
            store = %store.id(),
            merged_locations = plan.locations.len(),
            accumulated = plan.accumulated,
            "重組完成"
        );

        Ok(Some(Consolidated {
            source: PickSource {
                store: store.id(),
                location: target,
                slot,
            },
            synthesized,
            under_supplied: !fully_satisfied && !synthesize,
        }))
    }

    // ------------------------------------------------------------------
    // 補貨
    // ------------------------------------------------------------------

    /// 檢查是否需要補貨，返回發出的補貨任務數
    pub fn check_replenishment(
        &self,
        product: ProductId,
        container: ContainerType,
        periodic_check: bool,
    ) -> Result<u32> {
        self.ensure_open()?;
        let product = self.catalog.get(product)?;
        let now = self.clock.now();

        let tasks = {
            let mut ledger = self.ledger.lock();
            self.replenish_locked(&mut ledger, product, container, periodic_check, now)?
        };
        let n_tasks = tasks.len() as u32;
        self.emit(tasks);
        Ok(n_tasks)
    }

    /// 對所有已追蹤的 (產品, 容器類型) 做一次週期檢查
    pub fn replenishment_sweep(&self) -> Result<u32> {
        self.ensure_open()?;
        let now = self.clock.now();

        let tasks = {
            let mut ledger = self.ledger.lock();
            // 先解析全部產品，任何寫入之前失敗
            let products = ledger
                .tracked_products()
                .into_iter()
                .map(|id| self.catalog.get(id))
                .collect::<Result<Vec<_>>>()?;

            let mut tasks = Vec::new();
            for product in products {
                for container in ContainerType::ALL {
                    tasks.extend(self.replenish_locked(&mut ledger, product, container, true, now)?);
                }
            }
            tasks
        };

        let n_tasks = tasks.len() as u32;
        tracing::info!(sim_time = now, n_tasks, "週期補貨檢查完成");
        self.emit(tasks);
        Ok(n_tasks)
    }

    /// 週期補貨：每隔固定間隔對所有產品做週期檢查，直到管理器關閉
    pub async fn periodic_store_replenishment(&self) -> Result<()> {
        let interval = self.config.replenishment_interval_secs as f64;
        tracing::info!(interval_secs = interval, "啟動週期補貨");

        loop {
            self.clock.timeout(interval).await;
            if self.shutdown.is_shutdown() {
                break;
            }
            self.replenishment_sweep()?;
        }

        tracing::info!("週期補貨已停止");
        Ok(())
    }

    fn replenish_locked(
        &self,
        ledger: &mut StockLedger,
        product: &Product,
        container: ContainerType,
        periodic_check: bool,
        now: f64,
    ) -> Result<Vec<ReplenishmentTask>> {
        let position = ledger.inventory_position(product.id, container)?;
        let Some(decision) = replenishment::evaluate(product, container, position, periodic_check)
        else {
            return Ok(Vec::new());
        };
        if decision.n_pallets == 0 {
            return Ok(Vec::new());
        }

        ledger.update(
            product.id,
            container,
            InventoryKind::OnTransit,
            decision.reserved_cases,
            now,
        )?;
        tracing::info!(
            product = %product.id,
            %container,
            inventory_position = position,
            n_pallets = decision.n_pallets,
            periodic_check,
            "觸發補貨"
        );

        Ok((0..decision.n_pallets)
            .map(|_| ReplenishmentTask::new(product.id, container, product.case_per_pallet, now))
            .collect())
    }

    fn emit(&self, tasks: Vec<ReplenishmentTask>) {
        for task in tasks {
            self.sink.store_replenishment(task);
        }
    }
}

fn find_store(stores: &[Arc<dyn Store>], id: StoreId) -> Result<Arc<dyn Store>> {
    stores
        .iter()
        .find(|s| s.id() == id)
        .cloned()
        .ok_or_else(|| WmsError::Store(format!("{} 不在已註冊的倉儲中", id)))
}

/// 出庫的庫存變動：現有減去實際取出的箱數，超出需求的剩餘量視為退回中的在途
fn pick_changes(unit_load: &UnitLoad, requested: u32, synthesized: u32) -> [StockChange; 2] {
    let removed = unit_load.n_cases();
    let real = removed.saturating_sub(synthesized);
    let remainder = if unit_load.is_synthetic() {
        0
    } else {
        removed.saturating_sub(requested)
    };
    [
        (InventoryKind::OnTransit, i64::from(remainder)),
        (InventoryKind::OnHand, -i64::from(real)),
    ]
}
