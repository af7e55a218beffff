//! 手動模擬時鐘

use futures::future::{self, BoxFuture, FutureExt};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use wms_core::SimClock;

/// 手動推進的模擬時鐘
///
/// `timeout` 在呼叫時即推進時間並返回已完成的 future，
/// 讓離散事件流程在測試中可決定性地執行。
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<f64>,
    timeouts: AtomicUsize,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 從指定時間開始
    pub fn starting_at(secs: f64) -> Self {
        Self {
            now: Mutex::new(secs),
            timeouts: AtomicUsize::new(0),
        }
    }

    pub fn advance(&self, secs: f64) {
        *self.now.lock() += secs;
    }

    /// 已發生的等待次數
    pub fn timeouts(&self) -> usize {
        self.timeouts.load(Ordering::SeqCst)
    }
}

impl SimClock for ManualClock {
    fn now(&self) -> f64 {
        *self.now.lock()
    }

    fn timeout(&self, secs: f64) -> BoxFuture<'static, ()> {
        self.advance(secs);
        self.timeouts.fetch_add(1, Ordering::SeqCst);
        future::ready(()).boxed()
    }
}
