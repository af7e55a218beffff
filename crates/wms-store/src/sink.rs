//! 補貨任務接收端

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use parking_lot::Mutex;
use wms_core::{ContainerType, ProductId, ReplenishmentSink, ReplenishmentTask};

/// 記錄所有補貨任務
#[derive(Debug, Default)]
pub struct RecordingSink {
    tasks: Mutex<Vec<ReplenishmentTask>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> Vec<ReplenishmentTask> {
        self.tasks.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }

    /// 某產品、容器類型的任務數
    pub fn count_for(&self, product: ProductId, container: ContainerType) -> usize {
        self.tasks
            .lock()
            .iter()
            .filter(|t| t.product == product && t.container == container)
            .count()
    }

    /// 取出並清空
    pub fn drain(&self) -> Vec<ReplenishmentTask> {
        std::mem::take(&mut *self.tasks.lock())
    }
}

impl ReplenishmentSink for RecordingSink {
    fn store_replenishment(&self, task: ReplenishmentTask) {
        self.tasks.lock().push(task);
    }
}

/// 以無界通道轉送補貨任務給非同步的補貨流程
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<ReplenishmentTask>,
}

impl ChannelSink {
    pub fn channel() -> (Self, UnboundedReceiver<ReplenishmentTask>) {
        let (tx, rx) = mpsc::unbounded();
        (Self { tx }, rx)
    }
}

impl ReplenishmentSink for ChannelSink {
    fn store_replenishment(&self, task: ReplenishmentTask) {
        if let Err(err) = self.tx.unbounded_send(task) {
            let task = err.into_inner();
            tracing::warn!(
                product = %task.product,
                container = %task.container,
                "補貨流程已停止，任務被丟棄"
            );
        }
    }
}
