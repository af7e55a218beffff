//! # WMS Store
//!
//! 記憶體內的協作者實作：雙深貨架倉儲、手動模擬時鐘、補貨紀錄器與搬運車

pub mod carrier;
pub mod clock;
pub mod rack;
pub mod sink;

// Re-export 主要類型
pub use carrier::Agv;
pub use clock::ManualClock;
pub use rack::RackStore;
pub use sink::{ChannelSink, RecordingSink};
