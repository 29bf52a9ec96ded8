//! # Stock Core
//!
//! 庫存估價核心資料模型與類型定義

pub mod bin;
pub mod config;
pub mod costing;
pub mod entry;
pub mod lock;
pub mod queue;

// Re-export 主要類型
pub use bin::Bin;
pub use config::{NegativeStockPolicy, ValuationConfig, ValuationMethod};
pub use costing::{
    CostingStatus, LaborTimeLog, OrderCostSummary, OverheadApplied, StageCost, StageRef, WorkStage,
};
pub use entry::{DocStatus, StockLedgerEntry, VoucherType};
pub use lock::KeyLockRegistry;
pub use queue::{QueueSlot, StockQueue};

/// 庫存引擎錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum StockError {
    #[error("驗證失敗: {0}")]
    Validation(String),

    #[error("找不到記錄: {0}")]
    NotFound(String),

    #[error("找不到估價配置: {0}")]
    ConfigNotFound(String),

    #[error("分類帳鏈不一致: {0}")]
    Consistency(String),

    #[error("無效的日期: {0}")]
    InvalidDate(String),

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, StockError>;
