//! # Stock Ledger
//!
//! 庫存分類帳引擎：追加、取消、彙總與重過帳

pub mod bin_aggregator;
mod chain;
pub mod repost;
pub mod repository;
pub mod request;
pub mod service;

// Re-export 主要類型
pub use bin_aggregator::BinAggregator;
pub use repost::RepostEngine;
pub use repository::{BinRepository, InMemoryBinStore, InMemoryLedgerStore, LedgerRepository};
pub use request::LedgerEntryRequest;
pub use service::StockLedgerService;

use rust_decimal::Decimal;
use stock_core::StockLedgerEntry;

/// 追加結果
#[derive(Debug, Clone)]
pub struct AppendOutcome {
    /// 已持久化的分類帳條目
    pub entry: StockLedgerEntry,

    /// 警告信息（負庫存、批次短缺、需重過帳等）
    pub warnings: Vec<StockWarning>,
}

impl AppendOutcome {
    /// 檢查是否帶有警告
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// 分類帳警告
#[derive(Debug, Clone)]
pub struct StockWarning {
    pub item_id: String,
    pub warehouse_id: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl StockWarning {
    pub fn new(
        item_id: String,
        warehouse_id: String,
        message: String,
        severity: WarningSeverity,
    ) -> Self {
        Self {
            item_id,
            warehouse_id,
            message,
            severity,
        }
    }

    pub fn info(item_id: String, warehouse_id: String, message: String) -> Self {
        Self::new(item_id, warehouse_id, message, WarningSeverity::Info)
    }

    pub fn warning(item_id: String, warehouse_id: String, message: String) -> Self {
        Self::new(item_id, warehouse_id, message, WarningSeverity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Info,
    Warning,
}

/// 結餘查詢結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockBalance {
    /// 結餘數量
    pub qty: Decimal,

    /// 估價單價
    pub rate: Decimal,

    /// 庫存價值
    pub value: Decimal,
}

impl StockBalance {
    /// 歸零結餘（無分類帳條目）
    pub fn zero() -> Self {
        Self {
            qty: Decimal::ZERO,
            rate: Decimal::ZERO,
            value: Decimal::ZERO,
        }
    }
}
