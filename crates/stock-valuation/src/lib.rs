//! # Stock Valuation
//!
//! 估價策略計算引擎（純計算，無 I/O）

pub mod average;
pub mod fifo;
pub mod lifo;
pub mod rounding;
pub mod strategy;

// Re-export 主要類型
pub use strategy::ValuationCalculator;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stock_core::StockQueue;

/// 入庫估價結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingValuation {
    /// 異動後結餘數量
    pub qty_after: Decimal,

    /// 新估價單價
    pub valuation_rate: Decimal,

    /// 新庫存價值
    pub stock_value: Decimal,

    /// 新批次佇列
    pub queue: StockQueue,
}

/// 出庫估價結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutgoingValuation {
    /// 異動後結餘數量
    pub qty_after: Decimal,

    /// 新估價單價
    pub valuation_rate: Decimal,

    /// 新庫存價值
    pub stock_value: Decimal,

    /// 銷貨成本（本次出庫移除的價值）
    pub cost_of_goods_sold: Decimal,

    /// 新批次佇列
    pub queue: StockQueue,

    /// 佇列短缺數量（出庫量超過在庫批次的部分，以零成本消耗）
    pub shortfall_qty: Decimal,
}
