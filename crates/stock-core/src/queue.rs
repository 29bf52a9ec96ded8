//! 庫存批次佇列模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 佇列批次（數量 × 單價）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSlot {
    /// 批次剩餘數量
    pub qty: Decimal,

    /// 批次單價
    pub rate: Decimal,
}

impl QueueSlot {
    /// 創建新的批次
    pub fn new(qty: Decimal, rate: Decimal) -> Self {
        Self { qty, rate }
    }

    /// 批次價值 = 數量 × 單價
    pub fn value(&self) -> Decimal {
        self.qty * self.rate
    }
}

/// 在庫批次佇列（依入庫順序排列）
///
/// FIFO/LIFO 估價依賴此佇列；加權平均法將其折疊為單一合成批次。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockQueue {
    /// 批次列表（索引 0 為最舊批次）
    pub slots: Vec<QueueSlot>,
}

impl StockQueue {
    /// 創建空佇列
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// 從批次列表創建佇列
    pub fn from_slots(slots: Vec<QueueSlot>) -> Self {
        Self { slots }
    }

    /// 追加一個批次到佇列尾端
    pub fn push(&mut self, qty: Decimal, rate: Decimal) {
        self.slots.push(QueueSlot::new(qty, rate));
    }

    /// 佇列總數量
    pub fn total_qty(&self) -> Decimal {
        self.slots.iter().map(|s| s.qty).sum()
    }

    /// 佇列總價值
    pub fn total_value(&self) -> Decimal {
        self.slots.iter().map(|s| s.value()).sum()
    }

    /// 檢查佇列是否為空
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// 批次數量
    pub fn len(&self) -> usize {
        self.slots.len()
    }
}
