//! 倉儲彙總（Bin）模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::queue::StockQueue;

/// 每 (物料, 倉庫) 一列的彙總快取
///
/// 完全由該鍵最新一筆未取消的分類帳條目推導；分類帳才是事實來源，
/// 任何分歧以重新 reconcile 解決。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bin {
    /// 物料ID
    pub item_id: String,

    /// 倉庫ID
    pub warehouse_id: String,

    /// 現有數量
    pub actual_qty: Decimal,

    /// 已保留數量（銷售訂單鎖定）
    pub reserved_qty: Decimal,

    /// 已訂購數量（採購在途）
    pub ordered_qty: Decimal,

    /// 計劃數量（工單計劃產出）
    pub planned_qty: Decimal,

    /// 當前估價單價
    pub valuation_rate: Decimal,

    /// 當前庫存價值
    pub stock_value: Decimal,

    /// 當前批次佇列快照
    pub stock_queue: StockQueue,
}

impl Bin {
    /// 創建歸零的 Bin（無分類帳條目時的狀態）
    pub fn new(item_id: String, warehouse_id: String) -> Self {
        Self {
            item_id,
            warehouse_id,
            actual_qty: Decimal::ZERO,
            reserved_qty: Decimal::ZERO,
            ordered_qty: Decimal::ZERO,
            planned_qty: Decimal::ZERO,
            valuation_rate: Decimal::ZERO,
            stock_value: Decimal::ZERO,
            stock_queue: StockQueue::new(),
        }
    }

    /// 建構器模式：設置已保留數量
    pub fn with_reserved_qty(mut self, qty: Decimal) -> Self {
        self.reserved_qty = qty;
        self
    }

    /// 建構器模式：設置已訂購數量
    pub fn with_ordered_qty(mut self, qty: Decimal) -> Self {
        self.ordered_qty = qty;
        self
    }

    /// 建構器模式：設置計劃數量
    pub fn with_planned_qty(mut self, qty: Decimal) -> Self {
        self.planned_qty = qty;
        self
    }

    /// 可用數量（現有 - 已保留）
    pub fn available_qty(&self) -> Decimal {
        self.actual_qty - self.reserved_qty
    }

    /// 預計數量（現有 + 已訂購 + 計劃 - 已保留）
    pub fn projected_qty(&self) -> Decimal {
        self.actual_qty + self.ordered_qty + self.planned_qty - self.reserved_qty
    }

    /// 以分類帳最新條目的估價狀態覆寫彙總欄位
    ///
    /// 保留/訂購/計劃數量由其他模組擁有，不在此覆寫。
    pub fn apply_ledger_state(
        &mut self,
        actual_qty: Decimal,
        valuation_rate: Decimal,
        stock_value: Decimal,
        stock_queue: StockQueue,
    ) {
        self.actual_qty = actual_qty;
        self.valuation_rate = valuation_rate;
        self.stock_value = stock_value;
        self.stock_queue = stock_queue;
    }

    /// 歸零估價欄位（該鍵已無未取消條目）
    pub fn reset_ledger_state(&mut self) {
        self.actual_qty = Decimal::ZERO;
        self.valuation_rate = Decimal::ZERO;
        self.stock_value = Decimal::ZERO;
        self.stock_queue = StockQueue::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_bin() {
        let bin = Bin::new("ITEM-001".to_string(), "WH-MAIN".to_string());

        assert_eq!(bin.actual_qty, Decimal::ZERO);
        assert_eq!(bin.stock_value, Decimal::ZERO);
        assert!(bin.stock_queue.is_empty());
    }

    #[test]
    fn test_available_and_projected() {
        let mut bin = Bin::new("ITEM-001".to_string(), "WH-MAIN".to_string())
            .with_reserved_qty(Decimal::from(20))
            .with_ordered_qty(Decimal::from(50))
            .with_planned_qty(Decimal::from(30));
        bin.actual_qty = Decimal::from(100);

        assert_eq!(bin.available_qty(), Decimal::from(80));
        // 100 + 50 + 30 - 20 = 160
        assert_eq!(bin.projected_qty(), Decimal::from(160));
    }

    #[test]
    fn test_apply_and_reset_ledger_state() {
        let mut bin = Bin::new("ITEM-001".to_string(), "WH-MAIN".to_string())
            .with_reserved_qty(Decimal::from(5));

        let mut queue = StockQueue::new();
        queue.push(Decimal::from(100), Decimal::from(10));

        bin.apply_ledger_state(
            Decimal::from(100),
            Decimal::from(10),
            Decimal::from(1000),
            queue,
        );

        assert_eq!(bin.actual_qty, Decimal::from(100));
        assert_eq!(bin.valuation_rate, Decimal::from(10));
        assert_eq!(bin.stock_value, Decimal::from(1000));
        // 保留數量不受 reconcile 影響
        assert_eq!(bin.reserved_qty, Decimal::from(5));

        bin.reset_ledger_state();
        assert_eq!(bin.actual_qty, Decimal::ZERO);
        assert!(bin.stock_queue.is_empty());
        assert_eq!(bin.reserved_qty, Decimal::from(5));
    }
}
