//! 分類帳鏈重放狀態
//!
//! 追加與重過帳共用同一套「前一狀態 + 條目 → 新狀態」的推進邏輯，
//! 確保兩條路徑的估價結果一致。

use rust_decimal::Decimal;
use stock_core::{StockError, StockLedgerEntry, StockQueue, ValuationConfig};
use stock_valuation::rounding::round_rate;
use stock_valuation::ValuationCalculator;

/// 某 (物料, 倉庫) 鍵在鏈上某一點的估價狀態
#[derive(Debug, Clone)]
pub(crate) struct ChainState {
    pub qty: Decimal,
    pub rate: Decimal,
    pub value: Decimal,
    pub queue: StockQueue,
}

impl ChainState {
    /// 從前一筆條目讀取狀態；無前筆時歸零
    pub fn from_entry(entry: Option<&StockLedgerEntry>) -> Self {
        match entry {
            Some(e) => Self {
                qty: e.qty_after_transaction,
                rate: e.valuation_rate,
                value: e.stock_value,
                queue: e.stock_queue.clone(),
            },
            None => Self {
                qty: Decimal::ZERO,
                rate: Decimal::ZERO,
                value: Decimal::ZERO,
                queue: StockQueue::new(),
            },
        }
    }

    /// 將一筆條目套用估價策略：填寫計算欄位並推進狀態
    ///
    /// 回傳批次短缺數量（僅 FIFO/LIFO 出庫可能非零）。
    /// `actual_qty` 為零代表鏈已損壞，回報一致性錯誤。
    pub fn advance(
        &mut self,
        config: &ValuationConfig,
        entry: &mut StockLedgerEntry,
    ) -> stock_core::Result<Decimal> {
        if entry.actual_qty == Decimal::ZERO {
            return Err(StockError::Consistency(format!(
                "條目 {} 的異動數量為零",
                entry.id
            )));
        }

        let prev_value = self.value;
        let shortfall = if entry.is_incoming() {
            let valued = ValuationCalculator::receive(
                config.valuation_method,
                self.qty,
                self.value,
                &self.queue,
                entry.actual_qty,
                entry.incoming_rate,
                config.rate_precision,
            )?;

            entry.qty_after_transaction = valued.qty_after;
            entry.valuation_rate = valued.valuation_rate;
            entry.stock_value = valued.stock_value;
            entry.stock_queue = valued.queue.clone();

            self.qty = valued.qty_after;
            self.rate = valued.valuation_rate;
            self.value = valued.stock_value;
            self.queue = valued.queue;

            Decimal::ZERO
        } else {
            let out_qty = -entry.actual_qty;
            let valued = ValuationCalculator::issue(
                config.valuation_method,
                self.qty,
                self.rate,
                self.value,
                &self.queue,
                out_qty,
                config.rate_precision,
            )?;

            entry.qty_after_transaction = valued.qty_after;
            entry.valuation_rate = valued.valuation_rate;
            entry.stock_value = valued.stock_value;
            entry.stock_queue = valued.queue.clone();
            entry.outgoing_rate = round_rate(
                valued.cost_of_goods_sold / out_qty,
                config.rate_precision,
            );

            self.qty = valued.qty_after;
            self.rate = valued.valuation_rate;
            self.value = valued.stock_value;
            self.queue = valued.queue;

            valued.shortfall_qty
        };

        entry.stock_value_difference = entry.stock_value - prev_value;
        Ok(shortfall)
    }
}
