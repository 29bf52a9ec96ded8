//! 加權平均／移動平均估價

use rust_decimal::Decimal;
use stock_core::{QueueSlot, StockQueue};

use crate::rounding::round_rate;
use crate::{IncomingValuation, OutgoingValuation};

/// 加權平均估價計算器
///
/// 移動平均在本引擎內行為等同（差異僅在上游重算時機），共用此實現。
pub struct AverageCalculator;

impl AverageCalculator {
    /// 入庫：價值累加，單價 = 總價值 / 總數量
    pub fn receive(
        prev_qty: Decimal,
        prev_value: Decimal,
        in_qty: Decimal,
        in_rate: Decimal,
        rate_precision: u32,
    ) -> IncomingValuation {
        let qty_after = prev_qty + in_qty;
        let stock_value = prev_value + in_qty * in_rate;

        // 結餘或價值不為正時單價歸零：自負結餘回補時帶入的價值
        // 可能仍為負，單價絕不可為負
        let valuation_rate = if qty_after > Decimal::ZERO && stock_value > Decimal::ZERO {
            round_rate(stock_value / qty_after, rate_precision)
        } else {
            Decimal::ZERO
        };

        // 佇列折疊為單一合成批次，代表整體結餘
        let queue = if qty_after > Decimal::ZERO {
            StockQueue::from_slots(vec![QueueSlot::new(qty_after, valuation_rate)])
        } else {
            StockQueue::new()
        };

        IncomingValuation {
            qty_after,
            valuation_rate,
            stock_value,
            queue,
        }
    }

    /// 出庫：以當前估價單價計算銷貨成本
    pub fn issue(
        prev_qty: Decimal,
        prev_rate: Decimal,
        prev_value: Decimal,
        out_qty: Decimal,
        rate_precision: u32,
    ) -> OutgoingValuation {
        let qty_after = prev_qty - out_qty;

        let (cost_of_goods_sold, valuation_rate, stock_value) = if qty_after == Decimal::ZERO {
            // 結餘恰好歸零：消耗剩餘全部價值，單價重設為零，
            // 捨入殘差一併結轉進銷貨成本
            (prev_value, Decimal::ZERO, Decimal::ZERO)
        } else {
            let cogs = out_qty * prev_rate;
            (
                cogs,
                round_rate(prev_rate, rate_precision),
                prev_value - cogs,
            )
        };

        let queue = if qty_after > Decimal::ZERO {
            StockQueue::from_slots(vec![QueueSlot::new(qty_after, valuation_rate)])
        } else {
            StockQueue::new()
        };

        OutgoingValuation {
            qty_after,
            valuation_rate,
            stock_value,
            cost_of_goods_sold,
            queue,
            shortfall_qty: Decimal::ZERO,
        }
    }
}
