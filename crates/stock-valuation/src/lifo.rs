//! 後進先出（LIFO）估價

use rust_decimal::Decimal;
use stock_core::StockQueue;

use crate::rounding::round_rate;
use crate::{IncomingValuation, OutgoingValuation};

/// LIFO 估價計算器
pub struct LifoCalculator;

impl LifoCalculator {
    /// 入庫：與 FIFO 相同，批次追加到佇列尾端
    pub fn receive(
        prev_qty: Decimal,
        prev_value: Decimal,
        prev_queue: &StockQueue,
        in_qty: Decimal,
        in_rate: Decimal,
        rate_precision: u32,
    ) -> IncomingValuation {
        let mut queue = prev_queue.clone();
        queue.push(in_qty, in_rate);

        let qty_after = prev_qty + in_qty;
        let stock_value = prev_value + in_qty * in_rate;
        // 價值為負時單價歸零，單價絕不可為負
        let valuation_rate = if qty_after > Decimal::ZERO && stock_value > Decimal::ZERO {
            round_rate(stock_value / qty_after, rate_precision)
        } else {
            Decimal::ZERO
        };

        IncomingValuation {
            qty_after,
            valuation_rate,
            stock_value,
            queue,
        }
    }

    /// 出庫：從佇列尾端（最新批次）開始消耗
    ///
    /// 部分消耗的批次保留餘量在佇列尾端；
    /// 出庫量超過在庫批次的部分以零成本消耗並回報短缺量。
    pub fn issue(
        prev_qty: Decimal,
        prev_value: Decimal,
        prev_queue: &StockQueue,
        out_qty: Decimal,
        rate_precision: u32,
    ) -> OutgoingValuation {
        let mut remaining = out_qty;
        let mut cost_of_goods_sold = Decimal::ZERO;
        let mut slots = prev_queue.slots.clone();

        while remaining > Decimal::ZERO && !slots.is_empty() {
            let last = slots.len() - 1;
            let tail = &mut slots[last];
            if tail.qty > remaining {
                cost_of_goods_sold += remaining * tail.rate;
                tail.qty -= remaining;
                remaining = Decimal::ZERO;
            } else {
                cost_of_goods_sold += tail.value();
                remaining -= tail.qty;
                slots.pop();
            }
        }

        let shortfall_qty = remaining;
        let qty_after = prev_qty - out_qty;
        let stock_value = prev_value - cost_of_goods_sold;
        // 價值為負時單價歸零，單價絕不可為負
        let valuation_rate = if qty_after > Decimal::ZERO && stock_value > Decimal::ZERO {
            round_rate(stock_value / qty_after, rate_precision)
        } else {
            Decimal::ZERO
        };

        OutgoingValuation {
            qty_after,
            valuation_rate,
            stock_value,
            cost_of_goods_sold,
            queue: StockQueue::from_slots(slots),
            shortfall_qty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stock_core::QueueSlot;

    fn seeded_queue() -> StockQueue {
        StockQueue::from_slots(vec![
            QueueSlot::new(Decimal::from(100), Decimal::from(10)),
            QueueSlot::new(Decimal::from(50), Decimal::from(12)),
        ])
    }

    #[test]
    fn test_issue_drains_newest_first() {
        // 佇列 [[100,10],[50,12]]，出庫 120
        // 50×12 = 600，再 70×10 = 700 → 銷貨成本 1300，剩餘 [[30,10]]
        let queue = seeded_queue();
        let result = LifoCalculator::issue(
            Decimal::from(150),
            Decimal::from(1600),
            &queue,
            Decimal::from(120),
            6,
        );

        assert_eq!(result.cost_of_goods_sold, Decimal::from(1300));
        assert_eq!(result.qty_after, Decimal::from(30));
        assert_eq!(result.stock_value, Decimal::from(300));
        assert_eq!(result.queue.slots, vec![QueueSlot::new(Decimal::from(30), Decimal::from(10))]);
        assert_eq!(result.shortfall_qty, Decimal::ZERO);
    }

    #[test]
    fn test_issue_partial_tail_keeps_remainder() {
        let queue = seeded_queue();
        let result = LifoCalculator::issue(
            Decimal::from(150),
            Decimal::from(1600),
            &queue,
            Decimal::from(20),
            6,
        );

        // 僅消耗最新批次的 20×12 = 240
        assert_eq!(result.cost_of_goods_sold, Decimal::from(240));
        assert_eq!(
            result.queue.slots,
            vec![
                QueueSlot::new(Decimal::from(100), Decimal::from(10)),
                QueueSlot::new(Decimal::from(30), Decimal::from(12)),
            ]
        );
    }

    #[test]
    fn test_issue_beyond_queue_reports_shortfall() {
        let queue = seeded_queue();
        let result = LifoCalculator::issue(
            Decimal::from(150),
            Decimal::from(1600),
            &queue,
            Decimal::from(180),
            6,
        );

        assert_eq!(result.cost_of_goods_sold, Decimal::from(1600));
        assert_eq!(result.shortfall_qty, Decimal::from(30));
        assert_eq!(result.qty_after, Decimal::from(-30));
        assert!(result.queue.is_empty());
    }

    #[test]
    fn test_receive_matches_fifo_reporting() {
        let queue = StockQueue::new();
        let result = LifoCalculator::receive(
            Decimal::ZERO,
            Decimal::ZERO,
            &queue,
            Decimal::from(100),
            Decimal::from(10),
            6,
        );

        assert_eq!(result.qty_after, Decimal::from(100));
        assert_eq!(result.valuation_rate, Decimal::from(10));
        assert_eq!(result.stock_value, Decimal::from(1000));
        assert_eq!(result.queue.len(), 1);
    }
}
