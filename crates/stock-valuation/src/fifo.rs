//! 先進先出（FIFO）估價

use rust_decimal::Decimal;
use stock_core::StockQueue;

use crate::rounding::round_rate;
use crate::{IncomingValuation, OutgoingValuation};

/// FIFO 估價計算器
pub struct FifoCalculator;

impl FifoCalculator {
    /// 入庫：批次追加到佇列尾端，報表單價採加權平均
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

    /// 出庫：從佇列頭部（最舊批次）開始消耗
    ///
    /// 部分消耗的批次保留餘量在佇列最前端；
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
            let head = &mut slots[0];
            if head.qty > remaining {
                // 部分消耗，餘量留在佇列前端
                cost_of_goods_sold += remaining * head.rate;
                head.qty -= remaining;
                remaining = Decimal::ZERO;
            } else {
                cost_of_goods_sold += head.value();
                remaining -= head.qty;
                slots.remove(0);
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
    fn test_receive_appends_slot() {
        let queue = seeded_queue();
        let result = FifoCalculator::receive(
            Decimal::from(150),
            Decimal::from(1600),
            &queue,
            Decimal::from(30),
            Decimal::from(15),
            6,
        );

        assert_eq!(result.qty_after, Decimal::from(180));
        assert_eq!(result.stock_value, Decimal::from(2050));
        assert_eq!(result.queue.len(), 3);
        assert_eq!(result.queue.slots[2], QueueSlot::new(Decimal::from(30), Decimal::from(15)));
    }

    #[test]
    fn test_issue_drains_oldest_first() {
        // 佇列 [[100,10],[50,12]]，出庫 120
        // 100×10 = 1000，再 20×12 = 240 → 銷貨成本 1240，剩餘 [[30,12]]
        let queue = seeded_queue();
        let result = FifoCalculator::issue(
            Decimal::from(150),
            Decimal::from(1600),
            &queue,
            Decimal::from(120),
            6,
        );

        assert_eq!(result.cost_of_goods_sold, Decimal::from(1240));
        assert_eq!(result.qty_after, Decimal::from(30));
        assert_eq!(result.stock_value, Decimal::from(360));
        assert_eq!(result.queue.slots, vec![QueueSlot::new(Decimal::from(30), Decimal::from(12))]);
        assert_eq!(result.shortfall_qty, Decimal::ZERO);
    }

    #[test]
    fn test_issue_partial_head_keeps_remainder_in_front() {
        let queue = seeded_queue();
        let result = FifoCalculator::issue(
            Decimal::from(150),
            Decimal::from(1600),
            &queue,
            Decimal::from(40),
            6,
        );

        assert_eq!(result.cost_of_goods_sold, Decimal::from(400));
        assert_eq!(
            result.queue.slots,
            vec![
                QueueSlot::new(Decimal::from(60), Decimal::from(10)),
                QueueSlot::new(Decimal::from(50), Decimal::from(12)),
            ]
        );
    }

    #[test]
    fn test_receive_with_negative_carried_value_zeroes_rate() {
        // 負價值狀態下回補：報表單價歸零而非為負
        let result = FifoCalculator::receive(
            Decimal::from(-20),
            Decimal::from(-2000),
            &StockQueue::new(),
            Decimal::from(30),
            Decimal::from(10),
            6,
        );

        assert_eq!(result.qty_after, Decimal::from(10));
        assert_eq!(result.stock_value, Decimal::from(-1700));
        assert_eq!(result.valuation_rate, Decimal::ZERO);
    }

    #[test]
    fn test_issue_beyond_queue_reports_shortfall() {
        // 出庫 200 超過在庫 150：短缺 50 以零成本消耗
        let queue = seeded_queue();
        let result = FifoCalculator::issue(
            Decimal::from(150),
            Decimal::from(1600),
            &queue,
            Decimal::from(200),
            6,
        );

        assert_eq!(result.cost_of_goods_sold, Decimal::from(1600));
        assert_eq!(result.shortfall_qty, Decimal::from(50));
        assert_eq!(result.qty_after, Decimal::from(-50));
        assert!(result.queue.is_empty());
        assert_eq!(result.valuation_rate, Decimal::ZERO);
    }
}
