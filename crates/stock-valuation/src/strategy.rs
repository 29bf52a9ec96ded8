//! 估價策略分派

use rust_decimal::Decimal;
use stock_core::{StockError, StockQueue, ValuationMethod};

use crate::average::AverageCalculator;
use crate::fifo::FifoCalculator;
use crate::lifo::LifoCalculator;
use crate::{IncomingValuation, OutgoingValuation};

/// 估價策略計算器
///
/// 策略選擇集中於此，以 `ValuationMethod` 列舉分派，
/// 每個物料在分類帳操作前解析一次。
pub struct ValuationCalculator;

impl ValuationCalculator {
    /// 計算入庫估價
    #[allow(clippy::too_many_arguments)]
    pub fn receive(
        method: ValuationMethod,
        prev_qty: Decimal,
        prev_value: Decimal,
        prev_queue: &StockQueue,
        in_qty: Decimal,
        in_rate: Decimal,
        rate_precision: u32,
    ) -> stock_core::Result<IncomingValuation> {
        if in_qty <= Decimal::ZERO {
            return Err(StockError::Validation(format!(
                "入庫數量必須為正: {}",
                in_qty
            )));
        }
        if in_rate < Decimal::ZERO {
            return Err(StockError::Validation(format!(
                "入庫單價不可為負: {}",
                in_rate
            )));
        }

        let result = match method {
            ValuationMethod::WeightedAverage | ValuationMethod::MovingAverage => {
                AverageCalculator::receive(prev_qty, prev_value, in_qty, in_rate, rate_precision)
            }
            ValuationMethod::Fifo => FifoCalculator::receive(
                prev_qty,
                prev_value,
                prev_queue,
                in_qty,
                in_rate,
                rate_precision,
            ),
            ValuationMethod::Lifo => LifoCalculator::receive(
                prev_qty,
                prev_value,
                prev_queue,
                in_qty,
                in_rate,
                rate_precision,
            ),
        };

        Ok(result)
    }

    /// 計算出庫估價
    pub fn issue(
        method: ValuationMethod,
        prev_qty: Decimal,
        prev_rate: Decimal,
        prev_value: Decimal,
        prev_queue: &StockQueue,
        out_qty: Decimal,
        rate_precision: u32,
    ) -> stock_core::Result<OutgoingValuation> {
        if out_qty <= Decimal::ZERO {
            return Err(StockError::Validation(format!(
                "出庫數量必須為正: {}",
                out_qty
            )));
        }

        let result = match method {
            ValuationMethod::WeightedAverage | ValuationMethod::MovingAverage => {
                AverageCalculator::issue(prev_qty, prev_rate, prev_value, out_qty, rate_precision)
            }
            ValuationMethod::Fifo => {
                FifoCalculator::issue(prev_qty, prev_value, prev_queue, out_qty, rate_precision)
            }
            ValuationMethod::Lifo => {
                LifoCalculator::issue(prev_qty, prev_value, prev_queue, out_qty, rate_precision)
            }
        };

        Ok(result)
    }
}
