//! Bin 彙總器

use stock_core::Bin;

use crate::repository::{BinRepository, LedgerRepository};

/// Bin 彙總器
///
/// 將該鍵最新未取消分類帳條目的估價狀態同步到 Bin 列；
/// 無條目時歸零。每次追加與重過帳後同步呼叫，
/// 呼叫端須已持有該鍵的互斥鎖。
pub struct BinAggregator;

impl BinAggregator {
    /// 以分類帳最新狀態重建 Bin（create-if-absent）
    pub fn reconcile(
        ledger: &dyn LedgerRepository,
        bins: &dyn BinRepository,
        item_id: &str,
        warehouse_id: &str,
    ) -> stock_core::Result<Bin> {
        let mut bin = bins
            .get(item_id, warehouse_id)?
            .unwrap_or_else(|| Bin::new(item_id.to_string(), warehouse_id.to_string()));

        match ledger.latest(item_id, warehouse_id)? {
            Some(entry) => {
                bin.apply_ledger_state(
                    entry.qty_after_transaction,
                    entry.valuation_rate,
                    entry.stock_value,
                    entry.stock_queue,
                );
            }
            None => bin.reset_ledger_state(),
        }

        bins.upsert(bin.clone())?;
        Ok(bin)
    }
}
