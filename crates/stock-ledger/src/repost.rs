//! 歷史重過帳引擎

use chrono::{NaiveDate, NaiveTime};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

use stock_core::{KeyLockRegistry, ValuationConfig};

use crate::bin_aggregator::BinAggregator;
use crate::chain::ChainState;
use crate::repository::{BinRepository, LedgerRepository};
use crate::service::StockKey;

/// 重過帳引擎
///
/// 自指定日期起重放某 (物料, 倉庫) 鍵的全部未取消條目，
/// 重算每筆的估價欄位。整條重放在按鍵互斥鎖內先暫存於記憶體，
/// 全部成功後才一次寫回，中途失敗不留下半更新的鏈。
pub struct RepostEngine {
    ledger: Arc<dyn LedgerRepository>,
    bins: Arc<dyn BinRepository>,
    configs: Arc<HashMap<String, ValuationConfig>>,
    locks: Arc<KeyLockRegistry<StockKey>>,
}

impl RepostEngine {
    pub(crate) fn new(
        ledger: Arc<dyn LedgerRepository>,
        bins: Arc<dyn BinRepository>,
        configs: Arc<HashMap<String, ValuationConfig>>,
        locks: Arc<KeyLockRegistry<StockKey>>,
    ) -> Self {
        Self {
            ledger,
            bins,
            configs,
            locks,
        }
    }

    /// 自 `from_date` 當日零時起重過帳一個鍵
    ///
    /// 冪等：對同一鏈重複執行產生相同結果。
    pub fn repost(
        &self,
        item_id: &str,
        warehouse_id: &str,
        from_date: NaiveDate,
    ) -> stock_core::Result<()> {
        let config = self
            .configs
            .get(item_id)
            .cloned()
            .unwrap_or_else(|| ValuationConfig::new(item_id.to_string()));

        let key: StockKey = (item_id.to_string(), warehouse_id.to_string());
        let lock = self.locks.acquire(&key);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let from_ts = from_date.and_time(NaiveTime::MIN);
        let all = self.ledger.entries_for_key(item_id, warehouse_id)?;

        tracing::debug!(
            "重過帳 {} @ {} 自 {}: 共 {} 筆條目",
            item_id,
            warehouse_id,
            from_date,
            all.len()
        );

        // Step 1: 起點狀態 = 重放範圍前最後一筆的鏈上狀態
        let anchor = all
            .iter()
            .filter(|e| e.posting_datetime() < from_ts)
            .next_back();
        let mut state = ChainState::from_entry(anchor);

        // Step 2: 重放範圍內的條目先暫存，不直接寫回
        let mut staged = Vec::new();
        for entry in all.iter().filter(|e| e.posting_datetime() >= from_ts) {
            let mut recomputed = entry.clone();
            state.advance(&config, &mut recomputed)?;
            staged.push(recomputed);
        }

        // Step 3: 全部成功才寫回並同步 Bin
        self.ledger.overwrite_computed(&staged)?;
        BinAggregator::reconcile(self.ledger.as_ref(), self.bins.as_ref(), item_id, warehouse_id)?;

        tracing::info!(
            "重過帳完成: {} @ {} 自 {} 重算 {} 筆",
            item_id,
            warehouse_id,
            from_date,
            staged.len()
        );

        Ok(())
    }

    /// 並行重過帳多個鍵
    ///
    /// 不同鍵的鏈互不相依，可安全並行；任一鍵失敗即整體回報錯誤。
    pub fn repost_many(
        &self,
        keys: &[(String, String)],
        from_date: NaiveDate,
    ) -> stock_core::Result<()> {
        keys.par_iter()
            .map(|(item_id, warehouse_id)| self.repost(item_id, warehouse_id, from_date))
            .collect::<stock_core::Result<Vec<_>>>()?;
        Ok(())
    }
}
