//! 分類帳主服務

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use stock_core::{
    DocStatus, KeyLockRegistry, NegativeStockPolicy, StockError, StockLedgerEntry,
    ValuationConfig, VoucherType,
};

use crate::bin_aggregator::BinAggregator;
use crate::chain::ChainState;
use crate::repost::RepostEngine;
use crate::repository::{BinRepository, LedgerRepository};
use crate::request::LedgerEntryRequest;
use crate::{AppendOutcome, StockBalance, StockWarning};

/// (物料, 倉庫) 鍵
pub(crate) type StockKey = (String, String);

/// 庫存分類帳服務
///
/// 儲存層與估價配置以依賴注入傳入；同一鍵的
/// 「讀結餘 → 估價 → 寫入 → 同步 Bin」序列在按鍵互斥鎖內完成，
/// 不同鍵可完全並行。
pub struct StockLedgerService {
    ledger: Arc<dyn LedgerRepository>,
    bins: Arc<dyn BinRepository>,
    configs: Arc<HashMap<String, ValuationConfig>>,
    locks: Arc<KeyLockRegistry<StockKey>>,
    repost: RepostEngine,
}

impl StockLedgerService {
    /// 創建新的分類帳服務
    pub fn new(
        ledger: Arc<dyn LedgerRepository>,
        bins: Arc<dyn BinRepository>,
        configs: HashMap<String, ValuationConfig>,
    ) -> Self {
        let configs = Arc::new(configs);
        let locks = Arc::new(KeyLockRegistry::new());
        let repost = RepostEngine::new(
            Arc::clone(&ledger),
            Arc::clone(&bins),
            Arc::clone(&configs),
            Arc::clone(&locks),
        );

        Self {
            ledger,
            bins,
            configs,
            locks,
            repost,
        }
    }

    /// 解析該物料的估價配置（未配置時使用預設：加權平均、負庫存警告）
    fn config_for(&self, item_id: &str) -> ValuationConfig {
        self.configs
            .get(item_id)
            .cloned()
            .unwrap_or_else(|| ValuationConfig::new(item_id.to_string()))
    }

    /// 追加一筆分類帳條目
    ///
    /// 驗證 → 估價 → 持久化 → 同步 Bin；負結餘依物料策略
    /// 以警告回報或於寫入前拒絕。
    pub fn append(&self, request: LedgerEntryRequest) -> stock_core::Result<AppendOutcome> {
        // Step 1: 驗證，失敗不寫入
        request.validate()?;

        let config = self.config_for(&request.item_id);
        let key: StockKey = (request.item_id.clone(), request.warehouse_id.clone());
        let lock = self.locks.acquire(&key);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        tracing::debug!(
            "追加分類帳條目: {} @ {} 數量 {}",
            request.item_id,
            request.warehouse_id,
            request.actual_qty
        );

        // Step 2: 讀取過帳時間點（含）之前最新的鏈上狀態
        let ts = request.posting_date.and_time(request.posting_time);
        let prev = self
            .ledger
            .latest_at_or_before(&request.item_id, &request.warehouse_id, ts)?;
        let mut state = ChainState::from_entry(prev.as_ref());

        let mut warnings = Vec::new();

        // 回溯過帳：時間點之後已有條目，追加後該鍵需重過帳
        if self
            .ledger
            .exists_after(&request.item_id, &request.warehouse_id, ts)?
        {
            warnings.push(StockWarning::info(
                request.item_id.clone(),
                request.warehouse_id.clone(),
                format!("過帳時間 {} 之後已存在條目，需自該日期重過帳", ts),
            ));
        }

        // Step 3: 套用估價策略
        let mut entry = request.into_entry();
        let shortfall = state.advance(&config, &mut entry)?;

        if shortfall > Decimal::ZERO {
            warnings.push(StockWarning::warning(
                entry.item_id.clone(),
                entry.warehouse_id.clone(),
                format!("批次佇列短缺 {}，超額部分以零成本出庫", shortfall),
            ));
        }

        // Step 4: 負庫存策略
        if entry.qty_after_transaction < Decimal::ZERO {
            match config.negative_stock_policy {
                NegativeStockPolicy::Reject => {
                    return Err(StockError::Validation(format!(
                        "{} @ {} 出庫後結餘為負 ({})，該物料不允許負庫存",
                        entry.item_id, entry.warehouse_id, entry.qty_after_transaction
                    )));
                }
                NegativeStockPolicy::Warn => {
                    warnings.push(StockWarning::warning(
                        entry.item_id.clone(),
                        entry.warehouse_id.clone(),
                        format!("結餘為負: {}", entry.qty_after_transaction),
                    ));
                }
                NegativeStockPolicy::Allow => {}
            }
        }

        // Step 5: 持久化並同步 Bin
        let entry = self.ledger.insert(entry)?;
        BinAggregator::reconcile(
            self.ledger.as_ref(),
            self.bins.as_ref(),
            &entry.item_id,
            &entry.warehouse_id,
        )?;

        tracing::info!(
            "分類帳條目已過帳: {} @ {} 結餘 {} 價值 {}",
            entry.item_id,
            entry.warehouse_id,
            entry.qty_after_transaction,
            entry.stock_value
        );

        Ok(AppendOutcome { entry, warnings })
    }

    /// 取消一筆條目
    ///
    /// 以沖銷條目保留僅追加的歷史：原條目與沖銷條目皆標記為已取消
    /// （沖銷條目僅作審計軌跡），再自原過帳日重過帳整條鏈，
    /// 淨效果為恰好恢復該筆之前的結餘。
    pub fn cancel(&self, entry_id: Uuid) -> stock_core::Result<StockLedgerEntry> {
        let original = self
            .ledger
            .find(entry_id)?
            .ok_or_else(|| StockError::NotFound(format!("分類帳條目 {}", entry_id)))?;

        if original.is_cancelled {
            return Err(StockError::Validation(format!(
                "條目 {} 已取消，不可重複取消",
                entry_id
            )));
        }

        let key: StockKey = (original.item_id.clone(), original.warehouse_id.clone());
        let reversal = {
            let lock = self.locks.acquire(&key);
            let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

            self.ledger.mark_cancelled(entry_id)?;

            // 沖銷條目：數量取負、出入單價互換
            let mut reversal = StockLedgerEntry::new(
                original.voucher_type,
                original.voucher_id.clone(),
                original.item_id.clone(),
                original.warehouse_id.clone(),
                original.posting_date,
                original.posting_time,
                -original.actual_qty,
            )
            .with_incoming_rate(original.outgoing_rate)
            .with_outgoing_rate(original.incoming_rate);
            reversal.is_cancelled = true;
            reversal.docstatus = DocStatus::Cancelled;

            self.ledger.insert(reversal)?
        };

        // 鎖已釋放，重過帳會自行取得同一把鍵鎖
        self.repost
            .repost(&original.item_id, &original.warehouse_id, original.posting_date)?;

        tracing::info!(
            "分類帳條目已取消: {} ({} @ {})",
            entry_id,
            original.item_id,
            original.warehouse_id
        );

        Ok(reversal)
    }

    /// 記錄一筆異動（供採購/銷售/製造等呼叫端使用的便捷入口）
    #[allow(clippy::too_many_arguments)]
    pub fn record_movement(
        &self,
        voucher_type: VoucherType,
        voucher_id: &str,
        item_id: &str,
        warehouse_id: &str,
        qty: Decimal,
        rate: Option<Decimal>,
        posting_date: NaiveDate,
    ) -> stock_core::Result<AppendOutcome> {
        let mut request = LedgerEntryRequest::new(
            voucher_type,
            voucher_id.to_string(),
            item_id.to_string(),
            warehouse_id.to_string(),
            posting_date,
            qty,
        );
        if let Some(rate) = rate {
            request = request.with_incoming_rate(rate);
        }
        self.append(request)
    }

    /// 查詢當前結餘
    pub fn get_balance(
        &self,
        item_id: &str,
        warehouse_id: &str,
    ) -> stock_core::Result<StockBalance> {
        Ok(match self.ledger.latest(item_id, warehouse_id)? {
            Some(entry) => StockBalance {
                qty: entry.qty_after_transaction,
                rate: entry.valuation_rate,
                value: entry.stock_value,
            },
            None => StockBalance::zero(),
        })
    }

    /// 查詢指定日期（當日終了）的結餘
    pub fn get_balance_at_date(
        &self,
        item_id: &str,
        warehouse_id: &str,
        date: NaiveDate,
    ) -> stock_core::Result<StockBalance> {
        let end_of_day = date.and_time(NaiveTime::from_hms_opt(23, 59, 59).expect("有效時間"));
        Ok(
            match self
                .ledger
                .latest_at_or_before(item_id, warehouse_id, end_of_day)?
            {
                Some(entry) => StockBalance {
                    qty: entry.qty_after_transaction,
                    rate: entry.valuation_rate,
                    value: entry.stock_value,
                },
                None => StockBalance::zero(),
            },
        )
    }

    /// 查詢某鍵的全部未取消條目（依過帳時間與序號排序）
    pub fn ledger_entries(
        &self,
        item_id: &str,
        warehouse_id: &str,
    ) -> stock_core::Result<Vec<StockLedgerEntry>> {
        self.ledger.entries_for_key(item_id, warehouse_id)
    }

    /// 自指定日期重過帳該鍵的估價
    pub fn repost_valuation(
        &self,
        item_id: &str,
        warehouse_id: &str,
        from_date: NaiveDate,
    ) -> stock_core::Result<()> {
        self.repost.repost(item_id, warehouse_id, from_date)
    }

    /// 取得重過帳引擎引用
    pub fn repost_engine(&self) -> &RepostEngine {
        &self.repost
    }
}
