//! 儲存層抽象與記憶體實現
//!
//! 分類帳與 Bin 以 trait 注入各元件，任何支援交易的
//! 關聯式或文件儲存皆可實現；記憶體實現支撐測試。

use chrono::NaiveDateTime;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use uuid::Uuid;

use stock_core::{Bin, StockError, StockLedgerEntry};

/// 分類帳儲存抽象
pub trait LedgerRepository: Send + Sync {
    /// 插入新條目並分配序號，回傳持久化後的條目
    fn insert(&self, entry: StockLedgerEntry) -> stock_core::Result<StockLedgerEntry>;

    /// 以 ID 覆寫條目的計算欄位（重過帳專用）
    fn overwrite_computed(&self, entries: &[StockLedgerEntry]) -> stock_core::Result<()>;

    /// 標記條目為已取消，回傳更新後的條目
    fn mark_cancelled(&self, entry_id: Uuid) -> stock_core::Result<StockLedgerEntry>;

    /// 以 ID 查找條目
    fn find(&self, entry_id: Uuid) -> stock_core::Result<Option<StockLedgerEntry>>;

    /// 該鍵所有未取消條目，按 (日期, 時間, 序號) 升冪
    fn entries_for_key(
        &self,
        item_id: &str,
        warehouse_id: &str,
    ) -> stock_core::Result<Vec<StockLedgerEntry>>;

    /// 該鍵在指定時間戳（含）之前最新的未取消條目
    fn latest_at_or_before(
        &self,
        item_id: &str,
        warehouse_id: &str,
        ts: NaiveDateTime,
    ) -> stock_core::Result<Option<StockLedgerEntry>>;

    /// 該鍵最新的未取消條目
    fn latest(
        &self,
        item_id: &str,
        warehouse_id: &str,
    ) -> stock_core::Result<Option<StockLedgerEntry>>;

    /// 檢查該鍵在指定時間戳之後是否存在未取消條目
    fn exists_after(
        &self,
        item_id: &str,
        warehouse_id: &str,
        ts: NaiveDateTime,
    ) -> stock_core::Result<bool>;
}

/// Bin 儲存抽象
pub trait BinRepository: Send + Sync {
    /// 查找 Bin
    fn get(&self, item_id: &str, warehouse_id: &str) -> stock_core::Result<Option<Bin>>;

    /// 創建或更新 Bin
    fn upsert(&self, bin: Bin) -> stock_core::Result<()>;
}

/// 記憶體分類帳儲存
pub struct InMemoryLedgerStore {
    entries: RwLock<Vec<StockLedgerEntry>>,
    next_sequence: AtomicU64,
}

impl InMemoryLedgerStore {
    /// 創建空儲存
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_sequence: AtomicU64::new(1),
        }
    }

    fn read_entries(&self) -> stock_core::Result<Vec<StockLedgerEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StockError::Other(format!("儲存讀取鎖失效: {}", e)))?;
        Ok(entries.clone())
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerRepository for InMemoryLedgerStore {
    fn insert(&self, mut entry: StockLedgerEntry) -> stock_core::Result<StockLedgerEntry> {
        entry.sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);

        let mut entries = self
            .entries
            .write()
            .map_err(|e| StockError::Other(format!("儲存寫入鎖失效: {}", e)))?;
        entries.push(entry.clone());
        Ok(entry)
    }

    fn overwrite_computed(&self, updated: &[StockLedgerEntry]) -> stock_core::Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StockError::Other(format!("儲存寫入鎖失效: {}", e)))?;

        for replacement in updated {
            let slot = entries
                .iter_mut()
                .find(|e| e.id == replacement.id)
                .ok_or_else(|| StockError::NotFound(format!("分類帳條目 {}", replacement.id)))?;

            // 僅覆寫計算欄位，使用者提供的欄位保持原樣
            slot.qty_after_transaction = replacement.qty_after_transaction;
            slot.valuation_rate = replacement.valuation_rate;
            slot.stock_value = replacement.stock_value;
            slot.stock_value_difference = replacement.stock_value_difference;
            slot.stock_queue = replacement.stock_queue.clone();
            slot.outgoing_rate = replacement.outgoing_rate;
        }

        Ok(())
    }

    fn mark_cancelled(&self, entry_id: Uuid) -> stock_core::Result<StockLedgerEntry> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StockError::Other(format!("儲存寫入鎖失效: {}", e)))?;

        let entry = entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or_else(|| StockError::NotFound(format!("分類帳條目 {}", entry_id)))?;

        entry.mark_cancelled()?;
        Ok(entry.clone())
    }

    fn find(&self, entry_id: Uuid) -> stock_core::Result<Option<StockLedgerEntry>> {
        Ok(self
            .read_entries()?
            .into_iter()
            .find(|e| e.id == entry_id))
    }

    fn entries_for_key(
        &self,
        item_id: &str,
        warehouse_id: &str,
    ) -> stock_core::Result<Vec<StockLedgerEntry>> {
        let mut matched: Vec<StockLedgerEntry> = self
            .read_entries()?
            .into_iter()
            .filter(|e| {
                !e.is_cancelled && e.item_id == item_id && e.warehouse_id == warehouse_id
            })
            .collect();
        matched.sort_by_key(|e| e.ordering_key());
        Ok(matched)
    }

    fn latest_at_or_before(
        &self,
        item_id: &str,
        warehouse_id: &str,
        ts: NaiveDateTime,
    ) -> stock_core::Result<Option<StockLedgerEntry>> {
        Ok(self
            .entries_for_key(item_id, warehouse_id)?
            .into_iter()
            .filter(|e| e.posting_datetime() <= ts)
            .next_back())
    }

    fn latest(
        &self,
        item_id: &str,
        warehouse_id: &str,
    ) -> stock_core::Result<Option<StockLedgerEntry>> {
        Ok(self
            .entries_for_key(item_id, warehouse_id)?
            .into_iter()
            .next_back())
    }

    fn exists_after(
        &self,
        item_id: &str,
        warehouse_id: &str,
        ts: NaiveDateTime,
    ) -> stock_core::Result<bool> {
        Ok(self
            .entries_for_key(item_id, warehouse_id)?
            .iter()
            .any(|e| e.posting_datetime() > ts))
    }
}

/// 記憶體 Bin 儲存
pub struct InMemoryBinStore {
    bins: RwLock<Vec<Bin>>,
}

impl InMemoryBinStore {
    /// 創建空儲存
    pub fn new() -> Self {
        Self {
            bins: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryBinStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BinRepository for InMemoryBinStore {
    fn get(&self, item_id: &str, warehouse_id: &str) -> stock_core::Result<Option<Bin>> {
        let bins = self
            .bins
            .read()
            .map_err(|e| StockError::Other(format!("儲存讀取鎖失效: {}", e)))?;
        Ok(bins
            .iter()
            .find(|b| b.item_id == item_id && b.warehouse_id == warehouse_id)
            .cloned())
    }

    fn upsert(&self, bin: Bin) -> stock_core::Result<()> {
        let mut bins = self
            .bins
            .write()
            .map_err(|e| StockError::Other(format!("儲存寫入鎖失效: {}", e)))?;

        match bins
            .iter_mut()
            .find(|b| b.item_id == bin.item_id && b.warehouse_id == bin.warehouse_id)
        {
            Some(existing) => *existing = bin,
            None => bins.push(bin),
        }
        Ok(())
    }
}
