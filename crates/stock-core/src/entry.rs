//! 庫存分類帳條目模型

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::queue::StockQueue;

/// 憑證類型（異動來源單據）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoucherType {
    /// 採購收貨
    PurchaseReceipt,
    /// 銷售出貨
    SalesDelivery,
    /// 生產領料
    MaterialIssue,
    /// 雜項入庫
    MaterialReceipt,
    /// 庫存調整
    StockAdjustment,
    /// 倉庫調撥
    StockTransfer,
    /// 完工入庫
    ManufactureReceipt,
}

/// 單據狀態（明確的狀態機，僅允許 Draft→Submitted→Cancelled）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocStatus {
    /// 草稿
    Draft,
    /// 已提交
    Submitted,
    /// 已取消
    Cancelled,
}

impl DocStatus {
    /// 檢查狀態轉換是否合法
    pub fn can_transition_to(&self, next: DocStatus) -> bool {
        matches!(
            (self, next),
            (DocStatus::Draft, DocStatus::Submitted) | (DocStatus::Submitted, DocStatus::Cancelled)
        )
    }
}

/// 庫存分類帳條目（不可變的異動事實，僅追加）
///
/// 同一 (物料, 倉庫) 下按 (過帳日期, 過帳時間, 序號) 排序構成連續鏈：
/// 每筆 `qty_after_transaction` = 前筆 `qty_after_transaction` + `actual_qty`。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLedgerEntry {
    /// 條目ID
    pub id: Uuid,

    /// 憑證類型
    pub voucher_type: VoucherType,

    /// 憑證號
    pub voucher_id: String,

    /// 物料ID
    pub item_id: String,

    /// 倉庫ID
    pub warehouse_id: String,

    /// 過帳日期
    pub posting_date: NaiveDate,

    /// 過帳時間
    pub posting_time: NaiveTime,

    /// 儲存層分配的序號（同一時間戳內的決定性排序）
    pub sequence: u64,

    /// 異動數量（正 = 入庫，負 = 出庫，不可為零）
    pub actual_qty: Decimal,

    /// 入庫單價（入庫異動使用）
    pub incoming_rate: Decimal,

    /// 出庫單價（出庫異動的實際銷貨成本單價）
    pub outgoing_rate: Decimal,

    /// 異動後結餘數量（計算欄位）
    pub qty_after_transaction: Decimal,

    /// 估價單價（計算欄位）
    pub valuation_rate: Decimal,

    /// 庫存價值（計算欄位）
    pub stock_value: Decimal,

    /// 庫存價值差額（本筆造成的價值變化）
    pub stock_value_difference: Decimal,

    /// 在庫批次佇列快照（FIFO/LIFO 使用）
    pub stock_queue: StockQueue,

    /// 是否已取消（取消以沖銷條目實現，絕不改寫歷史）
    pub is_cancelled: bool,

    /// 單據狀態
    pub docstatus: DocStatus,
}

impl StockLedgerEntry {
    /// 創建新的分類帳條目
    pub fn new(
        voucher_type: VoucherType,
        voucher_id: String,
        item_id: String,
        warehouse_id: String,
        posting_date: NaiveDate,
        posting_time: NaiveTime,
        actual_qty: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            voucher_type,
            voucher_id,
            item_id,
            warehouse_id,
            posting_date,
            posting_time,
            sequence: 0,
            actual_qty,
            incoming_rate: Decimal::ZERO,
            outgoing_rate: Decimal::ZERO,
            qty_after_transaction: Decimal::ZERO,
            valuation_rate: Decimal::ZERO,
            stock_value: Decimal::ZERO,
            stock_value_difference: Decimal::ZERO,
            stock_queue: StockQueue::new(),
            is_cancelled: false,
            docstatus: DocStatus::Submitted,
        }
    }

    /// 建構器模式：設置入庫單價
    pub fn with_incoming_rate(mut self, rate: Decimal) -> Self {
        self.incoming_rate = rate;
        self
    }

    /// 建構器模式：設置出庫單價
    pub fn with_outgoing_rate(mut self, rate: Decimal) -> Self {
        self.outgoing_rate = rate;
        self
    }

    /// 過帳時間戳（排序用）
    pub fn posting_datetime(&self) -> NaiveDateTime {
        self.posting_date.and_time(self.posting_time)
    }

    /// 排序鍵：(過帳日期, 過帳時間, 序號)
    pub fn ordering_key(&self) -> (NaiveDateTime, u64) {
        (self.posting_datetime(), self.sequence)
    }

    /// 檢查是否為入庫異動
    pub fn is_incoming(&self) -> bool {
        self.actual_qty > Decimal::ZERO
    }

    /// 檢查是否為出庫異動
    pub fn is_outgoing(&self) -> bool {
        self.actual_qty < Decimal::ZERO
    }

    /// 標記為已取消（檢查狀態轉換）
    pub fn mark_cancelled(&mut self) -> crate::Result<()> {
        if !self.docstatus.can_transition_to(DocStatus::Cancelled) {
            return Err(crate::StockError::Validation(format!(
                "條目 {} 狀態 {:?} 不可轉換為已取消",
                self.id, self.docstatus
            )));
        }
        self.docstatus = DocStatus::Cancelled;
        self.is_cancelled = true;
        Ok(())
    }
}
