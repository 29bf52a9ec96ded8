//! 分類帳追加請求模型

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stock_core::{StockError, StockLedgerEntry, VoucherType};

/// 分類帳條目追加請求
///
/// 由呼叫端業務模組（採購、銷售、製造）將異動單據轉譯而來；
/// 驗證失敗時快速失敗，不做任何寫入。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntryRequest {
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

    /// 異動數量（正 = 入庫，負 = 出庫）
    pub actual_qty: Decimal,

    /// 入庫單價
    pub incoming_rate: Option<Decimal>,

    /// 明確指定的估價單價（入庫時可替代 incoming_rate）
    pub valuation_rate: Option<Decimal>,
}

impl LedgerEntryRequest {
    /// 創建新的追加請求（過帳時間預設 00:00:00）
    pub fn new(
        voucher_type: VoucherType,
        voucher_id: String,
        item_id: String,
        warehouse_id: String,
        posting_date: NaiveDate,
        actual_qty: Decimal,
    ) -> Self {
        Self {
            voucher_type,
            voucher_id,
            item_id,
            warehouse_id,
            posting_date,
            posting_time: NaiveTime::MIN,
            actual_qty,
            incoming_rate: None,
            valuation_rate: None,
        }
    }

    /// 建構器模式：設置過帳時間
    pub fn with_posting_time(mut self, time: NaiveTime) -> Self {
        self.posting_time = time;
        self
    }

    /// 建構器模式：設置入庫單價
    pub fn with_incoming_rate(mut self, rate: Decimal) -> Self {
        self.incoming_rate = Some(rate);
        self
    }

    /// 建構器模式：設置明確估價單價
    pub fn with_valuation_rate(mut self, rate: Decimal) -> Self {
        self.valuation_rate = Some(rate);
        self
    }

    /// 入庫異動使用的單價（incoming_rate 優先，其次 valuation_rate）
    pub fn effective_incoming_rate(&self) -> Option<Decimal> {
        self.incoming_rate.or(self.valuation_rate)
    }

    /// 驗證請求欄位，失敗即拒絕、不做寫入
    pub fn validate(&self) -> stock_core::Result<()> {
        if self.voucher_id.trim().is_empty() {
            return Err(StockError::Validation("憑證號不可為空".to_string()));
        }
        if self.item_id.trim().is_empty() {
            return Err(StockError::Validation("物料ID不可為空".to_string()));
        }
        if self.warehouse_id.trim().is_empty() {
            return Err(StockError::Validation("倉庫ID不可為空".to_string()));
        }
        if self.actual_qty == Decimal::ZERO {
            return Err(StockError::Validation("異動數量不可為零".to_string()));
        }

        if self.actual_qty > Decimal::ZERO {
            match self.effective_incoming_rate() {
                None => {
                    return Err(StockError::Validation(
                        "入庫異動必須提供入庫單價或估價單價".to_string(),
                    ));
                }
                Some(rate) if rate < Decimal::ZERO => {
                    return Err(StockError::Validation(format!(
                        "入庫單價不可為負: {}",
                        rate
                    )));
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    /// 轉換為分類帳條目（計算欄位待估價策略填寫）
    pub fn into_entry(self) -> StockLedgerEntry {
        let incoming_rate = self.effective_incoming_rate().unwrap_or(Decimal::ZERO);
        StockLedgerEntry::new(
            self.voucher_type,
            self.voucher_id,
            self.item_id,
            self.warehouse_id,
            self.posting_date,
            self.posting_time,
            self.actual_qty,
        )
        .with_incoming_rate(incoming_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt_request() -> LedgerEntryRequest {
        LedgerEntryRequest::new(
            VoucherType::PurchaseReceipt,
            "PR-0001".to_string(),
            "ITEM-001".to_string(),
            "WH-MAIN".to_string(),
            NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            Decimal::from(100),
        )
    }

    #[test]
    fn test_valid_incoming_request() {
        let request = receipt_request().with_incoming_rate(Decimal::from(50));
        assert!(request.validate().is_ok());
        assert_eq!(request.effective_incoming_rate(), Some(Decimal::from(50)));
    }

    #[test]
    fn test_valuation_rate_satisfies_incoming() {
        let request = receipt_request().with_valuation_rate(Decimal::from(45));
        assert!(request.validate().is_ok());
        assert_eq!(request.effective_incoming_rate(), Some(Decimal::from(45)));
    }

    #[test]
    fn test_incoming_without_rate_rejected() {
        let request = receipt_request();
        assert!(matches!(
            request.validate(),
            Err(StockError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_qty_rejected() {
        let mut request = receipt_request().with_incoming_rate(Decimal::from(50));
        request.actual_qty = Decimal::ZERO;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_empty_identifiers_rejected() {
        let mut request = receipt_request().with_incoming_rate(Decimal::from(50));
        request.item_id = "  ".to_string();
        assert!(request.validate().is_err());

        let mut request = receipt_request().with_incoming_rate(Decimal::from(50));
        request.voucher_id = String::new();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_outgoing_needs_no_rate() {
        let mut request = receipt_request();
        request.actual_qty = Decimal::from(-40);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_into_entry_carries_rate() {
        let entry = receipt_request()
            .with_incoming_rate(Decimal::from(50))
            .into_entry();

        assert_eq!(entry.incoming_rate, Decimal::from(50));
        assert_eq!(entry.actual_qty, Decimal::from(100));
        assert!(!entry.is_cancelled);
    }
}
