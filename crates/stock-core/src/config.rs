//! 估價配置模型

use serde::{Deserialize, Serialize};

/// 估價方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValuationMethod {
    /// 先進先出
    Fifo,
    /// 後進先出
    Lifo,
    /// 加權平均
    WeightedAverage,
    /// 移動平均（行為上等同加權平均，差異在上游重算時機）
    MovingAverage,
}

impl ValuationMethod {
    /// 檢查該方法是否依賴批次佇列
    pub fn uses_queue(&self) -> bool {
        matches!(self, ValuationMethod::Fifo | ValuationMethod::Lifo)
    }
}

/// 負庫存策略
///
/// 出庫導致結餘為負時的處理方式；實務上依部署而異，
/// 故以明確的策略旗標暴露而非寫死。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NegativeStockPolicy {
    /// 允許，不提示
    Allow,
    /// 允許，但回傳警告（預設）
    Warn,
    /// 拒絕，寫入前以驗證錯誤擋下
    Reject,
}

/// 物料估價參數配置
///
/// 每個物料在任何分類帳操作前先解析一次此配置。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationConfig {
    /// 物料ID
    pub item_id: String,

    /// 估價方法
    pub valuation_method: ValuationMethod,

    /// 負庫存策略
    pub negative_stock_policy: NegativeStockPolicy,

    /// 估價單價四捨五入小數位數
    pub rate_precision: u32,
}

impl ValuationConfig {
    /// 創建新的估價配置（預設加權平均、負庫存警告）
    pub fn new(item_id: String) -> Self {
        Self {
            item_id,
            valuation_method: ValuationMethod::WeightedAverage,
            negative_stock_policy: NegativeStockPolicy::Warn,
            rate_precision: 6,
        }
    }

    /// 建構器模式：設置估價方法
    pub fn with_valuation_method(mut self, method: ValuationMethod) -> Self {
        self.valuation_method = method;
        self
    }

    /// 建構器模式：設置負庫存策略
    pub fn with_negative_stock_policy(mut self, policy: NegativeStockPolicy) -> Self {
        self.negative_stock_policy = policy;
        self
    }

    /// 建構器模式：設置估價單價小數位數
    pub fn with_rate_precision(mut self, precision: u32) -> Self {
        self.rate_precision = precision;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_config() {
        let config = ValuationConfig::new("ITEM-001".to_string());

        assert_eq!(config.item_id, "ITEM-001");
        assert_eq!(config.valuation_method, ValuationMethod::WeightedAverage);
        assert_eq!(config.negative_stock_policy, NegativeStockPolicy::Warn);
        assert_eq!(config.rate_precision, 6);
    }

    #[test]
    fn test_config_builder() {
        let config = ValuationConfig::new("ITEM-002".to_string())
            .with_valuation_method(ValuationMethod::Fifo)
            .with_negative_stock_policy(NegativeStockPolicy::Reject)
            .with_rate_precision(2);

        assert_eq!(config.valuation_method, ValuationMethod::Fifo);
        assert_eq!(config.negative_stock_policy, NegativeStockPolicy::Reject);
        assert_eq!(config.rate_precision, 2);
    }

    #[test]
    fn test_uses_queue() {
        assert!(ValuationMethod::Fifo.uses_queue());
        assert!(ValuationMethod::Lifo.uses_queue());
        assert!(!ValuationMethod::WeightedAverage.uses_queue());
        assert!(!ValuationMethod::MovingAverage.uses_queue());
    }
}
