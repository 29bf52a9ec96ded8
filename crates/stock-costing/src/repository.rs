//! 成本儲存層抽象與記憶體實現

use std::sync::RwLock;
use uuid::Uuid;

use stock_core::{LaborTimeLog, OverheadApplied, StageCost, StockError, WorkStage};

/// 成本儲存層介面
///
/// 工時與製造費用為僅追加的事實；階段成本以 (訂單, 階段序號) 為鍵 upsert。
pub trait CostingRepository: Send + Sync {
    /// 註冊生產階段
    fn insert_stage(&self, stage: WorkStage) -> stock_core::Result<()>;

    /// 以階段ID解析序號
    fn stage_ordinal(&self, order_id: &str, stage_id: Uuid) -> stock_core::Result<Option<u32>>;

    /// 檢查 (訂單, 序號) 的階段是否存在
    fn stage_exists(&self, order_id: &str, ordinal: u32) -> stock_core::Result<bool>;

    /// 追加工時記錄
    fn append_labor_log(&self, log: LaborTimeLog) -> stock_core::Result<LaborTimeLog>;

    /// 追加製造費用分攤記錄
    fn append_overhead(&self, record: OverheadApplied) -> stock_core::Result<OverheadApplied>;

    /// 加總 (訂單, 階段) 的工時金額
    fn sum_labor(&self, order_id: &str, ordinal: u32) -> stock_core::Result<rust_decimal::Decimal>;

    /// 加總 (訂單, 階段) 的製造費用金額
    fn sum_overhead(
        &self,
        order_id: &str,
        ordinal: u32,
    ) -> stock_core::Result<rust_decimal::Decimal>;

    /// 讀取 (訂單, 階段) 的階段成本記錄
    fn find_stage_cost(
        &self,
        order_id: &str,
        ordinal: u32,
    ) -> stock_core::Result<Option<StageCost>>;

    /// 寫入或覆蓋階段成本記錄
    fn upsert_stage_cost(&self, cost: StageCost) -> stock_core::Result<StageCost>;

    /// 讀取某訂單的全部階段成本（依序號排序）
    fn stage_costs_for_order(&self, order_id: &str) -> stock_core::Result<Vec<StageCost>>;
}

fn lock_poisoned<T>(_: T) -> StockError {
    StockError::Other("成本儲存層鎖已毒化".to_string())
}

/// 記憶體成本儲存（測試與單機運行用）
#[derive(Default)]
pub struct InMemoryCostingStore {
    stages: RwLock<Vec<WorkStage>>,
    labor_logs: RwLock<Vec<LaborTimeLog>>,
    overhead_records: RwLock<Vec<OverheadApplied>>,
    stage_costs: RwLock<Vec<StageCost>>,
}

impl InMemoryCostingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CostingRepository for InMemoryCostingStore {
    fn insert_stage(&self, stage: WorkStage) -> stock_core::Result<()> {
        let mut stages = self.stages.write().map_err(lock_poisoned)?;
        if stages
            .iter()
            .any(|s| s.order_id == stage.order_id && s.ordinal == stage.ordinal)
        {
            return Err(StockError::Validation(format!(
                "訂單 {} 的階段 {} 已存在",
                stage.order_id, stage.ordinal
            )));
        }
        stages.push(stage);
        Ok(())
    }

    fn stage_ordinal(&self, order_id: &str, stage_id: Uuid) -> stock_core::Result<Option<u32>> {
        let stages = self.stages.read().map_err(lock_poisoned)?;
        Ok(stages
            .iter()
            .find(|s| s.order_id == order_id && s.id == stage_id)
            .map(|s| s.ordinal))
    }

    fn stage_exists(&self, order_id: &str, ordinal: u32) -> stock_core::Result<bool> {
        let stages = self.stages.read().map_err(lock_poisoned)?;
        Ok(stages
            .iter()
            .any(|s| s.order_id == order_id && s.ordinal == ordinal))
    }

    fn append_labor_log(&self, log: LaborTimeLog) -> stock_core::Result<LaborTimeLog> {
        let mut logs = self.labor_logs.write().map_err(lock_poisoned)?;
        logs.push(log.clone());
        Ok(log)
    }

    fn append_overhead(&self, record: OverheadApplied) -> stock_core::Result<OverheadApplied> {
        let mut records = self.overhead_records.write().map_err(lock_poisoned)?;
        records.push(record.clone());
        Ok(record)
    }

    fn sum_labor(&self, order_id: &str, ordinal: u32) -> stock_core::Result<rust_decimal::Decimal> {
        let logs = self.labor_logs.read().map_err(lock_poisoned)?;
        Ok(logs
            .iter()
            .filter(|l| l.order_id == order_id && l.stage_ordinal == ordinal)
            .map(|l| l.amount)
            .sum())
    }

    fn sum_overhead(
        &self,
        order_id: &str,
        ordinal: u32,
    ) -> stock_core::Result<rust_decimal::Decimal> {
        let records = self.overhead_records.read().map_err(lock_poisoned)?;
        Ok(records
            .iter()
            .filter(|r| r.order_id == order_id && r.stage_ordinal == ordinal)
            .map(|r| r.amount)
            .sum())
    }

    fn find_stage_cost(
        &self,
        order_id: &str,
        ordinal: u32,
    ) -> stock_core::Result<Option<StageCost>> {
        let costs = self.stage_costs.read().map_err(lock_poisoned)?;
        Ok(costs
            .iter()
            .find(|c| c.order_id == order_id && c.stage_ordinal == ordinal)
            .cloned())
    }

    fn upsert_stage_cost(&self, cost: StageCost) -> stock_core::Result<StageCost> {
        let mut costs = self.stage_costs.write().map_err(lock_poisoned)?;
        match costs
            .iter_mut()
            .find(|c| c.order_id == cost.order_id && c.stage_ordinal == cost.stage_ordinal)
        {
            Some(existing) => *existing = cost.clone(),
            None => costs.push(cost.clone()),
        }
        Ok(cost)
    }

    fn stage_costs_for_order(&self, order_id: &str) -> stock_core::Result<Vec<StageCost>> {
        let costs = self.stage_costs.read().map_err(lock_poisoned)?;
        let mut result: Vec<StageCost> = costs
            .iter()
            .filter(|c| c.order_id == order_id)
            .cloned()
            .collect();
        result.sort_by_key(|c| c.stage_ordinal);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use stock_core::CostingStatus;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 1).unwrap()
    }

    #[test]
    fn test_stage_registration_and_lookup() {
        let store = InMemoryCostingStore::new();
        let stage = WorkStage::new("MO-001".to_string(), 1, "混料".to_string());
        let stage_id = stage.id;
        store.insert_stage(stage).unwrap();

        assert_eq!(store.stage_ordinal("MO-001", stage_id).unwrap(), Some(1));
        assert!(store.stage_exists("MO-001", 1).unwrap());
        assert!(!store.stage_exists("MO-001", 2).unwrap());

        // 同一 (訂單, 序號) 不可重複註冊
        let dup = WorkStage::new("MO-001".to_string(), 1, "重複".to_string());
        assert!(store.insert_stage(dup).is_err());
    }

    #[test]
    fn test_labor_and_overhead_sums() {
        let store = InMemoryCostingStore::new();
        store
            .append_labor_log(LaborTimeLog::new(
                "MO-001".to_string(),
                1,
                Decimal::from(8),
                Decimal::from(50),
                date(),
            ))
            .unwrap();
        store
            .append_labor_log(LaborTimeLog::new(
                "MO-001".to_string(),
                1,
                Decimal::from(6),
                Decimal::from(40),
                date(),
            ))
            .unwrap();
        store
            .append_overhead(OverheadApplied::new(
                "MO-001".to_string(),
                1,
                Decimal::from(100),
                Decimal::from(5),
                date(),
            ))
            .unwrap();

        // 400 + 240 = 640
        assert_eq!(store.sum_labor("MO-001", 1).unwrap(), Decimal::from(640));
        assert_eq!(store.sum_overhead("MO-001", 1).unwrap(), Decimal::from(500));
        // 其他階段不受影響
        assert_eq!(store.sum_labor("MO-001", 2).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_stage_cost_upsert_replaces() {
        let store = InMemoryCostingStore::new();
        let first = StageCost::new(
            "MO-001".to_string(),
            1,
            Decimal::from(100),
            Decimal::ZERO,
            Decimal::from(1000),
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
            CostingStatus::Precosted,
        );
        store.upsert_stage_cost(first).unwrap();

        let second = StageCost::new(
            "MO-001".to_string(),
            1,
            Decimal::from(100),
            Decimal::ZERO,
            Decimal::from(5000),
            Decimal::from(640),
            Decimal::from(500),
            Decimal::ZERO,
            CostingStatus::Actual,
        );
        store.upsert_stage_cost(second).unwrap();

        let all = store.stage_costs_for_order("MO-001").unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].total_cost, Decimal::from(6140));
    }
}
