//! 分步成本累積器

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;

use stock_core::{
    CostingStatus, KeyLockRegistry, LaborTimeLog, OrderCostSummary, OverheadApplied, StageCost,
    StageRef, StockError,
};

use crate::repository::CostingRepository;

/// (訂單, 階段序號) 鍵
type StageKey = (String, u32);

/// 分步成本累積器
///
/// 工時與製造費用以事實記錄追加，不即時重算階段成本；
/// 成本只在 `upsert_stage_cost` 被呼叫時拉取加總（pull 而非 push）。
/// 同一 (訂單, 階段) 的 upsert 以按鍵互斥鎖序列化，
/// 避免兩個併發 upsert 讀到過期的加總。
pub struct ProcessCostingAccumulator {
    repo: Arc<dyn CostingRepository>,
    locks: KeyLockRegistry<StageKey>,
}

impl ProcessCostingAccumulator {
    /// 創建新的成本累積器
    pub fn new(repo: Arc<dyn CostingRepository>) -> Self {
        Self {
            repo,
            locks: KeyLockRegistry::new(),
        }
    }

    /// 解析階段定址為序號
    ///
    /// 以ID定址時查表解析；查無對應階段回報 `NotFound`，
    /// 絕不默認為零成本階段。
    fn resolve_ordinal(&self, order_id: &str, stage: StageRef) -> stock_core::Result<u32> {
        match stage {
            StageRef::Ordinal(ordinal) => {
                if !self.repo.stage_exists(order_id, ordinal)? {
                    return Err(StockError::NotFound(format!(
                        "訂單 {} 的階段 {}",
                        order_id, ordinal
                    )));
                }
                Ok(ordinal)
            }
            StageRef::Id(id) => self
                .repo
                .stage_ordinal(order_id, id)?
                .ok_or_else(|| StockError::NotFound(format!("訂單 {} 的階段 {}", order_id, id))),
        }
    }

    /// 記錄工時：金額 = 工時 × 時薪，僅追加事實，不重算階段成本
    pub fn apply_labor_time(
        &self,
        order_id: &str,
        stage: StageRef,
        hours: Decimal,
        hourly_rate: Decimal,
        operator_id: Option<String>,
        log_date: NaiveDate,
    ) -> stock_core::Result<LaborTimeLog> {
        if hours <= Decimal::ZERO {
            return Err(StockError::Validation(format!("工時必須為正: {}", hours)));
        }
        if hourly_rate <= Decimal::ZERO {
            return Err(StockError::Validation(format!(
                "時薪必須為正: {}",
                hourly_rate
            )));
        }

        let ordinal = self.resolve_ordinal(order_id, stage)?;
        let mut log = LaborTimeLog::new(
            order_id.to_string(),
            ordinal,
            hours,
            hourly_rate,
            log_date,
        );
        if let Some(operator_id) = operator_id {
            log = log.with_operator_id(operator_id);
        }

        tracing::debug!(
            "記錄工時: {} 階段 {} 工時 {} × 時薪 {} = {}",
            order_id,
            ordinal,
            hours,
            hourly_rate,
            log.amount
        );

        self.repo.append_labor_log(log)
    }

    /// 分攤製造費用：金額 = 基準數量 × 分攤率，僅追加事實
    pub fn apply_overhead(
        &self,
        order_id: &str,
        stage: StageRef,
        base_qty: Decimal,
        overhead_rate: Decimal,
        cost_center: Option<String>,
        log_date: NaiveDate,
    ) -> stock_core::Result<OverheadApplied> {
        if base_qty <= Decimal::ZERO {
            return Err(StockError::Validation(format!(
                "分攤基準數量必須為正: {}",
                base_qty
            )));
        }
        if overhead_rate <= Decimal::ZERO {
            return Err(StockError::Validation(format!(
                "分攤率必須為正: {}",
                overhead_rate
            )));
        }

        let ordinal = self.resolve_ordinal(order_id, stage)?;
        let mut record = OverheadApplied::new(
            order_id.to_string(),
            ordinal,
            base_qty,
            overhead_rate,
            log_date,
        );
        if let Some(cost_center) = cost_center {
            record = record.with_cost_center(cost_center);
        }

        tracing::debug!(
            "分攤製造費用: {} 階段 {} 基準 {} × 分攤率 {} = {}",
            order_id,
            ordinal,
            base_qty,
            overhead_rate,
            record.amount
        );

        self.repo.append_overhead(record)
    }

    /// 寫入或更新階段成本
    ///
    /// 加總該階段的工時與製造費用，取前一階段已存總成本作為轉入成本
    /// （第 1 階段或前段尚無記錄時為 0），推導總成本與單位成本後 upsert。
    /// 已完工的階段成本不可修改。
    #[allow(clippy::too_many_arguments)]
    pub fn upsert_stage_cost(
        &self,
        order_id: &str,
        stage: StageRef,
        good_qty: Decimal,
        scrap_qty: Decimal,
        material_cost: Decimal,
        mode: CostingStatus,
    ) -> stock_core::Result<StageCost> {
        let ordinal = self.resolve_ordinal(order_id, stage)?;

        let key: StageKey = (order_id.to_string(), ordinal);
        let lock = self.locks.acquire(&key);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(existing) = self.repo.find_stage_cost(order_id, ordinal)? {
            if existing.is_completed() {
                return Err(StockError::Validation(format!(
                    "訂單 {} 階段 {} 的成本已完工，不可修改",
                    order_id, ordinal
                )));
            }
        }

        // Step 1: 拉取事實加總
        let labor_cost = self.repo.sum_labor(order_id, ordinal)?;
        let overhead_cost = self.repo.sum_overhead(order_id, ordinal)?;

        // Step 2: 前段轉入成本（第 1 段為 0；前段查詢失敗則傳播錯誤）
        let transferred_in_cost = if ordinal > 1 {
            self.repo
                .find_stage_cost(order_id, ordinal - 1)?
                .map(|c| c.total_cost)
                .unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };

        // Step 3: 推導並持久化
        let cost = StageCost::new(
            order_id.to_string(),
            ordinal,
            good_qty,
            scrap_qty,
            material_cost,
            labor_cost,
            overhead_cost,
            transferred_in_cost,
            mode,
        );

        tracing::info!(
            "階段成本已更新: {} 階段 {} 材料 {} + 人工 {} + 費用 {} + 轉入 {} = {}",
            order_id,
            ordinal,
            material_cost,
            labor_cost,
            overhead_cost,
            transferred_in_cost,
            cost.total_cost
        );

        self.repo.upsert_stage_cost(cost)
    }

    /// 訂單成本彙總
    ///
    /// 跨階段加總材料/人工/製造費用，以完工數量推導整體單位成本；
    /// 已知標準成本時計算差異與差異百分比。
    pub fn get_order_cost_summary(
        &self,
        order_id: &str,
        completed_qty: Decimal,
        standard_total_cost: Option<Decimal>,
    ) -> stock_core::Result<OrderCostSummary> {
        let costs = self.repo.stage_costs_for_order(order_id)?;
        if costs.is_empty() {
            return Err(StockError::NotFound(format!(
                "訂單 {} 沒有任何階段成本記錄",
                order_id
            )));
        }

        let material_cost: Decimal = costs.iter().map(|c| c.material_cost).sum();
        let labor_cost: Decimal = costs.iter().map(|c| c.labor_cost).sum();
        let overhead_cost: Decimal = costs.iter().map(|c| c.overhead_cost).sum();
        let actual_total_cost = material_cost + labor_cost + overhead_cost;

        let unit_cost = if completed_qty > Decimal::ZERO {
            actual_total_cost / completed_qty
        } else {
            Decimal::ZERO
        };

        let variance = standard_total_cost.map(|std| actual_total_cost - std);
        let variance_percentage = match (variance, standard_total_cost) {
            (Some(v), Some(std)) if std != Decimal::ZERO => {
                Some(v / std * Decimal::from(100))
            }
            _ => None,
        };

        Ok(OrderCostSummary {
            order_id: order_id.to_string(),
            material_cost,
            labor_cost,
            overhead_cost,
            actual_total_cost,
            completed_qty,
            unit_cost,
            standard_total_cost,
            variance,
            variance_percentage,
        })
    }
}
