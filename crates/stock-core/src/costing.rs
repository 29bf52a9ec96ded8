//! 分步成本（Process Costing）模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 階段成本狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostingStatus {
    /// 預估成本
    Precosted,
    /// 實際成本
    Actual,
    /// 已完工（不可再修改）
    Completed,
}

/// 生產階段（製程工序）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkStage {
    /// 階段ID
    pub id: Uuid,

    /// 製造訂單ID
    pub order_id: String,

    /// 階段序號（從 1 開始）
    pub ordinal: u32,

    /// 階段名稱
    pub name: String,

    /// 工作中心
    pub work_center: Option<String>,
}

impl WorkStage {
    /// 創建新的生產階段
    pub fn new(order_id: String, ordinal: u32, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            ordinal,
            name,
            work_center: None,
        }
    }

    /// 建構器模式：設置工作中心
    pub fn with_work_center(mut self, work_center: String) -> Self {
        self.work_center = Some(work_center);
        self
    }
}

/// 階段定址方式（ID 或序號）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageRef {
    /// 以階段ID定址（需查表解析為序號）
    Id(Uuid),
    /// 以階段序號定址
    Ordinal(u32),
}

/// 工時記錄（僅追加的事實：工時 × 時薪）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaborTimeLog {
    /// 記錄ID
    pub id: Uuid,

    /// 製造訂單ID
    pub order_id: String,

    /// 階段序號
    pub stage_ordinal: u32,

    /// 工時（小時）
    pub hours: Decimal,

    /// 時薪
    pub hourly_rate: Decimal,

    /// 金額 = 工時 × 時薪
    pub amount: Decimal,

    /// 作業員
    pub operator_id: Option<String>,

    /// 記錄日期
    pub log_date: NaiveDate,
}

impl LaborTimeLog {
    /// 創建新的工時記錄
    pub fn new(
        order_id: String,
        stage_ordinal: u32,
        hours: Decimal,
        hourly_rate: Decimal,
        log_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            stage_ordinal,
            hours,
            hourly_rate,
            amount: hours * hourly_rate,
            operator_id: None,
            log_date,
        }
    }

    /// 建構器模式：設置作業員
    pub fn with_operator_id(mut self, operator_id: String) -> Self {
        self.operator_id = Some(operator_id);
        self
    }
}

/// 製造費用分攤記錄（僅追加的事實：基準數量 × 分攤率）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverheadApplied {
    /// 記錄ID
    pub id: Uuid,

    /// 製造訂單ID
    pub order_id: String,

    /// 階段序號
    pub stage_ordinal: u32,

    /// 分攤基準數量
    pub base_qty: Decimal,

    /// 分攤率
    pub overhead_rate: Decimal,

    /// 金額 = 基準數量 × 分攤率
    pub amount: Decimal,

    /// 成本中心
    pub cost_center: Option<String>,

    /// 記錄日期
    pub log_date: NaiveDate,
}

impl OverheadApplied {
    /// 創建新的製造費用分攤記錄
    pub fn new(
        order_id: String,
        stage_ordinal: u32,
        base_qty: Decimal,
        overhead_rate: Decimal,
        log_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            stage_ordinal,
            base_qty,
            overhead_rate,
            amount: base_qty * overhead_rate,
            cost_center: None,
            log_date,
        }
    }

    /// 建構器模式：設置成本中心
    pub fn with_cost_center(mut self, cost_center: String) -> Self {
        self.cost_center = Some(cost_center);
        self
    }
}

/// 階段成本記錄（每 (訂單, 階段) 一列，以 upsert 維護）
///
/// 總成本 = 直接材料 + 人工 + 製造費用 + 前段轉入；
/// 單位成本 = 總成本 / 良品數量（良品為零時為零）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageCost {
    /// 製造訂單ID
    pub order_id: String,

    /// 階段序號
    pub stage_ordinal: u32,

    /// 良品數量
    pub good_qty: Decimal,

    /// 報廢數量
    pub scrap_qty: Decimal,

    /// 直接材料成本
    pub material_cost: Decimal,

    /// 人工成本（工時記錄加總）
    pub labor_cost: Decimal,

    /// 製造費用（分攤記錄加總）
    pub overhead_cost: Decimal,

    /// 前段轉入成本（第 1 段為 0）
    pub transferred_in_cost: Decimal,

    /// 總成本
    pub total_cost: Decimal,

    /// 單位成本
    pub unit_cost: Decimal,

    /// 成本狀態
    pub status: CostingStatus,
}

impl StageCost {
    /// 創建階段成本記錄並推導總成本/單位成本
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        order_id: String,
        stage_ordinal: u32,
        good_qty: Decimal,
        scrap_qty: Decimal,
        material_cost: Decimal,
        labor_cost: Decimal,
        overhead_cost: Decimal,
        transferred_in_cost: Decimal,
        status: CostingStatus,
    ) -> Self {
        let total_cost = material_cost + labor_cost + overhead_cost + transferred_in_cost;
        let unit_cost = if good_qty > Decimal::ZERO {
            total_cost / good_qty
        } else {
            Decimal::ZERO
        };

        Self {
            order_id,
            stage_ordinal,
            good_qty,
            scrap_qty,
            material_cost,
            labor_cost,
            overhead_cost,
            transferred_in_cost,
            total_cost,
            unit_cost,
            status,
        }
    }

    /// 檢查是否已完工（完工後不可修改）
    pub fn is_completed(&self) -> bool {
        self.status == CostingStatus::Completed
    }
}

/// 訂單成本彙總
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCostSummary {
    /// 製造訂單ID
    pub order_id: String,

    /// 各階段直接材料合計
    pub material_cost: Decimal,

    /// 各階段人工合計
    pub labor_cost: Decimal,

    /// 各階段製造費用合計
    pub overhead_cost: Decimal,

    /// 實際總成本（材料 + 人工 + 製造費用）
    pub actual_total_cost: Decimal,

    /// 完工數量
    pub completed_qty: Decimal,

    /// 整體單位成本
    pub unit_cost: Decimal,

    /// 標準總成本（已知時）
    pub standard_total_cost: Option<Decimal>,

    /// 成本差異 = 實際 - 標準
    pub variance: Option<Decimal>,

    /// 差異百分比
    pub variance_percentage: Option<Decimal>,
}
