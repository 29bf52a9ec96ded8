//! # Stock Costing
//!
//! 分步成本（Process Costing）累積引擎：
//! 工時/製造費用事實記錄、階段成本 upsert 與訂單成本彙總

pub mod accumulator;
pub mod repository;

pub use accumulator::ProcessCostingAccumulator;
pub use repository::{CostingRepository, InMemoryCostingStore};
