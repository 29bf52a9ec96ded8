//! # Stock
//!
//! 庫存估價與分類帳引擎統一入口：
//! - `stock_core` — 資料模型、估價配置、錯誤類型
//! - `stock_valuation` — FIFO / LIFO / 加權平均估價策略
//! - `stock_ledger` — 分類帳追加、取消、Bin 彙總與重過帳
//! - `stock_costing` — 分步成本累積與訂單成本彙總

pub use stock_core as core;
pub use stock_costing as costing;
pub use stock_ledger as ledger;
pub use stock_valuation as valuation;
