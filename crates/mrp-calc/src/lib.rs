//! # MRP Calculation Engine
//!
//! 訂單物料需求與庫存、已預留量的對帳計算

pub mod calculator;
pub mod requirement;
pub mod resolver;
pub mod stock;

// Re-export 主要類型
pub use calculator::RequirementCalculator;
pub use requirement::{MaterialBalance, RequirementReport};
pub use resolver::{column_matches, OrderMaterialResolver, OrderMaterials};
pub use stock::StockIndex;
