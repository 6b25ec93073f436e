//! # MRP Purchase
//!
//! 由短缺物料建立請購單（估價、輸出）

pub mod pricing;
pub mod render;
pub mod requisition;

// Re-export 主要類型
pub use pricing::{KeywordPriceTable, PriceEstimator, PriceRule};
pub use render::{format_amount, format_quantity};
pub use requisition::{PurchaseRequisition, RequisitionBuilder, RequisitionLine, RequisitionOutcome};
