//! # MRP Reservation
//!
//! 依客戶訂單預留物料、計算需求與採購缺口，並產生請購單。
//!
//! ```no_run
//! use mrp_reservation::{logging, EngineConfig, ReservationEngine, WorkbookReader};
//! use std::collections::HashMap;
//!
//! logging::init();
//! let reader = WorkbookReader::default();
//! let (orders, materials) = reader.read_workbook("Производство.xlsx").unwrap();
//!
//! let mut engine = ReservationEngine::with_file_store(orders, materials, EngineConfig::default()).unwrap();
//! engine.restore().ok();
//! let outcome = engine.reserve(["101", "102"], &HashMap::new()).unwrap();
//! println!("{:?}", outcome.report.purchase_requirements);
//! ```

pub mod logging;

pub use mrp_calc::{
    MaterialBalance, OrderMaterialResolver, OrderMaterials, RequirementCalculator, RequirementReport,
    StockIndex,
};
pub use mrp_core::{
    Cell, EngineConfig, MaterialId, MaterialRow, MaterialsTable, Order, OrderId, OrderSnapshot,
    OrdersTable, ReservationError, Result, Warning, WarningSeverity,
};
pub use mrp_ingest::{ColumnMapping, IngestError, WorkbookReader};
pub use mrp_ledger::{
    ActiveReservations, JsonFileStore, LedgerDocument, LedgerStore, MemoryStore, ReservationEngine,
    ReservationLedger, ReservationOutcome, Selection, SharedReservationEngine,
};
pub use mrp_purchase::{
    KeywordPriceTable, PriceEstimator, PurchaseRequisition, RequisitionBuilder, RequisitionLine,
    RequisitionOutcome,
};

/// 從工作簿建立以 JSON 檔案持久化的預留引擎，並恢復先前的預留
///
/// 工作簿讀取失敗轉為 [`ReservationError::Other`]；恢復失敗只記錄警告，引擎從空帳本開始。
pub fn open_engine(
    workbook: impl AsRef<std::path::Path>,
    mapping: ColumnMapping,
    config: EngineConfig,
) -> Result<ReservationEngine> {
    let reader = WorkbookReader::new(mapping);
    let (orders, materials) = reader
        .read_workbook(workbook)
        .map_err(|e| ReservationError::Other(e.to_string()))?;

    let mut engine = ReservationEngine::with_file_store(orders, materials, config)?;
    if let Err(e) = engine.restore() {
        tracing::warn!("無法恢復先前的預留，從空帳本開始: {}", e);
    }
    Ok(engine)
}
