//! # MRP Ingest
//!
//! 從生產統計工作簿（Excel 或 CSV）載入訂單表與物料需求表

pub mod error;
pub mod mapping;
pub mod sheet;
pub mod tables;

pub use error::{IngestError, Result};
pub use mapping::ColumnMapping;
pub use sheet::{read_csv, read_csv_from, read_sheet, RawSheet};
pub use tables::{materials_from_sheet, orders_from_sheet};

use mrp_core::{MaterialsTable, OrdersTable};
use std::path::Path;

/// 工作簿讀取器
#[derive(Debug, Clone, Default)]
pub struct WorkbookReader {
    mapping: ColumnMapping,
}

impl WorkbookReader {
    pub fn new(mapping: ColumnMapping) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    /// 讀取訂單表
    pub fn read_orders(&self, path: impl AsRef<Path>) -> Result<OrdersTable> {
        let sheet = read_sheet(path.as_ref(), &self.mapping.orders_sheet)?;
        orders_from_sheet(&sheet, &self.mapping)
    }

    /// 讀取物料需求表
    pub fn read_materials(&self, path: impl AsRef<Path>) -> Result<MaterialsTable> {
        let sheet = read_sheet(path.as_ref(), &self.mapping.materials_sheet)?;
        materials_from_sheet(&sheet, &self.mapping)
    }

    /// 從同一個工作簿讀取兩張表
    pub fn read_workbook(&self, path: impl AsRef<Path>) -> Result<(OrdersTable, MaterialsTable)> {
        let path = path.as_ref();
        Ok((self.read_orders(path)?, self.read_materials(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_csv_pair() {
        let dir = TempDir::new().unwrap();
        let orders_path = dir.path().join("orders.csv");
        let materials_path = dir.path().join("materials.csv");
        fs::write(&orders_path, "Номер заказа,Клиент\n101,Okna Plus\n102,Steklo\n").unwrap();
        fs::write(&materials_path, "Материал,На складе,101,102\nGlass,10,4,3\n").unwrap();

        let reader = WorkbookReader::default();
        let orders = reader.read_orders(&orders_path).unwrap();
        let materials = reader.read_materials(&materials_path).unwrap();

        assert_eq!(orders.len(), 2);
        assert_eq!(orders.clients(), vec!["Okna Plus", "Steklo"]);
        assert_eq!(materials.order_columns, vec!["101", "102"]);
    }

    #[test]
    fn test_read_missing_workbook() {
        let reader = WorkbookReader::new(ColumnMapping::default());
        let result = reader.read_workbook("/nonexistent/Производство.xlsx");
        assert!(matches!(result, Err(IngestError::FileNotFound(_))));
    }
}
