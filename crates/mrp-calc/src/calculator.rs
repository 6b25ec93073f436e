//! 需求計算器

use mrp_core::{MaterialsTable, ReservationError, Warning};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::requirement::RequirementReport;
use crate::resolver::OrderMaterialResolver;
use crate::stock::StockIndex;

/// 需求計算器
///
/// 持有物料需求表與由它建立的庫存索引，兩者在載入後都是唯讀的。
pub struct RequirementCalculator {
    /// 物料需求表
    materials: MaterialsTable,

    /// 庫存索引
    stock: StockIndex,

    /// 載入時產生的警告
    warnings: Vec<Warning>,
}

impl RequirementCalculator {
    /// 創建新的需求計算器
    pub fn new(materials: MaterialsTable) -> Self {
        let stock = StockIndex::build(&materials);

        let mut warnings = Vec::new();
        if !materials.has_stock_column {
            warnings.push(Warning::from_error(
                "materials",
                &ReservationError::MaterialsSourceMissing,
            ));
        }

        tracing::info!(
            "載入物料表：物料 {} 列，訂單欄位 {} 個，庫存記錄 {} 筆",
            materials.len(),
            materials.order_columns.len(),
            stock.len()
        );

        Self {
            materials,
            stock,
            warnings,
        }
    }

    /// 計算所選訂單的需求報告
    ///
    /// 每次呼叫都重新計算，不修改任何狀態。沒有選擇訂單時回傳
    /// [`ReservationError::NoOrdersSelected`]。
    pub fn compute<'a, I>(
        &self,
        selected: I,
        reserved: &BTreeMap<String, Decimal>,
    ) -> mrp_core::Result<RequirementReport>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let selected: Vec<&str> = selected.into_iter().collect();
        if selected.is_empty() {
            return Err(ReservationError::NoOrdersSelected);
        }

        let start_time = std::time::Instant::now();

        tracing::debug!("Step 1: 解析訂單物料");
        let order_materials = OrderMaterialResolver::resolve(selected.iter().copied(), &self.materials);

        tracing::debug!("Step 2: 計算物料平衡");
        let report = RequirementReport::build(
            order_materials,
            |material| self.stock.get(material),
            |material| reserved.get(material).copied().unwrap_or(Decimal::ZERO),
        );

        tracing::info!(
            "需求計算完成：訂單 {} 筆，物料 {} 種，短缺 {} 種，耗時 {:?}",
            selected.len(),
            report.material_requirements.len(),
            report.purchase_requirements.len(),
            start_time.elapsed()
        );

        Ok(report)
    }

    /// 獲取庫存索引引用
    pub fn stock(&self) -> &StockIndex {
        &self.stock
    }

    /// 獲取物料需求表引用
    pub fn materials(&self) -> &MaterialsTable {
        &self.materials
    }

    /// 載入時產生的警告
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}
