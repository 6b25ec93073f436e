//! 庫存索引

use mrp_core::{MaterialId, MaterialsTable};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// 物料 → 現有庫存
///
/// 載入時建立一次，之後唯讀。重複的物料列以後出現者為準。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockIndex {
    stocks: HashMap<MaterialId, Decimal>,
}

impl StockIndex {
    /// 從物料需求表建立庫存索引
    ///
    /// 缺少庫存欄時回傳空索引（所有物料庫存視為 0），不視為錯誤。
    /// 空白或非數值的庫存儲存格記為 0。
    pub fn build(table: &MaterialsTable) -> Self {
        if !table.has_stock_column {
            tracing::warn!("物料表缺少現有庫存欄，所有物料庫存視為 0");
            return Self::default();
        }

        let stocks: HashMap<_, _> = table
            .rows
            .iter()
            .filter_map(|row| {
                row.material_id()
                    .map(|m| (m.to_string(), row.on_hand.quantity_or_zero()))
            })
            .collect();

        tracing::debug!("庫存索引: {} 種物料", stocks.len());
        Self { stocks }
    }

    /// 取得物料庫存，未知物料為 0
    pub fn get(&self, material: &str) -> Decimal {
        self.stocks.get(material).copied().unwrap_or(Decimal::ZERO)
    }

    /// 物料是否有庫存記錄
    pub fn contains(&self, material: &str) -> bool {
        self.stocks.contains_key(material)
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.stocks.iter().map(|(m, q)| (m.as_str(), *q))
    }
}

impl FromIterator<(MaterialId, Decimal)> for StockIndex {
    fn from_iter<T: IntoIterator<Item = (MaterialId, Decimal)>>(iter: T) -> Self {
        Self {
            stocks: iter.into_iter().collect(),
        }
    }
}
