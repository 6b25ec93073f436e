//! 物料需求表模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 表格儲存格
///
/// 匯入層只負責把原始儲存格轉成這三種型態，
/// 數量的解析統一由 [`Cell::quantity`] 處理。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Cell {
    /// 空白
    #[default]
    Empty,
    /// 數值
    Number(Decimal),
    /// 文字
    Text(String),
}

impl Cell {
    /// 由文字建立儲存格（空白字串視為空白格）
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    /// 由數值建立儲存格
    pub fn number(value: impl Into<Decimal>) -> Self {
        Cell::Number(value.into())
    }

    /// 檢查是否為空白格
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// 解析為數量
    ///
    /// 文字會先去除空白再解析，支援科學記號（如 `1e3`）。
    /// 無法解析時回傳 `None`，由呼叫端決定預設值。
    pub fn quantity(&self) -> Option<Decimal> {
        match self {
            Cell::Empty => None,
            Cell::Number(value) => Some(*value),
            Cell::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                Decimal::from_str(text)
                    .or_else(|_| Decimal::from_scientific(text))
                    .ok()
            }
        }
    }

    /// 解析為數量，失敗時為 0
    pub fn quantity_or_zero(&self) -> Decimal {
        self.quantity().unwrap_or(Decimal::ZERO)
    }

    /// 轉為去除空白後的文字（空白格為 `None`）
    pub fn as_label(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Number(value) => Some(value.normalize().to_string()),
            Cell::Text(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
        }
    }
}

impl From<Decimal> for Cell {
    fn from(value: Decimal) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::text(value)
    }
}

/// 物料需求表的一列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRow {
    /// 物料名稱（原始值，可能為空）
    pub material: Option<String>,

    /// 現有庫存儲存格
    pub on_hand: Cell,

    /// 各訂單欄位的需求量，索引對應 [`MaterialsTable::order_columns`]
    pub requirements: Vec<Cell>,
}

impl MaterialRow {
    /// 創建新的物料列
    pub fn new(material: impl Into<String>) -> Self {
        Self {
            material: Some(material.into()),
            on_hand: Cell::Empty,
            requirements: Vec::new(),
        }
    }

    /// 創建沒有物料名稱的列
    pub fn blank() -> Self {
        Self {
            material: None,
            on_hand: Cell::Empty,
            requirements: Vec::new(),
        }
    }

    /// 建構器模式：設置現有庫存
    pub fn with_on_hand(mut self, on_hand: impl Into<Cell>) -> Self {
        self.on_hand = on_hand.into();
        self
    }

    /// 建構器模式：設置各訂單欄位的需求量
    pub fn with_requirements<I, C>(mut self, requirements: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        self.requirements = requirements.into_iter().map(Into::into).collect();
        self
    }

    /// 去除空白後的物料ID，空白名稱回傳 `None`
    pub fn material_id(&self) -> Option<&str> {
        self.material
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }

    /// 取得某個訂單欄位的儲存格
    pub fn requirement(&self, column_idx: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.requirements.get(column_idx).unwrap_or(&EMPTY)
    }
}

/// 累加數量，溢位時略過這一筆並記錄警告
///
/// 溢位的儲存格和無法解析的儲存格一樣視為 0，不中斷計算。
pub fn add_quantity(total: Decimal, value: Decimal, subject: &str) -> Decimal {
    match total.checked_add(value) {
        Some(sum) => sum,
        None => {
            tracing::warn!("數量溢位，略過 {}: {} + {}", subject, total, value);
            total
        }
    }
}

/// 物料需求表
///
/// 每列一個物料，可選的「現有庫存」欄，以及零到多個以訂單號命名的需求欄。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialsTable {
    /// 訂單需求欄位標題（依來源順序）
    pub order_columns: Vec<String>,

    /// 是否存在現有庫存欄
    pub has_stock_column: bool,

    /// 物料列
    pub rows: Vec<MaterialRow>,
}

impl MaterialsTable {
    /// 創建帶有庫存欄的空表
    pub fn new<I, S>(order_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            order_columns: order_columns.into_iter().map(Into::into).collect(),
            has_stock_column: true,
            rows: Vec::new(),
        }
    }

    /// 建構器模式：設置是否有庫存欄
    pub fn with_stock_column(mut self, present: bool) -> Self {
        self.has_stock_column = present;
        self
    }

    /// 建構器模式：添加物料列
    pub fn with_row(mut self, row: MaterialRow) -> Self {
        self.rows.push(row);
        self
    }

    /// 添加物料列
    pub fn push_row(&mut self, row: MaterialRow) {
        self.rows.push(row);
    }

    /// 物料列數量
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 是否沒有任何物料列
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 依列索引列出有名稱的物料 `(row_idx, material_id)`
    pub fn materials(&self) -> impl Iterator<Item = (usize, &str)> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| row.material_id().map(|m| (idx, m)))
    }
}
