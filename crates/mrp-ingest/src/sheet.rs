//! 工作表讀取（CSV / Excel）

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use mrp_core::Cell;
use rust_decimal::Decimal;
use std::fs::File;
use std::path::Path;

use crate::error::{IngestError, Result};

/// 原始工作表：標題列 + 資料列
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    /// 欄位標題（已去除空白）
    pub headers: Vec<String>,

    /// 資料列（已略過完全空白的列）
    pub rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    /// 創建工作表
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    /// 查找欄位索引
    pub fn column(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers.iter().position(|h| h == name)
    }

    /// 取得儲存格，超出範圍視為空白
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }
}

/// 依副檔名讀取工作表；CSV 忽略工作表名稱
pub fn read_sheet(path: &Path, sheet_name: &str) -> Result<RawSheet> {
    if !path.exists() {
        return Err(IngestError::FileNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let sheet = match ext.as_str() {
        "csv" => read_csv(path)?,
        "xlsx" | "xls" => read_excel(path, sheet_name)?,
        _ => return Err(IngestError::UnsupportedFormat(ext)),
    };

    tracing::debug!(
        "讀取 {}: 欄位 {} 個, 資料列 {} 列",
        path.display(),
        sheet.headers.len(),
        sheet.rows.len()
    );
    Ok(sheet)
}

/// 讀取 CSV
pub fn read_csv(path: &Path) -> Result<RawSheet> {
    let file = File::open(path).map_err(|e| IngestError::FileNotFound(format!("{}: {}", path.display(), e)))?;
    read_csv_from(file)
}

/// 從任意來源讀取 CSV
pub fn read_csv_from<R: std::io::Read>(source: R) -> Result<RawSheet> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(IngestError::NoHeader);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<Cell> = record.iter().map(Cell::text).collect();
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        rows.push(row);
    }

    Ok(RawSheet::new(headers, rows))
}

/// 讀取 Excel 工作表
fn read_excel(path: &Path, sheet_name: &str) -> Result<RawSheet> {
    let mut workbook = open_workbook_auto(path).map_err(|e| IngestError::ExcelParse(e.to_string()))?;

    if !workbook.sheet_names().iter().any(|name| name == sheet_name) {
        return Err(IngestError::SheetNotFound(sheet_name.to_string()));
    }

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| IngestError::ExcelParse(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or(IngestError::NoHeader)?
        .iter()
        .map(|cell| convert_cell(cell).as_label().unwrap_or_default())
        .collect();

    let rows: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(convert_cell).collect::<Vec<_>>())
        .filter(|row| !row.iter().all(Cell::is_empty))
        .collect();

    Ok(RawSheet::new(headers, rows))
}

/// Excel 儲存格 → 表格儲存格
fn convert_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(value) => Cell::Number(Decimal::from(*value)),
        Data::Float(value) => Decimal::try_from(*value)
            .map(Cell::Number)
            .unwrap_or(Cell::Empty),
        Data::String(text) => Cell::text(text.as_str()),
        other => Cell::text(other.to_string()),
    }
}
