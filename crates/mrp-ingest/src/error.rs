//! 匯入錯誤類型

use thiserror::Error;

/// 匯入錯誤
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("檔案不存在: {0}")]
    FileNotFound(String),

    #[error("檔案格式不支援: {0}（僅支援 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("找不到工作表: {0}")]
    SheetNotFound(String),

    #[error("Excel 解析失敗: {0}")]
    ExcelParse(String),

    #[error("CSV 解析失敗: {0}")]
    CsvParse(#[from] csv::Error),

    #[error("缺少必要欄位: {0}")]
    MissingColumn(String),

    #[error("表格沒有標題列")]
    NoHeader,
}

pub type Result<T> = std::result::Result<T, IngestError>;
