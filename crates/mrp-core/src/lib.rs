//! # MRP Core
//!
//! 物料預留的核心資料模型與類型定義

pub mod config;
pub mod material;
pub mod order;

// Re-export 主要類型
pub use config::EngineConfig;
pub use material::{add_quantity, Cell, MaterialRow, MaterialsTable};
pub use order::{Order, OrderSnapshot, OrdersTable};

/// 物料ID（去除空白後的物料名稱）
pub type MaterialId = String;

/// 訂單號（去除空白後）
pub type OrderId = String;

/// 預留錯誤類型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReservationError {
    #[error("未選擇任何訂單")]
    NoOrdersSelected,

    #[error("物料表缺少現有庫存欄")]
    MaterialsSourceMissing,

    #[error("預留資料持久化失敗: {0}")]
    Persistence(String),

    #[error("找不到訂單: {0}")]
    OrderNotFound(String),

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ReservationError>;

/// 已恢復的錯誤，以警告形式附在結果上
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    /// 相關對象（物料ID、訂單號或檔案路徑）
    pub subject: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl Warning {
    pub fn new(subject: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            subject,
            message,
            severity,
        }
    }

    pub fn info(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Info)
    }

    pub fn warning(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Warning)
    }

    pub fn error(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Error)
    }

    /// 由已恢復的錯誤建立警告
    pub fn from_error(subject: impl Into<String>, error: &ReservationError) -> Self {
        let severity = match error {
            ReservationError::Persistence(_) => WarningSeverity::Error,
            ReservationError::OrderNotFound(_) | ReservationError::MaterialsSourceMissing => {
                WarningSeverity::Warning
            }
            _ => WarningSeverity::Info,
        };
        Self::new(subject.into(), error.to_string(), severity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
