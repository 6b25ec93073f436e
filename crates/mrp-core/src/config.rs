//! 引擎配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{ReservationError, Result};

/// 預設的預留帳本檔名
pub const DEFAULT_LEDGER_FILE: &str = "reservations.json";

/// 預留引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 預留帳本檔案路徑
    pub ledger_path: PathBuf,

    /// 請購單輸出目錄
    pub requisition_dir: PathBuf,

    /// 請購單金額的幣別標示
    pub currency: String,

    /// 無法匹配價格規則時的預設單價
    pub default_unit_price: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from(DEFAULT_LEDGER_FILE),
            requisition_dir: PathBuf::from("."),
            currency: "руб.".to_string(),
            default_unit_price: Decimal::from(1000),
        }
    }
}

impl EngineConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 檔案載入配置，缺少的欄位使用預設值
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ReservationError::InvalidConfig(format!("無法讀取 {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            ReservationError::InvalidConfig(format!("無法解析 {}: {}", path.display(), e))
        })?;
        config.validate()?;
        tracing::debug!("載入配置: {}", path.display());
        Ok(config)
    }

    /// 建構器模式：設置帳本路徑
    pub fn with_ledger_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ledger_path = path.into();
        self
    }

    /// 建構器模式：設置請購單輸出目錄
    pub fn with_requisition_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.requisition_dir = dir.into();
        self
    }

    /// 建構器模式：設置幣別
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// 建構器模式：設置預設單價
    pub fn with_default_unit_price(mut self, price: Decimal) -> Self {
        self.default_unit_price = price;
        self
    }

    /// 檢查配置是否有效
    pub fn validate(&self) -> Result<()> {
        if self.ledger_path.as_os_str().is_empty() {
            return Err(ReservationError::InvalidConfig("帳本路徑不可為空".to_string()));
        }
        if self.default_unit_price < Decimal::ZERO {
            return Err(ReservationError::InvalidConfig(format!(
                "預設單價不可為負: {}",
                self.default_unit_price
            )));
        }
        Ok(())
    }
}
