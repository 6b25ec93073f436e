//! 預留帳本的持久化

use chrono::{DateTime, NaiveDateTime, Utc};
use mrp_core::{MaterialId, OrderId, OrderSnapshot, ReservationError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// 持久化的帳本文件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerDocument {
    /// 物料累計預留量
    #[serde(default)]
    pub reserved_materials: BTreeMap<MaterialId, Decimal>,

    /// 目前選擇的訂單
    #[serde(default)]
    pub selected_orders: BTreeMap<OrderId, OrderSnapshot>,

    /// 寫入時間
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// 寫入時間格式錯誤不影響帳本其餘內容
fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|v| v.as_str()).and_then(|text| {
        DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|dt| dt.and_utc())
            })
    }))
}

/// 帳本儲存介面
pub trait LedgerStore {
    /// 讀取帳本；不存在時回傳 `Ok(None)`
    fn load(&self) -> Result<Option<LedgerDocument>>;

    /// 寫入帳本
    fn save(&mut self, document: &LedgerDocument) -> Result<()>;

    /// 刪除帳本；回傳是否真的刪除了資料
    fn remove(&mut self) -> Result<bool>;

    /// 儲存位置描述（用於日誌）
    fn location(&self) -> String;
}

/// JSON 檔案帳本
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn persistence_error(&self, action: &str, err: impl std::fmt::Display) -> ReservationError {
        ReservationError::Persistence(format!("{} {}: {}", action, self.path.display(), err))
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> Result<Option<LedgerDocument>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| self.persistence_error("無法讀取", e))?;
        let document = serde_json::from_str(&text)
            .map_err(|e| self.persistence_error("無法解析", e))?;
        Ok(Some(document))
    }

    fn save(&mut self, document: &LedgerDocument) -> Result<()> {
        let json = serde_json::to_string_pretty(document)
            .map_err(|e| self.persistence_error("無法序列化", e))?;

        // 先寫暫存檔再改名，避免中途失敗留下半份帳本
        let temp = self.temp_path();
        std::fs::write(&temp, json).map_err(|e| self.persistence_error("無法寫入", e))?;
        std::fs::rename(&temp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&temp);
            self.persistence_error("無法寫入", e)
        })?;
        Ok(())
    }

    fn remove(&mut self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.persistence_error("無法刪除", e)),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// 記憶體帳本（測試及不需持久化的場合）
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    document: Option<LedgerDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以既有帳本內容創建
    pub fn with_document(document: LedgerDocument) -> Self {
        Self {
            document: Some(document),
        }
    }

    pub fn document(&self) -> Option<&LedgerDocument> {
        self.document.as_ref()
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Result<Option<LedgerDocument>> {
        Ok(self.document.clone())
    }

    fn save(&mut self, document: &LedgerDocument) -> Result<()> {
        self.document = Some(document.clone());
        Ok(())
    }

    fn remove(&mut self) -> Result<bool> {
        Ok(self.document.take().is_some())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
