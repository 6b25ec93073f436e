//! 客戶訂單模型

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 由具型別欄位序列化的鍵，不能再出現在 `extra` 中
pub const RESERVED_FIELDS: [&str; 6] = [
    "order_number",
    "client",
    "status",
    "cost",
    "area",
    "shipment_date",
];

/// 客戶訂單
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// 訂單號
    pub order_number: String,

    /// 客戶
    #[serde(default)]
    pub client: Option<String>,

    /// 訂單狀態
    #[serde(default)]
    pub status: Option<String>,

    /// 訂單金額
    #[serde(default)]
    pub cost: Option<Decimal>,

    /// 訂單面積（平方公尺）
    #[serde(default)]
    pub area: Option<Decimal>,

    /// 其他欄位，原樣保留
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Order {
    /// 創建新的訂單
    pub fn new(order_number: impl Into<String>) -> Self {
        Self {
            order_number: order_number.into(),
            client: None,
            status: None,
            cost: None,
            area: None,
            extra: BTreeMap::new(),
        }
    }

    /// 建構器模式：設置客戶
    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }

    /// 建構器模式：設置訂單狀態
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// 建構器模式：設置訂單金額
    pub fn with_cost(mut self, cost: Decimal) -> Self {
        self.cost = Some(cost);
        self
    }

    /// 建構器模式：設置訂單面積
    pub fn with_area(mut self, area: Decimal) -> Self {
        self.area = Some(area);
        self
    }

    /// 建構器模式：添加其他欄位
    ///
    /// 與具型別欄位同名的欄位會被略過。
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let name = name.into();
        if Self::is_reserved_field(&name) {
            tracing::warn!("訂單 {}: 欄位 {} 與保留欄位同名，已略過", self.key(), name);
            return self;
        }
        self.extra.insert(name, value.into());
        self
    }

    /// 是否為保留欄位名稱
    pub fn is_reserved_field(name: &str) -> bool {
        RESERVED_FIELDS.contains(&name)
    }

    /// 去除空白後的訂單號
    pub fn key(&self) -> &str {
        self.order_number.trim()
    }

    /// 建立選取快照
    ///
    /// `extra` 中與保留欄位同名的鍵不會帶入快照，確保快照可以寫入後再讀回。
    pub fn snapshot(&self, shipment_date: Option<NaiveDate>) -> OrderSnapshot {
        let mut order = self.clone();
        order.extra.retain(|name, _| !Self::is_reserved_field(name));
        OrderSnapshot {
            order,
            shipment_date,
        }
    }
}

/// 選取時的訂單快照（附出貨日期）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    #[serde(flatten)]
    pub order: Order,

    /// 出貨日期
    #[serde(default, deserialize_with = "lenient_date")]
    pub shipment_date: Option<NaiveDate>,
}

/// 寬鬆解析出貨日期：接受 ISO 日期或日期時間，其他值一律視為 `None`
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|v| v.as_str()).and_then(parse_iso_date))
}

/// 解析 ISO-8601 日期（`2024-12-25`）或日期時間（`2024-12-25T00:00:00`）
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// 訂單表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrdersTable {
    pub rows: Vec<Order>,
}

impl OrdersTable {
    /// 創建訂單表
    pub fn new(rows: Vec<Order>) -> Self {
        Self { rows }
    }

    /// 依訂單號查找（去除空白後完全相同，重複時取第一筆）
    pub fn find(&self, order_number: &str) -> Option<&Order> {
        let wanted = order_number.trim();
        self.rows.iter().find(|order| order.key() == wanted)
    }

    /// 檢查訂單號是否存在
    pub fn contains(&self, order_number: &str) -> bool {
        self.find(order_number).is_some()
    }

    /// 所有客戶（排序、去重）
    pub fn clients(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|order| order.client.as_deref())
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// 依客戶篩選訂單；`None` 表示全部
    pub fn by_client(&self, client: Option<&str>) -> Vec<&Order> {
        match client {
            Some(client) => self
                .rows
                .iter()
                .filter(|order| order.client.as_deref().map(str::trim) == Some(client.trim()))
                .collect(),
            None => self.rows.iter().collect(),
        }
    }

    /// 所有訂單號（去重，保持來源順序）
    pub fn order_numbers(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.rows
            .iter()
            .map(Order::key)
            .filter(|key| !key.is_empty() && seen.insert(*key))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_table() -> OrdersTable {
        OrdersTable::new(vec![
            Order::new(" 101 ").with_client("Okna Plus"),
            Order::new("102").with_client("Steklo"),
            Order::new("101").with_client("Duplicate"),
            Order::new("103").with_client("Okna Plus"),
        ])
    }

    #[test]
    fn test_find_first_match_trimmed() {
        let table = sample_table();
        let order = table.find("101").unwrap();
        assert_eq!(order.client.as_deref(), Some("Okna Plus"));
        assert!(table.find("999").is_none());
    }

    #[test]
    fn test_clients_sorted_unique() {
        assert_eq!(sample_table().clients(), vec!["Okna Plus", "Steklo"]);
    }

    #[test]
    fn test_by_client() {
        let table = sample_table();
        assert_eq!(table.by_client(Some("Okna Plus")).len(), 2);
        assert_eq!(table.by_client(None).len(), 4);
    }

    #[test]
    fn test_order_numbers_unique() {
        assert_eq!(sample_table().order_numbers(), vec!["101", "102", "103"]);
    }

    #[rstest]
    #[case("2024-12-25", Some((2024, 12, 25)))]
    #[case("2024-12-25T00:00:00", Some((2024, 12, 25)))]
    #[case("2024-12-25T08:30:00.123", Some((2024, 12, 25)))]
    #[case("2024-12-25T08:30:00+03:00", Some((2024, 12, 25)))]
    #[case("25.12.2024", None)]
    #[case("", None)]
    fn test_parse_iso_date(#[case] text: &str, #[case] expected: Option<(i32, u32, u32)>) {
        let expected = expected.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        assert_eq!(parse_iso_date(text), expected);
    }

    #[test]
    fn test_snapshot_serialization() {
        let order = Order::new("101")
            .with_client("Okna Plus")
            .with_cost(Decimal::new(125050, 2))
            .with_field("Менеджер", "Иванов");
        let snapshot = order.snapshot(NaiveDate::from_ymd_opt(2024, 12, 25));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["order_number"], "101");
        assert_eq!(json["shipment_date"], "2024-12-25");
        assert_eq!(json["Менеджер"], "Иванов");

        let restored: OrderSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn test_invalid_shipment_date_becomes_none() {
        let json = serde_json::json!({
            "order_number": "101",
            "shipment_date": "not a date"
        });
        let restored: OrderSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(restored.shipment_date, None);
        assert!(restored.order.extra.is_empty());
    }

    #[test]
    fn test_reserved_field_names_stay_out_of_extra() {
        let order = Order::new("101")
            .with_client("A")
            .with_field("client", "B")
            .with_field("shipment_date", "2024-01-01")
            .with_field("Менеджер", "Иванов");
        assert_eq!(order.extra.len(), 1);
        assert_eq!(order.client.as_deref(), Some("A"));

        let mut direct = order.clone();
        direct.extra.insert("cost".to_string(), serde_json::json!(5));
        let snapshot = direct.snapshot(None);
        assert!(!snapshot.order.extra.contains_key("cost"));

        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: OrderSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);
    }
}
