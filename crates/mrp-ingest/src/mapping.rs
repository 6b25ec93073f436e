//! 欄位對應配置

use serde::{Deserialize, Serialize};

/// 工作表與欄位名稱對應
///
/// 預設值對應生產統計工作簿的俄文標題。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    /// 訂單工作表
    pub orders_sheet: String,
    /// 物料需求工作表
    pub materials_sheet: String,

    /// 訂單號欄
    pub order_number: String,
    /// 客戶欄
    pub client: String,
    /// 訂單狀態欄
    pub status: String,
    /// 訂單金額欄
    pub cost: String,
    /// 訂單面積欄
    pub area: String,

    /// 物料名稱欄
    pub material: String,
    /// 現有庫存欄
    pub on_hand: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            orders_sheet: "Заказы".to_string(),
            materials_sheet: "Потребность материалов".to_string(),
            order_number: "Номер заказа".to_string(),
            client: "Клиент".to_string(),
            status: "Состояние заказа".to_string(),
            cost: "Стоимость заказа".to_string(),
            area: "Площадь заказа".to_string(),
            material: "Материал".to_string(),
            on_hand: "На складе".to_string(),
        }
    }
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置工作表名稱
    pub fn with_sheets(mut self, orders: impl Into<String>, materials: impl Into<String>) -> Self {
        self.orders_sheet = orders.into();
        self.materials_sheet = materials.into();
        self
    }

    /// 建構器模式：設置訂單號與客戶欄
    pub fn with_order_columns(mut self, order_number: impl Into<String>, client: impl Into<String>) -> Self {
        self.order_number = order_number.into();
        self.client = client.into();
        self
    }

    /// 建構器模式：設置訂單狀態、金額、面積欄
    pub fn with_order_details(
        mut self,
        status: impl Into<String>,
        cost: impl Into<String>,
        area: impl Into<String>,
    ) -> Self {
        self.status = status.into();
        self.cost = cost.into();
        self.area = area.into();
        self
    }

    /// 建構器模式：設置物料名稱與現有庫存欄
    pub fn with_material_columns(mut self, material: impl Into<String>, on_hand: impl Into<String>) -> Self {
        self.material = material.into();
        self.on_hand = on_hand.into();
        self
    }
}
