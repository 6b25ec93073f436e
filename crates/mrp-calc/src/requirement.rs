//! 物料平衡計算

use mrp_core::{add_quantity, MaterialId, OrderId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::resolver::OrderMaterials;

/// 單一物料的平衡
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialBalance {
    /// 現有庫存
    pub current_stock: Decimal,
    /// 已預留
    pub already_reserved: Decimal,
    /// 目前可用 = max(0, 現有庫存 - 已預留)
    pub available_now: Decimal,
    /// 所選訂單的需求
    pub required: Decimal,
    /// 預留後餘額 = 目前可用 - 需求，負值表示短缺
    pub balance_after: Decimal,
}

impl MaterialBalance {
    /// 計算物料平衡
    pub fn calculate(current_stock: Decimal, already_reserved: Decimal, required: Decimal) -> Self {
        // 只有負庫存減去大量預留時才會溢位，此時可用量為 0
        let available_now = current_stock
            .checked_sub(already_reserved)
            .unwrap_or(Decimal::ZERO)
            .max(Decimal::ZERO);
        Self {
            current_stock,
            already_reserved,
            available_now,
            required,
            balance_after: available_now - required,
        }
    }

    /// 是否短缺
    pub fn is_short(&self) -> bool {
        self.balance_after < Decimal::ZERO
    }

    /// 短缺數量（需採購量），不短缺時為 0
    pub fn shortfall(&self) -> Decimal {
        if self.is_short() {
            -self.balance_after
        } else {
            Decimal::ZERO
        }
    }
}

/// 需求報告（按需計算，不快取也不持久化）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementReport {
    /// 物料總需求（僅包含需求大於 0 的物料）
    pub material_requirements: BTreeMap<MaterialId, Decimal>,

    /// 物料平衡
    pub material_balance: BTreeMap<MaterialId, MaterialBalance>,

    /// 採購需求（僅包含短缺物料）
    pub purchase_requirements: BTreeMap<MaterialId, Decimal>,

    /// 各訂單的物料需求
    pub order_materials: BTreeMap<OrderId, OrderMaterials>,
}

impl RequirementReport {
    /// 由各訂單需求、庫存與已預留量建立報告
    pub fn build<F, G>(order_materials: BTreeMap<OrderId, OrderMaterials>, stock: F, reserved: G) -> Self
    where
        F: Fn(&str) -> Decimal,
        G: Fn(&str) -> Decimal,
    {
        let mut material_requirements: BTreeMap<MaterialId, Decimal> = BTreeMap::new();
        for materials in order_materials.values() {
            for (material, quantity) in materials {
                let entry = material_requirements
                    .entry(material.clone())
                    .or_insert(Decimal::ZERO);
                *entry = add_quantity(*entry, *quantity, material);
            }
        }
        material_requirements.retain(|_, required| *required > Decimal::ZERO);

        let mut material_balance = BTreeMap::new();
        let mut purchase_requirements = BTreeMap::new();

        for (material, &required) in &material_requirements {
            let balance = MaterialBalance::calculate(stock(material), reserved(material), required);
            if balance.is_short() {
                purchase_requirements.insert(material.clone(), balance.shortfall());
            }
            material_balance.insert(material.clone(), balance);
        }

        Self {
            material_requirements,
            material_balance,
            purchase_requirements,
            order_materials,
        }
    }

    /// 是否需要採購
    pub fn needs_purchase(&self) -> bool {
        !self.purchase_requirements.is_empty()
    }

    /// 取得物料平衡
    pub fn balance(&self, material: &str) -> Option<&MaterialBalance> {
        self.material_balance.get(material)
    }
}
