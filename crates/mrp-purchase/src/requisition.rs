//! 請購單模型與建立

use chrono::{Local, NaiveDateTime};
use mrp_core::{add_quantity, MaterialId, OrderId, OrderSnapshot};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::pricing::PriceEstimator;

/// 請購單明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequisitionLine {
    /// 物料ID
    pub material: MaterialId,

    /// 採購數量
    pub quantity: Decimal,

    /// 估算單價
    pub unit_price: Decimal,

    /// 估算金額
    pub line_cost: Decimal,
}

/// 請購單
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRequisition {
    /// 請購單ID
    pub id: Uuid,

    /// 建立時間（本地時間）
    pub created_at: NaiveDateTime,

    /// 相關訂單
    pub orders: Vec<OrderId>,

    /// 明細
    pub lines: Vec<RequisitionLine>,

    /// 估算總金額
    pub total_cost: Decimal,

    /// 幣別標示
    pub currency: String,
}

impl PurchaseRequisition {
    /// 明細筆數
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// 取得物料的明細
    pub fn line(&self, material: &str) -> Option<&RequisitionLine> {
        self.lines.iter().find(|line| line.material == material)
    }
}

/// 請購結果
#[derive(Debug, Clone, PartialEq)]
pub enum RequisitionOutcome {
    /// 所有物料都足夠，不需請購
    NotRequired,
    /// 請購單草稿
    Draft(PurchaseRequisition),
}

impl RequisitionOutcome {
    /// 是否需要請購
    pub fn is_required(&self) -> bool {
        matches!(self, RequisitionOutcome::Draft(_))
    }

    /// 取得請購單
    pub fn requisition(&self) -> Option<&PurchaseRequisition> {
        match self {
            RequisitionOutcome::Draft(requisition) => Some(requisition),
            RequisitionOutcome::NotRequired => None,
        }
    }
}

/// 請購單建立器
pub struct RequisitionBuilder<P: PriceEstimator> {
    pricer: P,
    currency: String,
}

impl<P: PriceEstimator> RequisitionBuilder<P> {
    /// 創建請購單建立器
    pub fn new(pricer: P, currency: impl Into<String>) -> Self {
        Self {
            pricer,
            currency: currency.into(),
        }
    }

    /// 由採購需求建立請購單
    ///
    /// 採購需求為空時回傳 [`RequisitionOutcome::NotRequired`]，不產生空白請購單。
    pub fn build(
        &self,
        purchase_requirements: &BTreeMap<MaterialId, Decimal>,
        selected_orders: &BTreeMap<OrderId, OrderSnapshot>,
    ) -> RequisitionOutcome {
        let lines: Vec<RequisitionLine> = purchase_requirements
            .iter()
            .filter(|(_, quantity)| **quantity > Decimal::ZERO)
            .map(|(material, &quantity)| {
                let unit_price = self.pricer.unit_price(material);
                let line_cost = unit_price.checked_mul(quantity).unwrap_or_else(|| {
                    tracing::warn!("估算金額溢位，記為 0: {} × {}", material, quantity);
                    Decimal::ZERO
                });
                RequisitionLine {
                    material: material.clone(),
                    quantity,
                    unit_price,
                    line_cost,
                }
            })
            .collect();

        if lines.is_empty() {
            tracing::info!("不需請購：所有物料都足夠");
            return RequisitionOutcome::NotRequired;
        }

        let total_cost = lines
            .iter()
            .fold(Decimal::ZERO, |total, line| add_quantity(total, line.line_cost, &line.material));
        let requisition = PurchaseRequisition {
            id: Uuid::new_v4(),
            created_at: Local::now().naive_local(),
            orders: selected_orders.keys().cloned().collect(),
            lines,
            total_cost,
            currency: self.currency.clone(),
        };

        tracing::info!(
            "建立請購單 {}：物料 {} 種，估算總金額 {}",
            requisition.id,
            requisition.line_count(),
            requisition.total_cost
        );

        RequisitionOutcome::Draft(requisition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::KeywordPriceTable;
    use mrp_core::Order;

    fn selected() -> BTreeMap<OrderId, OrderSnapshot> {
        BTreeMap::from([
            ("101".to_string(), Order::new("101").snapshot(None)),
            ("102".to_string(), Order::new("102").snapshot(None)),
        ])
    }

    #[test]
    fn test_empty_requirements_not_required() {
        let builder = RequisitionBuilder::new(KeywordPriceTable::default(), "руб.");
        let outcome = builder.build(&BTreeMap::new(), &selected());

        assert_eq!(outcome, RequisitionOutcome::NotRequired);
        assert!(!outcome.is_required());
        assert!(outcome.requisition().is_none());
    }

    #[test]
    fn test_build_priced_requisition() {
        let builder = RequisitionBuilder::new(KeywordPriceTable::default(), "руб.");
        let requirements = BTreeMap::from([
            ("Glass 4mm".to_string(), Decimal::from(3)),
            ("Butyl".to_string(), Decimal::new(15, 1)),
        ]);

        let outcome = builder.build(&requirements, &selected());
        let requisition = outcome.requisition().unwrap();

        assert_eq!(requisition.orders, vec!["101", "102"]);
        assert_eq!(requisition.line_count(), 2);
        assert_eq!(requisition.line("Glass 4mm").unwrap().line_cost, Decimal::from(4500));
        assert_eq!(requisition.line("Butyl").unwrap().line_cost, Decimal::from(1500));
        assert_eq!(requisition.total_cost, Decimal::from(6000));
    }

    #[test]
    fn test_overflowing_cost_recorded_as_zero() {
        let builder = RequisitionBuilder::new(KeywordPriceTable::default(), "руб.");
        let huge = Decimal::from_scientific("5e28").unwrap();
        let requirements = BTreeMap::from([
            ("Glass".to_string(), huge),
            ("Tape".to_string(), Decimal::from(2)),
        ]);

        let outcome = builder.build(&requirements, &selected());
        let requisition = outcome.requisition().unwrap();
        assert_eq!(requisition.line("Glass").unwrap().line_cost, Decimal::ZERO);
        assert_eq!(requisition.line("Tape").unwrap().line_cost, Decimal::from(600));
        assert_eq!(requisition.total_cost, Decimal::from(600));
    }
}
