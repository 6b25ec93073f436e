//! 預留引擎
//!
//! 把訂單表、需求計算器與預留帳本組合在一起：
//! 建立 → 選擇性恢復 → 選擇 / 預留 / 計算 / 清除。

use chrono::NaiveDate;
use mrp_calc::{RequirementCalculator, RequirementReport};
use mrp_core::{
    EngineConfig, MaterialId, MaterialsTable, OrderId, OrderSnapshot, OrdersTable,
    ReservationError, Result, Warning,
};
use mrp_purchase::{KeywordPriceTable, PurchaseRequisition, RequisitionBuilder, RequisitionOutcome};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crate::ledger::ReservationLedger;
use crate::store::{JsonFileStore, LedgerStore};

/// 預留結果
#[derive(Debug, Clone)]
pub struct ReservationOutcome {
    /// 本次預留的訂單
    pub reserved_orders: Vec<OrderId>,

    /// 預留後的累計預留量
    pub reserved_materials: BTreeMap<MaterialId, Decimal>,

    /// 預留前計算的需求報告
    pub report: RequirementReport,

    /// 帳本是否已成功寫入
    pub persisted: bool,

    /// 已恢復的問題（找不到的訂單、持久化失敗）
    pub warnings: Vec<Warning>,
}

/// 選擇結果
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// 已選擇的訂單
    pub selected: Vec<OrderId>,

    /// 訂單表中找不到的訂單
    pub missing: Vec<String>,
}

/// 目前的預留狀態
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveReservations<'a> {
    pub selected_orders: &'a BTreeMap<OrderId, OrderSnapshot>,
    pub reserved_materials: &'a BTreeMap<MaterialId, Decimal>,
}

impl ActiveReservations<'_> {
    /// 是否沒有任何預留
    pub fn is_empty(&self) -> bool {
        self.selected_orders.is_empty() && self.reserved_materials.is_empty()
    }
}

/// 預留引擎
pub struct ReservationEngine<S: LedgerStore = JsonFileStore> {
    orders: OrdersTable,
    calculator: RequirementCalculator,
    ledger: ReservationLedger<S>,
    config: EngineConfig,
}

impl ReservationEngine<JsonFileStore> {
    /// 以配置中的帳本路徑創建引擎
    pub fn with_file_store(
        orders: OrdersTable,
        materials: MaterialsTable,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        let store = JsonFileStore::new(config.ledger_path.clone());
        Ok(Self::new(orders, materials, store, config))
    }
}

impl<S: LedgerStore> ReservationEngine<S> {
    /// 創建新的預留引擎（帳本為空）
    pub fn new(orders: OrdersTable, materials: MaterialsTable, store: S, config: EngineConfig) -> Self {
        tracing::info!("載入訂單表: {} 筆", orders.len());
        Self {
            orders,
            calculator: RequirementCalculator::new(materials),
            ledger: ReservationLedger::new(store),
            config,
        }
    }

    /// 從儲存恢復先前的預留
    ///
    /// 失敗不影響引擎使用，帳本維持原狀。
    pub fn restore(&mut self) -> Result<bool> {
        self.ledger.restore()
    }

    /// 選擇訂單（不預留）
    pub fn select<'a, I>(&mut self, order_ids: I, shipment_dates: &HashMap<String, NaiveDate>) -> Selection
    where
        I: IntoIterator<Item = &'a str>,
    {
        let requested = normalize_ids(order_ids);
        let selected: Vec<OrderId> = self
            .ledger
            .select(&self.orders, requested.iter().map(String::as_str), shipment_dates)
            .keys()
            .cloned()
            .collect();

        let missing = missing_orders(&requested, &selected);
        for id in &missing {
            tracing::warn!("找不到訂單: {}", id);
        }

        Selection { selected, missing }
    }

    /// 預留訂單所需物料
    ///
    /// 先選擇訂單，再以預留前的帳本計算需求報告，然後把需求累加到帳本並寫入儲存。
    /// 沒有任何訂單被選中時回傳 [`ReservationError::NoOrdersSelected`]，帳本與儲存不變。
    /// 寫入失敗不會撤銷記憶體中的預留，只在結果中附上警告。
    pub fn reserve<'a, I>(
        &mut self,
        order_ids: I,
        shipment_dates: &HashMap<String, NaiveDate>,
    ) -> Result<ReservationOutcome>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let selection = self.select(order_ids, shipment_dates);
        let report = self.requirements()?;

        self.ledger.accumulate(&report.material_requirements);

        let mut warnings: Vec<Warning> = selection
            .missing
            .iter()
            .map(|id| Warning::from_error(id.clone(), &ReservationError::OrderNotFound(id.clone())))
            .collect();

        let persisted = match self.ledger.persist() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("預留已生效但未能儲存: {}", e);
                warnings.push(Warning::from_error(self.ledger.store().location(), &e));
                false
            }
        };

        tracing::info!(
            "預留完成：訂單 {} 筆，物料 {} 種",
            selection.selected.len(),
            report.material_requirements.len()
        );

        Ok(ReservationOutcome {
            reserved_orders: selection.selected,
            reserved_materials: self.ledger.reserved().clone(),
            report,
            persisted,
            warnings,
        })
    }

    /// 計算目前選擇訂單的需求報告（不修改狀態）
    pub fn requirements(&self) -> Result<RequirementReport> {
        self.calculator.compute(
            self.ledger.selected().keys().map(String::as_str),
            self.ledger.reserved(),
        )
    }

    /// 為目前選擇的訂單建立請購單
    pub fn purchase_requisition(&self) -> Result<RequisitionOutcome> {
        let report = self.requirements()?;
        let builder = RequisitionBuilder::new(
            KeywordPriceTable::standard(self.config.default_unit_price),
            self.config.currency.clone(),
        );
        Ok(builder.build(&report.purchase_requirements, self.ledger.selected()))
    }

    /// 把請購單寫入配置的輸出目錄
    pub fn write_requisition(&self, requisition: &PurchaseRequisition) -> Result<PathBuf> {
        requisition.write_to_dir(&self.config.requisition_dir)
    }

    /// 清除所有預留
    pub fn clear(&mut self) -> Vec<Warning> {
        tracing::info!("清除所有預留");
        self.ledger.clear()
    }

    /// 目前選擇的訂單與累計預留量
    pub fn active_reservations(&self) -> ActiveReservations<'_> {
        ActiveReservations {
            selected_orders: self.ledger.selected(),
            reserved_materials: self.ledger.reserved(),
        }
    }

    /// 目前選擇的訂單
    pub fn selected_orders(&self) -> &BTreeMap<OrderId, OrderSnapshot> {
        self.ledger.selected()
    }

    /// 物料累計預留量
    pub fn reserved_materials(&self) -> &BTreeMap<MaterialId, Decimal> {
        self.ledger.reserved()
    }

    /// 載入時的警告（如物料表缺少庫存欄）
    pub fn warnings(&self) -> &[Warning] {
        self.calculator.warnings()
    }

    pub fn orders(&self) -> &OrdersTable {
        &self.orders
    }

    pub fn calculator(&self) -> &RequirementCalculator {
        &self.calculator
    }

    pub fn ledger(&self) -> &ReservationLedger<S> {
        &self.ledger
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// 去除空白並去重，保持請求順序
fn normalize_ids<'a, I>(order_ids: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ids: Vec<String> = Vec::new();
    for id in order_ids.into_iter().map(str::trim).filter(|id| !id.is_empty()) {
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

fn missing_orders(requested: &[String], selected: &[OrderId]) -> Vec<String> {
    requested
        .iter()
        .filter(|id| !selected.contains(*id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LedgerDocument, MemoryStore};
    use mrp_core::{Cell, MaterialRow, Order, WarningSeverity};
    use rstest::rstest;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    fn orders() -> OrdersTable {
        OrdersTable::new(vec![
            Order::new("101").with_client("Okna Plus"),
            Order::new("102").with_client("Steklo"),
            Order::new("103").with_client("Steklo"),
        ])
    }

    fn materials() -> MaterialsTable {
        MaterialsTable::new(["101", "102", "103"])
            .with_row(
                MaterialRow::new("Glass 4mm")
                    .with_on_hand(dec(10))
                    .with_requirements([Cell::number(dec(4)), Cell::number(dec(5)), Cell::Empty]),
            )
            .with_row(
                MaterialRow::new("Argon")
                    .with_on_hand(dec(2))
                    .with_requirements([Cell::number(dec(1)), Cell::number(dec(2)), Cell::Empty]),
            )
    }

    /// 可以讀取但無法寫入的儲存
    struct ReadOnlyStore;

    impl LedgerStore for ReadOnlyStore {
        fn load(&self) -> Result<Option<LedgerDocument>> {
            Ok(None)
        }

        fn save(&mut self, _document: &LedgerDocument) -> Result<()> {
            Err(ReservationError::Persistence("read-only".to_string()))
        }

        fn remove(&mut self) -> Result<bool> {
            Ok(false)
        }

        fn location(&self) -> String {
            "read-only".to_string()
        }
    }

    fn engine() -> ReservationEngine<MemoryStore> {
        ReservationEngine::new(orders(), materials(), MemoryStore::new(), EngineConfig::default())
    }

    #[rstest]
    #[case(vec!["101", "102"], vec!["101", "102"])]
    #[case(vec![" 101 ", "101", ""], vec!["101"])]
    #[case(vec!["  ", ""], vec![])]
    fn test_normalize_ids(#[case] input: Vec<&str>, #[case] expected: Vec<&str>) {
        assert_eq!(normalize_ids(input), expected);
    }

    #[test]
    fn test_select_reports_missing() {
        let mut engine = engine();
        let selection = engine.select(["101", "999", "101"], &HashMap::new());

        assert_eq!(selection.selected, vec!["101"]);
        assert_eq!(selection.missing, vec!["999"]);
    }

    #[test]
    fn test_reserve_accumulates_and_persists() {
        let mut engine = engine();

        let first = engine.reserve(["101"], &HashMap::new()).unwrap();
        assert_eq!(first.reserved_orders, vec!["101"]);
        assert_eq!(first.reserved_materials["Glass 4mm"], dec(4));
        assert!(first.warnings.is_empty());
        assert!(first.persisted);

        let second = engine.reserve(["102"], &HashMap::new()).unwrap();
        // 預留前: 可用 10 - 4 = 6，需求 5
        assert_eq!(second.report.balance("Glass 4mm").unwrap().balance_after, dec(1));
        // Argon: 可用 2 - 1 = 1，需求 2
        assert_eq!(second.report.purchase_requirements["Argon"], dec(1));
        assert_eq!(second.reserved_materials["Glass 4mm"], dec(9));
        assert_eq!(second.reserved_materials["Argon"], dec(3));

        let stored = engine.ledger().store().document().unwrap();
        assert_eq!(&stored.reserved_materials, engine.reserved_materials());
        assert_eq!(stored.selected_orders.len(), 1);
    }

    #[test]
    fn test_reserve_without_orders_fails() {
        let mut engine = engine();
        engine.reserve(["101"], &HashMap::new()).unwrap();
        let before = engine.ledger().store().document().cloned();

        let result = engine.reserve(std::iter::empty(), &HashMap::new());
        assert!(matches!(result, Err(ReservationError::NoOrdersSelected)));

        let result = engine.reserve(["999"], &HashMap::new());
        assert!(matches!(result, Err(ReservationError::NoOrdersSelected)));

        assert_eq!(engine.reserved_materials()["Glass 4mm"], dec(4));
        assert_eq!(engine.ledger().store().document().cloned(), before);
    }

    #[test]
    fn test_failed_save_keeps_reservation() {
        let mut engine = ReservationEngine::new(orders(), materials(), ReadOnlyStore, EngineConfig::default());

        let outcome = engine.reserve(["101"], &HashMap::new()).unwrap();
        assert!(!outcome.persisted);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].severity, WarningSeverity::Error);
        assert_eq!(outcome.warnings[0].subject, "read-only");
        assert_eq!(engine.reserved_materials()["Glass 4mm"], dec(4));
        assert_eq!(engine.selected_orders().keys().collect::<Vec<_>>(), vec!["101"]);

        let second = engine.reserve(["102"], &HashMap::new()).unwrap();
        assert!(!second.persisted);
        assert_eq!(engine.reserved_materials()["Glass 4mm"], dec(9));
    }

    #[test]
    fn test_missing_order_is_warning() {
        let mut engine = engine();
        let outcome = engine.reserve(["101", "999"], &HashMap::new()).unwrap();

        assert_eq!(outcome.reserved_orders, vec!["101"]);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].subject, "999");
        assert_eq!(outcome.warnings[0].severity, WarningSeverity::Warning);
    }

    #[test]
    fn test_requirements_do_not_mutate() {
        let mut engine = engine();
        engine.select(["101", "102"], &HashMap::new());

        let first = engine.requirements().unwrap();
        let second = engine.requirements().unwrap();
        assert_eq!(first, second);
        assert!(engine.reserved_materials().is_empty());
    }

    #[test]
    fn test_purchase_requisition() {
        let mut engine = engine();
        engine.select(["101"], &HashMap::new());
        assert_eq!(engine.purchase_requisition().unwrap(), RequisitionOutcome::NotRequired);

        engine.select(["101", "102", "103"], &HashMap::new());
        let outcome = engine.purchase_requisition().unwrap();
        let requisition = outcome.requisition().unwrap();
        assert_eq!(requisition.orders, vec!["101", "102", "103"]);
        assert_eq!(requisition.line_count(), 1);
        // Argon 短缺 1，單價 200
        assert_eq!(requisition.line("Argon").unwrap().line_cost, dec(200));
    }

    #[test]
    fn test_clear_resets() {
        let mut engine = engine();
        engine.reserve(["101"], &HashMap::new()).unwrap();

        assert!(!engine.active_reservations().is_empty());
        assert!(engine.clear().is_empty());
        assert!(engine.active_reservations().is_empty());
        assert!(engine.reserved_materials().is_empty());
        assert!(engine.selected_orders().is_empty());
        assert!(engine.ledger().store().document().is_none());
        assert!(matches!(engine.requirements(), Err(ReservationError::NoOrdersSelected)));
    }
}
