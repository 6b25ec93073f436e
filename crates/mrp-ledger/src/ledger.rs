//! 預留帳本

use chrono::{NaiveDate, Utc};
use mrp_core::{add_quantity, MaterialId, OrderId, OrderSnapshot, OrdersTable, Result, Warning};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use crate::store::{LedgerDocument, LedgerStore};

/// 預留帳本
///
/// 物料的累計預留量只增不減（除非整本清除），與產生預留的訂單無關；
/// 選擇的訂單每次選擇時整批替換。
pub struct ReservationLedger<S: LedgerStore> {
    /// 物料累計預留量
    reserved: BTreeMap<MaterialId, Decimal>,

    /// 目前選擇的訂單
    selected: BTreeMap<OrderId, OrderSnapshot>,

    /// 持久化儲存
    store: S,
}

impl<S: LedgerStore> ReservationLedger<S> {
    /// 創建空帳本
    pub fn new(store: S) -> Self {
        Self {
            reserved: BTreeMap::new(),
            selected: BTreeMap::new(),
            store,
        }
    }

    /// 物料累計預留量
    pub fn reserved(&self) -> &BTreeMap<MaterialId, Decimal> {
        &self.reserved
    }

    /// 單一物料的預留量，未預留為 0
    pub fn reserved_qty(&self, material: &str) -> Decimal {
        self.reserved.get(material).copied().unwrap_or(Decimal::ZERO)
    }

    /// 目前選擇的訂單
    pub fn selected(&self) -> &BTreeMap<OrderId, OrderSnapshot> {
        &self.selected
    }

    /// 獲取儲存引用
    pub fn store(&self) -> &S {
        &self.store
    }

    /// 選擇訂單
    ///
    /// 以訂單表中匹配列的快照整批替換目前選擇；找不到的訂單直接略過，
    /// 呼叫端以請求數與結果數比較得知。出貨日期取自 `shipment_dates`，沒有則為空。
    pub fn select<'a, I>(
        &mut self,
        orders: &OrdersTable,
        order_ids: I,
        shipment_dates: &HashMap<String, NaiveDate>,
    ) -> &BTreeMap<OrderId, OrderSnapshot>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.selected = order_ids
            .into_iter()
            .map(str::trim)
            .filter_map(|id| {
                orders.find(id).map(|order| {
                    let shipment_date = shipment_dates.get(id).copied();
                    (id.to_string(), order.snapshot(shipment_date))
                })
            })
            .collect();

        tracing::info!("選擇訂單: {} 筆", self.selected.len());
        &self.selected
    }

    /// 累加預留量
    pub fn accumulate(&mut self, required: &BTreeMap<MaterialId, Decimal>) {
        for (material, quantity) in required {
            let entry = self.reserved.entry(material.clone()).or_insert(Decimal::ZERO);
            *entry = add_quantity(*entry, *quantity, material);
        }
        tracing::debug!("預留物料: 本次 {} 種，累計 {} 種", required.len(), self.reserved.len());
    }

    /// 目前狀態的帳本文件
    pub fn to_document(&self) -> LedgerDocument {
        LedgerDocument {
            reserved_materials: self.reserved.clone(),
            selected_orders: self.selected.clone(),
            timestamp: Some(Utc::now()),
        }
    }

    /// 寫入儲存
    pub fn persist(&mut self) -> Result<()> {
        let document = self.to_document();
        self.store.save(&document)?;
        tracing::info!("預留資料已儲存至 {}", self.store.location());
        Ok(())
    }

    /// 從儲存恢復
    ///
    /// 回傳是否找到先前的狀態。讀取或解析失敗時回傳錯誤，記憶體狀態保持不變。
    pub fn restore(&mut self) -> Result<bool> {
        match self.store.load() {
            Ok(Some(document)) => {
                self.reserved = document.reserved_materials;
                self.selected = document.selected_orders;
                tracing::info!(
                    "載入先前的預留：訂單 {} 筆，物料 {} 種",
                    self.selected.len(),
                    self.reserved.len()
                );
                Ok(true)
            }
            Ok(None) => {
                tracing::debug!("沒有先前的預留資料: {}", self.store.location());
                Ok(false)
            }
            Err(e) => {
                tracing::warn!("無法載入預留資料: {}", e);
                Err(e)
            }
        }
    }

    /// 清除所有預留並刪除持久化資料
    ///
    /// 一律成功；刪除檔案失敗只以警告回報。
    pub fn clear(&mut self) -> Vec<Warning> {
        self.reserved.clear();
        self.selected.clear();

        match self.store.remove() {
            Ok(true) => {
                tracing::info!("預留資料已刪除: {}", self.store.location());
                Vec::new()
            }
            Ok(false) => Vec::new(),
            Err(e) => {
                tracing::warn!("無法刪除預留資料: {}", e);
                vec![Warning::from_error(self.store.location(), &e)]
            }
        }
    }
}
