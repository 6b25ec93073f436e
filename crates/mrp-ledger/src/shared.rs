//! 多執行緒共用的預留引擎
//!
//! `reserve` 對預留量是先讀後寫的累加，跨物料不具原子性，
//! 因此選擇、預留與清除都必須在同一把鎖下依序執行。

use chrono::NaiveDate;
use mrp_calc::RequirementReport;
use mrp_core::{MaterialId, ReservationError, Result, Warning};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::engine::{ReservationEngine, ReservationOutcome, Selection};
use crate::store::LedgerStore;

/// 以互斥鎖保護的預留引擎
pub struct SharedReservationEngine<S: LedgerStore> {
    inner: Arc<Mutex<ReservationEngine<S>>>,
}

impl<S: LedgerStore> Clone for SharedReservationEngine<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: LedgerStore> SharedReservationEngine<S> {
    pub fn new(engine: ReservationEngine<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ReservationEngine<S>>> {
        self.inner
            .lock()
            .map_err(|_| ReservationError::Other("預留引擎鎖已中毒".to_string()))
    }

    /// 在鎖內執行任意操作
    pub fn with<T>(&self, f: impl FnOnce(&mut ReservationEngine<S>) -> T) -> Result<T> {
        let mut engine = self.lock()?;
        Ok(f(&mut engine))
    }

    pub fn restore(&self) -> Result<bool> {
        self.lock()?.restore()
    }

    pub fn select(&self, order_ids: &[&str], shipment_dates: &HashMap<String, NaiveDate>) -> Result<Selection> {
        Ok(self.lock()?.select(order_ids.iter().copied(), shipment_dates))
    }

    pub fn reserve(
        &self,
        order_ids: &[&str],
        shipment_dates: &HashMap<String, NaiveDate>,
    ) -> Result<ReservationOutcome> {
        self.lock()?.reserve(order_ids.iter().copied(), shipment_dates)
    }

    pub fn requirements(&self) -> Result<RequirementReport> {
        self.lock()?.requirements()
    }

    pub fn clear(&self) -> Result<Vec<Warning>> {
        Ok(self.lock()?.clear())
    }

    /// 目前累計預留量的複本
    pub fn reserved_materials(&self) -> Result<BTreeMap<MaterialId, Decimal>> {
        Ok(self.lock()?.reserved_materials().clone())
    }
}
