//! 工作表 → 訂單表 / 物料需求表

use mrp_core::{Cell, MaterialRow, MaterialsTable, Order, OrdersTable};
use serde_json::Value;

use crate::error::{IngestError, Result};
use crate::mapping::ColumnMapping;
use crate::sheet::RawSheet;

/// 轉換訂單工作表
///
/// 訂單號空白的列略過；對應欄以外的非空白欄位原樣放入 `extra`，
/// 但與保留欄位（如 `client`）同名的欄位略過。
pub fn orders_from_sheet(sheet: &RawSheet, mapping: &ColumnMapping) -> Result<OrdersTable> {
    let number_col = sheet
        .column(&mapping.order_number)
        .ok_or_else(|| IngestError::MissingColumn(mapping.order_number.clone()))?;
    let client_col = sheet.column(&mapping.client);
    let status_col = sheet.column(&mapping.status);
    let cost_col = sheet.column(&mapping.cost);
    let area_col = sheet.column(&mapping.area);

    let mapped = [Some(number_col), client_col, status_col, cost_col, area_col];

    for header in sheet.headers.iter().filter(|h| Order::is_reserved_field(h)) {
        if !mapped.contains(&sheet.column(header)) {
            tracing::warn!("訂單表欄位「{}」與保留欄位同名，已略過", header);
        }
    }

    let mut orders = Vec::with_capacity(sheet.rows.len());
    for row_idx in 0..sheet.rows.len() {
        let Some(number) = sheet.cell(row_idx, number_col).as_label() else {
            continue;
        };

        let label = |col: Option<usize>| col.and_then(|c| sheet.cell(row_idx, c).as_label());
        let quantity = |col: Option<usize>| col.and_then(|c| sheet.cell(row_idx, c).quantity());

        let mut order = Order::new(number);
        order.client = label(client_col);
        order.status = label(status_col);
        order.cost = quantity(cost_col);
        order.area = quantity(area_col);

        for (col, header) in sheet.headers.iter().enumerate() {
            if header.is_empty() || mapped.contains(&Some(col)) || Order::is_reserved_field(header) {
                continue;
            }
            if let Some(value) = to_json(sheet.cell(row_idx, col)) {
                order.extra.insert(header.clone(), value);
            }
        }

        orders.push(order);
    }

    tracing::info!("載入訂單 {} 筆", orders.len());
    Ok(OrdersTable::new(orders))
}

/// 轉換物料需求工作表
///
/// 物料欄與庫存欄以外、標題非空白的欄位都視為訂單需求欄。
/// 缺少庫存欄不算錯誤，由計算層以警告回報。
pub fn materials_from_sheet(sheet: &RawSheet, mapping: &ColumnMapping) -> Result<MaterialsTable> {
    let material_col = sheet
        .column(&mapping.material)
        .ok_or_else(|| IngestError::MissingColumn(mapping.material.clone()))?;
    let stock_col = sheet.column(&mapping.on_hand);

    let order_cols: Vec<usize> = sheet
        .headers
        .iter()
        .enumerate()
        .filter(|(col, header)| *col != material_col && Some(*col) != stock_col && !header.is_empty())
        .map(|(col, _)| col)
        .collect();

    let mut table = MaterialsTable::new(order_cols.iter().map(|&col| sheet.headers[col].clone()))
        .with_stock_column(stock_col.is_some());

    for (row_idx, cells) in sheet.rows.iter().enumerate() {
        let mut row = match sheet.cell(row_idx, material_col).as_label() {
            Some(material) => MaterialRow::new(material),
            None => MaterialRow::blank(),
        };
        if let Some(col) = stock_col {
            row = row.with_on_hand(sheet.cell(row_idx, col).clone());
        }
        row = row.with_requirements(
            order_cols
                .iter()
                .map(|&col| cells.get(col).cloned().unwrap_or_default()),
        );
        table.push_row(row);
    }

    if stock_col.is_none() {
        tracing::warn!("物料表缺少「{}」欄", mapping.on_hand);
    }
    tracing::info!(
        "載入物料 {} 列，訂單需求欄 {} 個",
        table.len(),
        table.order_columns.len()
    );
    Ok(table)
}

/// 儲存格 → JSON 值（空白為 `None`）
fn to_json(cell: &Cell) -> Option<Value> {
    match cell {
        Cell::Empty => None,
        Cell::Number(value) => value
            .normalize()
            .to_string()
            .parse::<serde_json::Number>()
            .ok()
            .map(Value::Number),
        Cell::Text(text) => Some(Value::String(text.trim().to_string())),
    }
}
