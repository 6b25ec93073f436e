//! 訂單 → 物料需求解析

use mrp_core::{add_quantity, MaterialId, MaterialsTable, OrderId};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// 單一訂單的物料需求
pub type OrderMaterials = BTreeMap<MaterialId, Decimal>;

/// 訂單欄位匹配規則
///
/// 欄位標題（去除空白）與訂單號完全相同，或以空白分隔的其中一個詞等於訂單號。
/// 合併標題如 `"101 102"` 同時屬於訂單 101 與 102。
pub fn column_matches(label: &str, order_id: &str) -> bool {
    let label = label.trim();
    let order_id = order_id.trim();
    if order_id.is_empty() {
        return false;
    }
    label == order_id || label.split_whitespace().any(|token| token == order_id)
}

/// 訂單物料解析器
pub struct OrderMaterialResolver;

impl OrderMaterialResolver {
    /// 找出屬於某訂單的所有需求欄索引
    pub fn matching_columns(order_id: &str, table: &MaterialsTable) -> Vec<usize> {
        table
            .order_columns
            .iter()
            .enumerate()
            .filter(|(_, label)| column_matches(label, order_id))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// 解析單一訂單的物料需求
    ///
    /// 同一物料在所有匹配欄位的數值加總；非數值或空白儲存格貢獻 0。
    /// 只保留加總大於 0 的物料。沒有匹配欄位時回傳空結果。
    pub fn resolve_order(order_id: &str, table: &MaterialsTable) -> OrderMaterials {
        let columns = Self::matching_columns(order_id, table);
        let mut materials = OrderMaterials::new();

        if columns.is_empty() {
            tracing::debug!("訂單 {} 在物料表中沒有對應欄位", order_id.trim());
            return materials;
        }

        for (row_idx, material) in table.materials() {
            let row = &table.rows[row_idx];
            let total = columns.iter().fold(Decimal::ZERO, |acc, &col| {
                add_quantity(acc, row.requirement(col).quantity_or_zero(), material)
            });

            if total > Decimal::ZERO {
                let entry = materials.entry(material.to_string()).or_insert(Decimal::ZERO);
                *entry = add_quantity(*entry, total, material);
            }
        }

        tracing::debug!(
            "訂單 {}: 匹配欄位 {} 個, 物料 {} 種",
            order_id.trim(),
            columns.len(),
            materials.len()
        );
        materials
    }

    /// 解析多筆訂單的物料需求
    ///
    /// 沒有任何正需求的訂單不會出現在結果中，呼叫端應視為「無需求」而非「無效訂單」。
    pub fn resolve<'a, I>(order_ids: I, table: &MaterialsTable) -> BTreeMap<OrderId, OrderMaterials>
    where
        I: IntoIterator<Item = &'a str>,
    {
        order_ids
            .into_iter()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .filter_map(|id| {
                let materials = Self::resolve_order(id, table);
                (!materials.is_empty()).then(|| (id.to_string(), materials))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrp_core::{Cell, MaterialRow};
    use rstest::rstest;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    fn sample_table() -> MaterialsTable {
        MaterialsTable::new(["101", "101 102", "103", " 104 "])
            .with_row(MaterialRow::new("Glass").with_requirements([
                Cell::number(dec(4)),
                Cell::number(dec(2)),
                Cell::Empty,
                Cell::number(dec(1)),
            ]))
            .with_row(MaterialRow::blank().with_requirements([
                Cell::number(dec(100)),
                Cell::Empty,
                Cell::Empty,
                Cell::Empty,
            ]))
            .with_row(MaterialRow::new("Argon").with_requirements([
                Cell::text("x"),
                Cell::text("3"),
                Cell::number(dec(0)),
                Cell::Empty,
            ]))
            .with_row(MaterialRow::new("Tape").with_requirements([
                Cell::number(dec(-5)),
                Cell::number(dec(2)),
                Cell::number(dec(7)),
            ]))
    }

    #[rstest]
    #[case("101", "101", true)]
    #[case("101 102", "101", true)]
    #[case("101 102", "102", true)]
    #[case(" 101 ", "101", true)]
    #[case("1010", "101", false)]
    #[case("101-102", "101", false)]
    #[case("101", "", false)]
    fn test_column_matches(#[case] label: &str, #[case] order_id: &str, #[case] expected: bool) {
        assert_eq!(column_matches(label, order_id), expected);
    }

    #[test]
    fn test_composite_column_contributes() {
        let table = sample_table();
        let materials = OrderMaterialResolver::resolve_order("102", &table);

        assert_eq!(materials.get("Glass"), Some(&dec(2)));
        assert_eq!(materials.get("Argon"), Some(&dec(3)));
        assert_eq!(materials.get("Tape"), Some(&dec(2)));
    }

    #[test]
    fn test_sum_across_matching_columns() {
        let table = sample_table();
        let materials = OrderMaterialResolver::resolve_order("101", &table);

        // Glass: 4 + 2
        assert_eq!(materials.get("Glass"), Some(&dec(6)));
        // Argon: 非數值 "x" 視為 0，加上合併欄的 3
        assert_eq!(materials.get("Argon"), Some(&dec(3)));
        // Tape: -5 + 2 = -3，非正數不列入
        assert!(!materials.contains_key("Tape"));
        assert_eq!(materials.len(), 2);
    }

    #[test]
    fn test_blank_material_row_ignored_without_shifting() {
        let table = sample_table();
        let materials = OrderMaterialResolver::resolve_order("101", &table);
        assert!(materials.values().all(|q| *q < dec(100)));
    }

    #[test]
    fn test_zero_requirement_dropped() {
        let table = sample_table();
        let materials = OrderMaterialResolver::resolve_order("103", &table);
        assert_eq!(materials.len(), 1);
        assert_eq!(materials.get("Tape"), Some(&dec(7)));
    }

    #[test]
    fn test_trimmed_column_label() {
        let table = sample_table();
        let materials = OrderMaterialResolver::resolve_order("104", &table);
        assert_eq!(materials.get("Glass"), Some(&dec(1)));
    }

    #[test]
    fn test_resolve_many_skips_unmatched() {
        let table = sample_table();
        let resolved = OrderMaterialResolver::resolve(["101", "999", "103"], &table);

        assert_eq!(resolved.len(), 2);
        assert!(resolved.contains_key("101"));
        assert!(resolved.contains_key("103"));
        assert!(!resolved.contains_key("999"));
    }

    #[test]
    fn test_overflowing_cells_do_not_abort() {
        let huge = Decimal::from_scientific("5e28").unwrap();
        let table = MaterialsTable::new(["101", "101 102"]).with_row(
            MaterialRow::new("Glass").with_requirements([Cell::text("5e28"), Cell::text("5e28")]),
        );

        let materials = OrderMaterialResolver::resolve_order("101", &table);
        assert_eq!(materials["Glass"], huge);
    }
}
