//! 請購單文字輸出

use mrp_core::{ReservationError, Result};
use rust_decimal::Decimal;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::requisition::PurchaseRequisition;

const RULE_WIDTH: usize = 50;

impl PurchaseRequisition {
    /// 輸出純文字請購單
    pub fn render(&self) -> String {
        let mut text = String::new();
        let _ = writeln!(text, "ЗАЯВКА НА ЗАКУПКУ МАТЕРИАЛОВ");
        let _ = writeln!(text, "{}", "=".repeat(RULE_WIDTH));
        let _ = writeln!(
            text,
            "Дата формирования: {}",
            self.created_at.format("%d.%m.%Y %H:%M")
        );
        let _ = writeln!(text, "Для заказов: {}", self.orders.join(", "));
        let _ = writeln!(text);
        let _ = writeln!(text, "СПИСОК МАТЕРИАЛОВ ДЛЯ ЗАКУПКИ:");
        let _ = writeln!(text, "{}", "-".repeat(RULE_WIDTH));

        for line in &self.lines {
            let _ = writeln!(text, "{}", line.material);
            let _ = writeln!(text, "   Количество: {}", format_quantity(line.quantity));
            let _ = writeln!(
                text,
                "   Примерная стоимость: {} {}",
                format_amount(line.line_cost),
                self.currency
            );
            let _ = writeln!(text);
        }

        let _ = writeln!(
            text,
            "ОБЩАЯ ПРИМЕРНАЯ СТОИМОСТЬ: {} {}",
            format_amount(self.total_cost),
            self.currency
        );
        text
    }

    /// 請購單檔名（依建立時間）
    pub fn file_name(&self) -> String {
        format!(
            "purchase_requisition_{}.txt",
            self.created_at.format("%Y%m%d_%H%M")
        )
    }

    /// 寫入目錄，回傳檔案路徑
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(self.file_name());
        std::fs::write(&path, self.render()).map_err(|e| {
            tracing::warn!("無法寫入請購單 {}: {}", path.display(), e);
            ReservationError::Persistence(format!("{}: {}", path.display(), e))
        })?;
        tracing::info!("請購單已寫入 {}", path.display());
        Ok(path)
    }
}

/// 數量固定兩位小數
pub fn format_quantity(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

/// 金額兩位小數並加千分位
pub fn format_amount(value: Decimal) -> String {
    let fixed = format_quantity(value);
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}.{}", sign, grouped, frac_part)
}
