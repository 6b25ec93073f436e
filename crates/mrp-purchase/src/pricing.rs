//! 物料單價估算

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 單價估算介面
pub trait PriceEstimator {
    /// 估算物料單價
    fn unit_price(&self, material: &str) -> Decimal;
}

/// 關鍵字價格規則
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRule {
    /// 關鍵字（小寫比對，命中任一即適用）
    pub keywords: Vec<String>,

    /// 單價
    pub unit_price: Decimal,
}

impl PriceRule {
    pub fn new<I, S>(keywords: I, unit_price: Decimal) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
            unit_price,
        }
    }

    /// 物料名稱是否包含任一關鍵字
    pub fn matches(&self, material: &str) -> bool {
        let material = material.to_lowercase();
        self.keywords.iter().any(|k| material.contains(k.as_str()))
    }
}

/// 依關鍵字估價的價格表
///
/// 規則依順序比對，第一條命中者為準，都不命中時使用預設單價。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordPriceTable {
    pub rules: Vec<PriceRule>,
    pub default_price: Decimal,
}

impl KeywordPriceTable {
    /// 創建沒有規則的價格表
    pub fn new(default_price: Decimal) -> Self {
        Self {
            rules: Vec::new(),
            default_price,
        }
    }

    /// 玻璃窗生產常用物料的標準價格表
    pub fn standard(default_price: Decimal) -> Self {
        Self::new(default_price)
            .with_rule(PriceRule::new(["стекло", "glass"], Decimal::from(1500)))
            .with_rule(PriceRule::new(["профиль", "profile"], Decimal::from(800)))
            .with_rule(PriceRule::new(["аргон", "argon"], Decimal::from(200)))
            .with_rule(PriceRule::new(["герметик", "sealant"], Decimal::from(1500)))
            .with_rule(PriceRule::new(["лента", "tape"], Decimal::from(300)))
            .with_rule(PriceRule::new(["соединитель", "connector"], Decimal::from(500)))
    }

    /// 建構器模式：添加規則
    pub fn with_rule(mut self, rule: PriceRule) -> Self {
        self.rules.push(rule);
        self
    }
}

impl Default for KeywordPriceTable {
    fn default() -> Self {
        Self::standard(Decimal::from(1000))
    }
}

impl PriceEstimator for KeywordPriceTable {
    fn unit_price(&self, material: &str) -> Decimal {
        self.rules
            .iter()
            .find(|rule| rule.matches(material))
            .map(|rule| rule.unit_price)
            .unwrap_or(self.default_price)
    }
}
