use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 清单中可识别的数量单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "ml")]
    Millilitre,
    #[serde(rename = "L")]
    Litre,
    #[serde(rename = "pcs")]
    Piece,
    #[serde(rename = "dozen")]
    Dozen,
}

impl Unit {
    /// 识别单位写法（已小写）
    pub fn parse(token: &str) -> Option<Self> {
        let unit = match token {
            "g" | "gm" | "gms" | "gram" | "grams" | "gr" => Unit::Gram,
            "kg" | "kgs" | "kilo" | "kilos" | "kilogram" | "kilograms" => Unit::Kilogram,
            "ml" | "mls" | "millilitre" | "millilitres" | "milliliter" | "milliliters" => {
                Unit::Millilitre
            }
            "l" | "ltr" | "ltrs" | "litre" | "litres" | "liter" | "liters" => Unit::Litre,
            "pc" | "pcs" | "piece" | "pieces" => Unit::Piece,
            "dozen" | "doz" => Unit::Dozen,
            _ => return None,
        };
        Some(unit)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
            Unit::Millilitre => "ml",
            Unit::Litre => "L",
            Unit::Piece => "pcs",
            Unit::Dozen => "dozen",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 从一行清单解析出的商品需求
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedItem {
    /// 原始行（已去除首尾空白），用于回显
    pub original: String,
    /// 去掉数量与单位后的规范化名称
    pub normalized: String,
    pub tokens: Vec<String>,
    pub quantity: Option<f64>,
    pub unit: Option<Unit>,
}

impl ParsedItem {
    pub fn has_name(&self) -> bool {
        !self.tokens.is_empty()
    }
}

/// 单条匹配结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub product_id: i64,
    pub product_name: String,
    pub matched_text: String,
    pub confidence: u8,
    pub price: BigDecimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
}

/// 清单解析响应
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseResponse {
    pub matched_products: Vec<MatchResult>,
    pub unmatched_items: Vec<String>,
    pub matched_count: usize,
}

impl ParseResponse {
    pub fn empty() -> Self {
        Self::default()
    }
}
