use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 商品表 (products)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub product_id: i64,
    pub product_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: BigDecimal,
    pub stock_quantity: Option<i64>,
    pub unit: Option<String>,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl Product {
    /// 可用库存，未登记库存按 0 处理
    pub fn available_stock(&self) -> i64 {
        self.stock_quantity.unwrap_or(0).max(0)
    }
}
