use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 购物车行 (cart)，字段名与前端约定一致
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CartItem {
    pub cart_id: i64,
    #[sqlx(rename = "user_id")]
    pub user: i64,
    #[sqlx(rename = "product_id")]
    pub product: i64,
    pub quantity: i64,
    pub added_at: Option<DateTime<Utc>>,
}

/// 批量加购中单个商品的失败原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkInsertFailure {
    pub product_id: i64,
    pub reason: String,
}

/// 批量加购结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkInsertOutcome {
    pub success_count: usize,
    pub failures: Vec<BulkInsertFailure>,
    pub message: String,
}
