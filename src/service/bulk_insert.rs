use crate::models::{BulkInsertFailure, BulkInsertOutcome, UserId};
use crate::store::CartStore;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 待加购商品
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItem {
    pub product_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

/// 批量加购服务：逐项独立插入，单项失败不影响其他项
pub struct BulkInserter {
    carts: Arc<dyn CartStore>,
    concurrency: usize,
}

impl BulkInserter {
    pub fn new(carts: Arc<dyn CartStore>, concurrency: usize) -> Self {
        Self {
            carts,
            concurrency: concurrency.max(1),
        }
    }

    /// 并发插入，结果按提交顺序汇总
    pub async fn insert_all(&self, user_id: UserId, items: &[BulkItem]) -> BulkInsertOutcome {
        let results: Vec<_> = stream::iter(items.iter().copied())
            .map(|item| {
                let carts = self.carts.clone();
                async move {
                    let res = carts.add_item(user_id, item.product_id, item.quantity).await;
                    (item, res)
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut success_count = 0;
        let mut failures = Vec::new();
        for (item, res) in results {
            match res {
                Ok(line) => {
                    success_count += 1;
                    tracing::debug!("✓ 加购成功 user={} product={} cart_id={}", user_id, item.product_id, line.cart_id);
                }
                Err(e) => {
                    tracing::warn!("✗ 加购失败 user={} product={}: {}", user_id, item.product_id, e);
                    failures.push(BulkInsertFailure {
                        product_id: item.product_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "批量加购完成 user={}: 成功 {}, 失败 {}",
            user_id,
            success_count,
            failures.len()
        );

        BulkInsertOutcome {
            message: format!("Successfully added {} items to cart", success_count),
            success_count,
            failures,
        }
    }
}
