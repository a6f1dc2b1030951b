use crate::db::queries;
use crate::error::{CartInsertError, StoreError};
use crate::models::{CartItem, Product, UserId};
use crate::store::{check_stock, CartStore, ProductSource};
use async_trait::async_trait;
use sqlx::error::ErrorKind;
use sqlx::PgPool;

/// PostgreSQL 存储实现
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductSource for PgStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let start = std::time::Instant::now();
        let products = queries::list_products(&self.pool).await?;
        tracing::debug!("加载商品 {} 条, 耗时: {:?}", products.len(), start.elapsed());
        Ok(products)
    }

    async fn get_product(&self, product_id: i64) -> Result<Option<Product>, StoreError> {
        Ok(queries::get_product(&self.pool, product_id).await?)
    }
}

#[async_trait]
impl CartStore for PgStore {
    async fn add_item(
        &self,
        user_id: UserId,
        product_id: i64,
        quantity: i64,
    ) -> Result<CartItem, CartInsertError> {
        if quantity < 1 {
            return Err(CartInsertError::InvalidQuantity);
        }
        let product = queries::get_product(&self.pool, product_id)
            .await
            .map_err(StoreError::from)?
            .ok_or(CartInsertError::ProductNotFound)?;
        check_stock(&product, quantity)?;

        queries::insert_cart_item(&self.pool, user_id.get(), product_id, quantity)
            .await
            .map_err(|e| match e.as_database_error().map(|d| d.kind()) {
                Some(ErrorKind::ForeignKeyViolation) => CartInsertError::UserNotFound,
                _ => {
                    tracing::error!("✗ 购物车写入失败 user={} product={}: {:?}", user_id, product_id, e);
                    CartInsertError::from(StoreError::from(e))
                }
            })
    }

    async fn list_items(&self, user_id: UserId) -> Result<Vec<CartItem>, StoreError> {
        Ok(queries::list_cart_items(&self.pool, user_id.get()).await?)
    }

    async fn remove_item(&self, cart_id: i64) -> Result<bool, StoreError> {
        Ok(queries::delete_cart_item(&self.pool, cart_id).await? > 0)
    }
}
