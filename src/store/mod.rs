pub mod memory;

use crate::error::{CartInsertError, StoreError};
use crate::models::{CartItem, Product, UserId};
use async_trait::async_trait;

pub use memory::InMemoryStore;

/// 商品来源：用于构建匹配索引和商品查询
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    async fn get_product(&self, product_id: i64) -> Result<Option<Product>, StoreError>;
}

/// 购物车写入与查询
#[async_trait]
pub trait CartStore: Send + Sync {
    /// 新增一行购物车记录，相同商品重复加入不会合并
    async fn add_item(
        &self,
        user_id: UserId,
        product_id: i64,
        quantity: i64,
    ) -> Result<CartItem, CartInsertError>;

    async fn list_items(&self, user_id: UserId) -> Result<Vec<CartItem>, StoreError>;

    /// 删除一行购物车记录，返回是否存在
    async fn remove_item(&self, cart_id: i64) -> Result<bool, StoreError>;
}

/// 加购前的库存校验，与原有 /cart/ 接口规则一致
pub fn check_stock(product: &Product, quantity: i64) -> Result<(), CartInsertError> {
    if quantity < 1 {
        return Err(CartInsertError::InvalidQuantity);
    }
    // 库存为 0 时同样返回 "Only 0 items available."
    let available = product.available_stock();
    if available < quantity {
        return Err(CartInsertError::InsufficientStock { available });
    }
    Ok(())
}
