use super::{check_stock, CartStore, ProductSource};
use crate::error::{CartInsertError, StoreError};
use crate::models::{CartItem, Product, UserId};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::RwLock;

/// 内存存储：本地调试与测试使用
#[derive(Debug)]
pub struct InMemoryStore {
    products: RwLock<Vec<Product>>,
    users: RwLock<Option<HashSet<i64>>>,
    carts: DashMap<i64, Vec<CartItem>>,
    next_cart_id: AtomicI64,
    offline: AtomicBool,
}

impl InMemoryStore {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products),
            users: RwLock::new(None),
            carts: DashMap::new(),
            next_cart_id: AtomicI64::new(1),
            offline: AtomicBool::new(false),
        }
    }

    /// 限定已注册用户；未调用时接受任意用户
    pub fn with_users(self, users: impl IntoIterator<Item = i64>) -> Self {
        if let Ok(mut guard) = self.users.write() {
            *guard = Some(users.into_iter().collect());
        }
        self
    }

    pub fn replace_products(&self, products: Vec<Product>) {
        if let Ok(mut guard) = self.products.write() {
            *guard = products;
        }
    }

    /// 模拟商品源不可达
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("product source offline".to_string()));
        }
        Ok(())
    }

    fn user_exists(&self, user_id: i64) -> bool {
        match self.users.read() {
            Ok(guard) => guard.as_ref().map_or(true, |users| users.contains(&user_id)),
            Err(_) => false,
        }
    }

    fn find_product(&self, product_id: i64) -> Result<Option<Product>, StoreError> {
        let guard = self
            .products
            .read()
            .map_err(|_| StoreError::Unavailable("product table poisoned".to_string()))?;
        Ok(guard.iter().find(|p| p.product_id == product_id).cloned())
    }
}

#[async_trait]
impl ProductSource for InMemoryStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        self.ensure_online()?;
        let guard = self
            .products
            .read()
            .map_err(|_| StoreError::Unavailable("product table poisoned".to_string()))?;
        Ok(guard.clone())
    }

    async fn get_product(&self, product_id: i64) -> Result<Option<Product>, StoreError> {
        self.ensure_online()?;
        self.find_product(product_id)
    }
}

#[async_trait]
impl CartStore for InMemoryStore {
    async fn add_item(
        &self,
        user_id: UserId,
        product_id: i64,
        quantity: i64,
    ) -> Result<CartItem, CartInsertError> {
        if quantity < 1 {
            return Err(CartInsertError::InvalidQuantity);
        }
        let product = self
            .find_product(product_id)?
            .ok_or(CartInsertError::ProductNotFound)?;
        check_stock(&product, quantity)?;
        if !self.user_exists(user_id.get()) {
            return Err(CartInsertError::UserNotFound);
        }

        let item = CartItem {
            cart_id: self.next_cart_id.fetch_add(1, Ordering::SeqCst),
            user: user_id.get(),
            product: product_id,
            quantity,
            added_at: Some(Utc::now()),
        };
        self.carts
            .entry(user_id.get())
            .or_default()
            .push(item.clone());
        Ok(item)
    }

    async fn list_items(&self, user_id: UserId) -> Result<Vec<CartItem>, StoreError> {
        Ok(self
            .carts
            .get(&user_id.get())
            .map(|items| items.value().clone())
            .unwrap_or_default())
    }

    async fn remove_item(&self, cart_id: i64) -> Result<bool, StoreError> {
        for mut entry in self.carts.iter_mut() {
            let items = entry.value_mut();
            if let Some(pos) = items.iter().position(|c| c.cart_id == cart_id) {
                items.remove(pos);
                return Ok(true);
            }
        }
        Ok(false)
    }
}
