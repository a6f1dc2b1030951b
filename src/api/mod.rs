pub mod handlers;

use crate::config::AppConfig;
use crate::service::{BulkInserter, ShoppingListService};
use crate::store::{CartStore, ProductSource};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower::limit::GlobalConcurrencyLimitLayer;

pub use handlers::*;

/// 共享状态
#[derive(Clone)]
pub struct AppState {
    pub shopping_list: Arc<ShoppingListService>,
    pub bulk_inserter: Arc<BulkInserter>,
    pub products: Arc<dyn ProductSource>,
    pub carts: Arc<dyn CartStore>,
    pub max_bulk_items: usize,
}

impl AppState {
    pub fn new(
        products: Arc<dyn ProductSource>,
        carts: Arc<dyn CartStore>,
        config: &AppConfig,
    ) -> Self {
        Self {
            shopping_list: Arc::new(ShoppingListService::new(products.clone(), &config.matcher)),
            bulk_inserter: Arc::new(BulkInserter::new(carts.clone(), config.cart.insert_concurrency)),
            products,
            carts,
            max_bulk_items: config.cart.max_bulk_items,
        }
    }
}

/// 构建路由
///
/// 并发上限对整个服务生效：Router::layer 会为每个路由各包一层，
/// 所以用共享信号量的 GlobalConcurrencyLimitLayer。
pub fn build_router(state: AppState, max_concurrency: usize) -> Router {
    // 清单匹配
    let shopping_list_routes = Router::new()
        .route("/parse-shopping-list/", post(handlers::parse_shopping_list))
        .route("/bulk-add-to-cart/", post(handlers::bulk_add_to_cart));

    // 商品与购物车
    let catalog_routes = Router::new()
        .route("/products/", get(handlers::list_products))
        .route("/products/:id/", get(handlers::get_product))
        .route("/cart/", get(handlers::list_cart).post(handlers::add_to_cart))
        .route("/cart/:id/", delete(handlers::remove_from_cart));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", shopping_list_routes.merge(catalog_routes))
        .with_state(state)
        .layer(GlobalConcurrencyLimitLayer::new(max_concurrency.max(1)))
}
