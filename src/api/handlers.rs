use crate::api::AppState;
use crate::error::AppError;
use crate::models::{BulkInsertOutcome, CartItem, ParseResponse, Product, UserId};
use crate::service::BulkItem;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Json, Path, Query, State,
    },
    http::StatusCode,
};
use serde::Deserialize;

/// 请求体: 购物清单文本
#[derive(Debug, Deserialize)]
pub struct ParseShoppingListRequest {
    pub text: String,
    pub user_id: UserId,
}

/// 请求体: 批量加购
#[derive(Debug, Deserialize)]
pub struct BulkAddRequest {
    pub user_id: UserId,
    pub products: Vec<BulkItem>,
}

/// 请求体: 单个加购（字段名沿用原购物车接口）
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub user: UserId,
    pub product: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub user_id: UserId,
}

fn bad_json(rejection: JsonRejection) -> AppError {
    AppError::InvalidRequest(format!("Invalid request body: {}", rejection.body_text()))
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 购物清单解析
pub async fn parse_shopping_list(
    State(state): State<AppState>,
    payload: Result<Json<ParseShoppingListRequest>, JsonRejection>,
) -> Result<Json<ParseResponse>, AppError> {
    let Json(req) = payload.map_err(bad_json)?;
    tracing::info!("解析购物清单 user={} ({} 字节)", req.user_id, req.text.len());
    let response = state.shopping_list.parse(&req.text).await?;
    Ok(Json(response))
}

/// 批量加购
pub async fn bulk_add_to_cart(
    State(state): State<AppState>,
    payload: Result<Json<BulkAddRequest>, JsonRejection>,
) -> Result<Json<BulkInsertOutcome>, AppError> {
    let Json(req) = payload.map_err(bad_json)?;
    if req.products.is_empty() {
        return Err(AppError::InvalidRequest(
            "Please select at least one product to add".to_string(),
        ));
    }
    if req.products.len() > state.max_bulk_items {
        return Err(AppError::InvalidRequest(format!(
            "Too many products: {} (max {})",
            req.products.len(),
            state.max_bulk_items
        )));
    }

    let outcome = state.bulk_inserter.insert_all(req.user_id, &req.products).await;
    Ok(Json(outcome))
}

/// 商品列表
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    let products = state.products.list_products().await?;
    Ok(Json(products))
}

/// 商品详情
pub async fn get_product(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Product>, AppError> {
    let Path(product_id) = id.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    state
        .products
        .get_product(product_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// 单个加购
pub async fn add_to_cart(
    State(state): State<AppState>,
    payload: Result<Json<AddToCartRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CartItem>), AppError> {
    let Json(req) = payload.map_err(bad_json)?;
    let item = state
        .carts
        .add_item(req.user, req.product, req.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// 用户购物车
pub async fn list_cart(
    State(state): State<AppState>,
    query: Result<Query<CartQuery>, QueryRejection>,
) -> Result<Json<Vec<CartItem>>, AppError> {
    let Query(q) = query.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    let items = state.carts.list_items(q.user_id).await?;
    Ok(Json(items))
}

/// 删除购物车行
pub async fn remove_from_cart(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(cart_id) = id.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    if state.carts.remove_item(cart_id).await? {
        tracing::info!("删除购物车行 cart_id={}", cart_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Cart item not found".to_string()))
    }
}
