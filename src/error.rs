use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// 存储层错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// 单个商品加入购物车失败的原因，Display 文本即返回给前端的 reason
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartInsertError {
    #[error("Product not found")]
    ProductNotFound,
    #[error("Insufficient stock. Only {available} items available.")]
    InsufficientStock { available: i64 },
    #[error("Quantity must be at least 1")]
    InvalidQuantity,
    #[error("User not found")]
    UserNotFound,
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for CartInsertError {
    fn from(e: StoreError) -> Self {
        CartInsertError::Storage(e.to_string())
    }
}

/// 请求级错误
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::CatalogUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 调用方是否可以重试
    pub fn retryable(&self) -> bool {
        matches!(self, AppError::CatalogUnavailable(_))
    }
}

impl From<CartInsertError> for AppError {
    fn from(e: CartInsertError) -> Self {
        match e {
            CartInsertError::ProductNotFound | CartInsertError::UserNotFound => {
                AppError::NotFound(e.to_string())
            }
            CartInsertError::Storage(msg) => {
                AppError::Storage(StoreError::Unavailable(msg))
            }
            other => AppError::InvalidRequest(other.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    retryable: bool,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::warn!("request rejected: {}", self);
        }
        let body = ErrorBody {
            error: self.to_string(),
            retryable: self.retryable(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_errors_render_original_messages() {
        assert_eq!(
            CartInsertError::InsufficientStock { available: 3 }.to_string(),
            "Insufficient stock. Only 3 items available."
        );
        assert_eq!(CartInsertError::ProductNotFound.to_string(), "Product not found");
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            AppError::CatalogUnavailable("down".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert!(AppError::CatalogUnavailable("down".into()).retryable());
        assert!(!AppError::InvalidRequest("bad".into()).retryable());
        let e: AppError = CartInsertError::ProductNotFound.into();
        assert_eq!(e.status(), StatusCode::NOT_FOUND);
        let e: AppError = CartInsertError::InsufficientStock { available: 0 }.into();
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
    }
}
