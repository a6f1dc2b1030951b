pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

pub use api::{build_router, AppState};
pub use config::AppConfig;
pub use db::{create_pool, PgStore};
pub use error::{AppError, CartInsertError, StoreError};
pub use service::{BulkInserter, Matcher, ShoppingListService};
pub use store::{CartStore, InMemoryStore, ProductSource};
