pub mod pg_store;
pub mod pool;
pub mod queries;

pub use pg_store::PgStore;
pub use pool::create_pool;
