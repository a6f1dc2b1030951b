pub mod aggregator;
pub mod bulk_insert;
pub mod catalog_cache;
pub mod catalog_index;
pub mod matcher;
pub mod shopping_list;
pub mod tokenizer;

pub use bulk_insert::{BulkInserter, BulkItem};
pub use catalog_cache::CatalogCache;
pub use catalog_index::CatalogIndex;
pub use matcher::{ItemOutcome, Matcher};
pub use shopping_list::ShoppingListService;
