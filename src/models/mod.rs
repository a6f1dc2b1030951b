pub mod cart;
pub mod product;
pub mod shopping_list;
pub mod user;

pub use cart::{BulkInsertFailure, BulkInsertOutcome, CartItem};
pub use product::Product;
pub use shopping_list::{MatchResult, ParseResponse, ParsedItem, Unit};
pub use user::UserId;
