pub mod auth;
pub mod error;
pub mod favorites;
pub mod store;
pub mod sync;
pub mod types;

pub use favorites::{FavoriteService, FavoriteServiceOptions};
pub use sync::types::SyncOutcome;
