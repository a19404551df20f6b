//! Result cache shared by request interpretation and ranking.

mod keys;
mod store;

pub use keys::{digest, match_key, route_key};
pub use store::{CacheConfig, CacheStats, ResultCache};
