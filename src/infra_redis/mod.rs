mod access_token_store_redis;
mod refresh_token_store_redis;

pub use access_token_store_redis::*;
pub use refresh_token_store_redis::*;
