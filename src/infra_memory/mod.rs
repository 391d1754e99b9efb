mod access_token_store_memory;
mod refresh_token_store_memory;

pub use access_token_store_memory::*;
pub use refresh_token_store_memory::*;
