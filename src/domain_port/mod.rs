mod token_codec;
mod token_store;

pub use token_codec::*;
pub use token_store::*;
