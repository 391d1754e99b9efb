mod codec_hs256;

pub use codec_hs256::*;
