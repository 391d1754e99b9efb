mod claims;
mod csrf;
mod issuer;
mod salt;
mod token;

pub use claims::*;
pub use csrf::*;
pub use issuer::*;
pub use salt::*;
pub use token::*;
