pub mod bits;
pub mod constants;
pub mod env;

pub use bits::*;
pub use constants::*;
pub use env::*;
