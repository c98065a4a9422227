pub mod encode;
pub mod packed;
pub mod symmetry;

pub use encode::*;
pub use packed::*;
pub use symmetry::*;
