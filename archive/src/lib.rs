pub mod board;
pub mod cursor;
pub mod error;
pub mod framing;
pub mod reader;
pub mod record;
pub mod writer;

pub use board::*;
pub use cursor::*;
pub use error::*;
pub use framing::*;
pub use reader::*;
pub use record::*;
pub use writer::*;
