// crates/core/src/lib.rs
pub mod intent;
pub mod result;

pub use intent::*;
pub use result::*;
