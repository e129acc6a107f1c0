//! Launches or attaches to a devnet node and exposes the wait operations
//! scenario tests are built from.
pub mod handle;
pub mod source;

pub use handle::*;
pub use source::*;
