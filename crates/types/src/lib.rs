//! Contains a common set of types used across all of the `pox` crates.
//!
//! This module implements a single location where these types are managed,
//! making them easy to reference and maintain.
pub mod account;
pub mod block;
pub mod config;
pub mod event;
pub mod pox;
pub mod transaction;

pub use account::*;
pub use block::*;
pub use config::*;
pub use event::*;
pub use pox::*;
pub use transaction::*;
