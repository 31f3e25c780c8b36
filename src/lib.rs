pub mod api;
pub mod blockchain;
pub mod codec;
pub mod config;
pub mod consensus;
pub mod error;
pub mod transaction;
pub mod wallet;

pub use error::{LedgerError, LedgerResult};
