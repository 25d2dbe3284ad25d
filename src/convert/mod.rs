//! Conversion invoker: runs one entry through the backend for its media kind.

mod error;
mod invoker;

pub use error::ConversionError;
pub use invoker::{directory_size, ConversionSuccess, Invoker};
