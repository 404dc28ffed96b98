//! Core conversion abstractions and session state

pub mod config;
pub mod converter;
pub mod currency;
pub mod error;
pub mod log;
pub mod session;

// Re-export main types for cleaner imports
pub use converter::{Converter, Outcome};
pub use currency::{Amount, Conversion, ConversionProvider, CurrencyCode, CurrencyPair};
pub use error::ConversionError;
