//! Utility functions and types for the wallet batch tooling.

pub mod error;
pub mod fs;
pub mod logging;

pub use error::{Error, Result};
pub use logging::{init_logging, RunLogger};
