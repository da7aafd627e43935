//! Database operations.

pub mod results;
