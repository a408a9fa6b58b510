//! Data sources that are not user uploads.
//!
//! - synthetic daily sales (`sample`)

pub mod sample;

pub use sample::*;
