//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - summary export (JSON) (`export`)
//! - upload template (`template`)

pub mod export;
pub mod ingest;
pub mod template;

pub use export::*;
pub use ingest::*;
pub use template::*;
