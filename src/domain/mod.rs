//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - sales records and the per-request ledger (`SalesRecord`, `SalesLedger`)
//! - ingest conventions (`RevenuePolicy`)
//! - aggregation outputs (`Bucket`, `BucketKey`, `Bucketing`)

pub mod types;

pub use types::*;
