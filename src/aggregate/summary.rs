//! A serializable snapshot of every reduction, for terminal output and export.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::{monthly_revenue, top_products, total_revenue, weekly_revenue};
use crate::domain::Bucket;
use crate::io::ingest::IngestedLedger;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub rows_read: usize,
    pub rows_used: usize,
    pub rows_dropped: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub total_revenue: Decimal,
    pub weekly: Vec<Bucket>,
    pub monthly: Vec<Bucket>,
    pub top_products: Vec<Bucket>,
}

pub fn summarize(ingest: &IngestedLedger, top_n: usize) -> LedgerSummary {
    let ledger = &ingest.ledger;
    LedgerSummary {
        rows_read: ingest.rows_read,
        rows_used: ingest.rows_used(),
        rows_dropped: ingest.dropped.len(),
        first_date: ledger.first_date(),
        last_date: ledger.last_date(),
        total_revenue: total_revenue(ledger),
        weekly: weekly_revenue(ledger),
        monthly: monthly_revenue(ledger),
        top_products: top_products(ledger, top_n),
    }
}
