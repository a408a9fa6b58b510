//! Shared domain types.
//!
//! Records and buckets are plain data. The ledger owns its records and keeps
//! them sorted by date so every reduction can walk it in order.

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How blank or non-numeric revenue cells are treated during ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RevenuePolicy {
    /// Fail the whole upload on the first bad revenue cell.
    #[default]
    Strict,
    /// Drop the offending row and keep going (the row is reported).
    Lenient,
}

/// One normalized sales row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub product: String,
    pub quantity: Option<i64>,
    pub revenue: Decimal,
}

/// Date-sorted sales records for a single upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesLedger {
    records: Vec<SalesRecord>,
}

impl SalesLedger {
    /// Build a ledger, sorting by date. The sort is stable so rows sharing a
    /// date keep their file order (this drives product tie-breaks).
    pub fn new(mut records: Vec<SalesRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        Self { records }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }
}

/// Which dimension a reduction groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucketing {
    /// ISO week, keyed by its Monday.
    Week,
    /// Calendar month.
    Month,
    /// Product name.
    Product,
}

impl Bucketing {
    pub fn key_for(self, record: &SalesRecord) -> BucketKey {
        match self {
            Bucketing::Week => BucketKey::Week(week_start(record.date)),
            Bucketing::Month => BucketKey::Month {
                year: record.date.year(),
                month: record.date.month(),
            },
            Bucketing::Product => BucketKey::Product(record.product.clone()),
        }
    }
}

/// Typed bucket key. Ordering is chronological for weeks and months.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum BucketKey {
    Week(NaiveDate),
    Month { year: i32, month: u32 },
    Product(String),
}

impl BucketKey {
    /// Display label: `YYYY-MM-DD` for weeks, `YYYY-MM` for months.
    pub fn label(&self) -> String {
        match self {
            BucketKey::Week(monday) => monday.format("%Y-%m-%d").to_string(),
            BucketKey::Month { year, month } => format!("{year:04}-{month:02}"),
            BucketKey::Product(name) => name.clone(),
        }
    }
}

/// A bucket key mapped to summed revenue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub key: BucketKey,
    pub label: String,
    pub revenue: Decimal,
}

impl Bucket {
    pub fn new(key: BucketKey, revenue: Decimal) -> Self {
        let label = key.label();
        Self { key, label, revenue }
    }
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday();
    date - chrono::Duration::days(i64::from(offset))
}
