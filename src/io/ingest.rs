//! CSV ingest and normalization.
//!
//! This module is responsible for turning an uploaded sales CSV into a clean,
//! date-sorted `SalesLedger` that is safe to aggregate.
//!
//! Design goals:
//! - **Strict schema** for required columns (one error naming all of them)
//! - **Row-level validation** (skip bad dates, but report what happened)
//! - **Deterministic behavior** (no hidden randomness, stable ordering)
//! - **Separation of concerns**: no aggregation logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::domain::{RevenuePolicy, SalesLedger, SalesRecord};
use crate::error::{AppError, ValidationError};

const DATE_ALIASES: &[&str] = &["date"];
const PRODUCT_ALIASES: &[&str] = &["product", "product/service"];
const REVENUE_ALIASES: &[&str] = &["revenue", "sales_amount"];
const QUANTITY_ALIASES: &[&str] = &["quantity_sold", "quantity"];
const UNIT_PRICE_ALIASES: &[&str] = &["unit_price", "price"];

/// Knobs that change how rows are validated.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    pub revenue_policy: RevenuePolicy,
}

/// Where a row's revenue comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevenueSource {
    Column(usize),
    /// `quantity × unit price` when the file has no revenue column.
    Derived { quantity: usize, unit_price: usize },
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSchema {
    pub date: usize,
    pub product: usize,
    pub revenue: RevenueSource,
    pub quantity: Option<usize>,
}

/// A row that was dropped during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    pub line: usize,
    pub reason: String,
}

/// Ingest output: the ledger plus bookkeeping about what was skipped.
#[derive(Debug, Clone)]
pub struct IngestedLedger {
    pub ledger: SalesLedger,
    pub schema: ResolvedSchema,
    pub rows_read: usize,
    pub dropped: Vec<RowIssue>,
}

impl IngestedLedger {
    pub fn rows_used(&self) -> usize {
        self.ledger.len()
    }
}

/// Load a ledger from a CSV file on disk.
pub fn load_ledger(path: &Path, options: IngestOptions) -> Result<IngestedLedger, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open CSV '{}': {e}", path.display()),
        ))
    })?;
    read_ledger(file, options)
}

/// Load a ledger from any CSV byte source.
pub fn read_ledger<R: Read>(source: R, options: IngestOptions) -> Result<IngestedLedger, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let header_map = build_header_map(&headers);
    let schema = resolve_schema(&header_map)?;

    let mut records = Vec::new();
    let mut dropped = Vec::new();
    let mut rows_read = 0usize;
    // Sum of |revenue| over kept rows. Any bucket total is bounded by it, so
    // once this fits in a `Decimal` no aggregation can overflow.
    let mut magnitude = Decimal::ZERO;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                dropped.push(RowIssue {
                    line,
                    reason: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &schema, line, options.revenue_policy)? {
            Ok(row) => {
                magnitude = magnitude
                    .checked_add(row.revenue.abs())
                    .ok_or(ValidationError::RevenueOverflow { line })?;
                records.push(row);
            }
            Err(reason) => {
                debug!(line, %reason, "dropping row");
                dropped.push(RowIssue { line, reason });
            }
        }
    }

    if !dropped.is_empty() {
        warn!(
            dropped = dropped.len(),
            rows_read, "dropped rows that failed validation"
        );
    }

    if records.is_empty() {
        return Err(ValidationError::EmptyLedger {
            dropped: dropped.len(),
        }
        .into());
    }

    Ok(IngestedLedger {
        ledger: SalesLedger::new(records),
        schema,
        rows_read,
        dropped,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report `Date` as missing.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn find_column(header_map: &HashMap<String, usize>, aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|alias| header_map.get(*alias).copied())
}

fn resolve_schema(header_map: &HashMap<String, usize>) -> Result<ResolvedSchema, ValidationError> {
    let date = find_column(header_map, DATE_ALIASES);
    let product = find_column(header_map, PRODUCT_ALIASES);
    let quantity = find_column(header_map, QUANTITY_ALIASES);

    let revenue = match find_column(header_map, REVENUE_ALIASES) {
        Some(idx) => Some(RevenueSource::Column(idx)),
        None => match (quantity, find_column(header_map, UNIT_PRICE_ALIASES)) {
            (Some(quantity), Some(unit_price)) => Some(RevenueSource::Derived { quantity, unit_price }),
            _ => None,
        },
    };

    let mut missing = Vec::new();
    if date.is_none() {
        missing.push("Date".to_string());
    }
    if product.is_none() {
        missing.push("Product".to_string());
    }
    if revenue.is_none() {
        missing.push("Revenue".to_string());
    }

    match (date, product, revenue) {
        (Some(date), Some(product), Some(revenue)) => Ok(ResolvedSchema {
            date,
            product,
            revenue,
            quantity,
        }),
        _ => Err(ValidationError::MissingColumns(missing)),
    }
}

/// Parse one row.
///
/// The outer `Result` is fatal (strict revenue policy); the inner one is a
/// non-fatal reason to drop the row.
fn parse_row(
    record: &StringRecord,
    schema: &ResolvedSchema,
    line: usize,
    policy: RevenuePolicy,
) -> Result<Result<SalesRecord, String>, ValidationError> {
    let raw_date = get_field(record, schema.date);
    let Some(date) = parse_date(raw_date) else {
        return Ok(Err(format!(
            "Invalid date '{raw_date}' (expected a date between {MIN_YEAR} and {MAX_YEAR})."
        )));
    };

    let product = get_field(record, schema.product);
    if product.is_empty() {
        return Ok(Err("Missing product.".to_string()));
    }

    let revenue = match schema.revenue {
        RevenueSource::Column(idx) => {
            let raw = get_field(record, idx);
            parse_decimal(raw).ok_or_else(|| raw.to_string())
        }
        RevenueSource::Derived { quantity, unit_price } => {
            let raw_qty = get_field(record, quantity);
            let raw_price = get_field(record, unit_price);
            match (parse_decimal(raw_qty), parse_decimal(raw_price)) {
                (Some(q), Some(p)) => q.checked_mul(p).ok_or_else(|| format!("{raw_qty} x {raw_price}")),
                _ => Err(format!("{raw_qty} x {raw_price}")),
            }
        }
    };

    let revenue = match (revenue, policy) {
        (Ok(v), _) => v,
        (Err(value), RevenuePolicy::Strict) => {
            return Err(ValidationError::InvalidRevenue { line, value });
        }
        (Err(value), RevenuePolicy::Lenient) => {
            return Ok(Err(format!("Invalid revenue '{value}'.")));
        }
    };

    let quantity = schema
        .quantity
        .and_then(|idx| get_field(record, idx).parse::<i64>().ok());

    Ok(Ok(SalesRecord {
        date,
        product: product.to_string(),
        quantity,
        revenue,
    }))
}

fn get_field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).map(str::trim).unwrap_or("")
}

/// Earliest and latest accepted years (the `datetime64[ns]` range most
/// spreadsheet tooling tops out at). Weekly buckets are gap-filled, so an
/// unbounded range would let two rows span millions of weeks.
pub const MIN_YEAR: i32 = 1677;
pub const MAX_YEAR: i32 = 2262;

/// Parse a sales date.
///
/// ISO dates are preferred; spreadsheet exports often carry US-style
/// `MM/DD/YYYY` or a full timestamp, so those are accepted too. Dates outside
/// `MIN_YEAR..=MAX_YEAR` are rejected.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    const DATE_FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    const DATETIME_FMTS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

    if s.is_empty() {
        return None;
    }
    let parsed = DATE_FMTS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FMTS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })?;

    (MIN_YEAR..=MAX_YEAR).contains(&parsed.year()).then_some(parsed)
}

/// Parse a decimal cell (plain or scientific notation).
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}
