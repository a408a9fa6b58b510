//! Revenue reductions over a `SalesLedger`.
//!
//! Every named reduction (weekly, monthly, top products, ...) is a thin call
//! into [`aggregate`], so chart definitions only need to say *which* bucketing,
//! ordering and limit they want.
//!
//! Sums use plain `Decimal` addition: ingest rejects ledgers whose total
//! absolute revenue does not fit in a `Decimal`, which bounds every bucket.

use std::collections::HashMap;

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Bucket, BucketKey, Bucketing, SalesLedger};

pub mod summary;

pub use summary::*;

/// Default length of the top-products ranking.
pub const DEFAULT_TOP_N: usize = 5;

/// How buckets are ordered in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketOrder {
    /// By key: chronological for weeks/months, first-encounter for products.
    Key,
    /// Largest revenue first; ties keep key order.
    RevenueDesc,
    /// Smallest revenue first; ties keep key order.
    RevenueAsc,
}

/// Group the ledger by `bucketing`, sum revenue per bucket, order and truncate.
///
/// Weekly buckets are contiguous: weeks without sales between the first and
/// last observed week appear with zero revenue.
pub fn aggregate(
    ledger: &SalesLedger,
    bucketing: Bucketing,
    order: BucketOrder,
    limit: Option<usize>,
) -> Vec<Bucket> {
    let mut buckets = match bucketing {
        Bucketing::Week => fill_missing_weeks(sum_by_key(ledger, bucketing)),
        Bucketing::Month => {
            let mut buckets = sum_by_key(ledger, bucketing);
            buckets.sort_by(|a, b| a.key.cmp(&b.key));
            buckets
        }
        Bucketing::Product => sum_by_key(ledger, bucketing),
    };

    // `sort_by` is stable, so equal totals keep key order.
    match order {
        BucketOrder::Key => {}
        BucketOrder::RevenueDesc => buckets.sort_by(|a, b| b.revenue.cmp(&a.revenue)),
        BucketOrder::RevenueAsc => buckets.sort_by(|a, b| a.revenue.cmp(&b.revenue)),
    }

    if let Some(n) = limit {
        buckets.truncate(n);
    }
    buckets
}

/// Revenue per ISO week (keyed by Monday), ascending and gap-free.
pub fn weekly_revenue(ledger: &SalesLedger) -> Vec<Bucket> {
    aggregate(ledger, Bucketing::Week, BucketOrder::Key, None)
}

/// Revenue per calendar month (`YYYY-MM`), ascending, observed months only.
pub fn monthly_revenue(ledger: &SalesLedger) -> Vec<Bucket> {
    aggregate(ledger, Bucketing::Month, BucketOrder::Key, None)
}

/// Revenue per product in first-encounter order.
pub fn product_totals(ledger: &SalesLedger) -> Vec<Bucket> {
    aggregate(ledger, Bucketing::Product, BucketOrder::Key, None)
}

/// The `n` best-selling products, highest revenue first.
pub fn top_products(ledger: &SalesLedger, n: usize) -> Vec<Bucket> {
    aggregate(ledger, Bucketing::Product, BucketOrder::RevenueDesc, Some(n))
}

/// Every product, lowest revenue first.
pub fn product_distribution(ledger: &SalesLedger) -> Vec<Bucket> {
    aggregate(ledger, Bucketing::Product, BucketOrder::RevenueAsc, None)
}

pub fn total_revenue(ledger: &SalesLedger) -> Decimal {
    ledger.records().iter().map(|r| r.revenue).sum()
}

/// Sum revenue per key, keeping keys in the order they are first seen.
fn sum_by_key(ledger: &SalesLedger, bucketing: Bucketing) -> Vec<Bucket> {
    let mut index: HashMap<BucketKey, usize> = HashMap::new();
    let mut sums: Vec<(BucketKey, Decimal)> = Vec::new();

    for record in ledger.records() {
        let key = bucketing.key_for(record);
        match index.get(&key) {
            Some(&i) => sums[i].1 += record.revenue,
            None => {
                index.insert(key.clone(), sums.len());
                sums.push((key, record.revenue));
            }
        }
    }

    sums.into_iter()
        .map(|(key, revenue)| Bucket::new(key, revenue))
        .collect()
}

fn fill_missing_weeks(mut observed: Vec<Bucket>) -> Vec<Bucket> {
    observed.sort_by(|a, b| a.key.cmp(&b.key));

    let (Some(first), Some(last)) = (observed.first(), observed.last()) else {
        return observed;
    };
    let (BucketKey::Week(start), BucketKey::Week(end)) = (&first.key, &last.key) else {
        return observed;
    };
    let (start, end) = (*start, *end);

    let mut by_week: HashMap<BucketKey, Decimal> =
        observed.into_iter().map(|b| (b.key, b.revenue)).collect();

    let mut out = Vec::new();
    let mut week = start;
    while week <= end {
        let key = BucketKey::Week(week);
        let revenue = by_week.remove(&key).unwrap_or(Decimal::ZERO);
        out.push(Bucket::new(key, revenue));
        week += Duration::weeks(1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SalesRecord;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rec(date: NaiveDate, product: &str, revenue: i64) -> SalesRecord {
        SalesRecord {
            date,
            product: product.to_string(),
            quantity: None,
            revenue: Decimal::from(revenue),
        }
    }

    fn scenario_ledger() -> SalesLedger {
        SalesLedger::new(vec![
            rec(d(2023, 1, 2), "Widget", 100),
            rec(d(2023, 1, 9), "Widget", 50),
            rec(d(2023, 1, 2), "Gadget", 30),
        ])
    }

    fn pairs(buckets: &[Bucket]) -> Vec<(String, Decimal)> {
        buckets.iter().map(|b| (b.label.clone(), b.revenue)).collect()
    }

    #[test]
    fn weekly_and_product_scenario() {
        let ledger = scenario_ledger();

        assert_eq!(
            pairs(&weekly_revenue(&ledger)),
            vec![
                ("2023-01-02".to_string(), Decimal::from(130)),
                ("2023-01-09".to_string(), Decimal::from(50)),
            ]
        );

        let totals = product_totals(&ledger);
        let by_name: HashMap<String, Decimal> = pairs(&totals).into_iter().collect();
        assert_eq!(by_name["Widget"], Decimal::from(150));
        assert_eq!(by_name["Gadget"], Decimal::from(30));
        assert_eq!(totals.len(), 2);
    }

    #[test]
    fn weekly_fills_gaps_with_zero() {
        let ledger = SalesLedger::new(vec![
            rec(d(2023, 1, 4), "A", 10),
            rec(d(2023, 1, 25), "A", 20),
        ]);
        let weeks = weekly_revenue(&ledger);
        let labels: Vec<&str> = weeks.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["2023-01-02", "2023-01-09", "2023-01-16", "2023-01-23"]);
        assert_eq!(weeks[1].revenue, Decimal::ZERO);
        assert_eq!(weeks[2].revenue, Decimal::ZERO);
    }

    #[test]
    fn monthly_buckets_are_chronological() {
        let ledger = SalesLedger::new(vec![
            rec(d(2023, 3, 1), "A", 5),
            rec(d(2022, 12, 31), "A", 7),
            rec(d(2023, 1, 15), "B", 3),
            rec(d(2023, 3, 20), "B", 1),
        ]);
        assert_eq!(
            pairs(&monthly_revenue(&ledger)),
            vec![
                ("2022-12".to_string(), Decimal::from(7)),
                ("2023-01".to_string(), Decimal::from(3)),
                ("2023-03".to_string(), Decimal::from(6)),
            ]
        );
    }

    #[test]
    fn totals_agree_across_bucketings() {
        let ledger = SalesLedger::new(vec![
            rec(d(2023, 1, 30), "A", 11),
            rec(d(2023, 1, 31), "B", 13),
            rec(d(2023, 2, 1), "C", 17),
            rec(d(2023, 2, 28), "A", 19),
            rec(d(2023, 4, 2), "D", 23),
        ]);
        let total = total_revenue(&ledger);
        let weekly: Decimal = weekly_revenue(&ledger).iter().map(|b| b.revenue).sum();
        let monthly: Decimal = monthly_revenue(&ledger).iter().map(|b| b.revenue).sum();
        let products: Decimal = product_totals(&ledger).iter().map(|b| b.revenue).sum();
        assert_eq!(total, Decimal::from(83));
        assert_eq!(weekly, total);
        assert_eq!(monthly, total);
        assert_eq!(products, total);
    }

    #[test]
    fn decimal_sums_are_exact() {
        let mut records = Vec::new();
        for day in 1..=28 {
            records.push(SalesRecord {
                date: d(2023, 2, day),
                product: "Cents".to_string(),
                quantity: Some(1),
                revenue: Decimal::new(10, 2),
            });
        }
        let ledger = SalesLedger::new(records);
        let weekly: Decimal = weekly_revenue(&ledger).iter().map(|b| b.revenue).sum();
        assert_eq!(weekly, Decimal::new(280, 2));
        assert_eq!(monthly_revenue(&ledger)[0].revenue, Decimal::new(280, 2));
    }

    #[test]
    fn top_products_sorted_truncated_and_stable() {
        let ledger = SalesLedger::new(vec![
            rec(d(2023, 1, 1), "Tie-first", 40),
            rec(d(2023, 1, 1), "Small", 1),
            rec(d(2023, 1, 2), "Big", 100),
            rec(d(2023, 1, 2), "Tie-second", 40),
            rec(d(2023, 1, 3), "Mid", 60),
            rec(d(2023, 1, 3), "Low", 5),
            rec(d(2023, 1, 4), "Lower", 2),
        ]);
        let top = top_products(&ledger, DEFAULT_TOP_N);
        let names: Vec<&str> = top.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(names, ["Big", "Mid", "Tie-first", "Tie-second", "Low"]);
        assert!(top.windows(2).all(|w| w[0].revenue >= w[1].revenue));
    }

    #[test]
    fn top_products_handles_fewer_than_n() {
        let top = top_products(&scenario_ledger(), DEFAULT_TOP_N);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].label, "Widget");
    }

    #[test]
    fn distribution_is_ascending() {
        let dist = product_distribution(&scenario_ledger());
        let names: Vec<&str> = dist.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(names, ["Gadget", "Widget"]);
    }

    #[test]
    fn aggregation_is_repeatable() {
        let ledger = scenario_ledger();
        assert_eq!(weekly_revenue(&ledger), weekly_revenue(&ledger));
        assert_eq!(monthly_revenue(&ledger), monthly_revenue(&ledger));
        assert_eq!(top_products(&ledger, 5), top_products(&ledger, 5));
    }

    #[test]
    fn empty_ledger_yields_no_buckets() {
        let ledger = SalesLedger::default();
        assert!(weekly_revenue(&ledger).is_empty());
        assert!(monthly_revenue(&ledger).is_empty());
        assert!(top_products(&ledger, 5).is_empty());
        assert_eq!(total_revenue(&ledger), Decimal::ZERO);
    }
}
