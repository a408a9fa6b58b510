//! Synthetic daily sales generation for demos and smoke tests.
//!
//! Each day's revenue is `baseline + weekly sinusoid + linear trend + noise`,
//! rounded to cents. The output is a CSV in the upload schema, so it can be
//! fed straight back into `analyze` or the HTTP endpoints.

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::AppError;

const BASELINE: f64 = 100.0;
const WEEKLY_AMPLITUDE: f64 = 20.0;
/// Revenue added per elapsed day.
const TREND_PER_DAY: f64 = 0.2;
const NOISE_STD: f64 = 5.0;

pub const DEFAULT_PRODUCTS: [&str; 5] = ["Espresso", "Latte", "Croissant", "Bagel", "Smoothie"];

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub seed: u64,
    pub products: Vec<String>,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap_or_default(),
            seed: 42,
            products: DEFAULT_PRODUCTS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// One generated row, serialized with the upload template's headers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Quantity_Sold")]
    pub quantity_sold: u32,
    #[serde(rename = "Revenue")]
    pub revenue: Decimal,
}

pub fn generate_sales(config: &SampleConfig) -> Result<Vec<SampleRow>, AppError> {
    if config.end < config.start {
        return Err(AppError::Config(format!(
            "Sample end date {} is before start date {}.",
            config.end, config.start
        )));
    }
    if config.products.is_empty() {
        return Err(AppError::Config("Sample product list is empty.".to_string()));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, NOISE_STD)
        .map_err(|e| AppError::Config(format!("Noise distribution error: {e}")))?;

    let mut rows = Vec::new();
    for (i, date) in config.start.iter_days().take_while(|d| *d <= config.end).enumerate() {
        let day_of_week = f64::from(date.weekday().num_days_from_monday());
        let weekly = WEEKLY_AMPLITUDE * (2.0 * std::f64::consts::PI * day_of_week / 7.0).sin();
        let trend = TREND_PER_DAY * i as f64;
        let revenue = BASELINE + weekly + trend + noise.sample(&mut rng);

        let product = config.products[rng.gen_range(0..config.products.len())].clone();
        let quantity_sold = rng.gen_range(1..=10);

        rows.push(SampleRow {
            date,
            product,
            quantity_sold,
            revenue: to_cents(revenue),
        });
    }

    Ok(rows)
}

/// Generate rows and write them as CSV.
pub fn write_sample_csv(path: &Path, config: &SampleConfig) -> Result<usize, AppError> {
    let rows = generate_sales(config)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(rows.len())
}

fn to_cents(v: f64) -> Decimal {
    Decimal::new((v * 100.0).round() as i64, 2)
}
