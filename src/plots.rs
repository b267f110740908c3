//! Grouped summaries rendered as PNG charts
//!
//! Charts are drawn with the [`plotters`] bitmap backend at a fixed
//! 1200x800 resolution: bar charts for categorical counts and survival
//! rates, and a 30-bucket histogram for ages. Each call writes one file
//! and releases the drawing area before returning.

use crate::error::{EdaError, Result};
use plotters::prelude::*;
use plotters::style::FontTransform;
use polars::prelude::*;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::info;

const PLOT_SIZE: (u32, u32) = (1200, 800);

/// Number of buckets in the age histogram
const AGE_BINS: usize = 30;

/// Label used for the null category in count plots
const MISSING_LABEL: &str = "missing";

/// Count rows per distinct value of `column`, with nulls as their own
/// trailing category.
///
/// Categories are ordered by the value's natural sort order (numeric when
/// the column is numeric), never by frequency.
pub fn category_counts(df: &DataFrame, column: &str) -> Result<Vec<(String, u64)>> {
    let series = df
        .column(column)
        .map_err(|_| EdaError::ColumnNotFound(column.to_string()))?
        .as_materialized_series()
        .clone();
    let missing = series.null_count() as u64;

    let mut counts: Vec<(String, u64)> = if is_numeric_dtype(series.dtype()) {
        let ca = series.cast(&DataType::Float64)?;
        let mut by_value: HashMap<u64, u64> = HashMap::new();
        for value in ca.f64()?.into_iter().flatten() {
            *by_value.entry(value.to_bits()).or_insert(0) += 1;
        }
        let mut pairs: Vec<(f64, u64)> = by_value
            .into_iter()
            .map(|(bits, count)| (f64::from_bits(bits), count))
            .collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        pairs
            .into_iter()
            .map(|(value, count)| (format_category(value), count))
            .collect()
    } else {
        let ca = series.cast(&DataType::String)?;
        let mut by_value: BTreeMap<String, u64> = BTreeMap::new();
        for value in ca.str()?.into_iter().flatten() {
            *by_value.entry(value.to_string()).or_insert(0) += 1;
        }
        by_value.into_iter().collect()
    };

    if missing > 0 {
        counts.push((MISSING_LABEL.to_string(), missing));
    }
    Ok(counts)
}

/// Mean of the survival indicator per distinct value of `by`, ordered by
/// descending rate. Rows with a null grouping value or null indicator are
/// left out.
pub fn survival_rates(df: &DataFrame, by: &str) -> Result<Vec<(String, f64)>> {
    let labels = group_labels(df, by)?;
    let survived = df
        .column("Survived")
        .map_err(|_| EdaError::ColumnNotFound("Survived".to_string()))?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let survived: Vec<Option<f64>> = survived.f64()?.into_iter().collect();

    let mut sums: HashMap<String, (f64, u64)> = HashMap::new();
    for (label, indicator) in labels.iter().zip(survived.iter()) {
        if let (Some(label), Some(indicator)) = (label, indicator) {
            let entry = sums.entry(label.clone()).or_insert((0.0, 0));
            entry.0 += indicator;
            entry.1 += 1;
        }
    }

    let mut rates: Vec<(String, f64)> = sums
        .into_iter()
        .map(|(label, (sum, count))| (label, sum / count as f64))
        .collect();
    rates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    Ok(rates)
}

/// Render the categorical count plot for `column` and save it to `path`.
pub fn plot_counts(df: &DataFrame, column: &str, title: &str, path: &Path) -> Result<()> {
    let counts = category_counts(df, column)?;
    let labels: Vec<String> = counts.iter().map(|(label, _)| label.clone()).collect();
    let values: Vec<f64> = counts.iter().map(|(_, count)| *count as f64).collect();
    render_bar_chart(&labels, &values, title, column, "Count", path)?;
    info!(column, path = %path.display(), "wrote count plot");
    Ok(())
}

/// Render the survival-rate plot grouped by `by` and save it to `path`.
pub fn plot_survival_rate(df: &DataFrame, by: &str, path: &Path) -> Result<()> {
    let rates = survival_rates(df, by)?;
    let labels: Vec<String> = rates.iter().map(|(label, _)| label.clone()).collect();
    let values: Vec<f64> = rates.iter().map(|(_, rate)| *rate).collect();
    let title = format!("Survival Rate by {by}");
    render_bar_chart(&labels, &values, &title, by, "Survival Rate", path)?;
    info!(by, path = %path.display(), "wrote survival-rate plot");
    Ok(())
}

/// Render the fixed 30-bucket histogram of non-missing ages.
pub fn plot_age_histogram(df: &DataFrame, path: &Path) -> Result<()> {
    let series = df
        .column("Age")
        .map_err(|_| EdaError::ColumnNotFound("Age".to_string()))?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let ages: Vec<f64> = series.f64()?.into_iter().flatten().collect();
    if ages.is_empty() {
        return Err(EdaError::PlotError(
            "no non-missing Age values to plot".to_string(),
        ));
    }

    let (counts, min, width) = bucket_counts(&ages, AGE_BINS);

    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| EdaError::PlotError(e.to_string()))?;

    let x_max = min + width * AGE_BINS as f64;
    let y_max = counts.iter().copied().max().unwrap_or(1).max(1) as f64 * 1.05;

    let mut chart = ChartBuilder::on(&root)
        .caption("Age Distribution", ("sans-serif", 40))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(85)
        .build_cartesian_2d(min..x_max, 0.0..y_max)
        .map_err(|e| EdaError::PlotError(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("Age")
        .y_desc("Frequency")
        .label_style(("sans-serif", 25))
        .draw()
        .map_err(|e| EdaError::PlotError(e.to_string()))?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, &count)| {
            let x0 = min + width * i as f64;
            let x1 = min + width * (i + 1) as f64;
            Rectangle::new([(x0, 0.0), (x1, count as f64)], BLUE.filled())
        }))
        .map_err(|e| EdaError::PlotError(e.to_string()))?;

    root.present()
        .map_err(|e| EdaError::PlotError(e.to_string()))?;
    info!(path = %path.display(), "wrote age histogram");
    Ok(())
}

/// Per-row grouping labels for `by`, formatted the same way count-plot
/// categories are.
fn group_labels(df: &DataFrame, by: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(by)
        .map_err(|_| EdaError::ColumnNotFound(by.to_string()))?
        .as_materialized_series()
        .clone();
    if is_numeric_dtype(series.dtype()) {
        let ca = series.cast(&DataType::Float64)?;
        Ok(ca
            .f64()?
            .into_iter()
            .map(|opt| opt.map(format_category))
            .collect())
    } else {
        let ca = series.cast(&DataType::String)?;
        Ok(ca
            .str()?
            .into_iter()
            .map(|opt| opt.map(|s| s.to_string()))
            .collect())
    }
}

/// Check if dtype is numeric
fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Integral categories render without a trailing ".0".
fn format_category(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Bucket `values` into `bins` equal-width buckets.
///
/// Returns the per-bucket counts together with the range minimum and the
/// bucket width. A constant column gets a unit-width single bucket.
fn bucket_counts(values: &[f64], bins: usize) -> (Vec<u64>, f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / bins as f64;
    let width = if width > 0.0 { width } else { 1.0 };

    let mut counts = vec![0u64; bins];
    for &value in values {
        let index = (((value - min) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }
    (counts, min, width)
}

/// Shared bar-chart renderer: white 1200x800 PNG, rotated category labels
/// on the x-axis.
fn render_bar_chart(
    labels: &[String],
    values: &[f64],
    title: &str,
    x_desc: &str,
    y_desc: &str,
    path: &Path,
) -> Result<()> {
    if labels.is_empty() {
        return Err(EdaError::PlotError(format!(
            "no categories to plot for {title:?}"
        )));
    }

    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| EdaError::PlotError(e.to_string()))?;

    let n = labels.len() as i32;
    let y_max = values.iter().copied().fold(0.0_f64, f64::max).max(1e-9) * 1.05;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 40))
        .margin(20)
        .x_label_area_size(90)
        .y_label_area_size(85)
        .build_cartesian_2d((0..n).into_segmented(), 0.0..y_max)
        .map_err(|e| EdaError::PlotError(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_desc(x_desc)
        .y_desc(y_desc)
        .label_style(("sans-serif", 25))
        .x_label_style(("sans-serif", 20).into_font().transform(FontTransform::Rotate90))
        .x_label_formatter(&|segment| match segment {
            SegmentValue::CenterOf(i) => labels
                .get(*i as usize)
                .cloned()
                .unwrap_or_default(),
            _ => String::new(),
        })
        .draw()
        .map_err(|e| EdaError::PlotError(e.to_string()))?;

    chart
        .draw_series((0..n).map(|i| {
            let mut bar = Rectangle::new(
                [
                    (SegmentValue::Exact(i), 0.0),
                    (SegmentValue::Exact(i + 1), values[i as usize]),
                ],
                BLUE.filled(),
            );
            bar.set_margin(0, 0, 8, 8);
            bar
        }))
        .map_err(|e| EdaError::PlotError(e.to_string()))?;

    root.present()
        .map_err(|e| EdaError::PlotError(e.to_string()))?;
    Ok(())
}
