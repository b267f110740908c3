//! Cleaning and feature derivation for the passenger table
//!
//! Fills missing ages with the (Pclass, Sex) partition median, fills missing
//! embarkation ports with the global mode, and derives the Title, FamilySize,
//! IsAlone, TicketPrefix, and HasCabin columns. The raw table is never
//! mutated; all work happens on a copy.

use crate::error::{EdaError, Result};
use polars::prelude::*;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

/// Columns the cleaner requires in the raw table
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "Pclass", "Sex", "Age", "SibSp", "Parch", "Name", "Ticket", "Cabin", "Embarked", "Survived",
];

/// Sentinel for tickets with no alphabetic prefix
pub const NO_PREFIX: &str = "NONE";

/// Cleaner for the raw passenger table
pub struct Cleaner {
    /// Matches the honorific between the comma and the following period
    title_pattern: Regex,
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl Cleaner {
    /// Create a new cleaner
    pub fn new() -> Self {
        Self {
            title_pattern: Regex::new(r",\s*([^,.]+)\.").unwrap(),
        }
    }

    /// Derive the cleaned table from the raw table.
    ///
    /// Row count is preserved; every derived column is a pure function of the
    /// row plus whole-table statistics computed before any row is touched.
    /// Returns [`EdaError::ColumnNotFound`] when a required column is absent.
    pub fn clean(&self, df: &DataFrame) -> Result<DataFrame> {
        for name in REQUIRED_COLUMNS {
            if df.column(name).is_err() {
                return Err(EdaError::ColumnNotFound(name.to_string()));
            }
        }

        let height = df.height();
        let mut out = df.clone();

        let pclass = i64_values(df, "Pclass")?;
        let sex = str_values(df, "Sex")?;
        let age = f64_values(df, "Age")?;

        // Partition medians over known ages, computed before any fill.
        let mut partitions: HashMap<(Option<i64>, Option<String>), Vec<f64>> = HashMap::new();
        for i in 0..height {
            if let Some(a) = age[i] {
                partitions
                    .entry((pclass[i], sex[i].clone()))
                    .or_default()
                    .push(a);
            }
        }
        let medians: HashMap<(Option<i64>, Option<String>), f64> = partitions
            .into_iter()
            .filter_map(|(key, mut values)| median(&mut values).map(|m| (key, m)))
            .collect();

        // A partition with zero known ages has no median; those rows keep a
        // null Age.
        let filled_age: Float64Chunked = (0..height)
            .map(|i| {
                age[i].or_else(|| medians.get(&(pclass[i], sex[i].clone())).copied())
            })
            .collect();
        let ages_filled = age.iter().filter(|a| a.is_none()).count()
            - filled_age.null_count();
        out.with_column(filled_age.with_name("Age".into()).into_series())?;

        // Global mode of the embarkation port. Tie-break among equally
        // frequent ports is whichever entry the counting map yields first.
        let embarked = str_values(df, "Embarked")?;
        let mut port_counts: HashMap<&str, usize> = HashMap::new();
        for port in embarked.iter().flatten() {
            *port_counts.entry(port.as_str()).or_insert(0) += 1;
        }
        let mode = port_counts
            .into_iter()
            .max_by_key(|(_, count)| *count)
            .map(|(port, _)| port.to_string());
        let ports_filled = embarked.iter().filter(|p| p.is_none()).count();
        let filled_embarked: StringChunked = embarked
            .iter()
            .map(|opt| opt.clone().or_else(|| mode.clone()))
            .collect();
        out.with_column(filled_embarked.with_name("Embarked".into()).into_series())?;

        debug!(ages_filled, ports_filled, "imputed missing values");

        // Honorific between the comma and the period; no match leaves a null.
        let names = str_values(df, "Name")?;
        let titles: StringChunked = names
            .iter()
            .map(|opt| {
                opt.as_deref()
                    .and_then(|name| self.title_pattern.captures(name))
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().trim().to_string())
            })
            .collect();
        out.with_column(titles.with_name("Title".into()).into_series())?;

        let sibsp = i64_values(df, "SibSp")?;
        let parch = i64_values(df, "Parch")?;
        let family_size: Vec<Option<i64>> = (0..height)
            .map(|i| match (sibsp[i], parch[i]) {
                (Some(s), Some(p)) => Some(s + p + 1),
                _ => None,
            })
            .collect();
        let family_ca: Int64Chunked = family_size.iter().copied().collect();
        out.with_column(family_ca.with_name("FamilySize".into()).into_series())?;

        let alone: Int64Chunked = family_size
            .iter()
            .map(|opt| opt.map(|f| i64::from(f == 1)))
            .collect();
        out.with_column(alone.with_name("IsAlone".into()).into_series())?;

        let tickets = str_values(df, "Ticket")?;
        let prefixes: StringChunked = tickets
            .iter()
            .map(|opt| opt.as_deref().map(ticket_prefix))
            .collect();
        out.with_column(prefixes.with_name("TicketPrefix".into()).into_series())?;

        let cabin_null = df.column("Cabin")?.as_materialized_series().is_null();
        let has_cabin: Int64Chunked = cabin_null
            .into_iter()
            .map(|opt| opt.map(|is_null| i64::from(!is_null)))
            .collect();
        out.with_column(has_cabin.with_name("HasCabin".into()).into_series())?;

        debug!(rows = out.height(), cols = out.width(), "derived cleaned table");
        Ok(out)
    }
}

/// Strip everything but ASCII letters; an empty result becomes [`NO_PREFIX`].
fn ticket_prefix(ticket: &str) -> String {
    let letters: String = ticket.chars().filter(|c| c.is_ascii_alphabetic()).collect();
    if letters.is_empty() {
        NO_PREFIX.to_string()
    } else {
        letters
    }
}

/// Median of an unsorted list; `None` when the list is empty.
fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 1 {
        Some(values[n / 2])
    } else {
        Some((values[n / 2 - 1] + values[n / 2]) / 2.0)
    }
}

fn i64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Int64)?;
    Ok(series.i64()?.into_iter().collect())
}

fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

fn str_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|opt| opt.map(|s| s.to_string()))
        .collect())
}
