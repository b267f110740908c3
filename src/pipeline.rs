//! End-to-end orchestration
//!
//! Sequences load, clean, persist, and the fixed set of plots. The two
//! configuration constants (input path, output directory) are the only
//! knobs; there is no CLI surface.

use crate::cleaning::Cleaner;
use crate::error::Result;
use crate::loader::{DataLoader, DataSaver};
use crate::plots;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Fixed relative path of the input dataset
pub const DATA_PATH: &str = "train.csv";

/// Fixed relative path of the output directory
pub const OUTPUT_DIR: &str = "outputs";

/// Filename of the persisted cleaned table
pub const CLEANED_FILENAME: &str = "titanic_cleaned.csv";

/// Count plots: (column, title, filename)
const COUNT_PLOTS: [(&str, &str, &str); 3] = [
    ("Pclass", "Passenger Class Distribution", "pclass_dist.png"),
    ("Sex", "Sex Distribution", "sex_dist.png"),
    ("Embarked", "Embarked Distribution", "embarked_dist.png"),
];

/// Survival-rate plots: (grouping column, filename)
const SURVIVAL_PLOTS: [(&str, &str); 4] = [
    ("Pclass", "survival_by_pclass.png"),
    ("Sex", "survival_by_sex.png"),
    ("Embarked", "survival_by_embarked.png"),
    ("IsAlone", "survival_by_isalone.png"),
];

/// Filename of the fixed age histogram
const AGE_HIST_FILENAME: &str = "age_hist.png";

/// Pipeline configuration: the two fixed paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub data_path: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DATA_PATH),
            output_dir: PathBuf::from(OUTPUT_DIR),
        }
    }
}

/// Run the whole pipeline: load, clean, persist, plot.
///
/// Any failure aborts the remaining sequence and is surfaced to the caller.
pub fn run(config: &PipelineConfig) -> Result<()> {
    std::fs::create_dir_all(&config.output_dir)?;

    let loader = DataLoader::new();
    let df = loader.load_csv(&config.data_path)?;
    println!("Raw shape: ({}, {})", df.height(), df.width());
    info!(rows = df.height(), cols = df.width(), "loaded raw table");

    let mut cleaned = Cleaner::new().clean(&df)?;
    println!("Cleaned shape: ({}, {})", cleaned.height(), cleaned.width());

    let cleaned_path = config.output_dir.join(CLEANED_FILENAME);
    DataSaver::save_csv(&mut cleaned, &cleaned_path)?;
    info!(path = %cleaned_path.display(), "wrote cleaned table");

    for (column, title, filename) in COUNT_PLOTS {
        plots::plot_counts(&cleaned, column, title, &config.output_dir.join(filename))?;
    }
    for (column, filename) in SURVIVAL_PLOTS {
        plots::plot_survival_rate(&cleaned, column, &config.output_dir.join(filename))?;
    }
    plots::plot_age_histogram(&cleaned, &config.output_dir.join(AGE_HIST_FILENAME))?;

    println!("EDA complete. See outputs in: {}", config.output_dir.display());
    Ok(())
}
