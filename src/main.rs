//! Titanic EDA - Main Entry Point
//!
//! Runs the whole pipeline with the two fixed path constants. No flags,
//! no arguments; a non-zero exit means an unhandled error.

use titanic_eda::pipeline::{run, PipelineConfig};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "titanic_eda=info".into()),
        )
        .init();

    run(&PipelineConfig::default())?;

    Ok(())
}
