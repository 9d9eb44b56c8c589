//! `boostline run`: every stage in order, stopping at the first failure.

use super::prepare::{self, PrepareOptions};
use super::{analyze, register, train, transform, upload, Pipeline};
use anyhow::Result;
use colored::Colorize;
use tracing::info;

pub async fn execute(pipeline: &Pipeline, options: &PrepareOptions) -> Result<()> {
    info!("Stage 1/6: prepare");
    prepare::execute(pipeline, options).await?;

    info!("Stage 2/6: upload");
    upload::execute(pipeline).await?;

    info!("Stage 3/6: train");
    train::execute(pipeline, false, false).await?;

    info!("Stage 4/6: register");
    register::execute(pipeline).await?;

    info!("Stage 5/6: transform");
    transform::execute(pipeline, false, false).await?;

    info!("Stage 6/6: analyze");
    analyze::execute(pipeline, None, false).await?;

    println!("{} Pipeline complete", "✓".green().bold());
    Ok(())
}
