use anyhow::{Context, Result};

use batchforge::submission::SubmissionConfig;

mod demo;

fn main() -> Result<()> {
    pretty_env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => SubmissionConfig::load(&path)
            .with_context(|| format!("Failed to load submission config from {path}"))?,
        None => SubmissionConfig::default(),
    };

    pollster::block_on(demo::run(config, demo::DemoOptions::default()))?;

    Ok(())
}
