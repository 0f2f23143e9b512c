use std::{process, time::Instant};

use anyhow::{ensure, Context, Result};
use args::Args;
use common::config::Config;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

use realign::{error::RealignError, transform};

mod args;

const CONFIG_FILE: &str = "realign.toml";

fn main() -> Result<()> {
    let args = match Args::parse_or_usage() {
        Ok(args) => args,
        Err(err @ RealignError::Usage(_)) => {
            println!("{err}");
            process::exit(args::exit_code(&err));
        }
        Err(err) => return Err(err.into()),
    };

    let level = args.log_level();
    let filter = filter::Targets::new()
        .with_default(LevelFilter::OFF)
        .with_target("realign", level)
        .with_target("mesh_format", level)
        .with_target("common", level);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &args.config {
        Some(path) => {
            ensure!(path.exists(), "Config file `{}` does not exist", path.display());
            Config::load(path)?
        }
        None => match dirs::config_dir() {
            Some(dir) => Config::load_or_default(&dir.join("curvislicer").join(CONFIG_FILE)),
            None => Config::default(),
        },
    };

    let now = Instant::now();
    let summary = transform(&args.mesh, &args.input, &args.output, &config.toolpath)
        .with_context(|| format!("Failed to realign `{}`", args.input.display()))?;

    println!(
        "Offset X {:.6} Y {:.6} Z {:.6}, kept {} lines, removed {}. Elapsed: {:.1}s",
        summary.offset.x,
        summary.offset.y,
        summary.offset.z,
        summary.kept,
        summary.removed,
        now.elapsed().as_secs_f32()
    );

    Ok(())
}
