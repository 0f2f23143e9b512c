use std::path::Path;

use anyhow::Context;
use common::config::OptimizerConfig;
use tracing::{error, info};

use crate::{
    optimizer::{CurviSlicer, OptimizeParams, Optimizer},
    scene::{Notification, NotificationLevel, SceneHost},
    HostError,
};

const EXPORT_NAME: &str = "curvi_input.stl";
const NAME_PREFIX: &str = "CurviSliced_";
const TITLE: &str = "CurviSlicer";
const ERROR_TITLE: &str = "CurviSlicer Error";

/// Runs [`process_selection`] with the CurviSlicer launcher found from
/// `config`.
pub fn process_with_curvislicer<H: SceneHost>(
    host: &mut H,
    config: &OptimizerConfig,
    work_dir: &Path,
) -> Result<H::Node, HostError> {
    process_selection(host, || CurviSlicer::from_config(config), config, work_dir)
}

/// Sends the single selected object through the optimizer and swaps it for
/// the reshaped result. The optimizer is resolved before anything else.
/// Failures are reported to the host as a notification and leave the
/// selected object untouched.
pub fn process_selection<H: SceneHost, O: Optimizer>(
    host: &mut H,
    optimizer: impl FnOnce() -> Result<O, HostError>,
    config: &OptimizerConfig,
    work_dir: &Path,
) -> Result<H::Node, HostError> {
    let result = optimizer()
        .and_then(|optimizer| replace_selection(host, &optimizer, config, work_dir));

    match &result {
        Ok(_) => host.notify(Notification::simple(
            TITLE,
            NotificationLevel::Success,
            "Model processed successfully with CurviSlicer!",
        )),
        Err(err) => {
            error!("CurviSlicer error: {err:#}");
            host.notify(Notification::simple(
                ERROR_TITLE,
                NotificationLevel::Error,
                failure_message(err),
            ));
        }
    }

    result
}

/// Tells the user where the CurviSlicer launcher is expected.
pub fn show_settings<H: SceneHost>(host: &mut H, config: &OptimizerConfig) {
    let path = match CurviSlicer::from_config(config) {
        Ok(slicer) => slicer.bin_dir().display().to_string(),
        Err(err) => {
            info!("No CurviSlicer launcher: {err}");
            "not found".into()
        }
    };

    host.notify(Notification::simple(
        TITLE,
        NotificationLevel::Info,
        format!("CurviSlicer Settings\n\nBinaries path: {path}"),
    ));
}

fn replace_selection<H: SceneHost>(
    host: &mut H,
    optimizer: &impl Optimizer,
    config: &OptimizerConfig,
    work_dir: &Path,
) -> Result<H::Node, HostError> {
    let node = match <[H::Node; 1]>::try_from(host.selection()) {
        Ok([node]) => node,
        Err(selection) if selection.is_empty() => {
            return Err(HostError::Selection("Please select a model to process"))
        }
        Err(_) => return Err(HostError::Selection("Please select only one model at a time")),
    };

    let progress = Notification::simple(
        TITLE,
        NotificationLevel::Info,
        "Processing with CurviSlicer...",
    );
    host.notify(progress.clone());
    let result = optimize_node(host, optimizer, config, work_dir, node);
    host.dismiss(&progress);
    result
}

fn optimize_node<H: SceneHost>(
    host: &mut H,
    optimizer: &impl Optimizer,
    config: &OptimizerConfig,
    work_dir: &Path,
    node: H::Node,
) -> Result<H::Node, HostError> {
    let export = work_dir.join(EXPORT_NAME);
    host.export_mesh(&node, &export)
        .context("Failed to export STL")?;
    info!("Exported model to: {}", export.display());

    let settings = host.settings();
    let params = OptimizeParams {
        layer_height: settings.layer_height.unwrap_or(config.layer_height),
        nozzle_diameter: settings.nozzle_diameter.unwrap_or(config.nozzle_diameter),
        ..OptimizeParams::from_config(config)
    };
    let optimized = optimizer.optimize(&export, &params)?;

    let name = format!("{NAME_PREFIX}{}", host.name(&node));
    let placement = host.placement(&node);
    let replacement = host
        .replace(&node, &optimized, name, placement)
        .context("Failed to load optimized model")?;
    info!("Loaded optimized model into scene");

    Ok(replacement)
}

fn failure_message(err: &HostError) -> String {
    match err {
        HostError::Selection(message) => (*message).into(),
        HostError::MissingExecutable(_) => {
            "CurviSlicer binaries not found. Please check installation.".into()
        }
        err => format!("CurviSlicer processing failed: {err}"),
    }
}
