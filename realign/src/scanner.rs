//! Reads the planar toolpath for the values the offset is derived from: the
//! declared layer height, the corner of the first wall/skin region and the
//! line where the first printed layer starts.

use std::sync::LazyLock;

use common::config::ToolpathConfig;
use nalgebra::Vector2;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::{
    error::{RealignError, Result},
    line::{classify, LineKind},
};

static LAYER_HEIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*;+\s*Layer height:\s*([\d.]+)").unwrap());

// Unsigned only. A negative coordinate never matches, so a reference region
// lying below zero on either axis produces no samples.
static X_PARAM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"X([\d.]+)").unwrap());
static Y_PARAM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Y([\d.]+)").unwrap());

/// Minimum X and Y seen in the first wall/skin region. The two minima are
/// tracked independently and may come from different moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reference {
    pub min: Vector2<f64>,
    pub moves: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Survey {
    pub layer_height: f64,
    pub reference: Reference,
    /// Index of the first line holding the first layer marker.
    pub first_layer: Option<usize>,
}

pub struct LayerHeightProbe {
    found: Option<f64>,
}

pub struct WallScanner<'a> {
    config: &'a ToolpathConfig,
    in_reference: bool,
    min: Vector2<f64>,
    moves: usize,
    finished: bool,
}

pub struct FirstLayerProbe<'a> {
    marker: &'a str,
    found: Option<usize>,
}

impl LayerHeightProbe {
    pub fn new() -> Self {
        Self { found: None }
    }

    pub fn feed(&mut self, line: &str) {
        if self.found.is_some() {
            return;
        }

        let Some(captures) = LAYER_HEIGHT.captures(line) else {
            return;
        };

        match captures[1].parse::<f64>() {
            Ok(height) => self.found = Some(height),
            Err(_) => warn!("Ignoring unparsable layer height in `{}`", line.trim()),
        }
    }

    pub fn finish(self, default: f64) -> f64 {
        self.found.unwrap_or(default)
    }
}

impl<'a> WallScanner<'a> {
    pub fn new(config: &'a ToolpathConfig) -> Self {
        Self {
            config,
            in_reference: false,
            min: Vector2::repeat(f64::INFINITY),
            moves: 0,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn feed(&mut self, line: &str) {
        if self.finished {
            return;
        }

        let trimmed = match classify(line, self.config) {
            LineKind::RegionMarker(tag) if tag.is_reference() => {
                self.in_reference = true;
                return;
            }
            LineKind::RegionMarker(_) => {
                self.in_reference = false;
                // The first reference region has ended.
                self.finished = self.moves > 0;
                return;
            }
            _ if !self.in_reference => return,
            LineKind::Command(trimmed) => trimmed,
            LineKind::Blank | LineKind::Comment => return,
        };

        let prefixes = &self.config.reference_prefixes;
        if !prefixes.iter().any(|p| trimmed.starts_with(p.as_str())) {
            return;
        }

        let (Some(x), Some(y)) = (param(&X_PARAM, trimmed), param(&Y_PARAM, trimmed)) else {
            return;
        };

        self.min = self.min.inf(&Vector2::new(x, y));
        self.moves += 1;
        self.finished = self.moves >= self.config.max_reference_moves;
    }

    pub fn finish(self) -> Result<Reference> {
        if self.moves == 0 {
            return Err(RealignError::NoReferenceFound);
        }

        info!(
            "First wall minimum: X={:.2}, Y={:.2} (from {} moves)",
            self.min.x, self.min.y, self.moves
        );
        Ok(Reference {
            min: self.min,
            moves: self.moves,
        })
    }
}

impl<'a> FirstLayerProbe<'a> {
    pub fn new(config: &'a ToolpathConfig) -> Self {
        Self {
            marker: &config.first_layer_marker,
            found: None,
        }
    }

    pub fn feed(&mut self, index: usize, line: &str) {
        if self.found.is_none() && line.contains(self.marker) {
            self.found = Some(index);
        }
    }

    pub fn finish(self) -> Option<usize> {
        self.found
    }
}

impl Default for LayerHeightProbe {
    fn default() -> Self {
        Self::new()
    }
}

fn param(pattern: &Regex, line: &str) -> Option<f64> {
    pattern.captures(line)?[1].parse().ok()
}

/// Collects everything the transform needs from the toolpath in one pass.
pub fn survey(lines: &[&str], config: &ToolpathConfig) -> Result<Survey> {
    let mut layer_height = LayerHeightProbe::new();
    let mut walls = WallScanner::new(config);
    let mut first_layer = FirstLayerProbe::new(config);

    for (index, line) in lines.iter().enumerate() {
        layer_height.feed(line);
        walls.feed(line);
        first_layer.feed(index, line);
    }

    let layer_height = layer_height.finish(config.default_layer_height);
    info!("Layer height: {layer_height}");

    let first_layer = first_layer.finish();
    match first_layer {
        Some(index) => debug!("First layer starts at line {}", index + 1),
        None => warn!(
            "No `{}` marker found, only comments will be kept",
            config.first_layer_marker
        ),
    }

    Ok(Survey {
        layer_height,
        reference: walls.finish()?,
        first_layer,
    })
}

/// Returns the height declared by the first `Layer height:` comment, or the
/// configured default when there is none.
pub fn extract_layer_height(lines: &[&str], config: &ToolpathConfig) -> f64 {
    let mut probe = LayerHeightProbe::new();
    lines.iter().for_each(|line| probe.feed(line));
    probe.finish(config.default_layer_height)
}

pub fn find_first_wall_coordinates(lines: &[&str], config: &ToolpathConfig) -> Result<Reference> {
    let mut scanner = WallScanner::new(config);
    for line in lines {
        scanner.feed(line);
        if scanner.is_finished() {
            break;
        }
    }
    scanner.finish()
}

pub fn first_layer_index(lines: &[&str], config: &ToolpathConfig) -> Option<usize> {
    lines.iter().position(|line| line.contains(&config.first_layer_marker))
}
