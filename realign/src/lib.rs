//! Realigns G-code from a planar slicer with a mesh reshaped by a non-planar
//! optimizer. The offset between the two frames is found from the mesh's
//! minimum vertex and the corner of the first wall/skin region, then the
//! toolpath is stripped of everything that only makes sense on a flat bed
//! (start G-code, skirt, brim, temperature and homing commands) and written
//! behind a small header carrying the offset and layer height.
//!
//! Running the transform on its own output is not supported. The output
//! starts with `o`/`t` directives instead of a slicer preamble and has no
//! guaranteed first layer marker.

use std::{fs, path::Path};

use common::config::ToolpathConfig;
use nalgebra::{Vector2, Vector3};

pub mod compose;
pub mod error;
pub mod filter;
pub mod line;
pub mod offset;
pub mod scanner;

use compose::Header;
use error::{RealignError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub mesh_min: Vector3<f32>,
    pub toolpath_min: Vector2<f64>,
    pub reference_moves: usize,
    pub offset: Vector3<f64>,
    pub layer_height: f64,
    pub kept: usize,
    pub removed: usize,
}

/// Reads `mesh` and `input`, then writes the realigned toolpath to `output`.
/// Nothing is written unless both inputs were read and scanned successfully.
pub fn transform(
    mesh: &Path,
    input: &Path,
    output: &Path,
    config: &ToolpathConfig,
) -> Result<Summary> {
    let mesh_min = mesh_format::read_min_bounds(mesh).map_err(|source| RealignError::Format {
        path: mesh.to_owned(),
        source,
    })?;

    let text = fs::read_to_string(input).map_err(|source| RealignError::Io {
        path: input.to_owned(),
        source,
    })?;
    let lines = line::split_lines(&text);

    let survey = scanner::survey(&lines, config)?;
    let offset = offset::compute_offset(mesh_min, survey.reference.min);
    let filtered = filter::filter(&lines, survey.first_layer, config);

    let header = Header {
        offset,
        layer_height: survey.layer_height,
        provenance: &config.provenance,
        newline: line::line_ending(&lines),
    };
    compose::write_output(output, &header, &filtered.lines)?;

    Ok(Summary {
        mesh_min,
        toolpath_min: survey.reference.min,
        reference_moves: survey.reference.moves,
        offset,
        layer_height: survey.layer_height,
        kept: filtered.lines.len(),
        removed: filtered.removed(),
    })
}
