use std::{fs::File, io::BufReader, path::Path};

use common::serde::{ReadError, ReaderDeserializer};
use nalgebra::Vector3;
use thiserror::Error;
use tracing::info;

pub mod stl;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("file is too short to hold an STL header: {0}")]
    TruncatedHeader(#[source] ReadError),
    #[error("mesh declares {declared} triangles but only {complete} are present")]
    Truncated {
        declared: u32,
        complete: u32,
        #[source]
        source: ReadError,
    },
    #[error("mesh declares no triangles")]
    Empty,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reads a binary STL file from disk and returns the minimum of each
/// coordinate over all of its vertices.
pub fn read_min_bounds(path: &Path) -> Result<Vector3<f32>, FormatError> {
    let mut des = ReaderDeserializer::new(BufReader::new(File::open(path)?));
    let min = stl::min_bounds(&mut des)?;
    info!(
        "Mesh minimum: X={:.6}, Y={:.6}, Z={:.6}",
        min.x, min.y, min.z
    );
    Ok(min)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::stl::encode;

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("after.stl");
        fs::write(
            &path,
            encode(&[[[1.0, 2.0, 3.0], [-1.0, 5.0, 0.5], [4.0, -2.0, 9.0]]]),
        )
        .unwrap();

        let min = read_min_bounds(&path).unwrap();
        assert_eq!(min, Vector3::new(-1.0, -2.0, 0.5));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_min_bounds(&dir.path().join("missing.stl")).unwrap_err();
        assert!(matches!(err, FormatError::Io(_)));
    }
}
