use std::{io, path::PathBuf};

use mesh_format::FormatError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RealignError {
    #[error("failed to read mesh `{}`", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
    #[error("could not find any wall or skin moves to use as the reference corner")]
    NoReferenceFound,
    #[error("{0}")]
    Usage(String),
    #[error("failed to access `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, RealignError>;
