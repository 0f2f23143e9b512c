use std::{io, path::PathBuf, time::Duration};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("CurviSlicer executable not found: {0}")]
    MissingExecutable(String),
    #[error("CurviSlicer failed with {}", exit_code(.code))]
    ExternalToolFailure { code: Option<i32>, stderr: String },
    #[error("CurviSlicer timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("Optimized STL not found: {}", .0.display())]
    MissingResult(PathBuf),
    #[error("{0}")]
    Selection(&'static str),
    #[error(transparent)]
    Scene(#[from] anyhow::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "no exit code (terminated by signal)".into(),
    }
}
