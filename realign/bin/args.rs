use std::{ffi::OsString, path::PathBuf};

use clap::{error::ErrorKind, CommandFactory, Parser};
use realign::error::RealignError;
use tracing::level_filters::LevelFilter;

#[derive(Debug, Parser)]
#[command(version)]
/// Realigns planar slicer G-code with a mesh reshaped by CurviSlicer.
pub struct Args {
    /// Optimized mesh (binary .stl) produced by the non-planar optimizer.
    pub mesh: PathBuf,
    /// G-code produced by the planar slicer for the original mesh.
    pub input: PathBuf,
    /// Where to write the realigned G-code.
    pub output: PathBuf,

    #[arg(long)]
    /// Optional TOML file overriding the toolpath conventions.
    pub config: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    /// Increase logging verbosity, can be repeated.
    pub verbose: u8,
}

impl Args {
    /// Parses the command line. Help and version requests exit here, any
    /// other parse failure is returned as a usage error.
    pub fn parse_or_usage() -> Result<Self, RealignError> {
        Self::parse_or_usage_from(std::env::args_os())
    }

    pub fn parse_or_usage_from<I, T>(args: I) -> Result<Self, RealignError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(args) => Ok(args),
            Err(err)
                if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) =>
            {
                err.exit()
            }
            Err(_) => Err(RealignError::Usage(Self::command().render_usage().to_string())),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

/// Process exit code for a failed run: 2 for usage errors, 1 otherwise.
pub fn exit_code(err: &RealignError) -> i32 {
    match err {
        RealignError::Usage(_) => 2,
        _ => 1,
    }
}
