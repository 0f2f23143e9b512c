use std::{
    env::consts::OS,
    io::Read,
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use common::config::OptimizerConfig;
use tracing::{error, info};

use crate::HostError;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Parameters passed to the optimizer for a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeParams {
    pub volumic: bool,
    pub nozzle_diameter: f32,
    pub layer_height: f32,
    pub filament_diameter: f32,
    pub ironing: bool,
    pub timeout: Duration,
}

/// Reshapes a mesh for non-planar printing, returning the path of the
/// reshaped mesh.
pub trait Optimizer {
    fn optimize(&self, mesh: &Path, params: &OptimizeParams) -> Result<PathBuf, HostError>;
}

impl<T: Optimizer + ?Sized> Optimizer for &T {
    fn optimize(&self, mesh: &Path, params: &OptimizeParams) -> Result<PathBuf, HostError> {
        (**self).optimize(mesh, params)
    }
}

/// Runs the CurviSlicer launcher script as a subprocess.
#[derive(Debug, Clone)]
pub struct CurviSlicer {
    launcher: PathBuf,
    result_file: String,
}

impl OptimizeParams {
    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self {
            volumic: config.volumic,
            nozzle_diameter: config.nozzle_diameter,
            layer_height: config.layer_height,
            filament_diameter: config.filament_diameter,
            ironing: config.ironing,
            timeout: config.timeout(),
        }
    }

    /// Positional arguments in the order the launcher expects, the mesh path
    /// is appended after these.
    pub fn to_args(&self) -> [String; 5] {
        [
            flag(self.volumic),
            self.nozzle_diameter.to_string(),
            self.layer_height.to_string(),
            self.filament_diameter.to_string(),
            flag(self.ironing),
        ]
    }
}

impl CurviSlicer {
    pub fn new(launcher: PathBuf, result_file: impl Into<String>) -> Self {
        Self {
            launcher,
            result_file: result_file.into(),
        }
    }

    /// Finds the launcher for the current platform under
    /// `<bin_dir>/<platform>/`.
    pub fn locate(bin_dir: &Path, result_file: impl Into<String>) -> Result<Self, HostError> {
        let (platform, exe) = match OS {
            "windows" => ("windows", "curvislice.bat"),
            "linux" => ("linux", "curvislice.sh"),
            other => {
                return Err(HostError::MissingExecutable(format!(
                    "unsupported platform `{other}`"
                )))
            }
        };

        let launcher = bin_dir.join(platform).join(exe);
        if !launcher.is_file() {
            return Err(HostError::MissingExecutable(launcher.display().to_string()));
        }

        Ok(Self::new(launcher, result_file))
    }

    /// Uses the configured binary directory, falling back to
    /// `<data dir>/curvislicer/bin`.
    pub fn from_config(config: &OptimizerConfig) -> Result<Self, HostError> {
        let bin_dir = match &config.bin_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .map(|dir| dir.join("curvislicer").join("bin"))
                .ok_or_else(|| HostError::MissingExecutable("no data directory".into()))?,
        };

        Self::locate(&bin_dir, config.result_file.as_str())
    }

    /// Platform directory holding the launcher.
    pub fn bin_dir(&self) -> &Path {
        self.launcher.parent().unwrap_or(Path::new(""))
    }

    /// CurviSlicer writes its results into a directory named after the input
    /// mesh, next to it.
    pub fn result_path(&self, mesh: &Path) -> PathBuf {
        let stem = mesh.file_stem().unwrap_or_default();
        let dir = mesh.parent().unwrap_or(Path::new(""));
        dir.join(stem).join(&self.result_file)
    }

    fn command(&self, mesh: &Path, params: &OptimizeParams) -> Command {
        let mut command = if self.launcher.extension().is_some_and(|ext| ext == "sh") {
            let mut command = Command::new("sh");
            command.arg(&self.launcher);
            command
        } else {
            Command::new(&self.launcher)
        };

        command.args(params.to_args()).arg(mesh);
        if let Some(dir) = self.launcher.parent() {
            command.current_dir(dir);
        }
        command
    }
}

impl Optimizer for CurviSlicer {
    fn optimize(&self, mesh: &Path, params: &OptimizeParams) -> Result<PathBuf, HostError> {
        let command = self.command(mesh, params);
        info!(
            "Running CurviSlicer: {} {} {}",
            self.launcher.display(),
            params.to_args().join(" "),
            mesh.display()
        );

        let output = run_with_timeout(command, params.timeout)?;
        if !output.status.success() {
            error!("CurviSlicer stderr: {}", output.stderr);
            return Err(HostError::ExternalToolFailure {
                code: output.status.code(),
                stderr: output.stderr,
            });
        }

        info!("CurviSlicer optimization complete");
        let result = self.result_path(mesh);
        if !result.is_file() {
            return Err(HostError::MissingResult(result));
        }

        Ok(result)
    }
}

struct Output {
    status: ExitStatus,
    stderr: String,
}

fn run_with_timeout(mut command: Command, timeout: Duration) -> Result<Output, HostError> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| HostError::MissingExecutable(err.to_string()))?;

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let status = wait_deadline(&mut child, Instant::now() + timeout)?;
    let Some(status) = status else {
        child.kill()?;
        child.wait()?;
        return Err(HostError::Timeout(timeout));
    };

    let collect = |handle: Option<JoinHandle<String>>| {
        handle.and_then(|x| x.join().ok()).unwrap_or_default()
    };
    let stdout = collect(stdout);
    if !stdout.is_empty() {
        info!("CurviSlicer stdout: {}", stdout.trim_end());
    }

    Ok(Output {
        status,
        stderr: collect(stderr),
    })
}

fn wait_deadline(child: &mut Child, deadline: Instant) -> Result<Option<ExitStatus>, HostError> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }

        if Instant::now() >= deadline {
            return Ok(None);
        }

        thread::sleep(POLL_INTERVAL);
    }
}

fn drain(mut pipe: impl Read + Send + 'static) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(err) = pipe.read_to_end(&mut buf) {
            error!("Failed to read CurviSlicer output: {err}");
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn flag(value: bool) -> String {
    String::from(if value { "1" } else { "0" })
}
