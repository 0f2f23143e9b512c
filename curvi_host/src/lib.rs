//! Boundary between a host application (a slicer GUI) and the CurviSlicer
//! optimizer. The host is reached only through [`SceneHost`] and the
//! optimizer only through [`Optimizer`], so the realignment crates never
//! depend on either.

mod error;
pub mod optimizer;
pub mod scene;
mod workflow;

pub use error::HostError;
pub use optimizer::{CurviSlicer, OptimizeParams, Optimizer};
pub use scene::{HostSettings, Notification, NotificationLevel, Placement, SceneHost};
pub use workflow::{process_selection, process_with_curvislicer, show_settings};
