use std::path::Path;

use anyhow::Result;
use nalgebra::Vector3;

/// Where an object sits in the host scene. Rotation is in Euler angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vector3<f32>,
    pub scale: Vector3<f32>,
    pub rotation: Vector3<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub level: NotificationLevel,
    pub body: String,
}

/// Print settings the host currently has active. Values the host does not
/// know fall back to the optimizer configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HostSettings {
    pub layer_height: Option<f32>,
    pub nozzle_diameter: Option<f32>,
}

/// The slice of a host application the CurviSlicer workflow needs.
pub trait SceneHost {
    type Node;

    fn selection(&self) -> Vec<Self::Node>;
    fn name(&self, node: &Self::Node) -> String;
    fn placement(&self, node: &Self::Node) -> Placement;

    /// Writes `node` to `path` as a binary STL.
    fn export_mesh(&mut self, node: &Self::Node, path: &Path) -> Result<()>;

    /// Swaps `old` for a new object built from the mesh at `mesh`. Either the
    /// replacement fully happens or the scene is left as it was.
    fn replace(
        &mut self,
        old: &Self::Node,
        mesh: &Path,
        name: String,
        placement: Placement,
    ) -> Result<Self::Node>;

    fn notify(&mut self, notification: Notification);

    /// Hides a notification previously passed to [`SceneHost::notify`].
    fn dismiss(&mut self, _notification: &Notification) {}

    fn settings(&self) -> HostSettings {
        HostSettings::default()
    }
}

impl Notification {
    pub fn simple(title: impl Into<String>, level: NotificationLevel, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            level,
            body: body.into(),
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            scale: Vector3::repeat(1.0),
            rotation: Vector3::zeros(),
        }
    }
}
