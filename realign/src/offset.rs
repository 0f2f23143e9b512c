use nalgebra::{Vector2, Vector3};
use tracing::info;

/// Translation taking the planar toolpath frame into the optimizer's mesh
/// frame. Only a translation is modelled, rotation or scaling between the two
/// frames goes undetected.
pub fn compute_offset(mesh_min: Vector3<f32>, toolpath_min: Vector2<f64>) -> Vector3<f64> {
    let mesh_min = mesh_min.cast::<f64>();
    let offset = Vector3::new(
        mesh_min.x - toolpath_min.x,
        mesh_min.y - toolpath_min.y,
        mesh_min.z,
    );

    info!("Calculated offset:");
    info!("  X = {:.6} - {:.6} = {:.6}", mesh_min.x, toolpath_min.x, offset.x);
    info!("  Y = {:.6} - {:.6} = {:.6}", mesh_min.y, toolpath_min.y, offset.y);
    info!("  Z = {:.6}", offset.z);

    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtracts_toolpath_corner() {
        let offset = compute_offset(Vector3::new(1.5, -2.0, 0.25), Vector2::new(5.0, 5.0));
        assert_eq!(offset, Vector3::new(-3.5, -7.0, 0.25));
    }

    #[test]
    fn z_comes_from_mesh_only() {
        let offset = compute_offset(Vector3::new(0.0, 0.0, 3.0), Vector2::new(100.0, 0.0));
        assert_eq!(offset.z, 3.0);
        assert_eq!(offset.x, -100.0);
    }
}
