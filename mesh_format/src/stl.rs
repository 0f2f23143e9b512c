use common::serde::{Deserializer, ReadError};
use nalgebra::Vector3;
use tracing::debug;

use crate::FormatError;

/// Binary STL layout, all values little endian:
/// ```text
/// UINT8[80]    – Header                 - 80 bytes
/// UINT32       – Number of triangles    - 04 bytes
/// foreach triangle                      - 50 bytes
///     REAL32[3] – Normal vector         - 12 bytes
///     REAL32[3] – Vertex 1              - 12 bytes
///     REAL32[3] – Vertex 2              - 12 bytes
///     REAL32[3] – Vertex 3              - 12 bytes
///     UINT16    – Attribute byte count  - 02 bytes
/// end
/// ```
/// Anything after the last declared triangle is ignored.
pub fn min_bounds<T: Deserializer>(des: &mut T) -> Result<Vector3<f32>, FormatError> {
    des.advance_by(80).map_err(FormatError::TruncatedHeader)?;
    let tri_count = des.read_u32_le().map_err(FormatError::TruncatedHeader)?;
    if tri_count == 0 {
        return Err(FormatError::Empty);
    }

    debug!("Reading {tri_count} triangles");

    let mut min = Vector3::repeat(f32::INFINITY);
    for i in 0..tri_count {
        let truncated = |source| FormatError::Truncated {
            declared: tri_count,
            complete: i,
            source,
        };

        des.advance_by(4 * 3).map_err(truncated)?;
        for _ in 0..3 {
            let vertex = des_vec3f_bin(des).map_err(truncated)?;
            min = min.inf(&vertex);
        }
        des.advance_by(2).map_err(truncated)?;
    }

    Ok(min)
}

fn des_vec3f_bin<T: Deserializer>(des: &mut T) -> Result<Vector3<f32>, ReadError> {
    Ok(Vector3::new(
        des.read_f32_le()?,
        des.read_f32_le()?,
        des.read_f32_le()?,
    ))
}

/// Encodes triangles as a binary STL with zeroed normals and attributes.
#[cfg(any(test, feature = "test-utils"))]
pub fn encode(triangles: &[[[f32; 3]; 3]]) -> Vec<u8> {
    let mut out = vec![0; 80];
    out.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
    for triangle in triangles {
        out.extend_from_slice(&[0; 12]);
        for component in triangle.iter().flatten() {
            out.extend_from_slice(&component.to_le_bytes());
        }
        out.extend_from_slice(&[0; 2]);
    }
    out
}

#[cfg(test)]
mod tests {
    use common::serde::SliceDeserializer;
    use proptest::{array::uniform3, prelude::*};

    use super::*;

    fn min_of(data: &[u8]) -> Result<Vector3<f32>, FormatError> {
        min_bounds(&mut SliceDeserializer::new(data))
    }

    #[test]
    fn minima_come_from_different_vertices() {
        let data = encode(&[
            [[3.0, 0.0, 9.0], [4.0, 4.0, 4.0], [5.0, 5.0, 5.0]],
            [[7.0, 7.0, 7.0], [-2.0, 8.0, 8.0], [6.0, 6.0, -1.5]],
        ]);
        assert_eq!(min_of(&data).unwrap(), Vector3::new(-2.0, 0.0, -1.5));
    }

    #[test]
    fn normal_and_attribute_bytes_are_ignored() {
        let mut data = encode(&[[[1.0, 1.0, 1.0], [2.0, 2.0, 2.0], [3.0, 3.0, 3.0]]]);
        data[84..96].copy_from_slice(&[0xFF; 12]);
        data[132..134].copy_from_slice(&[0xFF; 2]);
        assert_eq!(min_of(&data).unwrap(), Vector3::repeat(1.0));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut data = encode(&[[[1.0, 2.0, 3.0], [2.0, 2.0, 2.0], [3.0, 3.0, 3.0]]]);
        data.extend_from_slice(b"garbage after the last record");
        assert_eq!(min_of(&data).unwrap(), Vector3::new(1.0, 2.0, 2.0));
    }

    #[test]
    fn truncated_record_fails() {
        let data = encode(&[
            [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]],
            [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]],
        ]);

        for cut in [data.len() - 1, data.len() - 30, 84 + 50, 84 + 10] {
            let err = min_of(&data[..cut]).unwrap_err();
            let expected = if cut >= 84 + 50 { 1 } else { 0 };
            assert!(
                matches!(err, FormatError::Truncated { declared: 2, complete, .. } if complete == expected),
                "cut at {cut} gave {err:?}"
            );
        }
    }

    #[test]
    fn declared_count_larger_than_file() {
        let mut data = encode(&[[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]]]);
        data[80..84].copy_from_slice(&5u32.to_le_bytes());
        assert!(matches!(
            min_of(&data),
            Err(FormatError::Truncated {
                declared: 5,
                complete: 1,
                ..
            })
        ));
    }

    #[test]
    fn short_header_fails() {
        assert!(matches!(
            min_of(&[0; 82]),
            Err(FormatError::TruncatedHeader(_))
        ));
    }

    #[test]
    fn empty_mesh_fails() {
        assert!(matches!(min_of(&encode(&[])), Err(FormatError::Empty)));
    }

    fn arb_triangles() -> impl Strategy<Value = Vec<[[f32; 3]; 3]>> {
        let vertex = uniform3(-1000.0f32..1000.0);
        proptest::collection::vec(uniform3(vertex), 1..64)
    }

    proptest! {
        #[test]
        fn matches_true_vertex_minimum(triangles in arb_triangles()) {
            let min = min_of(&encode(&triangles)).unwrap();
            let vertices = triangles.iter().flatten().collect::<Vec<_>>();

            for axis in 0..3 {
                prop_assert!(vertices.iter().all(|v| min[axis] <= v[axis]));
                prop_assert!(vertices.iter().any(|v| min[axis] == v[axis]));
            }
        }
    }
}
