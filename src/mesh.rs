//! Turning index/vertex buffers into triangles.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec3A};

use crate::{
    builder::check_triangle_count,
    error::{BvhError, Result},
    triangle::Triangle,
};

/// Anything that carries a 3D position can be used as a vertex.
pub trait VertexPosition {
    fn position(&self) -> Vec3A;
}

impl VertexPosition for Vec3A {
    #[inline(always)]
    fn position(&self) -> Vec3A {
        *self
    }
}

impl VertexPosition for Vec3 {
    #[inline(always)]
    fn position(&self) -> Vec3A {
        (*self).into()
    }
}

impl VertexPosition for [f32; 3] {
    #[inline(always)]
    fn position(&self) -> Vec3A {
        Vec3A::from_array(*self)
    }
}

/// Interleaved vertex layout matching a typical position + normal GPU vertex buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    pub fn new(position: Vec3A, normal: Vec3A) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }

    #[inline(always)]
    pub fn normal(&self) -> Vec3A {
        Vec3A::from_array(self.normal)
    }
}

impl VertexPosition for MeshVertex {
    #[inline(always)]
    fn position(&self) -> Vec3A {
        Vec3A::from_array(self.position)
    }
}

/// Borrowed view of an indexed triangle mesh.
#[derive(Clone, Copy, Debug)]
pub struct Mesh<'a, V = MeshVertex> {
    pub indices: &'a [u32],
    pub vertices: &'a [V],
}

impl<'a, V: VertexPosition> Mesh<'a, V> {
    pub fn new(indices: &'a [u32], vertices: &'a [V]) -> Self {
        Self { indices, vertices }
    }

    /// See [`extract_triangles`].
    pub fn triangles(&self) -> Result<Vec<Triangle>> {
        extract_triangles(self.indices, self.vertices)
    }
}

impl<'a> Mesh<'a, MeshVertex> {
    /// Reinterprets raw `u32` index bytes and interleaved [`MeshVertex`] bytes without copying.
    /// Fails if a buffer's length or alignment doesn't fit its element type.
    pub fn from_bytes(index_bytes: &'a [u8], vertex_bytes: &'a [u8]) -> Result<Self> {
        let indices =
            bytemuck::try_cast_slice(index_bytes).map_err(|e| BvhError::InvalidBuffer {
                buffer: "index",
                reason: e.to_string(),
            })?;
        let vertices =
            bytemuck::try_cast_slice(vertex_bytes).map_err(|e| BvhError::InvalidBuffer {
                buffer: "vertex",
                reason: e.to_string(),
            })?;
        Ok(Self { indices, vertices })
    }
}

/// Builds one [`Triangle`] per consecutive index triple, in index buffer order.
/// Each triangle's `source_index` is its triple's position in `indices`.
///
/// The whole index buffer is validated up front: a count that isn't a multiple of 3 or an
/// index past the end of `vertices` is an error and no triangles are returned.
pub fn extract_triangles<V: VertexPosition>(
    indices: &[u32],
    vertices: &[V],
) -> Result<Vec<Triangle>> {
    if indices.len() % 3 != 0 {
        return Err(BvhError::IndexCountNotMultipleOfThree(indices.len()));
    }
    check_triangle_count(indices.len() / 3)?;

    indices
        .chunks_exact(3)
        .enumerate()
        .map(|(triangle, tri)| {
            let fetch = |index: u32| {
                vertices
                    .get(index as usize)
                    .map(VertexPosition::position)
                    .ok_or(BvhError::IndexOutOfRange {
                        triangle,
                        index,
                        vertex_count: vertices.len(),
                    })
            };
            Ok(Triangle::new(
                fetch(tri[0])?,
                fetch(tri[1])?,
                fetch(tri[2])?,
                triangle as u32,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec3a;

    fn quad() -> (Vec<u32>, Vec<Vec3A>) {
        let vertices = vec![
            vec3a(0.0, 0.0, 0.0),
            vec3a(1.0, 0.0, 0.0),
            vec3a(1.0, 1.0, 0.0),
            vec3a(0.0, 1.0, 0.0),
        ];
        (vec![0, 1, 2, 0, 2, 3], vertices)
    }

    #[test]
    fn extracts_in_order() {
        let (indices, vertices) = quad();
        let tris = extract_triangles(&indices, &vertices).unwrap();
        assert_eq!(tris.len(), 2);
        assert_eq!(tris[0].source_index, 0);
        assert_eq!(tris[1].source_index, 1);
        assert_eq!(tris[1].v0, vertices[0]);
        assert_eq!(tris[1].v1, vertices[2]);
        assert_eq!(tris[1].v2, vertices[3]);
    }

    #[test]
    fn rejects_partial_triangle() {
        let (mut indices, vertices) = quad();
        indices.push(1);
        assert_eq!(
            extract_triangles(&indices, &vertices),
            Err(BvhError::IndexCountNotMultipleOfThree(7))
        );
    }

    #[test]
    fn rejects_out_of_range_index() {
        let (mut indices, vertices) = quad();
        indices[4] = 9;
        assert_eq!(
            extract_triangles(&indices, &vertices),
            Err(BvhError::IndexOutOfRange {
                triangle: 1,
                index: 9,
                vertex_count: 4,
            })
        );
    }

    #[test]
    fn empty_buffers_extract_nothing() {
        let vertices: [[f32; 3]; 0] = [];
        assert!(extract_triangles(&[], &vertices).unwrap().is_empty());
    }

    #[test]
    fn mesh_from_bytes() {
        let vertices = [
            MeshVertex::new(vec3a(0.0, 0.0, 0.0), Vec3A::Z),
            MeshVertex::new(vec3a(1.0, 0.0, 0.0), Vec3A::Z),
            MeshVertex::new(vec3a(0.0, 1.0, 0.0), Vec3A::Z),
        ];
        let indices = [0u32, 1, 2];
        let mesh = Mesh::<MeshVertex>::from_bytes(
            bytemuck::cast_slice(&indices),
            bytemuck::cast_slice(&vertices),
        )
        .unwrap();
        let tris = mesh.triangles().unwrap();
        assert_eq!(tris.len(), 1);
        assert_eq!(tris[0].v1, vec3a(1.0, 0.0, 0.0));
        assert_eq!(mesh.vertices[2].normal(), Vec3A::Z);
    }

    #[test]
    fn mesh_from_truncated_bytes() {
        let indices = [0u32, 1, 2];
        let bytes: &[u8] = bytemuck::cast_slice(&indices);
        let err = Mesh::<MeshVertex>::from_bytes(&bytes[..5], &[]).unwrap_err();
        assert!(matches!(err, BvhError::InvalidBuffer { buffer: "index", .. }));
    }
}
