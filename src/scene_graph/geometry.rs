use glam::Vec3;
use gltf::buffer;
use id_arena::Id;

pub type GeometryId = Id<BufferGeometry>;

pub type Buffers<'a> = &'a [buffer::Data];

/// Vertex positions plus an optional triangle index buffer.
///
/// Either attribute may be missing. A geometry without positions is kept in
/// the scene but cannot be exported.
#[derive(Debug, Clone, Default)]
pub struct BufferGeometry {
    pub position: Option<Vec<Vec3>>,
    pub index: Option<Vec<u32>>,
}

impl BufferGeometry {
    #[allow(dead_code)]
    pub fn indexed(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            position: Some(positions),
            index: Some(indices),
        }
    }

    #[allow(dead_code)]
    pub fn non_indexed(positions: Vec<Vec3>) -> Self {
        Self {
            position: Some(positions),
            index: None,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.position.as_ref().map_or(0, Vec::len)
    }

    pub fn from_gltf(primitive: &gltf::Primitive, buffers: Buffers) -> Self {
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &**data));

        let position = reader
            .read_positions()
            .map(|positions| positions.map(Vec3::from).collect::<Vec<Vec3>>());
        let index = reader
            .read_indices()
            .map(|indices| indices.into_u32().collect::<Vec<u32>>());

        Self { position, index }
    }
}
