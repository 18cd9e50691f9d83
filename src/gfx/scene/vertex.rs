//! # Vertex Data Structures
//!
//! GPU vertex format for the scene pipeline.

/// A 3D vertex with position, normal, base color and texture coordinate
///
/// `#[repr(C)]` keeps the field order the vertex layout in [`Vertex3D::desc`]
/// describes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// RGBA base color, multiplied with the sampled texture
    pub color: [f32; 4],
    pub tex_coords: [f32; 2],
}

impl Vertex3D {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x4,
        3 => Float32x2
    ];

    /// Vertex buffer layout:
    /// - location 0: position (Float32x3)
    /// - location 1: normal (Float32x3)
    /// - location 2: color (Float32x4)
    /// - location 3: texture coordinate (Float32x2)
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride_covers_all_attributes() {
        let layout = Vertex3D::desc();
        assert_eq!(layout.array_stride, 48);
        assert_eq!(layout.attributes.len(), 4);
        assert_eq!(layout.attributes[2].offset, 24);
        assert_eq!(layout.attributes[3].offset, 40);
    }
}
