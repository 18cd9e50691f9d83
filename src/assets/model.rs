//! CPU-side model data and the OBJ/glTF readers that produce it

use std::{path::Path, sync::Arc};

use cgmath::{InnerSpace, Matrix, Matrix3, Matrix4, SquareMatrix, Vector3, Vector4};
use log::{debug, info};

use crate::{error::AssetError, walk::collision::Aabb};

/// Base color for meshes that carry no material
pub const DEFAULT_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

/// Decoded RGBA8 image, row-major from the top-left texel
#[derive(Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for TextureData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureData")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl TextureData {
    /// Expands a decoded glTF image to RGBA8
    ///
    /// Returns `None` for 16-bit and float formats, which the showroom
    /// models do not use.
    pub fn from_gltf(image: &gltf::image::Data) -> Option<Self> {
        use gltf::image::Format;

        let pixels = &image.pixels;
        let rgba = match image.format {
            Format::R8G8B8A8 => pixels.clone(),
            Format::R8G8B8 => pixels
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], u8::MAX])
                .collect(),
            Format::R8G8 => pixels
                .chunks_exact(2)
                .flat_map(|p| [p[0], p[0], p[0], p[1]])
                .collect(),
            Format::R8 => pixels.iter().flat_map(|&l| [l, l, l, u8::MAX]).collect(),
            other => {
                debug!("Skipping {:?} texture", other);
                return None;
            }
        };

        let texture = Self {
            width: image.width,
            height: image.height,
            rgba,
        };
        texture.is_complete().then_some(texture)
    }

    fn is_complete(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.rgba.len() == self.width as usize * self.height as usize * 4
    }
}

/// One drawable triangle list with a base color and an optional base-color texture
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    /// One per position; all zero for untextured meshes
    pub tex_coords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub color: [f32; 4],
    /// Multiplied with `color`; shared between meshes using the same image
    pub texture: Option<Arc<TextureData>>,
}

impl MeshData {
    /// Builds a mesh, generating smooth normals when none are supplied
    pub fn new(
        positions: Vec<[f32; 3]>,
        normals: Option<Vec<[f32; 3]>>,
        indices: Vec<u32>,
        color: [f32; 4],
    ) -> Self {
        let normals = match normals {
            Some(normals) if normals.len() == positions.len() => normals,
            _ => smooth_normals(&positions, &indices),
        };
        Self {
            tex_coords: vec![[0.0; 2]; positions.len()],
            positions,
            normals,
            indices,
            color,
            texture: None,
        }
    }

    /// Attaches a base-color texture; ignored unless every vertex has a coordinate
    pub fn with_texture(mut self, tex_coords: Vec<[f32; 2]>, texture: Arc<TextureData>) -> Self {
        if tex_coords.len() == self.positions.len() {
            self.tex_coords = tex_coords;
            self.texture = Some(texture);
        } else {
            debug!(
                "Dropping texture: {} coordinates for {} vertices",
                tex_coords.len(),
                self.positions.len()
            );
        }
        self
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A loaded model: its meshes, in model-local coordinates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelData {
    pub name: String,
    pub meshes: Vec<MeshData>,
}

impl ModelData {
    /// Axis-aligned bounds of every vertex, or `None` for an empty model
    pub fn bounds(&self) -> Option<Aabb> {
        let points: Vec<Vector3<f32>> = self
            .meshes
            .iter()
            .flat_map(|mesh| mesh.positions.iter())
            .map(|&p| Vector3::from(p))
            .collect();
        Aabb::from_points(&points)
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.positions.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MeshData::triangle_count).sum()
    }
}

/// Loads an `.obj`, `.gltf` or `.glb` file
pub fn load_model(path: impl AsRef<Path>) -> Result<ModelData, AssetError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let model = match extension.as_str() {
        "obj" => load_obj(path)?,
        "gltf" | "glb" => load_gltf(path)?,
        _ => {
            return Err(AssetError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            })
        }
    };

    if model.meshes.iter().all(|m| m.indices.is_empty()) {
        return Err(AssetError::Empty {
            path: path.to_path_buf(),
        });
    }

    info!(
        "Loaded {}: {} meshes, {} vertices, {} triangles",
        path.display(),
        model.meshes.len(),
        model.vertex_count(),
        model.triangle_count()
    );
    Ok(model)
}

fn model_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("model")
        .to_string()
}

fn load_obj(path: &Path) -> Result<ModelData, AssetError> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| AssetError::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    let materials = materials.unwrap_or_else(|err| {
        debug!("No materials for {}: {}", path.display(), err);
        Vec::new()
    });

    let meshes = models
        .iter()
        .map(|model| {
            let mesh = &model.mesh;
            let positions: Vec<[f32; 3]> = mesh
                .positions
                .chunks_exact(3)
                .map(|p| [p[0], p[1], p[2]])
                .collect();
            let normals = (!mesh.normals.is_empty())
                .then(|| mesh.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]).collect());

            let color = mesh
                .material_id
                .and_then(|id| materials.get(id))
                .map(|mtl| {
                    let diffuse = mtl.diffuse.unwrap_or([0.8, 0.8, 0.8]);
                    [diffuse[0], diffuse[1], diffuse[2], mtl.dissolve.unwrap_or(1.0)]
                })
                .unwrap_or(DEFAULT_COLOR);

            MeshData::new(positions, normals, mesh.indices.clone(), color)
        })
        .collect();

    Ok(ModelData {
        name: model_name(path),
        meshes,
    })
}

fn load_gltf(path: &Path) -> Result<ModelData, AssetError> {
    let (document, buffers, images) =
        gltf::import(path).map_err(|source| AssetError::Gltf {
            path: path.to_path_buf(),
            source,
        })?;
    let textures: Vec<Option<Arc<TextureData>>> = images
        .iter()
        .map(|image| TextureData::from_gltf(image).map(Arc::new))
        .collect();
    let sources = GltfSources {
        buffers: &buffers,
        textures: &textures,
    };

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next());

    let mut meshes = Vec::new();
    if let Some(scene) = scene {
        for node in scene.nodes() {
            collect_node(&node, Matrix4::identity(), &sources, &mut meshes);
        }
    }

    Ok(ModelData {
        name: model_name(path),
        meshes,
    })
}

/// Buffer and image data shared by every primitive in one glTF file
struct GltfSources<'a> {
    buffers: &'a [gltf::buffer::Data],
    textures: &'a [Option<Arc<TextureData>>],
}

/// Walks the node tree, baking each node's world transform into its meshes
fn collect_node(
    node: &gltf::Node,
    parent: Matrix4<f32>,
    sources: &GltfSources,
    meshes: &mut Vec<MeshData>,
) {
    let world = parent * Matrix4::from(node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                debug!(
                    "Skipping {:?} primitive in mesh '{}'",
                    primitive.mode(),
                    mesh.name().unwrap_or("unnamed")
                );
                continue;
            }
            if let Some(data) = read_primitive(&primitive, sources, world) {
                meshes.push(data);
            }
        }
    }

    for child in node.children() {
        collect_node(&child, world, sources, meshes);
    }
}

fn read_primitive(
    primitive: &gltf::Primitive,
    sources: &GltfSources,
    world: Matrix4<f32>,
) -> Option<MeshData> {
    let reader =
        primitive.reader(|buffer| sources.buffers.get(buffer.index()).map(|data| &data[..]));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()?
        .map(|p| transform_point(&world, p))
        .collect();

    let normal_matrix = normal_matrix(&world);
    let normals = reader.read_normals().map(|normals| {
        normals
            .map(|n| {
                let n = normal_matrix * Vector3::from(n);
                if n.magnitude2() > 0.0 {
                    n.normalize().into()
                } else {
                    n.into()
                }
            })
            .collect()
    });

    let mut indices: Vec<u32> = reader
        .read_indices()
        .map(|indices| indices.into_u32().collect())
        .unwrap_or_else(|| (0..positions.len() as u32).collect());

    // Mirroring transforms flip triangle winding
    if world.determinant() < 0.0 {
        for tri in indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
    }

    let pbr = primitive.material().pbr_metallic_roughness();
    let mesh = MeshData::new(positions, normals, indices, pbr.base_color_factor());

    let textured = pbr.base_color_texture().and_then(|info| {
        let texture = sources
            .textures
            .get(info.texture().source().index())?
            .clone()?;
        let tex_coords = reader.read_tex_coords(info.tex_coord())?.into_f32().collect();
        Some((tex_coords, texture))
    });

    Some(match textured {
        Some((tex_coords, texture)) => mesh.with_texture(tex_coords, texture),
        None => mesh,
    })
}

fn transform_point(m: &Matrix4<f32>, p: [f32; 3]) -> [f32; 3] {
    let v = m * Vector4::new(p[0], p[1], p[2], 1.0);
    [v.x, v.y, v.z]
}

/// Inverse-transpose of the upper 3x3, falling back to the plain 3x3 when singular
fn normal_matrix(m: &Matrix4<f32>) -> Matrix3<f32> {
    let linear = Matrix3::from_cols(m.x.truncate(), m.y.truncate(), m.z.truncate());
    linear
        .invert()
        .map(|inv| inv.transpose())
        .unwrap_or(linear)
}

/// Area-weighted vertex normals
pub fn smooth_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accum = vec![Vector3::new(0.0f32, 0.0, 0.0); positions.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let p0 = Vector3::from(positions[a]);
        let face = (Vector3::from(positions[b]) - p0).cross(Vector3::from(positions[c]) - p0);
        accum[a] += face;
        accum[b] += face;
        accum[c] += face;
    }

    accum
        .into_iter()
        .map(|n| {
            if n.magnitude2() > f32::EPSILON {
                n.normalize().into()
            } else {
                [0.0, 1.0, 0.0]
            }
        })
        .collect()
}
