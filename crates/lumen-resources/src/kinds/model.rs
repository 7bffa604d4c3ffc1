use std::io::Cursor;
use std::path::Path;

use lumen_gfx::{GpuMesh, GraphicsContext, MeshUpload, Vertex};

use super::{FinalizeContext, Finalized, ResourceKind, ResourceType, Texture};
use crate::error::{ResourceError, ResourceResult};
use crate::loader::{LoadContext, ResourceLoader};
use crate::resource::{AnyHandle, Handle};

/// Model resources: meshes plus the materials they reference.
pub enum Model {}

/// One imported mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Index into [`ModelData::materials`].
    pub material: Option<usize>,
}

/// An imported material. Texture paths are already resolved against the
/// model's directory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaterialData {
    pub name: String,
    pub diffuse_texture: Option<String>,
    pub normal_texture: Option<String>,
    pub specular_texture: Option<String>,
}

/// Decoded model.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelData {
    pub meshes: Vec<MeshData>,
    pub materials: Vec<MaterialData>,
}

/// A material with its textures attached.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub diffuse: Option<Handle<Texture>>,
    pub normal: Option<Handle<Texture>>,
    pub specular: Option<Handle<Texture>>,
}

impl Material {
    pub fn textures(&self) -> impl Iterator<Item = &Handle<Texture>> {
        [&self.diffuse, &self.normal, &self.specular]
            .into_iter()
            .flatten()
    }
}

/// An uploaded mesh.
#[derive(Debug, Clone)]
pub struct ModelMesh {
    pub name: String,
    pub mesh: GpuMesh,
    /// Index into [`ModelContent::materials`].
    pub material: Option<usize>,
}

/// A loaded model.
#[derive(Debug, Clone)]
pub struct ModelContent {
    pub meshes: Vec<ModelMesh>,
    pub materials: Vec<Material>,
}

/// Imports Wavefront OBJ files with `tobj`. Material libraries are read
/// through the same byte source as the model.
pub struct ObjLoader;

impl ObjLoader {
    fn convert_mesh(
        path: &str,
        model: tobj::Model,
        material_count: usize,
    ) -> ResourceResult<MeshData> {
        let mesh = model.mesh;
        if mesh.positions.len() % 3 != 0 {
            return Err(ResourceError::decode(path, "position data is not a multiple of 3"));
        }
        let vertex_count = mesh.positions.len() / 3;
        let has_normals = mesh.normals.len() == vertex_count * 3;
        let has_uvs = mesh.texcoords.len() == vertex_count * 2;

        let vertices = (0..vertex_count)
            .map(|i| Vertex {
                position: [
                    mesh.positions[i * 3],
                    mesh.positions[i * 3 + 1],
                    mesh.positions[i * 3 + 2],
                ],
                normal: if has_normals {
                    [mesh.normals[i * 3], mesh.normals[i * 3 + 1], mesh.normals[i * 3 + 2]]
                } else {
                    [0.0, 0.0, 0.0]
                },
                uv: if has_uvs {
                    [mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1]]
                } else {
                    [0.0, 0.0]
                },
            })
            .collect();

        if let Some(bad) = mesh.indices.iter().find(|&&index| index as usize >= vertex_count) {
            return Err(ResourceError::decode(
                path,
                format!("mesh '{}' index {} out of range", model.name, bad),
            ));
        }

        Ok(MeshData {
            name: model.name,
            vertices,
            indices: mesh.indices,
            material: mesh.material_id.filter(|&id| id < material_count),
        })
    }
}

impl ResourceLoader for ObjLoader {
    type Output = ModelData;

    fn load(&self, ctx: &LoadContext<'_>) -> ResourceResult<ModelData> {
        let mut reader = Cursor::new(ctx.bytes);
        let (models, materials) =
            tobj::load_obj_buf(&mut reader, &tobj::GPU_LOAD_OPTIONS, |mtl_path: &Path| {
                let bytes = ctx
                    .read_sibling(&mtl_path.to_string_lossy())
                    .map_err(|_| tobj::LoadError::OpenFileFailed)?;
                tobj::load_mtl_buf(&mut Cursor::new(bytes))
            })
            .map_err(|e| ResourceError::decode(ctx.path, e))?;

        let materials = match materials {
            Ok(materials) => materials,
            Err(e) => {
                tracing::warn!("Model '{}' loads without materials: {}", ctx.path, e);
                Vec::new()
            }
        };

        // tobj yields an empty placeholder object for files without geometry.
        let models: Vec<tobj::Model> = models
            .into_iter()
            .filter(|model| !model.mesh.positions.is_empty() && !model.mesh.indices.is_empty())
            .collect();
        if models.is_empty() {
            return Err(ResourceError::decode(ctx.path, "model contains no meshes"));
        }

        let resolve = |texture: Option<String>| {
            texture
                .filter(|name| !name.trim().is_empty())
                .map(|name| ctx.resolve(name.trim()))
        };
        let materials: Vec<MaterialData> = materials
            .into_iter()
            .map(|material| MaterialData {
                name: material.name,
                diffuse_texture: resolve(material.diffuse_texture),
                normal_texture: resolve(material.normal_texture),
                specular_texture: resolve(material.specular_texture),
            })
            .collect();

        let meshes = models
            .into_iter()
            .map(|model| Self::convert_mesh(ctx.path, model, materials.len()))
            .collect::<ResourceResult<Vec<_>>>()?;

        Ok(ModelData { meshes, materials })
    }
}

impl ResourceType for Model {
    const KIND: ResourceKind = ResourceKind::Model;

    type Decoded = ModelData;
    type Staged = ModelContent;
    type Content = ModelContent;

    super::kind_slots!(model);

    fn finalize(
        decoded: ModelData,
        ctx: &mut FinalizeContext<'_>,
    ) -> ResourceResult<Finalized<Self>> {
        let meshes = decoded
            .meshes
            .into_iter()
            .map(|mesh| ModelMesh {
                mesh: ctx.graphics().create_mesh(&MeshUpload {
                    label: Some(&mesh.name),
                    vertices: &mesh.vertices,
                    indices: &mesh.indices,
                }),
                name: mesh.name,
                material: mesh.material,
            })
            .collect();

        let mut dependencies: Vec<AnyHandle> = Vec::new();
        let mut request = |path: Option<String>| {
            path.map(|path| {
                let handle = ctx.request::<Texture>(&path);
                let dependency = AnyHandle::from(handle.clone());
                if !dependencies.contains(&dependency) {
                    dependencies.push(dependency);
                }
                handle
            })
        };
        let materials = decoded
            .materials
            .into_iter()
            .map(|material| Material {
                name: material.name,
                diffuse: request(material.diffuse_texture),
                normal: request(material.normal_texture),
                specular: request(material.specular_texture),
            })
            .collect();

        let content = ModelContent { meshes, materials };
        if dependencies.is_empty() {
            Ok(Finalized::Ready(content))
        } else {
            Ok(Finalized::Waiting {
                staged: content,
                dependencies,
            })
        }
    }

    fn complete(
        path: &str,
        staged: ModelContent,
        _graphics: &dyn GraphicsContext,
    ) -> ResourceResult<ModelContent> {
        if let Some(texture) = staged
            .materials
            .iter()
            .flat_map(Material::textures)
            .find(|texture| !texture.is_loaded())
        {
            return Err(ResourceError::DependencyFailed {
                path: path.to_string(),
                dependency: texture.path().to_string(),
            });
        }
        Ok(staged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    const QUAD_OBJ: &str = "\
mtllib quad.mtl
o quad
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 0.0 1.0
usemtl wood
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    const QUAD_MTL: &str = "\
newmtl wood
Kd 1.0 1.0 1.0
map_Kd ../textures/wood.png
";

    #[test]
    fn test_imports_triangulated_quad_with_material() {
        let source = MemorySource::new().with("models/quad.mtl", QUAD_MTL);
        let ctx = LoadContext::new("models/quad.obj", QUAD_OBJ.as_bytes(), &source);

        let model = ObjLoader.load(&ctx).unwrap();
        assert_eq!(model.meshes.len(), 1);
        let mesh = &model.meshes[0];
        assert_eq!(mesh.name, "quad");
        assert_eq!(mesh.indices.len(), 6);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.vertices[2].uv, [1.0, 1.0]);
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(mesh.material, Some(0));

        assert_eq!(
            model.materials,
            vec![MaterialData {
                name: "wood".to_string(),
                diffuse_texture: Some("textures/wood.png".to_string()),
                ..Default::default()
            }]
        );
    }

    #[test]
    fn test_missing_material_library_is_not_fatal() {
        let source = MemorySource::new();
        let ctx = LoadContext::new("models/quad.obj", QUAD_OBJ.as_bytes(), &source);

        let model = ObjLoader.load(&ctx).unwrap();
        assert!(model.materials.is_empty());
        assert_eq!(model.meshes[0].material, None);
    }

    #[test]
    fn test_broken_obj() {
        let source = MemorySource::new();
        let ctx = LoadContext::new("broken.obj", b"v 1.0 oops\nf 1 2 3\n", &source);
        assert!(ObjLoader.load(&ctx).is_err());

        let ctx = LoadContext::new("empty.obj", b"# nothing here\n", &source);
        let err = ObjLoader.load(&ctx).unwrap_err();
        assert!(err.to_string().contains("no meshes"));
    }

    #[test]
    fn test_vertices_without_faces_are_not_a_mesh() {
        let source = MemorySource::new();
        let ctx = LoadContext::new(
            "points.obj",
            b"o points\nv 0.0 0.0 0.0\nv 1.0 0.0 0.0\n",
            &source,
        );
        assert!(matches!(
            ObjLoader.load(&ctx),
            Err(ResourceError::Decode { .. })
        ));
    }
}
