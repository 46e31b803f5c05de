use crate::drawable::{Drawable, TextureBinding, VertexFormat};
use crate::error::{StartupError, StartupResult};
use crate::resource_manager::{ImageDef, ProgramObject, ResourceManager, ResourcePath, ResourcePathRef};
use glam::{Mat4, Vec3};

/// Floats per expanded vertex: position, normal, uv.
const VERTEX_FLOATS: usize = 8;


/// One mesh of an OBJ file, expanded to non-indexed position/normal/uv vertices.
#[derive(Debug, Clone)]
pub struct MeshData {
	pub name: String,
	pub vertices: Vec<f32>,
	/// Relative to the resource root.
	pub diffuse_texture: Option<ResourcePath>,
}

impl MeshData {
	pub fn vertex_count(&self) -> usize {
		self.vertices.len() / VERTEX_FLOATS
	}
}


/// Parses an OBJ (and its MTL, if any) into flat meshes. Does not touch GL.
pub fn load_obj(resource_manager: &ResourceManager, path: &ResourcePathRef) -> StartupResult<Vec<MeshData>> {
	let full_path = resource_manager.resolve_path(path);

	let (models, materials) = tobj::load_obj(
		&full_path,
		&tobj::LoadOptions {
			single_index: true,
			triangulate: true,
			..Default::default()
		},
	)
	.map_err(|source| StartupError::ModelLoad { path: path.to_owned(), source })?;

	let materials = materials.unwrap_or_else(|err| {
		tracing::warn!("no materials for '{}' ({err}), drawing untextured", path.display());
		Vec::new()
	});

	let model_dir = path.parent().unwrap_or(ResourcePathRef::new(""));

	let meshes = models.into_iter()
		.map(|model| {
			let diffuse_texture = model.mesh.material_id
				.and_then(|id| materials.get(id))
				.and_then(|material| material.diffuse_texture.as_deref())
				.filter(|texture| !texture.is_empty())
				.map(|texture| model_dir.join(texture.replace('\\', "/")));

			MeshData {
				vertices: expand_mesh(&model.mesh),
				name: model.name,
				diffuse_texture,
			}
		})
		.filter(|mesh| !mesh.vertices.is_empty())
		.collect();

	Ok(meshes)
}


fn expand_mesh(mesh: &tobj::Mesh) -> Vec<f32> {
	let computed_normals;
	let normals = if mesh.normals.len() == mesh.positions.len() {
		&mesh.normals
	} else {
		computed_normals = compute_normals(&mesh.positions, &mesh.indices);
		&computed_normals
	};

	let has_uvs = mesh.texcoords.len() / 2 == mesh.positions.len() / 3;

	let mut vertices = Vec::with_capacity(mesh.indices.len() * VERTEX_FLOATS);

	for &index in mesh.indices.iter() {
		let i = index as usize;

		vertices.extend_from_slice(&mesh.positions[i * 3..i * 3 + 3]);
		vertices.extend_from_slice(&normals[i * 3..i * 3 + 3]);

		if has_uvs {
			vertices.extend_from_slice(&mesh.texcoords[i * 2..i * 2 + 2]);
		} else {
			vertices.extend_from_slice(&[0.0, 0.0]);
		}
	}

	vertices
}


/// Area weighted vertex normals for meshes that don't ship any.
fn compute_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
	let mut normals = vec![0.0f32; positions.len()];
	let vertex = |i: usize| Vec3::new(positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]);

	for tri in indices.chunks_exact(3) {
		let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
		let v0 = vertex(i0);
		let face_normal = (vertex(i1) - v0).cross(vertex(i2) - v0);

		for i in [i0, i1, i2] {
			normals[i * 3] += face_normal.x;
			normals[i * 3 + 1] += face_normal.y;
			normals[i * 3 + 2] += face_normal.z;
		}
	}

	for normal in normals.chunks_exact_mut(3) {
		let n = Vec3::new(normal[0], normal[1], normal[2]).normalize_or_zero();
		normal.copy_from_slice(&n.to_array());
	}

	normals
}



/// An imported model: several drawables sharing one model transform.
#[derive(Debug)]
pub struct SceneObject {
	drawables: Vec<Drawable>,
	pub model_transform: Mat4,
}

impl SceneObject {
	pub fn load(resource_manager: &mut ResourceManager, path: &ResourcePathRef) -> StartupResult<SceneObject> {
		let meshes = load_obj(resource_manager, path)?;
		let format = VertexFormat::new(true, true)?;

		let mut drawables = Vec::with_capacity(meshes.len());

		for mesh in meshes {
			let texture = match &mesh.diffuse_texture {
				Some(texture_path) => {
					let name = resource_manager.load_texture(&ImageDef::new(texture_path.clone()))
						.map_err(|source| StartupError::ModelTexture { path: path.to_owned(), source: Box::new(source) })?;

					TextureBinding::Diffuse(name)
				}
				None => TextureBinding::None,
			};

			tracing::debug!(vertices = mesh.vertex_count(), ?texture, "mesh '{}'", mesh.name);

			let bytes_length = std::mem::size_of_val(mesh.vertices.as_slice());
			let drawable = Drawable::with_format(mesh.vertices, bytes_length, format)?
				.with_texture(texture);

			drawables.push(drawable);
		}

		tracing::info!(meshes = drawables.len(), "loaded model '{}'", path.display());

		Ok(SceneObject {
			drawables,
			model_transform: Mat4::IDENTITY,
		})
	}

	pub fn send_data(&mut self) {
		for drawable in self.drawables.iter_mut() {
			drawable.send_data();
		}
	}

	pub fn draw(&self, program: &ProgramObject) {
		for drawable in self.drawables.iter() {
			drawable.draw_with_transform(program, &self.model_transform);
		}
	}
}



#[cfg(test)]
mod tests {
	use super::*;
	use glam::UVec2;

	const QUAD_OBJ: &str = "\
mtllib quad.mtl
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl painted
f 1/1/1 2/2/1 3/3/1 4/4/1
";

	const QUAD_MTL: &str = "\
newmtl painted
map_Kd textures/paint.png
";

	fn write(dir: &std::path::Path, file: &str, contents: &str) {
		let path = dir.join(file);
		std::fs::create_dir_all(path.parent().unwrap()).unwrap();
		std::fs::write(path, contents).unwrap();
	}

	#[test]
	fn quad_expands_to_two_triangles() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "model/quad.obj", QUAD_OBJ);
		write(dir.path(), "model/quad.mtl", QUAD_MTL);

		let resource_manager = ResourceManager::new(dir.path(), UVec2::ONE).unwrap();
		let meshes = load_obj(&resource_manager, "model/quad.obj".as_ref()).unwrap();

		assert_eq!(meshes.len(), 1);
		let mesh = &meshes[0];
		assert_eq!(mesh.vertex_count(), 6);
		assert_eq!(mesh.vertices.len(), 6 * VERTEX_FLOATS);
		assert_eq!(mesh.diffuse_texture, Some(ResourcePath::from("model/textures/paint.png")));

		// Every vertex carries the file's normal and a uv matching its position
		for vertex in mesh.vertices.chunks_exact(VERTEX_FLOATS) {
			assert_eq!(&vertex[3..6], &[0.0, 0.0, 1.0]);
			assert_eq!(vertex[6], vertex[0]);
			assert_eq!(vertex[7], vertex[1]);
		}

		let format = VertexFormat::new(true, true).unwrap();
		assert_eq!(format.vertex_count(mesh.vertices.len(), mesh.vertices.len() * 4).unwrap(), 6);
	}

	#[test]
	fn missing_normals_and_uvs_are_filled_in() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "tri.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");

		let resource_manager = ResourceManager::new(dir.path(), UVec2::ONE).unwrap();
		let meshes = load_obj(&resource_manager, "tri.obj".as_ref()).unwrap();

		let mesh = &meshes[0];
		assert_eq!(mesh.vertex_count(), 3);
		assert_eq!(mesh.diffuse_texture, None);

		for vertex in mesh.vertices.chunks_exact(VERTEX_FLOATS) {
			assert!((Vec3::from_slice(&vertex[3..6]) - Vec3::Z).length() < 1e-6);
			assert_eq!(&vertex[6..8], &[0.0, 0.0]);
		}
	}

	#[test]
	fn missing_mtl_leaves_meshes_untextured() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "model/quad.obj", &QUAD_OBJ.replace("mtllib quad.mtl", "mtllib gone.mtl"));

		let resource_manager = ResourceManager::new(dir.path(), UVec2::ONE).unwrap();
		let meshes = load_obj(&resource_manager, "model/quad.obj".as_ref()).unwrap();

		assert_eq!(meshes.len(), 1);
		assert_eq!(meshes[0].vertex_count(), 6);
		assert_eq!(meshes[0].diffuse_texture, None);
	}

	#[test]
	fn unresolvable_material_texture_fails_the_model() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "model/quad.obj", QUAD_OBJ);
		write(dir.path(), "model/quad.mtl", QUAD_MTL);

		// model/textures/paint.png was never written
		let mut resource_manager = ResourceManager::new(dir.path(), UVec2::ONE).unwrap();
		let err = SceneObject::load(&mut resource_manager, "model/quad.obj".as_ref()).unwrap_err();

		match err {
			StartupError::ModelTexture { path, source } => {
				assert_eq!(path, ResourcePath::from("model/quad.obj"));
				assert!(matches!(*source, StartupError::TextureLoad { ref path, .. } if path.as_path() == ResourcePathRef::new("model/textures/paint.png")));
			}
			other => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn missing_model_is_a_load_error() {
		let dir = tempfile::tempdir().unwrap();
		let resource_manager = ResourceManager::new(dir.path(), UVec2::ONE).unwrap();

		let err = load_obj(&resource_manager, "backpack/backpack.obj".as_ref()).unwrap_err();
		assert!(matches!(err, StartupError::ModelLoad { ref path, .. } if path.as_path() == ResourcePathRef::new("backpack/backpack.obj")));
	}

	#[test]
	fn computed_normals_are_unit() {
		let positions = [0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, -2.0];
		let normals = compute_normals(&positions, &[0, 1, 2]);

		for normal in normals.chunks_exact(3) {
			assert!((Vec3::from_slice(normal) - Vec3::Y).length() < 1e-6);
		}
	}
}
