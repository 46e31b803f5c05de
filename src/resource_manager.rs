pub mod shader;
pub mod program;
pub mod image;
pub mod sampler;
pub mod fbo;

use crate::error::{StartupError, StartupResult};
use glam::UVec2;
use std::collections::HashMap;

pub type ResourcePath = std::path::PathBuf;
pub type ResourcePathRef = std::path::Path;

pub use self::shader::{ShaderType, ShaderDef, ShaderObject};
pub use self::program::{ProgramDef, ProgramObject};
pub use self::image::{ImageDef, ImageObject, CubeFace, CubemapDef};
pub use self::sampler::SamplerDef;
pub use self::fbo::{FboDef, FboObject};




#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct ShaderHandle(pub u32);

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct ProgramHandle(pub u32);

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct ImageHandle(pub u32);

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct FboHandle(pub u32);



/// Owns every GPU object created at startup and hands out handles to them.
#[derive(Debug)]
pub struct ResourceManager {
	resource_root_path: ResourcePath,
	pub backbuffer_size: UVec2,

	shader_defs: HashMap<ShaderDef, ShaderHandle>,
	shader_objects: HashMap<ShaderHandle, ShaderObject>,
	shader_counter: u32,

	program_objects: Vec<ProgramObject>,

	image_defs: HashMap<ImageDef, ImageHandle>,
	image_objects: HashMap<ImageHandle, ImageObject>,
	image_counter: u32,

	fbo_objects: Vec<FboObject>,
}

impl ResourceManager {
	pub fn new(resource_root_path: impl Into<ResourcePath>, backbuffer_size: UVec2) -> StartupResult<Self> {
		let resource_root_path = resource_root_path.into();

		if !resource_root_path.is_dir() {
			return Err(StartupError::ResourceRoot(resource_root_path));
		}

		Ok(Self{
			resource_root_path,
			backbuffer_size,

			shader_defs: HashMap::default(),
			shader_objects: HashMap::default(),
			shader_counter: 0,

			program_objects: Vec::new(),

			image_defs: HashMap::default(),
			image_objects: HashMap::default(),
			image_counter: 0,

			fbo_objects: Vec::new(),
		})
	}

	pub fn resolve_path(&self, path: &ResourcePathRef) -> ResourcePath {
		self.resource_root_path.join(path)
	}

	pub fn load_text(&self, path: &ResourcePathRef) -> std::io::Result<String> {
		std::fs::read_to_string(self.resolve_path(path))
	}

	/// Compiles a stage, or returns the existing handle if this def was already compiled.
	pub fn load_shader(&mut self, def: &ShaderDef) -> StartupResult<ShaderHandle> {
		if let Some(handle) = self.shader_defs.get(def) {
			return Ok(*handle);
		}

		let object = self::shader::compile_shader(self, def)?;

		tracing::debug!(name = object.name, "compiled {:?} shader '{}'", def.shader_type, def.path.display());

		let handle = ShaderHandle(self.shader_counter);
		self.shader_counter += 1;

		self.shader_defs.insert(def.clone(), handle);
		self.shader_objects.insert(handle, object);

		Ok(handle)
	}

	pub fn resolve_shader(&self, handle: ShaderHandle) -> Option<&ShaderObject> {
		self.shader_objects.get(&handle)
	}

	pub fn create_program(&mut self, def: &ProgramDef) -> StartupResult<ProgramHandle> {
		let object = self::program::link_program(self, def)?;

		tracing::debug!(name = object.name, stages = object.stages.len(), uniforms = object.uniforms.len(), "linked program '{}'", def.label);

		let handle = ProgramHandle(self.program_objects.len() as u32);
		self.program_objects.push(object);
		Ok(handle)
	}

	pub fn resolve_program(&self, handle: ProgramHandle) -> Option<&ProgramObject> {
		self.program_objects.get(handle.0 as usize)
	}

	/// Linked programs keep what they need, so stage objects can go once linking is done.
	pub fn release_shader_stages(&mut self) {
		for (_, object) in self.shader_objects.drain() {
			unsafe {
				gl::DeleteShader(object.name);
			}
		}

		self.shader_defs.clear();
	}

	/// Path and cubemap images are cached by def, render targets are always fresh.
	pub fn load_image(&mut self, def: &ImageDef) -> StartupResult<ImageHandle> {
		let cacheable = !matches!(def, ImageDef::RenderTarget{..});

		if cacheable {
			if let Some(handle) = self.image_defs.get(def) {
				return Ok(*handle);
			}
		}

		let object = self::image::load(self, def)?;

		tracing::debug!(name = object.name, kind = ?object.kind, format = object.format, "created {}x{} image {def:?}", object.size.x, object.size.y);

		let handle = ImageHandle(self.image_counter);
		self.image_counter += 1;

		if cacheable {
			self.image_defs.insert(def.clone(), handle);
		}

		self.image_objects.insert(handle, object);

		Ok(handle)
	}

	pub fn resolve_image(&self, handle: ImageHandle) -> Option<&ImageObject> {
		self.image_objects.get(&handle)
	}

	pub fn texture_name(&self, handle: ImageHandle) -> StartupResult<u32> {
		self.resolve_image(handle)
			.map(|image| image.name)
			.ok_or(StartupError::UnknownImage(handle))
	}

	/// Loads an image and returns the GL texture name to bind it by.
	pub fn load_texture(&mut self, def: &ImageDef) -> StartupResult<u32> {
		let handle = self.load_image(def)?;
		self.texture_name(handle)
	}

	pub fn create_fbo(&mut self, def: &FboDef) -> StartupResult<FboHandle> {
		let object = self::fbo::create(self, def)?;

		let handle = FboHandle(self.fbo_objects.len() as u32);
		self.fbo_objects.push(object);
		Ok(handle)
	}

	pub fn resolve_fbo(&self, handle: FboHandle) -> Option<&FboObject> {
		self.fbo_objects.get(handle.0 as usize)
	}
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_root_is_rejected() {
		let dir = tempfile::tempdir().unwrap();
		let missing = dir.path().join("nope");

		let err = ResourceManager::new(&missing, UVec2::new(4, 4)).unwrap_err();
		assert!(matches!(err, StartupError::ResourceRoot(path) if path == missing));
	}

	#[test]
	fn missing_shader_fails_before_creating_programs() {
		let dir = tempfile::tempdir().unwrap();
		let mut resource_manager = ResourceManager::new(dir.path(), UVec2::new(4, 4)).unwrap();

		let def = ShaderDef {
			path: ResourcePath::from("shaders/missing.vert.glsl"),
			shader_type: ShaderType::Vertex,
		};

		let err = resource_manager.load_shader(&def).unwrap_err();

		match err {
			StartupError::ShaderSource { path, source } => {
				assert_eq!(path, def.path);
				assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
			}
			other => panic!("unexpected error: {other}"),
		}

		assert!(resource_manager.program_objects.is_empty());
		assert!(resource_manager.resolve_shader(ShaderHandle(0)).is_none());
	}

	#[test]
	fn unknown_image_handle_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let resource_manager = ResourceManager::new(dir.path(), UVec2::new(4, 4)).unwrap();

		let err = resource_manager.texture_name(ImageHandle(7)).unwrap_err();
		assert!(matches!(err, StartupError::UnknownImage(ImageHandle(7))));
	}

	#[test]
	fn missing_texture_fails_without_creating_images() {
		let dir = tempfile::tempdir().unwrap();
		let mut resource_manager = ResourceManager::new(dir.path(), UVec2::new(4, 4)).unwrap();

		let err = resource_manager.load_texture(&ImageDef::new("textures/metal.png")).unwrap_err();
		assert!(matches!(err, StartupError::TextureLoad { .. }));
		assert!(resource_manager.image_objects.is_empty());
	}

	#[test]
	fn paths_resolve_against_root() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("hello.txt"), "hi").unwrap();

		let resource_manager = ResourceManager::new(dir.path(), UVec2::new(4, 4)).unwrap();
		assert_eq!(resource_manager.resolve_path("a/b.png".as_ref()), dir.path().join("a/b.png"));
		assert_eq!(resource_manager.load_text("hello.txt".as_ref()).unwrap(), "hi");
	}
}
