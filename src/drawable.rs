use crate::error::{StartupError, StartupResult};
use crate::resource_manager::ProgramObject;
use glam::Mat4;

pub const POSITION_LOCATION: u32 = 0;
pub const NORMAL_LOCATION: u32 = 1;
pub const UV_LOCATION: u32 = 2;

const FLOAT_SIZE: usize = std::mem::size_of::<f32>();


/// The closed set of interleaved layouts a drawable can have.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VertexLayout {
	Position,
	PositionUv,
	PositionNormalUv,
}

impl VertexLayout {
	pub fn from_flags(has_normals: bool, has_uvs: bool) -> StartupResult<VertexLayout> {
		match (has_normals, has_uvs) {
			(false, false) => Ok(VertexLayout::Position),
			(false, true) => Ok(VertexLayout::PositionUv),
			(true, true) => Ok(VertexLayout::PositionNormalUv),
			(true, false) => Err(StartupError::VertexLayout("normals without texture coordinates is not a supported layout".into())),
		}
	}

	pub fn has_normals(self) -> bool {
		matches!(self, VertexLayout::PositionNormalUv)
	}

	pub fn has_uvs(self) -> bool {
		!matches!(self, VertexLayout::Position)
	}
}


#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexAttribute {
	pub location: u32,
	pub components: u32,
	pub offset_floats: u32,
}


#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexFormat {
	pub layout: VertexLayout,
	pub position_dims: u32,
}

impl VertexFormat {
	pub fn new(has_normals: bool, has_uvs: bool) -> StartupResult<VertexFormat> {
		Ok(VertexFormat {
			layout: VertexLayout::from_flags(has_normals, has_uvs)?,
			position_dims: 3,
		})
	}

	/// Screen space geometry only needs two position components.
	pub fn with_position_dims(mut self, position_dims: u32) -> StartupResult<VertexFormat> {
		if !(2..=3).contains(&position_dims) {
			return Err(StartupError::VertexLayout(format!("positions must have 2 or 3 components, got {position_dims}")));
		}

		self.position_dims = position_dims;
		Ok(self)
	}

	pub fn attributes(&self) -> Vec<VertexAttribute> {
		let mut attributes = Vec::with_capacity(3);
		let mut offset_floats = 0;

		let mut push = |location, components| {
			attributes.push(VertexAttribute { location, components, offset_floats });
			offset_floats += components;
		};

		push(POSITION_LOCATION, self.position_dims);

		if self.layout.has_normals() {
			push(NORMAL_LOCATION, 3);
		}

		if self.layout.has_uvs() {
			push(UV_LOCATION, 2);
		}

		attributes
	}

	pub fn stride_floats(&self) -> usize {
		self.attributes().iter()
			.map(|attribute| attribute.components as usize)
			.sum()
	}

	pub fn stride_bytes(&self) -> usize {
		self.stride_floats() * FLOAT_SIZE
	}

	/// Checks a buffer against this format and returns how many vertices it holds.
	pub fn vertex_count(&self, float_count: usize, bytes_length: usize) -> StartupResult<u32> {
		if bytes_length != float_count * FLOAT_SIZE {
			return Err(StartupError::VertexLayout(format!(
				"byte length {bytes_length} doesn't match {float_count} floats")));
		}

		let stride_bytes = self.stride_bytes();
		if bytes_length % stride_bytes != 0 {
			return Err(StartupError::VertexLayout(format!(
				"byte length {bytes_length} isn't a multiple of the {stride_bytes} byte {:?} stride", self.layout)));
		}

		let vertex_count = bytes_length / stride_bytes;
		if vertex_count == 0 {
			return Err(StartupError::VertexLayout("no vertices".into()));
		}

		Ok(vertex_count as u32)
	}
}


/// Diffuse and cube textures share unit 0, so a drawable only ever has one of them.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum TextureBinding {
	#[default]
	None,
	Diffuse(u32),
	Cubemap(u32),
}

impl TextureBinding {
	/// What unit 0 holds while this drawable draws. Name 0 unbinds whatever an earlier draw left there.
	fn unit_texture(self) -> u32 {
		match self {
			TextureBinding::None => 0,
			TextureBinding::Diffuse(name) | TextureBinding::Cubemap(name) => name,
		}
	}
}


#[derive(Debug)]
enum BufferState {
	Pending(Vec<f32>),
	Uploaded {
		vao_name: u32,
		vbo_name: u32,
	},
}


#[derive(Debug)]
pub struct Drawable {
	format: VertexFormat,
	vertex_count: u32,
	buffer: BufferState,

	pub texture: TextureBinding,
	pub model_transform: Mat4,
}

impl Drawable {
	pub fn new(vertices: &[f32], bytes_length: usize, has_normals: bool, has_uvs: bool) -> StartupResult<Drawable> {
		Drawable::with_format(vertices.to_vec(), bytes_length, VertexFormat::new(has_normals, has_uvs)?)
	}

	pub fn with_format(vertices: Vec<f32>, bytes_length: usize, format: VertexFormat) -> StartupResult<Drawable> {
		let vertex_count = format.vertex_count(vertices.len(), bytes_length)?;

		Ok(Drawable {
			format,
			vertex_count,
			buffer: BufferState::Pending(vertices),

			texture: TextureBinding::None,
			model_transform: Mat4::IDENTITY,
		})
	}

	pub fn with_texture(mut self, texture: TextureBinding) -> Drawable {
		self.texture = texture;
		self
	}

	pub fn vertex_count(&self) -> u32 {
		self.vertex_count
	}

	/// One-shot upload; the CPU copy is dropped afterwards.
	pub fn send_data(&mut self) {
		let vertices = match &self.buffer {
			BufferState::Pending(vertices) => vertices,
			BufferState::Uploaded{..} => {
				tracing::warn!("drawable already uploaded, ignoring send_data");
				return
			}
		};

		let mut vao_name = 0;
		let mut vbo_name = 0;

		unsafe {
			gl::CreateBuffers(1, &mut vbo_name);
			gl::NamedBufferStorage(vbo_name, (vertices.len() * FLOAT_SIZE) as isize, vertices.as_ptr().cast(), 0);

			gl::CreateVertexArrays(1, &mut vao_name);
			gl::VertexArrayVertexBuffer(vao_name, 0, vbo_name, 0, self.format.stride_bytes() as i32);

			for attribute in self.format.attributes() {
				gl::EnableVertexArrayAttrib(vao_name, attribute.location);

				gl::VertexArrayAttribFormat(vao_name, attribute.location, attribute.components as i32,
					gl::FLOAT, gl::FALSE, attribute.offset_floats * FLOAT_SIZE as u32);

				gl::VertexArrayAttribBinding(vao_name, attribute.location, 0);
			}
		}

		self.buffer = BufferState::Uploaded { vao_name, vbo_name };
	}

	pub fn draw(&self, program: &ProgramObject) {
		self.draw_with_transform(program, &self.model_transform);
	}

	/// Draws with a transform owned by someone else, e.g. the model this mesh belongs to.
	pub fn draw_with_transform(&self, program: &ProgramObject, model_transform: &Mat4) {
		let BufferState::Uploaded { vao_name, .. } = self.buffer else {
			tracing::warn!("drawing a drawable that was never uploaded");
			return
		};

		program.bind();
		program.set_mat4("model_transform", model_transform);

		unsafe {
			gl::BindTextureUnit(0, self.texture.unit_texture());

			// Disabled attributes read the current generic value instead
			if !self.format.layout.has_normals() {
				gl::VertexAttrib3f(NORMAL_LOCATION, 0.0, 1.0, 0.0);
			}

			gl::BindVertexArray(vao_name);
			gl::DrawArrays(gl::TRIANGLES, 0, self.vertex_count as i32);
		}
	}
}

impl Drop for Drawable {
	fn drop(&mut self) {
		if let BufferState::Uploaded { vao_name, vbo_name } = self.buffer {
			unsafe {
				gl::DeleteVertexArrays(1, &vao_name);
				gl::DeleteBuffers(1, &vbo_name);
			}
		}
	}
}
