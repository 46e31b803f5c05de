use crate::camera::Camera;
use crate::config::FinalPassKind;
use crate::context::Context;
use crate::drawable::{Drawable, TextureBinding, VertexFormat};
use crate::error::StartupResult;
use crate::resource_manager::*;
use crate::scene::CUBE_VERTICES;
use glam::Mat4;

pub const SCREEN_VERTEX_SHADER: &str = "shaders/screen.vert.glsl";
pub const SCREEN_FRAGMENT_SHADER: &str = "shaders/screen.frag.glsl";
pub const SKYBOX_VERTEX_SHADER: &str = "shaders/skybox.vert.glsl";
pub const SKYBOX_FRAGMENT_SHADER: &str = "shaders/skybox.frag.glsl";

/// +X, -X, +Y, -Y, +Z, -Z
pub const SKYBOX_FACES: [&str; 6] = [
	"skybox/right.jpg",
	"skybox/left.jpg",
	"skybox/top.jpg",
	"skybox/bottom.jpg",
	"skybox/front.jpg",
	"skybox/back.jpg",
];

pub const SCENE_CLEAR_COLOR: [f32; 4] = [0.1, 0.1, 0.1, 1.0];
pub const SCREEN_CLEAR_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

#[rustfmt::skip]
pub const SCREEN_QUAD_VERTICES: [f32; 24] = [
	// positions  // uvs
	-1.0,  1.0,  0.0, 1.0,
	-1.0, -1.0,  0.0, 0.0,
	 1.0, -1.0,  1.0, 0.0,

	-1.0,  1.0,  0.0, 1.0,
	 1.0, -1.0,  1.0, 0.0,
	 1.0,  1.0,  1.0, 1.0,
];


/// Positions of a cube spanning -1..1, taken from the scene cube.
pub fn skybox_vertices() -> Vec<f32> {
	CUBE_VERTICES.chunks_exact(8)
		.flat_map(|vertex| vertex[..3].iter().map(|p| p * 2.0))
		.collect()
}


/// The last stage of a frame. `begin` picks and clears the target the scene draws into,
/// `finish` runs after the scene's draws and before the buffer swap.
pub trait FinalPass {
	fn kind(&self) -> FinalPassKind;
	fn begin(&self, context: &Context);
	fn finish(&self, context: &Context, camera: &Camera);
}

pub fn create(kind: FinalPassKind, context: &mut Context) -> StartupResult<Box<dyn FinalPass>> {
	let pass: Box<dyn FinalPass> = match kind {
		FinalPassKind::ScreenQuad => Box::new(ScreenQuadPass::new(context)?),
		FinalPassKind::Skybox => Box::new(SkyboxPass::new(context)?),
	};

	tracing::info!(kind = ?pass.kind(), "final pass ready");
	Ok(pass)
}


fn clear(color: [f32; 4], mask: u32) {
	let [r, g, b, a] = color;

	unsafe {
		gl::ClearColor(r, g, b, a);
		gl::Clear(mask);
	}
}



pub struct ScreenQuadPass {
	fbo: FboHandle,
	program: ProgramHandle,
	quad: Drawable,
}

impl ScreenQuadPass {
	pub fn new(context: &mut Context) -> StartupResult<Self> {
		let program = context.load_program("screen", SCREEN_VERTEX_SHADER, SCREEN_FRAGMENT_SHADER)?;

		let resource_manager = &mut context.resource_manager;
		let color = resource_manager.load_image(&ImageDef::color_target())?;
		let color_name = resource_manager.texture_name(color)?;
		let depth_stencil = resource_manager.load_image(&ImageDef::depth_stencil())?;

		let fbo = resource_manager.create_fbo(&FboDef {
			label: "scene target".into(),
			color_attachment_0: Some(color),
			depth_stencil_attachment: Some(depth_stencil),
		})?;

		let format = VertexFormat::new(false, true)?.with_position_dims(2)?;
		let mut quad = Drawable::with_format(SCREEN_QUAD_VERTICES.to_vec(), std::mem::size_of_val(&SCREEN_QUAD_VERTICES), format)?
			.with_texture(TextureBinding::Diffuse(color_name));

		quad.send_data();

		Ok(ScreenQuadPass { fbo, program, quad })
	}
}

impl FinalPass for ScreenQuadPass {
	fn kind(&self) -> FinalPassKind {
		FinalPassKind::ScreenQuad
	}

	fn begin(&self, context: &Context) {
		match context.fbo(self.fbo) {
			Some(fbo) => fbo.bind(),
			None => context.bind_default_framebuffer(),
		}

		unsafe {
			gl::Enable(gl::DEPTH_TEST);
		}

		clear(SCENE_CLEAR_COLOR, gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
	}

	fn finish(&self, context: &Context, _camera: &Camera) {
		context.bind_default_framebuffer();
		clear(SCREEN_CLEAR_COLOR, gl::COLOR_BUFFER_BIT);

		unsafe {
			gl::Disable(gl::DEPTH_TEST);
		}

		if let Some(program) = context.program(self.program) {
			self.quad.draw(program);
		}
	}
}



pub struct SkyboxPass {
	program: ProgramHandle,
	cube: Drawable,
}

impl SkyboxPass {
	pub fn new(context: &mut Context) -> StartupResult<Self> {
		let program = context.load_program("skybox", SKYBOX_VERTEX_SHADER, SKYBOX_FRAGMENT_SHADER)?;

		let cubemap = CubemapDef::new(SKYBOX_FACES.map(ResourcePath::from));
		let cubemap_name = context.resource_manager.load_texture(&ImageDef::Cubemap(cubemap))?;

		let vertices = skybox_vertices();
		let bytes_length = std::mem::size_of_val(vertices.as_slice());
		let mut cube = Drawable::with_format(vertices, bytes_length, VertexFormat::new(false, false)?)?
			.with_texture(TextureBinding::Cubemap(cubemap_name));

		cube.send_data();

		Ok(SkyboxPass { program, cube })
	}
}

impl FinalPass for SkyboxPass {
	fn kind(&self) -> FinalPassKind {
		FinalPassKind::Skybox
	}

	fn begin(&self, context: &Context) {
		context.bind_default_framebuffer();

		unsafe {
			gl::Enable(gl::DEPTH_TEST);
			gl::DepthFunc(gl::LESS);
		}

		clear(SCENE_CLEAR_COLOR, gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
	}

	fn finish(&self, context: &Context, camera: &Camera) {
		let Some(program) = context.program(self.program) else {
			return
		};

		let projection = Camera::projection_matrix(context.aspect_ratio());

		program.bind();
		program.set_mat4("view_transform", &camera.rotation_only_view());
		program.set_mat4("projection_transform", &projection);

		unsafe {
			// The skybox sits at depth 1 so it only fills what the scene left empty
			gl::DepthFunc(gl::LEQUAL);
		}

		self.cube.draw_with_transform(program, &Mat4::IDENTITY);

		unsafe {
			gl::DepthFunc(gl::LESS);
		}
	}
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn screen_quad_covers_clip_space() {
		let format = VertexFormat::new(false, true).unwrap().with_position_dims(2).unwrap();
		assert_eq!(format.vertex_count(SCREEN_QUAD_VERTICES.len(), std::mem::size_of_val(&SCREEN_QUAD_VERTICES)).unwrap(), 6);

		for vertex in SCREEN_QUAD_VERTICES.chunks_exact(4) {
			assert_eq!(vertex[0].abs(), 1.0);
			assert_eq!(vertex[1].abs(), 1.0);

			// uv is position remapped from -1..1 to 0..1
			assert_eq!(vertex[2], (vertex[0] + 1.0) / 2.0);
			assert_eq!(vertex[3], (vertex[1] + 1.0) / 2.0);
		}
	}

	#[test]
	fn skybox_cube_is_position_only() {
		let vertices = skybox_vertices();
		assert_eq!(vertices.len(), 36 * 3);

		let format = VertexFormat::new(false, false).unwrap();
		assert_eq!(format.vertex_count(vertices.len(), vertices.len() * 4).unwrap(), 36);
		assert!(vertices.iter().all(|p| p.abs() == 1.0));
	}

	#[test]
	fn skybox_faces_follow_cube_face_order() {
		assert_eq!(SKYBOX_FACES.len(), CubeFace::ALL.len());
		assert_eq!(SKYBOX_FACES[CubeFace::PositiveX.layer()], "skybox/right.jpg");
		assert_eq!(SKYBOX_FACES[CubeFace::NegativeY.layer()], "skybox/bottom.jpg");
		assert_eq!(SKYBOX_FACES[CubeFace::NegativeZ.layer()], "skybox/back.jpg");
	}
}
