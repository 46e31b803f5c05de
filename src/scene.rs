use crate::drawable::{Drawable, TextureBinding};
use crate::error::StartupResult;
use crate::resource_manager::{ImageDef, ProgramObject, ResourceManager};
use crate::scene_object::SceneObject;
use glam::{Mat4, Vec3};

pub const SCENE_VERTEX_SHADER: &str = "shaders/scene.vert.glsl";
pub const SCENE_FRAGMENT_SHADER: &str = "shaders/scene.frag.glsl";

pub const PLANE_TEXTURE: &str = "textures/metal.png";
pub const CUBE_TEXTURE: &str = "textures/marble.jpg";
pub const MODEL_PATH: &str = "backpack/backpack.obj";


#[rustfmt::skip]
pub const PLANE_VERTICES: [f32; 30] = [
	// positions          // uvs, above 1 so the texture repeats
	 5.0, -0.5,  5.0,  2.0, 0.0,
	-5.0, -0.5,  5.0,  0.0, 0.0,
	-5.0, -0.5, -5.0,  0.0, 2.0,

	 5.0, -0.5,  5.0,  2.0, 0.0,
	-5.0, -0.5, -5.0,  0.0, 2.0,
	 5.0, -0.5, -5.0,  2.0, 2.0,
];

#[rustfmt::skip]
pub const CUBE_VERTICES: [f32; 288] = [
	// positions          // normals          // uvs
	-0.5, -0.5, -0.5,  0.0,  0.0, -1.0,  0.0, 0.0,
	 0.5, -0.5, -0.5,  0.0,  0.0, -1.0,  1.0, 0.0,
	 0.5,  0.5, -0.5,  0.0,  0.0, -1.0,  1.0, 1.0,
	 0.5,  0.5, -0.5,  0.0,  0.0, -1.0,  1.0, 1.0,
	-0.5,  0.5, -0.5,  0.0,  0.0, -1.0,  0.0, 1.0,
	-0.5, -0.5, -0.5,  0.0,  0.0, -1.0,  0.0, 0.0,

	-0.5, -0.5,  0.5,  0.0,  0.0,  1.0,  0.0, 0.0,
	 0.5, -0.5,  0.5,  0.0,  0.0,  1.0,  1.0, 0.0,
	 0.5,  0.5,  0.5,  0.0,  0.0,  1.0,  1.0, 1.0,
	 0.5,  0.5,  0.5,  0.0,  0.0,  1.0,  1.0, 1.0,
	-0.5,  0.5,  0.5,  0.0,  0.0,  1.0,  0.0, 1.0,
	-0.5, -0.5,  0.5,  0.0,  0.0,  1.0,  0.0, 0.0,

	-0.5,  0.5,  0.5, -1.0,  0.0,  0.0,  1.0, 0.0,
	-0.5,  0.5, -0.5, -1.0,  0.0,  0.0,  1.0, 1.0,
	-0.5, -0.5, -0.5, -1.0,  0.0,  0.0,  0.0, 1.0,
	-0.5, -0.5, -0.5, -1.0,  0.0,  0.0,  0.0, 1.0,
	-0.5, -0.5,  0.5, -1.0,  0.0,  0.0,  0.0, 0.0,
	-0.5,  0.5,  0.5, -1.0,  0.0,  0.0,  1.0, 0.0,

	 0.5,  0.5,  0.5,  1.0,  0.0,  0.0,  1.0, 0.0,
	 0.5,  0.5, -0.5,  1.0,  0.0,  0.0,  1.0, 1.0,
	 0.5, -0.5, -0.5,  1.0,  0.0,  0.0,  0.0, 1.0,
	 0.5, -0.5, -0.5,  1.0,  0.0,  0.0,  0.0, 1.0,
	 0.5, -0.5,  0.5,  1.0,  0.0,  0.0,  0.0, 0.0,
	 0.5,  0.5,  0.5,  1.0,  0.0,  0.0,  1.0, 0.0,

	-0.5, -0.5, -0.5,  0.0, -1.0,  0.0,  0.0, 1.0,
	 0.5, -0.5, -0.5,  0.0, -1.0,  0.0,  1.0, 1.0,
	 0.5, -0.5,  0.5,  0.0, -1.0,  0.0,  1.0, 0.0,
	 0.5, -0.5,  0.5,  0.0, -1.0,  0.0,  1.0, 0.0,
	-0.5, -0.5,  0.5,  0.0, -1.0,  0.0,  0.0, 0.0,
	-0.5, -0.5, -0.5,  0.0, -1.0,  0.0,  0.0, 1.0,

	-0.5,  0.5, -0.5,  0.0,  1.0,  0.0,  0.0, 1.0,
	 0.5,  0.5, -0.5,  0.0,  1.0,  0.0,  1.0, 1.0,
	 0.5,  0.5,  0.5,  0.0,  1.0,  0.0,  1.0, 0.0,
	 0.5,  0.5,  0.5,  0.0,  1.0,  0.0,  1.0, 0.0,
	-0.5,  0.5,  0.5,  0.0,  1.0,  0.0,  0.0, 0.0,
	-0.5,  0.5, -0.5,  0.0,  1.0,  0.0,  0.0, 1.0,
];


/// Demo light that circles the origin over time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LightOrbit {
	pub radius: f32,
	/// Radians per second
	pub angular_speed: f32,
	pub height: f32,
	pub color: Vec3,
}

impl Default for LightOrbit {
	fn default() -> Self {
		LightOrbit {
			radius: 3.0,
			angular_speed: 1.0,
			height: 0.0,
			color: Vec3::ONE,
		}
	}
}

impl LightOrbit {
	pub fn position(&self, time_seconds: f32) -> Vec3 {
		let angle = self.angular_speed * time_seconds;
		Vec3::new(self.radius * angle.sin(), self.height, self.radius * angle.cos())
	}
}


/// Per-frame values shared by every draw in the scene pass.
#[derive(Debug, Copy, Clone)]
pub struct SceneUniforms {
	pub view: Mat4,
	pub projection: Mat4,
	pub eye_position: Vec3,
	pub light_position: Vec3,
	pub light_color: Vec3,
}

impl SceneUniforms {
	pub fn upload(&self, program: &ProgramObject) {
		program.set_mat4("view_transform", &self.view);
		program.set_mat4("projection_transform", &self.projection);

		program.set_vec3("lights[0].color", self.light_color);
		program.set_vec4("lights[0].pos", self.light_position.extend(1.0));
		program.set_vec3("eye_pos", self.eye_position);
	}
}


#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DrawStep {
	Plane,
	Cube(Mat4),
	Model(Mat4),
}

/// The hand-ordered sequence of the scene pass.
pub fn draw_order() -> [DrawStep; 4] {
	[
		DrawStep::Plane,
		DrawStep::Cube(Mat4::IDENTITY),
		DrawStep::Cube(Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0))),
		DrawStep::Model(Mat4::from_translation(Vec3::new(0.25, 0.0, 0.0))),
	]
}


pub struct Scene {
	pub plane: Drawable,
	pub cube: Drawable,
	pub model: SceneObject,
}

impl Scene {
	pub fn load(resource_manager: &mut ResourceManager) -> StartupResult<Scene> {
		let plane_texture = load_texture(resource_manager, PLANE_TEXTURE)?;
		let cube_texture = load_texture(resource_manager, CUBE_TEXTURE)?;

		let plane = Drawable::new(&PLANE_VERTICES, std::mem::size_of_val(&PLANE_VERTICES), false, true)?
			.with_texture(plane_texture);

		let cube = Drawable::new(&CUBE_VERTICES, std::mem::size_of_val(&CUBE_VERTICES), true, true)?
			.with_texture(cube_texture);

		let model = SceneObject::load(resource_manager, MODEL_PATH.as_ref())?;

		Ok(Scene { plane, cube, model })
	}

	pub fn send_data(&mut self) {
		self.plane.send_data();
		self.cube.send_data();
		self.model.send_data();
	}

	pub fn draw(&mut self, program: &ProgramObject, uniforms: &SceneUniforms) {
		program.bind();
		uniforms.upload(program);

		for step in draw_order() {
			match step {
				DrawStep::Plane => self.plane.draw(program),
				DrawStep::Cube(transform) => {
					self.cube.model_transform = transform;
					self.cube.draw(program);
				}
				DrawStep::Model(transform) => {
					self.model.model_transform = transform;
					self.model.draw(program);
				}
			}
		}
	}
}


fn load_texture(resource_manager: &mut ResourceManager, path: &str) -> StartupResult<TextureBinding> {
	let name = resource_manager.load_texture(&ImageDef::new(path))?;
	Ok(TextureBinding::Diffuse(name))
}



#[cfg(test)]
mod tests {
	use super::*;
	use crate::drawable::{VertexFormat, VertexLayout};

	#[test]
	fn inline_geometry_matches_layouts() {
		let plane = VertexFormat::new(false, true).unwrap();
		assert_eq!(plane.vertex_count(PLANE_VERTICES.len(), std::mem::size_of_val(&PLANE_VERTICES)).unwrap(), 6);

		let cube = VertexFormat::new(true, true).unwrap();
		assert_eq!(cube.layout, VertexLayout::PositionNormalUv);
		assert_eq!(cube.vertex_count(CUBE_VERTICES.len(), std::mem::size_of_val(&CUBE_VERTICES)).unwrap(), 36);
	}

	#[test]
	fn swapped_geometry_is_rejected() {
		// Cube data read as a plane, and plane data read as a lit cube
		assert!(Drawable::new(&CUBE_VERTICES, std::mem::size_of_val(&CUBE_VERTICES), false, true).is_err());
		assert!(Drawable::new(&PLANE_VERTICES, std::mem::size_of_val(&PLANE_VERTICES), true, true).is_err());
	}

	#[test]
	fn cube_normals_are_unit_and_axis_aligned() {
		for vertex in CUBE_VERTICES.chunks_exact(8) {
			let normal = Vec3::from_slice(&vertex[3..6]);
			assert_eq!(normal.length(), 1.0);
			assert_eq!(normal.abs().max_element(), 1.0);
		}
	}

	#[test]
	fn light_orbit_defaults_match_demo_motion() {
		let light = LightOrbit::default();

		assert!((light.position(0.0) - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-5);

		let quarter = std::f32::consts::FRAC_PI_2;
		assert!((light.position(quarter) - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);

		for step in 0..20 {
			let position = light.position(step as f32 * 0.37);
			assert!((position.length() - 3.0).abs() < 1e-4);
		}
	}

	#[test]
	fn light_orbit_is_configurable() {
		let light = LightOrbit { radius: 1.0, angular_speed: 2.0, height: 0.5, color: Vec3::X };
		let position = light.position(std::f32::consts::FRAC_PI_4);
		assert!((position - Vec3::new(1.0, 0.5, 0.0)).length() < 1e-5);
	}

	#[test]
	fn draw_order_is_fixed() {
		let order = draw_order();

		assert_eq!(order[0], DrawStep::Plane);
		assert_eq!(order[1], DrawStep::Cube(Mat4::IDENTITY));
		assert_eq!(order[2], DrawStep::Cube(Mat4::from_translation(Vec3::Y)));
		assert_eq!(order[3], DrawStep::Model(Mat4::from_translation(Vec3::new(0.25, 0.0, 0.0))));
	}
}
