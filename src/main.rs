mod camera;
mod config;
mod context;
mod drawable;
mod error;
mod final_pass;
mod frame_timing;
mod input;
mod logging;
mod main_loop;
mod resource_manager;
mod scene;
mod scene_object;

use anyhow::Context as _;
use camera::Camera;
use config::Config;
use context::Context;
use final_pass::FinalPass;
use glam::UVec2;
use input::InputState;
use resource_manager::ProgramHandle;
use scene::{LightOrbit, Scene, SceneUniforms};
use std::time::Instant;


fn main() {
	logging::init();

	let config = Config::from_env();
	tracing::debug!(?config);

	let exit_code = main_loop::run(&config, App::new);
	std::process::exit(exit_code);
}




struct App {
	context: Context,

	scene_program: ProgramHandle,
	scene: Scene,
	final_pass: Box<dyn FinalPass>,

	camera: Camera,
	light: LightOrbit,
	start_time: Instant,
}

impl App {
	fn new(config: &Config, backbuffer_size: UVec2) -> anyhow::Result<Self> {
		let mut context = Context::new(&config.resource_root, backbuffer_size)?;

		let scene_program = context.load_program("scene", scene::SCENE_VERTEX_SHADER, scene::SCENE_FRAGMENT_SHADER)
			.context("building scene program")?;

		let final_pass = final_pass::create(config.final_pass, &mut context)
			.with_context(|| format!("building {:?} final pass", config.final_pass))?;

		context.resource_manager.release_shader_stages();

		let mut scene = Scene::load(&mut context.resource_manager)
			.context("loading scene")?;

		scene.send_data();

		if context.report_errors() > 0 {
			tracing::warn!("gl reported errors during startup");
		}

		Ok(App {
			context,

			scene_program,
			scene,
			final_pass,

			camera: Camera::default(),
			light: config.light,
			start_time: Instant::now(),
		})
	}
}

impl main_loop::MainLoop for App {
	fn present(&mut self) {
		self.final_pass.begin(&self.context);

		if let Some(program) = self.context.program(self.scene_program) {
			let time = self.start_time.elapsed().as_secs_f32();

			let uniforms = SceneUniforms {
				view: self.camera.view_matrix(),
				projection: Camera::projection_matrix(self.context.aspect_ratio()),
				eye_position: self.camera.position,
				light_position: self.light.position(time),
				light_color: self.light.color,
			};

			self.scene.draw(program, &uniforms);
		}

		self.final_pass.finish(&self.context, &self.camera);
	}

	fn update(&mut self, input: &mut InputState, delta_seconds: f32) {
		input.drain_into(&mut self.camera);
		self.camera.apply_movement(input.movement(), delta_seconds);
	}

	fn resize(&mut self, backbuffer_size: UVec2) {
		self.context.resize(backbuffer_size);
	}
}
