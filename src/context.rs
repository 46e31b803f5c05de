use crate::error::{StartupError, StartupResult};
use crate::resource_manager::*;
use glam::UVec2;
use std::ffi::CStr;


#[derive(Debug)]
pub struct Context {
	pub resource_manager: ResourceManager,
}

impl Context {
	pub fn new(resource_root: &ResourcePathRef, backbuffer_size: UVec2) -> StartupResult<Self> {
		let resource_manager = ResourceManager::new(resource_root, backbuffer_size)?;

		tracing::info!(
			vendor = %gl_string(gl::VENDOR),
			renderer = %gl_string(gl::RENDERER),
			version = %gl_string(gl::VERSION),
			"graphics context ready"
		);

		unsafe {
			gl::Enable(gl::DEPTH_TEST);
		}

		Ok(Self{ resource_manager })
	}

	pub fn backbuffer_size(&self) -> UVec2 {
		self.resource_manager.backbuffer_size
	}

	pub fn aspect_ratio(&self) -> f32 {
		let size = self.backbuffer_size().max(UVec2::ONE);
		size.x as f32 / size.y as f32
	}

	/// Offscreen targets keep their startup size, only the window viewport follows.
	pub fn resize(&mut self, backbuffer_size: UVec2) {
		tracing::debug!("backbuffer resized to {}x{}", backbuffer_size.x, backbuffer_size.y);
		self.resource_manager.backbuffer_size = backbuffer_size;
	}

	pub fn bind_default_framebuffer(&self) {
		let size = self.backbuffer_size();

		unsafe {
			gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
			gl::Viewport(0, 0, size.x as i32, size.y as i32);
		}
	}

	/// Compiles both stages and links them. Stages already compiled for another program are reused.
	pub fn load_program(&mut self, label: &str, vertex_path: &str, fragment_path: &str) -> StartupResult<ProgramHandle> {
		let vertex = self.resource_manager.load_shader(&ShaderDef::vertex(vertex_path))?;
		let fragment = self.resource_manager.load_shader(&ShaderDef::fragment(fragment_path))?;

		self.resource_manager.create_program(&ProgramDef::new(label, vertex, fragment))
	}

	pub fn program(&self, handle: ProgramHandle) -> Option<&ProgramObject> {
		self.resource_manager.resolve_program(handle)
	}

	pub fn fbo(&self, handle: FboHandle) -> Option<&FboObject> {
		self.resource_manager.resolve_fbo(handle)
	}

	/// Drains the GL error queue into the log. Returns how many errors there were.
	pub fn report_errors(&self) -> usize {
		let mut count = 0;

		loop {
			let error = unsafe { gl::GetError() };
			if error == gl::NO_ERROR {
				break
			}

			tracing::error!("gl error: {} (0x{error:x})", gl_error_name(error));
			count += 1;

			// A lost context can report forever
			if count >= 32 {
				break
			}
		}

		count
	}
}


fn gl_string(name: u32) -> String {
	unsafe {
		let ptr = gl::GetString(name);
		if ptr.is_null() {
			return String::from("unknown")
		}

		CStr::from_ptr(ptr.cast()).to_string_lossy().into_owned()
	}
}

pub fn gl_error_name(error: u32) -> &'static str {
	match error {
		gl::INVALID_ENUM => "INVALID_ENUM",
		gl::INVALID_VALUE => "INVALID_VALUE",
		gl::INVALID_OPERATION => "INVALID_OPERATION",
		gl::INVALID_FRAMEBUFFER_OPERATION => "INVALID_FRAMEBUFFER_OPERATION",
		gl::OUT_OF_MEMORY => "OUT_OF_MEMORY",
		gl::STACK_UNDERFLOW => "STACK_UNDERFLOW",
		gl::STACK_OVERFLOW => "STACK_OVERFLOW",
		_ => "unknown",
	}
}


/// Entry points only present from GL 4.5 on. If any are missing the context is too old to use.
pub fn check_required_functions() -> StartupResult<()> {
	let required = [
		("glCreateShader", gl::CreateShader::is_loaded()),
		("glCreateTextures", gl::CreateTextures::is_loaded()),
		("glCreateFramebuffers", gl::CreateFramebuffers::is_loaded()),
		("glNamedBufferStorage", gl::NamedBufferStorage::is_loaded()),
		("glProgramUniformMatrix4fv", gl::ProgramUniformMatrix4fv::is_loaded()),
	];

	let missing: Vec<&str> = required.iter()
		.filter(|(_, loaded)| !loaded)
		.map(|(name, _)| *name)
		.collect();

	if missing.is_empty() {
		Ok(())
	} else {
		Err(StartupError::GraphicsContextLoad(format!("missing entry points: {}", missing.join(", "))))
	}
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn error_names() {
		assert_eq!(gl_error_name(gl::INVALID_OPERATION), "INVALID_OPERATION");
		assert_eq!(gl_error_name(gl::OUT_OF_MEMORY), "OUT_OF_MEMORY");
		assert_eq!(gl_error_name(0xdead), "unknown");
	}

	#[test]
	fn unloaded_functions_are_reported() {
		// Nothing has called gl::load_with in the test binary
		let err = check_required_functions().unwrap_err();
		assert!(matches!(err, StartupError::GraphicsContextLoad(ref message) if message.contains("glCreateShader")));
	}
}
