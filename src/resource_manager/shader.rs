use super::{ResourceManager, ResourcePath};
use crate::error::{StartupError, StartupResult};

const VERSION_HEADER: &[u8] = b"#version 450 core\n\0";


#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum ShaderType {
	Vertex = gl::VERTEX_SHADER,
	Fragment = gl::FRAGMENT_SHADER,
}

#[derive(Hash, Clone, Debug, Eq, PartialEq)]
pub struct ShaderDef {
	pub path: ResourcePath,
	pub shader_type: ShaderType,
}

impl ShaderDef {
	pub fn vertex(path: impl Into<ResourcePath>) -> ShaderDef {
		ShaderDef { path: path.into(), shader_type: ShaderType::Vertex }
	}

	pub fn fragment(path: impl Into<ResourcePath>) -> ShaderDef {
		ShaderDef { path: path.into(), shader_type: ShaderType::Fragment }
	}
}


#[derive(Debug)]
pub struct ShaderObject {
	pub name: u32,
	pub shader_type: ShaderType,
}


pub fn compile_shader(resource_manager: &ResourceManager, def: &ShaderDef) -> StartupResult<ShaderObject> {
	// Read before touching GL so a missing file leaves no objects behind
	let content = resource_manager.load_text(&def.path)
		.map_err(|source| StartupError::ShaderSource { path: def.path.clone(), source })?;

	let src_cstring = std::ffi::CString::new(content)
		.map_err(|_| StartupError::Compile {
			shader_type: def.shader_type,
			path: def.path.clone(),
			log: "source contains a nul byte".into(),
		})?;

	let shader_name;

	unsafe {
		shader_name = gl::CreateShader(def.shader_type as u32);
		if shader_name == 0 {
			return Err(StartupError::Compile {
				shader_type: def.shader_type,
				path: def.path.clone(),
				log: "glCreateShader returned 0".into(),
			});
		}

		let source_strings = [
			VERSION_HEADER.as_ptr().cast(),
			src_cstring.as_ptr(),
		];

		gl::ShaderSource(shader_name, source_strings.len() as _, source_strings.as_ptr(), std::ptr::null());
		gl::CompileShader(shader_name);

		let mut status = 0;
		gl::GetShaderiv(shader_name, gl::COMPILE_STATUS, &mut status);

		if status == 0 {
			let log = shader_info_log(shader_name);
			gl::DeleteShader(shader_name);

			return Err(StartupError::Compile {
				shader_type: def.shader_type,
				path: def.path.clone(),
				log,
			});
		}

		if let Some(path_str) = def.path.to_str() {
			gl::ObjectLabel(gl::SHADER, shader_name, path_str.len() as i32, path_str.as_ptr().cast());
		}
	}

	Ok(ShaderObject {
		name: shader_name,
		shader_type: def.shader_type,
	})
}


fn shader_info_log(shader_name: u32) -> String {
	let mut len = 0;
	unsafe {
		gl::GetShaderiv(shader_name, gl::INFO_LOG_LENGTH, &mut len);
	}

	let mut buf = vec![0u8; len.max(1) as usize];
	let mut written = 0;
	unsafe {
		gl::GetShaderInfoLog(shader_name, buf.len() as _, &mut written, buf.as_mut_ptr().cast());
	}

	buf.truncate(written.max(0) as usize);
	String::from_utf8_lossy(&buf).trim_end().to_owned()
}
