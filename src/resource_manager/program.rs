use super::{ResourceManager, ShaderHandle, ShaderType};
use crate::error::{StartupError, StartupResult};
use glam::{Mat4, Vec3, Vec4};
use std::collections::HashMap;

/// Sampler uniforms that are pinned to texture unit 0 at link time.
pub const SAMPLER_UNIFORMS: [&str; 2] = ["diffuse_map", "cube_map"];


#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProgramDef {
	pub label: String,
	pub stages: Vec<ShaderHandle>,
}

impl ProgramDef {
	pub fn new(label: impl Into<String>, vertex: ShaderHandle, fragment: ShaderHandle) -> ProgramDef {
		ProgramDef {
			label: label.into(),
			stages: vec![vertex, fragment],
		}
	}
}


#[derive(Debug)]
pub struct ProgramObject {
	pub name: u32,
	pub label: String,
	pub stages: Vec<ShaderHandle>,
	pub uniforms: HashMap<String, i32>,
}

impl ProgramObject {
	/// -1 for unknown names, which GL silently ignores.
	pub fn uniform_location(&self, name: &str) -> i32 {
		match self.uniforms.get(name) {
			Some(&location) => location,
			None => {
				tracing::trace!("program '{}' has no active uniform '{name}'", self.label);
				-1
			}
		}
	}

	pub fn bind(&self) {
		unsafe {
			gl::UseProgram(self.name);
		}
	}

	pub fn set_mat4(&self, name: &str, value: &Mat4) {
		let columns = value.to_cols_array();
		unsafe {
			gl::ProgramUniformMatrix4fv(self.name, self.uniform_location(name), 1, gl::FALSE, columns.as_ptr());
		}
	}

	pub fn set_vec3(&self, name: &str, value: Vec3) {
		unsafe {
			gl::ProgramUniform3f(self.name, self.uniform_location(name), value.x, value.y, value.z);
		}
	}

	pub fn set_vec4(&self, name: &str, value: Vec4) {
		unsafe {
			gl::ProgramUniform4f(self.name, self.uniform_location(name), value.x, value.y, value.z, value.w);
		}
	}

	pub fn set_int(&self, name: &str, value: i32) {
		unsafe {
			gl::ProgramUniform1i(self.name, self.uniform_location(name), value);
		}
	}
}


pub fn link_program(resource_manager: &ResourceManager, def: &ProgramDef) -> StartupResult<ProgramObject> {
	let link_error = |log: String| StartupError::Link { label: def.label.clone(), log };

	if def.stages.len() < 2 {
		return Err(link_error(format!("need at least two stages, got {}", def.stages.len())));
	}

	let mut stage_names = Vec::with_capacity(def.stages.len());
	let mut seen_types = Vec::with_capacity(def.stages.len());

	for &handle in def.stages.iter() {
		let object = resource_manager.resolve_shader(handle)
			.ok_or_else(|| link_error(format!("{handle:?} was released or never compiled")))?;

		if seen_types.contains(&object.shader_type) {
			return Err(link_error(format!("more than one {:?} stage", object.shader_type)));
		}

		seen_types.push(object.shader_type);
		stage_names.push(object.name);
	}

	for required in [ShaderType::Vertex, ShaderType::Fragment] {
		if !seen_types.contains(&required) {
			return Err(link_error(format!("missing {required:?} stage")));
		}
	}

	let program_name;

	unsafe {
		program_name = gl::CreateProgram();
		if program_name == 0 {
			return Err(link_error("glCreateProgram returned 0".into()));
		}

		for &name in stage_names.iter() {
			gl::AttachShader(program_name, name);
		}

		gl::LinkProgram(program_name);

		// Stages stay alive through other programs sharing them; this one no longer needs them
		for &name in stage_names.iter() {
			gl::DetachShader(program_name, name);
		}

		let mut status = 0;
		gl::GetProgramiv(program_name, gl::LINK_STATUS, &mut status);

		if status == 0 {
			let log = program_info_log(program_name);
			gl::DeleteProgram(program_name);
			return Err(link_error(log));
		}

		gl::ObjectLabel(gl::PROGRAM, program_name, def.label.len() as i32, def.label.as_ptr().cast());
	}

	let uniforms = reflect_uniforms(program_name)
		.map_err(|err| link_error(format!("uniform reflection failed: {err}")))?;

	let object = ProgramObject {
		name: program_name,
		label: def.label.clone(),
		stages: def.stages.clone(),
		uniforms,
	};

	for sampler in SAMPLER_UNIFORMS {
		if object.uniforms.contains_key(sampler) {
			object.set_int(sampler, 0);
		}
	}

	Ok(object)
}


fn program_info_log(program_name: u32) -> String {
	let mut len = 0;
	unsafe {
		gl::GetProgramiv(program_name, gl::INFO_LOG_LENGTH, &mut len);
	}

	let mut buf = vec![0u8; len.max(1) as usize];
	let mut written = 0;
	unsafe {
		gl::GetProgramInfoLog(program_name, buf.len() as _, &mut written, buf.as_mut_ptr().cast());
	}

	buf.truncate(written.max(0) as usize);
	String::from_utf8_lossy(&buf).trim_end().to_owned()
}


fn reflect_uniforms(program_name: u32) -> Result<HashMap<String, i32>, std::string::FromUtf8Error> {
	let mut uniforms = HashMap::new();
	let mut num_uniforms = 0;

	unsafe {
		gl::GetProgramInterfaceiv(program_name, gl::UNIFORM, gl::ACTIVE_RESOURCES, &mut num_uniforms);
	}

	let property_names = [gl::NAME_LENGTH, gl::LOCATION, gl::BLOCK_INDEX];

	for uniform_idx in 0..num_uniforms {
		let mut result = [0; 3];
		unsafe {
			gl::GetProgramResourceiv(
				program_name, gl::UNIFORM,
				uniform_idx as u32,
				property_names.len() as _, property_names.as_ptr(),
				result.len() as _, std::ptr::null_mut(), result.as_mut_ptr());
		}

		let [name_length, location, block_index] = result;

		// Members of uniform blocks have no location of their own
		if block_index != -1 || location < 0 {
			continue
		}

		// Name includes null terminator which we don't care about
		let mut str_buf = vec![0u8; name_length as usize];
		unsafe {
			gl::GetProgramResourceName(
				program_name, gl::UNIFORM,
				uniform_idx as u32,
				name_length, std::ptr::null_mut(), str_buf.as_mut_ptr().cast());
		}

		str_buf.pop();
		let name = String::from_utf8(str_buf)?;

		insert_uniform(&mut uniforms, name, location);
	}

	Ok(uniforms)
}

/// Arrays of basic types are reported as `name[0]`; make them reachable by their bare name too.
fn insert_uniform(uniforms: &mut HashMap<String, i32>, name: String, location: i32) {
	if let Some(base) = name.strip_suffix("[0]") {
		uniforms.entry(base.to_owned()).or_insert(location);
	}

	uniforms.insert(name, location);
}
