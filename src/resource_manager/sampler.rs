#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
#[repr(u32)]
pub enum AddressingMode {
	Repeat = gl::REPEAT,
	ClampToEdge = gl::CLAMP_TO_EDGE,
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
#[repr(u32)]
pub enum FilterMode {
	Linear = gl::LINEAR,
	LinearMipmapLinear = gl::LINEAR_MIPMAP_LINEAR,
}

/// Fixed texture parameters baked into a texture at upload time.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct SamplerDef {
	pub addressing_mode: AddressingMode,
	pub minify_filter: FilterMode,
	pub magnify_filter: FilterMode,
}

impl SamplerDef {
	/// Used for every 2D texture loaded from disk.
	pub fn repeat_mipmapped() -> SamplerDef {
		SamplerDef {
			addressing_mode: AddressingMode::Repeat,
			minify_filter: FilterMode::LinearMipmapLinear,
			magnify_filter: FilterMode::Linear,
		}
	}

	/// Used for cubemaps and render targets.
	pub fn linear_clamped() -> SamplerDef {
		SamplerDef {
			addressing_mode: AddressingMode::ClampToEdge,
			minify_filter: FilterMode::Linear,
			magnify_filter: FilterMode::Linear,
		}
	}

	pub fn apply_to_texture(&self, texture_name: u32) {
		unsafe {
			gl::TextureParameteri(texture_name, gl::TEXTURE_MIN_FILTER, self.minify_filter as i32);
			gl::TextureParameteri(texture_name, gl::TEXTURE_MAG_FILTER, self.magnify_filter as i32);

			gl::TextureParameteri(texture_name, gl::TEXTURE_WRAP_S, self.addressing_mode as i32);
			gl::TextureParameteri(texture_name, gl::TEXTURE_WRAP_T, self.addressing_mode as i32);
			gl::TextureParameteri(texture_name, gl::TEXTURE_WRAP_R, self.addressing_mode as i32);
		}
	}
}
