use super::{ResourceManager, ResourcePath, ResourcePathRef, SamplerDef};
use crate::error::{StartupError, StartupResult};
use glam::{UVec2, Vec2, Vec3};
use image::{Rgba, RgbaImage};


#[derive(Hash, Clone, Debug, Eq, PartialEq)]
pub enum ImageDef {
	Path(ResourcePath),
	Cubemap(CubemapDef),
	/// Sized to the backbuffer at creation.
	RenderTarget {
		format: u32,
	}
}

impl ImageDef {
	pub fn new(path: impl Into<ResourcePath>) -> ImageDef {
		ImageDef::Path(path.into())
	}

	pub fn render_target(format: u32) -> ImageDef {
		ImageDef::RenderTarget { format }
	}

	pub fn color_target() -> ImageDef {
		ImageDef::render_target(gl::RGB8)
	}

	pub fn depth_stencil() -> ImageDef {
		ImageDef::render_target(gl::DEPTH24_STENCIL8)
	}
}


#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TextureKind {
	Texture2D,
	Cubemap,
}


#[derive(Debug)]
pub struct ImageObject {
	pub name: u32,
	pub kind: TextureKind,
	pub size: UVec2,
	pub format: u32,
}



/// Faces in GL layer order.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum CubeFace {
	PositiveX,
	NegativeX,
	PositiveY,
	NegativeY,
	PositiveZ,
	NegativeZ,
}

impl CubeFace {
	pub const ALL: [CubeFace; 6] = [
		CubeFace::PositiveX, CubeFace::NegativeX,
		CubeFace::PositiveY, CubeFace::NegativeY,
		CubeFace::PositiveZ, CubeFace::NegativeZ,
	];

	pub fn layer(self) -> usize {
		self as usize
	}

	/// Picks the face a direction lands on and the (s, t) coordinate within it,
	/// following the major axis table of the GL cube map rules.
	pub fn from_direction(dir: Vec3) -> (CubeFace, Vec2) {
		let Vec3 { x, y, z } = dir;
		let abs = dir.abs();

		let (face, sc, tc, ma) = if abs.x >= abs.y && abs.x >= abs.z {
			if x >= 0.0 { (CubeFace::PositiveX, -z, -y, abs.x) }
			else { (CubeFace::NegativeX, z, -y, abs.x) }
		} else if abs.y >= abs.z {
			if y >= 0.0 { (CubeFace::PositiveY, x, z, abs.y) }
			else { (CubeFace::NegativeY, x, -z, abs.y) }
		} else if z >= 0.0 {
			(CubeFace::PositiveZ, x, -y, abs.z)
		} else {
			(CubeFace::NegativeZ, -x, -y, abs.z)
		};

		let st = Vec2::new(sc / ma, tc / ma) * 0.5 + 0.5;
		(face, st)
	}
}


#[derive(Hash, Clone, Debug, Eq, PartialEq)]
pub struct CubemapDef {
	/// +X, -X, +Y, -Y, +Z, -Z
	pub faces: [ResourcePath; 6],
}

impl CubemapDef {
	pub fn new(faces: [ResourcePath; 6]) -> CubemapDef {
		CubemapDef { faces }
	}
}


/// Six decoded, equally sized square face images, ready for upload.
#[derive(Debug)]
pub struct CubemapImages {
	pub size: u32,
	faces: Vec<RgbaImage>,
}

impl CubemapImages {
	/// Any face failing aborts the whole cubemap.
	pub fn decode(resource_manager: &ResourceManager, def: &CubemapDef) -> StartupResult<CubemapImages> {
		let mut faces = Vec::with_capacity(6);
		let mut size = None;

		for (face, path) in CubeFace::ALL.into_iter().zip(def.faces.iter()) {
			let cubemap_error = |reason: String| StartupError::CubemapLoad { face, path: path.clone(), reason };

			let image = decode_image(&resource_manager.resolve_path(path))
				.map_err(|err| cubemap_error(err.to_string()))?;

			if image.width() != image.height() {
				return Err(cubemap_error(format!("face is {}x{}, expected square", image.width(), image.height())));
			}

			match size {
				None => size = Some(image.width()),
				Some(expected) if expected != image.width() => {
					return Err(cubemap_error(format!("face is {0}x{0}, other faces are {expected}x{expected}", image.width())));
				}
				Some(_) => {}
			}

			faces.push(image);
		}

		Ok(CubemapImages {
			size: size.unwrap_or(0),
			faces,
		})
	}

	pub fn face(&self, face: CubeFace) -> &RgbaImage {
		&self.faces[face.layer()]
	}

	/// Nearest texel lookup, the CPU-side twin of sampling the uploaded texture.
	/// Row 0 of each image is t = 0, matching how faces are uploaded.
	pub fn sample(&self, dir: Vec3) -> Rgba<u8> {
		let (face, st) = CubeFace::from_direction(dir);
		let max = self.size.saturating_sub(1);
		let x = ((st.x * self.size as f32) as u32).min(max);
		let y = ((st.y * self.size as f32) as u32).min(max);
		*self.face(face).get_pixel(x, y)
	}
}



pub fn decode_image(path: &ResourcePathRef) -> image::ImageResult<RgbaImage> {
	Ok(image::open(path)?.into_rgba8())
}

/// Full chain down to 1x1.
pub fn mip_levels(size: UVec2) -> i32 {
	let largest = size.x.max(size.y).max(1);
	(u32::BITS - largest.leading_zeros()) as i32
}


pub(super) fn load(resource_manager: &ResourceManager, def: &ImageDef)
	-> StartupResult<ImageObject>
{
	match def {
		ImageDef::Path(path) => load_from_path(resource_manager, path),
		ImageDef::Cubemap(def) => {
			let images = CubemapImages::decode(resource_manager, def)?;
			tracing::debug!(size = images.size, horizon = ?images.sample(Vec3::Z).0, zenith = ?images.sample(Vec3::Y).0, "decoded cubemap");
			Ok(upload_cubemap(&images))
		}
		ImageDef::RenderTarget{ format } => Ok(create_rendertarget(*format, resource_manager.backbuffer_size)),
	}
}


fn load_from_path(resource_manager: &ResourceManager, path: &ResourcePathRef)
	-> StartupResult<ImageObject>
{
	let image = decode_image(&resource_manager.resolve_path(path))
		.map_err(|source| StartupError::TextureLoad { path: path.to_owned(), source })?;

	let image = image::imageops::flip_vertical(&image);
	let size = UVec2::new(image.width(), image.height());
	let format = gl::SRGB8_ALPHA8;

	let mut name = 0;

	unsafe {
		gl::CreateTextures(gl::TEXTURE_2D, 1, &mut name);
		gl::TextureStorage2D(name, mip_levels(size), format, size.x as i32, size.y as i32);

		let (level, offset_x, offset_y) = (0, 0, 0);

		gl::TextureSubImage2D(name, level, offset_x, offset_y,
			size.x as i32, size.y as i32,
			gl::RGBA,
			gl::UNSIGNED_BYTE,
			image.as_raw().as_ptr().cast());

		gl::GenerateTextureMipmap(name);

		if let Some(path_str) = path.to_str() {
			gl::ObjectLabel(gl::TEXTURE, name, path_str.len() as i32, path_str.as_ptr().cast());
		}
	}

	SamplerDef::repeat_mipmapped().apply_to_texture(name);

	Ok(ImageObject {
		name,
		kind: TextureKind::Texture2D,
		size,
		format,
	})
}


fn upload_cubemap(images: &CubemapImages) -> ImageObject {
	let size = UVec2::splat(images.size);
	let format = gl::SRGB8_ALPHA8;

	let mut name = 0;

	unsafe {
		gl::CreateTextures(gl::TEXTURE_CUBE_MAP, 1, &mut name);
		gl::TextureStorage2D(name, mip_levels(size), format, size.x as i32, size.y as i32);

		for face in CubeFace::ALL {
			let image = images.face(face);

			gl::TextureSubImage3D(name, 0, 0, 0, face.layer() as i32,
				size.x as i32, size.y as i32, 1,
				gl::RGBA,
				gl::UNSIGNED_BYTE,
				image.as_raw().as_ptr().cast());
		}

		gl::GenerateTextureMipmap(name);

		let label = "cubemap";
		gl::ObjectLabel(gl::TEXTURE, name, label.len() as i32, label.as_ptr().cast());
	}

	SamplerDef::linear_clamped().apply_to_texture(name);

	ImageObject {
		name,
		kind: TextureKind::Cubemap,
		size,
		format,
	}
}


fn create_rendertarget(format: u32, size: UVec2) -> ImageObject {
	let mut name = 0;

	unsafe {
		gl::CreateTextures(gl::TEXTURE_2D, 1, &mut name);
		gl::TextureStorage2D(name, 1, format, size.x as i32, size.y as i32);

		let label = "rendertarget";
		gl::ObjectLabel(gl::TEXTURE, name, label.len() as i32, label.as_ptr().cast());
	}

	SamplerDef::linear_clamped().apply_to_texture(name);

	ImageObject {
		name,
		kind: TextureKind::Texture2D,
		size,
		format,
	}
}
