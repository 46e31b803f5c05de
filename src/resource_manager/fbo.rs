use super::{ResourceManager, ImageHandle};
use crate::error::{StartupError, StartupResult};
use glam::UVec2;


#[derive(Clone, Default, Debug, Eq, PartialEq)]
pub struct FboDef {
	pub label: String,
	pub color_attachment_0: Option<ImageHandle>,
	pub depth_stencil_attachment: Option<ImageHandle>,
}

#[derive(Debug)]
pub struct FboObject {
	pub name: u32,
	pub viewport_size: UVec2,
}

impl FboObject {
	pub fn bind(&self) {
		unsafe {
			gl::BindFramebuffer(gl::FRAMEBUFFER, self.name);
			gl::Viewport(0, 0, self.viewport_size.x as i32, self.viewport_size.y as i32);
		}
	}
}


pub(super) fn create(resource_manager: &ResourceManager, def: &FboDef)
	-> StartupResult<FboObject>
{
	let incomplete = |status| StartupError::FramebufferIncomplete { label: def.label.clone(), status };

	let mut name = 0;

	unsafe {
		gl::CreateFramebuffers(1, &mut name);

		gl::ObjectLabel(gl::FRAMEBUFFER, name, def.label.len() as i32, def.label.as_ptr().cast());
	}

	let attachments = [
		(gl::COLOR_ATTACHMENT0, def.color_attachment_0),
		(gl::DEPTH_STENCIL_ATTACHMENT, def.depth_stencil_attachment),
	];

	let mut common_size = None;

	for (attachment_point, handle) in attachments {
		let Some(handle) = handle else {
			continue
		};

		let image = match resource_manager.resolve_image(handle) {
			Some(image) => image,
			None => {
				unsafe { gl::DeleteFramebuffers(1, &name) };
				return Err(incomplete(gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT));
			}
		};

		if common_size.is_some() && common_size != Some(image.size) {
			unsafe { gl::DeleteFramebuffers(1, &name) };
			return Err(incomplete(gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT));
		}

		common_size = Some(image.size);

		unsafe {
			gl::NamedFramebufferTexture(name, attachment_point, image.name, 0);
		}
	}

	let status = unsafe { gl::CheckNamedFramebufferStatus(name, gl::FRAMEBUFFER) };
	if status != gl::FRAMEBUFFER_COMPLETE {
		unsafe { gl::DeleteFramebuffers(1, &name) };
		return Err(incomplete(status));
	}

	Ok(FboObject {
		name,
		viewport_size: common_size.unwrap_or(UVec2::ZERO),
	})
}
