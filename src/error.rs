use crate::resource_manager::{CubeFace, ImageHandle, ResourcePath, ShaderType};


/// Everything that can stop the program before the first frame.
/// None of these are recovered from - the caller tears down and exits with -1.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
	#[error("couldn't find resource root '{}'", .0.display())]
	ResourceRoot(ResourcePath),

	#[error("couldn't read shader source '{}'", path.display())]
	ShaderSource {
		path: ResourcePath,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to compile {shader_type:?} shader '{}':\n{log}", path.display())]
	Compile {
		shader_type: ShaderType,
		path: ResourcePath,
		log: String,
	},

	#[error("failed to link program '{label}':\n{log}")]
	Link {
		label: String,
		log: String,
	},

	#[error("failed to load texture '{}'", path.display())]
	TextureLoad {
		path: ResourcePath,
		#[source]
		source: image::ImageError,
	},

	#[error("failed to load cubemap face {face:?} from '{}': {reason}", path.display())]
	CubemapLoad {
		face: CubeFace,
		path: ResourcePath,
		reason: String,
	},

	#[error("failed to load model '{}'", path.display())]
	ModelLoad {
		path: ResourcePath,
		#[source]
		source: tobj::LoadError,
	},

	#[error("failed to resolve a material texture of model '{}'", path.display())]
	ModelTexture {
		path: ResourcePath,
		#[source]
		source: Box<StartupError>,
	},

	#[error("no image behind {0:?}")]
	UnknownImage(ImageHandle),

	#[error("framebuffer '{label}' incomplete (status {status:#x})")]
	FramebufferIncomplete {
		label: String,
		status: u32,
	},

	#[error("invalid vertex data: {0}")]
	VertexLayout(String),

	#[error("failed to create window: {0}")]
	WindowCreation(String),

	#[error("failed to load graphics context: {0}")]
	GraphicsContextLoad(String),
}

pub type StartupResult<T> = Result<T, StartupError>;
