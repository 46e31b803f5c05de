use crate::resource_manager::ResourcePath;
use crate::scene::LightOrbit;
use std::str::FromStr;


pub const WINDOW_HEIGHT: u32 = 600;
pub const ASPECT_RATIO: f32 = 16.0 / 9.0;
pub const WINDOW_TITLE: &str = "gl-scene";


#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FinalPassKind {
	/// Scene goes to an offscreen target which is then drawn as a full screen quad
	ScreenQuad,
	/// Scene goes straight to the window with a cubemap drawn behind it
	Skybox,
}

impl FromStr for FinalPassKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"screen_quad" | "screen-quad" | "quad" => Ok(FinalPassKind::ScreenQuad),
			"skybox" => Ok(FinalPassKind::Skybox),
			other => Err(format!("unknown final pass '{other}'")),
		}
	}
}


#[derive(Debug, Clone)]
pub struct Config {
	pub window_height: u32,
	pub aspect_ratio: f32,
	pub title: String,
	pub vsync: bool,

	pub resource_root: ResourcePath,
	pub final_pass: FinalPassKind,
	pub light: LightOrbit,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			window_height: WINDOW_HEIGHT,
			aspect_ratio: ASPECT_RATIO,
			title: WINDOW_TITLE.to_owned(),
			vsync: true,

			resource_root: ResourcePath::from("resource"),
			final_pass: FinalPassKind::ScreenQuad,
			light: LightOrbit::default(),
		}
	}
}

impl Config {
	/// Defaults, overridden by `GL_SCENE_RESOURCES`, `GL_SCENE_FINAL_PASS` and `GL_SCENE_VSYNC`.
	pub fn from_env() -> Config {
		Config::default().with_overrides(|key| std::env::var(key).ok())
	}

	pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Config {
		if let Some(root) = lookup("GL_SCENE_RESOURCES") {
			self.resource_root = ResourcePath::from(root);
		}

		if let Some(value) = lookup("GL_SCENE_FINAL_PASS") {
			match value.parse() {
				Ok(kind) => self.final_pass = kind,
				Err(err) => tracing::warn!("ignoring GL_SCENE_FINAL_PASS: {err}"),
			}
		}

		if let Some(value) = lookup("GL_SCENE_VSYNC") {
			match parse_flag(&value) {
				Some(vsync) => self.vsync = vsync,
				None => tracing::warn!("ignoring GL_SCENE_VSYNC: expected 0 or 1, got '{value}'"),
			}
		}

		self
	}

	/// Width follows the aspect ratio, truncated.
	pub fn window_size(&self) -> (u32, u32) {
		let width = (self.aspect_ratio * self.window_height as f32) as u32;
		(width, self.window_height)
	}
}


fn parse_flag(value: &str) -> Option<bool> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "on" => Some(true),
		"0" | "false" | "off" => Some(false),
		_ => None,
	}
}



#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> = pairs.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();

		move |key| map.get(key).cloned()
	}

	#[test]
	fn default_window_is_16_by_9_at_600() {
		let config = Config::default();
		assert_eq!(config.window_size(), (1066, 600));
		assert_eq!(config.final_pass, FinalPassKind::ScreenQuad);
		assert_eq!(config.resource_root, ResourcePath::from("resource"));
	}

	#[test]
	fn overrides_apply() {
		let config = Config::default().with_overrides(lookup_from(&[
			("GL_SCENE_RESOURCES", "/tmp/assets"),
			("GL_SCENE_FINAL_PASS", "Skybox"),
			("GL_SCENE_VSYNC", "0"),
		]));

		assert_eq!(config.resource_root, ResourcePath::from("/tmp/assets"));
		assert_eq!(config.final_pass, FinalPassKind::Skybox);
		assert!(!config.vsync);
	}

	#[test]
	fn bad_overrides_are_ignored() {
		let config = Config::default().with_overrides(lookup_from(&[
			("GL_SCENE_FINAL_PASS", "bloom"),
			("GL_SCENE_VSYNC", "maybe"),
		]));

		assert_eq!(config.final_pass, FinalPassKind::ScreenQuad);
		assert!(config.vsync);
	}

	#[test]
	fn final_pass_names() {
		assert_eq!("screen_quad".parse(), Ok(FinalPassKind::ScreenQuad));
		assert_eq!("quad".parse(), Ok(FinalPassKind::ScreenQuad));
		assert_eq!(" skybox ".parse(), Ok(FinalPassKind::Skybox));
		assert!("".parse::<FinalPassKind>().is_err());
	}
}
