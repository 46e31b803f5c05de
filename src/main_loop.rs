use crate::config::Config;
use crate::context::check_required_functions;
use crate::error::{StartupError, StartupResult};
use crate::frame_timing::FrameTimer;
use crate::input::{InputEvent, InputState, Key};
use glam::UVec2;
use std::ffi::CString;
use std::num::NonZeroU32;
use std::time::Instant;

use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version};
use glutin::display::{Display, DisplayApiPreference};
use glutin::prelude::*;
use glutin::surface::{Surface, SwapInterval, WindowSurface};
use glutin_winit::GlWindow;
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};

use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, Event, KeyboardInput, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::{CursorGrabMode, Window, WindowBuilder};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = -1;


pub trait MainLoop {
	/// Records and submits one frame. Called right before the buffer swap.
	fn present(&mut self);

	/// Applies the input gathered since the last frame.
	fn update(&mut self, input: &mut InputState, delta_seconds: f32);

	fn resize(&mut self, backbuffer_size: UVec2);
}


#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
	Uninitialized,
	Running,
	Terminated { exit_code: i32 },
}

impl LoopState {
	pub fn started(self) -> LoopState {
		match self {
			LoopState::Uninitialized => LoopState::Running,
			other => other,
		}
	}

	/// Startup errors end the program no matter how far along it got.
	pub fn failed(self) -> LoopState {
		match self {
			LoopState::Terminated{..} => self,
			_ => LoopState::Terminated { exit_code: EXIT_FAILURE },
		}
	}

	pub fn close(self) -> LoopState {
		match self {
			LoopState::Running => LoopState::Terminated { exit_code: EXIT_SUCCESS },
			other => other,
		}
	}

	pub fn is_running(self) -> bool {
		self == LoopState::Running
	}

	pub fn exit_code(self) -> Option<i32> {
		match self {
			LoopState::Terminated { exit_code } => Some(exit_code),
			_ => None,
		}
	}
}



/// Prefers the config with the fewest samples.
fn pick_config<C>(configs: impl Iterator<Item = C>, num_samples: impl Fn(&C) -> u8) -> StartupResult<C> {
	configs
		.reduce(|best, config| if num_samples(&config) < num_samples(&best) { config } else { best })
		.ok_or_else(|| StartupError::WindowCreation("no framebuffer config with a 24 bit depth and 8 bit stencil buffer".into()))
}


struct GlWindowState {
	// Field order is drop order
	gl_surface: Surface<WindowSurface>,
	gl_context: PossiblyCurrentContext,
	window: Window,
}


fn create_window(event_loop: &EventLoop<()>, config: &Config) -> StartupResult<GlWindowState> {
	let (width, height) = config.window_size();

	let window = WindowBuilder::new()
		.with_title(config.title.as_str())
		.with_inner_size(PhysicalSize::new(width, height))
		.build(event_loop)
		.map_err(|err| StartupError::WindowCreation(err.to_string()))?;

	#[cfg(target_os = "windows")]
	let preference = DisplayApiPreference::Wgl(Some(window.raw_window_handle()));

	#[cfg(target_os = "macos")]
	let preference = DisplayApiPreference::Cgl;

	#[cfg(all(unix, not(target_os = "macos")))]
	let preference = DisplayApiPreference::Egl;

	let gl_display = unsafe { Display::new(event_loop.raw_display_handle(), preference) }
		.map_err(|err| StartupError::GraphicsContextLoad(format!("display creation failed: {err}")))?;

	let template = ConfigTemplateBuilder::new()
		.with_depth_size(24)
		.with_stencil_size(8)
		.compatible_with_native_window(window.raw_window_handle())
		.build();

	let configs = unsafe { gl_display.find_configs(template) }
		.map_err(|err| StartupError::WindowCreation(format!("couldn't query framebuffer configs: {err}")))?;

	let gl_config = pick_config(configs, |config| config.num_samples())?;

	tracing::debug!(samples = gl_config.num_samples(), api = %gl_display.version_string(), "picked framebuffer config");

	let context_attributes = ContextAttributesBuilder::new()
		.with_profile(GlProfile::Core)
		.with_context_api(ContextApi::OpenGl(Some(Version::new(4, 5))))
		.build(Some(window.raw_window_handle()));

	let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
		.map_err(|err| StartupError::GraphicsContextLoad(format!("context creation failed: {err}")))?;

	let surface_attributes = window.build_surface_attributes(Default::default());
	let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
		.map_err(|err| StartupError::GraphicsContextLoad(format!("surface creation failed: {err}")))?;

	let gl_context = not_current.make_current(&gl_surface)
		.map_err(|err| StartupError::GraphicsContextLoad(format!("couldn't make context current: {err}")))?;

	gl::load_with(|symbol| match CString::new(symbol) {
		Ok(symbol) => gl_display.get_proc_address(&symbol).cast(),
		Err(_) => std::ptr::null(),
	});

	check_required_functions()?;

	let interval = if config.vsync {
		SwapInterval::Wait(NonZeroU32::MIN)
	} else {
		SwapInterval::DontWait
	};

	if let Err(err) = gl_surface.set_swap_interval(&gl_context, interval) {
		tracing::warn!("couldn't set swap interval {interval:?}: {err}");
	}

	let grab = window.set_cursor_grab(CursorGrabMode::Confined)
		.or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));

	if let Err(err) = grab {
		tracing::warn!("couldn't capture cursor: {err}");
	}

	window.set_cursor_visible(false);

	tracing::info!(width, height, vsync = config.vsync, "window created");

	Ok(GlWindowState { gl_surface, gl_context, window })
}



/// Creates the window, hands a live context to `init`, then runs frames until closed.
/// Returns the process exit code.
pub fn run<F, M>(config: &Config, init: F) -> i32
	where F: FnOnce(&Config, UVec2) -> anyhow::Result<M>
		, M: MainLoop
{
	let mut state = LoopState::Uninitialized;
	let mut event_loop = EventLoop::new();

	let gl_window = match create_window(&event_loop, config) {
		Ok(gl_window) => gl_window,
		Err(err) => {
			tracing::error!("{:#}", anyhow::Error::from(err));
			return state.failed().exit_code().unwrap_or(EXIT_FAILURE);
		}
	};

	let size = gl_window.window.inner_size();

	let mut app = match init(config, UVec2::new(size.width, size.height)) {
		Ok(app) => app,
		Err(err) => {
			tracing::error!("{err:#}");
			return state.failed().exit_code().unwrap_or(EXIT_FAILURE);
		}
	};

	state = state.started();

	let mut input = InputState::new();
	let mut timer = FrameTimer::new(Instant::now());
	let mut focused = true;

	event_loop.run_return(|event, _, control_flow| {
		*control_flow = ControlFlow::Poll;

		match event {
			Event::WindowEvent { event, .. } => match event {
				WindowEvent::CloseRequested => input.push(InputEvent::CloseRequested),

				WindowEvent::KeyboardInput { input: KeyboardInput { virtual_keycode: Some(code), state: key_state, .. }, .. } => {
					if let Some(key) = Key::from_virtual_keycode(code) {
						input.push(InputEvent::Key { key, pressed: key_state == ElementState::Pressed });
					}
				}

				WindowEvent::Resized(new_size) => {
					if let (Some(width), Some(height)) = (NonZeroU32::new(new_size.width), NonZeroU32::new(new_size.height)) {
						gl_window.gl_surface.resize(&gl_window.gl_context, width, height);
						app.resize(UVec2::new(new_size.width, new_size.height));
					}
				}

				WindowEvent::Focused(now_focused) => {
					focused = now_focused;
					if !focused {
						input.clear_keys();
					}
				}

				_ => {}
			}

			Event::DeviceEvent { event: DeviceEvent::MouseMotion { delta: (dx, dy) }, .. } => {
				if focused {
					input.push(InputEvent::MouseMotion { dx: dx as f32, dy: dy as f32 });
				}
			}

			Event::MainEventsCleared => {
				if !state.is_running() {
					return
				}

				app.present();

				if let Err(err) = gl_window.gl_surface.swap_buffers(&gl_window.gl_context) {
					tracing::warn!("swap failed: {err}");
				}

				app.update(&mut input, timer.delta_seconds());

				timer.tick(Instant::now());
				timer.print_fps();

				if input.close_requested() {
					state = state.close();
				}

				if let Some(exit_code) = state.exit_code() {
					*control_flow = ControlFlow::ExitWithCode(exit_code);
				}
			}

			_ => {}
		}
	});

	// GL objects go while the context is still current
	drop(app);
	drop(gl_window);

	println!();

	match timer.average_fps() {
		Some(fps) => tracing::info!(frames = timer.frame_count(), "closed, averaged {fps:.1} fps"),
		None => tracing::info!("closed before the first frame"),
	}

	state.exit_code().unwrap_or(EXIT_SUCCESS)
}
