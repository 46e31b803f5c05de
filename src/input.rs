use crate::camera::{Camera, Movement};
use std::collections::{HashSet, VecDeque};
use winit::event::VirtualKeyCode;


#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum Key {
	Forward,
	Back,
	Left,
	Right,
	Up,
	Down,
	Escape,
}

impl Key {
	pub fn from_virtual_keycode(code: VirtualKeyCode) -> Option<Key> {
		match code {
			VirtualKeyCode::W => Some(Key::Forward),
			VirtualKeyCode::S => Some(Key::Back),
			VirtualKeyCode::A => Some(Key::Left),
			VirtualKeyCode::D => Some(Key::Right),
			VirtualKeyCode::E => Some(Key::Up),
			VirtualKeyCode::Q => Some(Key::Down),
			VirtualKeyCode::Escape => Some(Key::Escape),
			_ => None,
		}
	}
}


#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
	Key { key: Key, pressed: bool },
	MouseMotion { dx: f32, dy: f32 },
	CloseRequested,
}


/// Events are queued as the window delivers them and only applied when the frame drains them.
#[derive(Debug, Default)]
pub struct InputState {
	queue: VecDeque<InputEvent>,
	held_keys: HashSet<Key>,
	close_requested: bool,
}

impl InputState {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, event: InputEvent) {
		self.queue.push_back(event);
	}

	/// Applies every queued event in arrival order. Look changes hit the camera immediately.
	pub fn drain_into(&mut self, camera: &mut Camera) {
		while let Some(event) = self.queue.pop_front() {
			match event {
				InputEvent::Key { key: Key::Escape, pressed: true } => self.close_requested = true,
				InputEvent::Key { key, pressed: true } => { self.held_keys.insert(key); }
				InputEvent::Key { key, pressed: false } => { self.held_keys.remove(&key); }
				InputEvent::MouseMotion { dx, dy } => camera.apply_look(dx, dy),
				InputEvent::CloseRequested => self.close_requested = true,
			}
		}
	}

	pub fn is_held(&self, key: Key) -> bool {
		self.held_keys.contains(&key)
	}

	pub fn movement(&self) -> Movement {
		Movement {
			forward: self.is_held(Key::Forward),
			back: self.is_held(Key::Back),
			left: self.is_held(Key::Left),
			right: self.is_held(Key::Right),
			up: self.is_held(Key::Up),
			down: self.is_held(Key::Down),
		}
	}

	/// Lost focus means we never see the releases.
	pub fn clear_keys(&mut self) {
		self.held_keys.clear();
	}

	pub fn close_requested(&self) -> bool {
		self.close_requested
	}
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keycodes_map_to_movement_keys() {
		assert_eq!(Key::from_virtual_keycode(VirtualKeyCode::W), Some(Key::Forward));
		assert_eq!(Key::from_virtual_keycode(VirtualKeyCode::Q), Some(Key::Down));
		assert_eq!(Key::from_virtual_keycode(VirtualKeyCode::E), Some(Key::Up));
		assert_eq!(Key::from_virtual_keycode(VirtualKeyCode::Escape), Some(Key::Escape));
		assert_eq!(Key::from_virtual_keycode(VirtualKeyCode::Space), None);
	}

	#[test]
	fn events_apply_only_when_drained() {
		let mut input = InputState::new();
		let mut camera = Camera::default();

		input.push(InputEvent::Key { key: Key::Forward, pressed: true });
		input.push(InputEvent::MouseMotion { dx: 50.0, dy: 0.0 });

		assert_eq!(input.queue.len(), 2);
		assert!(!input.is_held(Key::Forward));
		assert_eq!(camera.yaw, -90.0);

		input.drain_into(&mut camera);

		assert!(input.queue.is_empty());
		assert!(input.movement().forward);
		assert!((camera.yaw - -85.0).abs() < 1e-4);
	}

	#[test]
	fn mouse_motion_applies_in_order() {
		let mut input = InputState::new();
		let mut camera = Camera::default();

		// Driving pitch past the limit first and back second only works if order is kept
		input.push(InputEvent::MouseMotion { dx: 0.0, dy: -2000.0 });
		input.push(InputEvent::MouseMotion { dx: 0.0, dy: 100.0 });
		input.drain_into(&mut camera);

		assert!((camera.pitch - 79.0).abs() < 1e-4);
	}

	#[test]
	fn release_stops_movement() {
		let mut input = InputState::new();
		let mut camera = Camera::default();

		input.push(InputEvent::Key { key: Key::Left, pressed: true });
		input.push(InputEvent::Key { key: Key::Up, pressed: true });
		input.drain_into(&mut camera);
		assert_eq!(input.movement(), Movement { left: true, up: true, ..Movement::default() });

		input.push(InputEvent::Key { key: Key::Left, pressed: false });
		input.drain_into(&mut camera);
		assert_eq!(input.movement(), Movement { up: true, ..Movement::default() });

		input.clear_keys();
		assert_eq!(input.movement(), Movement::default());
	}

	#[test]
	fn escape_and_close_request_set_close_flag() {
		let mut camera = Camera::default();

		let mut input = InputState::new();
		input.push(InputEvent::Key { key: Key::Escape, pressed: true });
		assert!(!input.close_requested());
		input.drain_into(&mut camera);
		assert!(input.close_requested());

		let mut input = InputState::new();
		input.push(InputEvent::CloseRequested);
		input.drain_into(&mut camera);
		assert!(input.close_requested());
	}

	#[test]
	fn escape_release_does_not_close() {
		let mut camera = Camera::default();
		let mut input = InputState::new();

		input.push(InputEvent::Key { key: Key::Escape, pressed: false });
		input.drain_into(&mut camera);

		assert!(!input.close_requested());
		assert!(!input.is_held(Key::Escape));
	}
}
