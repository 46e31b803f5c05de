use glam::{Mat4, Vec3};

pub const MOUSE_SENSITIVITY: f32 = 0.1;
pub const MOVE_SPEED: f32 = 2.0;
pub const PITCH_LIMIT: f32 = 89.0;

pub const FOV_Y_DEGREES: f32 = 45.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;


/// Which movement keys are held this frame.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Movement {
	pub forward: bool,
	pub back: bool,
	pub left: bool,
	pub right: bool,
	pub up: bool,
	pub down: bool,
}


/// Free-fly camera. Angles are in degrees.
#[derive(Debug, Clone)]
pub struct Camera {
	pub position: Vec3,
	pub front: Vec3,
	pub up: Vec3,
	pub yaw: f32,
	pub pitch: f32,
}

impl Default for Camera {
	fn default() -> Self {
		Camera {
			position: Vec3::new(0.0, 0.0, 1.0),
			front: Vec3::new(0.0, 0.0, -1.0),
			up: Vec3::Y,
			yaw: -90.0,
			pitch: 0.0,
		}
	}
}

impl Camera {
	/// Applies one relative mouse motion. Screen y grows downwards, so it subtracts from pitch.
	pub fn apply_look(&mut self, dx: f32, dy: f32) {
		self.yaw += dx * MOUSE_SENSITIVITY;
		self.pitch = (self.pitch - dy * MOUSE_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
		self.front = front_from_angles(self.yaw, self.pitch);
	}

	pub fn right(&self) -> Vec3 {
		self.front.cross(self.up).normalize()
	}

	pub fn apply_movement(&mut self, movement: Movement, delta_seconds: f32) {
		let speed = MOVE_SPEED * delta_seconds;
		let right = self.right();

		if movement.forward { self.position += self.front * speed; }
		if movement.back { self.position -= self.front * speed; }
		if movement.right { self.position += right * speed; }
		if movement.left { self.position -= right * speed; }
		if movement.up { self.position += self.up * speed; }
		if movement.down { self.position -= self.up * speed; }
	}

	pub fn view_matrix(&self) -> Mat4 {
		Mat4::look_at_rh(self.position, self.position + self.front, self.up)
	}

	/// View with the translation dropped, for geometry that should sit at infinity.
	pub fn rotation_only_view(&self) -> Mat4 {
		let mut view = self.view_matrix();
		view.w_axis = glam::Vec4::W;
		view
	}

	pub fn projection_matrix(aspect: f32) -> Mat4 {
		Mat4::perspective_rh_gl(FOV_Y_DEGREES.to_radians(), aspect, Z_NEAR, Z_FAR)
	}
}


pub fn front_from_angles(yaw: f32, pitch: f32) -> Vec3 {
	let (yaw, pitch) = (yaw.to_radians(), pitch.to_radians());

	Vec3::new(
		yaw.cos() * pitch.cos(),
		pitch.sin(),
		yaw.sin() * pitch.cos(),
	).normalize()
}



#[cfg(test)]
mod tests {
	use super::*;

	const EPSILON: f32 = 1e-4;

	fn approx_eq(a: Vec3, b: Vec3) -> bool {
		(a - b).length() < EPSILON
	}

	#[test]
	fn default_angles_match_default_front() {
		let camera = Camera::default();
		assert!(approx_eq(front_from_angles(camera.yaw, camera.pitch), camera.front));
	}

	#[test]
	fn pitch_never_leaves_limits() {
		let mut camera = Camera::default();

		for _ in 0..100 {
			camera.apply_look(0.0, -10_000.0);
			assert!(camera.pitch <= PITCH_LIMIT);
		}
		assert_eq!(camera.pitch, PITCH_LIMIT);

		camera.apply_look(0.0, 1.0e9);
		assert_eq!(camera.pitch, -PITCH_LIMIT);

		// Clamping an already clamped value changes nothing
		camera.apply_look(0.0, 0.0);
		assert_eq!(camera.pitch, -PITCH_LIMIT);
	}

	#[test]
	fn front_stays_unit_length() {
		let mut camera = Camera::default();
		let motions = [(13.0, 7.0), (-400.0, 0.5), (0.0, 2000.0), (1234.5, -999.0), (0.01, 0.01)];

		for (dx, dy) in motions {
			camera.apply_look(dx, dy);
			assert!((camera.front.length() - 1.0).abs() < EPSILON, "front {} after ({dx}, {dy})", camera.front);
		}
	}

	#[test]
	fn mouse_right_turns_right() {
		let mut camera = Camera::default();
		camera.apply_look(900.0, 0.0);
		assert!((camera.yaw - 0.0).abs() < EPSILON);
		assert!(approx_eq(camera.front, Vec3::X));
	}

	#[test]
	fn holding_w_for_a_second_moves_along_front() {
		let mut camera = Camera::default();
		let start = camera.position;
		let movement = Movement { forward: true, ..Movement::default() };

		for _ in 0..60 {
			camera.apply_movement(movement, 0.016);
		}

		let expected = start + camera.front * (60.0 * 0.016 * MOVE_SPEED);
		assert!(approx_eq(camera.position, expected));
		assert!(((camera.position - start).length() - 1.92).abs() < EPSILON);
	}

	#[test]
	fn strafe_and_vertical_axes() {
		let mut camera = Camera::default();
		camera.apply_movement(Movement { right: true, up: true, ..Movement::default() }, 0.5);

		assert!(approx_eq(camera.position, Vec3::new(1.0, 1.0, 1.0)));

		camera.apply_movement(Movement { left: true, down: true, back: true, ..Movement::default() }, 0.5);
		assert!(approx_eq(camera.position, Vec3::new(0.0, 0.0, 2.0)));
	}

	#[test]
	fn zero_delta_moves_nothing() {
		let mut camera = Camera::default();
		let all = Movement { forward: true, back: false, left: true, right: false, up: true, down: false };
		camera.apply_movement(all, 0.0);
		assert_eq!(camera.position, Camera::default().position);
	}

	#[test]
	fn rotation_only_view_ignores_position() {
		let mut camera = Camera::default();
		let before = camera.rotation_only_view();
		camera.position = Vec3::new(10.0, -3.0, 7.0);

		let after = camera.rotation_only_view();
		assert!(before.abs_diff_eq(after, EPSILON));
		assert_eq!(after.w_axis, glam::Vec4::W);
	}
}
