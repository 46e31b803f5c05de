use std::io::Write;
use std::time::{Duration, Instant};


#[derive(Debug)]
pub struct FrameTimer {
	previous: Instant,
	delta: Duration,

	frame_count: u64,
	total: Duration,
}

impl FrameTimer {
	pub fn new(now: Instant) -> Self {
		FrameTimer {
			previous: now,
			delta: Duration::ZERO,
			frame_count: 0,
			total: Duration::ZERO,
		}
	}

	/// Records a frame boundary. A `now` earlier than the previous tick counts as no time passing.
	pub fn tick(&mut self, now: Instant) -> f32 {
		self.delta = now.saturating_duration_since(self.previous);
		self.previous = now;

		self.frame_count += 1;
		self.total += self.delta;

		self.delta_seconds()
	}

	pub fn delta_seconds(&self) -> f32 {
		self.delta.as_secs_f32()
	}

	pub fn frame_count(&self) -> u64 {
		self.frame_count
	}

	/// None until the first frame has taken measurable time.
	pub fn fps(&self) -> Option<f32> {
		let delta = self.delta_seconds();
		(delta > 0.0).then(|| 1.0 / delta)
	}

	pub fn average_fps(&self) -> Option<f32> {
		let total = self.total.as_secs_f32();
		(self.frame_count > 0 && total > 0.0).then(|| self.frame_count as f32 / total)
	}

	/// Rewrites the current console line with this frame's rate.
	pub fn print_fps(&self) {
		let Some(fps) = self.fps() else {
			return
		};

		let mut stdout = std::io::stdout().lock();
		let _ = write!(stdout, "\r{fps:.0}FPS");
		let _ = stdout.flush();
	}
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn delta_is_time_between_ticks() {
		let start = Instant::now();
		let mut timer = FrameTimer::new(start);

		let delta = timer.tick(start + Duration::from_millis(16));
		assert!((delta - 0.016).abs() < 1e-6);

		let delta = timer.tick(start + Duration::from_millis(48));
		assert!((delta - 0.032).abs() < 1e-6);
		assert_eq!(timer.frame_count(), 2);
	}

	#[test]
	fn delta_is_never_negative() {
		let start = Instant::now() + Duration::from_secs(1);
		let mut timer = FrameTimer::new(start);

		let delta = timer.tick(start - Duration::from_millis(500));
		assert_eq!(delta, 0.0);
		assert_eq!(timer.fps(), None);

		for step in 0..10u64 {
			let delta = timer.tick(start + Duration::from_millis(step * 3));
			assert!(delta >= 0.0);
		}
	}

	#[test]
	fn fps_and_average() {
		let start = Instant::now();
		let mut timer = FrameTimer::new(start);
		assert_eq!(timer.average_fps(), None);

		timer.tick(start + Duration::from_millis(10));
		timer.tick(start + Duration::from_millis(40));

		assert!((timer.fps().unwrap() - 1.0 / 0.030).abs() < 0.01);
		assert!((timer.average_fps().unwrap() - 50.0).abs() < 0.01);
	}
}
