//! Pan/zoom camera over the graph's world plane.
//!
//! Screen = world × k + (x, y). Panning works in raw screen pixels, wheel zoom keeps
//! the point under the cursor fixed, and [`Viewport::frame_to`] centers a world point.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::types::Vec2;

/// Easing for animated camera moves: fast start, gentle landing.
pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Screen = world × `k` + (`x`, `y`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal translation in screen pixels.
	pub x: f64,
	/// Vertical translation in screen pixels.
	pub y: f64,
	/// Scale factor.
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	/// Inverse of [`world_to_screen`](Self::world_to_screen).
	pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
		Vec2::new((screen.x - self.x) / self.k, (screen.y - self.y) / self.k)
	}

	/// Where a world point lands on the canvas.
	pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
		Vec2::new(world.x * self.k + self.x, world.y * self.k + self.y)
	}

	fn lerp(&self, to: &ViewTransform, t: f64) -> ViewTransform {
		ViewTransform {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			k: self.k + (to.k - self.k) * t,
		}
	}
}

/// Camera tunables. Out-of-range values are repaired by [`ViewportConfig::normalized`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
	/// Smallest allowed scale.
	pub min_zoom: f64,
	/// Largest allowed scale.
	pub max_zoom: f64,
	/// Scale change per unit of wheel `deltaY`.
	pub wheel_sensitivity: f64,
	/// Seconds an animated `frame_to` takes.
	pub frame_duration: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			min_zoom: 0.1,
			max_zoom: 4.0,
			wheel_sensitivity: 0.001,
			frame_duration: 0.45,
		}
	}
}

impl ViewportConfig {
	/// Repair a config that would otherwise misbehave: non-positive or non-finite zoom
	/// bounds fall back to the defaults, inverted bounds are swapped, and a negative
	/// sensitivity or duration is reset.
	pub fn normalized(self) -> Self {
		let defaults = Self::default();
		let positive = |v: f64, fallback: f64| if v.is_finite() && v > 0.0 { v } else { fallback };
		let non_negative =
			|v: f64, fallback: f64| if v.is_finite() && v >= 0.0 { v } else { fallback };

		let min_zoom = positive(self.min_zoom, defaults.min_zoom);
		let max_zoom = positive(self.max_zoom, defaults.max_zoom);
		let fixed = Self {
			min_zoom: min_zoom.min(max_zoom),
			max_zoom: min_zoom.max(max_zoom),
			wheel_sensitivity: non_negative(self.wheel_sensitivity, defaults.wheel_sensitivity),
			frame_duration: non_negative(self.frame_duration, defaults.frame_duration),
		};
		if fixed != self {
			warn!("viewport config adjusted: {self:?} -> {fixed:?}");
		}
		fixed
	}

	/// Clamp `k` into `[min_zoom, max_zoom]`. Never panics, even on a config that
	/// skipped [`normalized`](Self::normalized).
	pub fn clamp_zoom(&self, k: f64) -> f64 {
		k.max(self.min_zoom).min(self.max_zoom)
	}
}

/// Background drag: idle → panning → idle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PanGesture {
	/// No drag in progress.
	#[default]
	Idle,
	/// Dragging the background.
	Panning {
		/// Screen position of the previous pointer event.
		last: Vec2,
	},
}

#[derive(Clone, Debug, PartialEq)]
struct FrameAnimation {
	from: ViewTransform,
	to: ViewTransform,
	elapsed: f64,
	duration: f64,
}

/// Camera state for one canvas: transform, pan gesture and any running `frame_to`.
#[derive(Clone, Debug, Default)]
pub struct Viewport {
	transform: ViewTransform,
	config: ViewportConfig,
	gesture: PanGesture,
	/// Measured container size; `None` until the host element has mounted.
	size: Option<(f64, f64)>,
	animation: Option<FrameAnimation>,
}

impl Viewport {
	/// Unmounted viewport at identity. `config` is normalized first.
	pub fn new(config: ViewportConfig) -> Self {
		Self {
			config: config.normalized(),
			..Self::default()
		}
	}

	/// Current transform.
	pub fn transform(&self) -> ViewTransform {
		self.transform
	}

	/// Effective (normalized) config.
	pub fn config(&self) -> &ViewportConfig {
		&self.config
	}

	/// Current pan state.
	pub fn gesture(&self) -> PanGesture {
		self.gesture
	}

	/// Whether a background drag is in progress.
	pub fn is_panning(&self) -> bool {
		matches!(self.gesture, PanGesture::Panning { .. })
	}

	/// Container size, once known.
	pub fn size(&self) -> Option<(f64, f64)> {
		self.size
	}

	/// Record the measured container size. Enables [`frame_to`](Self::frame_to).
	pub fn set_size(&mut self, width: f64, height: f64) {
		self.size = Some((width, height));
	}

	/// Idle → panning. Cancels a running camera animation.
	pub fn begin_pan(&mut self, screen: Vec2) {
		self.animation = None;
		self.gesture = PanGesture::Panning { last: screen };
		debug!("pan started at ({:.0}, {:.0})", screen.x, screen.y);
	}

	/// Apply the pixel delta since the previous event. Returns `false` when idle.
	pub fn pan_move(&mut self, screen: Vec2) -> bool {
		let PanGesture::Panning { last } = self.gesture else {
			return false;
		};
		let delta = screen - last;
		self.transform.x += delta.x;
		self.transform.y += delta.y;
		self.gesture = PanGesture::Panning { last: screen };
		true
	}

	/// Panning → idle. Harmless when already idle.
	pub fn end_pan(&mut self) {
		if self.is_panning() {
			debug!("pan ended");
		}
		self.gesture = PanGesture::Idle;
	}

	/// Zoom by a wheel event at `pointer`, keeping the world point under it fixed.
	pub fn wheel(&mut self, pointer: Vec2, delta_y: f64) {
		let old_k = self.transform.k;
		let new_k = self
			.config
			.clamp_zoom(old_k * (1.0 - delta_y * self.config.wheel_sensitivity));
		if !new_k.is_finite() {
			return;
		}
		self.animation = None;
		let ratio = new_k / old_k;
		self.transform.x = pointer.x - (pointer.x - self.transform.x) * ratio;
		self.transform.y = pointer.y - (pointer.y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Center `world` in the container at `scale`. No-op (returns `false`) before
	/// the container has been measured.
	pub fn frame_to(&mut self, world: Vec2, scale: f64, animate: bool) -> bool {
		let Some((width, height)) = self.size else {
			warn!("frame_to ignored: viewport container not mounted");
			return false;
		};
		let k = self.config.clamp_zoom(scale);
		let target = ViewTransform {
			x: width / 2.0 - world.x * k,
			y: height / 2.0 - world.y * k,
			k,
		};
		debug!(
			"framing ({:.1}, {:.1}) at {k:.2}{}",
			world.x,
			world.y,
			if animate { " (animated)" } else { "" }
		);

		if animate && self.config.frame_duration > 0.0 {
			self.animation = Some(FrameAnimation {
				from: self.transform,
				to: target,
				elapsed: 0.0,
				duration: self.config.frame_duration,
			});
		} else {
			self.animation = None;
			self.transform = target;
		}
		true
	}

	/// Whether an animated `frame_to` is still running.
	pub fn is_animating(&self) -> bool {
		self.animation.is_some()
	}

	/// Advance a running `frame_to` animation by `dt` seconds.
	pub fn advance(&mut self, dt: f64) {
		let Some(anim) = self.animation.as_mut() else {
			return;
		};
		anim.elapsed += dt;
		let t = (anim.elapsed / anim.duration).min(1.0);
		if t >= 1.0 {
			self.transform = anim.to;
			self.animation = None;
		} else {
			self.transform = anim.from.lerp(&anim.to, ease_out_cubic(t));
		}
	}
}
