//! Per-mount canvas state: simulation, camera and pointer interaction.

use log::debug;

use super::builder::GraphBuild;
use super::settings::GraphSettings;
use super::simulation::Simulation;
use super::types::{GraphNode, NodeKind, NodeSnapshot, Theme, Vec2};
use super::viewport::Viewport;

/// Max pointer travel (screen px) for a press on a node to still count as a click.
pub const CLICK_SLOP: f64 = 4.0;
/// Mean node speed below which the layout is reported as settled.
pub const SETTLE_SPEED: f64 = 0.01;
/// Longest frame delta fed to the camera animation, in seconds.
const MAX_FRAME_DT: f64 = 0.1;

/// Emitted when a node is clicked. Navigation is up to the host.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeClick {
	/// Stable node key (`root`, `category:<name>` or `item:<position>`).
	pub key: String,
	/// Tier of the clicked node.
	pub kind: NodeKind,
	/// World x of the node when it was pressed.
	pub x: f64,
	/// World y of the node when it was pressed.
	pub y: f64,
	/// The item's click-through target, if any.
	pub external_ref: Option<String>,
}

impl From<&NodeSnapshot> for NodeClick {
	fn from(node: &NodeSnapshot) -> Self {
		Self {
			key: node.key.clone(),
			kind: node.kind,
			x: node.x,
			y: node.y,
			external_ref: node.external_ref.clone(),
		}
	}
}

/// A pending camera move, issued through [`GraphHandle`](super::GraphHandle).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameRequest {
	/// World x to center.
	pub x: f64,
	/// World y to center.
	pub y: f64,
	/// Target zoom, clamped to the viewport's bounds.
	pub scale: f64,
	/// Ease toward the target instead of jumping.
	pub animate: bool,
}

#[derive(Clone, Debug)]
struct Press {
	click: NodeClick,
	start: Vec2,
	moved: bool,
}

/// Everything one mounted canvas owns.
pub struct CanvasState {
	/// Layout for the current node set.
	pub simulation: Simulation,
	/// Camera over the layout.
	pub viewport: Viewport,
	/// Key of the node under the pointer.
	pub hover: Option<String>,
	/// Active color theme.
	pub theme: Theme,
	/// Canvas width in CSS pixels.
	pub width: f64,
	/// Canvas height in CSS pixels.
	pub height: f64,
	press: Option<Press>,
	last_frame: Option<f64>,
	settled: bool,
}

impl CanvasState {
	/// Start a layout sized `width × height`, centered on the root at zoom 1.
	pub fn new(build: GraphBuild, settings: &GraphSettings, width: f64, height: f64) -> Self {
		let mut viewport = Viewport::new(settings.viewport.clone());
		viewport.set_size(width, height);
		viewport.frame_to(Vec2::ZERO, 1.0, false);

		Self {
			simulation: Simulation::new(build, settings.simulation.clone()),
			viewport,
			hover: None,
			theme: Theme::default(),
			width,
			height,
			press: None,
			last_frame: None,
			settled: false,
		}
	}

	/// Drop the current node set and start over from `build`.
	pub fn rebuild(&mut self, build: GraphBuild) {
		self.simulation.replace_nodes(build);
		self.hover = None;
		self.press = None;
		self.last_frame = None;
		self.settled = false;
	}

	/// Switch colors. Positions are untouched.
	pub fn set_theme(&mut self, theme: Theme) {
		self.theme = theme;
		self.simulation.set_theme(theme);
	}

	/// Container was resized.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.viewport.set_size(width, height);
	}

	/// Top-most node under a canvas-local point.
	pub fn node_at_screen(&self, screen: Vec2) -> Option<&NodeSnapshot> {
		let world = self.viewport.transform().screen_to_world(screen);
		self.simulation.node_at(world)
	}

	/// Update the hovered node. Frozen while a pan is in progress.
	pub fn hover_at(&mut self, screen: Vec2) {
		if self.viewport.is_panning() {
			return;
		}
		let hovered = self.node_at_screen(screen).map(|node| node.key.clone());
		self.hover = hovered;
	}

	/// Pointer left the canvas.
	pub fn clear_hover(&mut self) {
		self.hover = None;
	}

	/// Whether `key` is the hovered node.
	pub fn is_hovered(&self, key: &str) -> bool {
		self.hover.as_deref() == Some(key)
	}

	/// Pointer went down inside the canvas. Always starts a pan; remembers the node
	/// under the pointer in case this turns out to be a click.
	pub fn pointer_down(&mut self, screen: Vec2) {
		self.press = self.node_at_screen(screen).map(|node| Press {
			click: NodeClick::from(node),
			start: screen,
			moved: false,
		});
		self.viewport.begin_pan(screen);
	}

	/// Pointer moved anywhere in the window. Returns `true` when it panned.
	pub fn pointer_move(&mut self, screen: Vec2) -> bool {
		if let Some(press) = self.press.as_mut() {
			if (screen - press.start).length() > CLICK_SLOP {
				press.moved = true;
			}
		}
		self.viewport.pan_move(screen)
	}

	/// Ends the gesture. Returns the click if the pointer stayed on its node.
	pub fn pointer_up(&mut self, screen: Vec2) -> Option<NodeClick> {
		self.viewport.end_pan();
		let press = self.press.take()?;
		let travelled = (screen - press.start).length();
		(!press.moved && travelled <= CLICK_SLOP).then_some(press.click)
	}

	/// Gesture aborted by the host. Never a click.
	pub fn pointer_cancel(&mut self) {
		self.viewport.end_pan();
		self.press = None;
	}

	/// The pointer driving the pan went away but another one is still down: carry on
	/// panning from `screen`. Never a click.
	pub fn pointer_handoff(&mut self, screen: Vec2) {
		self.press = None;
		self.viewport.begin_pan(screen);
	}

	/// Apply a camera request. `false` if the viewport has no size yet.
	pub fn frame_to(&mut self, request: FrameRequest) -> bool {
		self.viewport.frame_to(
			Vec2::new(request.x, request.y),
			request.scale,
			request.animate,
		)
	}

	/// One animation frame: advance the camera, step the layout.
	pub fn frame(&mut self, timestamp_ms: f64) {
		let dt = self
			.last_frame
			.map(|last| ((timestamp_ms - last) / 1000.0).clamp(0.0, MAX_FRAME_DT))
			.unwrap_or(0.0);
		self.last_frame = Some(timestamp_ms);

		self.viewport.advance(dt);
		self.simulation.step();

		if !self.settled && mean_speed(self.simulation.nodes()) < SETTLE_SPEED {
			self.settled = true;
			debug!("layout settled after {} ticks", self.simulation.ticks());
		}
	}

	/// Whether mean node speed has dropped below [`SETTLE_SPEED`] since the last rebuild.
	pub fn is_settled(&self) -> bool {
		self.settled
	}
}

/// Average velocity magnitude, `0` for an empty set.
pub fn mean_speed(nodes: &[GraphNode]) -> f64 {
	if nodes.is_empty() {
		return 0.0;
	}
	nodes.iter().map(|node| node.velocity.length()).sum::<f64>() / nodes.len() as f64
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::catalog_graph::builder::{BuilderConfig, ROOT_KEY, build_graph};
	use crate::components::catalog_graph::types::{CatalogItem, CategoryAngles};

	fn state() -> CanvasState {
		let items = vec![
			CatalogItem::new("Chair", "Furniture").with_external_ref("/p/chair"),
			CatalogItem::new("Lamp", "Lighting"),
		];
		let build = build_graph(&items, &CategoryAngles::new(), &BuilderConfig::default());
		CanvasState::new(build, &GraphSettings::default(), 800.0, 600.0)
	}

	#[test]
	fn starts_centered_on_root() {
		let state = state();
		let root = state.node_at_screen(Vec2::new(400.0, 300.0)).unwrap();
		assert_eq!(root.key, ROOT_KEY);
	}

	#[test]
	fn press_and_release_on_node_is_a_click() {
		let mut state = state();
		state.pointer_down(Vec2::new(400.0, 300.0));
		state.pointer_move(Vec2::new(401.0, 301.0));
		let click = state.pointer_up(Vec2::new(401.0, 301.0)).unwrap();
		assert_eq!(click.key, ROOT_KEY);
		assert_eq!(click.kind, NodeKind::Root);
	}

	#[test]
	fn dragging_off_a_node_is_not_a_click() {
		let mut state = state();
		state.pointer_down(Vec2::new(400.0, 300.0));
		state.pointer_move(Vec2::new(440.0, 300.0));
		state.pointer_move(Vec2::new(401.0, 300.0));
		assert!(state.pointer_up(Vec2::new(401.0, 300.0)).is_none());
		assert!((state.viewport.transform().x - 401.0).abs() < 1e-9);
	}

	#[test]
	fn background_press_pans_without_click() {
		let mut state = state();
		state.pointer_down(Vec2::new(5.0, 5.0));
		assert!(state.viewport.is_panning());
		assert!(state.pointer_up(Vec2::new(5.0, 5.0)).is_none());
		assert!(!state.viewport.is_panning());
	}

	#[test]
	fn item_click_carries_external_ref() {
		let mut state = state();
		let chair = state.simulation.node("item:0").unwrap().position;
		let screen = state.viewport.transform().world_to_screen(chair);
		state.pointer_down(screen);
		let click = state.pointer_up(screen).unwrap();
		assert_eq!(click.external_ref.as_deref(), Some("/p/chair"));
	}

	#[test]
	fn handoff_keeps_panning_from_remaining_pointer() {
		let mut state = state();
		state.pointer_down(Vec2::new(400.0, 300.0));
		state.pointer_handoff(Vec2::new(100.0, 100.0));
		assert!(state.viewport.is_panning());

		let before = state.viewport.transform();
		assert!(state.pointer_move(Vec2::new(120.0, 90.0)));
		let after = state.viewport.transform();
		assert!((after.x - before.x - 20.0).abs() < 1e-9);
		assert!((after.y - before.y + 10.0).abs() < 1e-9);

		// The original press on the root no longer counts as a click.
		assert!(state.pointer_up(Vec2::new(120.0, 90.0)).is_none());
		assert!(!state.viewport.is_panning());
	}

	#[test]
	fn inverted_zoom_settings_do_not_panic() {
		let items = vec![CatalogItem::new("Chair", "Furniture")];
		let build = build_graph(&items, &CategoryAngles::new(), &BuilderConfig::default());
		let mut settings = GraphSettings::default();
		settings.viewport.min_zoom = 5.0;
		let mut state = CanvasState::new(build, &settings, 800.0, 600.0);
		state.viewport.wheel(Vec2::new(400.0, 300.0), -100.0);
		let k = state.viewport.transform().k;
		assert!((4.0..=5.0).contains(&k));
	}

	#[test]
	fn hover_is_frozen_while_panning() {
		let mut state = state();
		state.hover_at(Vec2::new(400.0, 300.0));
		assert!(state.is_hovered(ROOT_KEY));
		state.pointer_down(Vec2::new(5.0, 5.0));
		state.hover_at(Vec2::new(6.0, 6.0));
		assert!(state.is_hovered(ROOT_KEY));
		state.pointer_cancel();
		state.hover_at(Vec2::new(6.0, 6.0));
		assert!(state.hover.is_none());
	}

	#[test]
	fn frames_step_the_simulation_and_settle() {
		let mut state = state();
		for i in 0..2000 {
			state.frame(i as f64 * 16.0);
		}
		assert_eq!(state.simulation.ticks(), 2000);
		assert!(state.is_settled());
	}

	#[test]
	fn rebuild_resets_interaction() {
		let mut state = state();
		state.hover_at(Vec2::new(400.0, 300.0));
		state.frame(0.0);
		let items = vec![CatalogItem::new("Desk", "Office")];
		state.rebuild(build_graph(&items, &CategoryAngles::new(), &BuilderConfig::default()));
		assert!(state.hover.is_none());
		assert_eq!(state.simulation.ticks(), 0);
		assert!(state.simulation.node("category:Office").is_some());
	}

	#[test]
	fn mean_speed_of_empty_set_is_zero() {
		assert_eq!(mean_speed(&[]), 0.0);
	}
}
