//! Anchor-spring + repulsion particle simulation.
//!
//! Each [`Simulation::step`] pulls every node toward its anchor, pushes every pair
//! apart, then damps and integrates. There is no convergence detection: the
//! caller decides when the layout is "settled".

use std::collections::HashMap;
use std::rc::Rc;

use log::warn;
use serde::{Deserialize, Serialize};

use super::builder::GraphBuild;
use super::palette;
use super::types::{GraphNode, NodeKind, NodeSnapshot, Theme, Vec2};

/// Golden angle in degrees, used to fan out coincident pairs.
const GOLDEN_ANGLE: f64 = 137.507_764;
/// Highest damping accepted; at 1.0 velocity would never decay.
const MAX_DAMPING: f64 = 0.999;

/// Where item anchors point once the simulation is running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorMode {
	/// Items stay tethered to where their category started.
	#[default]
	Snapshot,
	/// Items are re-tethered to their category's current position every tick.
	FollowParent,
}

/// Force constants. See [`SimulationConfig::normalized`] for how bad values are repaired.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	/// Spring constant toward the anchor (no rest length).
	pub attraction: f64,
	/// Inverse-square repulsion strength.
	pub repulsion: f64,
	/// Extra push per unit of radius overlap.
	pub collision: f64,
	/// Velocity multiplier applied every tick, in `(0, 1)`.
	pub damping: f64,
	/// Floor for pair distance.
	pub min_distance: f64,
	/// How item anchors are maintained.
	pub anchor_mode: AnchorMode,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			attraction: 0.01,
			repulsion: 800.0,
			collision: 0.05,
			damping: 0.9,
			min_distance: 1.0,
			anchor_mode: AnchorMode::Snapshot,
		}
	}
}

impl SimulationConfig {
	/// Keep damping in `[0, 1)` so motion always decays, and keep the distance floor
	/// positive so the repulsion never divides by zero. Non-finite constants fall back
	/// to their defaults.
	pub fn normalized(self) -> Self {
		let defaults = Self::default();
		let finite = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
		let min_distance = if self.min_distance.is_finite() && self.min_distance > 0.0 {
			self.min_distance
		} else {
			defaults.min_distance
		};
		let fixed = Self {
			attraction: finite(self.attraction, defaults.attraction),
			repulsion: finite(self.repulsion, defaults.repulsion),
			collision: finite(self.collision, defaults.collision),
			damping: finite(self.damping, defaults.damping).clamp(0.0, MAX_DAMPING),
			min_distance,
			anchor_mode: self.anchor_mode,
		};
		if fixed != self {
			warn!("simulation config adjusted: {self:?} -> {fixed:?}");
		}
		fixed
	}
}

/// The pairwise push-apart pass. Swap this out for a spatial partition when
/// node counts outgrow O(n²).
pub trait RepulsionPass {
	/// Add the push-apart impulses for this tick to every node's velocity.
	fn apply(&self, nodes: &mut [GraphNode], config: &SimulationConfig);
}

/// Brute-force pass over every unordered pair.
#[derive(Clone, Copy, Debug, Default)]
pub struct PairwiseRepulsion;

impl RepulsionPass for PairwiseRepulsion {
	fn apply(&self, nodes: &mut [GraphNode], config: &SimulationConfig) {
		let n = nodes.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let impulse =
					repulsion_impulse(&nodes[i], &nodes[j], coincident_direction(i, j), config);
				nodes[i].velocity += impulse;
				nodes[j].velocity = nodes[j].velocity - impulse;
			}
		}
	}
}

/// Velocity change applied to `a` by `b`; `b` receives the negation.
///
/// Points from `b` toward `a`. When the two are exactly coincident the line
/// between them is undefined and `tie_break` (a unit vector) is used instead.
pub fn repulsion_impulse(
	a: &GraphNode,
	b: &GraphNode,
	tie_break: Vec2,
	config: &SimulationConfig,
) -> Vec2 {
	let delta = a.position - b.position;
	let raw = delta.length();
	let d = raw.max(config.min_distance);
	let direction = if raw > 0.0 { delta * (1.0 / raw) } else { tie_break };

	let mut magnitude = config.repulsion / (d * d);
	let min_separation = a.radius + b.radius;
	if d < min_separation {
		magnitude += (min_separation - d) * config.collision;
	}
	direction * magnitude
}

fn coincident_direction(i: usize, j: usize) -> Vec2 {
	Vec2::from_degrees((i + j) as f64 * GOLDEN_ANGLE)
}

/// Owns the node set for one visualization instance.
pub struct Simulation {
	nodes: Vec<GraphNode>,
	index: HashMap<String, usize>,
	snapshot: Rc<[NodeSnapshot]>,
	config: SimulationConfig,
	repulsion: Box<dyn RepulsionPass>,
	theme: Theme,
	ticks: u64,
}

impl Simulation {
	/// Take ownership of a built node set. `config` is normalized first.
	pub fn new(build: GraphBuild, config: SimulationConfig) -> Self {
		let mut sim = Self {
			nodes: build.nodes,
			index: build.index,
			snapshot: Rc::from(Vec::new()),
			config: config.normalized(),
			repulsion: Box::new(PairwiseRepulsion),
			theme: Theme::default(),
			ticks: 0,
		};
		sim.publish();
		sim
	}

	/// Replace the default [`PairwiseRepulsion`].
	pub fn with_repulsion(mut self, pass: impl RepulsionPass + 'static) -> Self {
		self.repulsion = Box::new(pass);
		self
	}

	/// Discard the current node set and restart from `build`'s initial state.
	pub fn replace_nodes(&mut self, build: GraphBuild) {
		self.nodes = build.nodes;
		self.index = build.index;
		self.ticks = 0;
		self.publish();
	}

	/// Advance one tick and publish a fresh snapshot.
	pub fn step(&mut self) {
		let config = &self.config;

		if config.anchor_mode == AnchorMode::FollowParent {
			for i in 0..self.nodes.len() {
				if self.nodes[i].kind != NodeKind::Item {
					continue;
				}
				if let Some(parent) = self.nodes[i].parent {
					self.nodes[i].anchor = self.nodes[parent].position;
				}
			}
		}

		for node in &mut self.nodes {
			node.velocity += (node.anchor - node.position) * config.attraction;
		}

		self.repulsion.apply(&mut self.nodes, config);

		for node in &mut self.nodes {
			node.velocity = node.velocity * config.damping;
			node.position += node.velocity;
		}

		self.ticks += 1;
		self.publish();
	}

	/// Recolor the published snapshot.
	pub fn set_theme(&mut self, theme: Theme) {
		if self.theme != theme {
			self.theme = theme;
			self.publish();
		}
	}

	/// Latest published positions. Cheap to clone and never mutated after publication.
	pub fn snapshot(&self) -> Rc<[NodeSnapshot]> {
		Rc::clone(&self.snapshot)
	}

	/// Live node state.
	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	/// Look a node up by key.
	pub fn node(&self, key: &str) -> Option<&GraphNode> {
		self.index.get(key).and_then(|&idx| self.nodes.get(idx))
	}

	/// Effective (normalized) config.
	pub fn config(&self) -> &SimulationConfig {
		&self.config
	}

	/// Steps taken since the node set was last replaced.
	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	/// Top-most node whose disc contains `point` (world coordinates).
	pub fn node_at(&self, point: Vec2) -> Option<&NodeSnapshot> {
		self.snapshot.iter().rev().find(|node| {
			let d = Vec2::new(node.x, node.y) - point;
			d.length() <= node.radius
		})
	}

	fn publish(&mut self) {
		let theme = self.theme;
		self.snapshot = self
			.nodes
			.iter()
			.map(|node| NodeSnapshot {
				key: node.key.clone(),
				x: node.position.x,
				y: node.position.y,
				radius: node.radius,
				label: node.label.clone(),
				kind: node.kind,
				color: palette::node_color(node.kind, node.group, theme),
				external_ref: node.external_ref.clone(),
				parent: node.parent,
			})
			.collect();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::catalog_graph::builder::{BuilderConfig, build_graph, item_key};
	use crate::components::catalog_graph::types::{CatalogItem, CategoryAngles};

	fn node(key: &str, x: f64, y: f64, radius: f64) -> GraphNode {
		GraphNode {
			key: key.into(),
			kind: NodeKind::Item,
			label: key.into(),
			position: Vec2::new(x, y),
			velocity: Vec2::ZERO,
			anchor: Vec2::new(x, y),
			radius,
			parent: None,
			group: 0,
			external_ref: None,
		}
	}

	fn build_from(nodes: Vec<GraphNode>) -> GraphBuild {
		let index = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.key.clone(), i))
			.collect();
		GraphBuild {
			nodes,
			index,
			categories: Vec::new(),
		}
	}

	fn still() -> SimulationConfig {
		SimulationConfig {
			attraction: 0.0,
			repulsion: 0.0,
			collision: 0.0,
			..SimulationConfig::default()
		}
	}

	#[test]
	fn attraction_pulls_toward_anchor() {
		let mut n = node("a", 100.0, 0.0, 1.0);
		n.anchor = Vec2::ZERO;
		let mut sim = Simulation::new(build_from(vec![n]), SimulationConfig::default());
		sim.step();
		let after = &sim.nodes()[0];
		// v = (0 - 100) * 0.01 = -1, damped to -0.9
		assert!((after.velocity.x + 0.9).abs() < 1e-12);
		assert!((after.position.x - 99.1).abs() < 1e-12);
	}

	#[test]
	fn repulsion_points_away_from_other_node() {
		let a = node("a", 10.0, 5.0, 1.0);
		let b = node("b", 0.0, 0.0, 1.0);
		let impulse = repulsion_impulse(&a, &b, Vec2::new(1.0, 0.0), &SimulationConfig::default());
		assert!(impulse.x > 0.0);
		assert!(impulse.y > 0.0);
	}

	#[test]
	fn overlap_adds_collision_push() {
		let config = SimulationConfig::default();
		let apart = repulsion_impulse(
			&node("a", 30.0, 0.0, 10.0),
			&node("b", 0.0, 0.0, 10.0),
			Vec2::new(1.0, 0.0),
			&config,
		);
		let overlapping = repulsion_impulse(
			&node("a", 15.0, 0.0, 10.0),
			&node("b", 0.0, 0.0, 10.0),
			Vec2::new(1.0, 0.0),
			&config,
		);
		let expected = config.repulsion / 225.0 + 5.0 * config.collision;
		assert!((overlapping.x - expected).abs() < 1e-12);
		assert!((apart.x - config.repulsion / 900.0).abs() < 1e-12);
	}

	#[test]
	fn coincident_nodes_separate_without_nan() {
		let mut sim = Simulation::new(
			build_from(vec![node("a", 5.0, 5.0, 10.0), node("b", 5.0, 5.0, 10.0)]),
			SimulationConfig::default(),
		);
		sim.step();
		let (a, b) = (&sim.nodes()[0], &sim.nodes()[1]);
		assert!(a.position.is_finite() && b.position.is_finite());
		assert!(a.velocity.length() > 0.0);
		assert!((a.position - b.position).length() > 0.0);
	}

	#[test]
	fn damping_shrinks_free_velocity() {
		let mut n = node("a", 0.0, 0.0, 1.0);
		n.velocity = Vec2::new(3.0, -4.0);
		let mut sim = Simulation::new(build_from(vec![n]), still());
		sim.step();
		assert!((sim.nodes()[0].velocity.length() - 4.5).abs() < 1e-12);
	}

	#[test]
	fn snapshot_is_swapped_not_mutated() {
		let mut n = node("a", 100.0, 0.0, 1.0);
		n.anchor = Vec2::ZERO;
		let mut sim = Simulation::new(build_from(vec![n]), SimulationConfig::default());
		let before = sim.snapshot();
		sim.step();
		let after = sim.snapshot();
		assert_eq!(before[0].x, 100.0);
		assert!(after[0].x < 100.0);
		assert_eq!(sim.ticks(), 1);
	}

	#[test]
	fn replace_nodes_resets_state() {
		let mut sim = Simulation::new(
			build_from(vec![node("a", 0.0, 0.0, 1.0)]),
			SimulationConfig::default(),
		);
		sim.step();
		sim.replace_nodes(build_from(vec![
			node("x", 1.0, 1.0, 1.0),
			node("y", 50.0, 1.0, 1.0),
		]));
		assert_eq!(sim.ticks(), 0);
		assert_eq!(sim.snapshot().len(), 2);
		assert!(sim.node("a").is_none());
		assert!(sim.node("y").is_some());
	}

	#[test]
	fn snapshot_anchor_ignores_drifting_parent() {
		let items = vec![CatalogItem::new("Chair", "Furniture")];
		let build = build_graph(&items, &CategoryAngles::new(), &BuilderConfig::default());
		let start_anchor = build.node(&item_key(0)).unwrap().anchor;
		let mut sim = Simulation::new(build, SimulationConfig::default());
		for _ in 0..20 {
			sim.step();
		}
		assert_eq!(sim.node(&item_key(0)).unwrap().anchor, start_anchor);
	}

	#[test]
	fn follow_parent_tracks_live_category() {
		let items = vec![CatalogItem::new("Chair", "Furniture")];
		let build = build_graph(&items, &CategoryAngles::new(), &BuilderConfig::default());
		let config = SimulationConfig {
			anchor_mode: AnchorMode::FollowParent,
			..SimulationConfig::default()
		};
		let mut sim = Simulation::new(build, config);
		for _ in 0..5 {
			sim.step();
		}
		let parent_idx = sim.node(&item_key(0)).unwrap().parent.unwrap();
		let parent_before_last_step = sim.nodes()[parent_idx].position;
		sim.step();
		assert_eq!(sim.node(&item_key(0)).unwrap().anchor, parent_before_last_step);
	}

	#[test]
	fn runaway_damping_is_capped() {
		let config = SimulationConfig {
			damping: 1.5,
			min_distance: 0.0,
			..still()
		};
		let mut n = node("a", 0.0, 0.0, 1.0);
		n.velocity = Vec2::new(1.0, 0.0);
		let mut sim = Simulation::new(build_from(vec![n]), config);
		assert!(sim.config().damping < 1.0);
		assert_eq!(sim.config().min_distance, 1.0);
		sim.step();
		assert!(sim.nodes()[0].velocity.x < 1.0);
	}

	#[test]
	fn theme_change_recolors_snapshot() {
		let mut sim = Simulation::new(
			build_from(vec![node("a", 0.0, 0.0, 1.0)]),
			SimulationConfig::default(),
		);
		let dark = sim.snapshot()[0].color;
		sim.set_theme(Theme::Light);
		assert_ne!(sim.snapshot()[0].color, dark);
	}

	#[test]
	fn node_at_prefers_topmost() {
		let sim = Simulation::new(
			build_from(vec![node("below", 0.0, 0.0, 10.0), node("above", 2.0, 0.0, 10.0)]),
			SimulationConfig::default(),
		);
		assert_eq!(sim.node_at(Vec2::new(1.0, 0.0)).unwrap().key, "above");
		assert!(sim.node_at(Vec2::new(100.0, 0.0)).is_none());
	}

	struct NoRepulsion;

	impl RepulsionPass for NoRepulsion {
		fn apply(&self, _nodes: &mut [GraphNode], _config: &SimulationConfig) {}
	}

	#[test]
	fn repulsion_pass_is_swappable() {
		let mut sim = Simulation::new(
			build_from(vec![node("a", 0.0, 0.0, 10.0), node("b", 1.0, 0.0, 10.0)]),
			SimulationConfig::default(),
		)
		.with_repulsion(NoRepulsion);
		sim.step();
		assert_eq!(sim.nodes()[0].velocity, Vec2::ZERO);
		assert_eq!(sim.nodes()[1].velocity, Vec2::ZERO);
	}
}
