//! Plain data shared by the builder, simulation and renderer.

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Fixed layout angle in degrees, keyed by category name.
pub type CategoryAngles = BTreeMap<String, f64>;

/// One catalog entry as handed over by the content source.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogItem {
	/// Display name. Blank names get a positional label.
	pub name: String,
	/// Comma-separated category labels, e.g. `"Design, Architecture"`.
	pub categories: String,
	/// Opaque click-through target. Never read by the layout.
	pub external_ref: Option<String>,
}

impl CatalogItem {
	/// Item with no external reference.
	pub fn new(name: impl Into<String>, categories: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			categories: categories.into(),
			external_ref: None,
		}
	}

	/// Attach a click-through target.
	pub fn with_external_ref(mut self, external_ref: impl Into<String>) -> Self {
		self.external_ref = Some(external_ref.into());
		self
	}

	/// Declared labels in order, trimmed, empty entries skipped.
	pub fn category_labels(&self) -> impl Iterator<Item = &str> {
		self.categories
			.split(',')
			.map(str::trim)
			.filter(|label| !label.is_empty())
	}
}

/// Tier of a node in the root → category → item hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	/// The single hub at the origin.
	Root,
	/// One per known category, on a circle around the root.
	Category,
	/// One per catalog entry, clustered around its category.
	Item,
}

/// Color scheme. Never affects positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
	/// Light nodes on a dark background.
	#[default]
	Dark,
	/// Dark nodes on a light background.
	Light,
}

/// 2D point or vector in world or screen space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
	/// Horizontal component, growing rightward.
	pub x: f64,
	/// Vertical component, growing downward on screen.
	pub y: f64,
}

impl Vec2 {
	/// The origin.
	pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

	/// Vector from components.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Unit vector at `degrees`, measured counter-clockwise from +x.
	pub fn from_degrees(degrees: f64) -> Self {
		let rad = degrees.to_radians();
		Self::new(rad.cos(), rad.sin())
	}

	/// Euclidean length.
	pub fn length(self) -> f64 {
		self.x.hypot(self.y)
	}

	/// Both components are finite (no NaN, no infinity).
	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}
}

impl Add for Vec2 {
	type Output = Vec2;

	fn add(self, rhs: Vec2) -> Vec2 {
		Vec2::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl AddAssign for Vec2 {
	fn add_assign(&mut self, rhs: Vec2) {
		self.x += rhs.x;
		self.y += rhs.y;
	}
}

impl Sub for Vec2 {
	type Output = Vec2;

	fn sub(self, rhs: Vec2) -> Vec2 {
		Vec2::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl Mul<f64> for Vec2 {
	type Output = Vec2;

	fn mul(self, rhs: f64) -> Vec2 {
		Vec2::new(self.x * rhs, self.y * rhs)
	}
}

/// A simulated particle. Created by the builder, evolved in place by the simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	/// Stable identifier, unique within one build.
	pub key: String,
	/// Tier in the hierarchy.
	pub kind: NodeKind,
	/// Text drawn next to the node.
	pub label: String,
	/// World position.
	pub position: Vec2,
	/// Displacement applied per tick.
	pub velocity: Vec2,
	/// Point the node is elastically pulled toward every tick.
	pub anchor: Vec2,
	/// Collision and drawing radius.
	pub radius: f64,
	/// Index of the parent node in the same node list; `None` for the root.
	pub parent: Option<usize>,
	/// Category ordinal, used for coloring.
	pub group: usize,
	/// Copied from the item; always `None` for root and categories.
	pub external_ref: Option<String>,
}

/// What the renderer sees of one node after a tick.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSnapshot {
	/// Same key as the simulated node.
	pub key: String,
	/// World x after the tick.
	pub x: f64,
	/// World y after the tick.
	pub y: f64,
	/// Drawing radius.
	pub radius: f64,
	/// Text drawn next to the node.
	pub label: String,
	/// Tier in the hierarchy.
	pub kind: NodeKind,
	/// CSS fill color for the current theme.
	pub color: &'static str,
	/// Item click-through target.
	pub external_ref: Option<String>,
	/// Index of the parent in the same snapshot, for drawing tethers.
	pub parent: Option<usize>,
}
