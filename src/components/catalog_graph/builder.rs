//! Turns a flat item collection into the root → category → item node set.

use std::collections::{HashMap, HashSet};

use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::types::{CatalogItem, CategoryAngles, GraphNode, NodeKind, Vec2};

/// Key of the single root node.
pub const ROOT_KEY: &str = "root";

/// Two angles closer than this (degrees) point the same way.
const SAME_ANGLE: f64 = 1e-6;

/// Which category labels count as "known" when resolving an item's primary category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryPolicy {
	/// Every label any item declares, plus every key of the angle table.
	#[default]
	Discover,
	/// Only the keys of the angle table.
	TableOnly,
}

/// Geometry and naming for [`build_graph`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
	/// Radius of the circle category anchors sit on.
	pub category_radius: f64,
	/// Drawn radius of the root node.
	pub root_radius: f64,
	/// Drawn radius of category nodes.
	pub category_node_radius: f64,
	/// Drawn radius of item nodes.
	pub item_radius: f64,
	/// Max offset per axis added to initial positions.
	pub jitter: f64,
	/// Seed for the jitter; equal seeds give identical layouts.
	pub jitter_seed: u64,
	/// Which labels count as categories.
	pub category_policy: CategoryPolicy,
	/// Category that collects items matching nothing known.
	pub fallback_category: String,
	/// Label drawn on the root.
	pub root_label: String,
}

impl Default for BuilderConfig {
	fn default() -> Self {
		Self {
			category_radius: 250.0,
			root_radius: 40.0,
			category_node_radius: 24.0,
			item_radius: 10.0,
			jitter: 4.0,
			jitter_seed: 0x5eed,
			category_policy: CategoryPolicy::Discover,
			fallback_category: "Other".into(),
			root_label: "Catalog".into(),
		}
	}
}

/// Output of [`build_graph`].
#[derive(Clone, Debug, Default)]
pub struct GraphBuild {
	/// Root first, then categories in layout order, then items in input order.
	pub nodes: Vec<GraphNode>,
	/// Node key → index into `nodes`.
	pub index: HashMap<String, usize>,
	/// Category names in layout order. The ordinal is the node's `group`.
	pub categories: Vec<String>,
}

impl GraphBuild {
	/// Look a node up by key.
	pub fn node(&self, key: &str) -> Option<&GraphNode> {
		self.index.get(key).and_then(|&idx| self.nodes.get(idx))
	}
}

/// Key of the category node named `name`.
pub fn category_key(name: &str) -> String {
	format!("category:{name}")
}

/// Key of the item at `position` in the input collection.
pub fn item_key(position: usize) -> String {
	format!("item:{position}")
}

/// Angle used when the table has no entry: categories spread evenly in layout order.
pub fn fallback_angle(ordinal: usize, category_count: usize) -> f64 {
	if category_count == 0 {
		return 0.0;
	}
	ordinal as f64 * (360.0 / category_count as f64)
}

/// Build the initial node set.
///
/// Category layout order is first appearance across `items` followed by table-only
/// categories in name order (with [`CategoryPolicy::TableOnly`], table name order only).
/// The fallback category is appended last when some item resolves to nothing and
/// the fallback is not already a known category. Items are never dropped.
pub fn build_graph(
	items: &[CatalogItem],
	angles: &CategoryAngles,
	config: &BuilderConfig,
) -> GraphBuild {
	let mut categories = known_categories(items, angles, config.category_policy);
	let mut ordinal: HashMap<String, usize> = categories
		.iter()
		.enumerate()
		.map(|(i, name)| (name.clone(), i))
		.collect();

	let mut primaries: Vec<Option<usize>> = items
		.iter()
		.map(|item| {
			item.category_labels()
				.find_map(|label| ordinal.get(label).copied())
		})
		.collect();

	let unresolved = primaries.iter().filter(|p| p.is_none()).count();
	if unresolved > 0 {
		let fallback = match ordinal.get(&config.fallback_category) {
			Some(&idx) => idx,
			None => {
				categories.push(config.fallback_category.clone());
				ordinal.insert(config.fallback_category.clone(), categories.len() - 1);
				categories.len() - 1
			}
		};
		debug!(
			"{unresolved} item(s) routed to fallback category {:?}",
			config.fallback_category
		);
		for primary in primaries.iter_mut().filter(|p| p.is_none()) {
			*primary = Some(fallback);
		}
	}

	let mut rng = SmallRng::seed_from_u64(config.jitter_seed);
	let mut nodes = Vec::with_capacity(1 + categories.len() + items.len());

	nodes.push(GraphNode {
		key: ROOT_KEY.into(),
		kind: NodeKind::Root,
		label: config.root_label.clone(),
		position: Vec2::ZERO,
		velocity: Vec2::ZERO,
		anchor: Vec2::ZERO,
		radius: config.root_radius,
		parent: None,
		group: 0,
		external_ref: None,
	});

	let category_angles = layout_angles(&categories, angles);
	for (i, (name, angle)) in categories.iter().zip(category_angles).enumerate() {
		let anchor = Vec2::from_degrees(angle) * config.category_radius;
		nodes.push(GraphNode {
			key: category_key(name),
			kind: NodeKind::Category,
			label: name.clone(),
			position: anchor + jitter(&mut rng, config.jitter),
			velocity: Vec2::ZERO,
			anchor,
			radius: config.category_node_radius,
			parent: Some(0),
			group: i,
			external_ref: None,
		});
	}

	for (i, (item, primary)) in items.iter().zip(&primaries).enumerate() {
		let group = primary.unwrap_or(0);
		let parent = 1 + group;
		// Snapshot of where the category node starts, not a live link.
		let anchor = nodes[parent].position;
		let label = if item.name.trim().is_empty() {
			format!("Item {}", i + 1)
		} else {
			item.name.clone()
		};
		nodes.push(GraphNode {
			key: item_key(i),
			kind: NodeKind::Item,
			label,
			position: anchor + jitter(&mut rng, config.jitter),
			velocity: Vec2::ZERO,
			anchor,
			radius: config.item_radius,
			parent: Some(parent),
			group,
			external_ref: item.external_ref.clone(),
		});
	}

	let index = nodes
		.iter()
		.enumerate()
		.map(|(i, node)| (node.key.clone(), i))
		.collect();

	GraphBuild {
		nodes,
		index,
		categories,
	}
}

fn known_categories(
	items: &[CatalogItem],
	angles: &CategoryAngles,
	policy: CategoryPolicy,
) -> Vec<String> {
	let mut seen = HashSet::new();
	let mut ordered = Vec::new();

	if policy == CategoryPolicy::Discover {
		for label in items.iter().flat_map(CatalogItem::category_labels) {
			if seen.insert(label.to_string()) {
				ordered.push(label.to_string());
			}
		}
	}
	for name in angles.keys() {
		if seen.insert(name.clone()) {
			ordered.push(name.clone());
		}
	}
	ordered
}

/// Table angle where given. Otherwise `fallback_angle(i, n)`, moved on to the next
/// free slot when that direction is already taken, so no two categories share an
/// anchor unless the table itself says so.
fn layout_angles(categories: &[String], angles: &CategoryAngles) -> Vec<f64> {
	let count = categories.len();
	let mut taken: Vec<f64> = categories
		.iter()
		.filter_map(|name| angles.get(name).copied())
		.collect();

	categories
		.iter()
		.enumerate()
		.map(|(i, name)| {
			if let Some(&angle) = angles.get(name) {
				return angle;
			}
			// At most count - 1 other categories hold a slot, so one is always free.
			let angle = (0..count)
				.map(|step| fallback_angle((i + step) % count, count))
				.find(|&candidate| !taken.iter().any(|&t| same_direction(t, candidate)))
				.unwrap_or_else(|| fallback_angle(i, count));
			taken.push(angle);
			angle
		})
		.collect()
}

fn same_direction(a: f64, b: f64) -> bool {
	let diff = (a - b).rem_euclid(360.0);
	diff < SAME_ANGLE || diff > 360.0 - SAME_ANGLE
}

fn jitter(rng: &mut SmallRng, amount: f64) -> Vec2 {
	if amount <= 0.0 {
		return Vec2::ZERO;
	}
	Vec2::new(rng.gen_range(-amount..=amount), rng.gen_range(-amount..=amount))
}
