//! End-to-end layout scenarios: builder output feeding the simulation.

use catalog_graph_canvas::catalog_graph::builder::{category_key, item_key};
use catalog_graph_canvas::catalog_graph::{
	BuilderConfig, CatalogItem, CategoryAngles, CategoryPolicy, GraphBuild, GraphNode, NodeKind,
	Simulation, SimulationConfig, Vec2, build_graph,
};

fn angles(entries: &[(&str, f64)]) -> CategoryAngles {
	entries
		.iter()
		.map(|(name, deg)| (name.to_string(), *deg))
		.collect()
}

#[test]
fn three_categories_ten_items() {
	let table = angles(&[("Furniture", 0.0), ("Lighting", 120.0), ("Textiles", 240.0)]);
	let labels = ["Furniture", "Lighting", "Textiles"];
	let items: Vec<CatalogItem> = (0..10)
		.map(|i| CatalogItem::new(format!("Item {i}"), labels[i % 3]))
		.collect();
	let config = BuilderConfig::default();

	let build = build_graph(&items, &table, &config);

	assert_eq!(build.nodes.len(), 14);
	let count = |kind| build.nodes.iter().filter(|n| n.kind == kind).count();
	assert_eq!(count(NodeKind::Root), 1);
	assert_eq!(count(NodeKind::Category), 3);
	assert_eq!(count(NodeKind::Item), 10);

	for (name, degrees) in &table {
		let node = build.node(&category_key(name)).expect("category node");
		let expected = Vec2::from_degrees(*degrees) * config.category_radius;
		assert!((node.anchor.x - expected.x).abs() < 1e-9, "{name}");
		assert!((node.anchor.y - expected.y).abs() < 1e-9, "{name}");
		assert!((node.anchor.length() - config.category_radius).abs() < 1e-9);
	}

	for (i, item) in items.iter().enumerate() {
		let node = build.node(&item_key(i)).expect("item node");
		let category = build
			.node(&category_key(item.categories.as_str()))
			.expect("primary category");
		assert_eq!(node.anchor, category.position);
		assert_eq!(node.parent, build.index.get(&category.key).copied());
	}
}

#[test]
fn first_matching_category_wins() {
	let table = angles(&[("Architecture", 90.0)]);
	let items = vec![CatalogItem::new("Pavilion", "Design, Other, Architecture")];
	let config = BuilderConfig {
		category_policy: CategoryPolicy::TableOnly,
		..BuilderConfig::default()
	};

	let build = build_graph(&items, &table, &config);

	let item = build.node(&item_key(0)).expect("item node");
	let architecture = build.node(&category_key("Architecture")).expect("category");
	assert_eq!(item.anchor, architecture.position);
	assert!(build.node(&category_key("Design")).is_none());
	assert!(build.node(&category_key("Other")).is_none());
}

#[test]
fn coincident_nodes_stay_finite() {
	let twin = |key: &str| GraphNode {
		key: key.into(),
		kind: NodeKind::Item,
		label: key.into(),
		position: Vec2::new(12.0, -7.0),
		velocity: Vec2::ZERO,
		anchor: Vec2::new(12.0, -7.0),
		radius: 10.0,
		parent: None,
		group: 0,
		external_ref: None,
	};
	let nodes = vec![twin("a"), twin("b")];
	let index = nodes
		.iter()
		.enumerate()
		.map(|(i, n)| (n.key.clone(), i))
		.collect();
	let mut sim = Simulation::new(
		GraphBuild {
			nodes,
			index,
			categories: Vec::new(),
		},
		SimulationConfig::default(),
	);

	sim.step();

	let (a, b) = (&sim.nodes()[0], &sim.nodes()[1]);
	assert!(a.velocity.is_finite() && b.velocity.is_finite());
	assert!(a.velocity.length() > 0.0 && b.velocity.length() > 0.0);
	assert!((a.velocity.x + b.velocity.x).abs() < 1e-9);
	assert!((a.velocity.y + b.velocity.y).abs() < 1e-9);

	sim.step();
	assert!(sim.nodes().iter().all(|n| n.position.is_finite()));
}

#[test]
fn rebuild_from_same_input_is_identical() {
	let table = angles(&[("Prints", 45.0)]);
	let items = vec![
		CatalogItem::new("Poster", "Prints"),
		CatalogItem::new("Card", ""),
		CatalogItem::new("Lamp", "Lighting, Prints"),
	];
	let config = BuilderConfig::default();
	let first = build_graph(&items, &table, &config);
	let second = build_graph(&items, &table, &config);

	let summary = |b: &GraphBuild| -> Vec<(String, NodeKind, Vec2)> {
		b.nodes
			.iter()
			.map(|n| (n.key.clone(), n.kind, n.anchor))
			.collect()
	};
	assert_eq!(summary(&first), summary(&second));
	assert_eq!(first.categories, second.categories);
}

#[test]
fn default_demo_scale_layout_settles_apart() {
	let labels = ["A", "B", "C", "D", "E"];
	let items: Vec<CatalogItem> = (0..40)
		.map(|i| CatalogItem::new(format!("Item {i}"), labels[i % labels.len()]))
		.collect();
	let build = build_graph(&items, &CategoryAngles::new(), &BuilderConfig::default());
	let mut sim = Simulation::new(build, SimulationConfig::default());

	for _ in 0..2000 {
		sim.step();
	}

	let nodes = sim.nodes();
	assert!(nodes.iter().all(|n| n.position.is_finite()));
	let mean_speed = nodes.iter().map(|n| n.velocity.length()).sum::<f64>() / nodes.len() as f64;
	assert!(mean_speed < 0.05, "mean speed {mean_speed}");
}
