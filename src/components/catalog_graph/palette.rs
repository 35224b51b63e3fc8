//! Theme-dependent colors. Nothing here feeds back into the layout.

use super::types::{NodeKind, Theme};

const CATEGORY_COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

// Same hues, lifted toward the dark background.
const ITEM_COLORS_DARK: &[&str] = &[
	"#6fa8d6", "#ffb066", "#78c878", "#e57373", "#b9a0d6", "#b08b82", "#efaed8", "#b0b0b0",
	"#d8d86a", "#6fd6e3",
];

// Same hues, pushed toward the light background.
const ITEM_COLORS_LIGHT: &[&str] = &[
	"#aec7e8", "#ffbb78", "#98df8a", "#ff9896", "#c5b0d5", "#c49c94", "#f7b6d2", "#c7c7c7",
	"#dbdb8d", "#9edae5",
];

/// Fill color for a node of `kind` belonging to category ordinal `group`.
pub fn node_color(kind: NodeKind, group: usize, theme: Theme) -> &'static str {
	match (kind, theme) {
		(NodeKind::Root, Theme::Dark) => "#f0f0f5",
		(NodeKind::Root, Theme::Light) => "#1a1a2e",
		(NodeKind::Category, _) => CATEGORY_COLORS[group % CATEGORY_COLORS.len()],
		(NodeKind::Item, Theme::Dark) => ITEM_COLORS_DARK[group % ITEM_COLORS_DARK.len()],
		(NodeKind::Item, Theme::Light) => ITEM_COLORS_LIGHT[group % ITEM_COLORS_LIGHT.len()],
	}
}

pub fn background(theme: Theme) -> &'static str {
	match theme {
		Theme::Dark => "#1a1a2e",
		Theme::Light => "#f7f7fa",
	}
}

pub fn label(theme: Theme) -> &'static str {
	match theme {
		Theme::Dark => "rgba(255, 255, 255, 0.85)",
		Theme::Light => "rgba(20, 20, 40, 0.85)",
	}
}

pub fn tether(theme: Theme) -> &'static str {
	match theme {
		Theme::Dark => "rgba(100, 180, 255, 0.25)",
		Theme::Light => "rgba(40, 70, 120, 0.2)",
	}
}
