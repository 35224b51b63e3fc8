use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::palette;
use super::state::CanvasState;
use super::types::{NodeKind, NodeSnapshot};

/// Item labels appear once zoomed in past this scale (or on hover).
const ITEM_LABEL_ZOOM: f64 = 1.4;

pub fn render(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let transform = state.viewport.transform();
	ctx.set_fill_style_str(palette::background(state.theme));
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);

	let snapshot = state.simulation.snapshot();
	draw_tethers(state, &snapshot, ctx, transform.k);
	for node in snapshot.iter() {
		draw_node(state, node, ctx, transform.k);
	}
	ctx.restore();
}

fn draw_tethers(
	state: &CanvasState,
	snapshot: &[NodeSnapshot],
	ctx: &CanvasRenderingContext2d,
	k: f64,
) {
	ctx.set_stroke_style_str(palette::tether(state.theme));
	ctx.set_line_width(1.0 / k);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(4.0 / k),
		&JsValue::from_f64(4.0 / k),
	));
	ctx.begin_path();
	for node in snapshot {
		let Some(parent) = node.parent.and_then(|idx| snapshot.get(idx)) else {
			continue;
		};
		ctx.move_to(parent.x, parent.y);
		ctx.line_to(node.x, node.y);
	}
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_node(state: &CanvasState, node: &NodeSnapshot, ctx: &CanvasRenderingContext2d, k: f64) {
	let hovered = state.is_hovered(&node.key);
	let radius = if hovered { node.radius * 1.15 } else { node.radius };

	ctx.begin_path();
	let _ = ctx.arc(node.x, node.y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(node.color);
	ctx.fill();

	if hovered {
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, radius + 2.0 / k, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(palette::label(state.theme));
		ctx.set_line_width(1.5 / k);
		ctx.stroke();
	}

	let show_label = match node.kind {
		NodeKind::Root | NodeKind::Category => true,
		NodeKind::Item => hovered || k >= ITEM_LABEL_ZOOM,
	};
	if show_label {
		let size = match node.kind {
			NodeKind::Root => 14.0,
			NodeKind::Category => 12.0,
			NodeKind::Item => 10.0,
		};
		ctx.set_fill_style_str(palette::label(state.theme));
		ctx.set_font(&format!("{}px sans-serif", size / k.max(0.5)));
		let _ = ctx.fill_text(&node.label, node.x + radius + 3.0, node.y + 3.0);
	}
}
