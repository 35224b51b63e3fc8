//! The `<CatalogGraphCanvas/>` Leptos component.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Event, HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent, Window,
};

use super::animation::AnimationLoop;
use super::builder::build_graph;
use super::error::GraphError;
use super::listeners::WindowListeners;
use super::render;
use super::settings::GraphSettings;
use super::state::{CanvasState, FrameRequest, NodeClick};
use super::types::{CatalogItem, CategoryAngles, Theme, Vec2};

type SharedState = Rc<RefCell<Option<CanvasState>>>;

/// Pixels per line for wheel events reported in line mode.
const WHEEL_LINE_HEIGHT: f64 = 16.0;

/// Programmatic camera control for a mounted [`CatalogGraphCanvas`].
#[derive(Clone, Copy)]
pub struct GraphHandle {
	request: RwSignal<Option<FrameRequest>>,
}

impl GraphHandle {
	/// A handle with no pending request. Pass it to the canvas through `handle`.
	pub fn new() -> Self {
		Self {
			request: RwSignal::new(None),
		}
	}

	/// Center world point `(x, y)` at `scale`. Ignored while no canvas is mounted.
	pub fn frame_to(&self, x: f64, y: f64, scale: f64, animate: bool) {
		self.request.set(Some(FrameRequest {
			x,
			y,
			scale,
			animate,
		}));
	}
}

impl Default for GraphHandle {
	fn default() -> Self {
		Self::new()
	}
}

/// Self-organizing root → category → item graph with pan and zoom.
///
/// The node set is rebuilt whenever `items` or `angles` change; `theme` only recolors.
/// Clicks on nodes are reported through `on_node_click`.
#[component]
pub fn CatalogGraphCanvas(
	/// Catalog entries to lay out.
	#[prop(into)]
	items: Signal<Vec<CatalogItem>>,
	/// Fixed category angles in degrees.
	#[prop(into, default = Signal::stored(CategoryAngles::new()))]
	angles: Signal<CategoryAngles>,
	/// Color scheme.
	#[prop(into, default = Signal::stored(Theme::Dark))]
	theme: Signal<Theme>,
	/// Layout, force and camera tunables.
	#[prop(optional)]
	settings: GraphSettings,
	/// Camera control from the host.
	#[prop(optional)]
	handle: Option<GraphHandle>,
	/// Called after a press and release on the same node.
	#[prop(optional)]
	on_node_click: Option<Callback<NodeClick>>,
	/// Size to the window instead of the parent element.
	#[prop(default = false)]
	fullscreen: bool,
	/// Fixed width in CSS pixels.
	#[prop(default = None)]
	width: Option<f64>,
	/// Fixed height in CSS pixels.
	#[prop(default = None)]
	height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let frame_loop = StoredValue::new_local(None::<AnimationLoop>);
	let window_listeners = StoredValue::new_local(None::<WindowListeners>);

	let state_init = state.clone();
	Effect::new(move |_| {
		let (items, angles) = (items.get(), angles.get());
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let mount = Mount {
			state: &state_init,
			canvas: &canvas,
			settings: &settings,
			theme: theme.get_untracked(),
			fullscreen,
			width,
			height,
			on_node_click,
		};
		if let Err(e) = mount.run(&items, &angles, frame_loop, window_listeners) {
			error!("catalog graph failed to start: {e}");
		}
	});

	let state_theme = state.clone();
	Effect::new(move |_| {
		let theme = theme.get();
		if let Some(ref mut s) = *state_theme.borrow_mut() {
			s.set_theme(theme);
		}
	});

	if let Some(handle) = handle {
		let state_frame = state.clone();
		Effect::new(move |_| {
			let Some(request) = handle.request.get() else {
				return;
			};
			match *state_frame.borrow_mut() {
				Some(ref mut s) => {
					s.frame_to(request);
				}
				None => warn!("frame_to ignored: catalog graph not mounted"),
			}
		});
	}

	on_cleanup(move || {
		let _ = frame_loop.try_update_value(|slot| slot.take());
		let _ = window_listeners.try_update_value(|slot| slot.take());
		debug!("catalog graph unmounted");
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let p = local_point(&canvas, ev.client_x(), ev.client_y());
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(p);
		}
		set_cursor(&canvas, "grabbing");
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let p = local_point(&canvas, ev.client_x(), ev.client_y());
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.viewport.is_panning() {
				return;
			}
			s.hover_at(p);
			set_cursor(&canvas, if s.hover.is_some() { "pointer" } else { "grab" });
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.clear_hover();
		}
	};

	let state_ts = state.clone();
	let on_touchstart = move |ev: TouchEvent| {
		// Suppress the emulated mouse events that would otherwise follow.
		ev.prevent_default();
		let (Some(canvas), Some(touch)) = (canvas_ref.get(), ev.touches().get(0)) else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let p = local_point(&canvas, touch.client_x(), touch.client_y());
		if let Some(ref mut s) = *state_ts.borrow_mut() {
			s.pointer_down(p);
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let p = local_point(&canvas, ev.client_x(), ev.client_y());
		let delta_y = if ev.delta_mode() == WheelEvent::DOM_DELTA_LINE {
			ev.delta_y() * WHEEL_LINE_HEIGHT
		} else {
			ev.delta_y()
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.viewport.wheel(p, delta_y);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="catalog-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseleave=on_mouseleave
			on:touchstart=on_touchstart
			on:wheel=on_wheel
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}

/// Everything the mount effect needs to (re)start the canvas.
struct Mount<'a> {
	state: &'a SharedState,
	canvas: &'a HtmlCanvasElement,
	settings: &'a GraphSettings,
	theme: Theme,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
	on_node_click: Option<Callback<NodeClick>>,
}

impl Mount<'_> {
	/// Build the node set and (re)start the frame loop. The first run also sizes the
	/// canvas and installs window listeners; later runs replace the node set wholesale.
	fn run(
		&self,
		items: &[CatalogItem],
		angles: &CategoryAngles,
		frame_loop: StoredValue<Option<AnimationLoop>, LocalStorage>,
		window_listeners: StoredValue<Option<WindowListeners>, LocalStorage>,
	) -> Result<(), GraphError> {
		let window = web_sys::window().ok_or(GraphError::NoWindow)?;
		let ctx = context_2d(self.canvas)?;
		let build = build_graph(items, angles, &self.settings.builder);
		info!(
			"catalog graph: {} nodes ({} categories, {} items)",
			build.nodes.len(),
			build.categories.len(),
			items.len()
		);

		// The previous loop must be gone before its node set is.
		frame_loop.set_value(None);

		let first_mount = {
			let mut guard = self.state.borrow_mut();
			match guard.as_mut() {
				Some(s) => {
					s.rebuild(build);
					false
				}
				None => {
					let (w, h) = self.container_size(&window);
					self.canvas.set_width(w as u32);
					self.canvas.set_height(h as u32);
					let mut s = CanvasState::new(build, self.settings, w, h);
					s.set_theme(self.theme);
					*guard = Some(s);
					true
				}
			}
		};
		if first_mount {
			window_listeners.set_value(Some(self.install_listeners()?));
		}

		let state_anim = self.state.clone();
		let animation = AnimationLoop::start(move |timestamp| {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.frame(timestamp);
				render::render(s, &ctx);
			}
		})?;
		frame_loop.set_value(Some(animation));
		Ok(())
	}

	fn container_size(&self, window: &Window) -> (f64, f64) {
		measure(self.canvas, window, self.fullscreen, self.width, self.height)
	}

	fn install_listeners(&self) -> Result<WindowListeners, GraphError> {
		let mut listeners = WindowListeners::new()?;

		let (state_mm, canvas_mm) = (self.state.clone(), self.canvas.clone());
		listeners.listen("mousemove", move |ev: Event| {
			let Some(ev) = ev.dyn_ref::<MouseEvent>() else {
				return;
			};
			let p = local_point(&canvas_mm, ev.client_x(), ev.client_y());
			if let Some(ref mut s) = *state_mm.borrow_mut() {
				s.pointer_move(p);
			}
		})?;

		let (state_mu, canvas_mu, on_click) =
			(self.state.clone(), self.canvas.clone(), self.on_node_click);
		listeners.listen("mouseup", move |ev: Event| {
			let Some(ev) = ev.dyn_ref::<MouseEvent>() else {
				return;
			};
			let p = local_point(&canvas_mu, ev.client_x(), ev.client_y());
			let click = match *state_mu.borrow_mut() {
				Some(ref mut s) => s.pointer_up(p),
				None => None,
			};
			set_cursor(&canvas_mu, "grab");
			emit_click(click, on_click);
		})?;

		let (state_tm, canvas_tm) = (self.state.clone(), self.canvas.clone());
		listeners.listen("touchmove", move |ev: Event| {
			let Some(touch) = ev.dyn_ref::<TouchEvent>().and_then(|ev| ev.touches().get(0)) else {
				return;
			};
			let p = local_point(&canvas_tm, touch.client_x(), touch.client_y());
			if let Some(ref mut s) = *state_tm.borrow_mut() {
				s.pointer_move(p);
			}
		})?;

		let (state_te, canvas_te, on_click) =
			(self.state.clone(), self.canvas.clone(), self.on_node_click);
		listeners.listen("touchend", move |ev: Event| {
			let Some(ev) = ev.dyn_ref::<TouchEvent>() else {
				return;
			};
			let point = |touch: web_sys::Touch| {
				local_point(&canvas_te, touch.client_x(), touch.client_y())
			};
			let remaining = ev.touches().get(0).map(point);
			let lifted = ev.changed_touches().get(0).map(point);
			let click = match (&mut *state_te.borrow_mut(), remaining, lifted) {
				// Another finger is still down: keep panning from it.
				(Some(s), Some(p), _) => {
					s.pointer_handoff(p);
					None
				}
				(Some(s), None, Some(p)) => s.pointer_up(p),
				(Some(s), None, None) => {
					s.pointer_cancel();
					None
				}
				(None, ..) => None,
			};
			emit_click(click, on_click);
		})?;

		let state_tc = self.state.clone();
		listeners.listen("touchcancel", move |_: Event| {
			if let Some(ref mut s) = *state_tc.borrow_mut() {
				s.pointer_cancel();
			}
		})?;

		let (state_rs, canvas_rs) = (self.state.clone(), self.canvas.clone());
		let (fullscreen, width, height) = (self.fullscreen, self.width, self.height);
		listeners.listen("resize", move |_: Event| {
			let Some(window) = web_sys::window() else {
				return;
			};
			let (w, h) = measure(&canvas_rs, &window, fullscreen, width, height);
			canvas_rs.set_width(w as u32);
			canvas_rs.set_height(h as u32);
			if let Some(ref mut s) = *state_rs.borrow_mut() {
				s.resize(w, h);
			}
		})?;

		Ok(listeners)
	}
}

/// Runs the host callback with no state borrow held, so it may call back into the canvas.
fn emit_click(click: Option<NodeClick>, on_click: Option<Callback<NodeClick>>) {
	let Some(click) = click else {
		return;
	};
	debug!("node clicked: {}", click.key);
	if let Some(on_click) = on_click {
		on_click.run(click);
	}
}

fn measure(
	canvas: &HtmlCanvasElement,
	window: &Window,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> (f64, f64) {
	if fullscreen {
		let px = |v: Result<JsValue, JsValue>, fallback: f64| {
			v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
		};
		return (px(window.inner_width(), 800.0), px(window.inner_height(), 600.0));
	}
	(
		width.unwrap_or_else(|| {
			canvas
				.parent_element()
				.map(|p| p.client_width() as f64)
				.unwrap_or(800.0)
		}),
		height.unwrap_or_else(|| {
			canvas
				.parent_element()
				.map(|p| p.client_height() as f64)
				.unwrap_or(600.0)
		}),
	)
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, GraphError> {
	canvas
		.get_context("2d")
		.ok()
		.flatten()
		.and_then(|ctx| ctx.dyn_into().ok())
		.ok_or(GraphError::NoContext)
}

fn local_point(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> Vec2 {
	let rect = canvas.get_bounding_client_rect();
	Vec2::new(client_x as f64 - rect.left(), client_y as f64 - rect.top())
}

fn set_cursor(canvas: &HtmlCanvasElement, cursor: &str) {
	// Leptos' `ElementExt::style` shadows the web-sys getter on element types.
	let _ = web_sys::HtmlElement::style(canvas).set_property("cursor", cursor);
}
