use leptos::prelude::*;
use log::{error, warn};

use crate::components::catalog_graph::{
	CatalogDocument, CatalogGraphCanvas, GraphHandle, NodeClick, NodeKind, Theme,
};

const DEMO_CATALOG: &str = include_str!("../../demo/catalog.json");

/// Zoom used when a category node is clicked.
const CATEGORY_FOCUS_SCALE: f64 = 2.0;

fn load_demo_catalog() -> CatalogDocument {
	CatalogDocument::from_json(DEMO_CATALOG).unwrap_or_else(|e| {
		error!("demo catalog unusable, starting empty: {e}");
		CatalogDocument::default()
	})
}

fn open_external(url: &str) {
	let opened = web_sys::window().map(|w| w.open_with_url_and_target(url, "_blank"));
	if !matches!(opened, Some(Ok(_))) {
		warn!("could not open {url}");
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let CatalogDocument {
		items,
		angles,
		settings,
	} = load_demo_catalog();
	let items = Signal::stored(items);
	let angles = Signal::stored(angles);
	let theme = RwSignal::new(Theme::Dark);
	let handle = GraphHandle::new();

	let on_node_click = Callback::new(move |click: NodeClick| match (click.kind, click.external_ref) {
		(_, Some(url)) => open_external(&url),
		(NodeKind::Category, None) => handle.frame_to(click.x, click.y, CATEGORY_FOCUS_SCALE, true),
		_ => handle.frame_to(0.0, 0.0, 1.0, true),
	});

	let toggle_theme = move |_| {
		theme.update(|t| {
			*t = match *t {
				Theme::Dark => Theme::Light,
				Theme::Light => Theme::Dark,
			}
		})
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<CatalogGraphCanvas
					items=items
					angles=angles
					theme=theme
					settings=settings
					handle=handle
					on_node_click=on_node_click
					fullscreen=true
				/>
				<div class="graph-overlay">
					<h1>"Catalog"</h1>
					<p class="subtitle">
						"Click a category to zoom in, an item to open it. Scroll to zoom. Drag to pan."
					</p>
					<button on:click=move |_| handle.frame_to(0.0, 0.0, 1.0, true)>"Recenter"</button>
					<button on:click=toggle_theme>"Toggle theme"</button>
				</div>
			</div>
		</ErrorBoundary>
	}
}
