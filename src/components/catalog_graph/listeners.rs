//! Window-scoped event listeners, removed on drop.
//!
//! Pan gestures keep tracking once the pointer leaves the canvas, so move/up/cancel
//! are heard at window scope for as long as the canvas is mounted.

use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{Event, Window};

use super::error::GraphError;

pub struct WindowListeners {
	window: Window,
	entries: Vec<(&'static str, Closure<dyn FnMut(Event)>)>,
}

impl WindowListeners {
	pub fn new() -> Result<Self, GraphError> {
		let window = web_sys::window().ok_or(GraphError::NoWindow)?;
		Ok(Self {
			window,
			entries: Vec::new(),
		})
	}

	pub fn listen(
		&mut self,
		event: &'static str,
		handler: impl FnMut(Event) + 'static,
	) -> Result<(), GraphError> {
		let closure = Closure::<dyn FnMut(Event)>::new(handler);
		self.window
			.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
			.map_err(|e| GraphError::Listener {
				event,
				reason: format!("{e:?}"),
			})?;
		self.entries.push((event, closure));
		Ok(())
	}
}

impl Drop for WindowListeners {
	fn drop(&mut self) {
		for (event, closure) in self.entries.drain(..) {
			if let Err(e) = self
				.window
				.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
			{
				error!("failed to remove {event} listener: {e:?}");
			}
		}
	}
}
