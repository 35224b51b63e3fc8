//! Explicitly owned `requestAnimationFrame` loop.
//!
//! The loop runs from [`AnimationLoop::start`] until [`AnimationLoop::stop`] or drop,
//! so each mounted canvas (and each rebuild) has a clear start and end.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::error;
use wasm_bindgen::prelude::*;
use web_sys::Window;

use super::error::GraphError;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

pub struct AnimationLoop {
	window: Window,
	frame_id: Rc<Cell<Option<i32>>>,
	callback: FrameCallback,
}

impl AnimationLoop {
	/// Schedule `on_frame` once per display refresh with the RAF timestamp in ms.
	pub fn start(mut on_frame: impl FnMut(f64) + 'static) -> Result<Self, GraphError> {
		let window = web_sys::window().ok_or(GraphError::NoWindow)?;
		let frame_id = Rc::new(Cell::new(None));
		let callback: FrameCallback = Rc::new(RefCell::new(None));

		let (window_inner, id_inner, callback_inner) =
			(window.clone(), frame_id.clone(), Rc::downgrade(&callback));
		*callback.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
			id_inner.set(None);
			on_frame(timestamp);

			let Some(callback) = callback_inner.upgrade() else {
				return;
			};
			let Ok(slot) = callback.try_borrow() else {
				return;
			};
			if let Some(cb) = slot.as_ref() {
				match window_inner.request_animation_frame(cb.as_ref().unchecked_ref()) {
					Ok(id) => id_inner.set(Some(id)),
					Err(e) => error!("animation loop halted: {e:?}"),
				}
			}
		}));

		let first = callback
			.borrow()
			.as_ref()
			.map(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref()))
			.transpose()
			.map_err(|e| GraphError::AnimationFrame(format!("{e:?}")))?;
		frame_id.set(first);

		Ok(Self {
			window,
			frame_id,
			callback,
		})
	}

	/// Cancel the pending frame and release the callback. Idempotent.
	pub fn stop(&mut self) {
		if let Some(id) = self.frame_id.take() {
			if let Err(e) = self.window.cancel_animation_frame(id) {
				error!("failed to cancel animation frame: {e:?}");
			}
		}
		self.callback.borrow_mut().take();
	}
}

impl Drop for AnimationLoop {
	fn drop(&mut self) {
		self.stop();
	}
}
