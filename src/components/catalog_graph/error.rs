//! Error type for the browser-facing parts of the graph.

/// Failures talking to the browser host. The layout core itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
	/// No global `window` (not running in a browser).
	#[error("window is not available")]
	NoWindow,

	/// `getContext("2d")` returned nothing usable.
	#[error("canvas has no 2d rendering context")]
	NoContext,

	/// `requestAnimationFrame` threw.
	#[error("failed to request animation frame: {0}")]
	AnimationFrame(String),

	/// `addEventListener` threw.
	#[error("failed to register {event:?} listener: {reason}")]
	Listener {
		/// DOM event name.
		event: &'static str,
		/// Stringified JS exception.
		reason: String,
	},

	/// The catalog JSON did not parse.
	#[error("invalid catalog document: {0}")]
	Catalog(#[from] serde_json::Error),
}
