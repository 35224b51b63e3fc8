//! Self-organizing root → category → item graph on a pan/zoom canvas.

mod animation;
pub mod builder;
mod component;
pub mod error;
mod listeners;
mod palette;
mod render;
pub mod settings;
pub mod simulation;
pub mod state;
pub mod types;
pub mod viewport;

pub use builder::{BuilderConfig, CategoryPolicy, GraphBuild, build_graph};
pub use component::{CatalogGraphCanvas, GraphHandle};
pub use error::GraphError;
pub use settings::{CatalogDocument, GraphSettings};
pub use simulation::{AnchorMode, PairwiseRepulsion, RepulsionPass, Simulation, SimulationConfig};
pub use state::{FrameRequest, NodeClick};
pub use types::{CatalogItem, CategoryAngles, GraphNode, NodeKind, NodeSnapshot, Theme, Vec2};
pub use viewport::{PanGesture, ViewTransform, Viewport, ViewportConfig};
