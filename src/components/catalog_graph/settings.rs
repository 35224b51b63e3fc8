//! JSON-loadable settings and catalog documents.

use serde::{Deserialize, Serialize};

use super::builder::BuilderConfig;
use super::error::GraphError;
use super::simulation::SimulationConfig;
use super::types::{CatalogItem, CategoryAngles};
use super::viewport::ViewportConfig;

/// All tunables for one canvas. Any subset may be given; the rest default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
	/// Node placement.
	pub builder: BuilderConfig,
	/// Force constants.
	pub simulation: SimulationConfig,
	/// Camera limits.
	pub viewport: ViewportConfig,
}

/// A self-contained catalog as handed over by the content source.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogDocument {
	/// Entries in display order.
	pub items: Vec<CatalogItem>,
	/// Category name → fixed angle in degrees.
	pub angles: CategoryAngles,
	/// Overrides for the canvas defaults.
	pub settings: GraphSettings,
}

impl CatalogDocument {
	/// Parse a document. Missing fields take their defaults.
	pub fn from_json(json: &str) -> Result<Self, GraphError> {
		Ok(serde_json::from_str(json)?)
	}
}
