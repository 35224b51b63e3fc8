//! UI components.

pub mod catalog_graph;
