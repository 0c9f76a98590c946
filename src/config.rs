//! Editor tunables.

use serde::Deserialize;

use crate::graph::NodeStyle;
use crate::graph::history::DEFAULT_DEPTH;

/// Knobs for [`MapEditor`](crate::editor::MapEditor). Every field has a
/// default, so a partial JSON object is a valid configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
	/// Undo steps kept before the oldest is evicted.
	pub history_depth: usize,
	/// First id minted by a fresh allocator.
	pub initial_id: u64,
	/// Headroom left above the largest id of a loaded map.
	pub id_seed_margin: u64,
	/// Vertical gap between a roadmap source and its first step.
	pub roadmap_first_offset: f64,
	/// Vertical gap between consecutive roadmap steps.
	pub roadmap_step_spacing: f64,
	/// Nominal node width used for bounds, centering and hit tests.
	pub node_width: f64,
	/// Nominal node height.
	pub node_height: f64,
	/// Colors for nodes created by the editor.
	pub default_node_style: NodeStyle,
	/// Label for nodes created without one.
	pub default_label: String,
}

impl Default for EditorConfig {
	fn default() -> Self {
		Self {
			history_depth: DEFAULT_DEPTH,
			initial_id: 1000,
			id_seed_margin: 100,
			roadmap_first_offset: 120.0,
			roadmap_step_spacing: 90.0,
			node_width: 220.0,
			node_height: 100.0,
			default_node_style: NodeStyle::new("#2a2a2a", "#f0f0f0"),
			default_label: "Untitled".into(),
		}
	}
}

impl EditorConfig {
	/// Parses a (possibly partial) JSON configuration.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let config = EditorConfig::from_json(r#"{"history_depth": 5, "default_label": "Idea"}"#)
			.unwrap();
		assert_eq!(config.history_depth, 5);
		assert_eq!(config.default_label, "Idea");
		assert_eq!(config.initial_id, 1000);
		assert_eq!(config.default_node_style, NodeStyle::new("#2a2a2a", "#f0f0f0"));
	}

	#[test]
	fn rejects_wrong_types() {
		assert!(EditorConfig::from_json(r#"{"history_depth": "many"}"#).is_err());
	}
}
