//! Request/response shapes exchanged with the map and AI endpoints, and the
//! translation of AI output into subgraphs the merge step understands.

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
pub use crate::graph::document::MIND_NODE;
use crate::graph::{Document, Edge, MarkerEnd, Node, NodeData, NodeId, Position, Subgraph};

/// One line of the chat transcript sent to `POST /ai/chat`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
	/// `true` for the user, `false` for the assistant.
	pub from_user: bool,
	/// Message text.
	pub text: String,
}

/// Body of `POST /ai/chat`: the transcript plus the current map as context.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatRequest {
	/// Transcript, oldest first.
	pub messages: Vec<ChatMessage>,
	/// Map nodes without UI state.
	pub nodes: Vec<Node>,
	/// Map edges without UI state.
	pub edges: Vec<Edge>,
}

impl ChatRequest {
	/// Builds a request carrying `doc` stripped of selection flags.
	pub fn new(messages: Vec<ChatMessage>, doc: &Document) -> Self {
		let Document { nodes, edges } = doc.without_selection();
		Self {
			messages,
			nodes,
			edges,
		}
	}
}

/// Structured edit the assistant asks the editor to perform.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(
	tag = "type",
	rename_all = "SCREAMING_SNAKE_CASE",
	rename_all_fields = "camelCase"
)]
pub enum MapAction {
	/// Create one node, optionally linked from `parent_id`.
	AddNode {
		/// Title of the new node.
		label: String,
		/// Optional description.
		#[serde(default)]
		summary: Option<String>,
		/// Existing node to hang the new one under.
		#[serde(default)]
		parent_id: Option<NodeId>,
	},
	/// Remove a node and its edges.
	DeleteNode {
		/// Node to remove.
		node_id: NodeId,
	},
	/// Change the text of a node.
	UpdateNode {
		/// Node to change.
		node_id: NodeId,
		/// New title, if any.
		#[serde(default)]
		label: Option<String>,
		/// New description, if any.
		#[serde(default)]
		summary: Option<String>,
	},
	/// Grow the map below `parent_id` with a generated subgraph.
	ExtendMap {
		/// Node the subgraph attaches to.
		parent_id: NodeId,
		/// Generated nodes, positions relative to each other.
		#[serde(default)]
		nodes: Vec<Node>,
		/// Generated edges between `nodes`.
		#[serde(default)]
		edges: Vec<Edge>,
	},
}

/// Reply of `POST /ai/chat`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChatResponse {
	/// Assistant text.
	pub reply: String,
	/// A brand new map to drop into the viewport.
	#[serde(rename = "newMapData")]
	pub new_map_data: Option<Subgraph>,
	/// A targeted edit of the current map.
	#[serde(rename = "mapAction")]
	pub map_action: Option<MapAction>,
}

impl ChatResponse {
	/// Parses a raw response body.
	pub fn from_json(json: &str) -> crate::error::Result<Self> {
		Ok(serde_json::from_str(json)?)
	}
}

/// Body of `POST /ai/generate-roadmap`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoadmapRequest {
	/// Label of the node being expanded.
	pub topic: String,
}

impl RoadmapRequest {
	/// Request expanding `node`, using its label as the topic.
	pub fn for_node(node: &Node) -> Self {
		Self {
			topic: node.data.label.clone(),
		}
	}
}

/// Reply of `POST /ai/generate-roadmap`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoadmapResponse {
	/// Ordered step titles.
	pub steps: Vec<String>,
}

/// Body of `PUT /map/{id}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SaveMapRequest {
	/// Map title.
	pub title: String,
	/// Nodes without UI state.
	pub nodes: Vec<Node>,
	/// Edges without UI state.
	pub edges: Vec<Edge>,
}

/// Node as the editor creates it: `mindNode` type, default colors.
pub fn mind_node(id: impl Into<NodeId>, position: Position, label: &str, config: &EditorConfig) -> Node {
	let mut node = Node::new(
		id,
		position,
		NodeData {
			label: label.to_owned(),
			summary: Some(String::new()),
			style: Some(config.default_node_style.clone()),
			..NodeData::default()
		},
	);
	node.kind = Some(MIND_NODE.to_owned());
	node
}

/// Vertical chain of step nodes under `origin`, joined by arrows.
///
/// Ids are placeholders local to the chain; merging replaces them.
pub fn roadmap_chain(steps: &[String], origin: Position, config: &EditorConfig) -> Subgraph {
	let nodes: Vec<Node> = steps
		.iter()
		.enumerate()
		.map(|(i, step)| {
			let position = Position::new(
				origin.x,
				origin.y + i as f64 * config.roadmap_step_spacing + config.roadmap_first_offset,
			);
			mind_node(format!("step-{i}"), position, step, config)
		})
		.collect();
	let edges = nodes
		.windows(2)
		.map(|pair| {
			let mut edge = Edge::new(
				format!("{}-{}", pair[0].id, pair[1].id),
				pair[0].id.clone(),
				pair[1].id.clone(),
			);
			edge.marker_end = Some(MarkerEnd::arrow_closed());
			edge
		})
		.collect();
	Subgraph { nodes, edges }
}
