//! Node/edge document model shared by history, merge and the canvas.
//!
//! Field names serialize the way the map API stores them (`camelCase`,
//! `type`, `markerEnd`), so a stored map round-trips through these types.

use serde::{Deserialize, Serialize};

/// Identifier of a node within a single [`Document`].
pub type NodeId = String;
/// Identifier of an edge within a single [`Document`].
pub type EdgeId = String;

/// Renderer type given to editor-created nodes.
pub const MIND_NODE: &str = "mindNode";

/// Point in flow coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Position {
	/// Creates a position.
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Background and text color of a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
	/// Fill color, CSS syntax.
	pub background_color: String,
	/// Text color, CSS syntax.
	pub color: String,
}

impl NodeStyle {
	/// Creates a style from a background and a text color.
	pub fn new(background_color: impl Into<String>, color: impl Into<String>) -> Self {
		Self {
			background_color: background_color.into(),
			color: color.into(),
		}
	}
}

/// User-editable payload of a node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeData {
	/// Title shown on the node.
	pub label: String,
	/// Short description under the title.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub summary: Option<String>,
	/// Colors; `None` renders with the editor default.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub style: Option<NodeStyle>,
	/// Free-form notes.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
	/// External link attached to the node.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub link: Option<String>,
}

impl NodeData {
	/// Data with only a label set.
	pub fn labeled(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			..Self::default()
		}
	}
}

/// A node of the mind map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	/// Unique id within the document.
	pub id: NodeId,
	/// Renderer node type, `mindNode` for editor-created nodes.
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	/// Top-left corner in flow coordinates.
	#[serde(default)]
	pub position: Position,
	/// User content.
	#[serde(default)]
	pub data: NodeData,
	/// UI selection flag; never persisted.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub selected: Option<bool>,
}

impl Node {
	/// Creates an unselected node.
	pub fn new(id: impl Into<NodeId>, position: Position, data: NodeData) -> Self {
		Self {
			id: id.into(),
			kind: None,
			position,
			data,
			selected: None,
		}
	}

	/// Whether the node is currently selected.
	pub fn is_selected(&self) -> bool {
		self.selected.unwrap_or(false)
	}

	/// Whether this node was created by the editor rather than imported.
	pub fn is_mind_node(&self) -> bool {
		self.kind.as_deref() == Some(MIND_NODE)
	}
}

/// Arrowhead kinds understood by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerType {
	/// Open arrowhead.
	Arrow,
	/// Filled arrowhead.
	#[serde(rename = "arrowclosed")]
	ArrowClosed,
}

/// Arrowhead drawn at the target end of an edge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerEnd {
	/// Arrowhead shape.
	#[serde(rename = "type")]
	pub kind: MarkerType,
}

impl MarkerEnd {
	/// The filled arrow used by directional and roadmap edges.
	pub fn arrow_closed() -> Self {
		Self {
			kind: MarkerType::ArrowClosed,
		}
	}
}

/// Stroke style of an edge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EdgeStyle {
	/// SVG-style dash pattern, e.g. `"5 5"`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub stroke_dasharray: Option<String>,
}

/// A directed connection between two nodes of the same document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
	/// Unique id within the document.
	pub id: EdgeId,
	/// Id of the source node.
	pub source: NodeId,
	/// Id of the target node.
	pub target: NodeId,
	/// UI selection flag.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub selected: Option<bool>,
	/// Stroke style.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub style: Option<EdgeStyle>,
	/// Arrowhead at the target end.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub marker_end: Option<MarkerEnd>,
}

impl Edge {
	/// Creates a plain, unselected edge.
	pub fn new(id: impl Into<EdgeId>, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
		Self {
			id: id.into(),
			source: source.into(),
			target: target.into(),
			selected: None,
			style: None,
			marker_end: None,
		}
	}

	/// Whether the edge is currently selected.
	pub fn is_selected(&self) -> bool {
		self.selected.unwrap_or(false)
	}

	/// Whether `id` is one of the endpoints.
	pub fn touches(&self, id: &str) -> bool {
		self.source == id || self.target == id
	}
}

/// Axis-aligned rectangle in flow coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
	/// Left edge.
	pub x: f64,
	/// Top edge.
	pub y: f64,
	/// Width.
	pub width: f64,
	/// Height.
	pub height: f64,
}

impl Bounds {
	/// Center point of the rectangle.
	pub fn center(&self) -> Position {
		Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
	}
}

/// Box enclosing every node, each sized `node_width` x `node_height`.
/// `None` for an empty slice.
pub fn nodes_bounds(nodes: &[Node], node_width: f64, node_height: f64) -> Option<Bounds> {
	let first = nodes.first()?;
	let (mut min_x, mut min_y) = (first.position.x, first.position.y);
	let (mut max_x, mut max_y) = (min_x + node_width, min_y + node_height);
	for node in &nodes[1..] {
		min_x = min_x.min(node.position.x);
		min_y = min_y.min(node.position.y);
		max_x = max_x.max(node.position.x + node_width);
		max_y = max_y.max(node.position.y + node_height);
	}
	Some(Bounds {
		x: min_x,
		y: min_y,
		width: max_x - min_x,
		height: max_y - min_y,
	})
}

/// Nodes and edges that travel together outside a document: the clipboard,
/// an AI `newMapData` payload, or a generated roadmap chain.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subgraph {
	/// Nodes in input order.
	pub nodes: Vec<Node>,
	/// Edges referencing `nodes` ids.
	pub edges: Vec<Edge>,
}

/// The complete editable state: every node and edge of the open map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
	/// All nodes.
	pub nodes: Vec<Node>,
	/// All edges; endpoints reference `nodes`.
	pub edges: Vec<Edge>,
}

impl Document {
	/// Creates a document from parts.
	pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
		Self { nodes, edges }
	}

	/// Looks up a node by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Mutable lookup of a node by id.
	pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}

	/// Looks up an edge by id.
	pub fn edge(&self, id: &str) -> Option<&Edge> {
		self.edges.iter().find(|e| e.id == id)
	}

	/// Mutable lookup of an edge by id.
	pub fn edge_mut(&mut self, id: &str) -> Option<&mut Edge> {
		self.edges.iter_mut().find(|e| e.id == id)
	}

	/// Whether a node or an edge already uses `id`.
	pub fn contains_id(&self, id: &str) -> bool {
		self.nodes.iter().any(|n| n.id == id) || self.edges.iter().any(|e| e.id == id)
	}

	/// Currently selected nodes and the selected edges among them, cloned.
	pub fn selection(&self) -> Subgraph {
		Subgraph {
			nodes: self.nodes.iter().filter(|n| n.is_selected()).cloned().collect(),
			edges: self.edges.iter().filter(|e| e.is_selected()).cloned().collect(),
		}
	}

	/// Clears the selection flag on every node and edge.
	pub fn deselect_all(&mut self) {
		for node in &mut self.nodes {
			node.selected = Some(false);
		}
		for edge in &mut self.edges {
			edge.selected = Some(false);
		}
	}

	/// Removes a node together with every edge touching it.
	/// Returns `false` when no such node exists.
	pub fn remove_node(&mut self, id: &str) -> bool {
		let before = self.nodes.len();
		self.nodes.retain(|n| n.id != id);
		if self.nodes.len() == before {
			return false;
		}
		self.edges.retain(|e| !e.touches(id));
		true
	}

	/// Whether every edge references nodes of this document.
	pub fn is_consistent(&self) -> bool {
		self.edges
			.iter()
			.all(|e| self.node(&e.source).is_some() && self.node(&e.target).is_some())
	}

	/// Copy suitable for persistence: selection flags stripped.
	pub fn without_selection(&self) -> Self {
		let mut doc = self.clone();
		for node in &mut doc.nodes {
			node.selected = None;
		}
		for edge in &mut doc.edges {
			edge.selected = None;
		}
		doc
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn parses_stored_map_shape() {
		let json = r##"{
			"nodes": [
				{"id": "1", "type": "mindNode", "position": {"x": 10, "y": 20},
				 "data": {"label": "Root", "style": {"backgroundColor": "#2a2a2a", "color": "#f0f0f0"}}},
				{"id": "2", "position": {"x": 10, "y": 140}, "data": {"label": "Child", "summary": "s"}}
			],
			"edges": [
				{"id": "e-1-2", "source": "1", "target": "2",
				 "markerEnd": {"type": "arrowclosed"}, "style": {"strokeDasharray": "5 5"}}
			]
		}"##;
		let doc: Document = serde_json::from_str(json).unwrap();

		assert_eq!(doc.nodes.len(), 2);
		assert!(doc.nodes[0].is_mind_node());
		assert!(!doc.nodes[1].is_mind_node());
		assert_eq!(
			doc.nodes[0].data.style,
			Some(NodeStyle::new("#2a2a2a", "#f0f0f0"))
		);
		assert_eq!(doc.edges[0].marker_end, Some(MarkerEnd::arrow_closed()));
		assert_eq!(
			doc.edges[0].style.as_ref().and_then(|s| s.stroke_dasharray.as_deref()),
			Some("5 5")
		);
		assert!(doc.is_consistent());
	}

	#[test]
	fn remove_node_drops_incident_edges() {
		let mut doc = Document::new(
			vec![
				Node::new("1", Position::default(), NodeData::labeled("a")),
				Node::new("2", Position::default(), NodeData::labeled("b")),
				Node::new("3", Position::default(), NodeData::labeled("c")),
			],
			vec![Edge::new("e-1-2", "1", "2"), Edge::new("e-2-3", "2", "3")],
		);

		assert!(doc.remove_node("2"));
		assert!(!doc.remove_node("2"));
		assert_eq!(doc.nodes.len(), 2);
		assert!(doc.edges.is_empty());
	}

	#[test]
	fn bounds_cover_node_extent() {
		let nodes = vec![
			Node::new("1", Position::new(0.0, 0.0), NodeData::default()),
			Node::new("2", Position::new(100.0, 50.0), NodeData::default()),
		];
		let bounds = nodes_bounds(&nodes, 20.0, 10.0).unwrap();

		assert_eq!(
			bounds,
			Bounds {
				x: 0.0,
				y: 0.0,
				width: 120.0,
				height: 60.0
			}
		);
		assert_eq!(bounds.center(), Position::new(60.0, 30.0));
		assert_eq!(nodes_bounds(&[], 20.0, 10.0), None);
	}

	#[test]
	fn persisted_copy_has_no_selection() {
		let mut node = Node::new("1", Position::default(), NodeData::labeled("a"));
		node.selected = Some(true);
		let doc = Document::new(vec![node], vec![]);

		let json = serde_json::to_value(doc.without_selection()).unwrap();
		assert!(json["nodes"][0].get("selected").is_none());
	}
}
