//! Splicing an external subgraph into the live document under fresh ids.
//!
//! Sources are the clipboard, AI `newMapData` payloads and generated
//! roadmap chains. All three are treated alike: source ids only mean
//! something inside their own batch and are replaced wholesale.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::document::{Document, Edge, EdgeId, Node, NodeId, Position};
use super::ids::IdAllocator;

/// Translation applied to every merged node position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offset {
	/// Horizontal shift.
	pub dx: f64,
	/// Vertical shift.
	pub dy: f64,
}

impl Offset {
	/// Creates an offset.
	pub fn new(dx: f64, dy: f64) -> Self {
		Self { dx, dy }
	}

	/// Offset moving `from` onto `to`.
	pub fn between(from: Position, to: Position) -> Self {
		Self::new(to.x - from.x, to.y - from.y)
	}

	fn apply(&self, p: Position) -> Position {
		Position::new(p.x + self.dx, p.y + self.dy)
	}
}

/// Additive delta produced by [`merge`]; the caller appends it to the
/// document after deselecting what was there.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergedResult {
	/// Copies of the source nodes, renamed, moved and selected.
	pub new_nodes: Vec<Node>,
	/// Copies of the source edges whose endpoints both made it across.
	pub new_edges: Vec<Edge>,
	/// Source id to new id, in source order.
	pub id_map: Vec<(NodeId, NodeId)>,
	/// Source edges discarded for referencing nodes outside the batch.
	pub dropped_edges: usize,
}

impl MergedResult {
	/// Whether nothing would be added.
	pub fn is_empty(&self) -> bool {
		self.new_nodes.is_empty()
	}

	/// New id given to a source node, if it was part of the batch.
	pub fn translated(&self, source_id: &str) -> Option<&NodeId> {
		self.id_map
			.iter()
			.find(|(old, _)| old == source_id)
			.map(|(_, new)| new)
	}
}

/// Rewrites `source_nodes`/`source_edges` into nodes and edges that can be
/// appended to `target` without id collisions.
///
/// Source order is preserved; when a source id repeats, its first
/// occurrence owns the mapping. Edges with an endpoint outside the batch
/// are dropped. `target` is only read.
pub fn merge(
	target: &Document,
	source_nodes: &[Node],
	source_edges: &[Edge],
	offset: Offset,
	ids: &mut IdAllocator,
) -> MergedResult {
	let mut result = MergedResult::default();
	if source_nodes.is_empty() {
		return result;
	}

	let mut translate: HashMap<&str, NodeId> = HashMap::with_capacity(source_nodes.len());
	let mut minted: HashSet<String> = HashSet::new();
	for node in source_nodes {
		let id = ids.allocate_where(|id| !target.contains_id(id) && !minted.contains(id));
		minted.insert(id.clone());
		translate.entry(node.id.as_str()).or_insert_with(|| id.clone());
		if !result.id_map.iter().any(|(old, _)| *old == node.id) {
			result.id_map.push((node.id.clone(), id.clone()));
		}
		result.new_nodes.push(Node {
			id,
			kind: node.kind.clone(),
			position: offset.apply(node.position),
			data: node.data.clone(),
			selected: Some(true),
		});
	}

	for edge in source_edges {
		let (Some(source), Some(target_id)) = (
			translate.get(edge.source.as_str()),
			translate.get(edge.target.as_str()),
		) else {
			result.dropped_edges += 1;
			continue;
		};
		let id = edge_id(source, target_id, |id| {
			target.contains_id(id) || minted.contains(id)
		});
		minted.insert(id.clone());
		result.new_edges.push(Edge {
			id,
			source: source.clone(),
			target: target_id.clone(),
			selected: Some(true),
			style: edge.style.clone(),
			marker_end: edge.marker_end.clone(),
		});
	}

	debug!(
		"merged {} nodes, {} edges ({} dropped)",
		result.new_nodes.len(),
		result.new_edges.len(),
		result.dropped_edges
	);
	result
}

/// `e-{source}-{target}`, suffixed `-2`, `-3`, ... while `taken`.
pub fn edge_id(source: &str, target: &str, taken: impl Fn(&str) -> bool) -> EdgeId {
	let base = format!("e-{source}-{target}");
	if !taken(&base) {
		return base;
	}
	(2u64..)
		.map(|n| format!("{base}-{n}"))
		.find(|id| !taken(id))
		.unwrap_or(base)
}

/// Appends a merge result to `doc`, deselecting everything already there.
pub fn splice(doc: &mut Document, merged: MergedResult) {
	doc.deselect_all();
	doc.nodes.extend(merged.new_nodes);
	doc.edges.extend(merged.new_edges);
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::graph::document::{EdgeStyle, MarkerEnd, NodeData};

	fn node(id: &str, x: f64, y: f64) -> Node {
		Node::new(id, Position::new(x, y), NodeData::labeled(format!("node {id}")))
	}

	fn target() -> Document {
		Document::new(
			vec![node("1000", 0.0, 0.0), node("1001", 50.0, 0.0)],
			vec![Edge::new("e-1000-1001", "1000", "1001")],
		)
	}

	#[test]
	fn empty_source_yields_nothing() {
		let mut ids = IdAllocator::new(1, 0);
		let result = merge(&target(), &[], &[Edge::new("x", "a", "b")], Offset::default(), &mut ids);
		assert!(result.is_empty());
		assert!(result.new_edges.is_empty());
		assert_eq!(ids.peek(), 1);
	}

	#[test]
	fn renames_shifts_and_selects() {
		let mut ids = IdAllocator::new(5000, 100);
		let nodes = vec![node("a", 10.0, 20.0), node("b", 30.0, 40.0)];
		let edges = vec![Edge::new("ab", "a", "b")];

		let result = merge(&target(), &nodes, &edges, Offset::new(100.0, -5.0), &mut ids);

		let ids_out: Vec<&str> = result.new_nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids_out, vec!["5000", "5001"]);
		assert_eq!(result.new_nodes[0].position, Position::new(110.0, 15.0));
		assert_eq!(result.new_nodes[1].position, Position::new(130.0, 35.0));
		assert!(result.new_nodes.iter().all(Node::is_selected));
		assert_eq!(result.new_edges.len(), 1);
		assert_eq!(result.new_edges[0].id, "e-5000-5001");
		assert_eq!(result.new_edges[0].source, "5000");
		assert_eq!(result.new_edges[0].target, "5001");
		assert_eq!(result.translated("b").map(String::as_str), Some("5001"));
	}

	#[test]
	fn drops_edges_leaving_the_batch() {
		let mut ids = IdAllocator::new(1, 0);
		let nodes = vec![node("a", 0.0, 0.0), node("b", 0.0, 0.0)];
		let edges = vec![
			Edge::new("ab", "a", "b"),
			Edge::new("ax", "a", "x"),
			Edge::new("yb", "y", "b"),
		];

		let result = merge(&Document::default(), &nodes, &edges, Offset::default(), &mut ids);

		assert!(result.new_edges.len() < edges.len());
		assert_eq!(result.dropped_edges, 2);
		for edge in &result.new_edges {
			assert!(result.new_nodes.iter().any(|n| n.id == edge.source));
			assert!(result.new_nodes.iter().any(|n| n.id == edge.target));
		}
	}

	#[test]
	fn never_reuses_target_ids() {
		// allocator deliberately not seeded from the target
		let mut ids = IdAllocator::new(1000, 0);
		let nodes = vec![node("a", 0.0, 0.0), node("b", 0.0, 0.0), node("c", 0.0, 0.0)];
		let edges = vec![Edge::new("ab", "a", "b"), Edge::new("bc", "b", "c")];
		let doc = target();

		let result = merge(&doc, &nodes, &edges, Offset::default(), &mut ids);

		let mut seen = HashSet::new();
		for id in result
			.new_nodes
			.iter()
			.map(|n| &n.id)
			.chain(result.new_edges.iter().map(|e| &e.id))
		{
			assert!(!doc.contains_id(id), "{id} collides with target");
			assert!(seen.insert(id.clone()), "{id} minted twice");
		}
		assert_eq!(result.new_nodes[0].id, "1002");
	}

	#[test]
	fn parallel_edges_get_distinct_ids() {
		let mut ids = IdAllocator::new(1, 0);
		let nodes = vec![node("a", 0.0, 0.0), node("b", 0.0, 0.0)];
		let edges = vec![Edge::new("one", "a", "b"), Edge::new("two", "a", "b")];

		let result = merge(&Document::default(), &nodes, &edges, Offset::default(), &mut ids);

		let edge_ids: Vec<&str> = result.new_edges.iter().map(|e| e.id.as_str()).collect();
		assert_eq!(edge_ids, vec!["e-1-2", "e-1-2-2"]);
	}

	#[test]
	fn first_occurrence_owns_duplicate_source_id() {
		let mut ids = IdAllocator::new(1, 0);
		let nodes = vec![node("a", 0.0, 0.0), node("a", 9.0, 9.0), node("b", 0.0, 0.0)];
		let edges = vec![Edge::new("ab", "a", "b")];

		let result = merge(&Document::default(), &nodes, &edges, Offset::default(), &mut ids);

		assert_eq!(result.new_nodes.len(), 3);
		assert_eq!(result.translated("a").map(String::as_str), Some("1"));
		assert_eq!(result.new_edges[0].source, "1");
		assert_eq!(result.new_edges[0].target, "3");
	}

	#[test]
	fn copies_do_not_alias_source() {
		let mut ids = IdAllocator::new(1, 0);
		let mut source = node("a", 0.0, 0.0);
		source.data.summary = Some("original".into());
		let mut edge = Edge::new("aa", "a", "a");
		edge.style = Some(EdgeStyle {
			stroke_dasharray: Some("5 5".into()),
		});
		edge.marker_end = Some(MarkerEnd::arrow_closed());

		let mut result = merge(
			&Document::default(),
			std::slice::from_ref(&source),
			std::slice::from_ref(&edge),
			Offset::default(),
			&mut ids,
		);
		result.new_nodes[0].data.summary = Some("edited".into());
		if let Some(style) = result.new_edges[0].style.as_mut() {
			style.stroke_dasharray = None;
		}

		assert_eq!(source.data.summary.as_deref(), Some("original"));
		assert_eq!(
			edge.style.and_then(|s| s.stroke_dasharray).as_deref(),
			Some("5 5")
		);
		assert_eq!(result.new_edges[0].marker_end, Some(MarkerEnd::arrow_closed()));
	}

	#[test]
	fn splice_deselects_existing() {
		let mut doc = target();
		doc.nodes[0].selected = Some(true);
		let mut ids = IdAllocator::new(2000, 0);
		let merged = merge(&doc, &[node("a", 0.0, 0.0)], &[], Offset::default(), &mut ids);

		splice(&mut doc, merged);

		let selected: Vec<&str> = doc
			.nodes
			.iter()
			.filter(|n| n.is_selected())
			.map(|n| n.id.as_str())
			.collect();
		assert_eq!(selected, vec!["2000"]);
		assert!(doc.is_consistent());
	}

	#[test]
	fn merges_after_loading_max_numeric_id() {
		let max = u64::MAX.to_string();
		let mut doc = Document::new(vec![node(&max, 0.0, 0.0)], vec![]);
		let mut ids = IdAllocator::new(1000, 100);
		ids.observe(&doc);

		let merged = merge(
			&doc,
			&[node("a", 0.0, 0.0), node("b", 0.0, 100.0)],
			&[Edge::new("ab", "a", "b")],
			Offset::default(),
			&mut ids,
		);

		assert_eq!(merged.new_nodes.len(), 2);
		assert_eq!(merged.new_nodes[0].id, format!("{max}-1"));
		assert_eq!(merged.new_edges[0].target, format!("{max}-2"));
		splice(&mut doc, merged);
		assert!(doc.is_consistent());
	}
}
