//! Connected-component selection for "select group".

use std::collections::{HashSet, VecDeque};

use super::document::{Edge, EdgeId, NodeId};

/// Node and edge ids reachable from a start node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Component {
	/// Reachable node ids, start included.
	pub nodes: HashSet<NodeId>,
	/// Edges touching any reachable node.
	pub edges: HashSet<EdgeId>,
}

/// Breadth-first walk from `start` treating every edge as undirected.
pub fn connected_component(start: &str, edges: &[Edge]) -> Component {
	let mut component = Component::default();
	let mut queue = VecDeque::from([start.to_owned()]);
	component.nodes.insert(start.to_owned());

	while let Some(current) = queue.pop_front() {
		for edge in edges.iter().filter(|e| e.touches(&current)) {
			component.edges.insert(edge.id.clone());
			let neighbor = if edge.source == current {
				&edge.target
			} else {
				&edge.source
			};
			if component.nodes.insert(neighbor.clone()) {
				queue.push_back(neighbor.clone());
			}
		}
	}
	component
}
