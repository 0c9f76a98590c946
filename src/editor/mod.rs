//! The map editor controller.
//!
//! [`MapEditor`] owns the one live [`Document`] and is the only thing that
//! mutates it. Actions that users expect to undo as a unit go through
//! [`MapEditor::perform`], which checkpoints the document first. Continuous
//! edits (dragging, typing into a label) mutate directly and are captured by
//! whichever checkpoint comes next.

pub mod ai;

use log::{debug, info};

use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::graph::document::nodes_bounds;
use crate::graph::merge::{self, edge_id};
use crate::graph::{
	Component, Document, Edge, EdgeId, EdgeStyle, HistoryManager, IdAllocator, MarkerEnd, Node,
	NodeId, NodeStyle, Offset, Position, Subgraph, connected_component,
};
use ai::{ChatResponse, MapAction, SaveMapRequest, mind_node, roadmap_chain};

/// Visible region of the canvas: pan `(x, y)` in screen pixels, `zoom`
/// factor and the screen size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	/// Horizontal pan.
	pub x: f64,
	/// Vertical pan.
	pub y: f64,
	/// Zoom factor.
	pub zoom: f64,
	/// Screen width in pixels.
	pub width: f64,
	/// Screen height in pixels.
	pub height: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			zoom: 1.0,
			width: 0.0,
			height: 0.0,
		}
	}
}

impl Viewport {
	/// Screen center expressed in flow coordinates. Degenerate zoom maps to
	/// the origin.
	pub fn center(&self) -> Position {
		let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
		Position::new(
			finite(-self.x / self.zoom + (self.width / 2.0) / self.zoom),
			finite(-self.y / self.zoom + (self.height / 2.0) / self.zoom),
		)
	}
}

/// Where an incoming subgraph lands. Resolved to a plain [`Offset`] before
/// merging.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
	/// Shift every node by a fixed amount.
	Offset(Offset),
	/// Move the subgraph's bounding box center onto the viewport center.
	CenterOn(Viewport),
	/// Treat node positions as relative to the viewport center.
	RelativeTo(Viewport),
}

/// Presets offered by the edge context menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeStyleKind {
	/// Plain solid line.
	Default,
	/// Solid line with a filled arrowhead.
	Directional,
	/// Dashed line.
	Dotted,
}

/// Options for [`MapEditor::add_node`]; unset fields fall back to config.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewNode {
	/// Title.
	pub label: Option<String>,
	/// Description.
	pub summary: Option<String>,
	/// Colors.
	pub style: Option<NodeStyle>,
	/// Top-left corner.
	pub position: Option<Position>,
}

/// Owns the live document, its history and the id allocator.
#[derive(Debug)]
pub struct MapEditor {
	config: EditorConfig,
	document: Document,
	history: HistoryManager,
	ids: IdAllocator,
	clipboard: Option<Subgraph>,
}

impl Default for MapEditor {
	fn default() -> Self {
		Self::new(EditorConfig::default())
	}
}

impl MapEditor {
	/// Empty editor.
	pub fn new(config: EditorConfig) -> Self {
		Self {
			history: HistoryManager::new(config.history_depth),
			ids: IdAllocator::new(config.initial_id, config.id_seed_margin),
			document: Document::default(),
			clipboard: None,
			config,
		}
	}

	/// Editor opened on `document`.
	pub fn with_document(config: EditorConfig, document: Document) -> Self {
		let mut editor = Self::new(config);
		editor.load(document);
		editor
	}

	/// The live document.
	pub fn document(&self) -> &Document {
		&self.document
	}

	/// Active configuration.
	pub fn config(&self) -> &EditorConfig {
		&self.config
	}

	/// Undo/redo stacks, read-only.
	pub fn history(&self) -> &HistoryManager {
		&self.history
	}

	/// Next id the allocator would mint.
	pub fn next_id(&self) -> u64 {
		self.ids.peek()
	}

	/// Replaces the live document with a freshly loaded map. Seeds the id
	/// allocator above the map's ids and forgets the previous map's history.
	pub fn load(&mut self, document: Document) {
		self.ids.observe(&document);
		self.history.clear();
		info!(
			"loaded map: {} nodes, {} edges",
			document.nodes.len(),
			document.edges.len()
		);
		self.document = document;
	}

	/// Checkpoints the document, then applies `mutate`. One call is one
	/// undo step no matter how much `mutate` changes.
	pub fn perform<R>(
		&mut self,
		action: &str,
		mutate: impl FnOnce(&mut Document, &mut IdAllocator, &EditorConfig) -> R,
	) -> R {
		debug!("checkpoint before {action}");
		self.history.snapshot(self.document.clone());
		mutate(&mut self.document, &mut self.ids, &self.config)
	}

	/// Whether there is anything to undo.
	pub fn can_undo(&self) -> bool {
		self.history.can_undo()
	}

	/// Whether there is anything to redo.
	pub fn can_redo(&self) -> bool {
		self.history.can_redo()
	}

	/// Reverts the last checkpointed action. `false` when history is empty.
	pub fn undo(&mut self) -> bool {
		let Some(previous) = self.history.undo(self.document.clone()) else {
			return false;
		};
		self.document = previous;
		true
	}

	/// Re-applies the last undone action. `false` when nothing was undone.
	pub fn redo(&mut self) -> bool {
		let Some(next) = self.history.redo(self.document.clone()) else {
			return false;
		};
		self.document = next;
		true
	}

	// --- checkpointed actions ---

	/// Adds a single `mindNode`.
	pub fn add_node(&mut self, options: NewNode) -> NodeId {
		self.perform("add node", |doc, ids, config| {
			let id = ids.allocate_where(|id| !doc.contains_id(id));
			let label = options.label.as_deref().unwrap_or(&config.default_label);
			let mut node = mind_node(id.clone(), options.position.unwrap_or_default(), label, config);
			if let Some(style) = options.style {
				node.data.style = Some(style);
			}
			if options.summary.is_some() {
				node.data.summary = options.summary;
			}
			doc.nodes.push(node);
			id
		})
	}

	/// Deletes selected nodes (with their edges) and selected edges.
	/// Returns `false`, taking no checkpoint, when nothing is selected.
	pub fn delete_selected(&mut self) -> bool {
		let nodes: Vec<NodeId> = self
			.document
			.nodes
			.iter()
			.filter(|n| n.is_selected())
			.map(|n| n.id.clone())
			.collect();
		let has_edges = self.document.edges.iter().any(Edge::is_selected);
		if nodes.is_empty() && !has_edges {
			return false;
		}
		self.perform("delete selection", |doc, _, _| {
			for id in &nodes {
				doc.remove_node(id);
			}
			doc.edges.retain(|e| !e.is_selected());
		});
		true
	}

	/// Deletes one node and its edges.
	pub fn delete_node(&mut self, id: &str) -> Result<()> {
		self.require_node(id)?;
		self.perform("delete node", |doc, _, _| {
			doc.remove_node(id);
		});
		Ok(())
	}

	/// Recolors a node.
	pub fn set_node_color(&mut self, id: &str, style: NodeStyle) -> Result<()> {
		self.require_node(id)?;
		self.perform("set node color", |doc, _, _| {
			if let Some(node) = doc.node_mut(id) {
				node.data.style = Some(style);
			}
		});
		Ok(())
	}

	/// Applies an edge style preset.
	pub fn set_edge_style(&mut self, id: &str, kind: EdgeStyleKind) -> Result<()> {
		if self.document.edge(id).is_none() {
			return Err(EditorError::UnknownEdge(id.to_owned()));
		}
		self.perform("set edge style", |doc, _, _| {
			if let Some(edge) = doc.edge_mut(id) {
				edge.marker_end = match kind {
					EdgeStyleKind::Directional => Some(MarkerEnd::arrow_closed()),
					_ => None,
				};
				edge.style = Some(match kind {
					EdgeStyleKind::Dotted => EdgeStyle {
						stroke_dasharray: Some("5 5".into()),
					},
					_ => EdgeStyle::default(),
				});
			}
		});
		Ok(())
	}

	/// Copies the current selection to the clipboard. Leaves the clipboard
	/// alone and returns 0 when no node is selected.
	pub fn copy_selection(&mut self) -> usize {
		let selection = self.document.selection();
		if selection.nodes.is_empty() {
			return 0;
		}
		let copied = selection.nodes.len();
		debug!("copied {copied} nodes, {} edges", selection.edges.len());
		self.clipboard = Some(selection);
		copied
	}

	/// Clipboard contents, if anything was copied.
	pub fn clipboard(&self) -> Option<&Subgraph> {
		self.clipboard.as_ref()
	}

	/// Pastes the clipboard centered on the viewport. Returns the new node
	/// ids, empty (and no checkpoint) when there is nothing to paste.
	pub fn paste(&mut self, viewport: Viewport) -> Vec<NodeId> {
		let Some(clipboard) = self.clipboard.clone() else {
			return Vec::new();
		};
		self.insert_subgraph("paste", &clipboard, Placement::CenterOn(viewport), None)
	}

	/// Drops an AI-generated map into the viewport. Positions in `map`
	/// are relative to the viewport center.
	pub fn apply_generated_map(&mut self, map: &Subgraph, viewport: Viewport) -> Vec<NodeId> {
		self.insert_subgraph("ai map", map, Placement::RelativeTo(viewport), None)
	}

	/// Applies everything a chat reply asks for: a new map, then a targeted
	/// map action. Returns the ids of nodes added. An action naming an
	/// unknown node refuses the whole reply before anything is applied.
	pub fn apply_chat_response(&mut self, response: &ChatResponse, viewport: Viewport) -> Result<Vec<NodeId>> {
		if let Some(action) = &response.map_action {
			self.check_action(action)?;
		}
		let mut added = Vec::new();
		if let Some(map) = &response.new_map_data {
			added.extend(self.apply_generated_map(map, viewport));
		}
		if let Some(action) = &response.map_action {
			added.extend(self.apply_map_action(action)?);
		}
		Ok(added)
	}

	/// Hangs a chain of roadmap steps under `source_id`.
	pub fn expand_roadmap(&mut self, source_id: &str, steps: &[String]) -> Result<Vec<NodeId>> {
		let source = self.require_node(source_id)?;
		if steps.is_empty() {
			return Err(EditorError::EmptyRoadmap(source_id.to_owned()));
		}
		let chain = roadmap_chain(steps, source.position, &self.config);
		let link = (source_id.to_owned(), Some(MarkerEnd::arrow_closed()));
		Ok(self.insert_subgraph(
			"roadmap",
			&chain,
			Placement::Offset(Offset::default()),
			Some(link),
		))
	}

	/// Executes an assistant-issued edit. Each action is one undo step.
	pub fn apply_map_action(&mut self, action: &MapAction) -> Result<Vec<NodeId>> {
		match action {
			MapAction::AddNode {
				label,
				summary,
				parent_id,
			} => {
				let origin = match parent_id {
					Some(parent) => {
						let p = self.require_node(parent)?.position;
						Position::new(p.x, p.y + self.config.roadmap_first_offset)
					}
					None => Position::default(),
				};
				let mut node = mind_node("new", origin, label, &self.config);
				if summary.is_some() {
					node.data.summary = summary.clone();
				}
				let batch = Subgraph {
					nodes: vec![node],
					edges: Vec::new(),
				};
				let link = parent_id.clone().map(|p| (p, None));
				Ok(self.insert_subgraph("add node", &batch, Placement::Offset(Offset::default()), link))
			}
			MapAction::DeleteNode { node_id } => {
				self.delete_node(node_id)?;
				Ok(Vec::new())
			}
			MapAction::UpdateNode {
				node_id,
				label,
				summary,
			} => {
				self.require_node(node_id)?;
				self.perform("update node", |doc, _, _| {
					if let Some(node) = doc.node_mut(node_id) {
						if let Some(label) = label {
							node.data.label = label.clone();
						}
						if summary.is_some() {
							node.data.summary = summary.clone();
						}
					}
				});
				Ok(Vec::new())
			}
			MapAction::ExtendMap {
				parent_id,
				nodes,
				edges,
			} => {
				let parent = self.require_node(parent_id)?.position;
				let batch = Subgraph {
					nodes: nodes.clone(),
					edges: edges.clone(),
				};
				let Some(bounds) = nodes_bounds(&batch.nodes, 0.0, 0.0) else {
					return Ok(Vec::new());
				};
				let anchor = Position::new(parent.x, parent.y + self.config.roadmap_first_offset);
				let offset = Offset::between(Position::new(bounds.x, bounds.y), anchor);
				Ok(self.insert_subgraph(
					"extend map",
					&batch,
					Placement::Offset(offset),
					Some((parent_id.clone(), None)),
				))
			}
		}
	}

	// --- direct edits, folded into the next checkpoint ---

	/// Connects two nodes. Not checkpointed.
	pub fn connect(&mut self, source: &str, target: &str) -> Result<EdgeId> {
		self.require_node(source)?;
		self.require_node(target)?;
		if self
			.document
			.edges
			.iter()
			.any(|e| e.source == source && e.target == target)
		{
			return Err(EditorError::AlreadyConnected(source.to_owned(), target.to_owned()));
		}
		let id = edge_id(source, target, |id| self.document.contains_id(id));
		self.document.edges.push(Edge::new(id.clone(), source, target));
		Ok(id)
	}

	/// Moves a node. Not checkpointed: called on every drag step.
	pub fn move_node(&mut self, id: &str, position: Position) -> Result<()> {
		self.node_mut(id)?.position = position;
		Ok(())
	}

	/// Edits a node title. Not checkpointed: called per keystroke.
	pub fn set_label(&mut self, id: &str, label: impl Into<String>) -> Result<()> {
		self.node_mut(id)?.data.label = label.into();
		Ok(())
	}

	/// Edits a node description. Not checkpointed.
	pub fn set_summary(&mut self, id: &str, summary: impl Into<String>) -> Result<()> {
		self.node_mut(id)?.data.summary = Some(summary.into());
		Ok(())
	}

	/// Edits node notes. Not checkpointed.
	pub fn set_notes(&mut self, id: &str, notes: impl Into<String>) -> Result<()> {
		self.node_mut(id)?.data.notes = Some(notes.into());
		Ok(())
	}

	/// Sets or clears a node link. Not checkpointed.
	pub fn set_link(&mut self, id: &str, link: Option<String>) -> Result<()> {
		self.node_mut(id)?.data.link = link;
		Ok(())
	}

	// --- selection ---

	/// Selects exactly one node.
	pub fn select_only(&mut self, id: &str) -> Result<()> {
		self.require_node(id)?;
		self.document.deselect_all();
		self.node_mut(id)?.selected = Some(true);
		Ok(())
	}

	/// Flips the selection of one node, keeping the rest.
	pub fn toggle_selected(&mut self, id: &str) -> Result<()> {
		let node = self.node_mut(id)?;
		node.selected = Some(!node.is_selected());
		Ok(())
	}

	/// Deselects everything.
	pub fn clear_selection(&mut self) {
		self.document.deselect_all();
	}

	/// Selects the connected group around `start` and nothing else.
	pub fn select_group(&mut self, start: &str) -> Result<Component> {
		self.require_node(start)?;
		let component = connected_component(start, &self.document.edges);
		for node in &mut self.document.nodes {
			node.selected = Some(component.nodes.contains(&node.id));
		}
		for edge in &mut self.document.edges {
			edge.selected = Some(component.edges.contains(&edge.id));
		}
		Ok(component)
	}

	/// Body for persisting the live map.
	pub fn save_request(&self, title: impl Into<String>) -> SaveMapRequest {
		let Document { nodes, edges } = self.document.without_selection();
		SaveMapRequest {
			title: title.into(),
			nodes,
			edges,
		}
	}

	/// Fails with the error [`apply_map_action`](Self::apply_map_action)
	/// would raise, without touching the document.
	fn check_action(&self, action: &MapAction) -> Result<()> {
		let target = match action {
			MapAction::AddNode { parent_id, .. } => parent_id.as_deref(),
			MapAction::DeleteNode { node_id } | MapAction::UpdateNode { node_id, .. } => {
				Some(node_id.as_str())
			}
			MapAction::ExtendMap { parent_id, .. } => Some(parent_id.as_str()),
		};
		match target {
			Some(id) => self.require_node(id).map(|_| ()),
			None => Ok(()),
		}
	}

	fn require_node(&self, id: &str) -> Result<&Node> {
		self.document
			.node(id)
			.ok_or_else(|| EditorError::UnknownNode(id.to_owned()))
	}

	fn node_mut(&mut self, id: &str) -> Result<&mut Node> {
		self.document
			.node_mut(id)
			.ok_or_else(|| EditorError::UnknownNode(id.to_owned()))
	}

	/// Checkpoint, merge `batch`, splice it in and optionally link an
	/// existing node to the first inserted one.
	fn insert_subgraph(
		&mut self,
		action: &str,
		batch: &Subgraph,
		placement: Placement,
		link: Option<(NodeId, Option<MarkerEnd>)>,
	) -> Vec<NodeId> {
		if batch.nodes.is_empty() {
			return Vec::new();
		}
		let offset = self.resolve(placement, &batch.nodes);
		self.perform(action, |doc, ids, _| {
			let merged = merge::merge(doc, &batch.nodes, &batch.edges, offset, ids);
			let new_ids: Vec<NodeId> = merged.new_nodes.iter().map(|n| n.id.clone()).collect();
			merge::splice(doc, merged);
			if let (Some((from, marker)), Some(first)) = (link, new_ids.first()) {
				let id = edge_id(&from, first, |id| doc.contains_id(id));
				let mut edge = Edge::new(id, from, first.clone());
				edge.marker_end = marker;
				doc.edges.push(edge);
			}
			new_ids
		})
	}

	fn resolve(&self, placement: Placement, nodes: &[Node]) -> Offset {
		match placement {
			Placement::Offset(offset) => offset,
			Placement::RelativeTo(viewport) => {
				let c = viewport.center();
				Offset::new(c.x, c.y)
			}
			Placement::CenterOn(viewport) => {
				nodes_bounds(nodes, self.config.node_width, self.config.node_height)
					.map(|b| Offset::between(b.center(), viewport.center()))
					.unwrap_or_default()
			}
		}
	}
}
