use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;

use crate::components::map_canvas::{MapCanvas, Shortcut};
use crate::config::EditorConfig;
use crate::editor::{MapEditor, NewNode, Viewport};
use crate::graph::{Document, Edge, Node, NodeData, Position};

/// Toolbar-facing summary of the editor, refreshed on every revision.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct EditorStatus {
	can_undo: bool,
	can_redo: bool,
	nodes: usize,
	edges: usize,
}

impl EditorStatus {
	fn of(editor: &MapEditor) -> Self {
		Self {
			can_undo: editor.can_undo(),
			can_redo: editor.can_redo(),
			nodes: editor.document().nodes.len(),
			edges: editor.document().edges.len(),
		}
	}
}

/// Starter map: a root idea with a few branches.
fn sample_map() -> Document {
	let branches = ["Goals", "Tasks", "Journal", "Reading list"];
	let mut nodes = vec![Node::new("1", Position::new(0.0, 0.0), NodeData::labeled("MindDock"))];
	let mut edges = Vec::new();
	for (i, label) in branches.iter().enumerate() {
		let id = (i + 2).to_string();
		let x = (i as f64 - 1.5) * 260.0;
		nodes.push(Node::new(id.clone(), Position::new(x, 220.0), NodeData::labeled(*label)));
		edges.push(Edge::new(format!("e-1-{id}"), "1", id));
	}
	Document::new(nodes, edges)
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			<MapWorkspace />
		</ErrorBoundary>
	}
}

/// Canvas plus toolbar around one editor instance.
#[component]
fn MapWorkspace() -> impl IntoView {
	let editor = Rc::new(RefCell::new(MapEditor::with_document(
		EditorConfig::default(),
		sample_map(),
	)));
	let revision = RwSignal::new(0u64);
	let viewport = RwSignal::new(Viewport::default());
	let status = RwSignal::new(EditorStatus::of(&editor.borrow()));

	let editor_status = editor.clone();
	Effect::new(move |_| {
		revision.track();
		status.set(EditorStatus::of(&editor_status.borrow()));
	});

	let run = {
		let editor = editor.clone();
		move |shortcut: Shortcut| {
			if shortcut.apply(&mut editor.borrow_mut(), viewport.get_untracked()) {
				revision.update(|r| *r += 1);
			}
		}
	};
	let run_undo = run.clone();
	let run_redo = run.clone();
	let run_copy = run.clone();
	let run_paste = run.clone();
	let run_delete = run;

	let editor_add = editor.clone();
	let on_add = move |_: web_sys::MouseEvent| {
		let center = viewport.get_untracked().center();
		editor_add.borrow_mut().add_node(NewNode {
			position: Some(center),
			..NewNode::default()
		});
		revision.update(|r| *r += 1);
	};

	view! {
		<div class="fullscreen-graph">
			<MapCanvas editor=editor.clone() revision=revision viewport=viewport fullscreen=true />
			<div class="graph-overlay">
				<h1>"MindDock"</h1>
				<div class="toolbar">
					<button on:click=on_add>"+ Add Note"</button>
					<button
						on:click=move |_| run_undo(Shortcut::Undo)
						disabled=move || !status.get().can_undo
					>
						"Undo"
					</button>
					<button
						on:click=move |_| run_redo(Shortcut::Redo)
						disabled=move || !status.get().can_redo
					>
						"Redo"
					</button>
					<button on:click=move |_| run_copy(Shortcut::Copy)>"Copy"</button>
					<button on:click=move |_| run_paste(Shortcut::Paste)>"Paste"</button>
					<button on:click=move |_| run_delete(Shortcut::Delete)>"Delete"</button>
				</div>
				<p class="subtitle">
					{move || {
						let s = status.get();
						format!("{} nodes, {} edges", s.nodes, s.edges)
					}}
				</p>
				<p class="subtitle">
					"Drag nodes to move them. Double-click a node to select its group. Ctrl+Z / Ctrl+Y to undo and redo."
				</p>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn sample_map_is_one_group() {
		let map = sample_map();
		assert!(map.is_consistent());
		let group = crate::graph::connected_component("1", &map.edges);
		assert_eq!(group.nodes.len(), map.nodes.len());
	}

	#[test]
	fn status_tracks_history() {
		let mut editor = MapEditor::with_document(EditorConfig::default(), sample_map());
		assert_eq!(
			EditorStatus::of(&editor),
			EditorStatus {
				can_undo: false,
				can_redo: false,
				nodes: 5,
				edges: 4
			}
		);
		editor.add_node(NewNode::default());
		editor.undo();
		let status = EditorStatus::of(&editor);
		assert!(status.can_redo && !status.can_undo);
	}
}
