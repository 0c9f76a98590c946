use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::debug;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Element, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent,
	Window,
};

use super::render;
use super::state::CanvasState;
use crate::editor::{MapEditor, Viewport};
use crate::graph::Position;

/// Keyboard shortcuts understood by the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
	/// Ctrl/Cmd+Z.
	Undo,
	/// Ctrl/Cmd+Y or Ctrl/Cmd+Shift+Z.
	Redo,
	/// Ctrl/Cmd+C.
	Copy,
	/// Ctrl/Cmd+V.
	Paste,
	/// Delete or Backspace.
	Delete,
}

impl Shortcut {
	/// Maps a key press to a shortcut.
	pub fn from_key(key: &str, ctrl: bool, shift: bool) -> Option<Self> {
		match (key.to_ascii_lowercase().as_str(), ctrl, shift) {
			("z", true, false) => Some(Self::Undo),
			("z", true, true) | ("y", true, _) => Some(Self::Redo),
			("c", true, _) => Some(Self::Copy),
			("v", true, _) => Some(Self::Paste),
			("delete" | "backspace", false, _) => Some(Self::Delete),
			_ => None,
		}
	}

	/// Runs the shortcut against the editor. Returns whether the document
	/// changed.
	pub fn apply(self, editor: &mut MapEditor, viewport: Viewport) -> bool {
		match self {
			Self::Undo => editor.undo(),
			Self::Redo => editor.redo(),
			Self::Copy => {
				editor.copy_selection();
				false
			}
			Self::Paste => !editor.paste(viewport).is_empty(),
			Self::Delete => editor.delete_selected(),
		}
	}
}

fn typing_into_field(ev: &KeyboardEvent) -> bool {
	ev.target()
		.and_then(|t| t.dyn_into::<Element>().ok())
		.is_some_and(|el| matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA"))
}

/// Selection change for a press on `id`: shift toggles it, a plain press
/// selects it alone unless it is already part of the selection, so a
/// multi-selection can be dragged as a whole.
fn pick_node(editor: &mut MapEditor, id: &str, additive: bool) -> crate::error::Result<()> {
	if additive {
		return editor.toggle_selected(id);
	}
	if editor.document().node(id).is_some_and(|n| n.is_selected()) {
		return Ok(());
	}
	editor.select_only(id)
}

/// Canvas view of the editor's live document.
///
/// `revision` is bumped whenever an interaction changes the document so
/// surrounding UI can refresh; `viewport` tracks pan and zoom.
#[component]
pub fn MapCanvas(
	editor: Rc<RefCell<MapEditor>>,
	revision: RwSignal<u64>,
	viewport: RwSignal<Viewport>,
	#[prop(default = false)] fullscreen: bool,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<CanvasState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let keydown_cb: Rc<RefCell<Option<Closure<dyn FnMut(KeyboardEvent)>>>> =
		Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init, keydown_init, editor_init) = (
		state.clone(),
		animate.clone(),
		resize_cb.clone(),
		keydown_cb.clone(),
		editor.clone(),
	);

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let screen_size = |win: &Window| {
			(
				win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0),
				win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0),
			)
		};

		let (w, h) = if fullscreen {
			screen_size(&window)
		} else {
			canvas
				.parent_element()
				.map(|p| (p.client_width() as f64, p.client_height() as f64))
				.unwrap_or((800.0, 600.0))
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("2d canvas context unavailable");
			return;
		};
		let (node_width, node_height, fallback) = {
			let config = editor_init.borrow().config().clone();
			(config.node_width, config.node_height, config.default_node_style)
		};
		let initial = CanvasState::new(w, h, node_width, node_height);
		viewport.set(initial.viewport());
		*state_init.borrow_mut() = Some(initial);

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = screen_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
					viewport.set(s.viewport());
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_key, editor_key) = (state_init.clone(), editor_init.clone());
		*keydown_init.borrow_mut() = Some(Closure::new(move |ev: KeyboardEvent| {
			if typing_into_field(&ev) {
				return;
			}
			let ctrl = ev.ctrl_key() || ev.meta_key();
			let Some(shortcut) = Shortcut::from_key(&ev.key(), ctrl, ev.shift_key()) else {
				return;
			};
			ev.prevent_default();
			let view = state_key
				.borrow()
				.as_ref()
				.map(CanvasState::viewport)
				.unwrap_or_default();
			debug!("shortcut {shortcut:?}");
			if shortcut.apply(&mut editor_key.borrow_mut(), view) {
				revision.update(|r| *r += 1);
			}
		}));
		if let Some(ref cb) = *keydown_init.borrow() {
			let _ = window.add_event_listener_with_callback("keydown", cb.as_ref().unchecked_ref());
		}

		let (state_anim, editor_anim, animate_inner) =
			(state_init.clone(), editor_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(0.016);
				render::render(s, editor_anim.borrow().document(), &fallback, &ctx);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let local_point = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let (state_md, editor_md) = (state.clone(), editor.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(&ev) else {
			return;
		};
		let mut guard = state_md.borrow_mut();
		let Some(s) = guard.as_mut() else {
			return;
		};
		let mut editor = editor_md.borrow_mut();
		match s.node_at_position(editor.document(), x, y) {
			Some(id) => {
				if let Err(e) = pick_node(&mut editor, &id, ev.shift_key()) {
					debug!("selection on mousedown failed: {e}");
				}
				s.drag.node_start = editor
					.document()
					.node(&id)
					.map(|n| n.position)
					.unwrap_or_default();
				s.drag.active = true;
				s.drag.moved = false;
				s.drag.node = Some(id);
				s.drag.start_x = x;
				s.drag.start_y = y;
			}
			None => {
				if !ev.shift_key() {
					editor.clear_selection();
				}
				s.pan.active = true;
				s.pan.start_x = x;
				s.pan.start_y = y;
				s.pan.transform_start_x = s.transform.x;
				s.pan.transform_start_y = s.transform.y;
			}
		}
		revision.update(|r| *r += 1);
	};

	let (state_mm, editor_mm) = (state.clone(), editor.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(&ev) else {
			return;
		};
		let mut guard = state_mm.borrow_mut();
		let Some(s) = guard.as_mut() else {
			return;
		};

		if !s.drag.active {
			let editor = editor_mm.borrow();
			let hovered = s.node_at_position(editor.document(), x, y);
			s.set_hover(editor.document(), hovered);
		}

		if s.drag.active {
			if let Some(id) = s.drag.node.clone() {
				let (dx, dy) = (
					(x - s.drag.start_x) / s.transform.k,
					(y - s.drag.start_y) / s.transform.k,
				);
				let to = Position::new(s.drag.node_start.x + dx, s.drag.node_start.y + dy);
				// live drag is not an undo step
				if editor_mm.borrow_mut().move_node(&id, to).is_ok() {
					s.drag.moved = true;
				}
			}
		} else if s.pan.active {
			s.transform.x = s.pan.transform_start_x + (x - s.pan.start_x);
			s.transform.y = s.pan.transform_start_y + (y - s.pan.start_y);
			viewport.set(s.viewport());
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			if s.drag.active && s.drag.moved {
				revision.update(|r| *r += 1);
			}
			s.drag.active = false;
			s.drag.node = None;
			s.pan.active = false;
		}
	};

	let (state_ml, editor_ml) = (state.clone(), editor.clone());
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.drag.active = false;
			s.drag.node = None;
			s.pan.active = false;
			s.set_hover(editor_ml.borrow().document(), None);
		}
	};

	let (state_dc, editor_dc) = (state.clone(), editor.clone());
	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(&ev) else {
			return;
		};
		let guard = state_dc.borrow();
		let Some(s) = guard.as_ref() else {
			return;
		};
		let mut editor = editor_dc.borrow_mut();
		if let Some(id) = s.node_at_position(editor.document(), x, y) {
			if let Ok(group) = editor.select_group(&id) {
				debug!("selected group of {} nodes", group.nodes.len());
				revision.update(|r| *r += 1);
			}
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(&*ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			s.zoom_at(x, y, factor);
			viewport.set(s.viewport());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="map-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn maps_platform_shortcuts() {
		assert_eq!(Shortcut::from_key("z", true, false), Some(Shortcut::Undo));
		assert_eq!(Shortcut::from_key("Z", true, true), Some(Shortcut::Redo));
		assert_eq!(Shortcut::from_key("y", true, false), Some(Shortcut::Redo));
		assert_eq!(Shortcut::from_key("c", true, false), Some(Shortcut::Copy));
		assert_eq!(Shortcut::from_key("v", true, false), Some(Shortcut::Paste));
		assert_eq!(Shortcut::from_key("Delete", false, false), Some(Shortcut::Delete));
		assert_eq!(Shortcut::from_key("z", false, false), None);
		assert_eq!(Shortcut::from_key("Backspace", true, false), None);
	}

	#[test]
	fn press_selection_rules() {
		use crate::config::EditorConfig;
		use crate::error::EditorError;
		use crate::graph::{Document, Node, NodeData};

		let nodes = ["1", "2", "3"]
			.iter()
			.map(|id| Node::new(*id, Position::default(), NodeData::labeled(*id)))
			.collect();
		let mut editor = MapEditor::with_document(EditorConfig::default(), Document::new(nodes, vec![]));
		let selected = |editor: &MapEditor| -> Vec<String> {
			editor.document().selection().nodes.into_iter().map(|n| n.id).collect()
		};

		pick_node(&mut editor, "1", false).unwrap();
		pick_node(&mut editor, "2", true).unwrap();
		assert_eq!(selected(&editor), vec!["1", "2"]);

		// pressing a selected node keeps the group for dragging
		pick_node(&mut editor, "2", false).unwrap();
		assert_eq!(selected(&editor), vec!["1", "2"]);

		pick_node(&mut editor, "3", false).unwrap();
		assert_eq!(selected(&editor), vec!["3"]);

		assert!(matches!(
			pick_node(&mut editor, "gone", true),
			Err(EditorError::UnknownNode(_))
		));
		assert!(matches!(
			pick_node(&mut editor, "gone", false),
			Err(EditorError::UnknownNode(_))
		));
		assert_eq!(selected(&editor), vec!["3"]);
	}

	#[test]
	fn copy_then_paste_through_shortcuts() {
		use crate::config::EditorConfig;
		use crate::graph::{Document, Node, NodeData};

		let mut node = Node::new("1", Position::default(), NodeData::labeled("a"));
		node.selected = Some(true);
		let mut editor =
			MapEditor::with_document(EditorConfig::default(), Document::new(vec![node], vec![]));

		assert!(!Shortcut::Copy.apply(&mut editor, Viewport::default()));
		assert!(Shortcut::Paste.apply(&mut editor, Viewport::default()));
		assert_eq!(editor.document().nodes.len(), 2);
		assert!(Shortcut::Undo.apply(&mut editor, Viewport::default()));
		assert_eq!(editor.document().nodes.len(), 1);
		assert!(Shortcut::Redo.apply(&mut editor, Viewport::default()));
		assert_eq!(editor.document().nodes.len(), 2);
	}
}
