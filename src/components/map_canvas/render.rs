use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::CanvasState;
use crate::graph::{Document, Edge, Node, NodeStyle, Position};

const BACKGROUND: &str = "#1a1a1a";
const SELECTED: &str = "#64b4ff";

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &CanvasState, doc: &Document, fallback: &NodeStyle, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, doc, ctx);
	draw_nodes(state, doc, fallback, ctx);
	ctx.restore();
}

fn center(state: &CanvasState, p: Position) -> (f64, f64) {
	(p.x + state.node_width / 2.0, p.y + state.node_height / 2.0)
}

/// Dash pattern from an SVG `stroke-dasharray` value.
fn dash_pattern(edge: &Edge, k: f64) -> js_sys::Array {
	let dashes = js_sys::Array::new();
	let spec = edge.style.as_ref().and_then(|s| s.stroke_dasharray.as_deref());
	for part in spec.into_iter().flat_map(str::split_whitespace) {
		if let Ok(v) = part.parse::<f64>() {
			dashes.push(&JsValue::from_f64(v / k));
		}
	}
	dashes
}

fn draw_edges(state: &CanvasState, doc: &Document, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (line_width, arrow_size) = (1.5 / k, 10.0 / k);
	let t = ease_out_cubic(state.hover.highlight_t);
	let half_h = state.node_height / 2.0;

	for edge in &doc.edges {
		let (Some(n1), Some(n2)) = (doc.node(&edge.source), doc.node(&edge.target)) else {
			continue;
		};
		let ((x1, y1), (x2, y2)) = (center(state, n1.position), center(state, n2.position));
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		let is_highlighted = state.is_highlighted(&n1.id) && state.is_highlighted(&n2.id);
		let (alpha, width) = if edge.is_selected() {
			(1.0, line_width * 1.6)
		} else if is_highlighted {
			(0.6 + 0.3 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, line_width * (1.0 - 0.3 * t))
		};
		let color = if edge.is_selected() {
			SELECTED.to_string()
		} else {
			format!("rgba(180, 180, 180, {alpha})")
		};

		ctx.set_stroke_style_str(&color);
		ctx.set_line_width(width);
		let _ = ctx.set_line_dash(&dash_pattern(edge, k));

		// stop at the node box, approximated by its half height
		let (ux, uy) = (dx / dist, dy / dist);
		let (tip_x, tip_y) = (x2 - ux * half_h, y2 - uy * half_h);
		ctx.begin_path();
		ctx.move_to(x1 + ux * half_h, y1 + uy * half_h);
		ctx.line_to(tip_x, tip_y);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		if edge.marker_end.is_some() {
			ctx.set_fill_style_str(&color);
			let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
			let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
			ctx.begin_path();
			ctx.move_to(tip_x, tip_y);
			ctx.line_to(back_x + px, back_y + py);
			ctx.line_to(back_x - px, back_y - py);
			ctx.close_path();
			ctx.fill();
		}
	}
}

fn draw_nodes(state: &CanvasState, doc: &Document, fallback: &NodeStyle, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	for node in &doc.nodes {
		let alpha = if has_highlight && !state.is_highlighted(&node.id) {
			1.0 - 0.6 * t
		} else {
			1.0
		};
		draw_node(state, node, fallback, alpha, k, ctx);
	}
}

fn draw_node(
	state: &CanvasState,
	node: &Node,
	fallback: &NodeStyle,
	alpha: f64,
	k: f64,
	ctx: &CanvasRenderingContext2d,
) {
	let style = node.data.style.as_ref().unwrap_or(fallback);
	let Position { x, y } = node.position;
	let (w, h) = (state.node_width, state.node_height);

	ctx.set_global_alpha(alpha);
	ctx.set_fill_style_str(&style.background_color);
	ctx.fill_rect(x, y, w, h);

	if node.is_selected() || state.is_hovered(&node.id) {
		ctx.set_stroke_style_str(SELECTED);
		ctx.set_line_width(2.0 / k);
		ctx.stroke_rect(x, y, w, h);
	}

	ctx.set_fill_style_str(&style.color);
	ctx.set_font("bold 14px sans-serif");
	let _ = ctx.fill_text_with_max_width(&node.data.label, x + 12.0, y + 28.0, w - 24.0);
	if let Some(summary) = node.data.summary.as_deref().filter(|s| !s.is_empty()) {
		ctx.set_font("12px sans-serif");
		let _ = ctx.fill_text_with_max_width(summary, x + 12.0, y + 52.0, w - 24.0);
	}
	ctx.set_global_alpha(1.0);
}
