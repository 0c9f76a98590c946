//! Bounded linear undo/redo over whole-document snapshots.

use std::collections::VecDeque;

use log::debug;

use super::document::Document;

/// Past-stack depth used when no configuration overrides it.
pub const DEFAULT_DEPTH: usize = 20;

/// Frozen copy of a document. Only [`HistoryManager`] creates these and
/// nothing hands out mutable access to the inner document.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot(Document);

impl Snapshot {
	/// Read-only view of the captured document.
	pub fn document(&self) -> &Document {
		&self.0
	}

	fn into_document(self) -> Document {
		self.0
	}
}

/// Undo/redo stacks for one open document.
///
/// `past` holds at most `depth` entries and evicts the oldest first. Taking
/// a snapshot always clears `future`, so history never branches: acting
/// after an undo discards whatever could have been redone.
#[derive(Clone, Debug)]
pub struct HistoryManager {
	past: VecDeque<Snapshot>,
	future: VecDeque<Snapshot>,
	depth: usize,
}

impl Default for HistoryManager {
	fn default() -> Self {
		Self::new(DEFAULT_DEPTH)
	}
}

impl HistoryManager {
	/// Creates empty history keeping up to `depth` undo steps.
	pub fn new(depth: usize) -> Self {
		Self {
			past: VecDeque::with_capacity(depth + 1),
			future: VecDeque::new(),
			depth,
		}
	}

	/// Checkpoints `doc`, the state *before* a logical action.
	pub fn snapshot(&mut self, doc: Document) {
		self.push_past(doc);
		self.future.clear();
		debug!("history snapshot: {} past", self.past.len());
	}

	/// Steps back one action. `current` becomes the first redo entry.
	/// Returns `None` when there is nothing to undo.
	pub fn undo(&mut self, current: Document) -> Option<Document> {
		let previous = self.past.pop_back()?;
		self.future.push_front(Snapshot(current));
		debug!("undo: {} past, {} future", self.past.len(), self.future.len());
		Some(previous.into_document())
	}

	/// Re-applies the most recently undone action. `current` goes back onto
	/// the past stack under the usual depth limit. Returns `None` when there
	/// is nothing to redo.
	pub fn redo(&mut self, current: Document) -> Option<Document> {
		let next = self.future.pop_front()?;
		self.push_past(current);
		debug!("redo: {} past, {} future", self.past.len(), self.future.len());
		Some(next.into_document())
	}

	/// Whether [`undo`](Self::undo) would do anything.
	pub fn can_undo(&self) -> bool {
		!self.past.is_empty()
	}

	/// Whether [`redo`](Self::redo) would do anything.
	pub fn can_redo(&self) -> bool {
		!self.future.is_empty()
	}

	/// Undo steps available.
	pub fn undo_len(&self) -> usize {
		self.past.len()
	}

	/// Redo steps available.
	pub fn redo_len(&self) -> usize {
		self.future.len()
	}

	/// Most recent checkpoint, if any.
	pub fn last(&self) -> Option<&Snapshot> {
		self.past.back()
	}

	/// Drops both stacks.
	pub fn clear(&mut self) {
		self.past.clear();
		self.future.clear();
	}

	fn push_past(&mut self, doc: Document) {
		self.past.push_back(Snapshot(doc));
		while self.past.len() > self.depth {
			self.past.pop_front();
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::graph::document::{Node, NodeData, Position};

	fn doc(tag: usize) -> Document {
		Document::new(
			vec![Node::new(
				tag.to_string(),
				Position::default(),
				NodeData::labeled(format!("state {tag}")),
			)],
			vec![],
		)
	}

	#[test]
	fn undo_then_redo_is_inverse() {
		let mut history = HistoryManager::default();
		let (before, current) = (doc(1), doc(2));

		history.snapshot(before.clone());
		let undone = history.undo(current.clone()).unwrap();
		assert_eq!(undone, before);

		let redone = history.redo(undone).unwrap();
		assert_eq!(redone, current);
		assert!(history.can_undo());
		assert!(!history.can_redo());
	}

	#[test]
	fn empty_history_is_noop() {
		let mut history = HistoryManager::default();
		assert!(!history.can_undo());
		assert!(!history.can_redo());
		assert_eq!(history.undo(doc(0)), None);
		assert_eq!(history.redo(doc(0)), None);
		assert_eq!(history.undo_len(), 0);
		assert_eq!(history.redo_len(), 0);
	}

	#[test]
	fn keeps_only_most_recent_twenty() {
		let mut history = HistoryManager::default();
		for i in 1..=25 {
			history.snapshot(doc(i));
		}
		assert_eq!(history.undo_len(), 20);

		let mut current = doc(26);
		let mut restored = Vec::new();
		while let Some(prev) = history.undo(current.clone()) {
			restored.push(prev.nodes[0].id.clone());
			current = prev;
		}
		let expected: Vec<String> = (6..=25).rev().map(|i| i.to_string()).collect();
		assert_eq!(restored, expected);
	}

	#[test]
	fn snapshot_invalidates_redo() {
		let mut history = HistoryManager::default();
		history.snapshot(doc(1));
		history.snapshot(doc(2));
		let current = history.undo(doc(3)).unwrap();
		let current = history.undo(current).unwrap();
		assert_eq!(history.redo_len(), 2);

		history.snapshot(current);
		assert!(!history.can_redo());
		assert_eq!(history.redo(doc(9)), None);
	}

	#[test]
	fn walks_back_and_forth_within_depth() {
		let mut history = HistoryManager::new(2);
		history.snapshot(doc(1));
		history.snapshot(doc(2));
		history.snapshot(doc(3));

		let current = history.undo(doc(4)).unwrap();
		let current = history.undo(current).unwrap();
		assert_eq!(current, doc(2));
		assert_eq!(history.undo(current.clone()), None);

		let current = history.redo(current).unwrap();
		let current = history.redo(current).unwrap();
		assert_eq!(current, doc(4));
		assert_eq!(history.undo_len(), 2);
		assert_eq!(history.last().map(Snapshot::document), Some(&doc(3)));
	}
}
