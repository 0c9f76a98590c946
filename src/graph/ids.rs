//! Monotonic source of node ids.

use log::{debug, warn};

use super::document::{Document, NodeId};

/// Hands out decimal node ids from a counter that only ever moves forward.
///
/// One allocator lives as long as the editor. Loading a document must go
/// through [`IdAllocator::observe`] so freshly minted ids stay above every
/// numeric id the document already carries.
///
/// Once the numeric range is used up, ids continue as `{u64::MAX}-{n}`.
#[derive(Clone, Debug)]
pub struct IdAllocator {
	next: u64,
	seed_margin: u64,
	spill: Option<u64>,
}

impl IdAllocator {
	/// Starts counting at `first`; `seed_margin` is the headroom left above
	/// the largest id seen by [`observe`](Self::observe).
	pub fn new(first: u64, seed_margin: u64) -> Self {
		Self {
			next: first,
			seed_margin,
			spill: None,
		}
	}

	/// The id the next call to [`allocate`](Self::allocate) returns.
	pub fn peek(&self) -> u64 {
		self.next
	}

	/// Mints a new id.
	pub fn allocate(&mut self) -> NodeId {
		if let Some(n) = self.spill {
			self.spill = Some(n.wrapping_add(1));
			return format!("{}-{n}", u64::MAX);
		}
		let id = self.next;
		match self.next.checked_add(1) {
			Some(next) => self.next = next,
			None => {
				warn!("numeric node ids exhausted, continuing with suffixed ids");
				self.spill = Some(1);
			}
		}
		id.to_string()
	}

	/// Mints ids until one satisfies `is_free`.
	pub fn allocate_where(&mut self, mut is_free: impl FnMut(&str) -> bool) -> NodeId {
		loop {
			let id = self.allocate();
			if is_free(&id) {
				return id;
			}
			warn!("id allocator produced taken id {id}; was the document observed on load?");
		}
	}

	/// Advances past the largest numeric node id in `doc`. Never moves the
	/// counter backwards; non-numeric ids are ignored.
	pub fn observe(&mut self, doc: &Document) {
		let Some(max) = doc
			.nodes
			.iter()
			.filter_map(|n| n.id.parse::<u64>().ok())
			.max()
		else {
			return;
		};
		let floor = max.saturating_add(self.seed_margin).max(max.saturating_add(1));
		if floor > self.next {
			debug!("id allocator advanced {} -> {floor}", self.next);
			self.next = floor;
		}
	}
}
