//! Document model and the pure operations over it: history, merge and
//! component selection. Nothing here touches the DOM.

pub mod document;
pub mod history;
pub mod ids;
pub mod merge;
pub mod select;

pub use document::{
	Bounds, Document, Edge, EdgeId, EdgeStyle, MIND_NODE, MarkerEnd, MarkerType, Node, NodeData,
	NodeId, NodeStyle, Position, Subgraph,
};
pub use history::{HistoryManager, Snapshot};
pub use ids::IdAllocator;
pub use merge::{MergedResult, Offset, merge};
pub use select::{Component, connected_component};
