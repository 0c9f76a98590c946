//! Controller-level failures. History and merge themselves cannot fail.

use thiserror::Error;

/// Why a targeted editor action was refused. A refused action takes no
/// history snapshot and leaves the document untouched.
#[derive(Debug, Error)]
pub enum EditorError {
	/// No node with this id in the live document.
	#[error("unknown node `{0}`")]
	UnknownNode(String),
	/// No edge with this id in the live document.
	#[error("unknown edge `{0}`")]
	UnknownEdge(String),
	/// Roadmap generation returned no steps.
	#[error("roadmap for `{0}` has no steps")]
	EmptyRoadmap(String),
	/// The two nodes are already connected in this direction.
	#[error("`{0}` is already connected to `{1}`")]
	AlreadyConnected(String, String),
	/// A payload from the API did not match the expected shape.
	#[error("malformed payload: {0}")]
	Payload(#[from] serde_json::Error),
}

/// Result alias for editor actions.
pub type Result<T, E = EditorError> = std::result::Result<T, E>;
