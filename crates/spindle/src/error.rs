//! Error types for Spindle operations.
//!
//! Two layers exist. [`ModelError`] is returned by individual
//! [`DiagramModel`](crate::model::DiagramModel) commands; the engine treats
//! those as local, logs them and keeps going. [`SpindleError`] is the error
//! surfaced at the edges of the crate: reading documents, loading
//! configuration and I/O.

use std::io;

use thiserror::Error;

use spindle_core::identifier::Id;

/// Failure of a single command against the diagram model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Unknown element: {0}")]
    UnknownElement(Id),

    #[error("Element {0} has no diagram geometry")]
    MissingGeometry(Id),

    #[error("Element id {0} is already in use")]
    DuplicateId(Id),

    #[error("Element {0} has no label")]
    MissingLabel(Id),

    #[error("Invalid waypoints for {id}: {reason}")]
    InvalidWaypoints { id: Id, reason: String },
}

/// The main error type for Spindle operations.
///
/// # Diagnostic Variants
///
/// The `Document` variant keeps the source text next to the parse error so
/// front ends can render a snippet around the failing span.
#[derive(Debug, Error)]
pub enum SpindleError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Document { err: toml::de::Error, src: String },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(String),
}

impl SpindleError {
    /// Create a new `Document` error with the associated source text.
    pub fn new_document_error(err: toml::de::Error, src: impl Into<String>) -> Self {
        Self::Document {
            err,
            src: src.into(),
        }
    }
}
