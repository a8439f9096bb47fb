use rdf_reshape_engine::TransformError;
use rdf_reshape_rewrite::{CodecError, ShapeError};

/// An error raised while rewriting a SELECT query.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// The query does not have the single-BGP shape.
    #[error(transparent)]
    Shape(#[from] ShapeError),
    /// Variables could not be carried through the graph round trip.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The transformation engine failed.
    #[error("the transformation failed: {0}")]
    Transformation(#[from] TransformError),
}
