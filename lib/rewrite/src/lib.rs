//! Taking SPARQL basic graph patterns through plain RDF and back.
//!
//! SPARQL variables are not terms of an RDF graph, so a graph-to-graph
//! transformation cannot see them. This crate validates that a SELECT query
//! has the one shape that survives the detour (a WHERE clause that is a
//! single basic graph pattern), writes that pattern out as a graph with every
//! variable standing behind a synthetic IRI, and turns any graph that uses
//! those IRIs back into a pattern for the rebuilt query.

mod codec;
mod namespace;
mod shape;

pub use codec::{decode_graph, encode_bgp, CodecError};
pub use namespace::VariableNamespace;
pub use shape::{SelectTemplate, ShapeError};
