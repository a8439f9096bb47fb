//! The graph-to-graph transformation boundary.
//!
//! Engines see plain RDF. The input graph carries no variable semantics and
//! none leak in through this interface; whatever meaning its IRIs have is
//! the caller's business. An engine receives the input graph as its default
//! graph, may pull further named graphs out of the [`ExecutionContext`], and
//! returns the graph its program produced.

mod construct;
mod error;
mod locator;

pub use construct::{ConstructEngine, ConstructProgram};
pub use error::{ProgramError, TransformError};
pub use locator::{FileLocator, ResourceError};

use oxrdf::{Graph, Triple};
use oxrdfio::{RdfFormat, RdfParser};
use std::ffi::OsStr;
use std::fs;
use tracing::debug;

/// A graph-to-graph transformation engine.
pub trait TransformEngine {
    /// The parsed program this engine executes.
    type Program;

    /// Runs `program` once against `input`, returning the produced graph.
    fn execute(
        &self,
        program: &Self::Program,
        input: &Graph,
        context: &ExecutionContext,
    ) -> Result<Graph, TransformError>;
}

/// Everything an engine may consult besides the input graph.
pub struct ExecutionContext {
    locator: FileLocator,
}

impl ExecutionContext {
    /// Creates a new [ExecutionContext] that resolves graphs through
    /// `locator`.
    pub fn new(locator: FileLocator) -> Self {
        Self { locator }
    }

    /// Loads the named graph `iri` points to, guessing the serialization
    /// from the file extension.
    pub fn load_graph(&self, iri: &str) -> Result<Graph, TransformError> {
        let path = self.locator.resolve(iri)?;
        let format = path
            .extension()
            .and_then(OsStr::to_str)
            .and_then(RdfFormat::from_extension)
            .ok_or_else(|| TransformError::UnknownFormat {
                path: path.to_owned(),
            })?;
        let content = fs::read(path).map_err(|source| ResourceError::Read {
            path: path.to_owned(),
            source,
        })?;
        let parser = RdfParser::from_format(format).with_base_iri(iri).map_err(
            |source| TransformError::InvalidBaseIri {
                iri: iri.to_owned(),
                source,
            },
        )?;
        let mut graph = Graph::new();
        for quad in parser.for_reader(content.as_slice()) {
            let quad = quad?;
            graph.insert(&Triple::new(quad.subject, quad.predicate, quad.object));
        }
        debug!(iri, statements = graph.len(), "loaded named graph");
        Ok(graph)
    }
}
