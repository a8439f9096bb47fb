use crate::locator::ResourceError;
use oxrdf::IriParseError;
use oxrdfio::RdfParseError;
use spargebra::SparqlSyntaxError;
use std::path::PathBuf;

/// Error raised when a transformation program cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    /// The program text fails to parse as SPARQL.
    #[error(transparent)]
    Syntax(#[from] SparqlSyntaxError),
    /// The program parses, but into the wrong query form.
    #[error("the transformation program must be a CONSTRUCT query, found a {0} query")]
    NotConstruct(&'static str),
    /// Graphs are addressed through GRAPH blocks, not a dataset clause.
    #[error("FROM clauses are not supported; address graphs with GRAPH blocks instead")]
    Dataset,
}

/// Error raised while a transformation runs against an input graph.
///
/// These propagate to the caller unchanged; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// A graph name did not resolve to a file.
    #[error(transparent)]
    Resource(#[from] ResourceError),
    /// A resolved file has no recognizable RDF extension.
    #[error("cannot guess an RDF format for {}", path.display())]
    UnknownFormat { path: PathBuf },
    /// A graph name is not usable as the base IRI of its own document.
    #[error("invalid base IRI '{iri}': {source}")]
    InvalidBaseIri {
        iri: String,
        #[source]
        source: IriParseError,
    },
    /// A resolved graph document failed to parse.
    #[error(transparent)]
    GraphParsing(#[from] RdfParseError),
    /// The program uses a SPARQL feature the engine does not evaluate.
    #[error("the transformation program uses {0}, which the engine cannot evaluate")]
    Unsupported(&'static str),
}
