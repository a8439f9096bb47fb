use crate::RewriteError;
use rdf_reshape_engine::{ExecutionContext, TransformEngine};
use rdf_reshape_rewrite::{decode_graph, encode_bgp, SelectTemplate, VariableNamespace};
use spargebra::Query;
use tracing::debug;

/// Rewrites a SELECT query by pushing its basic graph pattern through a
/// graph transformation.
///
/// The stages run once each, in order: validate the query shape, encode the
/// pattern as a graph under `namespace`, execute `program` on `engine`,
/// decode the produced graph, rebuild the query around the decoded pattern.
/// Any stage error aborts the run; there is no partial result.
pub fn rewrite_select<E: TransformEngine>(
    query: Query,
    engine: &E,
    program: &E::Program,
    context: &ExecutionContext,
    namespace: &VariableNamespace,
) -> Result<Query, RewriteError> {
    let template = SelectTemplate::new(query)?;
    let input = encode_bgp(template.patterns(), namespace)?;
    let output = engine.execute(program, &input, context)?;
    debug!(
        input = input.len(),
        output = output.len(),
        "transformation finished"
    );
    let patterns = decode_graph(&output, namespace)?;
    Ok(template.into_query(patterns))
}
